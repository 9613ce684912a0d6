//! Screen state of the client.
//!
//! `Home → {PhotoPreview, VehicleEdit, ManualForm} → Result → Home`.
//! Cancelling a form goes straight back to `Home`.

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    PhotoPreview,
    VehicleEdit,
    ManualForm,
    Result,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::PhotoPreview => "photo_preview",
            View::VehicleEdit => "vehicle_edit",
            View::ManualForm => "manual_form",
            View::Result => "result",
        }
    }

    fn is_form(&self) -> bool {
        matches!(self, View::PhotoPreview | View::VehicleEdit | View::ManualForm)
    }

    pub fn can_move_to(&self, next: View) -> bool {
        match (self, next) {
            (View::Home, to) => to.is_form(),
            (from, View::Result) => from.is_form(),
            (from, View::Home) => from.is_form() || *from == View::Result,
            _ => false,
        }
    }

    /// Returns the next view, or `InvalidTransition`.
    pub fn transition(self, next: View) -> Result<View> {
        if self.can_move_to(next) {
            Ok(next)
        } else {
            Err(ClientError::InvalidTransition {
                from: self.name(),
                to: next.name(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let view = View::Home
            .transition(View::ManualForm)
            .and_then(|v| v.transition(View::Result))
            .and_then(|v| v.transition(View::Home))
            .unwrap();
        assert_eq!(view, View::Home);
    }

    #[test]
    fn test_forms_can_be_cancelled() {
        for form in [View::PhotoPreview, View::VehicleEdit, View::ManualForm] {
            assert!(form.can_move_to(View::Home));
        }
    }

    #[test]
    fn test_rejects_skipping_the_form() {
        let err = View::Home.transition(View::Result).unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidTransition { from: "home", to: "result" }
        ));
        assert!(!View::Result.can_move_to(View::ManualForm));
        assert!(!View::VehicleEdit.can_move_to(View::PhotoPreview));
        assert!(!View::Home.can_move_to(View::Home));
    }
}
