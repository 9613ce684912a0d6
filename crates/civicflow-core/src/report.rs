//! The normalized result of one analysis call, shared by the relay and the client.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Salutation every English complaint letter must open with.
pub const FORMAL_SALUTATION: &str = "Respected Sir/Madam,";
/// Salutation used for Hindi letters.
pub const HINDI_SALUTATION: &str = "सेवा में,";
/// Informal salutation that must never appear in a letter.
pub const FORBIDDEN_SALUTATION: &str = "Dear";

/// Returns the formal salutation for a free-text language name.
pub fn formal_salutation(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "hindi" | "हिन्दी" | "हिंदी" => HINDI_SALUTATION,
        _ => FORMAL_SALUTATION,
    }
}

/// Urgency assigned by the model (or by a template).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Lenient parse of model output such as `"High 🔥"`, `"**low**"` or `"उच्च"`.
    /// Anything unrecognised is treated as `Medium`.
    pub fn from_loose(text: &str) -> Self {
        let cleaned = text
            .trim()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        if cleaned.starts_with("high") || cleaned.starts_with("उच्च") {
            Priority::High
        } else if cleaned.starts_with("low") || cleaned.starts_with("निम्न") || cleaned.starts_with("कम")
        {
            Priority::Low
        } else {
            Priority::Medium
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    /// `null` reads as `Medium`, like any unrecognised text.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Priority::from_loose).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Text left on a line after its leading "Dear ...," salutation is removed,
/// or `None` when the line does not open with one.
fn strip_informal_salutation(line: &str) -> Option<&str> {
    let after = line.trim_start().strip_prefix(FORBIDDEN_SALUTATION)?;
    if after.starts_with(|c: char| c.is_alphanumeric()) {
        return None;
    }

    Some(match after.split_once(',') {
        Some((_, rest)) => rest.trim_start(),
        None => "",
    })
}

impl EmailDraft {
    pub fn is_complete(&self) -> bool {
        !self.subject.trim().is_empty() && !self.body.trim().is_empty()
    }

    /// True when the body opens with `salutation` and never uses the informal one.
    pub fn is_formal(&self, salutation: &str) -> bool {
        self.body.trim_start().starts_with(salutation) && !self.body.contains(FORBIDDEN_SALUTATION)
    }

    /// Removes every "Dear ...," salutation (keeping the text that follows it on
    /// the same line) and makes sure the body opens with `salutation`.
    /// Returns whether the body changed.
    pub fn enforce_salutation(&mut self, salutation: &str) -> bool {
        let mut changed = false;
        let mut lines = Vec::new();
        for line in self.body.trim_start().lines() {
            match strip_informal_salutation(line) {
                Some(rest) => {
                    changed = true;
                    if !rest.is_empty() {
                        lines.push(rest);
                    }
                }
                None => lines.push(line),
            }
        }

        let mut body = lines.join("\n");
        if !body.trim_start().starts_with(salutation) {
            body = format!("{salutation}\n\n{}", body.trim_start());
            changed = true;
        }

        if changed {
            self.body = body;
        }
        changed
    }
}

/// Structured complaint produced once per submission.
/// Only `email_draft` is required in a model reply; recipient fields are
/// overwritten from the routing table afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_phone: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub eco_tip: String,
    pub email_draft: EmailDraft,
    #[serde(default)]
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_REPLY: &str = r#"{
        "category": "Garbage Dump",
        "priority": "High 🔥",
        "recipient_name": "Municipal Corporation Udaipur",
        "recipient_email": "commudr@gmail.com",
        "recipient_phone": "02942426262",
        "description": "Garbage pile next to the park.",
        "eco_tip": "Segregate wet and dry waste.",
        "email_draft": {
            "subject": "Complaint regarding garbage",
            "body": "Respected Sir/Madam,\n\nGarbage has piled up."
        }
    }"#;

    #[test]
    fn test_report_deserializes_model_reply_without_image_url() {
        let report: Report = serde_json::from_str(MODEL_REPLY).unwrap();
        assert_eq!(report.priority, Priority::High);
        assert_eq!(report.recipient_phone, "02942426262");
        assert!(report.image_url.is_empty());
        assert!(report.email_draft.is_complete());
    }

    #[test]
    fn test_report_missing_phone_and_tip_default_to_empty() {
        let json = r#"{
            "category": "Pothole",
            "priority": "Low",
            "recipient_name": "Municipal Corporation Udaipur",
            "recipient_email": "commudr@gmail.com",
            "description": "Hole in road",
            "email_draft": {"subject": "s", "body": "b"}
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert!(report.recipient_phone.is_empty());
        assert!(report.eco_tip.is_empty());
    }

    #[test]
    fn test_priority_tolerates_decorations() {
        assert_eq!(Priority::from_loose("High 🔥"), Priority::High);
        assert_eq!(Priority::from_loose("**low**"), Priority::Low);
        assert_eq!(Priority::from_loose("MEDIUM"), Priority::Medium);
        assert_eq!(Priority::from_loose("उच्च"), Priority::High);
        assert_eq!(Priority::from_loose("urgent-ish"), Priority::Medium);
    }

    #[test]
    fn test_priority_serializes_as_plain_word() {
        let json = serde_json::to_string(&Priority::Low).unwrap();
        assert_eq!(json, r#""Low""#);
    }

    #[test]
    fn test_formal_salutation_by_language() {
        assert_eq!(formal_salutation("English"), FORMAL_SALUTATION);
        assert_eq!(formal_salutation(" hindi "), HINDI_SALUTATION);
        assert_eq!(formal_salutation("Marathi"), FORMAL_SALUTATION);
    }

    #[test]
    fn test_enforce_salutation_replaces_informal_opening() {
        let mut draft = EmailDraft {
            subject: "Broken streetlight".to_string(),
            body: "Dear Officer,\nThe streetlight is broken.".to_string(),
        };
        assert!(draft.enforce_salutation(FORMAL_SALUTATION));
        assert!(draft.is_formal(FORMAL_SALUTATION));
        assert!(draft.body.ends_with("The streetlight is broken."));
    }

    #[test]
    fn test_enforce_salutation_keeps_formal_body() {
        let mut draft = EmailDraft {
            subject: "s".to_string(),
            body: "Respected Sir/Madam,\n\nText".to_string(),
        };
        assert!(!draft.enforce_salutation(FORMAL_SALUTATION));
        assert_eq!(draft.body, "Respected Sir/Madam,\n\nText");
    }

    #[test]
    fn test_enforce_salutation_prepends_when_missing() {
        let mut draft = EmailDraft {
            subject: "s".to_string(),
            body: "Water is leaking.".to_string(),
        };
        assert!(draft.enforce_salutation(FORMAL_SALUTATION));
        assert_eq!(draft.body, "Respected Sir/Madam,\n\nWater is leaking.");
    }

    #[test]
    fn test_enforce_salutation_keeps_single_line_letter() {
        let mut draft = EmailDraft {
            subject: "Streetlight".to_string(),
            body: "Dear Sir, the streetlight on MG Road has been broken for a week.".to_string(),
        };
        assert!(draft.enforce_salutation(FORMAL_SALUTATION));
        assert_eq!(
            draft.body,
            "Respected Sir/Madam,\n\nthe streetlight on MG Road has been broken for a week."
        );
    }

    #[test]
    fn test_enforce_salutation_keeps_content_on_opening_line() {
        let mut draft = EmailDraft {
            subject: "Drain".to_string(),
            body: "Dear Sir, the drain at Delhi Gate is blocked.\nPlease send a team.".to_string(),
        };
        assert!(draft.enforce_salutation(FORMAL_SALUTATION));
        assert_eq!(
            draft.body,
            "Respected Sir/Madam,\n\nthe drain at Delhi Gate is blocked.\nPlease send a team."
        );
        assert!(draft.is_formal(FORMAL_SALUTATION));
    }

    #[test]
    fn test_enforce_salutation_removes_inner_informal_salutation() {
        let mut draft = EmailDraft {
            subject: "s".to_string(),
            body: "Respected Sir/Madam,\n\nDear Officer, please act.\nDear Team,\nThanks".to_string(),
        };
        assert!(draft.enforce_salutation(FORMAL_SALUTATION));
        assert_eq!(draft.body, "Respected Sir/Madam,\n\nplease act.\nThanks");
        assert!(draft.is_formal(FORMAL_SALUTATION));
    }

    #[test]
    fn test_enforce_salutation_ignores_words_starting_with_dear() {
        let mut draft = EmailDraft {
            subject: "s".to_string(),
            body: "Respected Sir/Madam,\n\nDearth of water in Sector 5.".to_string(),
        };
        assert!(!draft.enforce_salutation(FORMAL_SALUTATION));
    }

    #[test]
    fn test_report_without_priority_or_recipient_defaults() {
        let json = r#"{
            "category": "Pothole",
            "description": "Hole in road",
            "email_draft": {"subject": "s", "body": "b"}
        }"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.priority, Priority::Medium);
        assert!(report.recipient_name.is_empty());
        assert!(report.recipient_email.is_empty());
    }

    #[test]
    fn test_null_priority_is_medium() {
        let json = r#"{"priority": null, "email_draft": {"subject": "s", "body": "b"}}"#;
        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.priority, Priority::Medium);
        assert!(report.category.is_empty());
    }
}
