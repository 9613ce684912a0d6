//! Demo identity. Used to sign letters, never for authorization.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

pub const DEFAULT_PHOTO_URL: &str = "https://cdn-icons-png.flaticon.com/512/149/149071.png";
const GUEST_EMAIL_DOMAIN: &str = "citizen.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "displayName")]
    pub display_name: String,
    pub email: String,
    #[serde(alias = "photoURL")]
    pub photo_url: String,
}

impl User {
    /// Fabricates a local guest identity from a display name.
    pub fn guest(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Please enter your name".to_string()));
        }

        let handle: String = name
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        Ok(Self {
            display_name: name.to_string(),
            email: format!("{handle}@{GUEST_EMAIL_DOMAIN}"),
            photo_url: DEFAULT_PHOTO_URL.to_string(),
        })
    }

    /// Snapshot of an identity issued by a federated sign-in provider.
    pub fn federated(display_name: &str, email: &str, photo_url: Option<&str>) -> Self {
        Self {
            display_name: display_name.to_string(),
            email: email.to_string(),
            photo_url: photo_url.unwrap_or(DEFAULT_PHOTO_URL).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_email_strips_whitespace_and_lowercases() {
        let user = User::guest("  Asha  Meena ").unwrap();
        assert_eq!(user.display_name, "Asha  Meena");
        assert_eq!(user.email, "ashameena@citizen.com");
        assert_eq!(user.photo_url, DEFAULT_PHOTO_URL);
    }

    #[test]
    fn test_guest_rejects_blank_name() {
        assert!(matches!(User::guest("   "), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_user_reads_legacy_camel_case_keys() {
        let json = r#"{"displayName": "Ravi", "email": "ravi@citizen.com", "photoURL": "p.png"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.display_name, "Ravi");
        assert_eq!(user.photo_url, "p.png");
    }
}
