//! Fixed category → contact routing used to address complaints.
//!
//! The table is the single source for both the prompt text sent to the model
//! and the post-call validation of the model's reply.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::Report;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("failed to read routing table: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid routing table JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("routing table must define bucket '{0:?}' exactly once")]
    Bucket(Bucket),
}

/// The three routing buckets. `Municipal` is the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Lake,
    Animal,
    Municipal,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Lake, Bucket::Animal, Bucket::Municipal];

    /// Position in `ALL`, which is also the route order inside a table.
    fn index(self) -> usize {
        match self {
            Bucket::Lake => 0,
            Bucket::Animal => 1,
            Bucket::Municipal => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub bucket: Bucket,
    /// Human label rendered into the prompt, e.g. "Dead/Injured Animal".
    pub label: String,
    /// Words or phrases matched as whole words against category text.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub contact: Contact,
}

/// A single field the relay had to overwrite because the model strayed from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCorrection {
    pub field: &'static str,
    pub model_value: String,
    pub canonical_value: String,
}

/// Exactly one route per bucket, stored in `Bucket::ALL` order.
/// Deserialization goes through `RoutingTable::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRoutingTable")]
pub struct RoutingTable {
    routes: Vec<Route>,
}

#[derive(Deserialize)]
struct RawRoutingTable {
    routes: Vec<Route>,
}

impl TryFrom<RawRoutingTable> for RoutingTable {
    type Error = RoutingError;

    fn try_from(raw: RawRoutingTable) -> Result<Self, Self::Error> {
        RoutingTable::new(raw.routes)
    }
}

impl Default for RoutingTable {
    /// Udaipur contacts.
    fn default() -> Self {
        let municipal = Contact {
            name: "Municipal Corporation Udaipur".to_string(),
            email: "commudr@gmail.com".to_string(),
            phone: "02942426262".to_string(),
        };

        Self {
            routes: vec![
                Route {
                    bucket: Bucket::Lake,
                    label: "Jalkumbhi (Water Hyacinth) / Lake & Water Issues".to_string(),
                    keywords: to_strings(&[
                        "jalkumbhi",
                        "hyacinth",
                        "lake",
                        "pond",
                        "water body",
                        "जलकुंभी",
                        "झील",
                    ]),
                    contact: Contact {
                        name: "Lake Conservation Committee".to_string(),
                        ..municipal.clone()
                    },
                },
                Route {
                    bucket: Bucket::Animal,
                    label: "Dead/Injured Animal".to_string(),
                    keywords: to_strings(&[
                        "animal", "dog", "cow", "cattle", "carcass", "पशु", "जानवर",
                    ]),
                    contact: Contact {
                        name: "Animal Aid Unlimited".to_string(),
                        email: "info@animalaidunlimited.org".to_string(),
                        phone: "09829843726".to_string(),
                    },
                },
                Route {
                    bucket: Bucket::Municipal,
                    label: "Garbage / Roads / Streetlights / Others".to_string(),
                    keywords: Vec::new(),
                    contact: municipal,
                },
            ],
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl RoutingTable {
    /// Builds a table, checking that every bucket appears exactly once.
    pub fn new(mut routes: Vec<Route>) -> Result<Self, RoutingError> {
        for bucket in Bucket::ALL {
            if routes.iter().filter(|r| r.bucket == bucket).count() != 1 {
                return Err(RoutingError::Bucket(bucket));
            }
        }
        routes.sort_by_key(|r| r.bucket.index());
        Ok(Self { routes })
    }

    pub fn from_json(json: &str) -> Result<Self, RoutingError> {
        let raw: RawRoutingTable = serde_json::from_str(json)?;
        Self::new(raw.routes)
    }

    pub fn load(path: &Path) -> Result<Self, RoutingError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn contact(&self, bucket: Bucket) -> &Contact {
        &self.route(bucket).contact
    }

    fn route(&self, bucket: Bucket) -> &Route {
        &self.routes[bucket.index()]
    }

    /// Classifies free category text by whole-word keyword; unmatched text goes to `Municipal`.
    pub fn bucket_for_category(&self, category: &str) -> Bucket {
        let words = tokenize(category);
        self.routes
            .iter()
            .filter(|r| r.bucket != Bucket::Municipal)
            .find(|r| r.keywords.iter().any(|k| contains_phrase(&words, &tokenize(k))))
            .map(|r| r.bucket)
            .unwrap_or(Bucket::Municipal)
    }

    /// Finds the bucket whose contact the model echoed back. Name wins; email only
    /// counts when no other bucket shares it.
    pub fn bucket_for_contact(&self, name: &str, email: &str) -> Option<Bucket> {
        let name = name.trim();
        if let Some(route) = self
            .routes
            .iter()
            .find(|r| r.contact.name.eq_ignore_ascii_case(name))
        {
            return Some(route.bucket);
        }

        let email = email.trim();
        let mut by_email = self
            .routes
            .iter()
            .filter(|r| r.contact.email.eq_ignore_ascii_case(email));
        match (by_email.next(), by_email.next()) {
            (Some(route), None) => Some(route.bucket),
            _ => None,
        }
    }

    /// Bucket for a model reply: echoed contact first, then category keywords.
    pub fn resolve(&self, report: &Report) -> Bucket {
        self.bucket_for_contact(&report.recipient_name, &report.recipient_email)
            .unwrap_or_else(|| self.bucket_for_category(&report.category))
    }

    /// Overwrites recipient fields that differ from the bucket's contact.
    pub fn enforce(&self, report: &mut Report, bucket: Bucket) -> Vec<ContactCorrection> {
        let contact = self.contact(bucket);
        let mut corrections = Vec::new();

        for (field, value, canonical) in [
            ("recipient_name", &mut report.recipient_name, &contact.name),
            ("recipient_email", &mut report.recipient_email, &contact.email),
            ("recipient_phone", &mut report.recipient_phone, &contact.phone),
        ] {
            if value.as_str() != canonical.as_str() {
                corrections.push(ContactCorrection {
                    field,
                    model_value: std::mem::replace(value, canonical.clone()),
                    canonical_value: canonical.clone(),
                });
            }
        }

        corrections
    }

    /// Renders the routing rules as prompt text.
    pub fn prompt_block(&self) -> String {
        self.routes
            .iter()
            .map(|r| {
                format!(
                    "- **{}** -> Name: \"{}\"\n    -> Email: \"{}\"\n    -> Phone: \"{}\"",
                    r.label, r.contact.name, r.contact.email, r.contact.phone
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Lowercase words. Devanagari vowel signs stay inside their word.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || ('\u{0900}'..='\u{097F}').contains(&c)))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// `phrase` appears as consecutive words; the last word may carry a plural "s".
fn contains_phrase(words: &[String], phrase: &[String]) -> bool {
    let Some((last, head)) = phrase.split_last() else {
        return false;
    };

    words.windows(phrase.len()).any(|window| {
        let (window_last, window_head) = (&window[phrase.len() - 1], &window[..phrase.len() - 1]);
        window_head == head
            && (window_last == last || window_last.strip_suffix('s') == Some(last.as_str()))
    })
}
