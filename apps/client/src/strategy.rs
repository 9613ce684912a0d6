//! How a report gets produced.
//!
//! `Photo` and `Manual` are model-backed and go through the relay.
//! `VehicleAbsence` is a local template: no network call, just a short
//! artificial delay so it reads like the other two.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use civicflow_core::{EmailDraft, Priority, Report};
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::language::Language;
use crate::view::View;

pub const DEFAULT_TEMPLATE_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_MANUAL_CATEGORY: &str = "Garbage Dump";

const VEHICLE_RECIPIENT_NAME: &str = "Nagar Nigam (Vehicle Dept)";
const VEHICLE_RECIPIENT_EMAIL: &str = "help@udaipur.gov.in";
const VEHICLE_IMAGE_URL: &str = "https://cdn-icons-png.flaticon.com/512/2554/2554936.png";
const SUBJECT_ADDRESS_CHARS: usize = 30;

/// A photo read from disk, ready for multipart upload.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PhotoUpload {
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(ClientError::Validation(
                "Please select an image first!".to_string(),
            ));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("issue.jpg")
            .to_string();

        Ok(Self {
            content_type: content_type_for(path).to_string(),
            file_name,
            bytes: Bytes::from(bytes),
        })
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

/// The relay's two analysis endpoints.
#[async_trait]
pub trait AnalysisRelay: Send + Sync {
    async fn analyze_photo(
        &self,
        photo: &PhotoUpload,
        location: &str,
        language: Language,
    ) -> Result<Report>;

    async fn analyze_manual(
        &self,
        category: &str,
        description: &str,
        location: &str,
        language: Language,
    ) -> Result<Report>;
}

/// Inputs shared by every strategy.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub address: &'a str,
    pub language: Language,
    /// Display name used to sign template letters.
    pub signer: Option<&'a str>,
    pub template_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStrategy {
    Photo { image: PathBuf },
    Manual { category: String, description: String },
    VehicleAbsence,
}

impl ReportStrategy {
    /// The form this strategy is filled in on.
    pub fn view(&self) -> View {
        match self {
            ReportStrategy::Photo { .. } => View::PhotoPreview,
            ReportStrategy::Manual { .. } => View::ManualForm,
            ReportStrategy::VehicleAbsence => View::VehicleEdit,
        }
    }

    pub fn is_model_backed(&self) -> bool {
        !matches!(self, ReportStrategy::VehicleAbsence)
    }

    /// Client-side checks; failing here means nothing is sent anywhere.
    pub fn validate(&self, address: &str, language: Language) -> Result<()> {
        let has_address = !address.trim().is_empty();

        match self {
            ReportStrategy::Photo { image } => {
                if image.as_os_str().is_empty() {
                    return Err(ClientError::Validation(
                        "Please select an image first!".to_string(),
                    ));
                }
            }
            ReportStrategy::Manual { description, .. } => {
                if !has_address {
                    return Err(ClientError::Validation(
                        "Please enter a location!".to_string(),
                    ));
                }
                if description.trim().is_empty() {
                    return Err(ClientError::Validation(
                        "Please describe the issue!".to_string(),
                    ));
                }
            }
            ReportStrategy::VehicleAbsence => {
                if !has_address {
                    return Err(ClientError::Validation(
                        language
                            .pick("Please wait for location...", "कृपया स्थान का इंतज़ार करें...")
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub async fn generate(
        &self,
        relay: &dyn AnalysisRelay,
        ctx: &ReportContext<'_>,
    ) -> Result<Report> {
        self.validate(ctx.address, ctx.language)?;

        match self {
            ReportStrategy::Photo { image } => {
                let photo = PhotoUpload::read(image).await?;
                debug!(
                    "Uploading {} ({} bytes, {})",
                    photo.file_name,
                    photo.bytes.len(),
                    photo.content_type
                );
                relay.analyze_photo(&photo, ctx.address, ctx.language).await
            }
            ReportStrategy::Manual {
                category,
                description,
            } => {
                relay
                    .analyze_manual(category, description, ctx.address, ctx.language)
                    .await
            }
            ReportStrategy::VehicleAbsence => {
                tokio::time::sleep(ctx.template_delay).await;
                info!("Drafted vehicle absence report from template");
                Ok(vehicle_absence_report(ctx.address, ctx.language, ctx.signer))
            }
        }
    }
}

/// Canned report for a missed garbage pickup.
pub fn vehicle_absence_report(address: &str, language: Language, signer: Option<&str>) -> Report {
    let short: String = address.chars().take(SUBJECT_ADDRESS_CHARS).collect();
    let signer = signer
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| language.pick("Concerned Citizen", "जागरूक नागरिक"));

    let (subject, body) = match language {
        Language::English => (
            format!("URGENT: Garbage Truck Missed at {short}..."),
            format!(
                "Respected Sir/Madam,\n\n\
                 I wish to report that the municipal garbage collection vehicle failed to visit our area today.\n\n\
                 Location: {address}\n\n\
                 This negligence is leading to waste piling up on the streets. I request you to send a backup vehicle immediately.\n\n\
                 Sincerely,\n{signer}"
            ),
        ),
        Language::Hindi => (
            format!("अति आवश्यक: कचरा गाड़ी नहीं आई - {short}..."),
            format!(
                "सेवा में,\n\n\
                 श्रीमान स्वास्थ्य अधिकारी जी,\n\n\
                 सविनय निवेदन है कि आज हमारे क्षेत्र में नगर निगम की कचरा गाड़ी नहीं आई है।\n\n\
                 स्थान: {address}\n\n\
                 इस कारण मोहल्ले में गंदगी जमा हो रही है। आपसे अनुरोध है कि कृपया तुरंत गाड़ी भिजवाने की व्यवस्था करें।\n\n\
                 भवदीय,\n{signer}"
            ),
        ),
    };

    Report {
        category: language
            .pick("Garbage Vehicle Missed", "कचरा गाड़ी अनुपस्थित")
            .to_string(),
        priority: Priority::High,
        recipient_name: VEHICLE_RECIPIENT_NAME.to_string(),
        recipient_email: VEHICLE_RECIPIENT_EMAIL.to_string(),
        recipient_phone: String::new(),
        description: language
            .pick(
                "The daily garbage collection vehicle did not arrive in my area today, causing waste accumulation.",
                "आज मेरे क्षेत्र में दैनिक कचरा संग्रहण गाड़ी नहीं आई, जिसके कारण कचरा जमा हो गया है।",
            )
            .to_string(),
        eco_tip: language
            .pick(
                "Report missed pickups immediately to prevent street littering.",
                "सड़क पर कचरा फैलने से रोकने के लिए तुरंत रिपोर्ट करें।",
            )
            .to_string(),
        email_draft: EmailDraft { subject, body },
        image_url: VEHICLE_IMAGE_URL.to_string(),
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records calls and answers with a fixed report.
    pub struct StubRelay {
        reply: std::result::Result<Report, String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubRelay {
        pub fn replying(report: Report) -> Self {
            Self {
                reply: Ok(report),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: String) -> Result<Report> {
            self.calls.lock().unwrap().push(call);
            self.reply.clone().map_err(|message| ClientError::Relay {
                status: 500,
                message,
            })
        }
    }

    #[async_trait]
    impl AnalysisRelay for StubRelay {
        async fn analyze_photo(
            &self,
            photo: &PhotoUpload,
            location: &str,
            language: Language,
        ) -> Result<Report> {
            self.answer(format!("photo:{}:{location}:{language}", photo.content_type))
        }

        async fn analyze_manual(
            &self,
            category: &str,
            description: &str,
            location: &str,
            language: Language,
        ) -> Result<Report> {
            self.answer(format!("manual:{category}:{description}:{location}:{language}"))
        }
    }

    pub fn sample_report(category: &str) -> Report {
        Report {
            category: category.to_string(),
            priority: Priority::Medium,
            recipient_name: "Municipal Corporation Udaipur".to_string(),
            recipient_email: "commudr@gmail.com".to_string(),
            recipient_phone: "02942426262".to_string(),
            description: "Garbage is overflowing.".to_string(),
            eco_tip: String::new(),
            email_draft: EmailDraft {
                subject: "Garbage complaint".to_string(),
                body: "Respected Sir/Madam,\n\nPlease clear the garbage.".to_string(),
            },
            image_url: String::new(),
        }
    }
}
