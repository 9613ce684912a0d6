//! Analyze-and-normalize: prompt → model → fence strip → parse → routing check.
//!
//! The model is trusted for wording only. Recipient details are always
//! reconciled against the routing table before a report leaves the relay.

use civicflow_core::report::{formal_salutation, FORBIDDEN_SALUTATION};
use civicflow_core::{Bucket, Report, RoutingTable};
use tracing::{info, warn};

use crate::analysis::prompts::{build_image_prompt, build_manual_prompt};
use crate::errors::AppError;
use crate::llm_client::{parse_json_reply, GenerativeModel, InlineImage};

pub const DEFAULT_LOCATION: &str = "Unknown Location";
pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Clone)]
pub struct ImageSubmission {
    pub image: InlineImage,
    pub location: String,
    pub language: String,
}

#[derive(Debug, Clone)]
pub struct ManualSubmission {
    pub category: String,
    pub description: String,
    pub location: String,
    pub language: String,
}

/// Classifies a photo and drafts the letter. `image_url` is left for the caller.
pub async fn analyze_image(
    model: &dyn GenerativeModel,
    routing: &RoutingTable,
    submission: &ImageSubmission,
) -> Result<Report, AppError> {
    let prompt = build_image_prompt(routing, &submission.location, &submission.language);

    let text = model
        .generate(&prompt, Some(&submission.image))
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let mut report: Report = parse_json_reply(&text).map_err(|e| {
        warn!("Image analysis reply did not parse: {e}");
        AppError::MalformedResponse { raw: text.clone() }
    })?;

    let bucket = routing.resolve(&report);
    normalize(&mut report, routing, bucket, &submission.language);

    info!(
        "Image analysis complete: category='{}', priority={}, bucket={:?}",
        report.category, report.priority, bucket
    );
    Ok(report)
}

/// Rewrites free-text notes into a letter. Every failure collapses to `ManualAnalysis`.
pub async fn analyze_manual(
    model: &dyn GenerativeModel,
    routing: &RoutingTable,
    submission: &ManualSubmission,
) -> Result<Report, AppError> {
    let prompt = build_manual_prompt(
        routing,
        &submission.category,
        &submission.description,
        &submission.location,
        &submission.language,
    );

    let text = model
        .generate(&prompt, None)
        .await
        .map_err(|e| AppError::ManualAnalysis(e.to_string()))?;

    let mut report: Report = parse_json_reply(&text)
        .map_err(|e| AppError::ManualAnalysis(format!("invalid JSON from model: {e}; raw: {text}")))?;

    report.category = submission.category.clone();

    let bucket = manual_bucket(routing, submission);
    normalize(&mut report, routing, bucket, &submission.language);

    if !report.email_draft.body.contains(&submission.location) {
        report
            .email_draft
            .body
            .push_str(&format!("\n\nLocation: {}", submission.location));
    }

    info!(
        "Manual analysis complete: category='{}', priority={}, bucket={:?}",
        report.category, report.priority, bucket
    );
    Ok(report)
}

/// Caller's category first, then the description; never the model's choice.
fn manual_bucket(routing: &RoutingTable, submission: &ManualSubmission) -> Bucket {
    match routing.bucket_for_category(&submission.category) {
        Bucket::Municipal => routing.bucket_for_category(&submission.description),
        bucket => bucket,
    }
}

fn normalize(report: &mut Report, routing: &RoutingTable, bucket: Bucket, language: &str) {
    for correction in routing.enforce(report, bucket) {
        warn!(
            "Model returned {}='{}' outside the routing table; replaced with '{}'",
            correction.field, correction.model_value, correction.canonical_value
        );
    }

    let salutation = formal_salutation(language);
    if report.email_draft.enforce_salutation(salutation) {
        warn!("Model letter used an informal salutation or lacked the formal one; corrected");
    }
    if !report.email_draft.is_formal(salutation) {
        warn!("Model letter still mentions '{FORBIDDEN_SALUTATION}' outside a salutation");
    }
    if !report.email_draft.is_complete() {
        warn!("Model returned an incomplete email draft (empty subject or body)");
    }
}
