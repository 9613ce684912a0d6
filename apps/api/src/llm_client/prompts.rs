// Shared prompt fragments.
// The analysis prompts in analysis/prompts.rs are assembled from these.

/// Instruction that pins the reply to bare JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Instruction that keeps the model on the routing table.
pub const ROUTING_CONSTRAINTS: &str = "\
1. You MUST use the exact names, emails and phone numbers listed in the Routing Logic.
2. Do NOT invent new emails or phone numbers. Do NOT use '.gov.in' unless explicitly written below.
3. If a category does not match perfectly, use the \"Garbage / Roads / Streetlights / Others\" contact.";

/// Expected reply shape. `{language}` and `{category_hint}` are substituted by the caller.
pub const REPORT_JSON_SHAPE: &str = r#"{
  "category": "{category_hint}",
  "priority": "High/Medium/Low",
  "recipient_name": "String (Exact match from Routing Logic)",
  "recipient_email": "String (Exact match from Routing Logic)",
  "recipient_phone": "String (Exact match from Routing Logic)",
  "description": "String (1 sentence description in {language})",
  "eco_tip": "String (Eco tip in {language})",
  "email_draft": {
    "subject": "String (Formal subject in {language})",
    "body": "String (Formal complaint body in {language})"
  }
}"#;
