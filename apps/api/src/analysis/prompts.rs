//! Prompt builders for the two analysis paths.
//!
//! Both prompts embed the routing table rendered from `RoutingTable::prompt_block`,
//! so the contacts the model sees are exactly the ones validated afterwards.

use civicflow_core::report::{formal_salutation, FORBIDDEN_SALUTATION};
use civicflow_core::RoutingTable;

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, REPORT_JSON_SHAPE, ROUTING_CONSTRAINTS};

const IMAGE_PROMPT_TEMPLATE: &str = r#"You are 'CivicFlow AI', an intelligent civic assistant for Udaipur City.
Look at the attached photo of a civic issue reported at: {location}

**STRICT DATA CONSTRAINTS:**
{constraints}

**ROUTING LOGIC (COPY THESE EXACTLY):**
{routing}

**GENERATION RULES:**
1. Language: Generate the response in {language} ONLY.
2. Tone: Extremely formal. The email body MUST start with "{salutation}".
3. Forbidden Word: "{forbidden}". Never use it anywhere in the letter.
4. Mention the location "{location}" in the email body.

**Output JSON Structure:**
{shape}

{json_only}"#;

const MANUAL_PROMPT_TEMPLATE: &str = r#"You are an expert government liaison officer for Udaipur City.

**ROUTING LOGIC (USE EXACTLY):**
{routing}

**STRICT DATA CONSTRAINTS:**
{constraints}

**YOUR TASK:**
1. Analyze the citizen's notes: "{description}" (Category: {category}).
2. Select the correct recipient details from the routing logic above. DO NOT HALLUCINATE EMAILS.
3. Rewrite the notes into a formal complaint letter in {language}.
4. Assign a priority of High, Medium or Low.
5. The email body MUST start with "{salutation}", must never contain the word "{forbidden}",
   and must include the line "Location: {location}".
6. Keep "category" exactly as "{category}".

**Return STRICT JSON:**
{shape}

{json_only}"#;

/// Prompt for `/analyze`: the image travels as a separate inline part.
pub fn build_image_prompt(routing: &RoutingTable, location: &str, language: &str) -> String {
    let shape = REPORT_JSON_SHAPE
        .replace("{category_hint}", &format!("String (Translated to {language})"))
        .replace("{language}", language);

    IMAGE_PROMPT_TEMPLATE
        .replace("{constraints}", ROUTING_CONSTRAINTS)
        .replace("{routing}", &routing.prompt_block())
        .replace("{salutation}", formal_salutation(language))
        .replace("{forbidden}", FORBIDDEN_SALUTATION)
        .replace("{shape}", &shape)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{language}", language)
        .replace("{location}", location)
}

/// Prompt for `/manual-analyze`: text only, category pinned.
pub fn build_manual_prompt(
    routing: &RoutingTable,
    category: &str,
    description: &str,
    location: &str,
    language: &str,
) -> String {
    let shape = REPORT_JSON_SHAPE
        .replace("{category_hint}", category)
        .replace("{language}", language);

    // Description goes last: it must never expand placeholders.
    MANUAL_PROMPT_TEMPLATE
        .replace("{constraints}", ROUTING_CONSTRAINTS)
        .replace("{routing}", &routing.prompt_block())
        .replace("{salutation}", formal_salutation(language))
        .replace("{forbidden}", FORBIDDEN_SALUTATION)
        .replace("{shape}", &shape)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{language}", language)
        .replace("{location}", location)
        .replace("{category}", category)
        .replace("{description}", description)
}
