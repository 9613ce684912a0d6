// Report analysis: the two relay endpoints and the shared analyze-and-normalize path.
// All model calls go through llm_client; no direct Gemini calls here.

pub mod handlers;
pub mod prompts;
pub mod service;
