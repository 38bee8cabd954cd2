pub mod gemini;
pub mod triage;
