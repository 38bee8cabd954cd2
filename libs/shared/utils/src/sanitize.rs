use regex::Regex;
use std::sync::OnceLock;

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<\s*script[^>]*>.*?<\s*/\s*script\s*>|<\s*script[^>]*>").unwrap()
    })
}

/// Neutralizes markup in free-text input before it reaches storage.
/// Script blocks are dropped outright, then the remainder is entity-encoded.
pub fn sanitize_text(input: &str) -> String {
    let stripped = script_pattern().replace_all(input.trim(), "");

    stripped
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

    re.is_match(email) && email.len() <= 254
}

pub fn is_valid_phone(phone: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^\+?[1-9]\d{1,14}$|^\+?\d{1,4}[\s\-\.\(\)]*\d{1,14}$").unwrap()
    });

    re.is_match(phone)
}
