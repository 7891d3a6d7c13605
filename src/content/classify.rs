use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Link,
    Email,
    Phone,
    NetworkCredential,
    PlainText,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Link => "Website Link",
            Category::Email => "Email Address",
            Category::Phone => "Phone Number",
            Category::NetworkCredential => "WiFi Network",
            Category::PlainText => "Text Content",
        }
    }
}

/// Absolute URL: scheme, `://`, non-empty authority, no whitespace.
fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$").expect("valid link pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("valid phone pattern"))
}

/// First match wins: link, email, phone, network credential, plain text.
pub fn classify(text: &str) -> Category {
    if link_pattern().is_match(text) {
        Category::Link
    } else if text.contains('@') && text.contains('.') {
        Category::Email
    } else if phone_pattern().is_match(text) {
        Category::Phone
    } else if text.starts_with("WIFI:") {
        Category::NetworkCredential
    } else {
        Category::PlainText
    }
}

/// Cut `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_owned(),
    }
}
