//! Line classifier: assigns each line of fused OCR text to exactly one
//! category via an ordered rule list evaluated top to bottom.
//!
//! Order is load-bearing. Emails and phones are the least ambiguous signals
//! and must win before the looser company/name heuristics get a chance; a
//! bare label prefix ("Email:", "Tel.") is recognized first of all so it is
//! discarded instead of polluting the name pass.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::vocab;

pub(crate) static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

pub(crate) static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d(?:[\s().\-]?\d){6,}").unwrap());

pub(crate) static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.?)[^\s,]+|\b[a-z0-9][a-z0-9-]*\.(?:com|net|org|io|co|in|biz)(?:/[^\s,]*)?")
        .unwrap()
});

/// Six-digit postal code (PIN), the strongest address-continuation marker.
pub(crate) static PIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{6}\b").unwrap());

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:name|e-?mail|phone|mobile|cell|tel|telephone|fax|address|company|website|web|title|designation)\s*[:.]?$")
        .unwrap()
});

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z][A-Za-z'\-]*\.?\s){1,3}[A-Z][A-Za-z'\-]*\.?$").unwrap());

/// Category a line falls into. Exactly one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    /// A bare field-name prefix with no value; discarded outright.
    Label,
    Email,
    Phone,
    Website,
    Address,
    JobTitle,
    Company,
    Name,
    Unknown,
}

/// Classify one trimmed line. First matching rule wins.
pub fn classify_line(line: &str) -> LineCategory {
    let line = line.trim();
    if line.is_empty() {
        return LineCategory::Unknown;
    }

    if LABEL_RE.is_match(line) {
        return LineCategory::Label;
    }
    if line.contains('@') {
        return LineCategory::Email;
    }
    if is_phone_line(line) {
        return LineCategory::Phone;
    }
    if is_website_line(line) {
        return LineCategory::Website;
    }
    if is_address_line(line) {
        return LineCategory::Address;
    }
    if vocab::has_job_title_word(line) {
        return LineCategory::JobTitle;
    }
    if is_company_line(line) {
        return LineCategory::Company;
    }
    if is_name_line(line) {
        return LineCategory::Name;
    }
    LineCategory::Unknown
}

/// A phone line is digit-dominated: it has a 7+ digit run, and either more
/// digits than letters or a full 10+ digit number. The letter comparison
/// keeps addresses ("456 Innovation Ave … 90210") out.
fn is_phone_line(line: &str) -> bool {
    if !PHONE_RE.is_match(line) {
        return false;
    }
    let digits = line.chars().filter(|c| c.is_ascii_digit()).count();
    let alpha = line.chars().filter(|c| c.is_alphabetic()).count();
    digits >= 7 && (digits > alpha || digits >= 10)
}

fn is_website_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.starts_with("www") || lower.contains("http") || URL_RE.is_match(&lower)
}

fn is_address_line(line: &str) -> bool {
    vocab::has_address_word(line) || vocab::find_city(line).is_some() || PIN_RE.is_match(line)
}

fn is_company_line(line: &str) -> bool {
    if vocab::has_company_suffix(line) || vocab::has_business_descriptor(line) {
        return true;
    }
    // All-caps multi-word lines read as organization banners.
    let words: Vec<&str> = line.split_whitespace().collect();
    words.len() >= 2
        && line.chars().filter(|c| c.is_alphabetic()).count() >= 6
        && line
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(|c| c.is_uppercase())
        && !vocab::is_non_card_line(line)
}

/// Two to four capitalized alphabetic words, no digits, and not a line of
/// known non-card tokens (keyboard keys picked up from the photo edge).
fn is_name_line(line: &str) -> bool {
    if line.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    NAME_RE.is_match(line) && !vocab::is_non_card_line(line)
}
