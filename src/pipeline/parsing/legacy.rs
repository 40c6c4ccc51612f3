//! The earliest extraction generation, kept as a last-resort fallback.
//!
//! Plain regex pulls of email/phone/website plus "first plausible line"
//! name detection. This is the one place a field may receive a placeholder:
//! when no name line is found, `name` is the literal `"Unknown"`. The
//! orchestrator only reaches this path when the full parser assigned
//! nothing at all to non-empty text.

use super::classify::{EMAIL_RE, PHONE_RE, URL_RE};
use super::extract::{normalize_phone, repair_website};
use super::types::ContactFields;
use super::vocab;

pub fn quick_extract(text: &str) -> ContactFields {
    let mut fields = ContactFields::default();

    fields.email = EMAIL_RE.find(text).map(|m| m.as_str().to_string());
    fields.mobile = PHONE_RE.find(text).map(|m| normalize_phone(m.as_str()));
    fields.website = text
        .lines()
        .find(|l| !l.contains('@') && URL_RE.is_match(&l.to_lowercase()))
        .and_then(repair_website);

    fields.name = Some(
        text.lines()
            .map(str::trim)
            .find(|l| is_plausible_name(l))
            .unwrap_or("Unknown")
            .to_string(),
    );

    fields
}

fn is_plausible_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    (2..=4).contains(&words.len())
        && words.iter().all(|w| {
            w.chars().all(|c| c.is_alphabetic() || c == '.' || c == '\'')
                && w.chars().next().is_some_and(|c| c.is_uppercase())
        })
        && !vocab::is_non_card_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_contact_patterns() {
        let fields = quick_extract("Ravi Kumar\nravi@acme.in\n9876543210\nwww.acme.in");
        assert_eq!(fields.name.as_deref(), Some("Ravi Kumar"));
        assert_eq!(fields.email.as_deref(), Some("ravi@acme.in"));
        assert_eq!(fields.mobile.as_deref(), Some("9876543210"));
        assert_eq!(fields.website.as_deref(), Some("https://www.acme.in"));
    }

    #[test]
    fn name_defaults_to_unknown() {
        let fields = quick_extract("!!! ??? ***");
        assert_eq!(fields.name.as_deref(), Some("Unknown"));
        assert!(fields.email.is_none());
    }

    #[test]
    fn keyboard_tokens_are_not_names() {
        let fields = quick_extract("Caps Lock\n9876543210");
        assert_eq!(fields.name.as_deref(), Some("Unknown"));
        assert_eq!(fields.mobile.as_deref(), Some("9876543210"));
    }
}
