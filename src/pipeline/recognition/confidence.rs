//! Business-card-domain confidence model.
//!
//! Raw engine confidence reflects recognition certainty, not whether the
//! recognized text is a plausible business card. This score is computed from
//! the text alone, independent of which engine produced it, and drives
//! arbitration across (variant, engine) candidates.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::parsing::vocab;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d(?:[\s().\-]?\d){6,}").unwrap());

static WEBSITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://|www\.)[^\s,]+|\b[a-z0-9][a-z0-9-]*\.(?:com|net|org|io|co|in|biz)\b")
        .unwrap()
});

static NAME_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(?:\s[A-Z][a-z]*\.?){1,3}$").unwrap());

const BASE_SCORE: f32 = 10.0;

/// Coarse quality rating derived from word count and alphabetic ratio.
/// Anything below `Good` routes the scan to human review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextQuality {
    Poor,
    Fair,
    Good,
}

impl TextQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextQuality::Poor => "poor",
            TextQuality::Fair => "fair",
            TextQuality::Good => "good",
        }
    }
}

/// Score how business-card-like a block of text reads, on a 0-100 scale.
///
/// Pure and reproducible: the same text always yields the same score.
/// Empty or whitespace-only text scores 0.
pub fn domain_confidence(text: &str) -> f32 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let mut score = BASE_SCORE;
    score += pattern_bonus(text);
    score += word_count_bonus(text);
    score += alpha_ratio(text) * 10.0;
    score += vocabulary_bonus(text);

    score.clamp(0.0, 100.0)
}

/// Weighted, per-category-capped pattern bonuses. Emails are the strongest
/// card signal, then phones and websites; keyword-based categories are
/// weaker and capped low so repetitive matches cannot dominate.
fn pattern_bonus(text: &str) -> f32 {
    let mut bonus = 0.0;

    bonus += (EMAIL_RE.find_iter(text).count() as f32 * 15.0).min(30.0);
    bonus += (PHONE_RE.find_iter(text).count() as f32 * 10.0).min(20.0);
    bonus += (WEBSITE_RE.find_iter(text).count() as f32 * 8.0).min(16.0);

    let title_lines = text.lines().filter(|l| vocab::has_job_title_word(l)).count();
    bonus += (title_lines as f32 * 6.0).min(12.0);

    let company_lines = text
        .lines()
        .filter(|l| vocab::has_company_suffix(l) || vocab::has_business_descriptor(l))
        .count();
    bonus += (company_lines as f32 * 6.0).min(12.0);

    let name_lines = text
        .lines()
        .filter(|l| NAME_LINE_RE.is_match(l.trim()))
        .count();
    bonus += (name_lines as f32 * 4.0).min(8.0);

    let address_lines = text.lines().filter(|l| vocab::has_address_word(l)).count();
    bonus += (address_lines as f32 * 3.0).min(6.0);

    bonus
}

/// Cards carry 5-30 words. Fewer than 3 usually means a failed read; more
/// than 50 usually means the engine picked up surroundings.
fn word_count_bonus(text: &str) -> f32 {
    match text.split_whitespace().count() {
        0..=2 => -10.0,
        3..=4 => 5.0,
        5..=30 => 15.0,
        31..=50 => 5.0,
        _ => -10.0,
    }
}

/// Alphabetic share of non-whitespace characters, in [0,1].
pub fn alpha_ratio(text: &str) -> f32 {
    let visible: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if visible.is_empty() {
        return 0.0;
    }
    let alpha = visible.iter().filter(|c| c.is_alphabetic()).count();
    alpha as f32 / visible.len() as f32
}

fn vocabulary_bonus(text: &str) -> f32 {
    let lower = text.to_lowercase();
    let mut seen = 0u32;
    for word in vocab::correction_vocabulary() {
        if lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|token| token == word)
        {
            seen += 1;
        }
    }
    (seen as f32 * 2.0).min(10.0)
}

/// Rate readability of the fused text. Used for the `needs_review` flag,
/// not for arbitration.
pub fn rate_text_quality(text: &str) -> TextQuality {
    let words = text.split_whitespace().count();
    let ratio = alpha_ratio(text);

    if words >= 5 && ratio >= 0.55 {
        TextQuality::Good
    } else if words >= 3 && ratio >= 0.35 {
        TextQuality::Fair
    } else {
        TextQuality::Poor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_CARD: &str = "Sarah Johnson\nMarketing Director\nInnovateTech Solutions\nsarah.johnson@innovatetech.com\n+1-555-987-6543\nwww.innovatetech.com\n456 Innovation Ave, Tech City, CA 90210";

    #[test]
    fn empty_text_scores_zero() {
        assert_eq!(domain_confidence(""), 0.0);
        assert_eq!(domain_confidence("   \n\t  "), 0.0);
    }

    #[test]
    fn score_stays_in_range() {
        let inputs = [
            "",
            "a",
            "@@@@ ####",
            CLEAN_CARD,
            &CLEAN_CARD.repeat(10),
            "9876543210",
            &"word ".repeat(200),
        ];
        for input in inputs {
            let score = domain_confidence(input);
            assert!(
                (0.0..=100.0).contains(&score),
                "score {score} out of range for {input:?}"
            );
        }
    }

    #[test]
    fn score_is_reproducible() {
        assert_eq!(domain_confidence(CLEAN_CARD), domain_confidence(CLEAN_CARD));
    }

    #[test]
    fn clean_card_scores_high() {
        let score = domain_confidence(CLEAN_CARD);
        assert!(score > 70.0, "expected high score, got {score}");
    }

    #[test]
    fn card_text_outscores_prose() {
        let prose = "the meeting was postponed until further notice because of weather";
        assert!(domain_confidence(CLEAN_CARD) > domain_confidence(prose));
    }

    #[test]
    fn email_is_the_strongest_single_signal() {
        let with_email = "contact us\nsales@acme.com\nthanks";
        let with_address = "contact us\n12 Station Road\nthanks";
        assert!(domain_confidence(with_email) > domain_confidence(with_address));
    }

    #[test]
    fn repeated_matches_are_capped() {
        let two = "a@b.com c@d.com\nsome more words here now";
        let ten = "a@b.com c@d.com e@f.com g@h.com i@j.com k@l.com m@n.com o@p.com q@r.com s@t.com\nsome more words here now";
        let diff = domain_confidence(ten) - domain_confidence(two);
        // Eight extra emails must not add another eight email bonuses.
        assert!(diff < 20.0, "uncapped email bonus, diff {diff}");
    }

    #[test]
    fn very_long_text_is_penalized() {
        let card = "Ravi Kumar\nDirector\nravi@acme.in\n9876543210";
        let padded = format!("{card}\n{}", "noise ".repeat(80));
        assert!(domain_confidence(card) > domain_confidence(&padded));
    }

    #[test]
    fn phone_only_text_scores_low_but_nonzero() {
        let score = domain_confidence("9876543210");
        assert!(score > 0.0);
        assert!(score < 40.0, "bare phone should not look like a full card: {score}");
    }

    #[test]
    fn alpha_ratio_basics() {
        assert_eq!(alpha_ratio(""), 0.0);
        assert_eq!(alpha_ratio("12345"), 0.0);
        assert_eq!(alpha_ratio("abcde"), 1.0);
        let mixed = alpha_ratio("abc12");
        assert!((mixed - 0.6).abs() < f32::EPSILON);
    }

    #[test]
    fn quality_rating_bands() {
        assert_eq!(rate_text_quality(""), TextQuality::Poor);
        assert_eq!(rate_text_quality("9876543210"), TextQuality::Poor);
        assert_eq!(rate_text_quality("one two 333 444"), TextQuality::Fair);
        assert_eq!(rate_text_quality(CLEAN_CARD), TextQuality::Good);
    }

    #[test]
    fn phone_regex_requires_a_real_run() {
        assert!(PHONE_RE.is_match("+91 98765 43210"));
        assert!(PHONE_RE.is_match("(555) 987-6543"));
        assert!(!PHONE_RE.is_match("CA 90210"));
        assert!(!PHONE_RE.is_match("12"));
    }
}
