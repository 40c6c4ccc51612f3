//! Engine adapters: one module per OCR backend, all normalized behind the
//! [`OcrEngine`](super::types::OcrEngine) contract.

pub mod cloud;
pub mod mock;
pub mod tesseract;

#[cfg(feature = "ocr-neural")]
pub mod neural;
#[cfg(feature = "ocr-transformer")]
pub mod transformer;

pub use cloud::CloudVisionEngine;
pub use mock::MockEngine;
pub use tesseract::TesseractEngine;

#[cfg(feature = "ocr-neural")]
pub use neural::NeuralEngine;
#[cfg(feature = "ocr-transformer")]
pub use transformer::TransformerEngine;

/// Synthesize an engine confidence (0-100) from text characteristics, for
/// backends that report no per-token scores (classical binary output,
/// transformer decoding, cloud responses).
///
/// Length carries the base signal; contact-shaped structure (an email, a
/// digit run, a URL, several lines) earns small bonuses. Capped at 95:
/// synthesized scores never claim certainty.
pub fn heuristic_confidence(text: &str) -> f32 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let base: f32 = match trimmed.len() {
        0..=29 => 20.0,
        30..=99 => 40.0,
        100..=249 => 60.0,
        _ => 75.0,
    };

    let has_email = trimmed.contains('@');
    let has_digit_run = trimmed
        .lines()
        .any(|l| l.chars().filter(|c| c.is_ascii_digit()).count() >= 7);
    let has_url = {
        let lower = trimmed.to_lowercase();
        lower.contains("www") || lower.contains("http") || lower.contains(".com")
    };
    let multi_line = trimmed.lines().count() >= 3;

    let bonus = if has_email { 8.0 } else { 0.0 }
        + if has_digit_run { 6.0 } else { 0.0 }
        + if has_url { 5.0 } else { 0.0 }
        + if multi_line { 4.0 } else { 0.0 };

    (base + bonus).min(95.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_zero() {
        assert_eq!(heuristic_confidence(""), 0.0);
        assert_eq!(heuristic_confidence("  \n "), 0.0);
    }

    #[test]
    fn longer_output_earns_more() {
        let short = heuristic_confidence("Acme");
        let long = heuristic_confidence(&"recognized line of text\n".repeat(12));
        assert!(long > short);
    }

    #[test]
    fn contact_structure_earns_bonuses() {
        let plain = "some recognized words without structure";
        let structured = "Ravi Kumar\nravi@acme.in\n9876543210\nwww.acme.in";
        assert!(heuristic_confidence(structured) > heuristic_confidence(plain));
    }

    #[test]
    fn capped_below_certainty() {
        let text = format!("a@b.com\n9876543210\nwww.acme.com\n{}", "x".repeat(500));
        assert!(heuristic_confidence(&text) <= 95.0);
    }
}
