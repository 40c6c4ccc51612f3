//! Post-OCR correction of business vocabulary.
//!
//! Token-level fuzzy matching against the business dictionary (company-type
//! words, cities, titles, address components). Advisory normalization only:
//! a token is rewritten when it closely matches exactly one vocabulary
//! entry, and left alone otherwise, so proper nouns that merely resemble an
//! entry are never corrupted.

use strsim::normalized_levenshtein;

use crate::pipeline::parsing::vocab;

/// Apply vocabulary correction to every eligible token of `text`.
///
/// Eligible tokens are at least three characters and not purely numeric.
/// A correction is applied only when similarity reaches `cutoff` (0-1 scale)
/// with a unique best match. Running the function on already-corrected text
/// is a no-op, since corrected tokens match the vocabulary exactly.
pub fn correct_business_terms(text: &str, cutoff: f64) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word_buf = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word_buf.push(ch);
        } else {
            if !word_buf.is_empty() {
                result.push_str(&try_correct_token(&word_buf, cutoff));
                word_buf.clear();
            }
            result.push(ch);
        }
    }
    if !word_buf.is_empty() {
        result.push_str(&try_correct_token(&word_buf, cutoff));
    }

    result
}

fn try_correct_token(token: &str, cutoff: f64) -> String {
    if token.len() < 3 || token.chars().all(|c| c.is_numeric()) {
        return token.to_string();
    }

    let lower = token.to_lowercase();

    // Exact vocabulary hit needs no correction.
    if vocab::correction_vocabulary().any(|w| w == lower) {
        return token.to_string();
    }

    let mut best: Option<(&str, f64)> = None;
    let mut ambiguous = false;

    for word in vocab::correction_vocabulary() {
        // Length gate: entries differing by more than 2 chars cannot clear
        // the similarity cutoff for card-sized tokens.
        if (token.len() as i32 - word.len() as i32).abs() > 2 {
            continue;
        }

        let similarity = normalized_levenshtein(&lower, word);
        match best {
            Some((_, best_sim)) if similarity > best_sim => {
                best = Some((word, similarity));
                ambiguous = false;
            }
            Some((_, best_sim)) if (similarity - best_sim).abs() < f64::EPSILON => {
                ambiguous = true;
            }
            None => {
                best = Some((word, similarity));
                ambiguous = false;
            }
            _ => {}
        }
    }

    match best {
        Some((word, similarity)) if similarity >= cutoff && !ambiguous => {
            preserve_case(token, word)
        }
        _ => token.to_string(),
    }
}

/// Carry the original token's capitalization pattern onto the correction.
fn preserve_case(original: &str, correction: &str) -> String {
    if original.chars().all(|c| c.is_uppercase() || !c.is_alphabetic()) {
        return correction.to_uppercase();
    }

    if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = correction.chars();
        match chars.next() {
            Some(c) => {
                let mut s = c.to_uppercase().to_string();
                s.extend(chars);
                s
            }
            None => correction.to_string(),
        }
    } else {
        correction.to_string()
    }
}
