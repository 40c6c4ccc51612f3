//! Best-result selection across (variant, engine) candidates.
//!
//! Candidates are ranked by domain confidence. When the leader and a
//! runner-up sit within the tie-break margin, the higher-capacity engine
//! (neural or transformer) wins over classical OCR: at that distance the
//! scores are statistically indistinguishable and engine trust decides.
//! Selection never fails; an empty candidate set is a normal terminal
//! outcome surfaced to the caller as "no text recognized".

use std::cmp::Ordering;

use super::types::ScoredResult;
use crate::config::ScanConfig;

/// Pick the winning result, or `None` when no candidate produced usable
/// text with nonzero domain confidence.
pub fn select_best(candidates: Vec<ScoredResult>, config: &ScanConfig) -> Option<ScoredResult> {
    let mut usable: Vec<ScoredResult> = candidates
        .into_iter()
        .filter(|c| c.result.is_usable() && c.domain_confidence > 0.0)
        .collect();

    if usable.is_empty() {
        return None;
    }

    usable.sort_by(|a, b| {
        b.domain_confidence
            .partial_cmp(&a.domain_confidence)
            .unwrap_or(Ordering::Equal)
    });

    let top_confidence = usable[0].domain_confidence;
    if !usable[0].result.engine.is_high_capacity() {
        // Check the next two candidates for a high-capacity engine within
        // the margin.
        let preferred = usable
            .iter()
            .take(3)
            .skip(1)
            .position(|c| {
                c.result.engine.is_high_capacity()
                    && top_confidence - c.domain_confidence <= config.tie_break_margin
            })
            .map(|offset| offset + 1);

        if let Some(idx) = preferred {
            let chosen = usable.swap_remove(idx);
            tracing::debug!(
                method = %chosen.method,
                confidence = chosen.domain_confidence,
                displaced_confidence = top_confidence,
                "tie-break: preferring high-capacity engine"
            );
            return Some(chosen);
        }
    }

    Some(usable.swap_remove(0))
}
