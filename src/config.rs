use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Crate-level constants
pub const APP_NAME: &str = "cardscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tunable heuristic constants for the scan pipeline.
///
/// The tie-break margin and early-exit threshold are observed values, not
/// derived ones; they are exposed here so deployments can calibrate them
/// against a labeled corpus instead of patching the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Domain-confidence gap (0-100 scale) under which two candidates are
    /// treated as statistically indistinguishable during arbitration.
    pub tie_break_margin: f32,

    /// Stop trying further (variant, engine) combinations once a candidate
    /// scores at least this domain confidence. Latency bound, not a
    /// correctness requirement.
    pub early_exit_confidence: f32,

    /// Results below this overall confidence are flagged `needs_review`.
    pub review_threshold: f32,

    /// Minimum `strsim::normalized_levenshtein` similarity for a vocabulary
    /// correction to be applied to a token.
    pub correction_cutoff: f64,

    /// Cap on residual unclassified lines kept as notes.
    pub max_notes: usize,

    /// Per-call timeout for the cloud vision engine. A timed-out call
    /// degrades to a zero-confidence result for that attempt.
    pub cloud_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tie_break_margin: 10.0,
            early_exit_confidence: 80.0,
            review_threshold: 60.0,
            correction_cutoff: 0.75,
            max_notes: 5,
            cloud_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_ordered_sensibly() {
        let cfg = ScanConfig::default();
        assert!(cfg.tie_break_margin > 0.0);
        assert!(cfg.review_threshold < cfg.early_exit_confidence);
        assert!(cfg.correction_cutoff > 0.5 && cfg.correction_cutoff < 1.0);
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = ScanConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_notes, cfg.max_notes);
        assert_eq!(back.cloud_timeout, cfg.cloud_timeout);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(APP_NAME, "cardscan");
    }
}
