//! Multi-engine OCR and field extraction for business cards.
//!
//! One scan request flows preprocessing variants through every registered
//! OCR engine, scores each read for business-card plausibility, arbitrates
//! a winner, repairs it against a business vocabulary, and parses the text
//! into typed contact fields. Output is always a structured
//! [`ScanOutcome`]; degraded paths (missing engines, unreadable images,
//! empty reads) are values, never faults.

pub mod config;
pub mod pipeline;

pub use config::ScanConfig;
pub use pipeline::parsing::ContactFields;
pub use pipeline::recognition::{
    CardScanner, EngineKind, EngineRegistry, EngineResult, OcrEngine, ScanFailure, ScanMode,
    ScanOutcome, ScanRequest,
};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the pipeline. Filter comes
/// from `RUST_LOG` when set. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardscan=info")),
        )
        .try_init();
}
