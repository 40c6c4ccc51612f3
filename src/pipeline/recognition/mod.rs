pub mod types;
pub mod preprocess;
pub mod sanitize;
pub mod confidence;
pub mod correction;
pub mod arbitration;
pub mod engines;
pub mod registry;
pub mod orchestrator;

pub use types::*;
pub use preprocess::*;
pub use sanitize::*;
pub use confidence::*;
pub use correction::*;
pub use arbitration::*;
pub use registry::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decoding failed: {0}")]
    ImageDecode(String),

    #[error("engine initialization failed: {0}")]
    EngineInit(String),

    #[error("engine processing failed: {0}")]
    EngineProcessing(String),

    #[error("cloud request failed: {0}")]
    CloudTransport(String),

    #[error("cloud response malformed: {0}")]
    MalformedResponse(String),
}
