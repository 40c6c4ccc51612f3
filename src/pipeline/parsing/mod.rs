pub mod types;
pub mod vocab;
pub mod classify;
pub mod extract;
pub mod legacy;

pub use types::*;
pub use classify::{classify_line, LineCategory};
pub use extract::extract_fields;
pub use legacy::quick_extract;
