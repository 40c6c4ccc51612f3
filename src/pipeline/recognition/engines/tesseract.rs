//! Classical OCR via the tesseract command-line binary.
//!
//! The binary is the widest-available backend and needs no native linking;
//! the variant image is written to a temp file and read back from stdout.
//! Tesseract's own mean confidence is not exposed on the stdout path, so
//! the adapter scores output with the shared text-quality heuristic; there
//! is no per-line filter for this engine.

use std::process::Command;

use super::heuristic_confidence;
use crate::pipeline::recognition::types::{EngineKind, EngineResult, ImageVariant, OcrEngine};
use crate::pipeline::recognition::RecognitionError;

pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }

    /// Set recognition language(s), e.g. "eng" or "eng+hin".
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Classical
    }

    fn is_available(&self) -> bool {
        which::which("tesseract").is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "tesseract binary found on PATH".to_string()
        } else {
            "tesseract not installed (apt install tesseract-ocr)".to_string()
        }
    }

    fn try_recognize(&self, variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
        let temp = tempfile::Builder::new()
            .prefix("cardscan-")
            .suffix(".png")
            .tempfile()?;
        variant
            .image
            .save(temp.path())
            .map_err(|e| RecognitionError::EngineProcessing(format!("writing variant: {e}")))?;

        let output = Command::new("tesseract")
            .arg(temp.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecognitionError::EngineInit(
                    "tesseract binary not found".to_string(),
                ));
            }
            Err(e) => return Err(RecognitionError::Io(e)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError::EngineProcessing(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let confidence = heuristic_confidence(&text);

        tracing::debug!(
            variant = variant.kind.as_str(),
            text_len = text.len(),
            confidence,
            "tesseract read complete"
        );

        Ok(EngineResult::new(text, confidence, EngineKind::Classical)
            .with_diagnostic("language", self.language.clone()))
    }
}
