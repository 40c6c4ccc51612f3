//! Neural OCR reader backed by the pure-Rust ocrs engine.
//!
//! Detection and recognition models are rten files loaded from disk. The
//! engine handle is initialized once and reused across scans; failed
//! initialization is remembered so it is not retried per request. Lines the
//! recognizer cannot read come back as `None` and are dropped (this
//! adapter's low-confidence filter), and the recognized-line ratio feeds
//! the reported confidence.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;

use super::heuristic_confidence;
use crate::pipeline::recognition::types::{EngineKind, EngineResult, ImageVariant, OcrEngine};
use crate::pipeline::recognition::RecognitionError;

pub struct NeuralEngine {
    detection_model: PathBuf,
    recognition_model: PathBuf,
    engine: OnceLock<Option<Arc<OcrsEngine>>>,
}

impl NeuralEngine {
    pub fn new(detection_model: impl Into<PathBuf>, recognition_model: impl Into<PathBuf>) -> Self {
        Self {
            detection_model: detection_model.into(),
            recognition_model: recognition_model.into(),
            engine: OnceLock::new(),
        }
    }

    fn load(detection: &Path, recognition: &Path) -> Result<OcrsEngine, RecognitionError> {
        let detection_model = Model::load_file(detection)
            .map_err(|e| RecognitionError::EngineInit(format!("detection model: {e}")))?;
        let recognition_model = Model::load_file(recognition)
            .map_err(|e| RecognitionError::EngineInit(format!("recognition model: {e}")))?;

        OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| RecognitionError::EngineInit(e.to_string()))
    }

    fn engine(&self) -> Option<&Arc<OcrsEngine>> {
        self.engine
            .get_or_init(|| {
                match Self::load(&self.detection_model, &self.recognition_model) {
                    Ok(engine) => Some(Arc::new(engine)),
                    Err(e) => {
                        tracing::warn!(error = %e, "neural engine initialization failed");
                        None
                    }
                }
            })
            .as_ref()
    }
}

impl OcrEngine for NeuralEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Neural
    }

    fn is_available(&self) -> bool {
        self.detection_model.exists() && self.recognition_model.exists()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "ocrs models present".to_string()
        } else {
            format!(
                "ocrs models missing ({} / {})",
                self.detection_model.display(),
                self.recognition_model.display()
            )
        }
    }

    fn try_recognize(&self, variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
        let engine = self.engine().ok_or_else(|| {
            RecognitionError::EngineInit("ocrs models failed to load".to_string())
        })?;

        let source = ImageSource::from_bytes(variant.image.as_raw(), variant.image.dimensions())
            .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
        let input = engine
            .prepare_input(source)
            .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;

        let word_rects = engine
            .detect_words(&input)
            .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
        let line_rects = engine.find_text_lines(&input, &word_rects);
        let line_texts = engine
            .recognize_text(&input, &line_rects)
            .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;

        let detected = line_texts.len();
        let lines: Vec<String> = line_texts
            .into_iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|line| !line.trim().is_empty())
            .collect();
        let recognized = lines.len();
        let text = lines.join("\n");

        let confidence = if detected == 0 {
            0.0
        } else {
            let ratio = recognized as f32 / detected as f32;
            (ratio * 60.0 + heuristic_confidence(&text) * 0.4).min(95.0)
        };

        tracing::debug!(
            variant = variant.kind.as_str(),
            detected,
            recognized,
            confidence,
            "neural read complete"
        );

        Ok(EngineResult::new(text, confidence, EngineKind::Neural)
            .with_diagnostic("detected_lines", detected.to_string())
            .with_diagnostic("recognized_lines", recognized.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::recognition::types::{reason, VariantKind};
    use image::GrayImage;

    #[test]
    fn unavailable_without_model_files() {
        let engine = NeuralEngine::new("/nonexistent/det.rten", "/nonexistent/rec.rten");
        assert!(!engine.is_available());
        assert!(engine.availability_hint().contains("missing"));

        let variant = ImageVariant {
            image: GrayImage::new(8, 8),
            kind: VariantKind::Identity,
        };
        let result = engine.recognize(&variant);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.diagnostics.get("reason").map(String::as_str),
            Some(reason::ENGINE_UNAVAILABLE)
        );
    }
}
