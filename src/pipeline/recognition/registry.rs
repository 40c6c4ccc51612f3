//! Engine registry: the capability-tagged set of OCR backends.
//!
//! Constructed once at process start and passed into the pipeline, so there
//! is no hidden global engine state and tests can inject scripted engines.
//! One handle per engine kind; absence of a backend is an ordinary `None`,
//! never an error path.

use super::engines::{CloudVisionEngine, TesseractEngine};
use super::types::{EngineKind, OcrEngine};
use crate::config::ScanConfig;

/// Environment variables pointing at optional local model files.
#[cfg(feature = "ocr-neural")]
const DETECTION_MODEL_ENV: &str = "CARDSCAN_DETECTION_MODEL";
#[cfg(feature = "ocr-neural")]
const RECOGNITION_MODEL_ENV: &str = "CARDSCAN_RECOGNITION_MODEL";
#[cfg(feature = "ocr-transformer")]
const TROCR_DIR_ENV: &str = "CARDSCAN_TROCR_DIR";

#[derive(Default)]
pub struct EngineRegistry {
    engines: Vec<Box<dyn OcrEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// The standard process-start registry: classical and cloud always
    /// registered (each reports its own availability), the model-backed
    /// engines when their builds and model locations are configured.
    pub fn with_default_engines(config: &ScanConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TesseractEngine::new()));
        registry.register(Box::new(CloudVisionEngine::from_env(config.cloud_timeout)));

        #[cfg(feature = "ocr-neural")]
        if let (Ok(detection), Ok(recognition)) = (
            std::env::var(DETECTION_MODEL_ENV),
            std::env::var(RECOGNITION_MODEL_ENV),
        ) {
            registry.register(Box::new(super::engines::NeuralEngine::new(
                detection,
                recognition,
            )));
        }

        #[cfg(feature = "ocr-transformer")]
        if let Ok(dir) = std::env::var(TROCR_DIR_ENV) {
            registry.register(Box::new(super::engines::TransformerEngine::new(dir)));
        }

        registry
    }

    /// Register a backend. At most one handle per engine kind; a later
    /// registration replaces the earlier one, which is how tests substitute
    /// fakes for the defaults.
    pub fn register(&mut self, engine: Box<dyn OcrEngine>) {
        self.engines.retain(|e| e.kind() != engine.kind());
        self.engines.push(engine);
    }

    pub fn with_engine(mut self, engine: Box<dyn OcrEngine>) -> Self {
        self.register(engine);
        self
    }

    pub fn get(&self, kind: EngineKind) -> Option<&dyn OcrEngine> {
        self.engines
            .iter()
            .find(|e| e.kind() == kind)
            .map(|e| e.as_ref())
    }

    pub fn engines(&self) -> impl Iterator<Item = &dyn OcrEngine> {
        self.engines.iter().map(|e| e.as_ref())
    }

    /// Backends that can actually run right now.
    pub fn available(&self) -> impl Iterator<Item = &dyn OcrEngine> {
        self.engines().filter(|e| e.is_available())
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::recognition::engines::MockEngine;

    #[test]
    fn starts_empty() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(EngineKind::Classical).is_none());
    }

    #[test]
    fn registration_replaces_same_kind() {
        let mut registry = EngineRegistry::new();
        registry.register(Box::new(MockEngine::new(EngineKind::Classical, "old", 10.0)));
        registry.register(Box::new(MockEngine::new(EngineKind::Classical, "new", 20.0)));
        assert_eq!(registry.len(), 1);

        let engine = registry.get(EngineKind::Classical).unwrap();
        assert_eq!(engine.kind(), EngineKind::Classical);
    }

    #[test]
    fn available_filters_unavailable_engines() {
        let registry = EngineRegistry::new()
            .with_engine(Box::new(MockEngine::new(EngineKind::Classical, "text", 50.0)))
            .with_engine(Box::new(MockEngine::unavailable(EngineKind::Cloud)));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.available().count(), 1);
        assert_eq!(
            registry.available().next().unwrap().kind(),
            EngineKind::Classical
        );
    }

    #[test]
    fn default_registry_carries_classical_and_cloud() {
        let registry = EngineRegistry::with_default_engines(&ScanConfig::default());
        assert!(registry.get(EngineKind::Classical).is_some());
        assert!(registry.get(EngineKind::Cloud).is_some());
    }
}
