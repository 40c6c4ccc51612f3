//! Scripted engine for tests: fixed responses per preprocessing variant,
//! switchable availability, and an invocation counter for early-exit
//! assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::pipeline::recognition::types::{
    EngineKind, EngineResult, ImageVariant, OcrEngine, VariantKind,
};
use crate::pipeline::recognition::RecognitionError;

pub struct MockEngine {
    kind: EngineKind,
    available: bool,
    default_response: (String, f32),
    variant_responses: HashMap<VariantKind, (String, f32)>,
    scripted: Mutex<VecDeque<(String, f32)>>,
    calls: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new(kind: EngineKind, text: &str, confidence: f32) -> Self {
        Self {
            kind,
            available: true,
            default_response: (text.to_string(), confidence),
            variant_responses: HashMap::new(),
            scripted: Mutex::new(VecDeque::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Engine that reports itself unavailable.
    pub fn unavailable(kind: EngineKind) -> Self {
        let mut engine = Self::new(kind, "", 0.0);
        engine.available = false;
        engine
    }

    /// Override the response for one specific variant.
    pub fn with_variant_response(mut self, variant: VariantKind, text: &str, confidence: f32) -> Self {
        self.variant_responses
            .insert(variant, (text.to_string(), confidence));
        self
    }

    /// Queue responses consumed one per invocation, ahead of the variant
    /// and default responses. Lets a test script different reads for the
    /// front and back sides of a card.
    pub fn with_scripted_responses(self, responses: Vec<(&str, f32)>) -> Self {
        if let Ok(mut scripted) = self.scripted.lock() {
            for (text, confidence) in responses {
                scripted.push_back((text.to_string(), confidence));
            }
        }
        self
    }

    /// Shared counter of `try_recognize` invocations.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl OcrEngine for MockEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn availability_hint(&self) -> String {
        if self.available {
            "mock engine is available".to_string()
        } else {
            "mock engine is configured unavailable".to_string()
        }
    }

    fn try_recognize(&self, variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut scripted) = self.scripted.lock() {
            if let Some((text, confidence)) = scripted.pop_front() {
                return Ok(EngineResult::new(text, confidence, self.kind));
            }
        }
        let (text, confidence) = self
            .variant_responses
            .get(&variant.kind)
            .unwrap_or(&self.default_response);
        Ok(EngineResult::new(text.clone(), *confidence, self.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn variant(kind: VariantKind) -> ImageVariant {
        ImageVariant {
            image: GrayImage::new(4, 4),
            kind,
        }
    }

    #[test]
    fn returns_configured_text() {
        let engine = MockEngine::new(EngineKind::Classical, "Acme Pvt Ltd", 82.0);
        let result = engine.recognize(&variant(VariantKind::Identity));
        assert_eq!(result.text, "Acme Pvt Ltd");
        assert_eq!(result.confidence, 82.0);
        assert_eq!(result.engine, EngineKind::Classical);
    }

    #[test]
    fn per_variant_override() {
        let engine = MockEngine::new(EngineKind::Neural, "default", 40.0)
            .with_variant_response(VariantKind::Thresholded, "sharper read", 88.0);
        assert_eq!(
            engine.recognize(&variant(VariantKind::Identity)).text,
            "default"
        );
        assert_eq!(
            engine.recognize(&variant(VariantKind::Thresholded)).text,
            "sharper read"
        );
    }

    #[test]
    fn unavailable_mock_reports_reason() {
        let engine = MockEngine::unavailable(EngineKind::Cloud);
        let result = engine.recognize(&variant(VariantKind::Identity));
        assert_eq!(result.confidence, 0.0);
        assert!(result.diagnostics.contains_key("reason"));
    }

    #[test]
    fn counts_invocations() {
        let engine = MockEngine::new(EngineKind::Classical, "text", 50.0);
        let counter = engine.call_counter();
        engine.recognize(&variant(VariantKind::Identity));
        engine.recognize(&variant(VariantKind::Sharpened));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
