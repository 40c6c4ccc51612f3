use std::collections::BTreeMap;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use super::RecognitionError;

/// Which physical side of the card an image shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSide {
    Front,
    Back,
}

impl CardSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardSide::Front => "front",
            CardSide::Back => "back",
        }
    }
}

/// One preprocessed version of an input image.
///
/// Variants are produced in a fixed order (identity first) so downstream
/// arbitration can early-exit on the cheapest one that scores well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Identity,
    ContrastEqualized,
    Sharpened,
    Denoised,
    Thresholded,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Identity => "identity",
            VariantKind::ContrastEqualized => "contrast_equalized",
            VariantKind::Sharpened => "sharpened",
            VariantKind::Denoised => "denoised",
            VariantKind::Thresholded => "thresholded",
        }
    }
}

/// A preprocessed grayscale image plus the transform that produced it.
/// The source image is never mutated; each variant owns its own buffer.
pub struct ImageVariant {
    pub image: GrayImage,
    pub kind: VariantKind,
}

/// Available OCR engine families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Classical OCR via the tesseract command-line binary.
    Classical,
    /// Neural-network OCR reader (ocrs).
    Neural,
    /// Transformer encoder-decoder OCR via ONNX Runtime.
    Transformer,
    /// Cloud vision-language model OCR.
    Cloud,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Classical => "classical",
            EngineKind::Neural => "neural",
            EngineKind::Transformer => "transformer",
            EngineKind::Cloud => "cloud",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classical" | "tesseract" => Some(EngineKind::Classical),
            "neural" | "ocrs" => Some(EngineKind::Neural),
            "transformer" | "trocr" => Some(EngineKind::Transformer),
            "cloud" => Some(EngineKind::Cloud),
            _ => None,
        }
    }

    /// Whether this engine sends work to a remote API rather than running
    /// locally. Remote engines carry a per-call timeout.
    pub fn is_remote(&self) -> bool {
        matches!(self, EngineKind::Cloud)
    }

    /// Higher-capacity engines are preferred by arbitration when domain
    /// confidences are within the tie-break margin.
    pub fn is_high_capacity(&self) -> bool {
        matches!(self, EngineKind::Neural | EngineKind::Transformer)
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic reason codes attached to zero-confidence results.
pub mod reason {
    /// Backend not installed / not initialized. Permanent for the process.
    pub const ENGINE_UNAVAILABLE: &str = "engine-unavailable";
    /// Backend ran but crashed or produced nothing usable.
    pub const ENGINE_FAILED: &str = "engine-failed";
    /// Network / timeout / authentication failure calling a remote engine.
    pub const CLOUD_TRANSPORT: &str = "cloud-transport";
    /// Remote engine answered with output that is not valid structured text.
    pub const MALFORMED_RESPONSE: &str = "malformed-response";
}

/// Normalized output of one engine applied to one image variant.
///
/// `confidence` is the engine's own recognition certainty on a 0-100 scale
/// (averaged per-line where the backend reports it, synthesized from text
/// quality where it does not). Zero confidence with empty text means "no
/// usable output", which is an expected outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResult {
    pub text: String,
    pub confidence: f32,
    pub engine: EngineKind,
    pub diagnostics: BTreeMap<String, String>,
}

impl EngineResult {
    pub fn new(text: String, confidence: f32, engine: EngineKind) -> Self {
        Self {
            text,
            confidence: confidence.clamp(0.0, 100.0),
            engine,
            diagnostics: BTreeMap::new(),
        }
    }

    /// A "no usable output" result tagged with a reason code.
    pub fn unusable(engine: EngineKind, reason: &str) -> Self {
        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("reason".to_string(), reason.to_string());
        Self {
            text: String::new(),
            confidence: 0.0,
            engine,
            diagnostics,
        }
    }

    pub fn with_diagnostic(mut self, key: &str, value: impl Into<String>) -> Self {
        self.diagnostics.insert(key.to_string(), value.into());
        self
    }

    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// An engine result augmented with the business-card-domain confidence used
/// for arbitration. The two confidences are distinct stages: the engine's
/// reflects recognition certainty, the domain score reflects how
/// card-like the text reads. They are never conflated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredResult {
    pub result: EngineResult,
    pub domain_confidence: f32,
    /// Provenance, `"<engine>+<variant>"`, kept for debugging and surfaced
    /// to the caller as `scan_method`.
    pub method: String,
}

impl ScoredResult {
    pub fn new(result: EngineResult, domain_confidence: f32, variant: VariantKind) -> Self {
        let method = format!("{}+{}", result.engine.as_str(), variant.as_str());
        Self {
            result,
            domain_confidence: domain_confidence.clamp(0.0, 100.0),
            method,
        }
    }
}

/// OCR engine abstraction. Implementations wrap one backend each and
/// normalize its output to [`EngineResult`].
///
/// `recognize` never fails: unavailability and backend exceptions are
/// absorbed into a zero-confidence result carrying a reason diagnostic,
/// because engine absence is an expected condition. Adapters never retry;
/// retry policy for remote engines belongs to the caller.
pub trait OcrEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Whether the backend can actually run (binary installed, models
    /// present, API key configured).
    fn is_available(&self) -> bool;

    /// Human-readable description of what is needed to enable the backend.
    fn availability_hint(&self) -> String;

    /// Backend invocation proper. Errors here are converted by
    /// [`OcrEngine::recognize`]; implementations should not degrade errors
    /// themselves.
    fn try_recognize(&self, variant: &ImageVariant) -> Result<EngineResult, RecognitionError>;

    fn recognize(&self, variant: &ImageVariant) -> EngineResult {
        if !self.is_available() {
            return EngineResult::unusable(self.kind(), reason::ENGINE_UNAVAILABLE)
                .with_diagnostic("hint", self.availability_hint());
        }

        match self.try_recognize(variant) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    engine = %self.kind(),
                    variant = variant.kind.as_str(),
                    error = %err,
                    "engine failed, degrading to zero confidence"
                );
                let code = match &err {
                    RecognitionError::CloudTransport(_) => reason::CLOUD_TRANSPORT,
                    RecognitionError::MalformedResponse(_) => reason::MALFORMED_RESPONSE,
                    _ => reason::ENGINE_FAILED,
                };
                EngineResult::unusable(self.kind(), code).with_diagnostic("error", err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn kind(&self) -> EngineKind {
            EngineKind::Classical
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "always available".into()
        }

        fn try_recognize(&self, _variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
            Err(RecognitionError::EngineProcessing("boom".into()))
        }
    }

    struct AbsentEngine;

    impl OcrEngine for AbsentEngine {
        fn kind(&self) -> EngineKind {
            EngineKind::Neural
        }

        fn is_available(&self) -> bool {
            false
        }

        fn availability_hint(&self) -> String {
            "models not downloaded".into()
        }

        fn try_recognize(&self, _variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
            unreachable!("recognize must short-circuit on unavailability")
        }
    }

    fn blank_variant() -> ImageVariant {
        ImageVariant {
            image: GrayImage::new(8, 8),
            kind: VariantKind::Identity,
        }
    }

    #[test]
    fn engine_error_degrades_to_zero_confidence() {
        let result = FailingEngine.recognize(&blank_variant());
        assert_eq!(result.confidence, 0.0);
        assert!(result.text.is_empty());
        assert_eq!(
            result.diagnostics.get("reason").map(String::as_str),
            Some(reason::ENGINE_FAILED)
        );
        assert!(result.diagnostics.get("error").unwrap().contains("boom"));
    }

    #[test]
    fn unavailable_engine_never_invoked() {
        let result = AbsentEngine.recognize(&blank_variant());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.diagnostics.get("reason").map(String::as_str),
            Some(reason::ENGINE_UNAVAILABLE)
        );
    }

    #[test]
    fn cloud_errors_carry_transport_reason() {
        struct CloudFail;
        impl OcrEngine for CloudFail {
            fn kind(&self) -> EngineKind {
                EngineKind::Cloud
            }
            fn is_available(&self) -> bool {
                true
            }
            fn availability_hint(&self) -> String {
                String::new()
            }
            fn try_recognize(
                &self,
                _variant: &ImageVariant,
            ) -> Result<EngineResult, RecognitionError> {
                Err(RecognitionError::CloudTransport("timed out".into()))
            }
        }

        let result = CloudFail.recognize(&blank_variant());
        assert_eq!(
            result.diagnostics.get("reason").map(String::as_str),
            Some(reason::CLOUD_TRANSPORT)
        );
    }

    #[test]
    fn confidence_is_clamped_to_scale() {
        let r = EngineResult::new("text".into(), 140.0, EngineKind::Cloud);
        assert_eq!(r.confidence, 100.0);
        let r = EngineResult::new("text".into(), -3.0, EngineKind::Cloud);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn method_records_engine_and_variant() {
        let scored = ScoredResult::new(
            EngineResult::new("Acme".into(), 70.0, EngineKind::Neural),
            55.0,
            VariantKind::Sharpened,
        );
        assert_eq!(scored.method, "neural+sharpened");
    }

    #[test]
    fn engine_kind_parse_accepts_aliases() {
        assert_eq!(EngineKind::parse("tesseract"), Some(EngineKind::Classical));
        assert_eq!(EngineKind::parse("OCRS"), Some(EngineKind::Neural));
        assert_eq!(EngineKind::parse("trocr"), Some(EngineKind::Transformer));
        assert_eq!(EngineKind::parse("cloud"), Some(EngineKind::Cloud));
        assert_eq!(EngineKind::parse("abacus"), None);
    }

    #[test]
    fn high_capacity_excludes_classical_and_cloud() {
        assert!(EngineKind::Neural.is_high_capacity());
        assert!(EngineKind::Transformer.is_high_capacity());
        assert!(!EngineKind::Classical.is_high_capacity());
        assert!(!EngineKind::Cloud.is_high_capacity());
    }
}
