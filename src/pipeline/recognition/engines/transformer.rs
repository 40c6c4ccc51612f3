//! Transformer encoder-decoder OCR via ONNX Runtime.
//!
//! Expects a TrOCR-style export in one directory: `encoder_model.onnx`,
//! `decoder_model.onnx`, `tokenizer.json`. Sessions are built once and
//! reused; decoding is greedy argmax without KV cache, which is plenty for
//! the short text a card carries. The model reports no token confidences,
//! so output is scored with the shared text-quality heuristic.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use ndarray::{Array2, Array3, Array4};
use ort::session::Session;
use ort::value::TensorRef;
use tokenizers::Tokenizer;

use super::heuristic_confidence;
use crate::pipeline::recognition::types::{EngineKind, EngineResult, ImageVariant, OcrEngine};
use crate::pipeline::recognition::RecognitionError;

const ENCODER_FILE: &str = "encoder_model.onnx";
const DECODER_FILE: &str = "decoder_model.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

const INPUT_SIZE: u32 = 384;
const MAX_DECODE_STEPS: usize = 64;
/// TrOCR exports use id 2 both to start decoding and to end it.
const DECODER_START_TOKEN: i64 = 2;
const EOS_TOKEN: i64 = 2;

pub struct TransformerEngine {
    model_dir: PathBuf,
    bundle: OnceLock<Option<Arc<TrocrBundle>>>,
}

struct TrocrBundle {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl TransformerEngine {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            bundle: OnceLock::new(),
        }
    }

    fn load(dir: &std::path::Path) -> Result<TrocrBundle, RecognitionError> {
        let encoder = Session::builder()
            .and_then(|b| b.commit_from_file(dir.join(ENCODER_FILE)))
            .map_err(|e| RecognitionError::EngineInit(format!("encoder session: {e}")))?;
        let decoder = Session::builder()
            .and_then(|b| b.commit_from_file(dir.join(DECODER_FILE)))
            .map_err(|e| RecognitionError::EngineInit(format!("decoder session: {e}")))?;
        let tokenizer = Tokenizer::from_file(dir.join(TOKENIZER_FILE))
            .map_err(|e| RecognitionError::EngineInit(format!("tokenizer: {e}")))?;

        Ok(TrocrBundle {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer,
        })
    }

    fn bundle(&self) -> Option<&Arc<TrocrBundle>> {
        self.bundle
            .get_or_init(|| match Self::load(&self.model_dir) {
                Ok(bundle) => Some(Arc::new(bundle)),
                Err(e) => {
                    tracing::warn!(error = %e, "transformer engine initialization failed");
                    None
                }
            })
            .as_ref()
    }

    /// Gray card image -> normalized `[1, 3, H, W]` pixel tensor.
    fn pixel_values(variant: &ImageVariant) -> Array4<f32> {
        let resized = image::imageops::resize(
            &variant.image,
            INPUT_SIZE,
            INPUT_SIZE,
            image::imageops::FilterType::CatmullRom,
        );
        let mut tensor = Array4::<f32>::zeros((1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let value = (pixel.0[0] as f32 / 255.0 - 0.5) / 0.5;
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] = value;
            }
        }
        tensor
    }
}

impl OcrEngine for TransformerEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Transformer
    }

    fn is_available(&self) -> bool {
        self.model_dir.join(ENCODER_FILE).exists()
            && self.model_dir.join(DECODER_FILE).exists()
            && self.model_dir.join(TOKENIZER_FILE).exists()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "transformer model files present".to_string()
        } else {
            format!(
                "transformer export missing under {} (need {ENCODER_FILE}, {DECODER_FILE}, {TOKENIZER_FILE})",
                self.model_dir.display()
            )
        }
    }

    fn try_recognize(&self, variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
        let bundle = self.bundle().ok_or_else(|| {
            RecognitionError::EngineInit("transformer model failed to load".to_string())
        })?;

        let pixel_values = Self::pixel_values(variant);

        let hidden: Array3<f32> = {
            let mut encoder = bundle
                .encoder
                .lock()
                .map_err(|_| RecognitionError::EngineProcessing("encoder lock poisoned".into()))?;
            let input = TensorRef::from_array_view(pixel_values.view())
                .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
            let outputs = encoder
                .run(ort::inputs!["pixel_values" => input])
                .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
            let (shape, data) = outputs["last_hidden_state"]
                .try_extract_tensor::<f32>()
                .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
            let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            Array3::from_shape_vec((dims[0], dims[1], dims[2]), data.to_vec())
                .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?
        };

        let mut ids: Vec<i64> = vec![DECODER_START_TOKEN];
        {
            let mut decoder = bundle
                .decoder
                .lock()
                .map_err(|_| RecognitionError::EngineProcessing("decoder lock poisoned".into()))?;

            for _ in 0..MAX_DECODE_STEPS {
                let input_ids = Array2::from_shape_vec((1, ids.len()), ids.clone())
                    .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
                let ids_tensor = TensorRef::from_array_view(input_ids.view())
                    .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
                let hidden_tensor = TensorRef::from_array_view(hidden.view())
                    .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;

                let outputs = decoder
                    .run(ort::inputs![
                        "input_ids" => ids_tensor,
                        "encoder_hidden_states" => hidden_tensor,
                    ])
                    .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;

                let (shape, logits) = outputs["logits"]
                    .try_extract_tensor::<f32>()
                    .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?;
                let vocab = *shape.last().ok_or_else(|| {
                    RecognitionError::EngineProcessing("logits tensor has no shape".into())
                })? as usize;

                let last_step = &logits[(ids.len() - 1) * vocab..ids.len() * vocab];
                let next = last_step
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx as i64)
                    .unwrap_or(EOS_TOKEN);

                if next == EOS_TOKEN {
                    break;
                }
                ids.push(next);
            }
        }

        let token_ids: Vec<u32> = ids[1..].iter().map(|&id| id as u32).collect();
        let text = bundle
            .tokenizer
            .decode(&token_ids, true)
            .map_err(|e| RecognitionError::EngineProcessing(e.to_string()))?
            .trim()
            .to_string();

        let confidence = heuristic_confidence(&text);
        tracing::debug!(
            variant = variant.kind.as_str(),
            tokens = token_ids.len(),
            confidence,
            "transformer read complete"
        );

        Ok(EngineResult::new(text, confidence, EngineKind::Transformer)
            .with_diagnostic("decoded_tokens", token_ids.len().to_string()))
    }
}
