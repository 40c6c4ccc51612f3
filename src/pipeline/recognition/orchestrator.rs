//! End-to-end scan flow: decode → preprocessing variants → engines →
//! domain scoring → arbitration → sanitize → vocabulary correction →
//! field parsing.
//!
//! The public entry point never fails. Every degraded path (no engines,
//! undecodable image, no recognized text) is a structured outcome with a
//! failure classification, so the caller can store a "needs review" record
//! instead of rejecting the upload.

use std::time::{Duration, Instant};

use image::GrayImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::arbitration::select_best;
use super::confidence::{domain_confidence, rate_text_quality, TextQuality};
use super::correction::correct_business_terms;
use super::preprocess::{decode_grayscale, expand_variants};
use super::registry::EngineRegistry;
use super::sanitize::sanitize_text;
use super::types::{CardSide, ScoredResult};
use crate::config::ScanConfig;
use crate::pipeline::parsing::{extract_fields, quick_extract, ContactFields};

/// Whether the caller supplied one or both card sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Single,
    Dual,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Single => "single",
            ScanMode::Dual => "dual",
        }
    }
}

/// One scan request: front image bytes, optionally the back side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub front: Vec<u8>,
    pub back: Option<Vec<u8>>,
}

impl ScanRequest {
    pub fn single(front: Vec<u8>) -> Self {
        Self { front, back: None }
    }

    pub fn dual(front: Vec<u8>, back: Vec<u8>) -> Self {
        Self {
            front,
            back: Some(back),
        }
    }

    pub fn mode(&self) -> ScanMode {
        if self.back.is_some() {
            ScanMode::Dual
        } else {
            ScanMode::Single
        }
    }
}

/// Why a scan produced no result. These are expected outcomes, not faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanFailure {
    /// The supplied bytes could not be decoded as a raster image.
    InvalidImage,
    /// No registered engine can run (nothing installed or configured).
    NoEnginesAvailable,
    /// Every (variant, engine) combination yielded empty text.
    NoTextRecognized,
}

impl ScanFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFailure::InvalidImage => "invalid-image",
            ScanFailure::NoEnginesAvailable => "no-engines-available",
            ScanFailure::NoTextRecognized => "no-text-recognized",
        }
    }
}

impl std::fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the downstream record layer needs from one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub success: bool,
    pub fields: ContactFields,
    /// Aggregate domain confidence, 0-100.
    pub confidence: f32,
    /// Route to human verification before trusting the fields.
    pub needs_review: bool,
    /// Which engine and preprocessing variant produced the winning text.
    pub scan_method: String,
    pub processing_time: Duration,
    pub failure: Option<ScanFailure>,
}

impl ScanOutcome {
    fn failed(failure: ScanFailure, processing_time: Duration) -> Self {
        Self {
            success: false,
            fields: ContactFields::default(),
            confidence: 0.0,
            needs_review: true,
            scan_method: "none".to_string(),
            processing_time,
            failure: Some(failure),
        }
    }
}

/// The scan pipeline. Holds the engine registry (built once at process
/// start) and the tunable heuristics; one instance serves many requests.
pub struct CardScanner {
    registry: EngineRegistry,
    config: ScanConfig,
}

impl CardScanner {
    pub fn new(registry: EngineRegistry) -> Self {
        Self {
            registry,
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the full pipeline for one request. Infallible: degraded paths
    /// return a structured outcome with `success == false`.
    pub fn scan(&self, request: &ScanRequest) -> ScanOutcome {
        let start = Instant::now();
        let scan_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "card_scan",
            scan_id = %scan_id,
            mode = request.mode().as_str(),
        )
        .entered();

        if self.registry.available().next().is_none() {
            tracing::warn!("no OCR engines available, returning failed outcome");
            return ScanOutcome::failed(ScanFailure::NoEnginesAvailable, start.elapsed());
        }

        let front = match decode_grayscale(&request.front) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(error = %e, "front image undecodable");
                return ScanOutcome::failed(ScanFailure::InvalidImage, start.elapsed());
            }
        };
        let front_best = self.recognize_side(CardSide::Front, &front);

        let back_best = request.back.as_ref().and_then(|bytes| {
            match decode_grayscale(bytes) {
                Ok(image) => self.recognize_side(CardSide::Back, &image),
                Err(e) => {
                    tracing::warn!(error = %e, "back image undecodable, continuing with front only");
                    None
                }
            }
        });

        let Some((text, confidence, scan_method)) = combine_sides(front_best, back_best) else {
            tracing::info!("no engine produced usable text");
            return ScanOutcome::failed(ScanFailure::NoTextRecognized, start.elapsed());
        };

        let cleaned = correct_business_terms(&sanitize_text(&text), self.config.correction_cutoff);
        let mut fields = extract_fields(&cleaned, &self.config);
        if fields.has_no_fields() && !cleaned.trim().is_empty() {
            tracing::debug!("structured parse assigned nothing, taking legacy extraction path");
            let legacy = quick_extract(&cleaned);
            fields = ContactFields {
                notes: fields.notes,
                ..legacy
            };
        }

        let quality = rate_text_quality(&cleaned);
        let needs_review =
            confidence < self.config.review_threshold || quality != TextQuality::Good;

        tracing::info!(
            confidence,
            needs_review,
            quality = quality.as_str(),
            method = %scan_method,
            elapsed_ms = %start.elapsed().as_millis(),
            "scan complete"
        );

        ScanOutcome {
            success: true,
            fields,
            confidence,
            needs_review,
            scan_method,
            processing_time: start.elapsed(),
            failure: None,
        }
    }

    /// Try every (variant, engine) combination for one side, in variant
    /// order, stopping as soon as a candidate clears the good-enough
    /// threshold. Arbitration then picks the winner among what was tried.
    fn recognize_side(&self, side: CardSide, image: &GrayImage) -> Option<ScoredResult> {
        let variants = expand_variants(image);
        let mut candidates = Vec::new();

        'variants: for variant in &variants {
            for engine in self.registry.engines() {
                let result = engine.recognize(variant);
                if !result.is_usable() {
                    continue;
                }

                let score = domain_confidence(&result.text);
                tracing::debug!(
                    side = side.as_str(),
                    engine = %result.engine,
                    variant = variant.kind.as_str(),
                    engine_confidence = result.confidence,
                    domain_confidence = score,
                    "candidate scored"
                );

                let good_enough = score >= self.config.early_exit_confidence;
                candidates.push(ScoredResult::new(result, score, variant.kind));
                if good_enough {
                    tracing::debug!(side = side.as_str(), "good-enough candidate, stopping early");
                    break 'variants;
                }
            }
        }

        select_best(candidates, &self.config)
    }
}

/// Merge the per-side winners into one text block. With both sides present
/// the aggregate confidence is weighted by how much text each side
/// contributed, and the method string records both provenances.
fn combine_sides(
    front: Option<ScoredResult>,
    back: Option<ScoredResult>,
) -> Option<(String, f32, String)> {
    match (front, back) {
        (None, None) => None,
        (Some(side), None) | (None, Some(side)) => {
            Some((side.result.text, side.domain_confidence, side.method))
        }
        (Some(front), Some(back)) => {
            let front_weight = front.result.text.len() as f32;
            let back_weight = back.result.text.len() as f32;
            let confidence = if front_weight + back_weight == 0.0 {
                0.0
            } else {
                (front.domain_confidence * front_weight + back.domain_confidence * back_weight)
                    / (front_weight + back_weight)
            };
            let text = format!("{}\n{}", front.result.text, back.result.text);
            let method = format!("{}|{}", front.method, back.method);
            Some((text, confidence, method))
        }
    }
}
