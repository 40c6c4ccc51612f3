//! Preprocessing bank: expands one grayscale capture into the fixed set of
//! enhanced variants the engines are run against.
//!
//! Order matters. Identity comes first (cheapest, often sufficient), then the
//! transforms in decreasing general usefulness, because arbitration may stop
//! as soon as a variant yields a good-enough result. Every transform produces
//! a valid image of the same dimensions; there is no error path on
//! well-formed grayscale input.

use image::imageops;
use image::GrayImage;
use imageproc::contrast::{adaptive_threshold, equalize_histogram};
use imageproc::filter::bilateral_filter;

use super::types::{ImageVariant, VariantKind};
use super::RecognitionError;

/// Unsharp-mask radius. Card text is small; a tight kernel avoids halos.
const SHARPEN_SIGMA: f32 = 1.2;
const SHARPEN_THRESHOLD: i32 = 4;

/// Bilateral filter parameters tuned for phone photos of matte card stock.
const BILATERAL_WINDOW: u32 = 7;
const BILATERAL_SIGMA_COLOR: f32 = 20.0;
const BILATERAL_SIGMA_SPATIAL: f32 = 5.0;

/// Adaptive threshold block radius; roughly one text line at typical
/// capture resolution.
const THRESHOLD_BLOCK_RADIUS: u32 = 16;

/// Decode caller-supplied raster bytes into a grayscale buffer.
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage, RecognitionError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| RecognitionError::ImageDecode(e.to_string()))?;
    Ok(decoded.to_luma8())
}

/// Produce the ordered, fixed-length sequence of enhanced variants for one
/// grayscale image. Deterministic: the same input always yields the same
/// sequence. The source buffer is never mutated.
pub fn expand_variants(source: &GrayImage) -> Vec<ImageVariant> {
    vec![
        ImageVariant {
            image: source.clone(),
            kind: VariantKind::Identity,
        },
        ImageVariant {
            image: equalize_histogram(source),
            kind: VariantKind::ContrastEqualized,
        },
        ImageVariant {
            image: imageops::unsharpen(source, SHARPEN_SIGMA, SHARPEN_THRESHOLD),
            kind: VariantKind::Sharpened,
        },
        ImageVariant {
            image: bilateral_filter(
                source,
                BILATERAL_WINDOW,
                BILATERAL_SIGMA_COLOR,
                BILATERAL_SIGMA_SPATIAL,
            ),
            kind: VariantKind::Denoised,
        },
        ImageVariant {
            image: adaptive_threshold(source, THRESHOLD_BLOCK_RADIUS),
            kind: VariantKind::Thresholded,
        },
    ]
}
