// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR preparation pipeline — grayscale, local contrast equalization, noise
// reduction, sharpening, and adaptive binarization, chained in that order.
// Produces the processed pair the host hands onward: the OCR-optimized full
// image and a display thumbnail.

use cardlens_core::config::{BinarizeConfig, ClaheConfig, PrepConfig};
use cardlens_core::error::{CardlensError, Result};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use tracing::{info, instrument};

use crate::binarize;
use crate::clahe;
use crate::filter;
use crate::luma;

/// Output pair of the preparation pipeline.
#[derive(Debug, Clone)]
pub struct PreparedCard {
    /// Binarized full-resolution image for text recognition.
    pub ocr_image: GrayImage,
    /// Aspect-preserving color thumbnail for display.
    pub thumbnail: RgbaImage,
}

/// Enhancement pipeline over a single grayscale working image.
///
/// Every step consumes `self` and returns a new enhancer wrapping the
/// transformed buffer, so stages chain without aliasing:
///
/// ```ignore
/// let ocr = CardEnhancer::from_rgba(&photo)?
///     .equalize(&ClaheConfig::default())
///     .denoise(3)
///     .sharpen()
///     .binarize(&BinarizeConfig::default())
///     .into_gray();
/// ```
pub struct CardEnhancer {
    gray: GrayImage,
}

impl CardEnhancer {
    // -- Construction ---------------------------------------------------------

    /// Start from a color capture; converts to BT.601 grayscale.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width < 3 || height < 3 {
            return Err(CardlensError::InvalidInput(format!(
                "image {width}×{height} too small to enhance (need at least 3×3)"
            )));
        }
        Ok(Self {
            gray: luma::luminance(image),
        })
    }

    /// Wrap an existing grayscale buffer.
    pub fn from_gray(gray: GrayImage) -> Self {
        Self { gray }
    }

    // -- Stages (consume self, return new Self) -------------------------------

    /// Contrast-limited adaptive histogram equalization.
    pub fn equalize(self, cfg: &ClaheConfig) -> Self {
        Self {
            gray: clahe::equalize(&self.gray, cfg),
        }
    }

    /// Median-filter noise reduction with the given window.
    pub fn denoise(self, window: u32) -> Self {
        Self {
            gray: filter::median_filter(&self.gray, window),
        }
    }

    /// Sharpen with the 3×3 identity-plus-Laplacian kernel.
    pub fn sharpen(self) -> Self {
        Self {
            gray: filter::sharpen(&self.gray),
        }
    }

    /// Adaptive local-mean binarization.
    pub fn binarize(self, cfg: &BinarizeConfig) -> Self {
        Self {
            gray: binarize::adaptive_binarize(&self.gray, cfg),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Consume the enhancer and return the working image.
    pub fn into_gray(self) -> GrayImage {
        self.gray
    }
}

/// Run the full OCR preparation pipeline and build the output pair.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn prepare_card(image: &RgbaImage, cfg: &PrepConfig) -> Result<PreparedCard> {
    info!("Running OCR preparation pipeline");

    let ocr_image = CardEnhancer::from_rgba(image)?
        .equalize(&cfg.clahe)
        .denoise(cfg.median_window)
        .sharpen()
        .binarize(&cfg.binarize)
        .into_gray();

    let thumbnail = make_thumbnail(image, cfg.thumbnail_max);

    info!(
        thumb_w = thumbnail.width(),
        thumb_h = thumbnail.height(),
        "Preparation complete"
    );
    Ok(PreparedCard {
        ocr_image,
        thumbnail,
    })
}

/// Downscale so the longest side is at most `max_side`, preserving aspect
/// ratio. Images already small enough are passed through as-is.
fn make_thumbnail(image: &RgbaImage, max_side: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_side == 0 || longest <= max_side {
        return image.clone();
    }

    let scale = max_side as f64 / longest as f64;
    let thumb_w = ((width as f64 * scale).round() as u32).max(1);
    let thumb_h = ((height as f64 * scale).round() as u32).max(1);
    imageops::resize(image, thumb_w, thumb_h, FilterType::Lanczos3)
}
