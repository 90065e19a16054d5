// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capture-quality analysis. Pure function from a color buffer to an
// immutable report: raw metrics, threshold flags, weighted component scores,
// and priority-ordered improvement tips for the person holding the camera.

use cardlens_core::config::QualityConfig;
use cardlens_core::error::{CardlensError, Result};
use cardlens_core::types::{QualityFlags, QualityMetrics, QualityReport};
use image::RgbaImage;
use tracing::{debug, instrument};

use crate::filter;
use crate::luma;

// Fixed flag thresholds. Blur and focus thresholds come from `QualityConfig`
// instead because they vary with the capture hardware.
const DARK_LUMINANCE: f64 = 50.0;
const BRIGHT_LUMINANCE: f64 = 205.0;
const LOW_CONTRAST_STDDEV: f64 = 25.0;
const MIN_WIDTH: u32 = 600;
const MIN_HEIGHT: u32 = 400;
const OVERSATURATED_MEAN: f64 = 85.0;
const BALANCE_DEVIATION_LIMIT: f64 = 30.0;
const CLIPPED_PERCENT_LIMIT: f64 = 5.0;

// Score normalization ranges.
const BLUR_SCORE_CEILING: f64 = 300.0;
const FOCUS_SCORE_CEILING: f64 = 25.0;
const CONTRAST_SCORE_CEILING: f64 = 60.0;

/// Analyze a capture and produce a [`QualityReport`].
///
/// Fails only on images too small for the 3×3 kernels (either dimension
/// below 3); every real capture succeeds.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn analyze_quality(image: &RgbaImage, cfg: &QualityConfig) -> Result<QualityReport> {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return Err(CardlensError::InvalidInput(format!(
            "image {width}×{height} too small for quality analysis (need at least 3×3)"
        )));
    }

    let gray = luma::luminance(image);
    let metrics = extract_metrics(image, &gray);
    debug!(?metrics, "Raw metrics extracted");

    let flags = QualityFlags {
        is_blurry: metrics.laplacian_variance < cfg.blur_threshold,
        is_out_of_focus: metrics.gradient_mean < cfg.focus_threshold,
        is_too_dark: metrics.luminance_mean < DARK_LUMINANCE,
        is_too_bright: metrics.luminance_mean > BRIGHT_LUMINANCE,
        is_low_contrast: metrics.luminance_stddev < LOW_CONTRAST_STDDEV,
        is_low_resolution: width < MIN_WIDTH || height < MIN_HEIGHT,
        is_oversaturated: metrics.saturation_mean > OVERSATURATED_MEAN,
        is_color_distorted: metrics.color_balance_deviation > BALANCE_DEVIATION_LIMIT
            || metrics.clipped_percent > CLIPPED_PERCENT_LIMIT,
    };

    let sharpness = 100.0
        * (0.6 * (metrics.laplacian_variance / BLUR_SCORE_CEILING).min(1.0)
            + 0.4 * (metrics.gradient_mean / FOCUS_SCORE_CEILING).min(1.0));
    let brightness_proximity = (1.0 - (metrics.luminance_mean - 128.0).abs() / 128.0).max(0.0);
    let lighting = 100.0
        * (0.5 * brightness_proximity
            + 0.5 * (metrics.luminance_stddev / CONTRAST_SCORE_CEILING).min(1.0));
    let resolution = if flags.is_low_resolution { 0.0 } else { 100.0 };
    let color = 100.0 - metrics.color_distortion;

    let overall = 0.40 * sharpness + 0.40 * lighting + 0.15 * resolution + 0.05 * color;

    let tips = build_tips(&flags, width, height, overall);

    Ok(QualityReport {
        overall_score: overall.round() as u32,
        sharpness_score: sharpness.round() as u32,
        lighting_score: lighting.round() as u32,
        resolution_score: resolution.round() as u32,
        color_score: color.round() as u32,
        metrics,
        flags,
        tips,
    })
}

/// Single pass over the color buffer plus two passes over the grayscale
/// conversion, yielding every raw metric.
fn extract_metrics(image: &RgbaImage, gray: &image::GrayImage) -> QualityMetrics {
    let (width, height) = image.dimensions();
    let pixel_count = (width * height) as f64;

    // Luminance mean, then a second pass for the variance.
    let lum_sum: f64 = gray.pixels().map(|p| p.0[0] as f64).sum();
    let luminance_mean = lum_sum / pixel_count;
    let lum_var_sum: f64 = gray
        .pixels()
        .map(|p| (p.0[0] as f64 - luminance_mean).powi(2))
        .sum();
    let luminance_stddev = (lum_var_sum / pixel_count).sqrt();

    // Laplacian variance over the interior (blur proxy).
    let responses = filter::laplacian_responses(gray);
    let laplacian_variance = variance(&responses);

    // Mean Sobel magnitude over the interior (focus proxy).
    let magnitudes = filter::sobel_magnitudes(gray);
    let interior = ((width - 2) * (height - 2)) as f64;
    let gradient_mean = magnitudes.iter().sum::<f64>() / interior;

    // Color statistics in one pass: channel means, HSL saturation, and
    // clipped pixels (any color channel at 0 or 255 — alpha excluded).
    let mut sum_r = 0.0f64;
    let mut sum_g = 0.0f64;
    let mut sum_b = 0.0f64;
    let mut saturation_sum = 0.0f64;
    let mut clipped = 0u64;
    for pixel in image.pixels() {
        let [r, g, b, _] = pixel.0;
        sum_r += r as f64;
        sum_g += g as f64;
        sum_b += b as f64;
        saturation_sum += hsl_saturation(r, g, b);
        if r == 0 || r == 255 || g == 0 || g == 255 || b == 0 || b == 255 {
            clipped += 1;
        }
    }
    let mean_r = sum_r / pixel_count;
    let mean_g = sum_g / pixel_count;
    let mean_b = sum_b / pixel_count;
    let color_balance_deviation =
        mean_r.max(mean_g).max(mean_b) - mean_r.min(mean_g).min(mean_b);
    let saturation_mean = saturation_sum / pixel_count * 100.0;
    let clipped_percent = clipped as f64 / pixel_count * 100.0;

    let color_distortion =
        ((color_balance_deviation / 255.0) + (clipped_percent / 100.0)) / 2.0 * 100.0;

    QualityMetrics {
        laplacian_variance,
        gradient_mean,
        luminance_mean,
        luminance_stddev,
        saturation_mean,
        color_balance_deviation,
        clipped_percent,
        color_distortion,
    }
}

/// HSL saturation of one pixel, in [0, 1].
fn hsl_saturation(r: u8, g: u8, b: u8) -> f64 {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == min {
        return 0.0;
    }
    let lightness = (max + min) / 2.0;
    if lightness <= 0.5 {
        (max - min) / (max + min)
    } else {
        (max - min) / (2.0 - max - min)
    }
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

/// Improvement tips, highest priority first. Lighting problems form one
/// chain (dark wins over bright wins over flat), sharpness and resolution
/// are independent checks, and a generic tip covers the "nothing specific
/// but still mediocre" case.
fn build_tips(flags: &QualityFlags, width: u32, height: u32, overall: f64) -> Vec<String> {
    let mut tips = Vec::new();

    if flags.is_blurry || flags.is_out_of_focus {
        tips.push(
            "Hold the camera steady and tap to focus on the card before capturing.".to_string(),
        );
    }

    if flags.is_too_dark {
        tips.push("Move to better lighting or turn on more light — the capture is too dark.".to_string());
        if flags.is_low_contrast {
            tips.push(
                "Low contrast usually clears up with the extra light; recapture and check."
                    .to_string(),
            );
        }
    } else if flags.is_too_bright {
        tips.push(
            "Reduce glare: angle the card away from direct light or disable the flash.".to_string(),
        );
    } else if flags.is_low_contrast {
        tips.push(
            "Place the card on a plain, contrasting surface and even out the lighting."
                .to_string(),
        );
    }

    if flags.is_low_resolution {
        tips.push(format!(
            "Move closer — the capture is only {width}×{height} pixels; aim for at least \
             {MIN_WIDTH}×{MIN_HEIGHT}."
        ));
    }

    if tips.is_empty() && overall < 90.0 {
        tips.push(
            "Fill the frame with the card, keep it flat, and capture straight on.".to_string(),
        );
    }

    tips
}
