// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Cardlens image pipeline.

use serde::{Deserialize, Serialize};

/// A point in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A quadrilateral in source-image space, corners labelled clockwise from
/// the top-left. Must be non-degenerate (no three corners collinear) for
/// perspective correction to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl Quad {
    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// A suggested crop rectangle in original-image pixel coordinates.
///
/// Produced by the auto-crop locator only when the detected region covers a
/// plausible fraction of the frame; the locator returns `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the rectangle lies fully within an image of the given size.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= image_width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= image_height)
    }
}

/// Raw scalar metrics extracted from a capture during quality analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Variance of the Laplacian response — blur proxy (lower ⇒ blurrier).
    pub laplacian_variance: f64,
    /// Mean Sobel gradient magnitude — focus proxy.
    pub gradient_mean: f64,
    /// Mean luminance over the BT.601 grayscale conversion.
    pub luminance_mean: f64,
    /// Luminance standard deviation (contrast proxy).
    pub luminance_stddev: f64,
    /// Mean HSL saturation, scaled to 0–100.
    pub saturation_mean: f64,
    /// `max(meanR, meanG, meanB) − min(meanR, meanG, meanB)`.
    pub color_balance_deviation: f64,
    /// Percentage of pixels with any channel clipped to 0 or 255.
    pub clipped_percent: f64,
    /// Combined color distortion score, 0–100.
    pub color_distortion: f64,
}

/// Threshold-derived boolean findings about a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityFlags {
    pub is_blurry: bool,
    pub is_out_of_focus: bool,
    pub is_too_dark: bool,
    pub is_too_bright: bool,
    pub is_low_contrast: bool,
    pub is_low_resolution: bool,
    pub is_oversaturated: bool,
    pub is_color_distorted: bool,
}

/// Immutable quality report for one analysed capture.
///
/// Component and overall scores are 0–100. Tips are human-readable,
/// priority-ordered suggestions for improving the next capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall_score: u32,
    pub sharpness_score: u32,
    pub lighting_score: u32,
    pub resolution_score: u32,
    pub color_score: u32,
    pub metrics: QualityMetrics,
    pub flags: QualityFlags,
    pub tips: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_rect_fits_within_bounds() {
        let rect = CropRect {
            x: 10,
            y: 20,
            width: 100,
            height: 50,
        };
        assert!(rect.fits_within(110, 70));
        assert!(!rect.fits_within(109, 70));
        assert!(!rect.fits_within(110, 69));
    }

    #[test]
    fn crop_rect_zero_size_never_fits() {
        let rect = CropRect {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        assert!(!rect.fits_within(100, 100));
    }

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
