// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Luminance extraction and linear contrast stretching.

use image::{GrayImage, Luma, RgbaImage};

/// Convert a color buffer to single-channel grayscale using the ITU-R BT.601
/// weights: `Y = 0.299·R + 0.587·G + 0.114·B`, clamped to [0, 255].
///
/// Total function — never fails, output has the same dimensions as the input.
pub fn luminance(image: &RgbaImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        let y_val = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
        out.put_pixel(x, y, Luma([y_val.clamp(0.0, 255.0) as u8]));
    }

    out
}

/// Stretch contrast linearly around mid-gray: `v' = factor·(v − 128) + 128`,
/// clamped to [0, 255]. A factor of 1.0 is a no-op.
pub fn contrast_stretch(image: &GrayImage, factor: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let stretched = factor * (pixel.0[0] as f64 - 128.0) + 128.0;
        out.put_pixel(x, y, Luma([stretched.clamp(0.0, 255.0) as u8]));
    }

    out
}
