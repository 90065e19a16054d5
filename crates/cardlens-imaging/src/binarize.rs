// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive binarization via a summed-area table. For each pixel the threshold
// is the mean of its `block_size × block_size` neighbourhood (clamped at the
// borders) minus a constant `c`; the neighbourhood mean comes from four
// integral-image lookups, keeping the whole pass at O(W·H) instead of
// O(W·H·block²).

use cardlens_core::config::BinarizeConfig;
use image::{GrayImage, Luma};
use tracing::{debug, instrument};

/// Binarize a grayscale buffer: pixels brighter than their local mean minus
/// `cfg.c` become 255, all others 0.
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn adaptive_binarize(src: &GrayImage, cfg: &BinarizeConfig) -> GrayImage {
    let (width, height) = src.dimensions();
    let radius = cfg.block_size / 2;

    let integral = integral_image(src);
    let mut out = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mean = region_mean(&integral, width, height, x, y, radius);
            // Clamp at 0 so pure-black regions whose local mean drops below
            // `c` stay black (0 > −c would otherwise flip them white).
            let threshold = (mean - cfg.c as f64).max(0.0);
            let value = src.get_pixel(x, y).0[0];
            let bit = if value as f64 > threshold { 255u8 } else { 0u8 };
            out.put_pixel(x, y, Luma([bit]));
        }
    }

    debug!(block_size = cfg.block_size, c = cfg.c, "Adaptive binarization complete");
    out
}

/// Compute the integral (summed-area table) of a grayscale image.
///
/// `integral[y * (width+1) + x]` holds the sum of all pixels in the rectangle
/// from (0, 0) up to but excluding (x, y). The table is `(width+1) ×
/// (height+1)` with a zero border, so region queries need no special-casing
/// at the top/left edges.
fn integral_image(src: &GrayImage) -> Vec<u64> {
    let (w, h) = src.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += src.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value of the square neighbourhood centred on (cx, cy), clamped
/// to the image bounds, via inclusion-exclusion on the integral image.
///
/// The clamped region always contains at least the centre pixel (`x1 ≤ cx <
/// x2`, `y1 ≤ cy < y2`), so the area is never zero.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(img_width as usize);
    let y2 = ((cy + radius + 1) as usize).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    let sum = integral[y2 * stride + x2] as f64 - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Brute-force neighbourhood mean, for checking the integral-image path.
    fn brute_force_mean(src: &GrayImage, cx: u32, cy: u32, radius: u32) -> f64 {
        let (w, h) = src.dimensions();
        let x1 = cx.saturating_sub(radius);
        let y1 = cy.saturating_sub(radius);
        let x2 = (cx + radius + 1).min(w);
        let y2 = (cy + radius + 1).min(h);

        let mut sum = 0u64;
        let mut count = 0u64;
        for y in y1..y2 {
            for x in x1..x2 {
                sum += src.get_pixel(x, y).0[0] as u64;
                count += 1;
            }
        }
        sum as f64 / count as f64
    }

    fn gradient_image(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    /// The O(1) integral-image mean must equal the brute-force neighbourhood
    /// mean at every pixel, for several block sizes.
    #[test]
    fn integral_mean_matches_brute_force() {
        let img = gradient_image(37, 23);
        let integral = integral_image(&img);

        for &radius in &[1u32, 5, 10, 15] {
            for y in 0..23 {
                for x in 0..37 {
                    let fast = region_mean(&integral, 37, 23, x, y, radius);
                    let slow = brute_force_mean(&img, x, y, radius);
                    assert!(
                        (fast - slow).abs() < 1e-9,
                        "mismatch at ({x},{y}) radius {radius}: {fast} vs {slow}"
                    );
                }
            }
        }
    }

    /// Binarizing an already pure black/white image reproduces it exactly.
    #[test]
    fn binarize_is_idempotent_on_binary_input() {
        let mut img = GrayImage::from_pixel(40, 40, Luma([255]));
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([0]));
            }
        }

        let cfg = BinarizeConfig::default();
        let once = adaptive_binarize(&img, &cfg);
        assert_eq!(once, img);

        let twice = adaptive_binarize(&once, &cfg);
        assert_eq!(twice, once);
    }

    /// An all-black image has a local mean of 0 everywhere; the threshold
    /// clamps at 0 instead of going negative, so black stays black.
    #[test]
    fn binarize_all_black_stays_black() {
        let img = GrayImage::from_pixel(64, 64, Luma([0]));
        let out = adaptive_binarize(&img, &BinarizeConfig::default());
        assert_eq!(out, img);
    }

    /// A black region wider than the block leaves its interior pixels with an
    /// all-black neighbourhood — the hard half of idempotence. The interior
    /// must survive along with the edge.
    #[test]
    fn binarize_black_region_larger_than_block_survives() {
        let mut img = GrayImage::from_pixel(120, 120, Luma([255]));
        for y in 20..100 {
            for x in 20..100 {
                img.put_pixel(x, y, Luma([0]));
            }
        }

        let out = adaptive_binarize(&img, &BinarizeConfig::default());
        // Deep interior: neighbourhood mean is exactly 0.
        assert_eq!(out.get_pixel(60, 60).0[0], 0);
        assert_eq!(out, img);
    }

    /// Uniform input sits exactly at `mean`, which is above `mean − c`, so
    /// the whole image goes white.
    #[test]
    fn binarize_uniform_goes_white() {
        let img = GrayImage::from_pixel(20, 20, Luma([128]));
        let out = adaptive_binarize(&img, &BinarizeConfig::default());
        assert!(out.pixels().all(|p| p.0[0] == 255));
    }

    /// Dark text on a light background: the text pixels fall below the local
    /// mean minus c and come out black, the background comes out white.
    #[test]
    fn binarize_separates_text_from_background() {
        let mut img = GrayImage::from_pixel(50, 50, Luma([200]));
        for x in 20..30 {
            img.put_pixel(x, 25, Luma([40]));
        }

        let out = adaptive_binarize(&img, &BinarizeConfig::default());
        assert_eq!(out.get_pixel(25, 25).0[0], 0);
        assert_eq!(out.get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn integral_image_total_sum() {
        let img = gradient_image(12, 9);
        let integral = integral_image(&img);
        let expected: u64 = img.pixels().map(|p| p.0[0] as u64).sum();
        assert_eq!(integral[(13 * 10) - 1], expected);
    }
}
