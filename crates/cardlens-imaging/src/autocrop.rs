// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auto-crop locator — finds a card-shaped bounding rectangle by scanning
// edge-density profiles of a downscaled Sobel map. Detection is best-effort:
// anything ambiguous returns `None` rather than guessing, and the caller
// falls back to manual cropping.

use cardlens_core::config::AutoCropConfig;
use cardlens_core::types::CropRect;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use tracing::{debug, instrument, warn};

use crate::filter;
use crate::luma;

/// Contrast stretch factor applied before edge detection; lifts weak card
/// borders above the edge threshold without saturating the interior.
const PRE_EDGE_STRETCH: f64 = 1.5;

/// Suggest a crop rectangle for a photographed card, in original-image
/// coordinates. Returns `None` when no plausible card region is found.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn suggest_crop(image: &RgbaImage, cfg: &AutoCropConfig) -> Option<CropRect> {
    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 || cfg.working_width == 0 {
        return None;
    }

    // Downscale to the working width so the O(W·H) passes stay cheap on
    // full-resolution captures. Bilinear is plenty for an edge-density scan.
    let scale = if orig_w > cfg.working_width {
        cfg.working_width as f64 / orig_w as f64
    } else {
        1.0
    };
    let work: RgbaImage = if scale < 1.0 {
        let work_w = cfg.working_width;
        let work_h = ((orig_h as f64 * scale).round() as u32).max(1);
        imageops::resize(image, work_w, work_h, FilterType::Triangle)
    } else {
        image.clone()
    };

    let gray = luma::luminance(&work);
    let stretched = luma::contrast_stretch(&gray, PRE_EDGE_STRETCH);
    let edges = filter::sobel_magnitude_map(&stretched);

    let (left, top, right, bottom) = match find_bounds(&edges, cfg) {
        Some(bounds) => bounds,
        None => {
            debug!("No bounding box found in edge map");
            return None;
        }
    };

    // Shave a sliver off each side: the detected rows/columns sit on the
    // scan artifacts of the edge itself.
    let box_w = (right - left) as f64;
    let box_h = (bottom - top) as f64;
    let inset_x = box_w * cfg.inset_fraction;
    let inset_y = box_h * cfg.inset_fraction;
    let left = left as f64 + inset_x;
    let right = right as f64 - inset_x;
    let top = top as f64 + inset_y;
    let bottom = bottom as f64 - inset_y;
    if right <= left || bottom <= top {
        return None;
    }

    // Back to original-image coordinates.
    let x = (left / scale).round().max(0.0) as u32;
    let y = (top / scale).round().max(0.0) as u32;
    let width = (((right - left) / scale).round() as u32).min(orig_w.saturating_sub(x));
    let height = (((bottom - top) / scale).round() as u32).min(orig_h.saturating_sub(y));
    if width == 0 || height == 0 {
        return None;
    }

    let rect = CropRect {
        x,
        y,
        width,
        height,
    };

    // Reject implausible detections: background texture produces near-frame
    // boxes, stray edges produce slivers.
    let frame_area = orig_w as f64 * orig_h as f64;
    let fraction = rect.area() as f64 / frame_area;
    if fraction < cfg.min_area_fraction || fraction > cfg.max_area_fraction {
        warn!(
            fraction,
            min = cfg.min_area_fraction,
            max = cfg.max_area_fraction,
            "Detected area outside acceptance band; no suggestion"
        );
        return None;
    }

    debug!(?rect, fraction, "Crop suggested");
    Some(rect)
}

/// Scan the edge map from each of the four directions and return the first
/// row/column (inclusive) whose edge density exceeds the line threshold, as
/// `(left, top, right, bottom)`. `None` when any bound is missing or the
/// bounds are inverted.
fn find_bounds(edges: &GrayImage, cfg: &AutoCropConfig) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = edges.dimensions();

    let row_dense = |y: u32| -> bool {
        let hits = (0..width)
            .filter(|&x| edges.get_pixel(x, y).0[0] > cfg.edge_threshold)
            .count();
        hits as f64 / width as f64 > cfg.line_density
    };
    let col_dense = |x: u32| -> bool {
        let hits = (0..height)
            .filter(|&y| edges.get_pixel(x, y).0[0] > cfg.edge_threshold)
            .count();
        hits as f64 / height as f64 > cfg.line_density
    };

    let top = (0..height).find(|&y| row_dense(y))?;
    let bottom = (0..height).rev().find(|&y| row_dense(y))?;
    let left = (0..width).find(|&x| col_dense(x))?;
    let right = (0..width).rev().find(|&x| col_dense(x))?;

    if right <= left || bottom <= top {
        return None;
    }
    Some((left, top, right, bottom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    /// A card-colored rectangle on a dark background, full RGBA.
    fn card_photo(w: u32, h: u32, card: (u32, u32, u32, u32)) -> RgbaImage {
        let (x0, y0, x1, y1) = card;
        RgbaImage::from_fn(w, h, |x, y| {
            if x >= x0 && x < x1 && y >= y0 && y < y1 {
                Rgba([200, 200, 200, 255])
            } else {
                Rgba([10, 10, 10, 255])
            }
        })
    }

    /// Bounds on a synthetic edge map land exactly on the drawn outline.
    #[test]
    fn find_bounds_locates_outline_exactly() {
        let mut edges = GrayImage::from_pixel(100, 80, Luma([0]));
        for x in 20..=70 {
            edges.put_pixel(x, 15, Luma([255]));
            edges.put_pixel(x, 60, Luma([255]));
        }
        for y in 15..=60 {
            edges.put_pixel(20, y, Luma([255]));
            edges.put_pixel(70, y, Luma([255]));
        }

        let bounds = find_bounds(&edges, &AutoCropConfig::default()).unwrap();
        assert_eq!(bounds, (20, 15, 70, 60));
    }

    #[test]
    fn find_bounds_empty_map_is_none() {
        let edges = GrayImage::from_pixel(50, 50, Luma([0]));
        assert!(find_bounds(&edges, &AutoCropConfig::default()).is_none());
    }

    /// A sparse scatter never reaches the line-density threshold.
    #[test]
    fn find_bounds_ignores_sparse_noise() {
        let mut edges = GrayImage::from_pixel(100, 100, Luma([0]));
        edges.put_pixel(50, 50, Luma([255]));
        edges.put_pixel(10, 90, Luma([255]));
        assert!(find_bounds(&edges, &AutoCropConfig::default()).is_none());
    }

    #[test]
    fn suggest_crop_finds_card_near_true_margins() {
        // 800×600 photo, card from (200,150) to (600,450).
        let photo = card_photo(800, 600, (200, 150, 600, 450));
        let rect = suggest_crop(&photo, &AutoCropConfig::default()).expect("card should be found");

        // The suggestion sits just inside the card: within the true margins
        // plus the 2% inset and downscale rounding.
        assert!(rect.x >= 200 && rect.x <= 225, "x = {}", rect.x);
        assert!(rect.y >= 150 && rect.y <= 172, "y = {}", rect.y);
        assert!(rect.x + rect.width <= 600 && rect.x + rect.width >= 575);
        assert!(rect.y + rect.height <= 450 && rect.y + rect.height >= 428);
        assert!(rect.fits_within(800, 600));
    }

    #[test]
    fn suggest_crop_uniform_image_is_none() {
        let photo = RgbaImage::from_pixel(640, 480, Rgba([128, 128, 128, 255]));
        assert!(suggest_crop(&photo, &AutoCropConfig::default()).is_none());
    }

    /// The same detectable card is rejected once the acceptance band
    /// excludes its area.
    #[test]
    fn suggest_crop_respects_area_band() {
        let photo = card_photo(800, 600, (200, 150, 600, 450)); // card ≈ 25% of frame

        let narrow_max = AutoCropConfig {
            max_area_fraction: 0.05,
            ..AutoCropConfig::default()
        };
        assert!(suggest_crop(&photo, &narrow_max).is_none());

        let high_min = AutoCropConfig {
            min_area_fraction: 0.50,
            ..AutoCropConfig::default()
        };
        assert!(suggest_crop(&photo, &high_min).is_none());
    }

    /// Images already at or below the working width skip the downscale.
    #[test]
    fn suggest_crop_small_image_no_downscale() {
        let photo = card_photo(320, 240, (60, 50, 260, 190));
        let rect = suggest_crop(&photo, &AutoCropConfig::default()).expect("card should be found");
        assert!(rect.fits_within(320, 240));
        assert!(rect.x >= 60 && rect.x <= 70);
    }
}
