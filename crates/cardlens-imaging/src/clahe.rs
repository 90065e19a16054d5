// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalization (CLAHE). The image is
// partitioned into a fixed `grid × grid` layout of equally sized tiles; each
// tile gets a clipped, redistributed histogram and a CDF, and every output
// pixel is mapped through the CDFs of its own tile and the three neighbours
// to its right/below, bilinearly blended by its fractional position within
// the tile. The blending is what prevents visible seams at tile boundaries.

use cardlens_core::config::ClaheConfig;
use image::{GrayImage, Luma};
use tracing::{debug, instrument, warn};

/// Equalize local contrast.
///
/// Degenerate configurations (a grid so fine that tiles collapse below one
/// pixel in either dimension) soft-degrade: the input is returned unchanged
/// and a warning is logged.
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn equalize(src: &GrayImage, cfg: &ClaheConfig) -> GrayImage {
    let (width, height) = src.dimensions();
    let grid = cfg.grid_size;

    if grid == 0 {
        warn!(grid, "CLAHE grid size is zero; passing input through unchanged");
        return src.clone();
    }

    let tile_w = width / grid;
    let tile_h = height / grid;
    if tile_w == 0 || tile_h == 0 {
        warn!(
            grid,
            width, height, "CLAHE tiles smaller than 1px; passing input through unchanged"
        );
        return src.clone();
    }

    // One CDF per tile, row-major over the grid.
    let mut cdfs = Vec::with_capacity((grid * grid) as usize);
    for ty in 0..grid {
        for tx in 0..grid {
            cdfs.push(tile_cdf(
                src,
                tx * tile_w,
                ty * tile_h,
                tile_w,
                tile_h,
                cfg.clip_limit,
            ));
        }
    }
    debug!(grid, tile_w, tile_h, "Tile CDFs built");

    // Tile index with clamping at the grid edge, so boundary pixels reuse
    // their own tile's CDF as the missing neighbour.
    let tile_index = |tx: u32, ty: u32| -> usize {
        (ty.min(grid - 1) * grid + tx.min(grid - 1)) as usize
    };

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let value = src.get_pixel(x, y).0[0] as usize;

            let tx = (x / tile_w).min(grid - 1);
            let ty = (y / tile_h).min(grid - 1);
            // Fractional position within the tile; pixels in the remainder
            // strip past the last tile boundary clamp to 1.0.
            let fx = (x as f64 / tile_w as f64 - tx as f64).min(1.0);
            let fy = (y as f64 / tile_h as f64 - ty as f64).min(1.0);

            let v00 = cdfs[tile_index(tx, ty)][value] * 255.0;
            let v10 = cdfs[tile_index(tx + 1, ty)][value] * 255.0;
            let v01 = cdfs[tile_index(tx, ty + 1)][value] * 255.0;
            let v11 = cdfs[tile_index(tx + 1, ty + 1)][value] * 255.0;

            let top = v00 * (1.0 - fx) + v10 * fx;
            let bottom = v01 * (1.0 - fx) + v11 * fx;
            let blended = top * (1.0 - fy) + bottom * fy;

            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

/// Build the clipped, redistributed histogram for one tile and convert it to
/// a CDF normalized to [0, 1].
fn tile_cdf(
    src: &GrayImage,
    x0: u32,
    y0: u32,
    tile_w: u32,
    tile_h: u32,
    clip_limit: f64,
) -> [f64; 256] {
    let mut histogram = [0.0f64; 256];
    for y in y0..y0 + tile_h {
        for x in x0..x0 + tile_w {
            histogram[src.get_pixel(x, y).0[0] as usize] += 1.0;
        }
    }

    let pixel_count = (tile_w * tile_h) as f64;

    // Clip each bin at `clip_limit` times the uniform bin height, then hand
    // the clipped excess back evenly to every bin.
    let limit = clip_limit * pixel_count / 256.0;
    let mut excess = 0.0f64;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }
    let share = excess / 256.0;
    for bin in histogram.iter_mut() {
        *bin += share;
    }

    let mut cdf = [0.0f64; 256];
    let mut cumulative = 0.0f64;
    for (i, &bin) in histogram.iter().enumerate() {
        cumulative += bin;
        cdf[i] = cumulative / pixel_count;
    }

    cdf
}
