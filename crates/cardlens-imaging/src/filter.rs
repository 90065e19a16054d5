// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// 3×3 convolution engine — Sobel edge magnitude, Laplacian response,
// sharpening, and median filtering. Kernels are applied to interior pixels
// only (`1 ≤ x < w−1`, `1 ≤ y < h−1`); what happens at the border depends on
// the consumer: edge maps leave borders at zero, sharpening copies the source
// pixel through unchanged, and the median filter replicates edge pixels.

use image::{GrayImage, Luma};

/// Horizontal Sobel kernel, row-major.
const SOBEL_X: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];
/// Vertical Sobel kernel, row-major.
const SOBEL_Y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];
/// Sharpening kernel (identity + Laplacian).
const SHARPEN: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];
/// Four-neighbour Laplacian kernel.
const LAPLACIAN: [i32; 9] = [0, 1, 0, 1, -4, 1, 0, 1, 0];

/// Apply a 3×3 kernel at an interior pixel. Caller guarantees
/// `1 ≤ x < width−1` and `1 ≤ y < height−1`.
#[inline]
fn kernel_at(src: &GrayImage, x: u32, y: u32, kernel: &[i32; 9]) -> i32 {
    let mut acc = 0i32;
    for ky in 0..3u32 {
        for kx in 0..3u32 {
            let v = src.get_pixel(x + kx - 1, y + ky - 1).0[0] as i32;
            acc += v * kernel[(ky * 3 + kx) as usize];
        }
    }
    acc
}

/// Raw Sobel gradient magnitudes, one `f64` per pixel in row-major order.
/// Border entries are zero.
pub fn sobel_magnitudes(src: &GrayImage) -> Vec<f64> {
    let (width, height) = src.dimensions();
    let mut magnitudes = vec![0.0f64; (width * height) as usize];

    if width < 3 || height < 3 {
        return magnitudes;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = kernel_at(src, x, y, &SOBEL_X) as f64;
            let gy = kernel_at(src, x, y, &SOBEL_Y) as f64;
            magnitudes[(y * width + x) as usize] = (gx * gx + gy * gy).sqrt();
        }
    }

    magnitudes
}

/// Sobel edge-magnitude map, linearly rescaled so the maximum observed
/// magnitude maps to 255. A flat image (max magnitude 0) yields an all-zero
/// map — no divide-by-zero.
pub fn sobel_magnitude_map(src: &GrayImage) -> GrayImage {
    let (width, height) = src.dimensions();
    let magnitudes = sobel_magnitudes(src);
    let max = magnitudes.iter().cloned().fold(0.0f64, f64::max);

    let mut out = GrayImage::new(width, height);
    if max <= 0.0 {
        return out;
    }

    for y in 0..height {
        for x in 0..width {
            let scaled = magnitudes[(y * width + x) as usize] / max * 255.0;
            out.put_pixel(x, y, Luma([scaled.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

/// Laplacian responses over the interior pixels, in scan order. Empty when
/// the image has no interior (either dimension below 3).
pub fn laplacian_responses(src: &GrayImage) -> Vec<f64> {
    let (width, height) = src.dimensions();
    if width < 3 || height < 3 {
        return Vec::new();
    }

    let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            responses.push(kernel_at(src, x, y, &LAPLACIAN) as f64);
        }
    }
    responses
}

/// Sharpen with the identity-plus-Laplacian kernel, clamped to [0, 255].
/// Border pixels copy the source value unchanged, so edges are not dimmed by
/// implicit zero padding.
pub fn sharpen(src: &GrayImage) -> GrayImage {
    let (width, height) = src.dimensions();
    let mut out = src.clone();

    if width < 3 || height < 3 {
        return out;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let v = kernel_at(src, x, y, &SHARPEN).clamp(0, 255) as u8;
            out.put_pixel(x, y, Luma([v]));
        }
    }

    out
}

/// Median filter with a `window × window` neighbourhood. Coordinates outside
/// the image are clamped to the nearest edge pixel (edge replication).
pub fn median_filter(src: &GrayImage, window: u32) -> GrayImage {
    let (width, height) = src.dimensions();
    let mut out = GrayImage::new(width, height);
    if window <= 1 {
        return src.clone();
    }

    let half = (window / 2) as i64;
    let mut neighbourhood = Vec::with_capacity((window * window) as usize);

    for y in 0..height {
        for x in 0..width {
            neighbourhood.clear();
            for dy in -half..=half {
                for dx in -half..=half {
                    let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                    let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                    neighbourhood.push(src.get_pixel(sx, sy).0[0]);
                }
            }
            neighbourhood.sort_unstable();
            out.put_pixel(x, y, Luma([neighbourhood[neighbourhood.len() / 2]]));
        }
    }

    out
}
