// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective correction. Given the four corners of a skewed card in the
// source image, solves the inverse-mapping homography (destination → source)
// as an 8×8 linear system and resamples the destination rectangle with
// bilinear interpolation. One-shot and stateless: any degeneracy is an
// explicit error, never a partial image.

use cardlens_core::error::{CardlensError, Result};
use cardlens_core::types::Quad;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};

/// The eight homography coefficients a..h of the map
/// `x = (a·u + b·v + c) / (g·u + h·v + 1)`,
/// `y = (d·u + e·v + f) / (g·u + h·v + 1)`.
struct Homography {
    coeffs: [f64; 8],
}

impl Homography {
    /// Map a destination point (u, v) back to source coordinates. `None`
    /// when the point sits on the vanishing line (denominator ~ 0).
    fn map(&self, u: f64, v: f64) -> Option<(f64, f64)> {
        let [a, b, c, d, e, f, g, h] = self.coeffs;
        let denom = g * u + h * v + 1.0;
        if denom.abs() < 1e-12 {
            return None;
        }
        let x = (a * u + b * v + c) / denom;
        let y = (d * u + e * v + f) / denom;
        Some((x, y))
    }
}

/// Straighten the quadrilateral region of `src` into a rectangle.
///
/// The output width is the average of the two horizontal edge lengths and
/// the height the average of the two vertical ones. Destination pixels whose
/// inverse-mapped source position falls outside the image stay fully
/// transparent.
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn correct_perspective(src: &RgbaImage, quad: &Quad) -> Result<RgbaImage> {
    let top = quad.top_left.distance_to(&quad.top_right);
    let bottom = quad.bottom_left.distance_to(&quad.bottom_right);
    let left = quad.top_left.distance_to(&quad.bottom_left);
    let right = quad.top_right.distance_to(&quad.bottom_right);

    let out_w = ((top + bottom) / 2.0).round() as i64;
    let out_h = ((left + right) / 2.0).round() as i64;
    if out_w < 1 || out_h < 1 {
        return Err(CardlensError::DegenerateQuad(format!(
            "computed output size {out_w}×{out_h}"
        )));
    }
    let (out_w, out_h) = (out_w as u32, out_h as u32);
    debug!(out_w, out_h, "Output rectangle sized from edge lengths");

    let homography = solve_homography(quad, out_w as f64, out_h as f64)?;

    let (src_w, src_h) = src.dimensions();
    let mut out = RgbaImage::new(out_w, out_h);

    for v in 0..out_h {
        for u in 0..out_w {
            let Some((x, y)) = homography.map(u as f64, v as f64) else {
                continue; // stays transparent
            };
            // Interpolation needs the full 2×2 neighbourhood in-bounds; no
            // extrapolation past the source edges.
            if x < 0.0 || y < 0.0 || x >= (src_w - 1) as f64 || y >= (src_h - 1) as f64 {
                continue;
            }
            out.put_pixel(u, v, sample_bilinear(src, x, y));
        }
    }

    info!(out_w, out_h, "Perspective correction applied");
    Ok(out)
}

/// Build and solve the 8×8 system for the destination→source homography
/// from the four corner correspondences.
fn solve_homography(quad: &Quad, out_w: f64, out_h: f64) -> Result<Homography> {
    let dest = [
        (0.0, 0.0),
        (out_w, 0.0),
        (out_w, out_h),
        (0.0, out_h),
    ];
    let source = quad.corners();

    let mut matrix = Vec::with_capacity(8);
    let mut rhs = Vec::with_capacity(8);
    for (&(u, v), corner) in dest.iter().zip(source.iter()) {
        let (x, y) = (corner.x, corner.y);
        matrix.push(vec![u, v, 1.0, 0.0, 0.0, 0.0, -u * x, -v * x]);
        rhs.push(x);
        matrix.push(vec![0.0, 0.0, 0.0, u, v, 1.0, -u * y, -v * y]);
        rhs.push(y);
    }

    let solution = crate::solver::solve(matrix, rhs).map_err(|err| match err {
        // Singular system here means the corner points are degenerate
        // (collinear or coincident); say so.
        CardlensError::SingularSystem => CardlensError::DegenerateQuad(
            "corner points are collinear or coincident".to_string(),
        ),
        other => other,
    })?;

    let mut coeffs = [0.0f64; 8];
    coeffs.copy_from_slice(&solution);
    Ok(Homography { coeffs })
}

/// Bilinear RGBA sample at a fractional source position. Caller guarantees
/// `0 ≤ x < width−1` and `0 ≤ y < height−1`.
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x0 + 1, y0).0;
    let p01 = src.get_pixel(x0, y0 + 1).0;
    let p11 = src.get_pixel(x0 + 1, y0 + 1).0;

    let mut blended = [0u8; 4];
    for channel in 0..4 {
        let top = p00[channel] as f64 * (1.0 - fx) + p10[channel] as f64 * fx;
        let bottom = p01[channel] as f64 * (1.0 - fx) + p11[channel] as f64 * fx;
        blended[channel] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(blended)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardlens_core::types::Point;

    fn patterned(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 5 % 256) as u8,
                (y * 7 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
                255,
            ])
        })
    }

    fn rect_quad(x: f64, y: f64, w: f64, h: f64) -> Quad {
        Quad {
            top_left: Point::new(x, y),
            top_right: Point::new(x + w, y),
            bottom_right: Point::new(x + w, y + h),
            bottom_left: Point::new(x, y + h),
        }
    }

    /// An axis-aligned rectangle degenerates to a pure translation, so the
    /// output must be pixel-identical to a direct crop of that region.
    #[test]
    fn axis_aligned_quad_equals_direct_crop() {
        let src = patterned(100, 80);
        let quad = rect_quad(10.0, 5.0, 40.0, 30.0);

        let out = correct_perspective(&src, &quad).unwrap();
        assert_eq!(out.dimensions(), (40, 30));

        for v in 0..30 {
            for u in 0..40 {
                assert_eq!(
                    out.get_pixel(u, v),
                    src.get_pixel(10 + u, 5 + v),
                    "mismatch at ({u},{v})"
                );
            }
        }
    }

    #[test]
    fn collinear_corners_are_rejected() {
        let src = patterned(64, 64);
        let quad = Quad {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(10.0, 10.0),
            bottom_right: Point::new(20.0, 20.0),
            bottom_left: Point::new(30.0, 30.0),
        };
        assert!(matches!(
            correct_perspective(&src, &quad),
            Err(CardlensError::DegenerateQuad(_))
        ));
    }

    #[test]
    fn coincident_corners_are_rejected() {
        let src = patterned(32, 32);
        let p = Point::new(5.0, 5.0);
        let quad = Quad {
            top_left: p,
            top_right: p,
            bottom_right: p,
            bottom_left: p,
        };
        assert!(matches!(
            correct_perspective(&src, &quad),
            Err(CardlensError::DegenerateQuad(_))
        ));
    }

    /// A quad reaching outside the source leaves the unmapped destination
    /// pixels transparent rather than extrapolating.
    #[test]
    fn out_of_range_pixels_stay_transparent() {
        let src = patterned(50, 50);
        // Shifted so roughly the right half of the quad falls off the image.
        let quad = rect_quad(30.0, 10.0, 40.0, 20.0);

        let out = correct_perspective(&src, &quad).unwrap();
        assert_eq!(out.dimensions(), (40, 20));
        // In-bounds region is populated.
        assert_eq!(out.get_pixel(0, 0).0[3], 255);
        // Region mapping past x = 49 is untouched.
        assert_eq!(out.get_pixel(39, 0).0[3], 0);
    }

    /// A genuine perspective quad (trapezoid) must straighten without error
    /// and keep sampled colors within the source value range.
    #[test]
    fn trapezoid_straightens() {
        let src = patterned(120, 90);
        let quad = Quad {
            top_left: Point::new(30.0, 20.0),
            top_right: Point::new(90.0, 25.0),
            bottom_right: Point::new(95.0, 70.0),
            bottom_left: Point::new(25.0, 65.0),
        };

        let out = correct_perspective(&src, &quad).unwrap();
        let (w, h) = out.dimensions();
        // Width ≈ (60.2 + 70.2)/2, height ≈ (45.3 + 45.3)/2.
        assert!((64..=67).contains(&w), "w = {w}");
        assert!((44..=47).contains(&h), "h = {h}");

        // Interior pixels must all be opaque samples.
        for v in 1..h - 1 {
            for u in 1..w - 1 {
                assert_eq!(out.get_pixel(u, v).0[3], 255, "hole at ({u},{v})");
            }
        }
    }

    #[test]
    fn zero_area_quad_is_rejected_before_solving() {
        let src = patterned(16, 16);
        let quad = rect_quad(4.0, 4.0, 0.2, 0.2);
        assert!(matches!(
            correct_perspective(&src, &quad),
            Err(CardlensError::DegenerateQuad(_))
        ));
    }
}
