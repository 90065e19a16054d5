// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cardlens-imaging — Pixel-level algorithms for photographed ID-card capture.
//
// Provides the auto-crop locator (edge-density bounding box), the OCR
// preparation pipeline (grayscale → CLAHE → median → sharpen → adaptive
// binarize), capture-quality analysis, and perspective correction via a
// hand-solved homography. All algorithms are synchronous pure functions over
// immutable buffers: each stage allocates and returns a new image, never
// mutating its input.
//
// Pixel buffers are `image::RgbaImage` (4×8-bit source/output) and
// `image::GrayImage` (single-channel derived maps). Decoding and encoding of
// file formats live behind the `codec` boundary; no algorithm here touches
// bytes on the wire.

pub mod autocrop;
pub mod binarize;
pub mod clahe;
pub mod codec;
pub mod filter;
pub mod luma;
pub mod perspective;
pub mod prep;
pub mod quality;
pub mod solver;

// Re-export the primary entry points so callers can use `cardlens_imaging::suggest_crop` etc.
pub use autocrop::suggest_crop;
pub use binarize::adaptive_binarize;
pub use clahe::equalize;
pub use codec::{ImageCodec, OutputFormat, StdCodec};
pub use perspective::correct_perspective;
pub use prep::{CardEnhancer, PreparedCard};
pub use quality::analyze_quality;
