// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Cardlens.

use thiserror::Error;

/// Top-level error type for all Cardlens operations.
///
/// Every failure here is local and recoverable: the caller may re-invoke with
/// adjusted input or parameters. Detection misses (auto-crop finding nothing)
/// are not errors — they surface as `Option::None` from the locator.
#[derive(Debug, Error)]
pub enum CardlensError {
    // -- Codec boundary --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Input validation --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("degenerate quadrilateral: {0}")]
    DegenerateQuad(String),

    // -- Numerics --
    #[error("linear system is singular or near-singular")]
    SingularSystem,

    // -- Host I/O (file open/save helpers only) --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CardlensError>;
