// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline stage configuration. Every field has a documented default and is
// tagged `#[serde(default)]`, so callers may override any subset (e.g. from a
// JSON settings blob) and leave the rest at the defaults.

use serde::{Deserialize, Serialize};

/// Contrast-limited adaptive histogram equalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheConfig {
    /// Histogram clip limit as a multiple of the uniform bin height.
    pub clip_limit: f64,
    /// The image is partitioned into `grid_size × grid_size` tiles.
    pub grid_size: u32,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            grid_size: 8,
        }
    }
}

/// Adaptive binarization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeConfig {
    /// Side length of the local-mean neighbourhood. Intended to be odd; an
    /// even value behaves like the next odd value down (the radius is
    /// `block_size / 2`).
    pub block_size: u32,
    /// Constant subtracted from the local mean before comparison.
    pub c: i32,
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            block_size: 21,
            c: 7,
        }
    }
}

/// Auto-crop locator tunables.
///
/// The inset fraction and the area acceptance band are empirical values from
/// field captures, exposed here rather than hard-coded so deployments can
/// re-tune them against their own sample sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCropConfig {
    /// Width the image is downscaled to before edge scanning.
    pub working_width: u32,
    /// Minimum Sobel magnitude (0–255) for a pixel to count as an edge.
    pub edge_threshold: u8,
    /// Minimum fraction of edge pixels for a row/column to count as a bound.
    pub line_density: f64,
    /// Fraction of the detected box width/height shaved off each side.
    pub inset_fraction: f64,
    /// Detected area below this fraction of the frame is rejected.
    pub min_area_fraction: f64,
    /// Detected area above this fraction of the frame is rejected.
    pub max_area_fraction: f64,
}

impl Default for AutoCropConfig {
    fn default() -> Self {
        Self {
            working_width: 400,
            edge_threshold: 50,
            line_density: 0.10,
            inset_fraction: 0.02,
            min_area_fraction: 0.10,
            max_area_fraction: 0.98,
        }
    }
}

/// Quality-analysis thresholds open to override. All other thresholds
/// (lighting, resolution, color) are fixed constants of the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Laplacian variance below this flags the capture as blurry.
    pub blur_threshold: f64,
    /// Mean gradient magnitude below this flags the capture as out of focus.
    pub focus_threshold: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            blur_threshold: 100.0,
            focus_threshold: 8.0,
        }
    }
}

/// Settings for the OCR preparation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub clahe: ClaheConfig,
    /// Median filter window side length.
    pub median_window: u32,
    pub binarize: BinarizeConfig,
    /// Longest side of the generated thumbnail, in pixels.
    pub thumbnail_max: u32,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            clahe: ClaheConfig::default(),
            median_window: 3,
            binarize: BinarizeConfig::default(),
            thumbnail_max: 480,
        }
    }
}
