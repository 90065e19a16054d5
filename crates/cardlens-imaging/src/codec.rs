// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec boundary — the injected capability that turns encoded bytes into
// pixel buffers and back. The pipeline algorithms never call this; only the
// host application does, which keeps every file-format concern out of the
// numeric code.

use cardlens_core::error::{CardlensError, Result};
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Encoding target for pipeline outputs.
///
/// PNG for OCR-bound output (lossless, binarization survives intact), JPEG
/// for thumbnails and exports where size matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

/// Decode/encode capability handed to the host.
pub trait ImageCodec {
    /// Decode encoded bytes (PNG, JPEG, TIFF, …) into an RGBA8 buffer.
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage>;

    /// Encode a pixel buffer (color or grayscale) into the given format.
    fn encode(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>>;
}

/// Default codec over the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdCodec;

impl ImageCodec for StdCodec {
    #[instrument(skip(self, bytes), fields(byte_len = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage> {
        let image = image::load_from_memory(bytes)
            .map_err(|err| CardlensError::Decode(format!("failed to decode image: {err}")))?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(image.to_rgba8())
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    fn encode(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Png => {
                let mut cursor = std::io::Cursor::new(&mut buffer);
                image
                    .write_to(&mut cursor, ImageFormat::Png)
                    .map_err(|err| CardlensError::Encode(format!("PNG encoding failed: {err}")))?;
            }
            OutputFormat::Jpeg { quality } => {
                let rgb = image.to_rgb8();
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
                rgb.write_with_encoder(encoder)
                    .map_err(|err| CardlensError::Encode(format!("JPEG encoding failed: {err}")))?;
            }
        }
        debug!(byte_len = buffer.len(), "Image encoded");
        Ok(buffer)
    }
}

impl StdCodec {
    /// Decode an image file from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(&self, path: impl AsRef<std::path::Path>) -> Result<RgbaImage> {
        let image = image::open(path.as_ref()).map_err(|err| {
            CardlensError::Decode(format!(
                "failed to open {}: {err}",
                path.as_ref().display()
            ))
        })?;
        Ok(image.to_rgba8())
    }

    /// Write an image to disk; the format is inferred from the extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, image: &DynamicImage, path: impl AsRef<std::path::Path>) -> Result<()> {
        image.save(path.as_ref()).map_err(|err| {
            CardlensError::Encode(format!(
                "failed to save image to {}: {err}",
                path.as_ref().display()
            ))
        })
    }
}
