//! Artifact encoding: serialise the canvas as PNG or JPEG and write it out.
//!
//! The format comes from the destination extension, case-insensitively.
//! Anything that is not `.png`/`.jpg`/`.jpeg` — including no extension at
//! all — falls back to PNG and the destination path is rewritten to match,
//! so the bytes on disk always agree with the filename.
//!
//! The write is atomic (encode to memory, write `*.tmp`, rename): a crash or
//! full disk mid-write can never leave a half-decodable image at the final
//! path.

use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encoding selected for the output artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Canonical lowercase extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Pick the encoding from the destination extension, rewriting the path to
/// `.png` when the extension is missing or unrecognized.
pub fn resolve_destination(dest: &Path) -> (PathBuf, OutputFormat) {
    let ext = dest
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => (dest.to_path_buf(), OutputFormat::Jpeg),
        Some("png") => (dest.to_path_buf(), OutputFormat::Png),
        _ => (dest.with_extension("png"), OutputFormat::Png),
    }
}

/// Encode `canvas` in `format` into an in-memory buffer.
pub fn encode_canvas(
    canvas: &RgbImage,
    format: OutputFormat,
    jpeg_quality: u8,
    dest: &Path,
) -> Result<Vec<u8>, ConvertError> {
    let mut buf = Vec::new();
    let encode_err = |e: image::ImageError| ConvertError::EncodeFailed {
        path: dest.to_path_buf(),
        detail: e.to_string(),
    };

    match format {
        OutputFormat::Png => {
            // Best compression matters here: long images are large and
            // mostly white, which deflate rewards heavily.
            let encoder = PngEncoder::new_with_quality(
                Cursor::new(&mut buf),
                CompressionType::Best,
                FilterType::Adaptive,
            );
            canvas.write_with_encoder(encoder).map_err(encode_err)?;
        }
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), jpeg_quality);
            canvas.write_with_encoder(encoder).map_err(encode_err)?;
        }
    }

    debug!("Encoded {:?} → {} bytes", format, buf.len());
    Ok(buf)
}

/// Encode the canvas and write it to `dest` atomically (tmp file + rename).
///
/// Returns the byte size of the written artifact. `dest` must already have
/// gone through [`resolve_destination`].
pub fn encode_to_file(
    canvas: &RgbImage,
    dest: &Path,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<u64, ConvertError> {
    let bytes = encode_canvas(canvas, format, jpeg_quality, dest)?;
    let size = bytes.len() as u64;

    let write_err = |e: std::io::Error| ConvertError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    };

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = dest.with_extension(format!("{}.tmp", format.extension()));
    std::fs::write(&tmp_path, &bytes).map_err(write_err)?;
    std::fs::rename(&tmp_path, dest).map_err(write_err)?;

    info!("Wrote {} bytes to {}", size, dest.display());
    Ok(size)
}
