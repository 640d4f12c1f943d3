//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline: resolve input → rasterise + scale
//! every page → stitch onto one canvas → encode and write. It returns only
//! after the artifact is on disk (or a stage has failed — there is no
//! partial output). [`convert_sync`] wraps it for non-async callers;
//! [`convert_from_bytes`] accepts in-memory PDFs; [`inspect`] reads metadata
//! without rendering anything.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata};
use crate::pipeline::input::ResolvedInput;
use crate::pipeline::{compose, encode, input, render};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file or URL into a single vertically-stitched image.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — Local file path or HTTP/HTTPS URL to a PDF
/// * `output`    — Destination image path; `None` derives
///   `<stem>_long_image.png` next to the source. An unrecognized extension
///   is rewritten to `.png`.
/// * `config`    — Conversion configuration
///
/// # Errors
/// Any stage failure is fatal and nothing is written:
/// - Source missing / unreadable / not a PDF
/// - Document corrupt, encrypted without the right password, or empty
/// - Any single page failing to rasterize
/// - Canvas exceeding the pixel budget
/// - Encoder or filesystem failure on the artifact
pub async fn convert(
    input_str: impl AsRef<str>,
    output: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Resolve destination and encoding ─────────────────────────
    let requested = match output {
        Some(p) => p.to_path_buf(),
        None => default_destination(&resolved),
    };
    let (destination, format) = encode::resolve_destination(&requested);
    info!(
        "Output: {} ({:?}, {} dpi)",
        destination.display(),
        format,
        config.dpi
    );

    // ── Step 3: Read metadata (pdfium backend only) ──────────────────────
    // Done before rendering so the source is never touched again once
    // rasterization has finished.
    let metadata = if config.rasterizer.is_none() {
        Some(render::extract_metadata(&pdf_path, config.password.as_deref()).await?)
    } else {
        None
    };

    // ── Step 4: Rasterise and scale pages ────────────────────────────────
    let render_start = Instant::now();
    let rendered = render::render_pages(&pdf_path, &destination, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {} pages in {}ms",
        rendered.bitmaps.len(),
        render_duration_ms
    );

    let total_pages = rendered.bitmaps.len();
    let metadata = metadata.unwrap_or_else(|| render::synthetic_metadata(total_pages));

    // The source document (and any downloaded temp dir) is done with.
    drop(resolved);

    // ── Step 5: Compose the canvas ───────────────────────────────────────
    let compose_start = Instant::now();
    let composed = {
        let bitmaps = rendered.bitmaps;
        let source = pdf_path.clone();
        let max_pixels = config.max_canvas_pixels;
        let progress = config.progress.clone();
        tokio::task::spawn_blocking(move || {
            compose::compose(&bitmaps, &source, max_pixels, progress.as_deref())
        })
        .await
        .map_err(|e| ConvertError::Internal(format!("Compose task panicked: {}", e)))??
    };
    let compose_duration_ms = compose_start.elapsed().as_millis() as u64;

    let canvas_width = composed.canvas.width();
    let canvas_height = composed.canvas.height();
    debug!(
        "Composed {}x{} canvas in {}ms",
        canvas_width, canvas_height, compose_duration_ms
    );

    // ── Step 6: Encode and write the artifact ────────────────────────────
    let encode_start = Instant::now();
    let bytes_written = {
        let canvas = composed.canvas;
        let dest = destination.clone();
        let quality = config.jpeg_quality;
        tokio::task::spawn_blocking(move || encode::encode_to_file(&canvas, &dest, format, quality))
            .await
            .map_err(|e| ConvertError::Internal(format!("Encode task panicked: {}", e)))??
    };
    let encode_duration_ms = encode_start.elapsed().as_millis() as u64;

    if let Some(ref p) = config.progress {
        p.on_conversion_complete(&destination, bytes_written);
    }

    let stats = ConversionStats {
        total_pages,
        scaled_pages: rendered.scaled_pages,
        clipped_pages: composed.clipped_pages,
        canvas_width,
        canvas_height,
        render_duration_ms,
        compose_duration_ms,
        encode_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages → {} ({:.2} MB) in {}ms",
        total_pages,
        destination.display(),
        bytes_written as f64 / (1024.0 * 1024.0),
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        output_path: destination,
        format,
        bytes_written,
        metadata,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    output: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, output, config))
}

/// Convert PDF bytes in memory to a long image.
///
/// Internally the library writes `bytes` to a managed [`tempfile`] and cleans
/// it up automatically on return or panic. Recommended when PDF data comes
/// from a database or network stream rather than a file on disk. Because the
/// temp file has no meaningful name, `output` is required here.
pub async fn convert_from_bytes(
    bytes: &[u8],
    output: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ConvertError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ConvertError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    // `tmp` is dropped (and the file deleted) when `convert` returns
    convert(&path, Some(output), config).await
}

/// Extract PDF metadata without converting content.
///
/// Always uses the pdfium backend.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, ConvertError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    let pdf_path = resolved.path().to_path_buf();
    render::extract_metadata(&pdf_path, None).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Default destination when the caller gives none. A downloaded input lands
/// in the current directory under the remote filename's stem, not inside the
/// temp dir that is about to be deleted.
fn default_destination(resolved: &ResolvedInput) -> PathBuf {
    match resolved {
        ResolvedInput::Local(path) => input::default_output_path(path),
        ResolvedInput::Downloaded { path, .. } => {
            let name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("downloaded.pdf"));
            input::default_output_path(&name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_destination_for_local_input() {
        let resolved = ResolvedInput::Local(PathBuf::from("/docs/report.pdf"));
        assert_eq!(
            default_destination(&resolved),
            PathBuf::from("/docs/report_long_image.png")
        );
    }

    #[tokio::test]
    async fn missing_source_fails_without_creating_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never_written.png");

        let config = ConversionConfig::default();
        let err = convert("missing.pdf", Some(&out), &config)
            .await
            .expect_err("must fail");

        assert!(matches!(err, ConvertError::SourceNotFound { .. }));
        assert!(!out.exists(), "no output file may be created on failure");
    }
}
