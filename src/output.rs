//! Result types returned by the conversion entry points.
//!
//! Everything here derives `Serialize`/`Deserialize` so the CLI `--json` mode
//! and embedding applications get a machine-readable record of the run
//! without any extra glue.

use crate::pipeline::encode::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The result of a successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Final output path. May differ from the requested destination when the
    /// extension was unrecognized and rewritten to `.png`.
    pub output_path: PathBuf,

    /// Encoding the artifact was written with.
    pub format: OutputFormat,

    /// Size of the written file in bytes.
    pub bytes_written: u64,

    /// Document metadata read before rendering.
    pub metadata: DocumentMetadata,

    /// Counters and per-stage timings.
    pub stats: ConversionStats,
}

/// Counters and timings for a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document (all of them are stitched).
    pub total_pages: usize,

    /// Pages that were wider than `max_width` and got downscaled.
    pub scaled_pages: usize,

    /// Pages wider than the canvas whose sides were clipped during pasting.
    pub clipped_pages: usize,

    /// Width of the stitched canvas (width of the first processed page).
    pub canvas_width: u32,

    /// Height of the stitched canvas (sum of all page heights).
    pub canvas_height: u32,

    /// Wall-clock time spent rasterizing and scaling pages.
    pub render_duration_ms: u64,

    /// Wall-clock time spent allocating the canvas and pasting pages.
    pub compose_duration_ms: u64,

    /// Wall-clock time spent encoding and writing the artifact.
    pub encode_duration_ms: u64,

    /// Total wall-clock time for the conversion.
    pub total_duration_ms: u64,
}

/// PDF document metadata, read without rendering any page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
