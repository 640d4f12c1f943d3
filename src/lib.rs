//! # pdf2long
//!
//! Convert a multi-page PDF into a single vertically-stitched raster image
//! (a "long image") suitable for continuous-scrolling viewing.
//!
//! ## Why this crate?
//!
//! Sharing a PDF as a screenshot-friendly image usually means exporting every
//! page separately and stitching them by hand. This crate rasterises each
//! page via pdfium at a configurable DPI, optionally shrinks wide pages to a
//! maximum width, stacks everything onto one white canvas, and writes a
//! single PNG or JPEG.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Render   rasterise every page via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Scale    Lanczos-downscale pages wider than max_width
//!  ├─ 4. Compose  stack pages onto one white canvas, centered
//!  └─ 5. Encode   PNG (lossless) or JPEG (quality 1–100), atomic write
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2long::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .dpi(150)
//!         .max_width(1200)
//!         .build()?;
//!     let output = convert("document.pdf", None, &config).await?;
//!     println!("{}", output.output_path.display());
//!     eprintln!(
//!         "{} pages → {}x{} px, {} bytes",
//!         output.stats.total_pages,
//!         output.stats.canvas_width,
//!         output.stats.canvas_height,
//!         output.bytes_written
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2long` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2long = { version = "0.3", default-features = false }
//! ```
//!
//! ## Choosing a DPI
//!
//! | DPI | Output | Best for |
//! |-----|--------|----------|
//! | 72–96   | compact | quick previews, thumbnails |
//! | 150     | balanced (default) | reading on screens |
//! | 200–300 | sharp, large | small fonts, printing |
//!
//! Combine a high DPI with `max_width` to render sharply and still bound the
//! output width.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, MAX_DPI, MIN_DPI};
pub use convert::{convert, convert_from_bytes, convert_sync, inspect};
pub use error::ConvertError;
pub use output::{ConversionOutput, ConversionStats, DocumentMetadata};
pub use pipeline::encode::OutputFormat;
pub use pipeline::render::{PageRasterizer, PageSink, PdfiumRasterizer};
pub use progress::{ConversionProgress, NoopProgress, ProgressObserver};
