//! Progress-observer trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgress>`] via
//! [`crate::config::ConversionConfigBuilder::progress`] to receive events as
//! the pipeline renders, scales, and pastes each page.
//!
//! # Why callbacks instead of captured output?
//!
//! The observer is the least-invasive integration point: callers can forward
//! events to a terminal progress bar, a GUI log panel, or a channel without
//! the library knowing how the host application communicates. Events are
//! advisory notifications only — there is no backpressure and the pipeline
//! never waits on the observer. The trait is `Send + Sync` because events are
//! emitted from the blocking worker thread that runs the pipeline.

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in strict pipeline order: one
/// `on_conversion_start`, then per page `on_page_start` →
/// `on_page_rendered` → (`on_page_scaled`), then `on_canvas_allocated`,
/// per page `on_page_pasted`, and finally `on_conversion_complete`.
pub trait ConversionProgress: Send + Sync {
    /// Called once after the document has been opened and counted.
    ///
    /// # Arguments
    /// * `source`      — resolved local path of the PDF being converted
    /// * `output`      — final destination path (extension already resolved)
    /// * `dpi`         — render density in use
    /// * `total_pages` — number of pages that will be processed
    fn on_conversion_start(&self, source: &Path, output: &Path, dpi: u32, total_pages: usize) {
        let _ = (source, output, dpi, total_pages);
    }

    /// Called just before a page is rasterized ("processing page i/n").
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been rasterized, with its pixel dimensions.
    fn on_page_rendered(&self, page_num: usize, total_pages: usize, width: u32, height: u32) {
        let _ = (page_num, total_pages, width, height);
    }

    /// Called only when a page was wider than `max_width` and got downscaled.
    fn on_page_scaled(&self, page_num: usize, width: u32, height: u32) {
        let _ = (page_num, width, height);
    }

    /// Called once when the output canvas has been sized and allocated.
    fn on_canvas_allocated(&self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called when a page has been pasted onto the canvas ("pasting page i").
    ///
    /// `clipped` is true when the page was wider than the canvas and only a
    /// centered canvas-width region of it was pasted.
    fn on_page_pasted(&self, page_num: usize, total_pages: usize, clipped: bool) {
        let _ = (page_num, total_pages, clipped);
    }

    /// Called once after the artifact has been written.
    ///
    /// # Arguments
    /// * `output` — final (possibly rewritten) output path
    /// * `bytes`  — size of the written file
    fn on_conversion_complete(&self, output: &Path, bytes: u64) {
        let _ = (output, bytes);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no observer is configured.
pub struct NoopProgress;

impl ConversionProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressObserver = Arc<dyn ConversionProgress>;
