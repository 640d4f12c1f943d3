//! Error types for the pdf2long library.
//!
//! A single fatal taxonomy: every stage failure aborts the whole conversion.
//! There is deliberately no per-page "soft" error type — a long image with a
//! silently missing or blank page is worse than no image at all, so a page
//! that cannot be rasterized fails the run.
//!
//! Variants carry enough context (paths, page numbers, limits) for the CLI to
//! print an actionable message without any extra lookup.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2long library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the source file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt or unsupported: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptDocument { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The document opened cleanly but contains no pages, so there is no
    /// first page to derive the canvas width from.
    #[error("PDF '{path}' contains no pages — nothing to stitch")]
    EmptyDocument { path: PathBuf },

    /// pdfium returned an error for a specific page. Fatal: the long image
    /// must contain every page or none.
    #[error("Rasterization failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── Composition errors ────────────────────────────────────────────────
    /// The stitched canvas would exceed the configured pixel budget.
    #[error("Output canvas would be {width}x{height} ({pixels} pixels), above the {limit}-pixel limit.\nLower --dpi or set --max-width to shrink pages.")]
    OutputTooLarge {
        width: u32,
        height: u64,
        pixels: u64,
        limit: u64,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The image codec rejected the canvas.
    #[error("Failed to encode output image '{path}': {detail}")]
    EncodeFailed { path: PathBuf, detail: String },

    /// Could not create or write the output image file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed (DPI or quality out of bounds).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the pdf2long executable.\n\
  • Install pdfium as a system library.\n\
  • Point PDFIUM_DYNAMIC_LIB_PATH at a directory containing libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_display_names_path() {
        let e = ConvertError::SourceNotFound {
            path: PathBuf::from("missing.pdf"),
        };
        assert!(e.to_string().contains("missing.pdf"));
    }

    #[test]
    fn render_failed_display_names_page() {
        let e = ConvertError::RenderFailed {
            page: 3,
            detail: "bad content stream".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(msg.contains("bad content stream"));
    }

    #[test]
    fn output_too_large_display_names_limit() {
        let e = ConvertError::OutputTooLarge {
            width: 10_000,
            height: 80_000,
            pixels: 800_000_000,
            limit: 536_870_912,
        };
        let msg = e.to_string();
        assert!(msg.contains("800000000"), "got: {msg}");
        assert!(msg.contains("536870912"));
    }

    #[test]
    fn empty_document_display() {
        let e = ConvertError::EmptyDocument {
            path: PathBuf::from("blank.pdf"),
        };
        assert!(e.to_string().contains("no pages"));
    }
}
