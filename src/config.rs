//! Configuration types for PDF-to-long-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest. Validation happens once, in
//! [`ConversionConfigBuilder::build`], so an out-of-range DPI or JPEG quality
//! is rejected before any document is opened.

use crate::error::ConvertError;
use crate::pipeline::render::PageRasterizer;
use crate::progress::ProgressObserver;
use std::fmt;
use std::sync::Arc;

/// Lowest DPI accepted by the config layer.
pub const MIN_DPI: u32 = 50;
/// Highest DPI accepted by the config layer.
pub const MAX_DPI: u32 = 600;

/// Default cap on the stitched canvas, in pixels (512 Mpx ≈ 1.5 GiB of RGB).
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 536_870_912;

/// Configuration for a PDF-to-long-image conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2long::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(200)
///     .jpeg_quality(90)
///     .max_width(1200)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 50–600. Default: 150.
    ///
    /// PDF native density is 72 units per inch, so the effective zoom applied
    /// during rasterization is `dpi / 72.0` on both axes. 150 keeps text
    /// readable on a phone screen while bounding file size; go to 200–300 for
    /// small-font documents, down to 72–96 when the output only needs to be
    /// skimmed.
    pub dpi: u32,

    /// JPEG quality factor, 1–100. Default: 95. Only used when the
    /// destination extension selects JPEG; PNG output ignores it.
    pub jpeg_quality: u8,

    /// Maximum page width in pixels. Default: None (unrestricted).
    ///
    /// When set, any rendered page wider than this is downscaled to exactly
    /// this width (height reduced proportionally) with Lanczos resampling
    /// before it is stitched. The main lever for taming A0-sized pages or
    /// very high DPI settings.
    pub max_width: Option<u32>,

    /// Cap on total canvas pixels (width × height). Default: 512 Mpx.
    ///
    /// A thousand-page document at 300 DPI would ask for a canvas no
    /// allocator should grant. Exceeding this cap fails the conversion with
    /// [`ConvertError::OutputTooLarge`] instead of truncating pages silently.
    pub max_canvas_pixels: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Progress observer receiving per-page events. Default: none.
    pub progress: Option<ProgressObserver>,

    /// Rasterization backend. Default: pdfium
    /// ([`crate::pipeline::render::PdfiumRasterizer`]). Injectable so tests
    /// and embedders can swap in an alternate engine.
    pub rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            jpeg_quality: 95,
            max_width: None,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
            password: None,
            download_timeout_secs: 120,
            progress: None,
            rasterizer: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("max_width", &self.max_width)
            .field("max_canvas_pixels", &self.max_canvas_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn ConversionProgress>"))
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn PageRasterizer>"))
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The zoom factor applied during rasterization (`dpi / 72.0`).
    pub fn zoom(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    pub fn max_width(mut self, px: u32) -> Self {
        self.config.max_width = Some(px);
        self
    }

    pub fn max_canvas_pixels(mut self, px: u64) -> Self {
        self.config.max_canvas_pixels = px;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress(mut self, observer: ProgressObserver) -> Self {
        self.config.progress = Some(observer);
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// Rejects (never clamps) out-of-range values: a caller asking for
    /// DPI 10 gets an error, not a silently different image.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.jpeg_quality < 1 {
            return Err(ConvertError::InvalidConfig(
                "JPEG quality must be 1–100, got 0".into(),
            ));
        }
        if c.jpeg_quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpeg_quality
            )));
        }
        if c.max_width == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "max_width must be a positive pixel count".into(),
            ));
        }
        if c.max_canvas_pixels == 0 {
            return Err(ConvertError::InvalidConfig(
                "max_canvas_pixels must be positive".into(),
            ));
        }
        Ok(self.config)
    }
}
