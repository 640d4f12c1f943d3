//! PDF rasterisation: render every page to an `RgbImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## The backend seam
//!
//! The pipeline needs exactly one capability from a rendering engine: open a
//! document and feed every page, rasterized at a zoom factor, to a sink in
//! page order. That is [`PageRasterizer`]; [`PdfiumRasterizer`] is the
//! default backend. Tests inject a synthetic backend through
//! [`crate::config::ConversionConfig::rasterizer`] so the whole pipeline runs
//! without a pdfium library present. The pdfium handle lives entirely inside
//! one `rasterize` call — nothing engine-specific leaks across the seam.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::DocumentMetadata;
use crate::pipeline::scale;
use crate::progress::{ConversionProgress, ProgressObserver};
use image::RgbImage;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// A rendering engine capable of rasterizing whole documents.
///
/// `Send + Sync` so a backend can be stored in [`ConversionConfig`] and moved
/// into the blocking worker thread.
pub trait PageRasterizer: Send + Sync {
    /// Open `source` and rasterize every page at `zoom` into flat RGB pixels,
    /// feeding the sink in strict page order.
    ///
    /// Page bitmap dimensions are `round(native_w * zoom)` ×
    /// `round(native_h * zoom)` where native dimensions are in PDF points
    /// (72 per inch). All visual content — vector graphics, embedded images,
    /// text glyphs — is flattened into the bitmap.
    ///
    /// All decode state must be released before this returns; the source is
    /// never read again afterwards.
    fn rasterize(
        &self,
        source: &Path,
        password: Option<&str>,
        zoom: f32,
        sink: &mut dyn PageSink,
    ) -> Result<(), ConvertError>;
}

/// Receives rasterization results from a [`PageRasterizer`], in page order.
pub trait PageSink {
    /// The document has been opened and counted. Returning an error aborts
    /// before any page is rendered.
    fn on_document_open(&mut self, total_pages: usize) -> Result<(), ConvertError>;

    /// Page `index` (0-based) is about to be rasterized.
    fn on_page_begin(&mut self, index: usize, total_pages: usize);

    /// Page `index` has been rasterized. Returning an error aborts the run.
    fn on_page(
        &mut self,
        index: usize,
        total_pages: usize,
        bitmap: RgbImage,
    ) -> Result<(), ConvertError>;
}

// ── Pdfium backend ───────────────────────────────────────────────────────

/// Default rasterization backend, using the pdfium library.
///
/// A pdfium binding is created per call, entirely on the calling thread;
/// nothing is shared, so the unit struct is trivially `Send + Sync`.
pub struct PdfiumRasterizer;

/// Locate and bind libpdfium: explicit env override, then next to the
/// executable, then the current directory, then the system library path.
fn bind_pdfium() -> Result<Pdfium, ConvertError> {
    if let Ok(dir) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        return Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
            .map(Pdfium::new)
            .map_err(|e| {
                ConvertError::PdfiumBindingFailed(format!(
                    "{e:?} (from PDFIUM_DYNAMIC_LIB_PATH={dir})"
                ))
            });
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()));

    if let Some(dir) = exe_dir {
        if let Ok(bindings) =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        {
            return Ok(Pdfium::new(bindings));
        }
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Map a pdfium open error to the right taxonomy entry.
fn map_open_error(e: PdfiumError, path: &Path, password: Option<&str>) -> ConvertError {
    let err_str = format!("{e:?}");
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ConvertError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        ConvertError::CorruptDocument {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(
        &self,
        source: &Path,
        password: Option<&str>,
        zoom: f32,
        sink: &mut dyn PageSink,
    ) -> Result<(), ConvertError> {
        let pdfium = bind_pdfium()?;
        let document = pdfium
            .load_pdf_from_file(source, password)
            .map_err(|e| map_open_error(e, source, password))?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        sink.on_document_open(total_pages)?;

        for index in 0..total_pages {
            sink.on_page_begin(index, total_pages);

            let page = pages
                .get(index as u16)
                .map_err(|e| ConvertError::RenderFailed {
                    page: index + 1,
                    detail: format!("{e:?}"),
                })?;

            // Native page size is in PDF points; zoom is dpi / 72.
            let target_w = (page.width().value * zoom).round().max(1.0) as i32;
            let target_h = (page.height().value * zoom).round().max(1.0) as i32;

            let render_config = PdfRenderConfig::new()
                .set_target_width(target_w)
                .set_target_height(target_h);

            let bitmap =
                page.render_with_config(&render_config)
                    .map_err(|e| ConvertError::RenderFailed {
                        page: index + 1,
                        detail: format!("{e:?}"),
                    })?;

            // pdfium renders RGBA over a white background; the pipeline is RGB-only.
            sink.on_page(index, total_pages, bitmap.as_image().into_rgb8())?;
        }

        // The document (and with it all decode state) is dropped here; the
        // source file is never read again.
        Ok(())
    }
}

// ── Pipeline stage ───────────────────────────────────────────────────────

/// Rasterized (and scaled) pages plus the counters the stats need.
#[derive(Debug)]
pub struct RenderedPages {
    /// One bitmap per page, in page order, already scaled to `max_width`.
    pub bitmaps: Vec<RgbImage>,
    /// Pages that were downscaled to fit `max_width`.
    pub scaled_pages: usize,
}

/// Drives a [`PageRasterizer`]: fires progress events, scales each page as
/// it arrives, and collects the results. Scaling inside the sink keeps the
/// full-resolution bitmap of a wide page from outliving its iteration.
struct RenderDriver<'a> {
    pdf_path: &'a Path,
    output_path: &'a Path,
    dpi: u32,
    max_width: Option<u32>,
    progress: Option<&'a dyn ConversionProgress>,
    bitmaps: Vec<RgbImage>,
    scaled_pages: usize,
}

impl PageSink for RenderDriver<'_> {
    fn on_document_open(&mut self, total_pages: usize) -> Result<(), ConvertError> {
        if total_pages == 0 {
            return Err(ConvertError::EmptyDocument {
                path: self.pdf_path.to_path_buf(),
            });
        }
        if let Some(p) = self.progress {
            p.on_conversion_start(self.pdf_path, self.output_path, self.dpi, total_pages);
        }
        self.bitmaps.reserve(total_pages);
        Ok(())
    }

    fn on_page_begin(&mut self, index: usize, total_pages: usize) {
        if let Some(p) = self.progress {
            p.on_page_start(index + 1, total_pages);
        }
    }

    fn on_page(
        &mut self,
        index: usize,
        total_pages: usize,
        bitmap: RgbImage,
    ) -> Result<(), ConvertError> {
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            bitmap.width(),
            bitmap.height()
        );
        if let Some(p) = self.progress {
            p.on_page_rendered(index + 1, total_pages, bitmap.width(), bitmap.height());
        }

        let (bitmap, was_scaled) = scale::fit_width(bitmap, self.max_width);
        if was_scaled {
            self.scaled_pages += 1;
            debug!(
                "Scaled page {} → {}x{} px",
                index + 1,
                bitmap.width(),
                bitmap.height()
            );
            if let Some(p) = self.progress {
                p.on_page_scaled(index + 1, bitmap.width(), bitmap.height());
            }
        }

        self.bitmaps.push(bitmap);
        Ok(())
    }
}

/// Rasterise and scale every page of the document.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
pub async fn render_pages(
    pdf_path: &Path,
    output_path: &Path,
    config: &ConversionConfig,
) -> Result<RenderedPages, ConvertError> {
    let path = pdf_path.to_path_buf();
    let output = output_path.to_path_buf();
    let dpi = config.dpi;
    let zoom = config.zoom();
    let max_width = config.max_width;
    let password = config.password.clone();
    let progress: Option<ProgressObserver> = config.progress.clone();
    let rasterizer: Arc<dyn PageRasterizer> = config
        .rasterizer
        .clone()
        .unwrap_or_else(|| Arc::new(PdfiumRasterizer));

    tokio::task::spawn_blocking(move || {
        let mut driver = RenderDriver {
            pdf_path: &path,
            output_path: &output,
            dpi,
            max_width,
            progress: progress.as_deref(),
            bitmaps: Vec::new(),
            scaled_pages: 0,
        };
        rasterizer.rasterize(&path, password.as_deref(), zoom, &mut driver)?;
        Ok(RenderedPages {
            bitmaps: driver.bitmaps,
            scaled_pages: driver.scaled_pages,
        })
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("Render task panicked: {}", e)))?
}

// ── Metadata ─────────────────────────────────────────────────────────────

/// Extract document metadata from a PDF without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, ConvertError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| ConvertError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, ConvertError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_open_error(e, pdf_path, password))?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

/// Minimal metadata for non-pdfium backends, where only the page count is
/// knowable through the narrow rasterizer interface.
pub(crate) fn synthetic_metadata(page_count: usize) -> DocumentMetadata {
    DocumentMetadata {
        title: None,
        author: None,
        subject: None,
        creator: None,
        producer: None,
        creation_date: None,
        modification_date: None,
        page_count,
        pdf_version: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Synthetic backend: fixed-size gray pages, no pdfium required.
    struct FakeRasterizer {
        pages: usize,
        native_w: f32,
        native_h: f32,
    }

    impl PageRasterizer for FakeRasterizer {
        fn rasterize(
            &self,
            _source: &Path,
            _password: Option<&str>,
            zoom: f32,
            sink: &mut dyn PageSink,
        ) -> Result<(), ConvertError> {
            sink.on_document_open(self.pages)?;
            for index in 0..self.pages {
                sink.on_page_begin(index, self.pages);
                let w = (self.native_w * zoom).round() as u32;
                let h = (self.native_h * zoom).round() as u32;
                sink.on_page(
                    index,
                    self.pages,
                    RgbImage::from_pixel(w, h, Rgb([128, 128, 128])),
                )?;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn render_pages_dimensions_follow_zoom() {
        // US Letter is 612x792 points; 150 DPI is a zoom of 150/72.
        let config = ConversionConfig::builder()
            .dpi(150)
            .rasterizer(Arc::new(FakeRasterizer {
                pages: 1,
                native_w: 612.0,
                native_h: 792.0,
            }))
            .build()
            .unwrap();

        let rendered = render_pages(Path::new("fake.pdf"), Path::new("fake_long_image.png"), &config)
            .await
            .expect("render must succeed");

        assert_eq!(rendered.bitmaps.len(), 1);
        assert_eq!(rendered.bitmaps[0].width(), 1275);
        assert_eq!(rendered.bitmaps[0].height(), 1650);
        assert_eq!(rendered.scaled_pages, 0);
    }

    #[tokio::test]
    async fn render_pages_scales_and_counts() {
        let config = ConversionConfig::builder()
            .dpi(150)
            .max_width(600)
            .rasterizer(Arc::new(FakeRasterizer {
                pages: 3,
                native_w: 612.0,
                native_h: 792.0,
            }))
            .build()
            .unwrap();

        let rendered = render_pages(Path::new("fake.pdf"), Path::new("fake_long_image.png"), &config)
            .await
            .expect("render must succeed");

        assert_eq!(rendered.bitmaps.len(), 3);
        assert_eq!(rendered.scaled_pages, 3);
        for bitmap in &rendered.bitmaps {
            assert_eq!(bitmap.width(), 600);
            // 1650 * 600/1275 = 776.47 → floor
            assert_eq!(bitmap.height(), 776);
        }
    }

    #[tokio::test]
    async fn render_pages_rejects_empty_document() {
        let config = ConversionConfig::builder()
            .rasterizer(Arc::new(FakeRasterizer {
                pages: 0,
                native_w: 612.0,
                native_h: 792.0,
            }))
            .build()
            .unwrap();

        let err = render_pages(Path::new("empty.pdf"), Path::new("empty_long_image.png"), &config)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ConvertError::EmptyDocument { .. }));
    }
}
