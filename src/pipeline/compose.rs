//! Canvas composition: stack page bitmaps vertically onto one canvas.
//!
//! The canvas width is locked to the first page's width; the height is the
//! exact sum of page heights. Narrower pages are horizontally centered on a
//! white background. A later page *wider* than the first is clipped to a
//! centered canvas-width strip — the alternative, widening the canvas after
//! allocation, would break the fixed-width invariant that makes this a
//! single-pass layout — and the clip is reported both in the log and through
//! the progress observer so it never happens silently.

use crate::error::ConvertError;
use crate::progress::ConversionProgress;
use image::imageops;
use image::{Rgb, RgbImage};
use std::path::Path;
use tracing::{debug, warn};

/// The stitched canvas plus composition counters.
#[derive(Debug)]
pub struct ComposedCanvas {
    pub canvas: RgbImage,
    /// Pages wider than the canvas whose sides were clipped.
    pub clipped_pages: usize,
}

/// Stack `bitmaps` top-to-bottom, in order, onto a white canvas.
///
/// `source` is only used for error context. Fails with
/// [`ConvertError::EmptyDocument`] on an empty page list and
/// [`ConvertError::OutputTooLarge`] when the canvas would exceed
/// `max_canvas_pixels` — pages are never silently dropped to fit.
pub fn compose(
    bitmaps: &[RgbImage],
    source: &Path,
    max_canvas_pixels: u64,
    progress: Option<&dyn ConversionProgress>,
) -> Result<ComposedCanvas, ConvertError> {
    let Some(first) = bitmaps.first() else {
        return Err(ConvertError::EmptyDocument {
            path: source.to_path_buf(),
        });
    };

    let base_width = first.width();
    let total_height: u64 = bitmaps.iter().map(|b| b.height() as u64).sum();
    let total_pixels = base_width as u64 * total_height;

    if total_pixels > max_canvas_pixels || total_height > u32::MAX as u64 {
        return Err(ConvertError::OutputTooLarge {
            width: base_width,
            height: total_height,
            pixels: total_pixels,
            limit: max_canvas_pixels,
        });
    }

    debug!("Allocating {}x{} canvas", base_width, total_height);
    let mut canvas = RgbImage::from_pixel(base_width, total_height as u32, Rgb([255, 255, 255]));
    if let Some(p) = progress {
        p.on_canvas_allocated(base_width, total_height as u32);
    }

    let total_pages = bitmaps.len();
    let mut clipped_pages = 0;
    let mut y: i64 = 0;

    for (index, bitmap) in bitmaps.iter().enumerate() {
        let clipped = bitmap.width() > base_width;
        if clipped {
            // Keep the horizontally centered canvas-width strip of the page.
            clipped_pages += 1;
            let left = (bitmap.width() - base_width) / 2;
            warn!(
                "Page {} is {}px wide, wider than the {}px canvas; clipping {}px from each side",
                index + 1,
                bitmap.width(),
                base_width,
                left
            );
            let strip = imageops::crop_imm(bitmap, left, 0, base_width, bitmap.height()).to_image();
            imageops::replace(&mut canvas, &strip, 0, y);
        } else {
            let x = ((base_width - bitmap.width()) / 2) as i64;
            imageops::replace(&mut canvas, bitmap, x, y);
        }

        if let Some(p) = progress {
            p.on_page_pasted(index + 1, total_pages, clipped);
        }
        y += bitmap.height() as i64;
    }

    Ok(ComposedCanvas {
        canvas,
        clipped_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, value: u8) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([value, value, value]))
    }

    fn compose_plain(bitmaps: &[RgbImage]) -> ComposedCanvas {
        compose(bitmaps, Path::new("test.pdf"), u64::MAX, None).expect("compose must succeed")
    }

    #[test]
    fn canvas_dimensions_are_first_width_and_summed_heights() {
        let pages = vec![solid(1275, 1650, 10), solid(1275, 1650, 20), solid(1275, 1650, 30)];
        let composed = compose_plain(&pages);
        assert_eq!(composed.canvas.width(), 1275);
        assert_eq!(composed.canvas.height(), 4950);
        assert_eq!(composed.clipped_pages, 0);
    }

    #[test]
    fn pages_are_pasted_at_cumulative_offsets() {
        let pages = vec![solid(100, 40, 10), solid(100, 60, 20), solid(100, 30, 30)];
        let composed = compose_plain(&pages);
        let canvas = &composed.canvas;

        assert_eq!(canvas.get_pixel(50, 0), &Rgb([10, 10, 10]));
        assert_eq!(canvas.get_pixel(50, 39), &Rgb([10, 10, 10]));
        assert_eq!(canvas.get_pixel(50, 40), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(50, 99), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(50, 100), &Rgb([30, 30, 30]));
        assert_eq!(canvas.get_pixel(50, 129), &Rgb([30, 30, 30]));
    }

    #[test]
    fn narrower_page_is_centered_on_white() {
        let pages = vec![solid(100, 10, 10), solid(60, 10, 20)];
        let composed = compose_plain(&pages);
        let canvas = &composed.canvas;

        // Margins of the second page's row are white, its middle is page color.
        assert_eq!(canvas.get_pixel(0, 15), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(19, 15), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(20, 15), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(79, 15), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(80, 15), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(99, 15), &Rgb([255, 255, 255]));
    }

    #[test]
    fn odd_width_difference_centers_with_floor() {
        let pages = vec![solid(11, 5, 10), solid(4, 5, 20)];
        let composed = compose_plain(&pages);
        let canvas = &composed.canvas;

        // (11 - 4) / 2 floors to 3: page occupies columns 3..7.
        assert_eq!(canvas.get_pixel(2, 7), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(3, 7), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(6, 7), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(7, 7), &Rgb([255, 255, 255]));
    }

    #[test]
    fn wider_page_is_clipped_to_canvas_width() {
        let pages = vec![solid(100, 10, 10), solid(160, 10, 20)];
        let composed = compose_plain(&pages);
        let canvas = &composed.canvas;

        assert_eq!(composed.clipped_pages, 1);
        assert_eq!(canvas.width(), 100);
        // The clipped page still fills its entire row edge to edge.
        assert_eq!(canvas.get_pixel(0, 15), &Rgb([20, 20, 20]));
        assert_eq!(canvas.get_pixel(99, 15), &Rgb([20, 20, 20]));
    }

    #[test]
    fn empty_page_list_is_an_explicit_error() {
        let err = compose(&[], Path::new("blank.pdf"), u64::MAX, None).expect_err("must fail");
        assert!(matches!(err, ConvertError::EmptyDocument { .. }));
    }

    #[test]
    fn oversized_canvas_is_rejected_not_truncated() {
        let pages = vec![solid(1000, 600, 10)];
        let err = compose(&pages, Path::new("big.pdf"), 500_000, None).expect_err("must fail");
        match err {
            ConvertError::OutputTooLarge {
                width,
                height,
                pixels,
                limit,
            } => {
                assert_eq!(width, 1000);
                assert_eq!(height, 600);
                assert_eq!(pixels, 600_000);
                assert_eq!(limit, 500_000);
            }
            other => panic!("expected OutputTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn single_page_canvas_equals_the_page() {
        let pages = vec![solid(300, 200, 42)];
        let composed = compose_plain(&pages);
        assert_eq!(composed.canvas.as_raw(), pages[0].as_raw());
    }
}
