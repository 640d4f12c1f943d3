//! Page scaling: fit rendered bitmaps to an optional maximum width.
//!
//! ## Why Lanczos?
//!
//! The bitmaps being shrunk are mostly rendered text. Nearest-neighbour and
//! box filters alias glyph stems into illegible smudges at typical reduction
//! ratios; Lanczos3 keeps strokes crisp, which is the whole point of
//! producing a readable long image.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Fit `bitmap` inside `max_width`, preserving aspect ratio.
///
/// Identity when `max_width` is unset or the bitmap is already narrow
/// enough — the input buffer is returned untouched, no reallocation.
/// Otherwise returns a Lanczos3-resampled copy of width `max_width` and
/// height `floor(h * max_width / w)`, clamped to at least 1 pixel.
///
/// The `bool` is true when a resample happened.
pub fn fit_width(bitmap: RgbImage, max_width: Option<u32>) -> (RgbImage, bool) {
    let Some(max_width) = max_width else {
        return (bitmap, false);
    };
    if bitmap.width() <= max_width {
        return (bitmap, false);
    }

    let ratio = max_width as f64 / bitmap.width() as f64;
    let new_height = ((bitmap.height() as f64 * ratio).floor() as u32).max(1);

    let scaled = imageops::resize(&bitmap, max_width, new_height, FilterType::Lanczos3);
    (scaled, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gray(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([100, 100, 100]))
    }

    #[test]
    fn unset_max_width_is_identity() {
        let (out, scaled) = fit_width(gray(1275, 1650), None);
        assert!(!scaled);
        assert_eq!((out.width(), out.height()), (1275, 1650));
    }

    #[test]
    fn narrow_enough_bitmap_is_identity() {
        let (out, scaled) = fit_width(gray(500, 700), Some(600));
        assert!(!scaled);
        assert_eq!((out.width(), out.height()), (500, 700));

        // Exactly at the bound is also untouched.
        let (out, scaled) = fit_width(gray(600, 700), Some(600));
        assert!(!scaled);
        assert_eq!(out.width(), 600);
    }

    #[test]
    fn wide_bitmap_is_scaled_to_max_width() {
        let (out, scaled) = fit_width(gray(1275, 1650), Some(600));
        assert!(scaled);
        assert_eq!(out.width(), 600);
        // 1650 * 600/1275 = 776.47 → floor
        assert_eq!(out.height(), 776);
    }

    #[test]
    fn aspect_ratio_preserved_within_rounding() {
        let orig_w = 1920u32;
        let orig_h = 1080u32;
        let (out, _) = fit_width(gray(orig_w, orig_h), Some(777));

        let orig_ratio = orig_h as f64 / orig_w as f64;
        let new_ratio = out.height() as f64 / out.width() as f64;
        // One pixel of rounding on a 777-wide image.
        assert!((new_ratio - orig_ratio).abs() < 1.0 / 777.0);
    }

    #[test]
    fn degenerate_height_clamps_to_one() {
        // 10000x1 shrunk to width 100 would floor to height 0.
        let (out, scaled) = fit_width(gray(10_000, 1), Some(100));
        assert!(scaled);
        assert_eq!((out.width(), out.height()), (100, 1));
    }

    #[test]
    fn scaling_is_idempotent_after_first_pass() {
        let (once, _) = fit_width(gray(1275, 1650), Some(600));
        let (w, h) = (once.width(), once.height());
        let (twice, scaled) = fit_width(once, Some(600));
        assert!(!scaled);
        assert_eq!((twice.width(), twice.height()), (w, h));
    }
}
