//! Page compositing onto the viewer canvas
//!
//! Single layout fits the page into the whole canvas, centered. Dual
//! layout fits each page into half the canvas width; the primary page is
//! right-aligned to the midline and the secondary left-aligned to it, so
//! the two halves of a spread touch in the middle.

use fast_image_resize::images::Image as ResizeImage;
use fast_image_resize::{PixelType, ResizeOptions, Resizer};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use tracing::trace;

use crate::config::ResizeFilter;
use crate::pagination::PageRole;
use crate::utils::error::{CbzError, Result};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Where and how large a page lands on the canvas, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Placement {
    /// Compute the placement of a `image_width` x `image_height` page
    ///
    /// Returns `None` when either the canvas or the image has no area.
    pub fn compute(
        canvas_width: u32,
        canvas_height: u32,
        image_width: u32,
        image_height: u32,
        role: PageRole,
        dual_layout: bool,
    ) -> Option<Self> {
        if canvas_width == 0 || canvas_height == 0 || image_width == 0 || image_height == 0 {
            return None;
        }

        let cw = f64::from(canvas_width);
        let ch = f64::from(canvas_height);
        let iw = f64::from(image_width);
        let ih = f64::from(image_height);

        if !dual_layout {
            let scale = (cw / iw).min(ch / ih);
            let width = iw * scale;
            let height = ih * scale;
            return Some(Self {
                x: (cw - width) / 2.0,
                y: (ch - height) / 2.0,
                width,
                height,
                scale,
            });
        }

        let half = cw / 2.0;
        let scale = (half / iw).min(ch / ih);
        let width = iw * scale;
        let height = ih * scale;
        let x = match role {
            PageRole::Primary => half - width,
            PageRole::Secondary => half,
        };

        Some(Self {
            x,
            y: (ch - height) / 2.0,
            width,
            height,
            scale,
        })
    }
}

/// RGBA drawing surface pages are composited onto
pub struct Canvas {
    pixels: RgbaImage,
    resizer: Resizer,
    filter: ResizeFilter,
}

impl Canvas {
    pub fn new(width: u32, height: u32, filter: ResizeFilter) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            resizer: Resizer::new(),
            filter,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Replace the surface with a blank one of the new size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::from_pixel(width, height, TRANSPARENT);
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// Draw a decoded page
    ///
    /// Primary draws clear the canvas first; secondary draws leave the
    /// primary half in place. Returns the placement used, or `None` if
    /// there was nothing to draw.
    pub fn draw(
        &mut self,
        image: &DynamicImage,
        role: PageRole,
        dual_layout: bool,
    ) -> Result<Option<Placement>> {
        if role == PageRole::Primary {
            self.clear();
        }

        let placement = match Placement::compute(
            self.width(),
            self.height(),
            image.width(),
            image.height(),
            role,
            dual_layout,
        ) {
            Some(placement) => placement,
            None => return Ok(None),
        };

        let dst_width = (placement.width.round() as u32).max(1);
        let dst_height = (placement.height.round() as u32).max(1);
        let scaled = self.scale(image, dst_width, dst_height)?;

        imageops::overlay(
            &mut self.pixels,
            &scaled,
            placement.x.round() as i64,
            placement.y.round() as i64,
        );

        trace!(?role, dual_layout, ?placement, "Page drawn");
        Ok(Some(placement))
    }

    fn scale(&mut self, image: &DynamicImage, width: u32, height: u32) -> Result<RgbaImage> {
        let rgba = image.to_rgba8();
        if rgba.dimensions() == (width, height) {
            return Ok(rgba);
        }

        let (src_width, src_height) = rgba.dimensions();
        let src = ResizeImage::from_vec_u8(src_width, src_height, rgba.into_raw(), PixelType::U8x4)
            .map_err(|e| CbzError::DecodeFailure(format!("Invalid bitmap buffer: {}", e)))?;
        let mut dst = ResizeImage::new(width, height, PixelType::U8x4);

        let options = ResizeOptions::new().resize_alg(self.filter.resize_alg());
        self.resizer
            .resize(&src, &mut dst, &options)
            .map_err(|e| CbzError::DecodeFailure(format!("Failed to scale page: {}", e)))?;

        RgbaImage::from_raw(width, height, dst.into_vec())
            .ok_or_else(|| CbzError::DecodeFailure("Scaled buffer has wrong size".to_string()))
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("filter", &self.filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn test_single_layout_bound_by_height() {
        let p = Placement::compute(100, 100, 50, 100, PageRole::Primary, false).unwrap();
        assert_eq!(p.scale, 1.0);
        assert_eq!(p.x, 25.0);
        assert_eq!(p.y, 0.0);
        assert_eq!((p.width, p.height), (50.0, 100.0));
    }

    #[test]
    fn test_single_layout_bound_by_width() {
        let p = Placement::compute(100, 100, 200, 100, PageRole::Primary, false).unwrap();
        assert_eq!(p.scale, 0.5);
        assert_eq!((p.x, p.y), (0.0, 25.0));
    }

    #[test]
    fn test_dual_layout_pages_touch_at_midline() {
        let left = Placement::compute(200, 100, 50, 100, PageRole::Primary, true).unwrap();
        assert_eq!(left.scale, 1.0);
        assert_eq!(left.x + left.width, 100.0);
        assert_eq!(left.x, 50.0);

        let right = Placement::compute(200, 100, 50, 100, PageRole::Secondary, true).unwrap();
        assert_eq!(right.x, 100.0);
        assert_eq!(right.y, 0.0);
    }

    #[test]
    fn test_dual_layout_scales_to_half_width() {
        let p = Placement::compute(200, 300, 200, 100, PageRole::Primary, true).unwrap();
        assert_eq!(p.scale, 0.5);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 125.0);
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(Placement::compute(0, 100, 10, 10, PageRole::Primary, false).is_none());
        assert!(Placement::compute(100, 100, 0, 10, PageRole::Primary, false).is_none());
    }

    #[test]
    fn test_draw_single_centers_page() {
        let mut canvas = Canvas::new(100, 100, ResizeFilter::Nearest);
        let red = [255, 0, 0, 255];
        canvas.draw(&solid(50, 100, red), PageRole::Primary, false).unwrap();

        assert_eq!(canvas.pixels().get_pixel(24, 50), &TRANSPARENT);
        assert_eq!(canvas.pixels().get_pixel(25, 50), &Rgba(red));
        assert_eq!(canvas.pixels().get_pixel(74, 50), &Rgba(red));
        assert_eq!(canvas.pixels().get_pixel(75, 50), &TRANSPARENT);
    }

    #[test]
    fn test_secondary_draw_preserves_primary() {
        let mut canvas = Canvas::new(200, 100, ResizeFilter::Nearest);
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];

        canvas.draw(&solid(50, 100, red), PageRole::Primary, true).unwrap();
        canvas.draw(&solid(50, 100, blue), PageRole::Secondary, true).unwrap();

        assert_eq!(canvas.pixels().get_pixel(49, 50), &TRANSPARENT);
        assert_eq!(canvas.pixels().get_pixel(50, 50), &Rgba(red));
        assert_eq!(canvas.pixels().get_pixel(99, 50), &Rgba(red));
        assert_eq!(canvas.pixels().get_pixel(100, 50), &Rgba(blue));
        assert_eq!(canvas.pixels().get_pixel(149, 50), &Rgba(blue));
        assert_eq!(canvas.pixels().get_pixel(150, 50), &TRANSPARENT);
    }

    #[test]
    fn test_primary_draw_clears_previous_page() {
        let mut canvas = Canvas::new(100, 100, ResizeFilter::Nearest);
        canvas.draw(&solid(100, 100, [0, 255, 0, 255]), PageRole::Primary, false).unwrap();
        canvas.draw(&solid(10, 100, [255, 0, 0, 255]), PageRole::Primary, false).unwrap();
        assert_eq!(canvas.pixels().get_pixel(0, 0), &TRANSPARENT);
    }

    #[test]
    fn test_draw_scales_large_page() {
        let mut canvas = Canvas::new(40, 40, ResizeFilter::Bilinear);
        let placement = canvas
            .draw(&solid(400, 200, [9, 9, 9, 255]), PageRole::Primary, false)
            .unwrap()
            .unwrap();
        assert_eq!(placement.scale, 0.1);
        assert_eq!(canvas.pixels().get_pixel(20, 20), &Rgba([9, 9, 9, 255]));
        assert_eq!(canvas.pixels().get_pixel(20, 5), &TRANSPARENT);
    }

    #[test]
    fn test_draw_on_empty_canvas_is_noop() {
        let mut canvas = Canvas::new(0, 0, ResizeFilter::Nearest);
        let placement = canvas
            .draw(&solid(5, 5, [1, 2, 3, 255]), PageRole::Primary, false)
            .unwrap();
        assert!(placement.is_none());
    }
}
