use ab_glyph::{Font, FontArc, Point};
use image::{imageops, Rgba, RgbaImage};

use super::layout;
use crate::grid::style::Rgb;

/// Minimal 2D drawing capability needed to rasterize and sample text.
pub trait Surface {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Paint every pixel with `color`.
    fn fill(&mut self, color: Rgb);

    /// Draw `text` as given, left to right, with its baseline starting at `origin`.
    fn draw_text(&mut self, text: &str, font: &FontArc, em_px: f32, origin: Point, color: Rgb);

    /// RGBA bytes of the rectangle, row-major. The rectangle is clipped to the surface.
    fn read_pixels(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<u8>;
}

/// Software surface backed by an RGBA image buffer.
#[derive(Clone, Debug)]
pub struct ImageSurface {
    image: RgbaImage,
}

impl ImageSurface {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, Rgba(background.to_rgba())) }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgb, coverage: f32) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }

        let pixel = self.image.get_pixel_mut(x, y);
        let [r, g, b, _] = pixel.0;
        let mixed = Rgb::new(r, g, b).mix(color, coverage);
        *pixel = Rgba(mixed.to_rgba());
    }
}

impl Surface for ImageSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill(&mut self, color: Rgb) {
        let color = Rgba(color.to_rgba());
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_text(&mut self, text: &str, font: &FontArc, em_px: f32, origin: Point, color: Rgb) {
        let (width, height) = self.image.dimensions();
        for glyph in layout::layout_glyphs(font, em_px, text, origin) {
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };

            let bounds = outlined.px_bounds();
            if bounds.max.x <= 0.0
                || bounds.max.y <= 0.0
                || bounds.min.x >= width as f32
                || bounds.min.y >= height as f32
            {
                continue;
            }

            // Float to int casts saturate, i64 leaves room for the glyph offsets.
            let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| {
                if coverage > 0.0 {
                    self.blend(left + i64::from(gx), top + i64::from(gy), color, coverage);
                }
            });
        }
    }

    fn read_pixels(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
        let (surface_width, surface_height) = self.image.dimensions();
        let x = x.min(surface_width);
        let y = y.min(surface_height);
        let width = width.min(surface_width - x);
        let height = height.min(surface_height - y);
        if width == 0 || height == 0 {
            return Vec::new();
        }

        imageops::crop_imm(&self.image, x, y, width, height).to_image().into_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ab_glyph::point;

    use crate::FontCatalog;

    #[test]
    fn read_pixels_clips_to_bounds() {
        let surface = ImageSurface::new(10, 4, Rgb::WHITE);
        assert_eq!(surface.read_pixels(0, 0, 2, 2).len(), 2 * 2 * 4);
        assert_eq!(surface.read_pixels(8, 2, 5, 5).len(), 2 * 2 * 4);
        assert!(surface.read_pixels(10, 0, 3, 3).is_empty());
        assert!(surface.read_pixels(0, 0, 0, 3).is_empty());
    }

    #[test]
    fn fill_replaces_every_pixel() {
        let mut surface = ImageSurface::new(3, 3, Rgb::WHITE);
        surface.fill(Rgb::FUCHSIA);
        assert!(surface.image().pixels().all(|pixel| pixel.0 == Rgb::FUCHSIA.to_rgba()));
    }

    #[test]
    fn drawn_text_darkens_pixels() {
        let font = FontCatalog::embedded().resolve("sans-serif", 700).unwrap();
        let mut surface = ImageSurface::new(100, 100, Rgb::WHITE);
        surface.draw_text("H", &font, 80.0, point(10.0, 80.0), Rgb::BLACK);
        let dark = surface.image().pixels().filter(|pixel| pixel.0[0] < 128).count();
        assert!(dark > 100, "only {dark} dark pixels");
    }

    #[test]
    fn text_outside_the_surface_is_dropped() {
        let font = FontCatalog::embedded().resolve("sans-serif", 700).unwrap();
        let mut surface = ImageSurface::new(50, 50, Rgb::WHITE);
        surface.draw_text("H", &font, 40.0, point(500.0, 500.0), Rgb::BLACK);
        surface.draw_text("H", &font, 40.0, point(-500.0, -500.0), Rgb::BLACK);
        surface.draw_text("H", &font, 40.0, point(10.0, 3.0e9), Rgb::BLACK);
        surface.draw_text("H", &font, 40.0, point(-3.0e9, 30.0), Rgb::BLACK);
        assert!(surface.image().pixels().all(|pixel| pixel.0 == Rgb::WHITE.to_rgba()));
    }
}
