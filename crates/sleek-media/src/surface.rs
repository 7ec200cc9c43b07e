//! Offscreen Surface
//!
//! A tiny-skia pixmap used as the drawing target for resampling.

use image::RgbaImage;
use tiny_skia::{ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::MediaError;

/// Offscreen RGBA drawing surface
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self, MediaError> {
        let pixmap = Pixmap::new(width, height).ok_or(MediaError::ContextUnavailable { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Draw an image stretched over the whole surface with bicubic filtering
    pub fn draw_image(&mut self, image: &RgbaImage) -> Result<(), MediaError> {
        let source = to_pixmap(image)?;
        let sx = self.width() as f32 / source.width() as f32;
        let sy = self.height() as f32 / source.height() as f32;

        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, Transform::from_scale(sx, sy), None);
        Ok(())
    }

    /// Read back as straight-alpha RGBA
    pub fn to_rgba(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width(), self.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
        }
        out
    }
}

fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, MediaError> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(MediaError::ContextUnavailable { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}
