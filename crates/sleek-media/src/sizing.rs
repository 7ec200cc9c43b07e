//! Target Size Computation
//!
//! Aspect-ratio preserving fits and clamps used by both transcoding paths.

use sleek_dom::Size;

use crate::FitMode;

/// Raster target: cap the width at `max_dimension`, scaling height along
pub fn raster_target(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width > max_dimension {
        let scaled = (height as f64 * max_dimension as f64 / width as f64).round() as u32;
        (max_dimension, scaled.max(1))
    } else {
        (width, height)
    }
}

/// Largest box with the intrinsic aspect ratio that fits inside `display`
pub fn contain(intrinsic: Size, display: Size) -> Size {
    let r_i = intrinsic.aspect_ratio();
    let r_d = display.aspect_ratio();
    if r_i > r_d {
        Size::new(display.width, display.width / r_i)
    } else {
        Size::new(display.height * r_i, display.height)
    }
}

/// Smallest box with the intrinsic aspect ratio that covers `display`
pub fn cover(intrinsic: Size, display: Size) -> Size {
    let r_i = intrinsic.aspect_ratio();
    let r_d = display.aspect_ratio();
    if r_i > r_d {
        Size::new(display.height * r_i, display.height)
    } else {
        Size::new(display.width, display.width / r_i)
    }
}

/// Scale both sides down so neither exceeds `max_side`
pub fn clamp(size: Size, max_side: f64) -> Size {
    if size.width <= max_side && size.height <= max_side {
        return size;
    }
    let scale = (max_side / size.width).min(max_side / size.height);
    Size::new(size.width * scale, size.height * scale)
}

/// Round to whole pixels, never below one
pub fn to_pixels(size: Size) -> (u32, u32) {
    (
        size.width.round().max(1.0) as u32,
        size.height.round().max(1.0) as u32,
    )
}

/// Final pixel size for a vector image shown in `display`
pub fn vector_target(intrinsic: Size, display: Size, max_side: u32, fit: FitMode) -> (u32, u32) {
    let fitted = match fit {
        FitMode::Contain => contain(intrinsic, display),
        FitMode::Cover => cover(intrinsic, display),
    };
    to_pixels(clamp(fitted, max_side as f64))
}
