//! Lazy Reveal
//!
//! Holding back true sources behind zero-cost placeholders, and restoring
//! them when the element is about to be seen.

use sleek_dom::{ElementKind, MediaElement, Size};
use sleek_media::data_url;

/// Placeholder box when nothing better is known
pub const FALLBACK_PLACEHOLDER: Size = Size::new(16.0, 9.0);

const PLACEHOLDER_FILL: &str = "#f0f0f0";

/// Inline SVG placeholder of the given box
pub fn placeholder_src(size: Size) -> String {
    let w = size.width.round().max(1.0);
    let h = size.height.round().max(1.0);
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" style="background-color:{PLACEHOLDER_FILL};"></svg>"#
    );
    data_url::encode("image/svg+xml", svg.as_bytes())
}

/// Box a placeholder should reserve: intrinsic, then layout box, then 16x9
pub fn placeholder_size(element: &MediaElement) -> Size {
    element
        .intrinsic
        .filter(Size::is_positive)
        .or_else(|| Some(element.bounds.size()).filter(Size::is_positive))
        .unwrap_or(FALLBACK_PLACEHOLDER)
}

/// Whether a frame source belongs to one of the deferred embed hosts
pub fn is_deferred_embed(src: &str, hosts: &[String]) -> bool {
    hosts.iter().any(|host| src.contains(host.as_str()))
}

/// Hold back the element's true source. Returns false when it is not eligible.
pub fn defer(element: &mut MediaElement, frame_hosts: &[String]) -> bool {
    if element.is_deferred() || element.src.is_empty() || element.is_inline() {
        return false;
    }

    match element.kind {
        ElementKind::Image => {
            let placeholder = placeholder_src(placeholder_size(element));
            element.lazy_src = Some(std::mem::replace(&mut element.src, placeholder));
            element.lazy_srcset = element.srcset.take();
        }
        ElementKind::Frame => {
            if !is_deferred_embed(&element.src, frame_hosts) {
                return false;
            }
            element.lazy_src = Some(std::mem::take(&mut element.src));
        }
    }
    element.payload = None;
    element.visually_ready = false;
    true
}

/// Put the true source back. Returns false when nothing was held back.
pub fn restore(element: &mut MediaElement) -> bool {
    let Some(src) = element.lazy_src.take() else {
        return false;
    };
    element.src = src;
    if let Some(srcset) = element.lazy_srcset.take() {
        element.srcset = Some(srcset);
    }
    true
}
