//! Media Elements
//!
//! The subset of `<img>`/`<iframe>` state the pipeline reads and writes.

use crate::{Rect, Size};

/// Kind of element carrying a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Image,
    Frame,
}

/// Output encoding written back by the transcoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    WebP,
    Jpeg,
    Png,
}

impl Encoding {
    /// MIME type used in data URLs
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::WebP => "image/webp",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// CSS `object-fit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectFit {
    #[default]
    Fill,
    Contain,
    Cover,
}

/// Inline box style set on the element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxStyle {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub object_fit: ObjectFit,
}

/// A media element tracked by the pipeline
#[derive(Debug, Clone, Default)]
pub struct MediaElement {
    pub kind: ElementKind,
    /// Current source locator (remote URL or `data:` URL)
    pub src: String,
    /// Responsive source set
    pub srcset: Option<String>,
    /// True source held back while a placeholder is shown
    pub lazy_src: Option<String>,
    /// True source set held back while a placeholder is shown
    pub lazy_srcset: Option<String>,
    /// Natural size once loaded
    pub intrinsic: Option<Size>,
    /// Layout box
    pub bounds: Rect,
    pub style: BoxStyle,
    /// Encoded bytes of the loaded resource
    pub payload: Option<Vec<u8>>,
    /// Loaded cross-origin without CORS; pixels cannot be read back
    pub cors_tainted: bool,
    pub visually_ready: bool,
    pub output_encoding: Option<Encoding>,
}

impl MediaElement {
    /// New image element pointing at `src`
    pub fn image(src: &str) -> Self {
        Self {
            kind: ElementKind::Image,
            src: src.to_string(),
            ..Default::default()
        }
    }

    /// New frame element pointing at `src`
    pub fn frame(src: &str) -> Self {
        Self {
            kind: ElementKind::Frame,
            src: src.to_string(),
            ..Default::default()
        }
    }

    pub fn with_srcset(mut self, srcset: &str) -> Self {
        self.srcset = Some(srcset.to_string());
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_intrinsic(mut self, width: f64, height: f64) -> Self {
        self.intrinsic = Some(Size::new(width, height));
        self
    }

    /// Mark as loaded with its encoded bytes
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self.visually_ready = true;
        self
    }

    pub fn with_cors_tainted(mut self, tainted: bool) -> Self {
        self.cors_tainted = tainted;
        self
    }

    /// Equivalent of `img.complete && img.naturalWidth > 0`
    pub fn is_loaded(&self) -> bool {
        self.payload.is_some() && self.intrinsic.map(|s| s.is_positive()).unwrap_or(false)
    }

    /// Source is an inline `data:` URL
    pub fn is_inline(&self) -> bool {
        self.src.starts_with("data:")
    }

    /// Source looks like vector markup
    pub fn is_vector(&self) -> bool {
        if self.src.starts_with("data:image/svg+xml") {
            return true;
        }
        if self.is_inline() {
            return false;
        }
        let path = self.src.split(['?', '#']).next().unwrap_or("");
        path.to_ascii_lowercase().ends_with(".svg")
    }

    /// Source is held back behind a placeholder
    pub fn is_deferred(&self) -> bool {
        self.lazy_src.is_some()
    }
}
