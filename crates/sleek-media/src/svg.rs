//! SVG Support
//!
//! Intrinsic size discovery on the root `<svg>` element and rasterization
//! through resvg.

use image::RgbaImage;
use resvg::usvg;
use sleek_dom::Size;
use tiny_skia::Transform;

use crate::{MediaError, Surface};

/// SVG viewBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Parse `min-x min-y width height`, separated by whitespace and/or commas
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f64> = value
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts[..] {
            [min_x, min_y, width, height] if width > 0.0 && height > 0.0 => Some(Self {
                min_x,
                min_y,
                width,
                height,
            }),
            _ => None,
        }
    }
}

/// Sizing attributes of the root `<svg>` element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootAttributes {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub view_box: Option<ViewBox>,
}

impl RootAttributes {
    /// Scan the root tag; `None` when the markup has no `<svg>` element
    pub fn parse(markup: &str) -> Option<Self> {
        let tag = root_tag(markup)?;
        let mut attrs = Self::default();
        for (name, value) in attributes(tag) {
            match name {
                "width" => attrs.width = parse_length(value),
                "height" => attrs.height = parse_length(value),
                "viewBox" => attrs.view_box = ViewBox::parse(value),
                _ => {}
            }
        }
        Some(attrs)
    }

    /// Per axis: explicit attribute, then viewBox, then the fallback box
    pub fn resolve(&self, fallback: Size) -> Size {
        Size::new(
            self.width.or(self.view_box.map(|vb| vb.width)).unwrap_or(fallback.width),
            self.height.or(self.view_box.map(|vb| vb.height)).unwrap_or(fallback.height),
        )
    }
}

/// Intrinsic size of the markup, falling back to `display` per axis
pub fn intrinsic_size(markup: &str, display: Size) -> Result<Size, MediaError> {
    let attrs = RootAttributes::parse(markup)
        .ok_or_else(|| MediaError::ParseFailure("no root <svg> element".into()))?;
    let size = attrs.resolve(display);
    if !size.is_positive() {
        return Err(MediaError::ParseFailure(format!(
            "unresolvable intrinsic size {}x{}",
            size.width, size.height
        )));
    }
    Ok(size)
}

/// Rasterize markup into an image of exactly `width` x `height`
pub fn rasterize(markup: &str, width: u32, height: u32) -> Result<RgbaImage, MediaError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(markup, &options)
        .map_err(|e| MediaError::ParseFailure(format!("Failed to parse SVG: {e}")))?;

    let size = tree.size();
    if size.width() <= 0.0 || size.height() <= 0.0 {
        return Err(MediaError::ParseFailure("empty SVG canvas".into()));
    }

    let mut surface = Surface::new(width, height)?;
    let transform = Transform::from_scale(width as f32 / size.width(), height as f32 / size.height());
    resvg::render(&tree, transform, &mut surface.pixmap_mut().as_mut());
    Ok(surface.to_rgba())
}

/// Check if data looks like SVG markup
pub fn is_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(256)];
    let text = String::from_utf8_lossy(head);
    text.contains("<svg") || text.trim_start().starts_with("<?xml")
}

/// Start tag of the first `<svg>` outside comments, declarations and
/// processing instructions
fn root_tag(markup: &str) -> Option<&str> {
    let mut rest = markup;
    loop {
        rest = &rest[rest.find('<')?..];
        if let Some(body) = rest.strip_prefix("<!--") {
            rest = &body[body.find("-->")? + 3..];
        } else if rest.starts_with("<!") {
            rest = skip_declaration(rest)?;
        } else if let Some(body) = rest.strip_prefix("<?") {
            rest = &body[body.find("?>")? + 2..];
        } else if let Some(after) = rest.strip_prefix("<svg") {
            match after.chars().next() {
                Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/' => {
                    let end = after.find('>')?;
                    return Some(&after[..end]);
                }
                // `<svgfoo`, keep looking
                _ => rest = after,
            }
        } else {
            rest = &rest[1..];
        }
    }
}

/// Skip a `<!...>` declaration, including a bracketed internal subset
fn skip_declaration(rest: &str) -> Option<&str> {
    let close = rest.find('>')?;
    match rest.find('[') {
        Some(open) if open < close => {
            let subset_end = open + rest[open..].find(']')?;
            let close = subset_end + rest[subset_end..].find('>')?;
            Some(&rest[close + 1..])
        }
        _ => Some(&rest[close + 1..]),
    }
}

/// `name="value"` / `name='value'` pairs in a start tag
fn attributes(tag: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = tag;

    while let Some(eq) = rest.find('=') {
        let name = rest[..eq].split_ascii_whitespace().last().unwrap_or("");
        let value_part = rest[eq + 1..].trim_start();
        let Some(quote) = value_part.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            rest = value_part;
            continue;
        };
        let body = &value_part[1..];
        let Some(close) = body.find(quote) else {
            break;
        };
        out.push((name, &body[..close]));
        rest = &body[close + 1..];
    }
    out
}

/// Unitless or `px` lengths only; percentages and font-relative units are ignored
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}
