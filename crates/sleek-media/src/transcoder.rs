//! Transcoder
//!
//! Raster compression and vector rasterization for single elements. Both
//! paths leave the element untouched unless they commit a new encoding.

use sleek_device::{DeviceProfile, compression_profile};
use sleek_dom::{Encoding, MediaElement, Rect, Size};
use sleek_net::{CacheMode, Fetcher, Request, RequestMode};
use url::Url;

use crate::{MediaError, Outcome, Surface, TranscodeOptions};
use crate::{data_url, decoder, encoder, origin, sizing, svg};

const SVG_MIME: &str = "image/svg+xml";

/// Where vector markup comes from
#[derive(Debug, Clone, PartialEq)]
pub enum VectorSource {
    /// Markup decoded from a `data:` URL
    Inline(String),
    /// Same-origin URL to fetch
    Remote(String),
}

/// Rasterized vector image ready to commit
#[derive(Debug, Clone)]
pub struct VectorRaster {
    pub data_url: String,
    pub bytes: Vec<u8>,
    pub encoding: Encoding,
    pub width: u32,
    pub height: u32,
    /// Box the element is pinned to on commit
    pub display: Size,
}

/// Per-element transcoder bound to one device snapshot
#[derive(Debug, Clone)]
pub struct Transcoder {
    device: DeviceProfile,
    options: TranscodeOptions,
}

impl Transcoder {
    pub fn new(device: DeviceProfile, options: TranscodeOptions) -> Self {
        Self { device, options }
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Re-encode a loaded raster image at the device's size and quality
    pub fn compress_raster(&self, element: &mut MediaElement) -> Result<Outcome, MediaError> {
        let (Some(payload), Some(intrinsic)) = (element.payload.as_deref(), element.intrinsic) else {
            return Ok(Outcome::Deferred);
        };
        if !element.is_loaded() {
            return Ok(Outcome::Deferred);
        }
        if element.is_inline() || element.srcset.is_some() || element.is_vector() {
            return Ok(Outcome::Skipped);
        }

        let width = intrinsic.width.round() as u32;
        let height = intrinsic.height.round() as u32;
        let floor = self.options.min_raster_side;
        if width <= floor || height <= floor {
            tracing::debug!(src = %element.src, "{}x{} below raster floor", width, height);
            return Ok(Outcome::Skipped);
        }
        if element.cors_tainted {
            return Err(MediaError::CrossOriginBlocked(element.src.clone()));
        }

        let profile = compression_profile(self.device.tier, width.max(height) as i64);
        let (target_w, target_h) = sizing::raster_target(width, height, profile.max_dimension);

        let decoded = decoder::decode(payload)?;
        let mut surface = Surface::new(target_w, target_h)?;
        surface.draw_image(&decoded)?;

        let encoding = encoder::raster_encoding();
        let encoded = encoder::encode(&surface.to_rgba(), encoding, profile.quality)?;

        let limit = self.options.size_guard_ratio * payload.len() as f64;
        if encoded.len() as f64 > limit {
            tracing::debug!(
                src = %element.src,
                "discarding {} byte re-encode of {} byte original",
                encoded.len(),
                payload.len()
            );
            return Ok(Outcome::Discarded);
        }

        tracing::debug!(
            src = %element.src,
            "compressed {}x{} -> {}x{} as {}",
            width,
            height,
            target_w,
            target_h,
            encoding.mime_type()
        );
        element.src = data_url::encode(encoding.mime_type(), &encoded);
        element.payload = Some(encoded);
        element.intrinsic = Some(Size::new(target_w as f64, target_h as f64));
        element.output_encoding = Some(encoding);
        Ok(Outcome::Committed)
    }

    /// Display box for a vector element; `None` when it is too small to bother
    pub fn display_box(&self, bounds: &Rect) -> Option<Size> {
        let mut display = bounds.size();
        if !display.is_positive() {
            let side = self.options.vector_fallback_box;
            display = Size::new(side, side);
        }
        let min = self.options.min_vector_display;
        if display.width <= min || display.height <= min {
            return None;
        }
        Some(display)
    }

    /// Classify the element's source, enforcing the same-origin rule for remote ones
    pub fn vector_source(&self, src: &str, location: Option<&Url>) -> Result<VectorSource, MediaError> {
        if src.starts_with("data:") {
            let parsed = data_url::DataUrl::parse(src)?;
            if parsed.mime_type != SVG_MIME {
                return Err(MediaError::ParseFailure(format!("not SVG: {}", parsed.mime_type)));
            }
            return Ok(VectorSource::Inline(parsed.text()?.to_string()));
        }
        origin::resolve_same_origin(src, location).map(VectorSource::Remote)
    }

    /// Resolve a source to markup, fetching remote sources through `fetcher`
    pub async fn load_markup(source: VectorSource, fetcher: &dyn Fetcher) -> Result<String, MediaError> {
        let url = match source {
            VectorSource::Inline(markup) => return Ok(markup),
            VectorSource::Remote(url) => url,
        };

        let request = Request::get(&url)
            .with_cache(CacheMode::ForceCache)
            .with_mode(RequestMode::SameOrigin);
        let response = fetcher.fetch(&request).await?;
        if !response.ok() {
            return Err(MediaError::NetworkFailure(format!("HTTP {} for {}", response.status, url)));
        }
        let text = response
            .text()
            .map_err(|_| MediaError::ParseFailure(format!("SVG at {url} is not UTF-8")))?;
        Ok(text.to_string())
    }

    /// Rasterize markup for a display box with contain/cover fitting and the tier clamp
    pub fn rasterize_vector(&self, markup: &str, display: Size) -> Result<VectorRaster, MediaError> {
        let intrinsic = svg::intrinsic_size(markup, display)?;
        let (width, height) =
            sizing::vector_target(intrinsic, display, self.device.vector_max_side(), self.options.fit);

        let image = svg::rasterize(markup, width, height)?;
        let encoding = encoder::vector_encoding(self.device.supports_webp);
        let bytes = encoder::encode(&image, encoding, self.device.vector_quality())?;

        Ok(VectorRaster {
            data_url: data_url::encode(encoding.mime_type(), &bytes),
            bytes,
            encoding,
            width,
            height,
            display,
        })
    }

    /// Full vector path for an element snapshot; `Ok(None)` means skipped
    pub async fn rasterize_element(
        &self,
        element: &MediaElement,
        location: Option<&Url>,
        fetcher: &dyn Fetcher,
    ) -> Result<Option<VectorRaster>, MediaError> {
        let Some(display) = self.display_box(&element.bounds) else {
            tracing::debug!(src = %element.src, "vector display box too small");
            return Ok(None);
        };
        let source = self.vector_source(&element.src, location)?;
        let markup = Self::load_markup(source, fetcher).await?;
        self.rasterize_vector(&markup, display).map(Some)
    }

    /// Write a raster into the element and pin its box
    pub fn commit_vector(&self, element: &mut MediaElement, raster: VectorRaster) {
        element.src = raster.data_url;
        element.payload = Some(raster.bytes);
        element.intrinsic = Some(Size::new(raster.width as f64, raster.height as f64));
        element.output_encoding = Some(raster.encoding);
        element.style.width = Some(raster.display.width);
        element.style.height = Some(raster.display.height);
        element.style.object_fit = self.options.fit.object_fit();
    }
}
