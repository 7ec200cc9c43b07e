//! Transcoding scenarios for sleek-media
//!
//! End-to-end raster and vector runs against in-memory fixtures.

use std::io::Cursor;

use image::{ImageFormat as Codec, Rgba, RgbaImage};
use sleek_device::{DeviceProfile, DeviceTier};
use sleek_dom::{Encoding, MediaElement, ObjectFit, Rect, Size};
use sleek_media::*;
use sleek_net::{Fetcher, LocalFuture, NetError, Request, Response};

fn photo_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let n = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
        Rgba([(n >> 3) as u8, (n >> 11) as u8, (n >> 19) as u8, 255])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), Codec::Png).unwrap();
    out
}

struct StaticSvg(&'static str);

impl Fetcher for StaticSvg {
    fn fetch<'a>(&'a self, _request: &'a Request) -> LocalFuture<'a, Result<Response, NetError>> {
        let body = self.0;
        Box::pin(async move { Ok(Response::ok_with("image/svg+xml", body)) })
    }
}

// ============================================================================
// RASTER SCENARIOS
// ============================================================================

#[test]
fn test_large_photo_on_standard_device() {
    let transcoder = Transcoder::new(
        DeviceProfile::with_tier(DeviceTier::Standard, false),
        TranscodeOptions::default(),
    );
    let mut photo = MediaElement::image("https://shop.test/hero.png")
        .with_intrinsic(2000.0, 1000.0)
        .with_payload(photo_png(2000, 1000));

    assert_eq!(transcoder.compress_raster(&mut photo).unwrap(), Outcome::Committed);
    assert_eq!(photo.intrinsic, Some(Size::new(1024.0, 512.0)));
    assert_eq!(photo.output_encoding, Some(Encoding::Jpeg));

    let committed = DataUrl::parse(&photo.src).unwrap();
    assert_eq!(committed.mime_type, "image/jpeg");
    assert_eq!(ImageFormat::from_bytes(&committed.bytes), ImageFormat::Jpeg);
}

#[test]
fn test_mobile_profile_caps_at_512() {
    let transcoder = Transcoder::new(
        DeviceProfile::with_tier(DeviceTier::Mobile, false),
        TranscodeOptions::default(),
    );
    let mut photo = MediaElement::image("/p.png")
        .with_intrinsic(900.0, 600.0)
        .with_payload(photo_png(900, 600));

    assert_eq!(transcoder.compress_raster(&mut photo).unwrap(), Outcome::Committed);
    assert_eq!(photo.intrinsic, Some(Size::new(512.0, 341.0)));
}

#[test]
fn test_small_image_below_floor_untouched() {
    let transcoder = Transcoder::new(DeviceProfile::default(), TranscodeOptions::default());
    let mut icon = MediaElement::image("/icon.png")
        .with_intrinsic(64.0, 64.0)
        .with_payload(photo_png(64, 64));

    assert_eq!(transcoder.compress_raster(&mut icon).unwrap(), Outcome::Skipped);
    assert_eq!(icon.src, "/icon.png");
}

// ============================================================================
// VECTOR SCENARIOS
// ============================================================================

#[test]
fn test_view_box_only_svg_in_wide_box() {
    let transcoder = Transcoder::new(
        DeviceProfile::with_tier(DeviceTier::Standard, false),
        TranscodeOptions::default(),
    );
    let fetcher = StaticSvg(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50"><circle cx="50" cy="25" r="20"/></svg>"#,
    );
    let mut logo = MediaElement::image("/brand/logo.svg").with_bounds(Rect::from_xywh(0.0, 40.0, 300.0, 100.0));

    let raster = smol::block_on(transcoder.rasterize_element(&logo, None, &fetcher))
        .unwrap()
        .expect("box is large enough");
    assert_eq!((raster.width, raster.height), (200, 100));

    transcoder.commit_vector(&mut logo, raster);
    assert_eq!(logo.output_encoding, Some(Encoding::Png));
    assert_eq!(logo.style.width, Some(300.0));
    assert_eq!(logo.style.height, Some(100.0));
    assert_eq!(logo.style.object_fit, ObjectFit::Contain);

    let png = DataUrl::parse(&logo.src).unwrap();
    let decoded = decoder::decode(&png.bytes).unwrap();
    assert_eq!(decoded.dimensions(), (200, 100));
}

#[test]
fn test_inline_svg_without_layout_uses_fallback_box() {
    let transcoder = Transcoder::new(
        DeviceProfile::with_tier(DeviceTier::Mobile, false),
        TranscodeOptions::default(),
    );
    let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="80"></svg>"#;
    let src = format!("data:image/svg+xml,{}", markup.replace('"', "%22").replace(' ', "%20"));
    let icon = MediaElement::image(&src);

    // 512x512 fallback box, contain gives 256x512, mobile clamp gives 128x256
    let raster = smol::block_on(transcoder.rasterize_element(&icon, None, &StaticSvg("")))
        .unwrap()
        .unwrap();
    assert_eq!((raster.width, raster.height), (128, 256));
    assert_eq!(raster.display, Size::new(512.0, 512.0));
}

#[test]
fn test_cover_fit_option() {
    let transcoder = Transcoder::new(
        DeviceProfile::with_tier(DeviceTier::Standard, true),
        TranscodeOptions::default().with_fit(FitMode::Cover),
    );
    let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50"></svg>"#;
    let mut el = MediaElement::image("/x.svg");

    let raster = transcoder.rasterize_vector(markup, Size::new(300.0, 100.0)).unwrap();
    assert_eq!((raster.width, raster.height), (300, 150));

    transcoder.commit_vector(&mut el, raster);
    assert_eq!(el.style.object_fit, ObjectFit::Cover);
}
