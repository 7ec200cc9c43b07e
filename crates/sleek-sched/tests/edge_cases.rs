//! Edge case tests for sleek-sched
//!
//! Scrolling sequences across the eager zone and root margin.

use sleek_dom::{MediaElement, NodeId, Rect};
use sleek_sched::*;

fn id(n: u32) -> NodeId {
    NodeId::from_raw_parts(n, 0)
}

const VIEWPORT: Rect = Rect::from_xywh(0.0, 0.0, 1280.0, 800.0);

// ============================================================================
// EAGER ZONE
// ============================================================================

#[test]
fn test_eager_zone_edge_is_inclusive() {
    let mut sched = VisibilityScheduler::default();
    // Eager zone ends at 1.5 * 800 = 1200
    let on_edge = Rect::from_xywh(0.0, 1200.0, 100.0, 100.0);
    let past_edge = Rect::from_xywh(0.0, 1200.5, 100.0, 100.0);

    assert_eq!(sched.observe(id(1), Strategy::Reveal, &on_edge, &VIEWPORT), Registration::Immediate);
    assert_eq!(sched.observe(id(2), Strategy::Reveal, &past_edge, &VIEWPORT), Registration::Deferred);
}

#[test]
fn test_custom_eager_factor() {
    let options = SchedulerOptions {
        eager_margin_factor: 3.0,
        ..Default::default()
    };
    let mut sched = VisibilityScheduler::new(options);
    let bounds = Rect::from_xywh(0.0, 2000.0, 100.0, 100.0);

    assert_eq!(sched.observe(id(1), Strategy::Transcode, &bounds, &VIEWPORT), Registration::Immediate);
}

// ============================================================================
// SCROLL SEQUENCES
// ============================================================================

#[test]
fn test_gallery_scroll_triggers_in_order() {
    let mut sched = VisibilityScheduler::default();
    let boxes: Vec<(NodeId, Rect)> = (0..5)
        .map(|n| (id(n), Rect::from_xywh(0.0, 2000.0 + n as f64 * 500.0, 400.0, 300.0)))
        .collect();
    for (target, bounds) in &boxes {
        sched.observe(*target, Strategy::Reveal, bounds, &VIEWPORT);
    }
    assert_eq!(sched.pending(), 5);

    let mut fired = Vec::new();
    for step in 0..8 {
        let viewport = Rect::from_xywh(0.0, step as f64 * 500.0, 1280.0, 800.0);
        fired.extend(sched.check(&viewport, &boxes).into_iter().map(|t| t.id));
    }

    assert_eq!(fired, (0..5).map(id).collect::<Vec<_>>());
    assert_eq!(sched.pending(), 0);
}

#[test]
fn test_zero_margin_requires_overlap() {
    let mut sched = VisibilityScheduler::new(SchedulerOptions::default().with_root_margin(0.0));
    let bounds = Rect::from_xywh(0.0, 3000.0, 100.0, 100.0);
    sched.observe(id(1), Strategy::Prefetch, &bounds, &VIEWPORT);

    let short = Rect::from_xywh(0.0, 2150.0, 1280.0, 800.0);
    assert!(sched.check(&short, &[(id(1), bounds)]).is_empty());

    let touching = Rect::from_xywh(0.0, 2200.0, 1280.0, 800.0);
    assert_eq!(sched.check(&touching, &[(id(1), bounds)]).len(), 1);
}

// ============================================================================
// PLACEHOLDERS
// ============================================================================

#[test]
fn test_placeholder_uses_layout_box_after_defer() {
    let mut img = MediaElement::image("/wide.jpg").with_bounds(Rect::from_xywh(0.0, 0.0, 1200.0, 400.0));
    let hosts = SchedulerOptions::default().deferred_frame_hosts;

    assert!(lazy::defer(&mut img, &hosts));
    assert_eq!(img.src, lazy::placeholder_src(sleek_dom::Size::new(1200.0, 400.0)));
}

#[test]
fn test_vimeo_embed_deferred_by_default() {
    let mut frame = MediaElement::frame("https://player.vimeo.com/video/42");
    let hosts = SchedulerOptions::default().deferred_frame_hosts;

    assert!(lazy::defer(&mut frame, &hosts));
    assert!(lazy::restore(&mut frame));
    assert_eq!(frame.src, "https://player.vimeo.com/video/42");
}
