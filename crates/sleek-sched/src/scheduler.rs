//! Visibility Scheduler
//!
//! Routes elements either straight to their strategy (eager zone) or through
//! the shared watcher.

use std::collections::HashMap;

use sleek_dom::{NodeId, Rect};

use crate::watcher::touches;
use crate::{IntersectionWatcher, Registration, SchedulerOptions, Strategy, Trigger};

/// Visibility scheduler
#[derive(Debug)]
pub struct VisibilityScheduler {
    watcher: IntersectionWatcher,
    strategies: HashMap<NodeId, Strategy>,
    options: SchedulerOptions,
}

impl VisibilityScheduler {
    pub fn new(options: SchedulerOptions) -> Self {
        Self {
            watcher: IntersectionWatcher::new(options.root_margin),
            strategies: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// Viewport top down to `eager_margin_factor` viewport heights
    pub fn eager_zone(&self, viewport: &Rect) -> Rect {
        Rect::from_xywh(
            viewport.x,
            viewport.y,
            viewport.width,
            viewport.height * self.options.eager_margin_factor,
        )
    }

    /// Register `id`, or report that it should be handled right away
    pub fn observe(&mut self, id: NodeId, strategy: Strategy, bounds: &Rect, viewport: &Rect) -> Registration {
        if self.strategies.contains_key(&id) {
            return Registration::Deferred;
        }
        if touches(&self.eager_zone(viewport), bounds) {
            tracing::debug!(%id, ?strategy, "inside eager zone");
            return Registration::Immediate;
        }

        self.watcher.observe(id);
        self.strategies.insert(id, strategy);
        Registration::Deferred
    }

    /// Drop a registration (element removed)
    pub fn unobserve(&mut self, id: NodeId) -> bool {
        self.watcher.unobserve(id);
        self.strategies.remove(&id).is_some()
    }

    pub fn is_observed(&self, id: NodeId) -> bool {
        self.strategies.contains_key(&id)
    }

    pub fn strategy(&self, id: NodeId) -> Option<Strategy> {
        self.strategies.get(&id).copied()
    }

    pub fn pending(&self) -> usize {
        self.strategies.len()
    }

    /// Fire one-shot triggers for registered elements near the viewport
    pub fn check(&mut self, viewport: &Rect, boxes: &[(NodeId, Rect)]) -> Vec<Trigger> {
        self.watcher
            .check(viewport, boxes)
            .into_iter()
            .filter_map(|entry| {
                let strategy = self.strategies.remove(&entry.target)?;
                Some(Trigger {
                    id: entry.target,
                    strategy,
                })
            })
            .collect()
    }
}

impl Default for VisibilityScheduler {
    fn default() -> Self {
        Self::new(SchedulerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> NodeId {
        NodeId::from_raw_parts(n, 0)
    }

    const VIEWPORT: Rect = Rect::from_xywh(0.0, 0.0, 1280.0, 800.0);

    #[test]
    fn test_eager_zone_bypasses_watcher() {
        let mut sched = VisibilityScheduler::default();
        let near = Rect::from_xywh(0.0, 1100.0, 200.0, 100.0);

        assert_eq!(sched.observe(id(1), Strategy::Reveal, &near, &VIEWPORT), Registration::Immediate);
        assert!(!sched.is_observed(id(1)));
    }

    #[test]
    fn test_far_element_deferred() {
        let mut sched = VisibilityScheduler::default();
        let far = Rect::from_xywh(0.0, 3000.0, 200.0, 100.0);

        assert_eq!(sched.observe(id(1), Strategy::Transcode, &far, &VIEWPORT), Registration::Deferred);
        assert_eq!(sched.strategy(id(1)), Some(Strategy::Transcode));
    }

    #[test]
    fn test_trigger_after_scroll() {
        let mut sched = VisibilityScheduler::default();
        let far = Rect::from_xywh(0.0, 3000.0, 200.0, 100.0);
        sched.observe(id(1), Strategy::Prefetch, &far, &VIEWPORT);

        // Document coordinates: scrolled so the element is within the root margin
        let scrolled = Rect::from_xywh(0.0, 2050.0, 1280.0, 800.0);
        let triggers = sched.check(&scrolled, &[(id(1), far)]);

        assert_eq!(triggers, vec![Trigger { id: id(1), strategy: Strategy::Prefetch }]);
        assert_eq!(sched.pending(), 0);
        assert!(sched.check(&scrolled, &[(id(1), far)]).is_empty());
    }

    #[test]
    fn test_unobserve() {
        let mut sched = VisibilityScheduler::default();
        let far = Rect::from_xywh(0.0, 3000.0, 200.0, 100.0);
        sched.observe(id(1), Strategy::Reveal, &far, &VIEWPORT);

        assert!(sched.unobserve(id(1)));
        assert!(!sched.unobserve(id(1)));
        assert!(sched.check(&Rect::from_xywh(0.0, 3000.0, 1280.0, 800.0), &[(id(1), far)]).is_empty());
    }

    #[test]
    fn test_repeat_observe_keeps_first_strategy() {
        let mut sched = VisibilityScheduler::default();
        let far = Rect::from_xywh(0.0, 3000.0, 200.0, 100.0);
        sched.observe(id(1), Strategy::Reveal, &far, &VIEWPORT);

        assert_eq!(sched.observe(id(1), Strategy::Prefetch, &far, &VIEWPORT), Registration::Deferred);
        assert_eq!(sched.strategy(id(1)), Some(Strategy::Reveal));
    }
}
