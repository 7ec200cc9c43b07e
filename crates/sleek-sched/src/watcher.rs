//! Intersection Watcher
//!
//! One-shot viewport intersection detection with a root margin.

use sleek_dom::{NodeId, Rect};

/// Entry produced when a watched element enters the expanded viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub bounds: Rect,
    /// Visible fraction of the element inside the unexpanded viewport
    pub intersection_ratio: f64,
}

/// Shared viewport watcher
#[derive(Debug)]
pub struct IntersectionWatcher {
    root_margin: f64,
    observed: Vec<NodeId>,
}

impl IntersectionWatcher {
    pub fn new(root_margin: f64) -> Self {
        Self {
            root_margin,
            observed: Vec::new(),
        }
    }

    pub fn root_margin(&self) -> f64 {
        self.root_margin
    }

    /// Observe an element; observing twice is a no-op
    pub fn observe(&mut self, target: NodeId) {
        if !self.observed.contains(&target) {
            self.observed.push(target);
        }
    }

    /// Stop observing
    pub fn unobserve(&mut self, target: NodeId) -> bool {
        let before = self.observed.len();
        self.observed.retain(|id| *id != target);
        self.observed.len() != before
    }

    pub fn is_observed(&self, target: NodeId) -> bool {
        self.observed.contains(&target)
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Disconnect all
    pub fn disconnect(&mut self) {
        self.observed.clear();
    }

    /// Report watched boxes touching the expanded viewport, in `boxes` order.
    /// Reported targets are unobserved.
    pub fn check(&mut self, viewport: &Rect, boxes: &[(NodeId, Rect)]) -> Vec<IntersectionEntry> {
        let root = viewport.expand(self.root_margin);
        let mut entries = Vec::new();

        for (target, bounds) in boxes {
            if !self.is_observed(*target) || !touches(&root, bounds) {
                continue;
            }
            let visible = bounds.intersection(viewport).map(|r| r.area()).unwrap_or(0.0);
            let area = bounds.area();
            entries.push(IntersectionEntry {
                target: *target,
                bounds: *bounds,
                intersection_ratio: if area > 0.0 { visible / area } else { 0.0 },
            });
            self.unobserve(*target);
        }
        entries
    }
}

/// Edge-inclusive overlap so zero-area boxes still register
pub(crate) fn touches(area: &Rect, rect: &Rect) -> bool {
    !(rect.right() < area.left()
        || rect.left() > area.right()
        || rect.bottom() < area.top()
        || rect.top() > area.bottom())
}
