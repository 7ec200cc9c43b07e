//! Resource State Tracker
//!
//! Per-element, per-stage idempotency markers. Each marker only moves
//! forward: Unprocessed → Pending → {Processed | Failed}.

use std::collections::HashMap;

use crate::{Document, NodeId};

/// Processing state of one pipeline stage for one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingState {
    #[default]
    Unprocessed,
    Pending,
    Processed,
    Failed,
}

impl ProcessingState {
    /// Processed or Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Failed)
    }
}

/// Pipeline stage owning a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Raster compression
    Raster,
    /// Vector rasterization
    Vector,
    /// Lazy reveal of a deferred source
    Reveal,
}

#[derive(Debug, Clone, Copy, Default)]
struct Markers {
    raster: ProcessingState,
    vector: ProcessingState,
    reveal: ProcessingState,
}

impl Markers {
    fn slot(&mut self, stage: Stage) -> &mut ProcessingState {
        match stage {
            Stage::Raster => &mut self.raster,
            Stage::Vector => &mut self.vector,
            Stage::Reveal => &mut self.reveal,
        }
    }

    fn get(&self, stage: Stage) -> ProcessingState {
        match stage {
            Stage::Raster => self.raster,
            Stage::Vector => self.vector,
            Stage::Reveal => self.reveal,
        }
    }
}

/// Identity-keyed marker table
#[derive(Debug, Default)]
pub struct StateTracker {
    entries: HashMap<NodeId, Markers>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `stage` for `id`
    pub fn state(&self, id: NodeId, stage: Stage) -> ProcessingState {
        self.entries.get(&id).map(|m| m.get(stage)).unwrap_or_default()
    }

    /// Check-and-set Unprocessed → Pending.
    ///
    /// Returns false if the stage already started or finished for `id`.
    pub fn try_begin(&mut self, id: NodeId, stage: Stage) -> bool {
        let slot = self.entries.entry(id).or_default().slot(stage);
        if *slot != ProcessingState::Unprocessed {
            return false;
        }
        *slot = ProcessingState::Pending;
        true
    }

    /// Move a stage to a terminal state.
    ///
    /// Terminal states are final; a second `finish` is ignored and returns false.
    pub fn finish(&mut self, id: NodeId, stage: Stage, outcome: ProcessingState) -> bool {
        if !outcome.is_terminal() {
            return false;
        }
        let slot = self.entries.entry(id).or_default().slot(stage);
        if slot.is_terminal() {
            tracing::debug!(node = %id, ?stage, "ignoring repeated completion");
            return false;
        }
        *slot = outcome;
        true
    }

    /// Drop all markers of a removed element
    pub fn release(&mut self, id: NodeId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drop markers whose element is gone from `doc`
    pub fn retain_live(&mut self, doc: &Document) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| doc.contains(*id));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
