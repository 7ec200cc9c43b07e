//! sleek DOM - Media element model
//!
//! Generational element identity, layout geometry and the per-resource
//! state machine shared by the scheduler and the transcoder.

mod document;
mod element;
mod geometry;
mod tracker;

pub use document::Document;
pub use element::{BoxStyle, ElementKind, Encoding, MediaElement, ObjectFit};
pub use geometry::{Rect, Size};
pub use tracker::{ProcessingState, Stage, StateTracker};

/// Element identifier (slot index + generation)
///
/// A removed element's slot is reused with a bumped generation, so a stale
/// `NodeId` never resolves to the element that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Build an id from its raw parts
    pub const fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// DOM error
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("Invalid document location: {0}")]
    InvalidLocation(String),

    #[error("Unknown element: {0}")]
    UnknownElement(NodeId),
}
