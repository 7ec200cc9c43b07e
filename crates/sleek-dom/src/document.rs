//! Document - generational element arena
//!
//! Elements live in reusable slots. Removing an element bumps its slot's
//! generation so outstanding ids go stale instead of aliasing a new element.

use url::Url;

use crate::{DomError, MediaElement, NodeId};

/// Document holding the media elements of one page
#[derive(Debug)]
pub struct Document {
    slots: Vec<Option<MediaElement>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    /// Page location, used for origin checks and relative URLs
    location: Option<Url>,
}

impl Document {
    /// Create a document for the page at `location`
    pub fn new(location: &str) -> Result<Self, DomError> {
        let url = Url::parse(location).map_err(|e| DomError::InvalidLocation(format!("{location}: {e}")))?;
        let mut doc = Self::detached();
        doc.location = Some(url);
        Ok(doc)
    }

    /// Create a document without a location (everything is cross-origin)
    pub fn detached() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            location: None,
        }
    }

    pub fn location(&self) -> Option<&Url> {
        self.location.as_ref()
    }

    /// Insert an element
    pub fn insert(&mut self, element: MediaElement) -> NodeId {
        if let Some(index) = self.free_list.pop() {
            self.slots[index as usize] = Some(element);
            NodeId::from_raw_parts(index, self.generations[index as usize])
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(element));
            self.generations.push(0);
            NodeId::from_raw_parts(index, 0)
        }
    }

    /// Remove an element; its id is stale afterwards
    pub fn remove(&mut self, id: NodeId) -> Option<MediaElement> {
        if !self.contains(id) {
            return None;
        }
        let index = id.index() as usize;
        let element = self.slots[index].take();
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_list.push(id.index());
        element
    }

    /// Whether `id` still refers to a live element
    pub fn contains(&self, id: NodeId) -> bool {
        let index = id.index() as usize;
        matches!(self.slots.get(index), Some(Some(_))) && self.generations[index] == id.generation()
    }

    pub fn get(&self, id: NodeId) -> Option<&MediaElement> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index() as usize].as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut MediaElement> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.index() as usize].as_mut()
    }

    /// Like `get_mut` but reports unknown ids as an error
    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut MediaElement, DomError> {
        self.get_mut(id).ok_or(DomError::UnknownElement(id))
    }

    /// Iterate live elements in slot order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MediaElement)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|element| (NodeId::from_raw_parts(index as u32, self.generations[index]), element))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::detached()
    }
}
