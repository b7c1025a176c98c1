use std::collections::HashMap;
use std::hash::Hash;

use slotmap::SlotMap;

use super::PlaneId;

/// Maps external plane handles to [`PlaneId`] tokens.
///
/// The tracking subsystem may recycle its plane objects. Resolving a handle
/// yields the same token until the handle is released; after that the same
/// handle resolves to a fresh token, so stale dot caches are never reused.
#[derive(Debug)]
pub struct PlaneRegistry<H> {
    slots: SlotMap<PlaneId, H>,
    by_handle: HashMap<H, PlaneId>,
}

impl<H> Default for PlaneRegistry<H> {
    fn default() -> Self {
        Self {
            slots: SlotMap::with_key(),
            by_handle: HashMap::new(),
        }
    }
}

impl<H: Hash + Eq + Clone> PlaneRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token for `handle`, minting one on first sight.
    pub fn resolve(&mut self, handle: &H) -> PlaneId {
        if let Some(&id) = self.by_handle.get(handle) {
            return id;
        }
        let id = self.slots.insert(handle.clone());
        self.by_handle.insert(handle.clone(), id);
        id
    }

    /// Returns the token for `handle` without minting.
    #[must_use]
    pub fn get(&self, handle: &H) -> Option<PlaneId> {
        self.by_handle.get(handle).copied()
    }

    /// Returns the handle a token was minted for, if still registered.
    #[must_use]
    pub fn handle(&self, id: PlaneId) -> Option<&H> {
        self.slots.get(id)
    }

    /// Forgets `handle`, e.g. when the tracker reports the plane as subsumed
    /// or stopped. Returns the released token.
    pub fn release(&mut self, handle: &H) -> Option<PlaneId> {
        let id = self.by_handle.remove(handle)?;
        self.slots.remove(id);
        Some(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
