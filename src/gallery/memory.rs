//! A process-local gallery.
//!
//! Used when no remote gallery is configured, and by tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{GalleryEntry, GalleryStore, OwnerId};
use crate::error::GalleryError;
use crate::region::RegionColorMap;
use crate::session::OwnerHandle;

/// One owner's saved logo.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedLogo {
    pub id: Uuid,
    pub owner: OwnerId,
    pub colors: RegionColorMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    owners: HashMap<OwnerId, OwnerHandle>,
    logos: HashMap<OwnerId, SavedLogo>,
    pings: usize,
}

/// In-memory [`GalleryStore`]. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGallery {
    state: Arc<Mutex<State>>,
}

impl InMemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn owner_count(&self) -> usize {
        self.state().owners.len()
    }

    pub fn logo_count(&self) -> usize {
        self.state().logos.len()
    }

    /// Number of keep-alive pings received.
    pub fn ping_count(&self) -> usize {
        self.state().pings
    }

    /// The logo saved by `handle`, if any.
    pub fn logo_for(&self, handle: &OwnerHandle) -> Option<SavedLogo> {
        let state = self.state();
        let owner = state
            .owners
            .iter()
            .find_map(|(id, h)| (h == handle).then_some(id))?;
        state.logos.get(owner).cloned()
    }
}

impl GalleryStore for InMemoryGallery {
    async fn find_owner_by_handle(
        &self,
        handle: &OwnerHandle,
    ) -> Result<Option<OwnerId>, GalleryError> {
        Ok(self
            .state()
            .owners
            .iter()
            .find_map(|(id, h)| (h == handle).then(|| id.clone())))
    }

    /// Handles are unique: creating an existing handle returns its id.
    async fn create_owner(&self, handle: &OwnerHandle) -> Result<OwnerId, GalleryError> {
        let mut state = self.state();
        if let Some(id) = state
            .owners
            .iter()
            .find_map(|(id, h)| (h == handle).then(|| id.clone()))
        {
            return Ok(id);
        }
        let id = OwnerId::new(Uuid::new_v4().to_string());
        state.owners.insert(id.clone(), handle.clone());
        Ok(id)
    }

    async fn upsert_logo(
        &self,
        owner: &OwnerId,
        colors: &RegionColorMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), GalleryError> {
        let mut state = self.state();
        if !state.owners.contains_key(owner) {
            return Err(GalleryError::UnknownOwner(owner.to_string()));
        }
        state
            .logos
            .entry(owner.clone())
            .and_modify(|logo| {
                logo.colors = colors.clone();
                logo.updated_at = updated_at;
            })
            .or_insert_with(|| SavedLogo {
                id: Uuid::new_v4(),
                owner: owner.clone(),
                colors: colors.clone(),
                created_at: updated_at,
                updated_at,
            });
        Ok(())
    }

    async fn list_recent_logos(&self, limit: usize) -> Result<Vec<GalleryEntry>, GalleryError> {
        let state = self.state();
        let mut logos: Vec<&SavedLogo> = state.logos.values().collect();
        logos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logos
            .into_iter()
            .take(limit)
            .map(|logo| GalleryEntry {
                owner_handle: state.owners.get(&logo.owner).cloned(),
                colors: logo.colors.clone(),
                created_at: logo.created_at,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), GalleryError> {
        self.state().pings += 1;
        Ok(())
    }
}
