//! The shared gallery of saved logos.
//!
//! The gallery is an external record store reached through
//! [`GalleryStore`]. Each owner handle has at most one saved logo: saving
//! creates the owner if needed and then overwrites that owner's logo.

pub mod collage;
pub mod keep_alive;
pub mod memory;
pub mod supabase;

pub use keep_alive::{KeepAlive, KeepAliveConfig};
pub use memory::InMemoryGallery;
pub use supabase::SupabaseGallery;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GalleryError;
use crate::region::RegionColorMap;
use crate::session::OwnerHandle;

/// Entries shown in the gallery grid.
pub const GALLERY_LIMIT: usize = 12;

/// Entries used for the community cover.
pub const COVER_LIMIT: usize = 50;

// ============================================================================
// Records
// ============================================================================

/// Store-assigned identifier of an owner profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A saved logo as listed by the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryEntry {
    /// `None` when the owner profile could not be resolved.
    pub owner_handle: Option<OwnerHandle>,
    pub colors: RegionColorMap,
    pub created_at: DateTime<Utc>,
}

impl GalleryEntry {
    /// The handle to show, or `unknown`.
    pub fn display_handle(&self) -> &str {
        self.owner_handle
            .as_ref()
            .map(OwnerHandle::as_str)
            .unwrap_or("unknown")
    }

    /// Link to the owner's profile page, if the owner is known.
    pub fn profile_url(&self) -> Option<String> {
        self.owner_handle.as_ref().map(profile_url)
    }
}

/// Profile page for `handle` on the social network.
pub fn profile_url(handle: &OwnerHandle) -> String {
    format!("https://x.com/{}", handle)
}

// ============================================================================
// GalleryStore
// ============================================================================

/// Operations the gallery service offers.
///
/// Futures are `Send` so saves can run as detached tasks.
pub trait GalleryStore: Send + Sync {
    fn find_owner_by_handle(
        &self,
        handle: &OwnerHandle,
    ) -> impl Future<Output = Result<Option<OwnerId>, GalleryError>> + Send;

    /// Creates the owner for `handle`. Handles are unique, so an owner
    /// created concurrently by another save is returned instead of a second
    /// one.
    fn create_owner(
        &self,
        handle: &OwnerHandle,
    ) -> impl Future<Output = Result<OwnerId, GalleryError>> + Send;

    /// Writes `colors` as the owner's only logo, replacing any earlier one.
    fn upsert_logo(
        &self,
        owner: &OwnerId,
        colors: &RegionColorMap,
        updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), GalleryError>> + Send;

    /// Newest logos first, at most `limit` of them.
    fn list_recent_logos(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<GalleryEntry>, GalleryError>> + Send;

    /// Cheapest possible round trip, used to keep the service awake.
    fn ping(&self) -> impl Future<Output = Result<(), GalleryError>> + Send;
}

/// The hosted gallery when credentials exist, an in-memory one otherwise.
#[derive(Debug, Clone)]
pub enum ConfiguredGallery {
    Memory(InMemoryGallery),
    Supabase(SupabaseGallery),
}

impl ConfiguredGallery {
    pub fn from_credentials(credentials: Option<(&str, &str)>) -> Result<Self, GalleryError> {
        match credentials {
            Some((url, key)) => Ok(Self::Supabase(SupabaseGallery::new(url, key)?)),
            None => {
                debug!("no gallery credentials, using in-memory gallery");
                Ok(Self::Memory(InMemoryGallery::new()))
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Supabase(_))
    }
}

impl GalleryStore for ConfiguredGallery {
    async fn find_owner_by_handle(
        &self,
        handle: &OwnerHandle,
    ) -> Result<Option<OwnerId>, GalleryError> {
        match self {
            Self::Memory(g) => g.find_owner_by_handle(handle).await,
            Self::Supabase(g) => g.find_owner_by_handle(handle).await,
        }
    }

    async fn create_owner(&self, handle: &OwnerHandle) -> Result<OwnerId, GalleryError> {
        match self {
            Self::Memory(g) => g.create_owner(handle).await,
            Self::Supabase(g) => g.create_owner(handle).await,
        }
    }

    async fn upsert_logo(
        &self,
        owner: &OwnerId,
        colors: &RegionColorMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), GalleryError> {
        match self {
            Self::Memory(g) => g.upsert_logo(owner, colors, updated_at).await,
            Self::Supabase(g) => g.upsert_logo(owner, colors, updated_at).await,
        }
    }

    async fn list_recent_logos(&self, limit: usize) -> Result<Vec<GalleryEntry>, GalleryError> {
        match self {
            Self::Memory(g) => g.list_recent_logos(limit).await,
            Self::Supabase(g) => g.list_recent_logos(limit).await,
        }
    }

    async fn ping(&self) -> Result<(), GalleryError> {
        match self {
            Self::Memory(g) => g.ping().await,
            Self::Supabase(g) => g.ping().await,
        }
    }
}

/// Saves `colors` for `handle`: look up or create the owner, then upsert.
pub async fn save_logo<S: GalleryStore>(
    store: &S,
    handle: &OwnerHandle,
    colors: &RegionColorMap,
    now: DateTime<Utc>,
) -> Result<OwnerId, GalleryError> {
    let owner = match store.find_owner_by_handle(handle).await? {
        Some(owner) => owner,
        None => {
            debug!(handle = %handle, "creating gallery owner");
            store.create_owner(handle).await?
        }
    };
    store.upsert_logo(&owner, colors, now).await?;
    info!(handle = %handle, owner = %owner, "saved logo to gallery");
    Ok(owner)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Color, Region};

    fn handle(s: &str) -> OwnerHandle {
        OwnerHandle::parse(s).unwrap()
    }

    #[tokio::test]
    async fn second_save_overwrites_first() {
        let store = InMemoryGallery::new();
        let alice = handle("alice");

        let mut first = RegionColorMap::default();
        first.set(Region::LetterC, Color::new("#111111"));
        let mut second = RegionColorMap::default();
        second.set(Region::LetterC, Color::new("#222222"));

        let owner_a = save_logo(&store, &alice, &first, Utc::now()).await.unwrap();
        let owner_b = save_logo(&store, &alice, &second, Utc::now()).await.unwrap();
        assert_eq!(owner_a, owner_b);

        assert_eq!(store.owner_count(), 1);
        assert_eq!(store.logo_count(), 1);
        let saved = store.logo_for(&alice).unwrap();
        assert_eq!(saved.colors, second);
    }

    #[tokio::test]
    async fn different_handles_get_separate_logos() {
        let store = InMemoryGallery::new();
        let colors = RegionColorMap::default();

        save_logo(&store, &handle("alice"), &colors, Utc::now()).await.unwrap();
        save_logo(&store, &handle("bob"), &colors, Utc::now()).await.unwrap();
        assert_eq!(store.owner_count(), 2);
        assert_eq!(store.logo_count(), 2);
    }

    /// Yields before every call so concurrent saves interleave.
    struct Interleaving(InMemoryGallery);

    impl GalleryStore for Interleaving {
        async fn find_owner_by_handle(
            &self,
            handle: &OwnerHandle,
        ) -> Result<Option<OwnerId>, GalleryError> {
            tokio::task::yield_now().await;
            self.0.find_owner_by_handle(handle).await
        }

        async fn create_owner(&self, handle: &OwnerHandle) -> Result<OwnerId, GalleryError> {
            tokio::task::yield_now().await;
            self.0.create_owner(handle).await
        }

        async fn upsert_logo(
            &self,
            owner: &OwnerId,
            colors: &RegionColorMap,
            updated_at: DateTime<Utc>,
        ) -> Result<(), GalleryError> {
            tokio::task::yield_now().await;
            self.0.upsert_logo(owner, colors, updated_at).await
        }

        async fn list_recent_logos(&self, limit: usize) -> Result<Vec<GalleryEntry>, GalleryError> {
            self.0.list_recent_logos(limit).await
        }

        async fn ping(&self) -> Result<(), GalleryError> {
            self.0.ping().await
        }
    }

    #[tokio::test]
    async fn overlapping_saves_keep_one_logo_per_handle() {
        let inner = InMemoryGallery::new();
        let store = Interleaving(inner.clone());
        let alice = handle("alice");

        let mut first = RegionColorMap::default();
        first.set(Region::Line2, Color::new("#111111"));
        let mut second = RegionColorMap::default();
        second.set(Region::Line2, Color::new("#222222"));

        let (a, b) = tokio::join!(
            save_logo(&store, &alice, &first, Utc::now()),
            save_logo(&store, &alice, &second, Utc::now()),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(inner.owner_count(), 1);
        assert_eq!(inner.logo_count(), 1);
    }

    #[tokio::test]
    async fn configured_gallery_falls_back_to_memory() {
        let gallery = ConfiguredGallery::from_credentials(None).unwrap();
        assert!(!gallery.is_remote());

        save_logo(&gallery, &handle("alice"), &RegionColorMap::default(), Utc::now())
            .await
            .unwrap();
        assert_eq!(gallery.list_recent_logos(GALLERY_LIMIT).await.unwrap().len(), 1);

        let remote =
            ConfiguredGallery::from_credentials(Some(("https://xyz.supabase.co", "key"))).unwrap();
        assert!(remote.is_remote());
    }

    #[test]
    fn entry_display_and_profile() {
        let known = GalleryEntry {
            owner_handle: Some(handle("alice")),
            colors: RegionColorMap::default(),
            created_at: Utc::now(),
        };
        assert_eq!(known.display_handle(), "alice");
        assert_eq!(known.profile_url().as_deref(), Some("https://x.com/alice"));

        let unknown = GalleryEntry {
            owner_handle: None,
            ..known
        };
        assert_eq!(unknown.display_handle(), "unknown");
        assert_eq!(unknown.profile_url(), None);
    }
}
