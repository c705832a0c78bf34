//! Gallery backed by a hosted Postgres REST endpoint.
//!
//! Two tables are used:
//!
//! - `user_profiles(id, x_username, created_at)`
//! - `user_logos(id, user_id, logo_colors, created_at, updated_at)`, unique
//!   on `user_id`
//!
//! Requests carry the anonymous key both as `apikey` and as a bearer token.

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{GalleryEntry, GalleryStore, OwnerId};
use crate::error::GalleryError;
use crate::region::RegionColorMap;
use crate::session::OwnerHandle;

const PROFILES: &str = "user_profiles";
const LOGOS: &str = "user_logos";

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewProfile<'a> {
    x_username: &'a str,
}

#[derive(Debug, Serialize)]
struct LogoUpsert<'a> {
    user_id: &'a str,
    logo_colors: &'a RegionColorMap,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ProfileRef {
    x_username: Option<OwnerHandle>,
}

#[derive(Debug, Deserialize)]
struct LogoRow {
    logo_colors: Value,
    created_at: DateTime<Utc>,
    user_profiles: Option<ProfileRef>,
}

/// [`GalleryStore`] over HTTPS.
#[derive(Debug, Clone)]
pub struct SupabaseGallery {
    client: Client,
    base: Url,
    anon_key: String,
}

impl SupabaseGallery {
    /// `url` is the project root, e.g. `https://xyz.supabase.co`.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, GalleryError> {
        let mut base = Url::parse(url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
            anon_key: anon_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, GalleryError> {
        Ok(self.base.join("rest/v1/")?.join(table)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GalleryError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GalleryError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl GalleryStore for SupabaseGallery {
    async fn find_owner_by_handle(
        &self,
        handle: &OwnerHandle,
    ) -> Result<Option<OwnerId>, GalleryError> {
        let mut url = self.table_url(PROFILES)?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("x_username", &format!("eq.{}", handle))
            .append_pair("limit", "1");

        let rows: Vec<IdRow> = self.send(self.client.get(url)).await?.json().await?;
        Ok(rows.into_iter().find_map(|row| row.id).map(OwnerId::new))
    }

    async fn create_owner(&self, handle: &OwnerHandle) -> Result<OwnerId, GalleryError> {
        let mut url = self.table_url(PROFILES)?;
        // Upsert on the unique handle so a concurrent create yields the
        // existing row.
        url.query_pairs_mut().append_pair("on_conflict", "x_username");
        let request = self
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&NewProfile {
                x_username: handle.as_str(),
            });

        let rows: Vec<IdRow> = self.send(request).await?.json().await?;
        let id = rows
            .into_iter()
            .find_map(|row| row.id)
            .ok_or(GalleryError::MissingField("id"))?;
        debug!(handle = %handle, id, "created owner profile");
        Ok(OwnerId::new(id))
    }

    async fn upsert_logo(
        &self,
        owner: &OwnerId,
        colors: &RegionColorMap,
        updated_at: DateTime<Utc>,
    ) -> Result<(), GalleryError> {
        let mut url = self.table_url(LOGOS)?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id");
        let request = self
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&LogoUpsert {
                user_id: owner.as_str(),
                logo_colors: colors,
                updated_at,
            });

        self.send(request).await?;
        Ok(())
    }

    async fn list_recent_logos(&self, limit: usize) -> Result<Vec<GalleryEntry>, GalleryError> {
        let mut url = self.table_url(LOGOS)?;
        url.query_pairs_mut()
            .append_pair("select", "*,user_profiles(x_username)")
            .append_pair("order", "created_at.desc")
            .append_pair("limit", &limit.to_string());

        let rows: Vec<LogoRow> = self.send(self.client.get(url)).await?.json().await?;
        let entries = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row.logo_colors) {
                Ok(colors) => Some(GalleryEntry {
                    owner_handle: row.user_profiles.and_then(|p| p.x_username),
                    colors,
                    created_at: row.created_at,
                }),
                Err(err) => {
                    // Rows written by older layouts use other region names.
                    warn!(error = %err, "skipping gallery row with unrecognized colors");
                    None
                }
            })
            .collect();
        Ok(entries)
    }

    async fn ping(&self) -> Result<(), GalleryError> {
        let mut url = self.table_url(LOGOS)?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("limit", "1");
        self.send(self.client.get(url)).await?;
        Ok(())
    }
}
