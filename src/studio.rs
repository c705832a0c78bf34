//! One editing session: the logo being colored and everything that acts
//! on it.
//!
//! [`Studio`] owns the color model, the brush, the session identity and the
//! export plumbing, and wires them the way the interactive page does:
//!
//! 1. painting a region applies the active color to it;
//! 2. copy and download compose the current colors, rasterize them and hand
//!    the artifact to the [`ExportSink`];
//! 3. each export also starts a detached gallery save when the session has
//!    a handle and the logo differs from the default palette.
//!
//! Export actions never return errors. Failures are logged and reported as
//! a `Failed` outcome so the caller can return its controls to idle. While
//! an action runs, [`ExportStatus`] reads true for every clone handed out by
//! [`Studio::export_status`].
//!
//! With a [`KeepAlive`] attached, painting, resetting and exporting count as
//! user activity and may ping the gallery.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::compose::{LogoSize, VectorDocument, compose, compose_preview};
use crate::error::GalleryError;
use crate::gallery::{GalleryStore, KeepAlive, OwnerId, save_logo};
use crate::raster::{ExportArtifact, RasterExporter};
use crate::region::{ActiveColor, ColorRegionModel, Region, RegionColorMap};
use crate::session::Session;
use crate::share::ShareConfig;
use crate::sink::{DEFAULT_FILE_STEM, Delivery, ExportSink};

/// A detached gallery save.
pub type SaveTask = JoinHandle<Result<OwnerId, GalleryError>>;

// ============================================================================
// Outcomes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The image is on the clipboard.
    Copied,
    /// The clipboard refused; the image was downloaded to this path.
    Downloaded(PathBuf),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded(PathBuf),
    Failed,
}

/// Result of an export action plus the gallery save it started, if any.
///
/// The save runs independently; awaiting it is optional.
#[derive(Debug)]
pub struct ExportReport<O> {
    pub outcome: O,
    pub save: Option<SaveTask>,
}

// ============================================================================
// ExportStatus
// ============================================================================

/// Whether an export action is in progress. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct ExportStatus(Arc<AtomicBool>);

impl ExportStatus {
    pub fn is_exporting(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn begin(&self) -> ExportGuard {
        self.0.store(true, Ordering::Release);
        ExportGuard(self.clone())
    }
}

/// Clears the status when the action ends or its future is dropped.
struct ExportGuard(ExportStatus);

impl Drop for ExportGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

// ============================================================================
// Studio
// ============================================================================

pub struct Studio<S> {
    model: ColorRegionModel,
    active: ActiveColor,
    session: Session,
    exporter: RasterExporter,
    sink: ExportSink,
    gallery: Option<Arc<S>>,
    keep_alive: Option<KeepAlive<S>>,
    share: ShareConfig,
    file_stem: String,
    status: ExportStatus,
}

impl<S: GalleryStore + 'static> Studio<S> {
    /// A studio with the default palette, no session and no gallery.
    pub fn new(exporter: RasterExporter, sink: ExportSink) -> Self {
        Self {
            model: ColorRegionModel::new(),
            active: ActiveColor::default(),
            session: Session::anonymous(),
            exporter,
            sink,
            gallery: None,
            keep_alive: None,
            share: ShareConfig::default(),
            file_stem: DEFAULT_FILE_STEM.to_string(),
            status: ExportStatus::default(),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn with_gallery(mut self, gallery: Arc<S>) -> Self {
        self.gallery = Some(gallery);
        self
    }

    /// Pings through `keep_alive` on user activity. Pings are spawned, so
    /// activity outside a Tokio runtime is ignored.
    pub fn with_keep_alive(mut self, keep_alive: KeepAlive<S>) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    pub fn with_share(mut self, share: ShareConfig) -> Self {
        self.share = share;
        self
    }

    pub fn keep_alive(&self) -> Option<&KeepAlive<S>> {
        self.keep_alive.as_ref()
    }

    fn record_activity(&self) {
        if let Some(keep_alive) = &self.keep_alive {
            keep_alive.touch();
        }
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    pub fn colors(&self) -> &RegionColorMap {
        self.model.colors()
    }

    pub fn active_color(&self) -> &ActiveColor {
        &self.active
    }

    pub fn active_color_mut(&mut self) -> &mut ActiveColor {
        &mut self.active
    }

    /// Paints `region` with the active color.
    pub fn paint(&mut self, region: Region) {
        let color = self.active.get().clone();
        debug!(%region, %color, "painting region");
        self.model.set_region_color(region, color);
        self.record_activity();
    }

    pub fn reset(&mut self) {
        self.model.reset();
        self.record_activity();
    }

    /// Replaces every color at once, e.g. with a map loaded from a file.
    pub fn load_colors(&mut self, colors: RegionColorMap) {
        self.model = ColorRegionModel::from_colors(colors);
        self.record_activity();
    }

    /// Whether export and share controls should be offered.
    pub fn exports_enabled(&self) -> bool {
        self.model.has_custom_colors()
    }

    /// The current logo with `hovered` highlighted.
    pub fn preview(&self, size: LogoSize, hovered: Option<Region>) -> VectorDocument {
        compose_preview(self.model.colors(), size, hovered)
    }

    // ------------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    /// True while an export action is rendering or delivering.
    pub fn is_exporting(&self) -> bool {
        self.status.is_exporting()
    }

    /// A handle that observes [`is_exporting`](Self::is_exporting) from
    /// elsewhere, e.g. a UI task disabling its buttons.
    pub fn export_status(&self) -> ExportStatus {
        self.status.clone()
    }

    /// True while the copied indicator should be shown.
    pub fn is_copied(&self) -> bool {
        self.sink.is_copied()
    }

    pub async fn copy_to_clipboard(&mut self) -> ExportReport<CopyOutcome> {
        let _busy = self.status.begin();
        self.record_activity();
        let save = self.spawn_save();
        let outcome = match self.render().await {
            Some(artifact) => {
                let file_name = artifact.file_name(&self.file_stem);
                match self.sink.copy_to_clipboard(&artifact, &file_name) {
                    Ok(Delivery::Clipboard) => CopyOutcome::Copied,
                    Ok(Delivery::Download(path)) => CopyOutcome::Downloaded(path),
                    Err(_) => CopyOutcome::Failed,
                }
            }
            None => CopyOutcome::Failed,
        };
        ExportReport { outcome, save }
    }

    pub async fn download(&mut self) -> ExportReport<DownloadOutcome> {
        let _busy = self.status.begin();
        self.record_activity();
        let save = self.spawn_save();
        let outcome = match self.render().await {
            Some(artifact) => {
                let file_name = artifact.file_name(&self.file_stem);
                match self.sink.download_file(&artifact, &file_name) {
                    Ok(path) => DownloadOutcome::Downloaded(path),
                    Err(_) => DownloadOutcome::Failed,
                }
            }
            None => DownloadOutcome::Failed,
        };
        ExportReport { outcome, save }
    }

    /// Post-intent link for sharing.
    pub fn share_url(&self) -> String {
        self.share.intent_url()
    }

    async fn render(&self) -> Option<ExportArtifact> {
        let document = compose(self.model.colors(), self.exporter.config().logo_size());
        match self.exporter.rasterize(&document).await {
            Ok(artifact) => Some(artifact),
            Err(err) => {
                warn!(error = %err, "export failed");
                None
            }
        }
    }

    /// Starts a gallery save if there is a store, a handle and something
    /// worth saving.
    fn spawn_save(&self) -> Option<SaveTask> {
        let store = Arc::clone(self.gallery.as_ref()?);
        let handle = self.session.handle()?.clone();
        if !self.model.has_custom_colors() {
            debug!("default palette, skipping gallery save");
            return None;
        }
        let colors = self.model.colors().clone();

        Some(tokio::spawn(async move {
            let result = save_logo(&*store, &handle, &colors, Utc::now()).await;
            if let Err(err) = &result {
                warn!(handle = %handle, error = %err, "gallery save failed");
            }
            result
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
