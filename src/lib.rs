//! logo-colorist: color the regions of a fixed vector logo and export it
//!
//! The logo is split into named [`Region`]s. A [`ColorRegionModel`] holds
//! one color per region, [`compose`] turns the colors into an SVG document,
//! and [`RasterExporter`] renders that document onto a white, supersampled
//! square bitmap.
//!
//! # Example
//!
//! ```
//! use logo_colorist::{ColorRegionModel, LogoSize, Region, compose};
//!
//! let mut model = ColorRegionModel::new();
//! model.set_region_color(Region::LetterI, "#FF0000");
//! assert!(model.has_custom_colors());
//!
//! let doc = compose(model.colors(), LogoSize::from_width(369.0));
//! assert!(doc.markup().contains(r##"fill="#FF0000""##));
//! ```
//!
//! # Exporting
//!
//! [`Studio`] ties the model to an exporter, an [`ExportSink`] and an
//! optional gallery:
//!
//! ```no_run
//! use logo_colorist::{ExportSink, InMemoryGallery, RasterExporter, Region, Studio};
//!
//! # async fn run() {
//! let mut studio: Studio<InMemoryGallery> =
//!     Studio::new(RasterExporter::default(), ExportSink::system());
//! studio.active_color_mut().set("#FF6B6B");
//! studio.paint(Region::Background);
//!
//! let report = studio.copy_to_clipboard().await;
//! println!("{:?}", report.outcome);
//! # }
//! ```

mod compose;
mod config;
mod error;
mod gallery;
mod raster;
mod region;
mod session;
mod share;
mod sink;
mod studio;

pub use compose::{LogoSize, VIEWBOX_HEIGHT, VIEWBOX_WIDTH, VectorDocument, compose, compose_preview, highlight, lighten};
pub use config::{AppConfig, DownloadsConfig, GALLERY_KEY_ENV, GALLERY_URL_ENV, GalleryConfig};
pub use error::{
    ConfigError, DecodeError, ExportError, GalleryError, RegionError, SessionError, SinkError,
};
pub use gallery::collage::{CoverLayout, render_cover};
pub use gallery::memory::SavedLogo;
pub use gallery::{
    COVER_LIMIT, ConfiguredGallery, GALLERY_LIMIT, GalleryEntry, GalleryStore, InMemoryGallery,
    KeepAlive, KeepAliveConfig, OwnerId, SupabaseGallery, profile_url, save_logo,
};
pub use raster::{
    ArtifactFormat, DecodedLogo, Decoder, ExportArtifact, ExportConfig, Placement, RasterExporter,
    ResourceHandle, ResourceRegistry,
};
pub use region::{
    ActiveColor, Color, ColorRegionModel, DEFAULT_ACCENT_COLOR, DEFAULT_BASE_COLOR, Region,
    RegionColorMap,
};
pub use session::{OwnerHandle, SESSION_KEY, Session, SessionStore};
pub use share::ShareConfig;
pub use sink::{
    COPIED_DISPLAY, ClipboardHold, ClipboardSink, DEFAULT_FILE_STEM, Delivery, DirectoryDownloads, DownloadSink,
    ExportSink, SystemClipboard, TransientFlag,
};
pub use studio::{CopyOutcome, DownloadOutcome, ExportReport, ExportStatus, SaveTask, Studio};
