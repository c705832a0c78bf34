//! Rasterization of vector documents into exportable bitmaps.
//!
//! [`RasterExporter::rasterize`] is the whole export pipeline:
//!
//! ```text
//! VectorDocument
//!     │  register as a temporary resource
//!     ▼
//! ResourceHandle ──► Decoder::decode (await)
//!                         │
//!                         ▼
//! white surface ◄── DecodedLogo::draw at Placement::centered
//!     │
//!     ▼
//! encode ──► ExportArtifact
//! ```
//!
//! The surface is filled white before anything is drawn, so artifacts are
//! never transparent. The resource handle is dropped on every return path.

pub mod decode;
pub mod encode;
pub mod resource;

pub use decode::{DecodedLogo, Decoder};
pub use resource::{ResourceHandle, ResourceRegistry};

use resvg::tiny_skia::{Color, Pixmap};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::compose::{LogoSize, VectorDocument};
use crate::error::ExportError;

// ============================================================================
// Configuration
// ============================================================================

/// Bitmap container used for artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    #[default]
    Png,
    Jpeg,
}

impl ArtifactFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ArtifactFormat::Png => "image/png",
            ArtifactFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Png => "png",
            ArtifactFormat::Jpeg => "jpg",
        }
    }
}

/// Export geometry and encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct ExportConfig {
    /// Side of the square canvas before supersampling.
    pub base_size: u32,

    /// Resolution multiplier applied to the canvas and the logo.
    pub supersample: u32,

    /// Nominal logo width on the base canvas. Height follows the logo's
    /// aspect ratio.
    pub logo_width: f32,

    pub format: ArtifactFormat,

    /// Encoder quality in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_size: 600,
            supersample: 3,
            logo_width: 540.0,
            format: ArtifactFormat::Png,
            quality: 0.95,
        }
    }
}

impl ExportConfig {
    /// Side of the final square surface in pixels.
    pub fn surface_side(&self) -> Result<u32, ExportError> {
        self.base_size
            .checked_mul(self.supersample)
            .ok_or(ExportError::SurfaceTooLarge {
                base_size: self.base_size,
                supersample: self.supersample,
            })
    }

    /// Nominal size the document should be composed at.
    pub fn logo_size(&self) -> LogoSize {
        LogoSize::from_width(self.logo_width)
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where the logo lands on the surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Centers a `logo`-sized box on a `surface_width` x `surface_height`
    /// surface. Offsets go negative when the logo is larger than the surface.
    pub fn centered(surface_width: u32, surface_height: u32, logo: LogoSize) -> Self {
        Self {
            x: (surface_width as f32 - logo.width) / 2.0,
            y: (surface_height as f32 - logo.height) / 2.0,
            width: logo.width,
            height: logo.height,
        }
    }
}

// ============================================================================
// ExportArtifact
// ============================================================================

/// An encoded bitmap produced by one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub format: ArtifactFormat,
    pub width: u32,
    pub height: u32,
}

impl ExportArtifact {
    /// `stem` plus the format's extension.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format.extension())
    }
}

// ============================================================================
// RasterExporter
// ============================================================================

/// Converts vector documents into fixed-size bitmaps.
///
/// Each call allocates its own surface and resource handle, so concurrent
/// exports share nothing but the registry.
#[derive(Debug, Clone, Default)]
pub struct RasterExporter {
    config: ExportConfig,
    registry: ResourceRegistry,
    decoder: Decoder,
}

impl RasterExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            registry: ResourceRegistry::new(),
            decoder: Decoder::new(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The registry temporary resources are placed in.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Runs the export pipeline for `document`.
    ///
    /// A decode failure ends the attempt without an artifact.
    pub async fn rasterize(&self, document: &VectorDocument) -> Result<ExportArtifact, ExportError> {
        let side = self.config.surface_side()?;
        let mut surface = Pixmap::new(side, side).ok_or(ExportError::Surface(side, side))?;
        surface.fill(Color::WHITE);

        let resource = self.registry.register(document.markup().as_bytes());
        debug!(id = resource.id(), side, "rasterizing vector document");

        let decoded = match self.decoder.decode(&resource).await {
            Ok(decoded) => decoded,
            Err(err) => {
                error!(id = resource.id(), error = %err, "failed to decode vector document");
                return Err(err.into());
            }
        };

        let logo = document.size().scaled(self.config.supersample as f32);
        let placement = Placement::centered(side, side, logo);
        decoded.draw(&mut surface, placement);
        drop(decoded);

        let image = encode::pixmap_to_rgba_image(&surface);
        let bytes = encode::encode_image(&image, self.config.format, self.config.quality)?;
        drop(resource);

        info!(
            width = side,
            height = side,
            bytes = bytes.len(),
            format = self.config.format.extension(),
            "export artifact ready"
        );
        Ok(ExportArtifact {
            bytes,
            format: self.config.format,
            width: side,
            height: side,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
