//! Turning a registered vector resource into a drawable image.

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};
use tracing::debug;

use super::Placement;
use super::resource::ResourceHandle;
use crate::error::DecodeError;

/// A parsed vector image, ready to be drawn at any scale.
pub struct DecodedLogo {
    tree: Tree,
}

impl DecodedLogo {
    /// Parses vector markup synchronously.
    pub fn from_data(data: &[u8]) -> Result<Self, DecodeError> {
        let tree = Tree::from_data(data, &Options::default())?;
        Ok(Self { tree })
    }

    /// Size declared by the document's root `width`/`height`.
    pub fn intrinsic_size(&self) -> (f32, f32) {
        let size = self.tree.size();
        (size.width(), size.height())
    }

    /// Draws the image into `surface`, stretched to `placement`.
    ///
    /// Pixels are composited source-over onto whatever the surface already
    /// holds.
    pub fn draw(&self, surface: &mut Pixmap, placement: Placement) {
        let (width, height) = self.intrinsic_size();
        let transform = Transform::from_row(
            placement.width / width,
            0.0,
            0.0,
            placement.height / height,
            placement.x,
            placement.y,
        );
        resvg::render(&self.tree, transform, &mut surface.as_mut());
    }
}

/// Decodes registered resources.
///
/// Holds no state today; it exists so decode options (a cancellation
/// token, font settings) can be added without touching callers.
#[derive(Debug, Clone, Default)]
pub struct Decoder;

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Waits until `resource` is decoded or fails to decode.
    ///
    /// Parsing runs on the blocking pool; the caller is suspended until it
    /// finishes. There is no retry.
    pub async fn decode(&self, resource: &ResourceHandle) -> Result<DecodedLogo, DecodeError> {
        let data = resource
            .data()
            .ok_or(DecodeError::Released(resource.id()))?;
        let id = resource.id();

        let decoded = tokio::task::spawn_blocking(move || DecodedLogo::from_data(&data)).await??;

        debug!(id, "decoded resource");
        Ok(decoded)
    }
}
