//! Error types for every fallible boundary in the crate.
//!
//! Coloring and composing cannot fail; everything that touches a decoder,
//! the clipboard, the file system, or the gallery service has its own enum.

use std::path::PathBuf;

use thiserror::Error;

/// A region identifier outside the logo's fixed region set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error("unknown logo region: {0:?}")]
    Unknown(String),
}

/// The vector document could not be turned into a drawable image.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The resource was released before decoding started.
    #[error("resource {0} is no longer registered")]
    Released(u64),

    /// The vector markup failed to parse.
    #[error("failed to parse vector document: {0}")]
    Parse(#[from] resvg::usvg::Error),

    /// The blocking decode task panicked or was aborted.
    #[error("decode task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors from the rasterization pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The bitmap surface could not be allocated.
    #[error("cannot allocate a {0}x{1} surface")]
    Surface(u32, u32),

    /// `base_size * supersample` does not fit in a pixel dimension.
    #[error("surface of {base_size} px at {supersample}x supersampling is too large")]
    SurfaceTooLarge { base_size: u32, supersample: u32 },

    /// The finished surface could not be encoded.
    #[error("failed to encode artifact: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors from clipboard and download sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("no download directory available")]
    NoDownloadDir,

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode artifact for the clipboard: {0}")]
    Artifact(#[from] image::ImageError),
}

/// Errors from the hosted gallery service.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gallery returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gallery response was missing {0}")]
    MissingField(&'static str),

    #[error("invalid gallery url: {0}")]
    Url(#[from] url::ParseError),

    #[error("owner {0} does not exist")]
    UnknownOwner(String),
}

/// Errors from reading or writing the persisted session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("handle is empty")]
    EmptyHandle,

    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
