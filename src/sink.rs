//! Delivery of export artifacts to the clipboard or the file system.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::SinkError;
use crate::raster::ExportArtifact;

/// File name stem used when the caller does not pick one.
pub const DEFAULT_FILE_STEM: &str = "succinct-logo-custom";

/// How long the "copied" indicator stays up after a copy.
pub const COPIED_DISPLAY: Duration = Duration::from_secs(2);

// ============================================================================
// Sink traits
// ============================================================================

/// Something that can hold an image for pasting elsewhere.
pub trait ClipboardSink: Send + Sync {
    fn write_image(&self, artifact: &ExportArtifact) -> Result<(), SinkError>;
}

/// Something that can persist an artifact under a file name.
pub trait DownloadSink: Send + Sync {
    /// Stores `artifact` as `file_name` and returns where it went.
    fn save(&self, artifact: &ExportArtifact, file_name: &str) -> Result<PathBuf, SinkError>;
}

// ============================================================================
// SystemClipboard
// ============================================================================

/// How long a write keeps the image on an X11 or Wayland clipboard.
///
/// There the copying program owns the selection, and the image disappears
/// with it. Other platforms hand the data to the OS and ignore this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardHold {
    /// Offer the image to a running clipboard manager when the connection
    /// closes. Without a manager the image is lost on exit.
    #[default]
    Handover,
    /// Block the write until another program takes the selection. For
    /// processes that exit right after copying.
    UntilReplaced,
}

/// The desktop clipboard.
///
/// A fresh clipboard connection is opened per write.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard {
    hold: ClipboardHold,
}

impl SystemClipboard {
    pub fn new(hold: ClipboardHold) -> Self {
        Self { hold }
    }

    /// Blocks each write until the image is replaced on the clipboard.
    pub fn until_replaced() -> Self {
        Self::new(ClipboardHold::UntilReplaced)
    }

    pub fn hold(&self) -> ClipboardHold {
        self.hold
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_image(&self, artifact: &ExportArtifact) -> Result<(), SinkError> {
        // The clipboard takes raw pixels, not an encoded file.
        let rgba = image::load_from_memory(&artifact.bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let image = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(rgba.into_raw()),
        };

        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| SinkError::Clipboard(e.to_string()))?;
        set_image(&mut clipboard, image, self.hold).map_err(|e| SinkError::Clipboard(e.to_string()))
    }
}

#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn set_image(
    clipboard: &mut arboard::Clipboard,
    image: arboard::ImageData<'static>,
    hold: ClipboardHold,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    match hold {
        ClipboardHold::Handover => clipboard.set_image(image),
        ClipboardHold::UntilReplaced => {
            debug!("holding clipboard selection until replaced");
            clipboard.set().wait().image(image)
        }
    }
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn set_image(
    clipboard: &mut arboard::Clipboard,
    image: arboard::ImageData<'static>,
    _hold: ClipboardHold,
) -> Result<(), arboard::Error> {
    clipboard.set_image(image)
}

// ============================================================================
// DirectoryDownloads
// ============================================================================

/// Writes artifacts into a directory, the way a browser download would.
#[derive(Debug, Clone, Default)]
pub struct DirectoryDownloads {
    dir: Option<PathBuf>,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// The user's download directory, if the platform has one.
    pub fn user_default() -> Self {
        Self {
            dir: dirs::download_dir(),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

impl DownloadSink for DirectoryDownloads {
    fn save(&self, artifact: &ExportArtifact, file_name: &str) -> Result<PathBuf, SinkError> {
        let dir = self.dir.as_ref().ok_or(SinkError::NoDownloadDir)?;
        let path = dir.join(file_name);

        fs::create_dir_all(dir).map_err(|source| SinkError::Write {
            path: dir.clone(),
            source,
        })?;
        fs::write(&path, &artifact.bytes).map_err(|source| SinkError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = artifact.bytes.len(), "wrote download");
        Ok(path)
    }
}

// ============================================================================
// TransientFlag
// ============================================================================

/// A boolean that switches itself off after a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct TransientFlag {
    duration: Duration,
    until: Option<Instant>,
}

impl TransientFlag {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            until: None,
        }
    }

    pub fn raise(&mut self) {
        self.raise_at(Instant::now());
    }

    pub fn raise_at(&mut self, now: Instant) {
        self.until = Some(now + self.duration);
    }

    pub fn is_set(&self) -> bool {
        self.is_set_at(Instant::now())
    }

    pub fn is_set_at(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }
}

// ============================================================================
// ExportSink
// ============================================================================

/// Where a copy request actually ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Clipboard,
    /// The clipboard refused the image, so it was downloaded instead.
    Download(PathBuf),
}

/// Front door for delivering artifacts.
pub struct ExportSink {
    clipboard: Box<dyn ClipboardSink>,
    downloads: Box<dyn DownloadSink>,
    copied: TransientFlag,
}

impl ExportSink {
    pub fn new(clipboard: impl ClipboardSink + 'static, downloads: impl DownloadSink + 'static) -> Self {
        Self {
            clipboard: Box::new(clipboard),
            downloads: Box::new(downloads),
            copied: TransientFlag::new(COPIED_DISPLAY),
        }
    }

    /// System clipboard plus the user's download directory.
    pub fn system() -> Self {
        Self::new(SystemClipboard::default(), DirectoryDownloads::user_default())
    }

    /// Puts `artifact` on the clipboard, downloading it as `file_name` if
    /// the clipboard refuses. Either way the copied indicator is raised.
    pub fn copy_to_clipboard(
        &mut self,
        artifact: &ExportArtifact,
        file_name: &str,
    ) -> Result<Delivery, SinkError> {
        let delivery = match self.clipboard.write_image(artifact) {
            Ok(()) => {
                info!("copied logo to clipboard");
                Delivery::Clipboard
            }
            Err(err) => {
                warn!(error = %err, "clipboard write failed, downloading instead");
                Delivery::Download(self.download_file(artifact, file_name)?)
            }
        };
        self.copied.raise();
        Ok(delivery)
    }

    /// Saves `artifact` as `file_name`. There is no retry.
    pub fn download_file(&self, artifact: &ExportArtifact, file_name: &str) -> Result<PathBuf, SinkError> {
        match self.downloads.save(artifact, file_name) {
            Ok(path) => {
                info!(path = %path.display(), "downloaded logo");
                Ok(path)
            }
            Err(err) => {
                warn!(error = %err, file_name, "download failed");
                Err(err)
            }
        }
    }

    /// True while the copied indicator should be shown.
    pub fn is_copied(&self) -> bool {
        self.copied.is_set()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ArtifactFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct RejectingClipboard;

    impl ClipboardSink for RejectingClipboard {
        fn write_image(&self, _: &ExportArtifact) -> Result<(), SinkError> {
            Err(SinkError::Clipboard("permission denied".into()))
        }
    }

    #[derive(Clone, Default)]
    struct CountingClipboard(Arc<AtomicUsize>);

    impl ClipboardSink for CountingClipboard {
        fn write_image(&self, _: &ExportArtifact) -> Result<(), SinkError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn artifact() -> ExportArtifact {
        ExportArtifact {
            bytes: vec![1, 2, 3, 4],
            format: ArtifactFormat::Png,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn system_clipboard_hands_over_unless_asked_to_wait() {
        assert_eq!(SystemClipboard::default().hold(), ClipboardHold::Handover);
        assert_eq!(
            SystemClipboard::until_replaced().hold(),
            ClipboardHold::UntilReplaced
        );
    }

    #[test]
    fn clipboard_success_does_not_download() {
        let dir = tempfile::tempdir().unwrap();
        let clipboard = CountingClipboard::default();
        let mut sink = ExportSink::new(clipboard.clone(), DirectoryDownloads::new(dir.path()));

        let delivery = sink.copy_to_clipboard(&artifact(), "logo.png").unwrap();
        assert_eq!(delivery, Delivery::Clipboard);
        assert_eq!(clipboard.0.load(Ordering::SeqCst), 1);
        assert!(!dir.path().join("logo.png").exists());
        assert!(sink.is_copied());
    }

    #[test]
    fn clipboard_failure_falls_back_to_download() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ExportSink::new(RejectingClipboard, DirectoryDownloads::new(dir.path()));

        let delivery = sink.copy_to_clipboard(&artifact(), "logo.png").unwrap();
        let path = dir.path().join("logo.png");
        assert_eq!(delivery, Delivery::Download(path.clone()));
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3, 4]);
        assert!(sink.is_copied());
    }

    #[test]
    fn download_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let sink = ExportSink::new(RejectingClipboard, DirectoryDownloads::new(&nested));

        let path = sink.download_file(&artifact(), "x.png").unwrap();
        assert_eq!(path, nested.join("x.png"));
        assert!(!sink.is_copied());
    }

    #[test]
    fn download_without_directory_fails() {
        let sink = ExportSink::new(RejectingClipboard, DirectoryDownloads::default());
        let result = sink.download_file(&artifact(), "x.png");
        assert!(matches!(result, Err(SinkError::NoDownloadDir)));
    }

    #[test]
    fn copied_flag_expires() {
        let start = Instant::now();
        let mut flag = TransientFlag::new(COPIED_DISPLAY);
        assert!(!flag.is_set_at(start));

        flag.raise_at(start);
        assert!(flag.is_set_at(start + Duration::from_millis(1999)));
        assert!(!flag.is_set_at(start + Duration::from_secs(2)));
    }
}
