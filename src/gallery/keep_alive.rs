//! Periodic pings that stop an idle hosted gallery from being paused.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use super::GalleryStore;

/// Timing of keep-alive pings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveConfig {
    /// Time between scheduled pings.
    pub interval: Duration,

    /// User activity triggers a ping once the last successful one is
    /// older than this.
    pub activity_threshold: Duration,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(6 * 60 * 60),
            activity_threshold: Duration::from_secs(60 * 60),
        }
    }
}

/// Pings a [`GalleryStore`] on a schedule and on user activity.
///
/// Nothing runs until [`start`](Self::start). Dropping the value stops the
/// schedule. Must be used from within a Tokio runtime.
pub struct KeepAlive<S> {
    store: Arc<S>,
    config: KeepAliveConfig,
    last_success: Arc<Mutex<Option<Instant>>>,
    task: Option<JoinHandle<()>>,
}

impl<S: GalleryStore + 'static> KeepAlive<S> {
    pub fn new(store: Arc<S>, config: KeepAliveConfig) -> Self {
        Self {
            store,
            config,
            last_success: Arc::new(Mutex::new(None)),
            task: None,
        }
    }

    /// Pings immediately, then once per interval. Starting twice is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let store = Arc::clone(&self.store);
        let last_success = Arc::clone(&self.last_success);
        let period = self.config.interval;

        debug!(interval_secs = period.as_secs(), "starting keep-alive");
        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval(period);
            loop {
                ticker.tick().await;
                ping_once(&*store, &last_success).await;
            }
        }));
    }

    /// Records user activity. Returns the spawned ping, if one was due.
    ///
    /// Outside a Tokio runtime nothing can be spawned and the activity is
    /// ignored.
    pub fn touch(&self) -> Option<JoinHandle<()>> {
        let due = match self.last_success() {
            Some(last) => last.elapsed() > self.config.activity_threshold,
            None => true,
        };
        if !due {
            return None;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime, skipping activity ping");
            return None;
        };
        let store = Arc::clone(&self.store);
        let last_success = Arc::clone(&self.last_success);
        Some(runtime.spawn(async move {
            ping_once(&*store, &last_success).await;
        }))
    }
}

impl<S> KeepAlive<S> {
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("stopped keep-alive");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// When the last ping succeeded.
    pub fn last_success(&self) -> Option<Instant> {
        *self
            .last_success
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S> Drop for KeepAlive<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn ping_once<S: GalleryStore>(store: &S, last_success: &Mutex<Option<Instant>>) {
    match store.ping().await {
        Ok(()) => {
            debug!("keep-alive ping succeeded");
            *last_success
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
        }
        Err(err) => warn!(error = %err, "keep-alive ping failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GalleryError;
    use crate::gallery::{GalleryEntry, InMemoryGallery, OwnerId};
    use crate::region::RegionColorMap;
    use crate::session::OwnerHandle;
    use chrono::{DateTime, Utc};

    const HOUR: Duration = Duration::from_secs(60 * 60);

    struct DownStore;

    fn down() -> GalleryError {
        GalleryError::Status {
            status: 503,
            body: String::new(),
        }
    }

    impl GalleryStore for DownStore {
        async fn find_owner_by_handle(&self, _: &OwnerHandle) -> Result<Option<OwnerId>, GalleryError> {
            Err(down())
        }

        async fn create_owner(&self, _: &OwnerHandle) -> Result<OwnerId, GalleryError> {
            Err(down())
        }

        async fn upsert_logo(
            &self,
            _: &OwnerId,
            _: &RegionColorMap,
            _: DateTime<Utc>,
        ) -> Result<(), GalleryError> {
            Err(down())
        }

        async fn list_recent_logos(&self, _: usize) -> Result<Vec<GalleryEntry>, GalleryError> {
            Err(down())
        }

        async fn ping(&self) -> Result<(), GalleryError> {
            Err(down())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pings_on_start_and_every_interval() {
        let store = Arc::new(InMemoryGallery::new());
        let mut keep_alive = KeepAlive::new(Arc::clone(&store), KeepAliveConfig::default());
        assert_eq!(store.ping_count(), 0);

        keep_alive.start();
        keep_alive.start();
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.ping_count(), 1);

        time::sleep(6 * HOUR).await;
        assert_eq!(store.ping_count(), 2);

        keep_alive.stop();
        assert!(!keep_alive.is_running());
        time::sleep(12 * HOUR).await;
        assert_eq!(store.ping_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_pings_only_when_stale() {
        let store = Arc::new(InMemoryGallery::new());
        let mut keep_alive = KeepAlive::new(Arc::clone(&store), KeepAliveConfig::default());
        keep_alive.start();
        time::sleep(Duration::from_secs(1)).await;
        assert!(keep_alive.last_success().is_some());

        assert!(keep_alive.touch().is_none());

        time::sleep(HOUR).await;
        let ping = keep_alive.touch().expect("stale keep-alive should ping");
        ping.await.unwrap();
        assert_eq!(store.ping_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_pings_do_not_count_as_success() {
        let keep_alive = KeepAlive::new(Arc::new(DownStore), KeepAliveConfig::default());

        keep_alive.touch().unwrap().await.unwrap();
        assert!(keep_alive.last_success().is_none());
        assert!(keep_alive.touch().is_some());
    }

    #[test]
    fn touch_without_runtime_is_ignored() {
        let store = Arc::new(InMemoryGallery::new());
        let keep_alive = KeepAlive::new(Arc::clone(&store), KeepAliveConfig::default());
        assert!(keep_alive.touch().is_none());
        assert_eq!(store.ping_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_schedule() {
        let store = Arc::new(InMemoryGallery::new());
        {
            let mut keep_alive = KeepAlive::new(Arc::clone(&store), KeepAliveConfig::default());
            keep_alive.start();
            time::sleep(Duration::from_secs(1)).await;
        }
        time::sleep(24 * HOUR).await;
        assert_eq!(store.ping_count(), 1);
    }
}
