//! Daily refresh of the published image.
//!
//! [`DailyRefresher`] owns the one servable asset. It is shared (behind an
//! `Arc`) between the background schedule loop, which writes, and the HTTP
//! handlers, which only read the current filename.
//!
//! ## Refresh cycle
//!
//! ```text
//! lock ─▶ scan pool ─▶ select for today ─▶ copy to today_YYYY-MM-DD.jpg
//!      ─▶ publish filename ─▶ remove previous asset ─▶ unlock
//! ```
//!
//! Any failure before "publish filename" aborts the cycle and leaves the
//! previous asset live and untouched. Failing to remove the previous asset is
//! only logged.
//!
//! ## Concurrency
//!
//! - Refreshes are serialized by a single `Mutex`, which also holds the
//!   [`PublishedAsset`] record. A second caller blocks until the first is
//!   done.
//! - Readers never take that mutex. The filename is published through a
//!   `tokio::sync::watch` channel, and only after the file is fully in place,
//!   so a reader can never see a name whose file does not exist yet.
//! - The previous asset is removed only after the new name is visible.
//!   On the first publish of a process, every other `today_*.jpg` left in
//!   the asset directory is removed instead.

use crate::clock::{self, Clock};
use crate::mapper::{SelectError, select_image};
use crate::naming::asset_filename;
use crate::publish::{self, PublishError, copy_asset, remove_asset};
use crate::scan::{ScanError, scan_pool, source_path};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// The asset currently being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAsset {
    /// Filename inside the asset directory, e.g. `today_2024-01-01.jpg`.
    pub filename: String,
    /// Pool identifier the asset was copied from.
    pub source: String,
    /// Date the image was selected for.
    pub date: NaiveDate,
}

pub struct DailyRefresher {
    image_dir: PathBuf,
    asset_dir: PathBuf,
    timezone: Tz,
    clock: Arc<dyn Clock>,
    /// Refresh lock. Held for the whole cycle.
    published: Mutex<Option<PublishedAsset>>,
    current: watch::Sender<Option<String>>,
}

impl DailyRefresher {
    pub fn new(
        image_dir: impl Into<PathBuf>,
        asset_dir: impl Into<PathBuf>,
        timezone: Tz,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            image_dir: image_dir.into(),
            asset_dir: asset_dir.into(),
            timezone,
            clock,
            published: Mutex::new(None),
            current,
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Filename of the currently served asset, if one has been published.
    pub fn current_filename(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Receiver that observes every newly published filename.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Option<PublishedAsset>> {
        // A panic mid-refresh cannot leave the record half-written: it is
        // only assigned after the copy succeeded.
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run one refresh cycle now, blocking until it completes.
    ///
    /// Errors are logged here as well as returned; the caller may ignore the
    /// result. On error the previously published asset is still being served.
    pub fn refresh_now(&self) -> Result<PublishedAsset, RefreshError> {
        let mut published = self.lock();
        info!("Updating image for today...");

        let result = self.refresh_locked(&mut published);
        match &result {
            Ok(asset) => info!("Today's image: {} (served as {})", asset.source, asset.filename),
            Err(RefreshError::Select(SelectError::EmptyPool)) => {
                warn!(
                    "No images available in {}, keeping current image",
                    self.image_dir.display()
                )
            }
            Err(e) => error!("Image update failed, keeping current image: {e}"),
        }
        result
    }

    fn refresh_locked(
        &self,
        published: &mut Option<PublishedAsset>,
    ) -> Result<PublishedAsset, RefreshError> {
        let pool = scan_pool(&self.image_dir)?;
        let today = clock::today(self.clock.as_ref(), self.timezone);
        let selected = select_image(&pool, today, today)?.to_string();

        let filename = asset_filename(today);
        copy_asset(
            &source_path(&self.image_dir, &selected),
            &self.asset_dir,
            &filename,
        )?;

        let asset = PublishedAsset {
            filename: filename.clone(),
            source: selected,
            date: today,
        };
        let previous = published.replace(asset.clone());
        self.current.send_replace(Some(filename));

        match previous {
            Some(prev) if prev.filename != asset.filename => {
                match remove_asset(&self.asset_dir, &prev.filename) {
                    Ok(()) => info!("Removed previous image: {}", prev.filename),
                    Err(e) => warn!("Error removing previous image: {e}"),
                }
            }
            Some(_) => {}
            // First publish of this process: clear whatever an earlier one left
            None => {
                if self.sweep_except(&asset.filename) == 0 {
                    info!("No previous image to remove");
                }
            }
        }

        Ok(asset)
    }

    /// Remove asset files left behind by an earlier process.
    ///
    /// Keeps the currently published asset. Does nothing until something has
    /// been published, so a failed first refresh never empties the asset
    /// directory. The first successful refresh already sweeps, so this only
    /// finds files written behind the refresher's back. Returns the number of
    /// files removed.
    pub fn sweep_stale_assets(&self) -> usize {
        let published = self.lock();
        match published.as_ref() {
            Some(current) => self.sweep_except(&current.filename),
            None => 0,
        }
    }

    /// Delete every asset file except `keep`. Caller holds the refresh lock.
    fn sweep_except(&self, keep: &str) -> usize {
        let names = match publish::list_assets(&self.asset_dir) {
            Ok(names) => names,
            Err(e) => {
                warn!(
                    "Could not list asset directory {}: {e}",
                    self.asset_dir.display()
                );
                return 0;
            }
        };

        let mut removed = 0;
        for name in names.iter().filter(|n| n.as_str() != keep) {
            match remove_asset(&self.asset_dir, name) {
                Ok(()) => {
                    info!("Removed stale image: {name}");
                    removed += 1;
                }
                Err(e) => warn!("Error removing stale image: {e}"),
            }
        }
        removed
    }

    /// Refresh at every local midnight until `cancel` fires.
    ///
    /// The wait is recomputed from the clock on every iteration. Cancellation
    /// is only observed while sleeping: a refresh that has started always
    /// runs to completion.
    pub async fn run_schedule_loop(self: Arc<Self>, cancel: CancellationToken) {
        loop {
            let wait = clock::until_next_midnight(self.clock.now(), self.timezone);
            info!("Next image update in {}", format_wait(wait));

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Image schedule stopped");
                    return;
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let this = Arc::clone(&self);
            if let Err(e) = tokio::task::spawn_blocking(move || this.refresh_now()).await {
                error!("Image update task failed: {e}");
            }
        }
    }
}

/// `"5h 3m 12s"` style rendering for log lines.
fn format_wait(wait: Duration) -> String {
    let secs = wait.as_secs();
    format!("{}h {}m {}s", secs / 3600, secs % 3600 / 60, secs % 60)
}
