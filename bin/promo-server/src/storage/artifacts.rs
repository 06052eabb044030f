//! Expiring artifact store backed by a flat directory.
//!
//! Every saved file gets an expiry timestamp. Expired entries are invisible
//! to [`ArtifactStore::retrieve`] immediately and are deleted from disk by
//! the periodic [`ArtifactStore::sweep`]. Nothing survives a restart: files
//! left over from a previous process are purged on [`ArtifactStore::open`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use promo_core::{ContentKind, Resolution};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

const ARTIFACT_EXTENSIONS: [&str; 2] = ["jpg", "html"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct Entry {
    path: PathBuf,
    content_type: &'static str,
    expires_at: DateTime<Utc>,
}

enum Lookup {
    Live(Entry),
    Expired(Entry),
    Missing,
}

/// A stored file as returned to the download handler.
#[derive(Debug)]
pub struct StoredArtifact {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ArtifactStore {
    dir: PathBuf,
    entries: Mutex<HashMap<String, Entry>>,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.lock().map(|e| e.len()).unwrap_or(0);
        write!(f, "ArtifactStore({}, {count} entries)", self.dir.display())
    }
}

/// `{kind}-{resolution}-{uuid}.{ext}`
pub fn artifact_name(kind: ContentKind, resolution: Resolution, extension: &str) -> String {
    format!("{kind}-{resolution}-{}.{extension}", Uuid::new_v4())
}

/// Only names this store could have generated are accepted.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl ArtifactStore {
    /// Create `dir` if needed and purge artifacts left by a previous process.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut purged = 0usize;
        let mut listing = tokio::fs::read_dir(&dir).await?;
        while let Some(item) = listing.next_entry().await? {
            let path = item.path();
            let is_artifact = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| ARTIFACT_EXTENSIONS.contains(&e));
            if !is_artifact {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => purged += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to purge leftover artifact"),
            }
        }
        info!(dir = %dir.display(), purged, "artifact store ready");

        Ok(Self { dir, entries: Mutex::new(HashMap::new()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// Write `bytes` under `name`; retrievable until `ttl` has elapsed.
    pub async fn save(
        &self,
        name: &str,
        bytes: &[u8],
        content_type: &'static str,
        ttl: Duration,
    ) -> Result<(), StorageError> {
        if !is_safe_name(name) {
            return Err(StorageError::NotFound(name.to_owned()));
        }
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;

        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(name.to_owned(), Entry { path, content_type, expires_at });
        }
        debug!(name, bytes = bytes.len(), %expires_at, "artifact saved");
        Ok(())
    }

    /// Load a live artifact. Unknown, expired and malformed names all map to
    /// [`StorageError::NotFound`]; an expired entry is removed on the spot.
    pub async fn retrieve(&self, name: &str) -> Result<StoredArtifact, StorageError> {
        if !is_safe_name(name) {
            return Err(StorageError::NotFound(name.to_owned()));
        }

        let now = Utc::now();
        let lookup = match self.entries.lock() {
            Ok(mut entries) => match entries.get(name) {
                None => Lookup::Missing,
                Some(e) if e.expires_at <= now => entries.remove(name).map_or(Lookup::Missing, Lookup::Expired),
                Some(e) => Lookup::Live(e.clone()),
            },
            Err(_) => Lookup::Missing,
        };
        let entry = match lookup {
            Lookup::Live(entry) => entry,
            Lookup::Missing => return Err(StorageError::NotFound(name.to_owned())),
            Lookup::Expired(entry) => {
                remove_quietly(&entry.path).await;
                debug!(name, "artifact expired");
                return Err(StorageError::NotFound(name.to_owned()));
            }
        };

        match tokio::fs::read(&entry.path).await {
            Ok(bytes) => Ok(StoredArtifact { name: name.to_owned(), content_type: entry.content_type, bytes }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Ok(mut entries) = self.entries.lock() {
                    entries.remove(name);
                }
                warn!(name, "artifact file vanished before expiry");
                Err(StorageError::NotFound(name.to_owned()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Delete every entry that expired at or before `now`. Returns the number
    /// of entries removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<(String, Entry)> = match self.entries.lock() {
            Ok(mut entries) => {
                let names: Vec<String> = entries
                    .iter()
                    .filter(|(_, e)| e.expires_at <= now)
                    .map(|(n, _)| n.clone())
                    .collect();
                names
                    .into_iter()
                    .filter_map(|n| entries.remove(&n).map(|e| (n, e)))
                    .collect()
            }
            Err(_) => return 0,
        };

        for (_, entry) in &expired {
            remove_quietly(&entry.path).await;
        }
        if !expired.is_empty() {
            info!(removed = expired.len(), remaining = self.len(), "expired artifacts swept");
        }
        expired.len()
    }

    /// Run [`sweep`](Self::sweep) every `interval` for the life of the process.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        let period = interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                store.sweep(Utc::now()).await;
            }
        })
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete expired artifact"),
    }
}
