use super::{corrupt, encode};
use crate::Result;
use crate::post::{Post, Snapshot};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

pub const SNAPSHOT_PREFIX: &str = "snapshot-";

/// Identifies one persisted snapshot without holding its posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHandle {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub sequence: u64,
    pub post_count: usize,
}

impl SnapshotHandle {
    fn of(key: String, snapshot: &Snapshot) -> Self {
        Self {
            key,
            created_at: snapshot.created_at,
            sequence: snapshot.sequence,
            post_count: snapshot.posts.len(),
        }
    }

    /// Chronological order: recorded time, then sequence, then key
    fn recency(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then(self.sequence.cmp(&other.sequence))
            .then_with(|| self.key.cmp(&other.key))
    }
}

/// Timestamped snapshots of scraped posts
///
/// Recency is decided by what each snapshot records about itself, never by
/// file metadata, so copied or moved files keep their order.
pub struct ResultStore {
    storage: Arc<dyn Storage>,
}

impl ResultStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Persist a new snapshot stamped with the current time
    pub fn write_snapshot(&self, posts: Vec<Post>) -> Result<SnapshotHandle> {
        self.write_snapshot_at(posts, Utc::now())
    }

    /// Persist a new snapshot with an explicit creation time.
    ///
    /// The recorded time never goes below that of the current latest snapshot,
    /// so a freshly written snapshot is always the latest even when a stored
    /// one claims a later time. Older snapshots are left untouched.
    pub fn write_snapshot_at(
        &self,
        posts: Vec<Post>,
        created_at: DateTime<Utc>,
    ) -> Result<SnapshotHandle> {
        let existing = self.list()?;
        let sequence = existing
            .iter()
            .map(|handle| handle.sequence)
            .max()
            .map_or(1, |max| max + 1);

        let created_at = match existing.last() {
            Some(latest) if latest.created_at > created_at => {
                tracing::warn!(
                    "Snapshot {} is dated in the future ({}), dating the new one to match",
                    latest.key,
                    latest.created_at
                );
                latest.created_at
            }
            _ => created_at,
        };

        let snapshot = Snapshot {
            created_at,
            sequence,
            posts,
        };
        let key = snapshot_key(created_at, sequence);
        let bytes = encode(&key, &snapshot)?;
        self.storage.write_atomic(&key, &bytes)?;

        tracing::info!(
            "Saved snapshot {} with {} posts",
            key,
            snapshot.posts.len()
        );
        Ok(SnapshotHandle::of(key, &snapshot))
    }

    /// The most recent snapshot, if any exist
    pub fn latest(&self) -> Result<Option<Snapshot>> {
        let latest = self
            .load_all()?
            .into_iter()
            .max_by(|(a, _), (b, _)| a.recency(b));

        Ok(latest.map(|(handle, snapshot)| {
            tracing::debug!("Latest snapshot is {}", handle.key);
            snapshot
        }))
    }

    /// Delete every snapshot except the most recent one.
    ///
    /// Returns how many were removed; zero or one snapshot is a no-op.
    pub fn prune_older_than_latest(&self) -> Result<usize> {
        let mut handles = self.list()?;
        if handles.len() <= 1 {
            return Ok(0);
        }

        // list() is oldest first, so the last handle is the one to keep
        handles.pop();
        for handle in &handles {
            self.storage.remove(&handle.key)?;
            tracing::info!("Deleted old snapshot {}", handle.key);
        }

        Ok(handles.len())
    }

    /// All snapshots, oldest first
    pub fn list(&self) -> Result<Vec<SnapshotHandle>> {
        Ok(self.load_all()?.into_iter().map(|(handle, _)| handle).collect())
    }

    /// Every readable snapshot, oldest first.
    ///
    /// Unparseable records are skipped with a warning and left on disk.
    fn load_all(&self) -> Result<Vec<(SnapshotHandle, Snapshot)>> {
        let mut loaded = Vec::new();
        for key in self.storage.list(SNAPSHOT_PREFIX)? {
            if !key.ends_with(".json") {
                continue;
            }
            let Some(bytes) = self.storage.read(&key)? else {
                continue;
            };
            match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(snapshot) => loaded.push((SnapshotHandle::of(key, &snapshot), snapshot)),
                Err(e) => tracing::warn!("Ignoring unreadable snapshot: {}", corrupt(&key, e)),
            }
        }

        loaded.sort_by(|(a, _), (b, _)| a.recency(b));
        Ok(loaded)
    }
}

/// Fixed-width name so lexical order follows creation order
fn snapshot_key(created_at: DateTime<Utc>, sequence: u64) -> String {
    format!(
        "{}{}-{:08}.json",
        SNAPSHOT_PREFIX,
        created_at.format("%Y%m%dT%H%M%S%6fZ"),
        sequence
    )
}
