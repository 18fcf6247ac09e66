use super::{corrupt, encode};
use crate::Result;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const SEEN_SET_KEY: &str = "replied-posts.json";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeenRecord {
    replied_ids: Vec<String>,
}

/// Durable set of post ids that already received a reply.
///
/// Ids are only ever added. Every successful [`mark_done`](Self::mark_done)
/// is written through before it returns.
pub struct SeenSetStore {
    storage: Arc<dyn Storage>,
    ids: BTreeSet<String>,
}

impl SeenSetStore {
    /// Load the persisted set; an absent record yields an empty set.
    ///
    /// A record that does not parse is an error. Treating it as empty would
    /// let the next run reply to everything again.
    pub fn load(storage: Arc<dyn Storage>) -> Result<Self> {
        let ids = match storage.read(SEEN_SET_KEY)? {
            None => {
                tracing::debug!("No seen-set record, starting empty");
                BTreeSet::new()
            }
            Some(bytes) => {
                let record: SeenRecord =
                    serde_json::from_slice(&bytes).map_err(|e| corrupt(SEEN_SET_KEY, e))?;
                let total = record.replied_ids.len();
                let ids: BTreeSet<String> = record.replied_ids.into_iter().collect();
                if ids.len() != total {
                    tracing::debug!("Seen-set contained {} duplicate ids", total - ids.len());
                }
                ids
            }
        };

        tracing::debug!("Loaded seen-set with {} ids", ids.len());
        Ok(Self { storage, ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Record `id` as replied to.
    ///
    /// Returns `false` (and writes nothing) when the id was already present.
    pub fn mark_done(&mut self, id: &str) -> Result<bool> {
        if self.ids.contains(id) {
            return Ok(false);
        }

        let mut next = self.ids.clone();
        next.insert(id.to_string());
        self.persist(&next)?;
        self.ids = next;

        tracing::debug!(post_id = id, "Marked post as replied");
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    fn persist(&self, ids: &BTreeSet<String>) -> Result<()> {
        let record = SeenRecord {
            replied_ids: ids.iter().cloned().collect(),
        };
        let bytes = encode(SEEN_SET_KEY, &record)?;
        self.storage.write_atomic(SEEN_SET_KEY, &bytes)
    }
}
