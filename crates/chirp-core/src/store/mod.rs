mod seen;
mod session;
mod snapshot;

pub use seen::{SEEN_SET_KEY, SeenSetStore};
pub use session::{SESSION_KEY, SessionStore};
pub use snapshot::{ResultStore, SNAPSHOT_PREFIX, SnapshotHandle};

use crate::{Error, Result};
use serde::Serialize;

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|source| Error::Encode {
        key: key.to_string(),
        source,
    })
}

fn corrupt(key: &str, err: impl std::fmt::Display) -> Error {
    Error::Corrupt {
        key: key.to_string(),
        reason: err.to_string(),
    }
}
