use super::Storage;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-process storage, used by tests and dry runs
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let records = self.records.lock().map_err(|_| Error::Poisoned)?;
        Ok(records.get(key).cloned())
    }

    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| Error::Poisoned)?;
        records.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let records = self.records.lock().map_err(|_| Error::Poisoned)?;
        Ok(records
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut records = self.records.lock().map_err(|_| Error::Poisoned)?;
        records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.write_atomic("b", b"2").unwrap();
        storage.write_atomic("a", b"1").unwrap();

        assert_eq!(storage.read("a").unwrap().unwrap(), b"1");
        assert_eq!(storage.list("").unwrap(), vec!["a", "b"]);

        storage.remove("a").unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.len(), 1);
    }
}
