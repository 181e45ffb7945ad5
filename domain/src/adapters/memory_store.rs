use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{CoreError, Mapping, MappingStore, ShortCode};

/// Simple in-memory store for tests and local demos. Uniqueness is enforced
/// the same way a real backend would: an insert on a present key fails with
/// `Conflict` instead of overwriting.
pub struct InMemoryStore {
    inner: Mutex<BTreeMap<String, Mapping>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingStore for InMemoryStore {
    fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>, CoreError> {
        let map = self
            .inner
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        Ok(map.get(code.as_str()).cloned())
    }

    fn insert_unique(&self, mapping: Mapping) -> Result<(), CoreError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| CoreError::Store("mutex poisoned".into()))?;
        let key = mapping.code.as_str().to_string();
        if map.contains_key(&key) {
            return Err(CoreError::Conflict);
        }
        map.insert(key, mapping);
        Ok(())
    }
}
