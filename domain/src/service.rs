use crate::derive::derive_code;
use crate::validate::is_well_formed_url;
use crate::{CoreError, Mapping, MappingStore, ShortCode};

/// Application service orchestrating creation and resolution of mappings.
///
/// It remains generic over the store port. No state is held beyond the store
/// handle: the derived code is a pure function of the input, so idempotence
/// comes from derivation plus the store's uniqueness constraint rather than
/// from any in-process counter or lock.
pub struct ShortenerService<S: MappingStore> {
    store: S,
}

impl<S: MappingStore> ShortenerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create-or-lookup the short code for a long URL.
    ///
    /// Validation happens before any store access. The pre-insert lookup is
    /// keyed on the derived code, which short-circuits duplicate inserts for
    /// a URL seen before. A `Conflict` from the store means a concurrent
    /// request inserted the same code between our check and our insert; it is
    /// absorbed by re-reading exactly once, never by retrying in a loop.
    pub fn shorten(&self, long_url: &str) -> Result<ShortCode, CoreError> {
        if !is_well_formed_url(long_url) {
            return Err(CoreError::InvalidUrl("malformed url".into()));
        }
        let code = derive_code(long_url);

        if let Some(existing) = self.store.find_by_code(&code)? {
            return Self::reconcile(existing, long_url, code);
        }

        match self
            .store
            .insert_unique(Mapping::new(code.clone(), long_url.to_string()))
        {
            Ok(()) => Ok(code),
            Err(CoreError::Conflict) => match self.store.find_by_code(&code)? {
                Some(existing) => Self::reconcile(existing, long_url, code),
                // The winning insert must be visible after a conflict.
                None => Err(CoreError::Store("mapping missing after conflict".into())),
            },
            Err(e) => Err(e),
        }
    }

    /// An existing mapping under our derived code either belongs to this URL
    /// (idempotent hit) or to a different URL whose digest prefix collides.
    fn reconcile(
        existing: Mapping,
        long_url: &str,
        code: ShortCode,
    ) -> Result<ShortCode, CoreError> {
        if existing.long_url == long_url {
            Ok(code)
        } else {
            Err(CoreError::CodeCollision)
        }
    }

    /// Resolve a short code to its original URL.
    pub fn resolve(&self, input: &str) -> Result<String, CoreError> {
        let code = ShortCode::new(input)?;
        match self.store.find_by_code(&code)? {
            Some(mapping) => Ok(mapping.long_url),
            None => Err(CoreError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::InMemoryStore;
    use std::sync::Mutex;

    #[test]
    fn shorten_then_resolve_roundtrips() {
        let svc = ShortenerService::new(InMemoryStore::new());
        let code = svc.shorten("https://example.com/page").expect("created");
        assert_eq!(code.as_str().len(), 10);
        let url = svc.resolve(code.as_str()).unwrap();
        assert_eq!(url, "https://example.com/page");
    }

    #[test]
    fn shorten_is_idempotent() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let svc = ShortenerService::new(std::sync::Arc::clone(&store));
        let first = svc.shorten("https://example.com/page").unwrap();
        let second = svc.shorten("https://example.com/page").unwrap();
        assert_eq!(first, second);
        // Exactly one record, no matter how often the same URL is submitted.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn shorten_rejects_malformed_url() {
        let svc = ShortenerService::new(InMemoryStore::new());
        let err = svc.shorten("not a url").unwrap_err();
        assert!(matches!(err, CoreError::InvalidUrl(_)));
    }

    #[test]
    fn resolve_unknown_code_is_not_found() {
        let svc = ShortenerService::new(InMemoryStore::new());
        let err = svc.resolve("abcdefghij").unwrap_err();
        assert!(matches!(err, CoreError::NotFound));
    }

    #[test]
    fn resolve_rejects_malformed_code_without_store_access() {
        struct PanickingStore;
        impl MappingStore for PanickingStore {
            fn find_by_code(&self, _: &ShortCode) -> Result<Option<Mapping>, CoreError> {
                panic!("store must not be touched for malformed input");
            }
            fn insert_unique(&self, _: Mapping) -> Result<(), CoreError> {
                panic!("store must not be touched for malformed input");
            }
        }
        let svc = ShortenerService::new(PanickingStore);
        let err = svc.resolve("short!").unwrap_err();
        assert!(matches!(err, CoreError::InvalidCode(_)));
    }

    #[test]
    fn colliding_code_for_different_url_is_reported() {
        let store = InMemoryStore::new();
        // Seed the code that "https://example.com" derives to with another URL.
        let code = derive_code("https://example.com");
        store
            .insert_unique(Mapping::new(code, "https://other.example.org".into()))
            .unwrap();
        let svc = ShortenerService::new(store);
        let err = svc.shorten("https://example.com").unwrap_err();
        assert!(matches!(err, CoreError::CodeCollision));
    }

    /// Store double that reports a conflict on insert, as if a concurrent
    /// request raced ahead, and only then exposes the winner's mapping.
    struct RacingStore {
        winner: Mutex<Option<Mapping>>,
        pending: Mapping,
    }

    impl MappingStore for RacingStore {
        fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>, CoreError> {
            let winner = self.winner.lock().unwrap();
            Ok(winner.as_ref().filter(|m| &m.code == code).cloned())
        }

        fn insert_unique(&self, _mapping: Mapping) -> Result<(), CoreError> {
            *self.winner.lock().unwrap() = Some(self.pending.clone());
            Err(CoreError::Conflict)
        }
    }

    #[test]
    fn conflicting_insert_resolves_to_winning_mapping() {
        let url = "https://example.com/raced";
        let code = derive_code(url);
        let store = RacingStore {
            winner: Mutex::new(None),
            pending: Mapping::new(code.clone(), url.to_string()),
        };
        let svc = ShortenerService::new(store);
        let got = svc.shorten(url).expect("conflict absorbed as success");
        assert_eq!(got, code);
    }

    #[test]
    fn conflicting_insert_with_different_url_is_a_collision() {
        let url = "https://example.com/raced";
        let code = derive_code(url);
        let store = RacingStore {
            winner: Mutex::new(None),
            pending: Mapping::new(code, "https://elsewhere.example.net".to_string()),
        };
        let svc = ShortenerService::new(store);
        let err = svc.shorten(url).unwrap_err();
        assert!(matches!(err, CoreError::CodeCollision));
    }
}
