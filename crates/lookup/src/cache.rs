use std::collections::HashMap;
use std::sync::Mutex;

use permitscreen_engine::model::CodeSet;

use crate::error::LookupError;
use crate::registry::normalize;
use crate::CodeSource;

/// Memoizing wrapper around any code source.
///
/// Rosters repeat identifiers (multiple outfalls under one permit), and
/// remote lookups are the expensive step, so successful results are
/// cached by normalized identifier. Failures are not cached: a transient
/// upstream error should not pin `NO_MATCH`-like behavior for the rest
/// of the batch.
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<HashMap<String, CodeSet>>,
}

impl<S: CodeSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct identifiers resolved so far.
    pub fn cached(&self) -> usize {
        match self.cache.lock() {
            Ok(cache) => cache.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl<S: CodeSource> CodeSource for CachedSource<S> {
    fn lookup(&self, permit_id: &str) -> Result<CodeSet, LookupError> {
        let key = normalize(permit_id);

        if let Ok(cache) = self.cache.lock() {
            if let Some(codes) = cache.get(&key) {
                return Ok(codes.clone());
            }
        }

        let codes = self.inner.lookup(&key)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, codes.clone());
        }
        Ok(codes)
    }
}
