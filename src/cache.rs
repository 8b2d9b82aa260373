//! Memoization of class/method/field lookups.
//!
//! Lookups are keyed by a hash of the identifying string: the class name
//! alone, or class name + member name + signature for members. Caching is
//! infrastructure that exists behind a flag, off by default; some Java
//! runtimes have shown instability with long-lived cached ids, and the
//! cache buys little since the lookup cost is dwarfed by the call that
//! follows. Enabled or disabled, every lookup path behaves identically
//! apart from how often the resolver runs.
//!
//! The cache is only valid for one initialized runtime instance; the
//! bridge clears it wholesale on every (re)initialization.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

fn key_of(parts: &[&str]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for part in parts {
        part.hash(&mut hasher);
    }
    hasher.finish()
}

/// One memoization table. `insert` on an existing key overwrites; the
/// key is a content hash of the same logical identity, so a later value
/// simply supersedes the earlier one.
#[derive(Debug)]
pub struct LookupCache<T: Copy> {
    entries: HashMap<u64, T>,
}

impl<T: Copy> Default for LookupCache<T> {
    fn default() -> Self {
        LookupCache {
            entries: HashMap::new(),
        }
    }
}

impl<T: Copy> LookupCache<T> {
    pub fn get(&self, parts: &[&str]) -> Option<T> {
        self.entries.get(&key_of(parts)).copied()
    }

    pub fn insert(&mut self, parts: &[&str], value: T) {
        self.entries.insert(key_of(parts), value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consults the cache when enabled, falling back to `resolve`.
    /// Failed resolutions are never stored.
    pub fn lookup(
        &mut self,
        enabled: bool,
        parts: &[&str],
        resolve: impl FnOnce() -> Option<T>,
    ) -> Option<T> {
        if !enabled {
            return resolve();
        }
        if let Some(value) = self.get(parts) {
            return Some(value);
        }
        let value = resolve()?;
        self.insert(parts, value);
        Some(value)
    }
}

/// The three caches the bridge carries, plus the enable flag.
#[derive(Debug)]
pub struct HandleCache<C: Copy, M: Copy, F: Copy> {
    pub classes: LookupCache<C>,
    pub methods: LookupCache<M>,
    pub fields: LookupCache<F>,
    pub enabled: bool,
}

impl<C: Copy, M: Copy, F: Copy> Default for HandleCache<C, M, F> {
    fn default() -> Self {
        HandleCache {
            classes: LookupCache::default(),
            methods: LookupCache::default(),
            fields: LookupCache::default(),
            enabled: false,
        }
    }
}

impl<C: Copy, M: Copy, F: Copy> HandleCache<C, M, F> {
    pub fn with_enabled(enabled: bool) -> Self {
        HandleCache {
            enabled,
            ..HandleCache::default()
        }
    }

    pub fn clear_all(&mut self) {
        tracing::debug!(
            classes = self.classes.len(),
            methods = self.methods.len(),
            fields = self.fields.len(),
            "clearing handle caches"
        );
        self.classes.clear();
        self.methods.clear();
        self.fields.clear();
    }
}
