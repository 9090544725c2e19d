//! In-memory `ZoneRegistry` + `GeometrySink` implementation.
//!
//! Suitable for testing, CLI use, and embedded deployments.
//! Thread-safe via `Arc<RwLock<Inner>>`.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};
use zonecodec_core::{GeometrySink, Ring, ZoneHandle, ZoneRecord, ZoneRegistry};

struct Inner {
    /// zone key (state-zone code) → handle
    by_key: HashMap<String, ZoneHandle>,
    /// handle → registered record
    records: HashMap<u64, ZoneRecord>,
    /// handle → last applied geometry. Keyed overwrite: re-applying the
    /// same handle replaces, so batch retries cannot duplicate.
    geometries: HashMap<u64, Vec<Ring>>,
    next_handle: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            records: HashMap::new(),
            geometries: HashMap::new(),
            next_handle: 0,
        }
    }
}

/// Thread-safe in-memory zone registry.
#[derive(Clone)]
pub struct MemoryRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::new())),
        }
    }

    /// Register a zone under `key`. Registering an existing key returns
    /// the original handle and leaves the stored record in place — the
    /// first registration wins, mirroring set semantics.
    pub fn register(&self, key: impl Into<String>, record: ZoneRecord) -> ZoneHandle {
        let key = key.into();
        let mut inner = self.inner.write().unwrap();
        if let Some(&handle) = inner.by_key.get(&key) {
            return handle;
        }
        let handle = ZoneHandle(inner.next_handle);
        inner.next_handle += 1;
        inner.by_key.insert(key, handle);
        inner.records.insert(handle.0, record);
        handle
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.read().unwrap().by_key.contains_key(key)
    }

    /// Fetch the registered record for a handle.
    pub fn get(&self, handle: ZoneHandle) -> Option<ZoneRecord> {
        self.inner.read().unwrap().records.get(&handle.0).cloned()
    }

    /// Fetch the geometry last applied for a handle, if any.
    pub fn geometry(&self, handle: ZoneHandle) -> Option<Vec<Ring>> {
        self.inner.read().unwrap().geometries.get(&handle.0).cloned()
    }

    /// Number of registered zones.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of zones that have geometry applied.
    pub fn geometry_count(&self) -> usize {
        self.inner.read().unwrap().geometries.len()
    }

    /// All registered keys, sorted.
    pub fn all_keys(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        let mut keys: Vec<String> = inner.by_key.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneRegistry for MemoryRegistry {
    fn find_record(&self, key: &str) -> Option<ZoneHandle> {
        self.inner.read().unwrap().by_key.get(key).copied()
    }
}

impl GeometrySink for MemoryRegistry {
    fn apply_geometry(&self, handle: ZoneHandle, rings: Vec<Ring>) {
        self.inner.write().unwrap().geometries.insert(handle.0, rings);
    }
}
