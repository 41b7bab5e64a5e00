//! Table of live data sources, addressed by typed handles.
//!
//! The host inserts a source, receives a `SourceHandle`, and passes
//! `handle.to_url(scheme)` to the protocol registry. Opening the URL moves the
//! source out of the table and into the adapter, so a handle opens at most once.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroI64;
use std::sync::Arc;

use super::DataSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceHandle(NonZeroI64);

impl SourceHandle {
    /// Handle for a raw id, `None` for zero.
    pub fn from_raw(id: i64) -> Option<Self> {
        NonZeroI64::new(id).map(Self)
    }

    pub fn as_raw(self) -> i64 {
        self.0.get()
    }

    pub fn to_url(self, scheme: &str) -> String {
        format!("{}:{}", scheme, self.0)
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct TableInner {
    /// `None` once every positive id has been issued.
    next_id: Option<i64>,
    sources: HashMap<SourceHandle, Box<dyn DataSource>>,
}

#[derive(Clone)]
pub struct SourceTable {
    inner: Arc<Mutex<TableInner>>,
}

impl Default for SourceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceTable {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    fn starting_at(first_id: i64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TableInner {
                next_id: Some(first_id),
                sources: HashMap::new(),
            })),
        }
    }

    /// Add a source and return its handle.
    ///
    /// Ids are never reused. Once they run out the source is closed and
    /// `None` is returned.
    pub fn insert(&self, mut source: Box<dyn DataSource>) -> Option<SourceHandle> {
        let mut inner = self.inner.lock();
        let handle = match inner.next_id.and_then(SourceHandle::from_raw) {
            Some(handle) => handle,
            None => {
                drop(inner);
                log::warn!("[SourceTable] Source ids exhausted, closing new source");
                source.close();
                return None;
            }
        };
        inner.next_id = handle.as_raw().checked_add(1);
        inner.sources.insert(handle, source);
        log::debug!("[SourceTable] Registered source {}", handle);
        Some(handle)
    }

    /// Move a source out of the table. Ownership passes to the caller.
    pub fn take(&self, handle: SourceHandle) -> Option<Box<dyn DataSource>> {
        self.inner.lock().sources.remove(&handle)
    }

    /// Drop a source that was never opened, closing it.
    pub fn remove(&self, handle: SourceHandle) -> bool {
        // Close outside the lock; a source may call back into the table.
        let removed = self.take(handle);
        match removed {
            Some(mut source) => {
                source.close();
                log::debug!("[SourceTable] Removed unopened source {}", handle);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, handle: SourceHandle) -> bool {
        self.inner.lock().sources.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
