//! Volatile in-memory explored point store.
//!
//! Behaves like the SQLite store (monotonic ids that survive a delete-all)
//! and can be told to fail reads or writes, which makes it the store of
//! choice for exercising the tracker's failure paths.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use super::{BoxFuture, ExploredStore, StoreError};
use crate::model::{ExploredPoint, NewPoint};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<ExploredPoint>,
    last_id: i64,
}

/// In-memory explored point store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Table>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    delete_all_calls: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts and deletes fail until cleared.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent bulk reads fail until cleared.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of times `delete_all` has been invoked, successful or not.
    pub fn delete_all_calls(&self) -> u64 {
        self.delete_all_calls.load(Ordering::SeqCst)
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.table.lock().rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }
}

impl ExploredStore for MemoryStore {
    fn insert(&self, point: NewPoint) -> BoxFuture<'_, Result<ExploredPoint, StoreError>> {
        Box::pin(async move {
            self.check_writes()?;
            let mut table = self.table.lock();
            table.last_id += 1;
            let stored = ExploredPoint::from_new(table.last_id, point);
            table.rows.push(stored);
            Ok(stored)
        })
    }

    fn load_all(&self) -> BoxFuture<'_, Result<Vec<ExploredPoint>, StoreError>> {
        Box::pin(async move {
            self.check_reads()?;
            Ok(self.table.lock().rows.clone())
        })
    }

    fn delete_all(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
        Box::pin(async move {
            self.delete_all_calls.fetch_add(1, Ordering::SeqCst);
            self.check_writes()?;
            let mut table = self.table.lock();
            let removed = table.rows.len() as u64;
            table.rows.clear();
            Ok(removed)
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
