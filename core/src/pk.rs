//! Per-table primary-key allocation
//!
//! One allocator per keyed table. The counter is an in-memory, single-process
//! sequence: seeding marks the largest key currently in storage as used, and
//! every allocation afterwards returns a strictly increasing, previously
//! unused value. Writers in other processes against the same storage can
//! still collide; cross-process coordination is explicitly out of scope and
//! must be provided externally if required.

use crate::backend::Backend;
use crate::error::{CoreError, Result};
use crate::filter::{Filter, SortDir};
use crate::schema::Table;
use std::sync::atomic::{AtomicI64, Ordering};

/// Monotonic primary-key sequence for one table.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    next: AtomicI64,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key value as used; later allocations stay strictly above it.
    pub fn mark_used(&self, value: i64) {
        self.next.fetch_max(value + 1, Ordering::SeqCst);
    }

    /// Allocate the next unused key.
    pub fn next(&self) -> i64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Seed from existing storage state: read the maximum key currently
    /// present (descending sort, limit 1) and mark it used.
    ///
    /// An empty table leaves the counter untouched. A read failure is
    /// non-fatal; the allocator then starts from its current state.
    pub fn seed(&self, backend: &dyn Backend, table: &Table) -> Result<()> {
        let pk = table
            .primary_key()
            .ok_or_else(|| CoreError::KeylessTable(table.name().to_string()))?;
        match backend.select(table, &Filter::new(), &[], Some(1), SortDir::Descending) {
            Ok(mut rows) => {
                if let Some(row) = rows.next() {
                    self.mark_used(row.value(pk).as_int());
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(table = table.name(), %err, "failed to seed key allocator");
                Ok(())
            }
        }
    }
}
