//! Storage collaborator contract
//!
//! The runtime machinery never touches the wire: every read, insert, update
//! and delete goes through a [`Backend`] implementation. Result rows come
//! back as name-addressable [`RowAccess`] values.

use crate::error::Result;
use crate::filter::{Filter, SortDir};
use crate::schema::{Column, Table};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Join descriptor handed to the backend's select operation.
///
/// One descriptor per foreign-key column: the referenced table with its full
/// column list, the local and referenced columns, and the alias prefix under
/// which the referenced table's columns appear in the denormalized result.
#[derive(Clone, Debug)]
pub struct JoinSpec {
    pub table: Arc<Table>,
    pub columns: Vec<Column>,
    pub local_column: Column,
    pub foreign_column: Column,
    pub alias_prefix: String,
}

/// Deletion target for the backend's delete operation
#[derive(Clone, Debug)]
pub enum DeleteSpec {
    /// Equality predicate on one primary-key value
    Key(Value),
    /// One batched delete over a set of primary-key values
    Keys(Vec<Value>),
    /// All rows matching a filter
    Matching(Filter),
}

/// Name-addressable access to one raw result row
pub trait RowAccess {
    /// The generic value stored under a (possibly join-aliased) column name.
    /// A missing column yields [`Value::Null`].
    fn value(&self, column: &str) -> Value;
}

impl RowAccess for HashMap<String, Value> {
    fn value(&self, column: &str) -> Value {
        self.get(column).cloned().unwrap_or(Value::Null)
    }
}

/// Lazy sequence of raw result rows produced by a select
pub type RowIter<'a> = Box<dyn Iterator<Item = Box<dyn RowAccess>> + 'a>;

/// The storage collaborator executing queries on behalf of generated code.
///
/// All operations are synchronous and block until the storage layer returns;
/// cancellation and timeouts are the implementation's responsibility.
pub trait Backend {
    /// Read rows, denormalized across the given joins, optionally limited
    /// and sorted. Sort-column choice is driver policy; callers only pick
    /// the direction.
    fn select<'a>(
        &'a self,
        table: &Table,
        filter: &Filter,
        joins: &[JoinSpec],
        limit: Option<u32>,
        sort: SortDir,
    ) -> Result<RowIter<'a>>;

    /// Insert fully-materialized value tuples. `columns` gives the tuple
    /// layout; every row must match it positionally.
    fn insert(&self, table: &Table, columns: &[Column], rows: Vec<Vec<Value>>) -> Result<()>;

    /// Point update of one column, keyed by the row's primary-key value.
    fn update(&self, table: &Table, column: &Column, value: Value, key: Value) -> Result<()>;

    /// Delete rows by key, key batch, or filter.
    fn delete(&self, table: &Table, spec: DeleteSpec) -> Result<()>;
}
