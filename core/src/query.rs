//! Query-object runtime machinery
//!
//! [`TableQuery`] is the dynamic core every generated query type wraps. It
//! accumulates a filter conjunction, a row limit and a sort direction, then
//! executes a read, insert or remove against the storage collaborator.

use crate::backend::{Backend, DeleteSpec, JoinSpec};
use crate::codec::ValueCodec;
use crate::error::{CoreError, Result};
use crate::filter::{Filter, FilterExpr, SortDir};
use crate::pk::KeyAllocator;
use crate::row::RowData;
use crate::schema::{BindingMode, Column, SchemaType, Table, TableRegistry};
use crate::value::Value;
use std::sync::Arc;

/// Accumulating query object for one table
pub struct TableQuery<'a> {
    backend: &'a dyn Backend,
    codec: &'a dyn ValueCodec,
    registry: &'a TableRegistry,
    table: Arc<Table>,
    allocator: Option<&'a KeyAllocator>,
    mode: BindingMode,
    filter: Filter,
    limit: Option<u32>,
    sort: SortDir,
}

impl<'a> TableQuery<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        codec: &'a dyn ValueCodec,
        registry: &'a TableRegistry,
        table: Arc<Table>,
        allocator: Option<&'a KeyAllocator>,
        mode: BindingMode,
    ) -> Self {
        Self {
            backend,
            codec,
            registry,
            table,
            allocator,
            mode,
            filter: Filter::new(),
            limit: None,
            sort: SortDir::Ascending,
        }
    }

    /// Append filter terms. Terms always combine as one conjunction.
    pub fn filter(mut self, terms: impl IntoIterator<Item = FilterExpr>) -> Self {
        for term in terms {
            self.filter.and(term);
        }
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn asc(mut self) -> Self {
        self.sort = SortDir::Ascending;
        self
    }

    pub fn desc(mut self) -> Self {
        self.sort = SortDir::Descending;
        self
    }

    /// One join descriptor per foreign-key column of the table.
    fn join_specs(&self) -> Result<Vec<JoinSpec>> {
        let mut joins = Vec::new();
        for column in self.table.foreign_keys() {
            let SchemaType::ForeignKey { table, field } = column.ty() else {
                continue;
            };
            let referenced = self.registry.get(table)?;
            let foreign_column = referenced
                .column(field)
                .cloned()
                .ok_or_else(|| CoreError::UnknownColumn(format!("{table}.{field}")))?;
            joins.push(JoinSpec {
                columns: referenced.columns().to_vec(),
                table: referenced,
                local_column: column.clone(),
                foreign_column,
                alias_prefix: format!("fkey_{}_", column.name()),
            });
        }
        Ok(joins)
    }

    /// Execute the read. A failure to obtain a result is reported as a
    /// diagnostic and yields an empty sequence; it never propagates.
    pub fn fetch(&self) -> Vec<RowData> {
        let joins = match self.join_specs() {
            Ok(joins) => joins,
            Err(err) => {
                tracing::warn!(table = self.table.name(), %err, "failed to resolve joins");
                return Vec::new();
            }
        };
        let rows = match self.backend.select(&self.table, &self.filter, &joins, self.limit, self.sort)
        {
            Ok(rows) => rows,
            Err(err) => {
                tracing::warn!(table = self.table.name(), %err, "query failed");
                return Vec::new();
            }
        };
        rows.filter_map(|row| {
            match RowData::hydrate(
                self.table.clone(),
                self.registry,
                self.mode,
                self.codec,
                row.as_ref(),
                "",
            ) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(table = self.table.name(), %err, "failed to hydrate row");
                    None
                }
            }
        })
        .collect()
    }

    /// Insert a single row, allocating a key for keyed tables and attaching
    /// the row to the owning table as a side effect.
    pub fn insert(&self, row: &mut RowData) -> Result<()> {
        self.insert_many(std::slice::from_mut(row))
    }

    /// Batch insertion. Keys are allocated in input order, one per row;
    /// rows are attached to the owning table only once the storage insert
    /// has succeeded.
    pub fn insert_many(&self, rows: &mut [RowData]) -> Result<()> {
        let keyed = self.table.primary_key().is_some();
        // Tuple layout: non-key columns in declaration order, key last.
        let mut columns: Vec<Column> = self
            .table
            .columns()
            .iter()
            .filter(|c| !c.is_primary_key())
            .cloned()
            .collect();
        if keyed {
            if let Some(pk) = self
                .table
                .columns()
                .iter()
                .find(|c| c.is_primary_key())
            {
                columns.push(pk.clone());
            }
        }
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let mut values = row.to_values(self.codec)?;
            if keyed {
                let allocator = self.allocator.ok_or_else(|| {
                    CoreError::Backend(format!(
                        "no key allocator registered for table '{}'",
                        self.table.name()
                    ))
                })?;
                values.push(Value::Int(allocator.next()));
            }
            tuples.push(values);
        }
        self.backend.insert(&self.table, &columns, tuples)?;
        for row in rows.iter_mut() {
            if !row.is_attached() {
                row.attach();
            }
        }
        Ok(())
    }

    /// Remove one row by its primary-key value. Unavailable on keyless
    /// tables: reports a diagnostic and fails without any storage call.
    pub fn remove(&self, row: &RowData) -> Result<()> {
        if self.table.primary_key().is_none() {
            tracing::warn!(
                table = self.table.name(),
                "cannot remove rows from a table without a primary key"
            );
            return Err(CoreError::KeylessTable(self.table.name().to_string()));
        }
        self.backend
            .delete(&self.table, DeleteSpec::Key(row.key_value(self.codec)?))
    }

    /// Remove a batch of rows with one batched delete over their key values.
    pub fn remove_many(&self, rows: &[RowData]) -> Result<()> {
        if self.table.primary_key().is_none() {
            tracing::warn!(
                table = self.table.name(),
                "cannot remove rows from a table without a primary key"
            );
            return Err(CoreError::KeylessTable(self.table.name().to_string()));
        }
        let keys = rows
            .iter()
            .map(|row| row.key_value(self.codec))
            .collect::<Result<Vec<_>>>()?;
        self.backend.delete(&self.table, DeleteSpec::Keys(keys))
    }

    /// Remove every row matching the accumulated filter. Like the other
    /// removal forms, unavailable on keyless tables: reports a diagnostic
    /// and fails without any storage call.
    pub fn remove_matching(&self) -> Result<()> {
        if self.table.primary_key().is_none() {
            tracing::warn!(
                table = self.table.name(),
                "cannot remove rows from a table without a primary key"
            );
            return Err(CoreError::KeylessTable(self.table.name().to_string()));
        }
        self.backend
            .delete(&self.table, DeleteSpec::Matching(self.filter.clone()))
    }
}
