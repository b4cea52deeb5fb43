//! Query-object shape synthesis
//!
//! Produces the abstract description of one table's query type: the join
//! descriptors derived from its foreign-key columns and the availability of
//! keyed operations.

use crate::resolve::{query_struct_name, row_struct_name};
use rowforge_core::{SchemaType, Table};

/// One join derived from a foreign-key column
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinDesc {
    pub referenced_table: String,
    pub referenced_struct: String,
    pub local_column: String,
    pub referenced_field: String,
    /// Deterministic alias under which the referenced table's columns appear
    /// in the denormalized result: `fkey_<column>_`
    pub alias_prefix: String,
}

/// The synthesized query-object description for one table
#[derive(Clone, Debug)]
pub struct QuerySpec {
    pub table: String,
    pub struct_name: String,
    /// Keyed tables get setters, key allocation and row/batch removal;
    /// keyless tables get diagnostics returning failure instead.
    pub keyed: bool,
    pub joins: Vec<JoinDesc>,
}

impl QuerySpec {
    /// Synthesize the query shape for a table. A missing primary key is a
    /// non-fatal generation-time warning.
    pub fn synthesize(table: &Table) -> QuerySpec {
        if table.primary_key().is_none() {
            tracing::warn!(
                table = table.name(),
                "no primary key found, some features will not be available"
            );
        }
        let joins = table
            .foreign_keys()
            .filter_map(|column| match column.ty() {
                SchemaType::ForeignKey { table: referenced, field } => Some(JoinDesc {
                    referenced_table: referenced.clone(),
                    referenced_struct: row_struct_name(referenced),
                    local_column: column.name().to_string(),
                    referenced_field: field.clone(),
                    alias_prefix: format!("fkey_{}_", column.name()),
                }),
                _ => None,
            })
            .collect();
        QuerySpec {
            table: table.name().to_string(),
            struct_name: query_struct_name(table.name()),
            keyed: table.primary_key().is_some(),
            joins,
        }
    }
}
