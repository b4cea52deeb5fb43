//! Row-value shape synthesis
//!
//! Produces the abstract description of one table's row-value type:
//! constructor parameter lists, accessors, setters and the serialization
//! plan. Rendering into source text is a separate back-end concern.

use crate::config::NativeWidth;
use crate::resolve::{ResolvedType, resolve, row_struct_name};
use heck::ToSnakeCase;
use rowforge_core::{BindingMode, Column, Database, Table};

/// One column's slot in the synthesized row-value
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub column: Column,
    pub resolved: ResolvedType,
    pub by_ref: bool,
    /// snake_case accessor/parameter name
    pub ident: String,
}

impl FieldSpec {
    pub fn is_primary_key(&self) -> bool {
        self.column.is_primary_key()
    }
}

/// The synthesized row-value description for one table
#[derive(Clone, Debug)]
pub struct RowSpec {
    pub table: String,
    pub struct_name: String,
    pub primary_key: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl RowSpec {
    /// Synthesize the row-value shape for a table.
    pub fn synthesize(db: &Database, table: &Table, width: NativeWidth) -> RowSpec {
        let mode = db.binding();
        let fields = table
            .columns()
            .iter()
            .map(|column| {
                let resolved = resolve(column, mode, width);
                FieldSpec {
                    ident: column.name().to_snake_case(),
                    by_ref: resolved.by_ref(),
                    resolved,
                    column: column.clone(),
                }
            })
            .collect();
        RowSpec {
            table: table.name().to_string(),
            struct_name: row_struct_name(table.name()),
            primary_key: table.primary_key().map(str::to_string),
            fields,
        }
    }

    /// Parameters of the literal constructor: every column in declaration
    /// order.
    pub fn literal_params(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    /// Parameters of the insert constructor: primary-key columns omitted.
    pub fn insert_params(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_primary_key())
    }

    /// Setter targets: non-key columns, and only for keyed tables.
    pub fn setters(&self) -> impl Iterator<Item = &FieldSpec> {
        let keyed = self.primary_key.is_some();
        self.fields
            .iter()
            .filter(move |f| keyed && !f.is_primary_key())
    }

    /// Serialization plan: storage column order excluding the primary key.
    pub fn serialized_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| !f.is_primary_key())
    }
}
