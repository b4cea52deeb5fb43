//! Schema data model
//!
//! A validated `Database → Table → Column` tree is the generator's sole
//! input. The model is built once by an external parser and read-only
//! afterwards; nothing in this crate mutates it past construction.

use crate::error::{CoreError, Result};
use crate::value::Value;
use std::collections::HashMap;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

// =============================================================================
// Constraints
// =============================================================================

/// OR-combinable column constraint bit-set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Constraints(u8);

impl Constraints {
    pub const NONE: Constraints = Constraints(0);
    pub const PRIMARY_KEY: Constraints = Constraints(1);
    pub const NOT_NULL: Constraints = Constraints(2);
    pub const UNIQUE: Constraints = Constraints(4);

    pub const fn contains(self, other: Constraints) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Parse a single constraint token from schema text.
    pub fn parse_token(token: &str) -> Result<Constraints> {
        match token {
            "primarykey" => Ok(Self::PRIMARY_KEY),
            "notnull" => Ok(Self::NOT_NULL),
            "unique" => Ok(Self::UNIQUE),
            other => Err(CoreError::UnknownConstraint(other.to_string())),
        }
    }
}

impl BitOr for Constraints {
    type Output = Constraints;

    fn bitor(self, rhs: Constraints) -> Constraints {
        Constraints(self.0 | rhs.0)
    }
}

impl BitOrAssign for Constraints {
    fn bitor_assign(&mut self, rhs: Constraints) {
        self.0 |= rhs.0;
    }
}

// =============================================================================
// Schema types
// =============================================================================

/// The fixed schema type vocabulary, plus foreign-key references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaType {
    Int,
    UInt,
    Double,
    Bool,
    Char,
    Text,
    Byte,
    Blob,
    Password,
    Date,
    Time,
    DateTime,
    /// `&<table>.<field>` reference; resolves to the referenced table's
    /// row-value type and drives join synthesis.
    ForeignKey { table: String, field: String },
}

impl SchemaType {
    /// Parse a schema type string. An unrecognized string is a hard error;
    /// columns are never silently dropped.
    pub fn parse(s: &str) -> Result<SchemaType> {
        if let Some(reference) = s.strip_prefix('&') {
            let (table, field) = reference
                .split_once('.')
                .ok_or_else(|| CoreError::UnknownType(s.to_string()))?;
            if table.is_empty() || field.is_empty() {
                return Err(CoreError::UnknownType(s.to_string()));
            }
            return Ok(SchemaType::ForeignKey {
                table: table.to_string(),
                field: field.to_string(),
            });
        }
        match s {
            "int" => Ok(SchemaType::Int),
            "uint" => Ok(SchemaType::UInt),
            "double" => Ok(SchemaType::Double),
            "bool" => Ok(SchemaType::Bool),
            "char" => Ok(SchemaType::Char),
            "text" => Ok(SchemaType::Text),
            "byte" => Ok(SchemaType::Byte),
            "blob" => Ok(SchemaType::Blob),
            "password" => Ok(SchemaType::Password),
            "date" => Ok(SchemaType::Date),
            "time" => Ok(SchemaType::Time),
            "datetime" => Ok(SchemaType::DateTime),
            other => Err(CoreError::UnknownType(other.to_string())),
        }
    }

    /// The schema text spelling of this type.
    pub fn schema_string(&self) -> String {
        match self {
            SchemaType::Int => "int".into(),
            SchemaType::UInt => "uint".into(),
            SchemaType::Double => "double".into(),
            SchemaType::Bool => "bool".into(),
            SchemaType::Char => "char".into(),
            SchemaType::Text => "text".into(),
            SchemaType::Byte => "byte".into(),
            SchemaType::Blob => "blob".into(),
            SchemaType::Password => "password".into(),
            SchemaType::Date => "date".into(),
            SchemaType::Time => "time".into(),
            SchemaType::DateTime => "datetime".into(),
            SchemaType::ForeignKey { table, field } => format!("&{table}.{field}"),
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, SchemaType::Date | SchemaType::Time | SchemaType::DateTime)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, SchemaType::Char | SchemaType::Text)
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, SchemaType::ForeignKey { .. })
    }
}

// =============================================================================
// Binding mode
// =============================================================================

/// Generation-time choice of value representations.
///
/// `Chrono` binds text to `String` and temporal columns to `chrono` calendar
/// types; `Std` binds text to a null-terminated `CString` form and all three
/// temporal kinds to `std::time::SystemTime`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BindingMode {
    #[default]
    Chrono,
    Std,
}

// =============================================================================
// Columns, tables, databases
// =============================================================================

/// One column of a table
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    ty: SchemaType,
    /// Minimum required bit-width (bytes for `double`); `None` = unbounded.
    minsize: Option<u32>,
    constraints: Constraints,
    /// Default value, re-encoded to canonical literal form.
    default: Option<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: name.into(),
            ty,
            minsize: None,
            constraints: Constraints::NONE,
            default: None,
        }
    }

    /// Parse the type from schema text instead of passing a [`SchemaType`].
    pub fn parse(name: impl Into<String>, ty: &str) -> Result<Self> {
        Ok(Self::new(name, SchemaType::parse(ty)?))
    }

    pub fn with_minsize(mut self, bits: u32) -> Self {
        self.minsize = Some(bits);
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints |= constraints;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default.canonical());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &SchemaType {
        &self.ty
    }

    pub fn minsize(&self) -> Option<u32> {
        self.minsize
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(Constraints::PRIMARY_KEY)
    }
}

/// One table of a database.
///
/// Column insertion order is storage column order and is significant for
/// serialization. Tables reference other tables by name only; ownership stays
/// with the [`Database`].
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    primary_key: Option<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: None,
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn add_column(&mut self, column: Column) {
        if column.is_primary_key() {
            self.primary_key = Some(column.name().to_string());
        }
        self.columns.push(column);
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.add_column(column);
        self
    }

    /// Columns carrying a foreign-key reference, in declaration order.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.ty().is_foreign_key())
    }

    /// Check the primary-key invariant: if a key name is set, exactly one
    /// column carries the constraint and its name matches.
    pub fn validate(&self) -> Result<()> {
        if let Some(pk) = self.primary_key() {
            let carriers: Vec<_> = self.columns.iter().filter(|c| c.is_primary_key()).collect();
            if carriers.len() != 1 || carriers[0].name() != pk {
                return Err(CoreError::PrimaryKeyMismatch(
                    self.name.clone(),
                    pk.to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A database: the root of the schema model
#[derive(Clone, Debug, PartialEq)]
pub struct Database {
    name: String,
    charset: String,
    binding: BindingMode,
    tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            charset: "utf-8".to_string(),
            binding: BindingMode::default(),
            tables: Vec::new(),
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_binding(mut self, binding: BindingMode) -> Self {
        self.binding = binding;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn binding(&self) -> BindingMode {
        self.binding
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Add a table, enforcing name uniqueness and the primary-key invariant.
    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.table(table.name()).is_some() {
            return Err(CoreError::DuplicateTable(table.name().to_string()));
        }
        table.validate()?;
        self.tables.push(table);
        Ok(())
    }

    pub fn with_table(mut self, table: Table) -> Result<Self> {
        self.add_table(table)?;
        Ok(self)
    }
}

// =============================================================================
// Runtime table registry
// =============================================================================

/// Name-to-table lookup shared by the runtime machinery.
///
/// The generated database type registers every table here once; hydration
/// resolves foreign-key references through it instead of through
/// back-pointers into the model.
#[derive(Clone, Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, Arc<Table>>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry covering every table of a database.
    pub fn from_database(db: &Database) -> Self {
        let mut registry = Self::new();
        for table in db.tables() {
            registry.register(table.clone());
        }
        registry
    }

    pub fn register(&mut self, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.tables.insert(table.name().to_string(), table.clone());
        table
    }

    pub fn get(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownTable(name.to_string()))
    }
}
