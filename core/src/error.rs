use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Schema type string not in the fixed vocabulary
    #[error("Unknown schema type: {0}")]
    UnknownType(String),

    /// Constraint token not recognized by the model
    #[error("Unknown constraint: {0}")]
    UnknownConstraint(String),

    /// Two tables with the same name inside one database
    #[error("Duplicate table: {0}")]
    DuplicateTable(String),

    /// Primary-key name set on a table but no matching column carries the constraint
    #[error("Table '{0}' declares primary key '{1}' but no matching column carries it")]
    PrimaryKeyMismatch(String, String),

    /// Column lookup by name failed
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Table lookup in the registry failed
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Write attempted through a row that was never attached to a storage context
    #[error("Row is not attached to a storage context")]
    Detached,

    /// Keyed operation attempted on a table without a primary key
    #[error("Table '{0}' has no primary key")]
    KeylessTable(String),

    /// Error reported by the storage collaborator
    #[error("Backend error: {0}")]
    Backend(String),

    /// Error decoding a result row into a row-value
    #[error("Hydration error: {0}")]
    Hydration(String),

    /// Constructor called with the wrong number of column values
    #[error("Expected {expected} values for table '{table}', got {got}")]
    Arity {
        table: String,
        expected: usize,
        got: usize,
    },

    /// Update attempted on the primary-key column itself
    #[error("Column '{0}' is the primary key and cannot be updated")]
    PrimaryKeyImmutable(String),
}

/// Result type for model and runtime operations
pub type Result<T> = std::result::Result<T, CoreError>;
