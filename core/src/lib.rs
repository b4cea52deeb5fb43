//! Schema model and runtime support surface for rowforge
//!
//! Everything a generated data-access artifact instantiates lives here: the
//! read-only schema model, the generic value container, the storage and
//! driver-conversion contracts, the per-table key allocator, and the dynamic
//! row-value and query machinery the generated typed wrappers delegate to.

pub mod backend;
pub mod codec;
pub mod credential;
pub mod error;
pub mod filter;
pub mod pk;
pub mod query;
pub mod row;
pub mod schema;
pub mod value;
pub mod version;

// Re-export key types and traits
pub use backend::{Backend, DeleteSpec, JoinSpec, RowAccess, RowIter};
pub use codec::ValueCodec;
pub use credential::Credential;
pub use error::{CoreError, Result};
pub use filter::{CmpOp, Filter, FilterExpr, SortDir};
pub use pk::KeyAllocator;
pub use query::TableQuery;
pub use row::{FieldValue, RowData, Temporal};
pub use schema::{
    BindingMode, Column, Constraints, Database, SchemaType, Table, TableRegistry,
};
pub use value::{Date, DateTime, Time, Value};
pub use version::{VERSION, version_compatible};
