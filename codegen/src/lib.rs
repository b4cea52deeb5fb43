//! Schema compilation: turns a declarative database model into one
//! strongly-typed data-access unit per database.
//!
//! The pipeline is model -> shape synthesis -> rendering -> artifact:
//! [`rowspec`] and [`queryspec`] synthesize the abstract row-value and
//! query-object shapes, [`render`] turns them into deterministic source
//! text, and [`writer`] places `db_<name>.rs` in the configured output
//! directory. [`dump`] renders a model back into readable schema text.

pub mod config;
pub mod dump;
pub mod error;
pub mod queryspec;
pub mod render;
pub mod resolve;
pub mod rowspec;
pub mod writer;

pub use config::{GeneratorConfig, NativeWidth};
pub use dump::dump_database;
pub use error::{CodegenError, Result};
pub use queryspec::{JoinDesc, QuerySpec};
pub use render::render_database;
pub use resolve::{ResolvedType, query_struct_name, resolve, row_struct_name};
pub use rowspec::{FieldSpec, RowSpec};
pub use writer::{artifact_path, write_database};
