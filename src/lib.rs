//! Facade crate re-exporting the runtime surface and the schema compiler.
//!
//! Declare a [`Database`] model, compile it with [`codegen::write_database`]
//! into a `db_<name>.rs` unit, and drive the generated types against any
//! [`Backend`]/[`ValueCodec`] pair at runtime.

pub use rowforge_core::*;

pub mod codegen {
    pub use rowforge_codegen::*;
}
