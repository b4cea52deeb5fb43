//! Type and constraint resolution
//!
//! Maps `(schema type, minsize, binding mode, platform width)` to the target
//! representation each generated field uses. Unknown schema type strings are
//! rejected earlier, at model construction; by the time a [`Column`] exists
//! its type is one of the fixed vocabulary, so resolution is total.

use crate::config::NativeWidth;
use heck::ToPascalCase;
use rowforge_core::{BindingMode, Column, SchemaType};

/// The target representation of one column
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedType {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Bool,
    /// Text in chrono binding mode
    Text,
    /// Text in std binding mode: null-terminated form
    CText,
    Bytes,
    Credential,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    SystemTime,
    /// Foreign-key reference: the referenced table's row-value type
    Row(String),
}

impl ResolvedType {
    /// The Rust type the generated field stores.
    pub fn rust_type(&self) -> String {
        match self {
            ResolvedType::I32 => "i32".into(),
            ResolvedType::I64 => "i64".into(),
            ResolvedType::U32 => "u32".into(),
            ResolvedType::U64 => "u64".into(),
            ResolvedType::F32 => "f32".into(),
            ResolvedType::F64 => "f64".into(),
            ResolvedType::Bool => "bool".into(),
            ResolvedType::Text => "String".into(),
            ResolvedType::CText => "std::ffi::CString".into(),
            ResolvedType::Bytes => "Vec<u8>".into(),
            ResolvedType::Credential => "Credential".into(),
            ResolvedType::NaiveDate => "chrono::NaiveDate".into(),
            ResolvedType::NaiveTime => "chrono::NaiveTime".into(),
            ResolvedType::NaiveDateTime => "chrono::NaiveDateTime".into(),
            ResolvedType::SystemTime => "std::time::SystemTime".into(),
            ResolvedType::Row(name) => name.clone(),
        }
    }

    /// Whether the representation is passed by reference in argument
    /// position. Non-trivial copy cost (text, byte sequences, nested rows)
    /// means by-reference; scalars go by value.
    pub fn by_ref(&self) -> bool {
        matches!(
            self,
            ResolvedType::Text
                | ResolvedType::CText
                | ResolvedType::Bytes
                | ResolvedType::Credential
                | ResolvedType::Row(_)
        )
    }

    /// The Rust type of a constructor or setter argument for this field.
    pub fn arg_type(&self) -> String {
        match self {
            ResolvedType::Text => "&str".into(),
            ResolvedType::CText => "&std::ffi::CStr".into(),
            ResolvedType::Bytes => "&[u8]".into(),
            // Password arguments carry the raw bytes; wrapping happens at
            // the assignment boundary inside the runtime.
            ResolvedType::Credential => "&[u8]".into(),
            ResolvedType::Row(name) => format!("&{name}"),
            other => other.rust_type(),
        }
    }
}

/// The generated row-value struct name for a table.
pub fn row_struct_name(table: &str) -> String {
    format!("{}Row", table.to_pascal_case())
}

/// The generated query-object struct name for a table.
pub fn query_struct_name(table: &str) -> String {
    format!("{}Query", table.to_pascal_case())
}

/// Resolve one column's target representation.
pub fn resolve(column: &Column, mode: BindingMode, width: NativeWidth) -> ResolvedType {
    match column.ty() {
        SchemaType::Int => match column.minsize() {
            Some(bits) if bits < 64 && bits <= width.bits() => match width {
                NativeWidth::W32 => ResolvedType::I32,
                NativeWidth::W64 => ResolvedType::I64,
            },
            _ => ResolvedType::I64,
        },
        SchemaType::UInt => match column.minsize() {
            Some(bits) if bits < 64 && bits <= width.bits() => match width {
                NativeWidth::W32 => ResolvedType::U32,
                NativeWidth::W64 => ResolvedType::U64,
            },
            _ => ResolvedType::U64,
        },
        SchemaType::Double => {
            if column.minsize().is_some_and(|bytes| bytes <= 4) {
                ResolvedType::F32
            } else {
                ResolvedType::F64
            }
        }
        SchemaType::Bool => ResolvedType::Bool,
        SchemaType::Char | SchemaType::Text => match mode {
            BindingMode::Chrono => ResolvedType::Text,
            BindingMode::Std => ResolvedType::CText,
        },
        SchemaType::Byte | SchemaType::Blob => ResolvedType::Bytes,
        SchemaType::Password => ResolvedType::Credential,
        SchemaType::Date => match mode {
            BindingMode::Chrono => ResolvedType::NaiveDate,
            BindingMode::Std => ResolvedType::SystemTime,
        },
        SchemaType::Time => match mode {
            BindingMode::Chrono => ResolvedType::NaiveTime,
            BindingMode::Std => ResolvedType::SystemTime,
        },
        SchemaType::DateTime => match mode {
            BindingMode::Chrono => ResolvedType::NaiveDateTime,
            BindingMode::Std => ResolvedType::SystemTime,
        },
        SchemaType::ForeignKey { table, .. } => ResolvedType::Row(row_struct_name(table)),
    }
}
