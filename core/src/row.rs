//! Row-value runtime machinery
//!
//! [`RowData`] is the dynamic core every generated row-value type wraps: an
//! ordered sequence of field values matching the table's storage column
//! order, plus the attachment state that separates literal rows from rows
//! hydrated out of (or inserted into) a storage context.

use crate::backend::{Backend, RowAccess};
use crate::codec::ValueCodec;
use crate::credential::Credential;
use crate::error::{CoreError, Result};
use crate::schema::{BindingMode, Column, SchemaType, Table, TableRegistry};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::SystemTime;

/// A temporal field in its bound representation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Temporal {
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// All three temporal kinds in `Std` binding mode
    Stamp(SystemTime),
}

/// One column slot of a row-value
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Plain(Value),
    Credential(Credential),
    /// Foreign-key column: the referenced table's row-value
    Nested(Box<RowData>),
    Temporal(Temporal),
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Plain(v)
    }
}

impl From<RowData> for FieldValue {
    fn from(row: RowData) -> Self {
        FieldValue::Nested(Box::new(row))
    }
}

/// One record's column values for a table
#[derive(Clone, Debug, PartialEq)]
pub struct RowData {
    table: Arc<Table>,
    mode: BindingMode,
    fields: Vec<FieldValue>,
    attached: bool,
}

impl RowData {
    /// Literal constructor: one value per column in declaration order, not
    /// yet associated with any storage context.
    pub fn literal(
        table: Arc<Table>,
        mode: BindingMode,
        codec: &dyn ValueCodec,
        args: Vec<FieldValue>,
    ) -> Result<RowData> {
        let columns = table.columns();
        if args.len() != columns.len() {
            return Err(CoreError::Arity {
                table: table.name().to_string(),
                expected: columns.len(),
                got: args.len(),
            });
        }
        let fields = columns
            .iter()
            .zip(args)
            .map(|(column, arg)| coerce_field(column, arg, codec, mode))
            .collect::<Result<Vec<_>>>()?;
        Ok(RowData {
            table,
            mode,
            fields,
            attached: false,
        })
    }

    /// Insert-construction constructor: like [`RowData::literal`] but the
    /// primary-key column is omitted from the arguments and left null until
    /// key allocation.
    pub fn for_insert(
        table: Arc<Table>,
        mode: BindingMode,
        codec: &dyn ValueCodec,
        args: Vec<FieldValue>,
    ) -> Result<RowData> {
        let expected = table.columns().iter().filter(|c| !c.is_primary_key()).count();
        if args.len() != expected {
            return Err(CoreError::Arity {
                table: table.name().to_string(),
                expected,
                got: args.len(),
            });
        }
        let mut args = args.into_iter();
        let fields = table
            .columns()
            .iter()
            .map(|column| {
                if column.is_primary_key() {
                    Ok(FieldValue::Plain(Value::Null))
                } else {
                    let arg = args.next().expect("arity checked above");
                    coerce_field(column, arg, codec, mode)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RowData {
            table,
            mode,
            fields,
            attached: false,
        })
    }

    /// Hydration constructor: decode one raw result row, potentially
    /// denormalized across joins, into a tree of row-values.
    ///
    /// Scalar columns read the generic value at `prefix + name`; password
    /// columns rewrap the stored bytes; temporal columns convert through the
    /// codec; foreign-key columns recurse into the referenced table under
    /// the join-alias prefix `prefix + "fkey_" + name + "_"`.
    pub fn hydrate(
        table: Arc<Table>,
        registry: &TableRegistry,
        mode: BindingMode,
        codec: &dyn ValueCodec,
        row: &dyn RowAccess,
        prefix: &str,
    ) -> Result<RowData> {
        let mut fields = Vec::with_capacity(table.columns().len());
        for column in table.columns() {
            let key = format!("{prefix}{}", column.name());
            let field = match column.ty() {
                SchemaType::Password => {
                    FieldValue::Credential(Credential::from_stored(row.value(&key).as_bytes()))
                }
                SchemaType::ForeignKey { table: referenced, .. } => {
                    let referenced = registry.get(referenced)?;
                    let nested_prefix = format!("{prefix}fkey_{}_", column.name());
                    let nested =
                        RowData::hydrate(referenced, registry, mode, codec, row, &nested_prefix)?;
                    FieldValue::Nested(Box::new(nested))
                }
                ty if ty.is_temporal() => {
                    FieldValue::Temporal(decode_temporal(ty, &row.value(&key), codec, mode))
                }
                _ => FieldValue::Plain(narrow(column, &row.value(&key), mode)),
            };
            fields.push(field);
        }
        Ok(RowData {
            table,
            mode,
            fields,
            attached: true,
        })
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn binding(&self) -> BindingMode {
        self.mode
    }

    /// Whether this row is associated with a storage context.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Associate the row with its owning table's storage context. Called by
    /// insertion as a side effect; literal rows start detached.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Read-only access to one column slot.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        let idx = self.table.columns().iter().position(|c| c.name() == column)?;
        Some(&self.fields[idx])
    }

    /// One column's value in generic-container form.
    pub fn scalar_value(&self, column: &str, codec: &dyn ValueCodec) -> Result<Value> {
        let idx = self
            .table
            .columns()
            .iter()
            .position(|c| c.name() == column)
            .ok_or_else(|| CoreError::UnknownColumn(column.to_string()))?;
        storage_value(&self.table.columns()[idx], &self.fields[idx], codec)
    }

    /// The row's current primary-key value.
    pub fn key_value(&self, codec: &dyn ValueCodec) -> Result<Value> {
        let pk = self
            .table
            .primary_key()
            .ok_or_else(|| CoreError::KeylessTable(self.table.name().to_string()))?;
        self.scalar_value(pk, codec)
    }

    /// Serialization: storage-ordered generic values excluding the primary
    /// key, with hydration conversions inverted (temporal fields back through
    /// the codec, foreign keys unwrapped to their linked field's value).
    pub fn to_values(&self, codec: &dyn ValueCodec) -> Result<Vec<Value>> {
        self.table
            .columns()
            .iter()
            .zip(&self.fields)
            .filter(|(column, _)| !column.is_primary_key())
            .map(|(column, field)| storage_value(column, field, codec))
            .collect()
    }

    /// Point update of one non-primary-key column, keyed by the row's
    /// current primary-key value.
    ///
    /// Fails without any storage call when the row is detached. On backend
    /// success the in-memory field is replaced by the coerced new value; the
    /// write and the in-memory update are not atomic with respect to
    /// concurrent readers of this row object.
    pub fn set_field(
        &mut self,
        backend: &dyn Backend,
        codec: &dyn ValueCodec,
        column: &str,
        value: impl Into<FieldValue>,
    ) -> Result<()> {
        if self.table.primary_key().is_none() {
            return Err(CoreError::KeylessTable(self.table.name().to_string()));
        }
        let idx = self
            .table
            .columns()
            .iter()
            .position(|c| c.name() == column)
            .ok_or_else(|| CoreError::UnknownColumn(column.to_string()))?;
        let meta = &self.table.columns()[idx];
        if meta.is_primary_key() {
            return Err(CoreError::PrimaryKeyImmutable(column.to_string()));
        }
        if !self.attached {
            return Err(CoreError::Detached);
        }
        let field = coerce_field(meta, value.into(), codec, self.mode)?;
        let new_value = storage_value(meta, &field, codec)?;
        let key = self.key_value(codec)?;
        backend.update(&self.table, meta, new_value, key)?;
        self.fields[idx] = field;
        Ok(())
    }
}

/// Coerce one constructor argument into its column's slot representation:
/// wrap passwords, convert temporal values through the codec, narrow
/// numerics, and type-check nested rows.
fn coerce_field(
    column: &Column,
    arg: FieldValue,
    codec: &dyn ValueCodec,
    mode: BindingMode,
) -> Result<FieldValue> {
    match column.ty() {
        SchemaType::Password => match arg {
            FieldValue::Credential(c) => Ok(FieldValue::Credential(c)),
            FieldValue::Plain(v) => Ok(FieldValue::Credential(Credential::from_raw(v.as_bytes()))),
            other => Err(CoreError::Hydration(format!(
                "password column '{}' given {other:?}",
                column.name()
            ))),
        },
        SchemaType::ForeignKey { table, .. } => match arg {
            FieldValue::Nested(row) if row.table().name() == table => Ok(FieldValue::Nested(row)),
            other => Err(CoreError::Hydration(format!(
                "foreign-key column '{}' expects a '{table}' row, got {other:?}",
                column.name()
            ))),
        },
        ty if ty.is_temporal() => match arg {
            FieldValue::Temporal(t) => Ok(FieldValue::Temporal(t)),
            FieldValue::Plain(v) => Ok(FieldValue::Temporal(decode_temporal(ty, &v, codec, mode))),
            other => Err(CoreError::Hydration(format!(
                "temporal column '{}' given {other:?}",
                column.name()
            ))),
        },
        _ => match arg {
            FieldValue::Plain(v) => Ok(FieldValue::Plain(narrow(column, &v, mode))),
            other => Err(CoreError::Hydration(format!(
                "scalar column '{}' given {other:?}",
                column.name()
            ))),
        },
    }
}

/// Decode a generic temporal value into its bound representation.
fn decode_temporal(
    ty: &SchemaType,
    value: &Value,
    codec: &dyn ValueCodec,
    mode: BindingMode,
) -> Temporal {
    match (ty, mode) {
        (SchemaType::Date, BindingMode::Chrono) => Temporal::Date(codec.to_naive_date(value)),
        (SchemaType::Time, BindingMode::Chrono) => Temporal::Time(codec.to_naive_time(value)),
        (SchemaType::DateTime, BindingMode::Chrono) => {
            Temporal::DateTime(codec.to_naive_datetime(value))
        }
        (SchemaType::Date, BindingMode::Std) => Temporal::Stamp(codec.to_std_date(value)),
        (SchemaType::Time, BindingMode::Std) => Temporal::Stamp(codec.to_std_time(value)),
        (SchemaType::DateTime, BindingMode::Std) => Temporal::Stamp(codec.to_std_datetime(value)),
        _ => unreachable!("decode_temporal called on non-temporal column"),
    }
}

/// Kind coercion and width narrowing for scalar columns.
///
/// Values stored under a declared bit-width below 64 are required to fit it,
/// so integer narrowing is representation-preserving; `double` columns sized
/// at four bytes or less narrow through single precision.
fn narrow(column: &Column, value: &Value, mode: BindingMode) -> Value {
    match column.ty() {
        SchemaType::Int => Value::Int(value.as_int()),
        SchemaType::UInt => Value::UInt(value.as_uint()),
        SchemaType::Double => {
            if column.minsize().is_some_and(|bytes| bytes <= 4) {
                Value::Float(value.as_float() as f32 as f64)
            } else {
                Value::Float(value.as_float())
            }
        }
        SchemaType::Bool => Value::Bool(value.as_bool()),
        SchemaType::Char | SchemaType::Text => match mode {
            BindingMode::Chrono => Value::Text(value.as_text()),
            // Standard binding materializes the null-terminated form.
            BindingMode::Std => {
                let mut bytes = value.as_bytes();
                if let Some(nul) = bytes.iter().position(|b| *b == 0) {
                    bytes.truncate(nul);
                }
                Value::Bytes(bytes)
            }
        },
        SchemaType::Byte | SchemaType::Blob => Value::Bytes(value.as_bytes()),
        _ => value.clone(),
    }
}

/// The generic-container value written to storage for one field, inverting
/// whatever conversion hydration applied.
fn storage_value(column: &Column, field: &FieldValue, codec: &dyn ValueCodec) -> Result<Value> {
    match field {
        FieldValue::Plain(v) => Ok(v.clone()),
        FieldValue::Credential(c) => Ok(Value::Bytes(c.digest().to_vec())),
        FieldValue::Temporal(t) => Ok(match t {
            Temporal::Date(d) => codec.from_naive_date(*d),
            Temporal::Time(t) => codec.from_naive_time(*t),
            Temporal::DateTime(dt) => codec.from_naive_datetime(*dt),
            Temporal::Stamp(s) => match column.ty() {
                SchemaType::Date => codec.from_std_date(*s),
                SchemaType::Time => codec.from_std_time(*s),
                _ => codec.from_std_datetime(*s),
            },
        }),
        FieldValue::Nested(row) => {
            let SchemaType::ForeignKey { field: linked, .. } = column.ty() else {
                return Err(CoreError::Hydration(format!(
                    "nested row in non-reference column '{}'",
                    column.name()
                )));
            };
            row.scalar_value(linked, codec)
        }
    }
}
