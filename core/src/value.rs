//! Generic value container used at the storage boundary
//!
//! Every column value crosses the driver boundary as a [`Value`]. All
//! type-resolution and conversion logic dispatches on this sum type; nothing
//! in the runtime inspects driver-specific representations.

/// Calendar date components
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

/// Wall-clock time components
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Combined calendar date and wall-clock time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

/// The dynamically-typed holder for any column value.
///
/// Holds exactly one of the storage kinds. Coercion accessors follow the
/// permissive semantics of a classic variant type: a mismatched kind yields
/// the target kind's zero value rather than an error.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Bytes(Vec<u8>),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce to a signed 64-bit integer.
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::UInt(v) => *v as i64,
            Value::Float(v) => *v as i64,
            Value::Bool(v) => *v as i64,
            Value::Text(s) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Coerce to an unsigned 64-bit integer.
    pub fn as_uint(&self) -> u64 {
        match self {
            Value::Int(v) => *v as u64,
            Value::UInt(v) => *v,
            Value::Float(v) => *v as u64,
            Value::Bool(v) => *v as u64,
            Value::Text(s) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Coerce to a double-precision float.
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::UInt(v) => *v as f64,
            Value::Float(v) => *v,
            Value::Bool(v) => *v as u8 as f64,
            Value::Text(s) => s.parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::UInt(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Text(s) => s == "true" || s == "1",
            _ => false,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Date(d) => format!("{:04}-{:02}-{:02}", d.year, d.month, d.day),
            Value::Time(t) => format!("{:02}:{:02}:{:02}", t.hour, t.minute, t.second),
            Value::DateTime(dt) => format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                dt.date.year, dt.date.month, dt.date.day, dt.time.hour, dt.time.minute, dt.time.second
            ),
            Value::Null => String::new(),
        }
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Value::Bytes(b) => b.clone(),
            Value::Text(s) => s.clone().into_bytes(),
            _ => Vec::new(),
        }
    }

    /// Re-encode into the canonical literal form used for column defaults.
    ///
    /// Temporal kinds keep their calendar/clock components, numeric kinds keep
    /// signedness and 64-bit width, null stays null, and everything else
    /// collapses to a text literal of its string form.
    pub fn canonical(&self) -> Value {
        match self {
            Value::Null
            | Value::Int(_)
            | Value::UInt(_)
            | Value::Float(_)
            | Value::Date(_)
            | Value::Time(_)
            | Value::DateTime(_) => self.clone(),
            other => Value::Text(other.as_text()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
