//! Driver conversion contract
//!
//! The runtime never encodes date/time arithmetic. Temporal column values
//! cross between their bound representation and the generic [`Value`]
//! container exclusively through a [`ValueCodec`], so calendar semantics are
//! entirely the driver's responsibility. The codec also renders opaque
//! driver-specific read-query text.

use crate::backend::JoinSpec;
use crate::filter::{Filter, SortDir};
use crate::schema::Table;
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::time::SystemTime;

/// Symmetric conversion pairs between bound temporal representations and the
/// generic value container, per binding mode, plus driver query rendering.
///
/// Conversions are infallible by contract; a driver maps unrepresentable
/// inputs to its documented sentinel (the Unix epoch for time points,
/// 1970-01-01 / midnight for calendar kinds).
pub trait ValueCodec {
    // Chrono binding mode
    fn to_naive_date(&self, value: &Value) -> NaiveDate;
    fn to_naive_time(&self, value: &Value) -> NaiveTime;
    fn to_naive_datetime(&self, value: &Value) -> NaiveDateTime;
    fn from_naive_date(&self, date: NaiveDate) -> Value;
    fn from_naive_time(&self, time: NaiveTime) -> Value;
    fn from_naive_datetime(&self, datetime: NaiveDateTime) -> Value;

    // Std binding mode: all three temporal kinds bind to SystemTime
    fn to_std_date(&self, value: &Value) -> SystemTime;
    fn to_std_time(&self, value: &Value) -> SystemTime;
    fn to_std_datetime(&self, value: &Value) -> SystemTime;
    fn from_std_date(&self, date: SystemTime) -> Value;
    fn from_std_time(&self, time: SystemTime) -> Value;
    fn from_std_datetime(&self, datetime: SystemTime) -> Value;

    /// Render driver-specific query text for a read. Opaque to the runtime;
    /// only the backend interprets it.
    fn build_select(
        &self,
        table: &Table,
        filter: &Filter,
        joins: &[JoinSpec],
        limit: Option<u32>,
        sort: SortDir,
    ) -> String;
}
