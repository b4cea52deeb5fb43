//! Shared test fixtures: an in-memory recording backend, a reference codec,
//! and sample database models.
#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rowforge::{
    Backend, Column, Constraints, CoreError, Database, DeleteSpec, Filter, JoinSpec, Result,
    RowAccess, RowIter, SortDir, Table, Value, ValueCodec,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct SelectCall {
    pub table: String,
    pub filter_terms: usize,
    pub join_aliases: Vec<String>,
    pub limit: Option<u32>,
    pub sort: SortDir,
}

/// Recording storage collaborator. Select returns the canned rows; every
/// operation is logged; `set_fail` makes all operations return an error.
#[derive(Default)]
pub struct MockBackend {
    pub rows: Mutex<Vec<HashMap<String, Value>>>,
    pub selects: Mutex<Vec<SelectCall>>,
    pub inserts: Mutex<Vec<(String, Vec<String>, Vec<Vec<Value>>)>>,
    pub updates: Mutex<Vec<(String, String, Value, Value)>>,
    pub deletes: Mutex<Vec<(String, DeleteSpec)>>,
    fail: Mutex<bool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<HashMap<String, Value>>) -> Self {
        let backend = Self::default();
        *backend.rows.lock().unwrap() = rows;
        backend
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check(&self) -> Result<()> {
        if *self.fail.lock().unwrap() {
            Err(CoreError::Backend("forced failure".into()))
        } else {
            Ok(())
        }
    }

    /// Total number of storage operations that reached this backend.
    pub fn storage_calls(&self) -> usize {
        self.selects.lock().unwrap().len()
            + self.inserts.lock().unwrap().len()
            + self.updates.lock().unwrap().len()
            + self.deletes.lock().unwrap().len()
    }
}

impl Backend for MockBackend {
    fn select<'a>(
        &'a self,
        table: &Table,
        filter: &Filter,
        joins: &[JoinSpec],
        limit: Option<u32>,
        sort: SortDir,
    ) -> Result<RowIter<'a>> {
        self.check()?;
        self.selects.lock().unwrap().push(SelectCall {
            table: table.name().to_string(),
            filter_terms: filter.terms().len(),
            join_aliases: joins.iter().map(|j| j.alias_prefix.clone()).collect(),
            limit,
            sort,
        });
        let rows = self.rows.lock().unwrap().clone();
        Ok(Box::new(
            rows.into_iter().map(|row| Box::new(row) as Box<dyn RowAccess>),
        ))
    }

    fn insert(&self, table: &Table, columns: &[Column], rows: Vec<Vec<Value>>) -> Result<()> {
        self.check()?;
        self.inserts.lock().unwrap().push((
            table.name().to_string(),
            columns.iter().map(|c| c.name().to_string()).collect(),
            rows,
        ));
        Ok(())
    }

    fn update(&self, table: &Table, column: &Column, value: Value, key: Value) -> Result<()> {
        self.check()?;
        self.updates.lock().unwrap().push((
            table.name().to_string(),
            column.name().to_string(),
            value,
            key,
        ));
        Ok(())
    }

    fn delete(&self, table: &Table, spec: DeleteSpec) -> Result<()> {
        self.check()?;
        self.deletes
            .lock()
            .unwrap()
            .push((table.name().to_string(), spec));
        Ok(())
    }
}

/// Reference codec: calendar kinds travel as [`Value::Date`]/[`Value::Time`]/
/// [`Value::DateTime`]; time points travel as seconds since the Unix epoch.
pub struct FixtureCodec;

impl ValueCodec for FixtureCodec {
    fn to_naive_date(&self, value: &Value) -> NaiveDate {
        match value {
            Value::Date(d) => NaiveDate::from_ymd_opt(d.year, d.month.into(), d.day.into())
                .unwrap_or_default(),
            _ => NaiveDate::default(),
        }
    }

    fn to_naive_time(&self, value: &Value) -> NaiveTime {
        match value {
            Value::Time(t) => NaiveTime::from_hms_opt(t.hour.into(), t.minute.into(), t.second.into())
                .unwrap_or_default(),
            _ => NaiveTime::default(),
        }
    }

    fn to_naive_datetime(&self, value: &Value) -> NaiveDateTime {
        match value {
            Value::DateTime(dt) => self
                .to_naive_date(&Value::Date(dt.date))
                .and_time(self.to_naive_time(&Value::Time(dt.time))),
            _ => NaiveDateTime::default(),
        }
    }

    fn from_naive_date(&self, date: NaiveDate) -> Value {
        Value::Date(rowforge::Date {
            year: date.year(),
            month: date.month() as u8,
            day: date.day() as u8,
        })
    }

    fn from_naive_time(&self, time: NaiveTime) -> Value {
        Value::Time(rowforge::Time {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        })
    }

    fn from_naive_datetime(&self, datetime: NaiveDateTime) -> Value {
        Value::DateTime(rowforge::DateTime {
            date: match self.from_naive_date(datetime.date()) {
                Value::Date(d) => d,
                _ => unreachable!(),
            },
            time: match self.from_naive_time(datetime.time()) {
                Value::Time(t) => t,
                _ => unreachable!(),
            },
        })
    }

    fn to_std_date(&self, value: &Value) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(value.as_uint())
    }

    fn to_std_time(&self, value: &Value) -> SystemTime {
        self.to_std_date(value)
    }

    fn to_std_datetime(&self, value: &Value) -> SystemTime {
        self.to_std_date(value)
    }

    fn from_std_date(&self, date: SystemTime) -> Value {
        Value::Int(
            date.duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0),
        )
    }

    fn from_std_time(&self, time: SystemTime) -> Value {
        self.from_std_date(time)
    }

    fn from_std_datetime(&self, datetime: SystemTime) -> Value {
        self.from_std_date(datetime)
    }

    fn build_select(
        &self,
        table: &Table,
        filter: &Filter,
        joins: &[JoinSpec],
        limit: Option<u32>,
        sort: SortDir,
    ) -> String {
        format!(
            "select {} terms={} joins={} limit={limit:?} sort={sort:?}",
            table.name(),
            filter.terms().len(),
            joins.len()
        )
    }
}

fn pk_int(name: &str) -> Column {
    Column::parse(name, "int")
        .unwrap()
        .with_minsize(32)
        .with_constraints(Constraints::PRIMARY_KEY)
}

/// Sample model: a keyed table with a temporal column, a table with a
/// password column and a reference, a table with two references to the same
/// table, and a keyless table.
pub fn crm() -> Database {
    let company = Table::new("company")
        .with_column(pk_int("id"))
        .with_column(
            Column::parse("name", "text")
                .unwrap()
                .with_constraints(Constraints::NOT_NULL),
        )
        .with_column(Column::parse("founded", "date").unwrap());
    let person = Table::new("person")
        .with_column(pk_int("id"))
        .with_column(Column::parse("name", "text").unwrap())
        .with_column(Column::parse("passwd", "password").unwrap())
        .with_column(Column::parse("employer", "&company.id").unwrap());
    let ticket = Table::new("ticket")
        .with_column(pk_int("id"))
        .with_column(Column::parse("title", "text").unwrap())
        .with_column(Column::parse("reporter", "&person.id").unwrap())
        .with_column(Column::parse("assignee", "&person.id").unwrap());
    let log = Table::new("log")
        .with_column(Column::parse("line", "text").unwrap())
        .with_column(Column::parse("at", "datetime").unwrap());
    Database::new("crm")
        .with_table(company)
        .unwrap()
        .with_table(person)
        .unwrap()
        .with_table(ticket)
        .unwrap()
        .with_table(log)
        .unwrap()
}

pub fn row(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
