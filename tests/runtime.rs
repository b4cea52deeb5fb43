//! End-to-end behavior of the runtime machinery against a recording backend.

mod common;

use chrono::NaiveDate;
use common::{FixtureCodec, MockBackend, crm, row};
use rowforge::{
    BindingMode, Column, Constraints, CoreError, DeleteSpec, FieldValue, FilterExpr, KeyAllocator,
    RowData, SortDir, Table, TableQuery, TableRegistry, Temporal, Value,
};

fn query<'a>(
    backend: &'a MockBackend,
    codec: &'a FixtureCodec,
    registry: &'a TableRegistry,
    allocator: Option<&'a KeyAllocator>,
    table: &str,
) -> TableQuery<'a> {
    TableQuery::new(
        backend,
        codec,
        registry,
        registry.get(table).unwrap(),
        allocator,
        BindingMode::Chrono,
    )
}

fn company_literal(registry: &TableRegistry, codec: &FixtureCodec, id: i64, name: &str) -> RowData {
    RowData::literal(
        registry.get("company").unwrap(),
        BindingMode::Chrono,
        codec,
        vec![
            FieldValue::Plain(Value::Int(id)),
            FieldValue::Plain(Value::Text(name.into())),
            FieldValue::Temporal(Temporal::Date(
                NaiveDate::from_ymd_opt(2024, 5, 17).unwrap(),
            )),
        ],
    )
    .unwrap()
}

#[test]
fn allocator_seeds_past_largest_stored_key() {
    // Stored keys {2, 7, 4}: the descending limit-1 read surfaces 7.
    let backend = MockBackend::with_rows(vec![row(&[("id", Value::Int(7))])]);
    let registry = TableRegistry::from_database(&crm());
    let allocator = KeyAllocator::new();
    allocator
        .seed(&backend, &registry.get("company").unwrap())
        .unwrap();

    let selects = backend.selects.lock().unwrap();
    assert_eq!(selects.len(), 1);
    assert_eq!(selects[0].limit, Some(1));
    assert_eq!(selects[0].sort, SortDir::Descending);
    drop(selects);

    assert_eq!(allocator.next(), 8);
    assert_eq!(allocator.next(), 9);
}

#[test]
fn seed_failure_is_non_fatal() {
    let backend = MockBackend::new();
    backend.set_fail(true);
    let registry = TableRegistry::from_database(&crm());
    let allocator = KeyAllocator::new();
    assert!(allocator
        .seed(&backend, &registry.get("company").unwrap())
        .is_ok());
    assert_eq!(allocator.next(), 0);
}

#[test]
fn batch_insert_allocates_keys_in_input_order() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let allocator = KeyAllocator::new();
    allocator.mark_used(4);

    let table = registry.get("company").unwrap();
    let mut rows: Vec<RowData> = ["a", "b", "c"]
        .iter()
        .map(|name| {
            RowData::for_insert(
                table.clone(),
                BindingMode::Chrono,
                &codec,
                vec![
                    FieldValue::Plain(Value::Text((*name).into())),
                    FieldValue::Temporal(Temporal::Date(
                        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    )),
                ],
            )
            .unwrap()
        })
        .collect();

    let q = query(&backend, &codec, &registry, Some(&allocator), "company");
    q.insert_many(&mut rows).unwrap();

    let inserts = backend.inserts.lock().unwrap();
    assert_eq!(inserts.len(), 1);
    let (table_name, columns, tuples) = &inserts[0];
    assert_eq!(table_name, "company");
    // Tuple layout: non-key columns in declaration order, key last.
    assert_eq!(columns, &["name", "founded", "id"]);
    let keys: Vec<Value> = tuples.iter().map(|t| t.last().unwrap().clone()).collect();
    assert_eq!(keys, [Value::Int(5), Value::Int(6), Value::Int(7)]);
    drop(inserts);

    // Insertion attaches rows to the table as a side effect.
    assert!(rows.iter().all(RowData::is_attached));
}

#[test]
fn failed_insert_leaves_rows_detached() {
    let backend = MockBackend::new();
    backend.set_fail(true);
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let allocator = KeyAllocator::new();
    let mut row = company_literal(&registry, &codec, 1, "a");

    let q = query(&backend, &codec, &registry, Some(&allocator), "company");
    assert!(q.insert(&mut row).is_err());
    assert!(!row.is_attached());

    // A row whose insert never landed still refuses point updates.
    backend.set_fail(false);
    assert!(matches!(
        row.set_field(&backend, &codec, "name", Value::Text("b".into())),
        Err(CoreError::Detached)
    ));
    assert!(backend.updates.lock().unwrap().is_empty());
}

#[test]
fn keyed_insert_without_allocator_is_an_error() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let mut row = company_literal(&registry, &codec, 1, "a");
    let q = query(&backend, &codec, &registry, None, "company");
    assert!(matches!(q.insert(&mut row), Err(CoreError::Backend(_))));
}

#[test]
fn detached_setter_fails_before_any_storage_call() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let mut row = company_literal(&registry, &codec, 1, "a");
    assert!(!row.is_attached());
    let err = row
        .set_field(&backend, &codec, "name", Value::Text("b".into()))
        .unwrap_err();
    assert!(matches!(err, CoreError::Detached));
    assert_eq!(backend.storage_calls(), 0);
}

#[test]
fn attached_setter_writes_through_and_updates_memory() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let raw = row(&[
        ("id", Value::Int(1)),
        ("name", Value::Text("a".into())),
        (
            "founded",
            Value::Date(rowforge::Date { year: 2020, month: 1, day: 1 }),
        ),
    ]);
    let mut entry = RowData::hydrate(
        registry.get("company").unwrap(),
        &registry,
        BindingMode::Chrono,
        &codec,
        &raw,
        "",
    )
    .unwrap();

    entry
        .set_field(&backend, &codec, "name", Value::Text("b".into()))
        .unwrap();

    let updates = backend.updates.lock().unwrap();
    assert_eq!(
        updates[0],
        (
            "company".to_string(),
            "name".to_string(),
            Value::Text("b".into()),
            Value::Int(1)
        )
    );
    drop(updates);
    assert_eq!(
        entry.get("name"),
        Some(&FieldValue::Plain(Value::Text("b".into())))
    );
}

#[test]
fn failed_setter_leaves_memory_unchanged() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let raw = row(&[("id", Value::Int(1)), ("name", Value::Text("a".into()))]);
    let mut entry = RowData::hydrate(
        registry.get("company").unwrap(),
        &registry,
        BindingMode::Chrono,
        &codec,
        &raw,
        "",
    )
    .unwrap();

    backend.set_fail(true);
    assert!(entry
        .set_field(&backend, &codec, "name", Value::Text("b".into()))
        .is_err());
    assert_eq!(
        entry.get("name"),
        Some(&FieldValue::Plain(Value::Text("a".into())))
    );
}

#[test]
fn primary_key_cannot_be_set() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let mut row = company_literal(&registry, &codec, 1, "a");
    let err = row
        .set_field(&backend, &codec, "id", Value::Int(9))
        .unwrap_err();
    assert!(matches!(err, CoreError::PrimaryKeyImmutable(_)));
}

#[test]
fn keyless_removal_fails_without_any_storage_call() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let entry = RowData::literal(
        registry.get("log").unwrap(),
        BindingMode::Chrono,
        &codec,
        vec![
            FieldValue::Plain(Value::Text("boom".into())),
            FieldValue::Plain(Value::DateTime(rowforge::DateTime {
                date: rowforge::Date { year: 2024, month: 1, day: 1 },
                time: rowforge::Time { hour: 0, minute: 0, second: 0 },
            })),
        ],
    )
    .unwrap();

    let q = query(&backend, &codec, &registry, None, "log");
    assert!(matches!(q.remove(&entry), Err(CoreError::KeylessTable(_))));
    assert!(matches!(
        q.remove_many(std::slice::from_ref(&entry)),
        Err(CoreError::KeylessTable(_))
    ));
    assert_eq!(backend.storage_calls(), 0);
}

#[test]
fn keyless_filter_removal_fails_without_any_storage_call() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let q = query(&backend, &codec, &registry, None, "log")
        .filter([FilterExpr::eq("line", "boom")]);
    assert!(matches!(q.remove_matching(), Err(CoreError::KeylessTable(_))));
    assert_eq!(backend.storage_calls(), 0);
}

#[test]
fn filter_removal_deletes_matching_rows_on_keyed_tables() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let q = query(&backend, &codec, &registry, None, "company")
        .filter([FilterExpr::eq("name", "acme")]);
    q.remove_matching().unwrap();

    let deletes = backend.deletes.lock().unwrap();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].0, "company");
    match &deletes[0].1 {
        DeleteSpec::Matching(filter) => assert_eq!(filter.terms().len(), 1),
        other => panic!("expected filter delete, got {other:?}"),
    }
}

#[test]
fn batch_removal_deletes_by_key_set() {
    let backend = MockBackend::new();
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let rows = [
        company_literal(&registry, &codec, 3, "a"),
        company_literal(&registry, &codec, 9, "b"),
    ];
    let q = query(&backend, &codec, &registry, None, "company");
    q.remove_many(&rows).unwrap();

    let deletes = backend.deletes.lock().unwrap();
    match &deletes[0].1 {
        DeleteSpec::Keys(keys) => assert_eq!(keys, &[Value::Int(3), Value::Int(9)]),
        other => panic!("expected key-batch delete, got {other:?}"),
    }
}

#[test]
fn failed_read_yields_an_empty_result() {
    let backend = MockBackend::new();
    backend.set_fail(true);
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let q = query(&backend, &codec, &registry, None, "company");
    assert!(q.fetch().is_empty());
}

#[test]
fn two_references_to_one_table_hydrate_under_distinct_aliases() {
    let raw = row(&[
        ("id", Value::Int(1)),
        ("title", Value::Text("outage".into())),
        ("fkey_reporter_id", Value::Int(10)),
        ("fkey_reporter_name", Value::Text("alice".into())),
        ("fkey_reporter_fkey_employer_id", Value::Int(100)),
        ("fkey_reporter_fkey_employer_name", Value::Text("acme".into())),
        ("fkey_assignee_id", Value::Int(11)),
        ("fkey_assignee_name", Value::Text("bob".into())),
        ("fkey_assignee_fkey_employer_id", Value::Int(200)),
    ]);
    let backend = MockBackend::with_rows(vec![raw]);
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let q = query(&backend, &codec, &registry, None, "ticket");
    let rows = q.fetch();
    assert_eq!(rows.len(), 1);

    let selects = backend.selects.lock().unwrap();
    assert_eq!(
        selects[0].join_aliases,
        ["fkey_reporter_", "fkey_assignee_"]
    );
    drop(selects);

    let reporter = match rows[0].get("reporter").unwrap() {
        FieldValue::Nested(row) => row,
        other => panic!("expected nested row, got {other:?}"),
    };
    assert_eq!(reporter.scalar_value("id", &codec).unwrap(), Value::Int(10));
    assert_eq!(
        reporter.scalar_value("name", &codec).unwrap(),
        Value::Text("alice".into())
    );
    let employer = match reporter.get("employer").unwrap() {
        FieldValue::Nested(row) => row,
        other => panic!("expected nested row, got {other:?}"),
    };
    assert_eq!(employer.scalar_value("id", &codec).unwrap(), Value::Int(100));

    let assignee = match rows[0].get("assignee").unwrap() {
        FieldValue::Nested(row) => row,
        other => panic!("expected nested row, got {other:?}"),
    };
    assert_eq!(assignee.scalar_value("id", &codec).unwrap(), Value::Int(11));
}

#[test]
fn literal_row_serializes_in_storage_order_without_key() {
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let row = company_literal(&registry, &codec, 42, "abc");
    assert_eq!(row.key_value(&codec).unwrap(), Value::Int(42));
    assert_eq!(
        row.to_values(&codec).unwrap(),
        [
            Value::Text("abc".into()),
            Value::Date(rowforge::Date { year: 2024, month: 5, day: 17 }),
        ]
    );
}

#[test]
fn password_fields_never_serialize_raw_bytes() {
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let employer = company_literal(&registry, &codec, 7, "acme");
    let person = RowData::literal(
        registry.get("person").unwrap(),
        BindingMode::Chrono,
        &codec,
        vec![
            FieldValue::Plain(Value::Int(1)),
            FieldValue::Plain(Value::Text("alice".into())),
            FieldValue::Plain(Value::Bytes(b"hunter2".to_vec())),
            FieldValue::Nested(Box::new(employer)),
        ],
    )
    .unwrap();

    match person.get("passwd").unwrap() {
        FieldValue::Credential(cred) => {
            assert_ne!(cred.digest(), b"hunter2");
            assert!(cred.matches(b"hunter2"));
        }
        other => panic!("expected credential, got {other:?}"),
    }

    let values = person.to_values(&codec).unwrap();
    assert!(!values.contains(&Value::Bytes(b"hunter2".to_vec())));
    // The reference column collapses to its linked field's value.
    assert_eq!(values[2], Value::Int(7));
}

#[test]
fn serialize_then_hydrate_round_trips_scalars() {
    let gadget = Table::new("gadget")
        .with_column(
            Column::parse("id", "int")
                .unwrap()
                .with_minsize(32)
                .with_constraints(Constraints::PRIMARY_KEY),
        )
        .with_column(Column::parse("name", "text").unwrap())
        .with_column(Column::parse("active", "bool").unwrap());
    let registry = TableRegistry::from_database(
        &rowforge::Database::new("shop").with_table(gadget).unwrap(),
    );
    let codec = FixtureCodec;
    let table = registry.get("gadget").unwrap();

    let original = RowData::literal(
        table.clone(),
        BindingMode::Chrono,
        &codec,
        vec![
            FieldValue::Plain(Value::Int(42)),
            FieldValue::Plain(Value::Text("abc".into())),
            FieldValue::Plain(Value::Bool(true)),
        ],
    )
    .unwrap();

    let values = original.to_values(&codec).unwrap();
    let raw = row(&[
        ("id", original.key_value(&codec).unwrap()),
        ("name", values[0].clone()),
        ("active", values[1].clone()),
    ]);
    let back = RowData::hydrate(table, &registry, BindingMode::Chrono, &codec, &raw, "").unwrap();

    for column in ["id", "name", "active"] {
        assert_eq!(back.get(column), original.get(column), "column {column}");
    }
}

#[test]
fn std_binding_truncates_text_at_the_first_nul() {
    let codec = FixtureCodec;
    let registry = TableRegistry::from_database(&crm());
    let raw = row(&[
        ("id", Value::Int(1)),
        ("name", Value::Bytes(b"abc\0def".to_vec())),
        ("founded", Value::Int(0)),
    ]);
    let entry = RowData::hydrate(
        registry.get("company").unwrap(),
        &registry,
        BindingMode::Std,
        &codec,
        &raw,
        "",
    )
    .unwrap();
    assert_eq!(
        entry.get("name"),
        Some(&FieldValue::Plain(Value::Bytes(b"abc".to_vec())))
    );
    assert_eq!(
        entry.get("founded"),
        Some(&FieldValue::Temporal(Temporal::Stamp(
            std::time::UNIX_EPOCH
        )))
    );
}
