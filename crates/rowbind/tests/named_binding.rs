//! Named query binding from maps, records and batches.

#![cfg(feature = "derive")]

use rowbind::{
    BindStyle, Mapper, MapperConfig, Record, Value, bind_named, compile, expand_in, named, rebind,
};
use std::collections::HashMap;

#[derive(Debug, Default, Record)]
struct Person {
    #[record(rename = "first_name")]
    first: String,
    #[record(rename = "last_name")]
    last: String,
    email: String,
    added_at: Option<i64>,
}

fn person(first: &str, last: &str, email: &str) -> Person {
    Person {
        first: first.into(),
        last: last.into(),
        email: email.into(),
        added_at: None,
    }
}

fn mapper() -> Mapper {
    Mapper::new(MapperConfig::lowercase())
}

const INSERT: &str = "INSERT INTO person (first_name, last_name, email) \
                      VALUES (:first_name, :last_name, :email)";

#[test]
fn record_binds_for_every_style() {
    let p = person("Jane", "Citizen", "jane.citzen@example.com");
    let expected = vec![
        Value::Text("Jane".into()),
        Value::Text("Citizen".into()),
        Value::Text("jane.citzen@example.com".into()),
    ];

    for (style, placeholder) in [
        (BindStyle::Question, "?"),
        (BindStyle::Dollar, "$1"),
        (BindStyle::Named, ":first_name"),
        (BindStyle::At, "@p1"),
    ] {
        let (sql, args) = bind_named(style, INSERT, &p, &mapper()).unwrap();
        assert!(sql.contains(&format!("VALUES ({placeholder}")), "{style:?}: {sql}");
        assert_eq!(args, expected);
    }
}

#[test]
fn map_source_with_repeated_names() {
    let args = HashMap::from([("id", Value::Int(3)), ("name", Value::Text("x".into()))]);
    let (sql, values) = bind_named(
        BindStyle::Dollar,
        "SELECT * FROM t WHERE id = :id OR parent = :id AND name = :name",
        &args,
        &mapper(),
    )
    .unwrap();
    assert_eq!(sql, "SELECT * FROM t WHERE id = $1 OR parent = $2 AND name = $3");
    assert_eq!(
        values,
        vec![Value::Int(3), Value::Int(3), Value::Text("x".into())]
    );
}

#[test]
fn missing_names_are_reported_with_their_source() {
    let p = person("a", "b", "c");
    let err = named("SELECT :first_name, :middle_name", &p).unwrap_err();
    assert!(err.is_unresolved());
    assert!(err.to_string().contains("middle_name"), "{err}");

    let map = HashMap::from([("a", 1i64)]);
    let err = named("SELECT :a, :b", &map).unwrap_err();
    assert!(err.to_string().contains("could not find name b"), "{err}");
}

#[test]
fn bulk_insert_repeats_values_group() {
    let people = vec![
        person("Ardie", "Savea", "asavea@ab.co.nz"),
        person("Sonny Bill", "Williams", "sbw@ab.co.nz"),
        person("Ngani", "Laumape", "nlaumape@ab.co.nz"),
    ];
    let (sql, args) = bind_named(BindStyle::Dollar, INSERT, &people, &mapper()).unwrap();
    assert_eq!(
        sql,
        "INSERT INTO person (first_name, last_name, email) \
         VALUES ($1, $2, $3),($4, $5, $6),($7, $8, $9)"
    );
    assert_eq!(args.len(), 9);
    assert_eq!(args[3], Value::Text("Sonny Bill".into()));
}

#[test]
fn bulk_insert_keeps_trailing_clauses() {
    let people = [person("a", "b", "c"), person("d", "e", "f")];
    let (sql, args) = bind_named(
        BindStyle::Question,
        "INSERT INTO person (first_name, last_name, email) VALUES \
         (:first_name, :last_name, :email) ON CONFLICT DO NOTHING",
        &people,
        &mapper(),
    )
    .unwrap();
    assert!(sql.ends_with("(?, ?, ?),(?, ?, ?) ON CONFLICT DO NOTHING"), "{sql}");
    assert_eq!(args.len(), 6);
}

#[test]
fn empty_batch_is_an_argument_mismatch() {
    let none: Vec<Person> = Vec::new();
    let err = bind_named(BindStyle::Dollar, INSERT, &none, &mapper()).unwrap_err();
    assert!(err.is_argument_mismatch());
}

#[test]
fn unset_optionals_bind_as_null() {
    let p = person("a", "b", "c");
    let (_, args) = named("UPDATE person SET added_at = :added_at", &p).unwrap();
    assert_eq!(args, vec![Value::Null]);
}

#[test]
fn compile_then_expand_then_rebind() {
    // named templates and IN expansion compose through the `?` style
    let q = compile(
        "SELECT * FROM person WHERE email IN (?) AND last_name = :last",
        BindStyle::Question,
    );
    // a bare `?` is not a named parameter
    let q = q.unwrap();
    assert_eq!(q.names(), ["last"]);

    let emails = vec!["a@x", "b@x"];
    let (sql, args) = expand_in(
        "SELECT * FROM person WHERE email IN (?) AND last_name = ?",
        &[&emails, &"Savea"],
    )
    .unwrap();
    assert_eq!(
        rebind(BindStyle::Dollar, &sql),
        "SELECT * FROM person WHERE email IN ($1, $2) AND last_name = $3"
    );
    assert_eq!(args.len(), 3);
}

#[test]
fn json_object_source() {
    let obj = serde_json::json!({"id": 1, "tags": ["a"], "name": "n"});
    let serde_json::Value::Object(map) = obj else {
        unreachable!()
    };
    let (sql, args) = bind_named(
        BindStyle::At,
        "SELECT :name, :id, :tags",
        &map,
        &mapper(),
    )
    .unwrap();
    assert_eq!(sql, "SELECT @p1, @p2, @p3");
    assert_eq!(args[0], Value::Text("n".into()));
    assert_eq!(args[1], Value::Int(1));
    assert_eq!(args[2], Value::Json(serde_json::json!(["a"])));
}
