use super::*;
use crate::dialect::BindStyle;
use crate::mapper::Mapper;
use crate::record::{FieldDef, FieldMut, FieldRef, Record, RecordType};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Default)]
struct Place {
    city: String,
}

impl Record for Place {
    fn fields() -> Vec<FieldDef> {
        vec![FieldDef::scalar("city", "String")]
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<Self>()
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Scalar(&self.city)),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(FieldMut::Scalar(&mut self.city)),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Person {
    first: String,
    last_name: String,
    age: i64,
    place: Option<Box<Place>>,
}

impl Person {
    fn new(first: &str, last: &str, age: i64) -> Self {
        Self {
            first: first.into(),
            last_name: last.into(),
            age,
            place: None,
        }
    }
}

impl Record for Person {
    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::scalar("first", "String").tag("first_name"),
            FieldDef::scalar("last_name", "String"),
            FieldDef::scalar("age", "i64"),
            FieldDef::record("place", RecordType::of::<Place>(), true),
        ]
    }

    fn record_type(&self) -> RecordType {
        RecordType::of::<Self>()
    }

    fn field(&self, index: usize) -> Option<FieldRef<'_>> {
        match index {
            0 => Some(FieldRef::Scalar(&self.first)),
            1 => Some(FieldRef::Scalar(&self.last_name)),
            2 => Some(FieldRef::Scalar(&self.age)),
            3 => Some(match &self.place {
                Some(p) => FieldRef::Record(p.as_ref()),
                None => FieldRef::Nil,
            }),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>> {
        match index {
            0 => Some(FieldMut::Scalar(&mut self.first)),
            1 => Some(FieldMut::Scalar(&mut self.last_name)),
            2 => Some(FieldMut::Scalar(&mut self.age)),
            3 => Some(FieldMut::Record(
                self.place.get_or_insert_with(Default::default).as_mut(),
            )),
            _ => None,
        }
    }
}

impl NamedArgs for Person {
    fn named_source(&self) -> NamedSource<'_> {
        NamedSource::Record(self)
    }
}

fn lower() -> Mapper {
    Mapper::new(crate::mapper::MapperConfig::lowercase())
}

#[test]
fn compile_styles() {
    struct Case {
        query: &'static str,
        question: &'static str,
        dollar: &'static str,
        at: &'static str,
        named: &'static str,
        names: &'static [&'static str],
    }

    let cases = [
        Case {
            query: "INSERT INTO foo (a,b,c,d) VALUES (:name, :age, :first, :last)",
            question: "INSERT INTO foo (a,b,c,d) VALUES (?, ?, ?, ?)",
            dollar: "INSERT INTO foo (a,b,c,d) VALUES ($1, $2, $3, $4)",
            at: "INSERT INTO foo (a,b,c,d) VALUES (@p1, @p2, @p3, @p4)",
            named: "INSERT INTO foo (a,b,c,d) VALUES (:name, :age, :first, :last)",
            names: &["name", "age", "first", "last"],
        },
        Case {
            query: r#"SELECT "::foo" FROM a WHERE first_name=:name1 AND last_name=:name2"#,
            question: r#"SELECT ":foo" FROM a WHERE first_name=? AND last_name=?"#,
            dollar: r#"SELECT ":foo" FROM a WHERE first_name=$1 AND last_name=$2"#,
            at: r#"SELECT ":foo" FROM a WHERE first_name=@p1 AND last_name=@p2"#,
            named: r#"SELECT ":foo" FROM a WHERE first_name=:name1 AND last_name=:name2"#,
            names: &["name1", "name2"],
        },
        Case {
            query: "SELECT 'a::b::c' || first_name, '::::ABC::_::' FROM person WHERE first_name=:first_name AND last_name=:last_name",
            question: "SELECT 'a:b:c' || first_name, '::ABC:_:' FROM person WHERE first_name=? AND last_name=?",
            dollar: "SELECT 'a:b:c' || first_name, '::ABC:_:' FROM person WHERE first_name=$1 AND last_name=$2",
            at: "SELECT 'a:b:c' || first_name, '::ABC:_:' FROM person WHERE first_name=@p1 AND last_name=@p2",
            named: "SELECT 'a:b:c' || first_name, '::ABC:_:' FROM person WHERE first_name=:first_name AND last_name=:last_name",
            names: &["first_name", "last_name"],
        },
        Case {
            query: r#"SELECT @name := "name", :age, :first, :last"#,
            question: r#"SELECT @name := "name", ?, ?, ?"#,
            dollar: r#"SELECT @name := "name", $1, $2, $3"#,
            at: r#"SELECT @name := "name", @p1, @p2, @p3"#,
            named: r#"SELECT @name := "name", :age, :first, :last"#,
            names: &["age", "first", "last"],
        },
    ];

    for case in &cases {
        for (style, expected) in [
            (BindStyle::Question, case.question),
            (BindStyle::Unknown, case.question),
            (BindStyle::Dollar, case.dollar),
            (BindStyle::At, case.at),
            (BindStyle::Named, case.named),
        ] {
            let q = compile(case.query, style).unwrap();
            assert_eq!(q.query(), expected, "{style:?}");
            assert_eq!(q.names(), case.names, "{style:?}");
        }
    }
}

#[test]
fn escapes() {
    let q = compile("SELECT :x, :: , :=1", BindStyle::Question).unwrap();
    assert_eq!(q.query(), "SELECT ?, : , :=1");
    assert_eq!(q.names(), ["x"]);
}

#[test]
fn duplicate_names_keep_order() {
    let q = compile("UPDATE t SET a = :v WHERE b = :v OR c = :w", BindStyle::Dollar).unwrap();
    assert_eq!(q.query(), "UPDATE t SET a = $1 WHERE b = $2 OR c = $3");
    assert_eq!(q.names(), ["v", "v", "w"]);
}

#[test]
fn name_at_end_of_input() {
    let q = compile("SELECT * FROM t WHERE id = :id", BindStyle::Dollar).unwrap();
    assert_eq!(q.query(), "SELECT * FROM t WHERE id = $1");
    assert_eq!(q.names(), ["id"]);

    // only letters and digits are taken from the final byte
    let q = compile("SELECT :a_", BindStyle::Question).unwrap();
    assert_eq!(q.query(), "SELECT ?_");
    assert_eq!(q.names(), ["a"]);

    let q = compile("WHERE id IN (:id)", BindStyle::Question).unwrap();
    assert_eq!(q.query(), "WHERE id IN (?)");
}

#[test]
fn dotted_names() {
    let q = compile("SELECT :place.city, :a.b.c;", BindStyle::Question).unwrap();
    assert_eq!(q.query(), "SELECT ?, ?;");
    assert_eq!(q.names(), ["place.city", "a.b.c"]);
}

#[test]
fn non_ascii_text_passes_through() {
    let q = compile("SELECT 'héllo', :name→x", BindStyle::Question).unwrap();
    assert_eq!(q.query(), "SELECT 'héllo', ?→x");
    assert_eq!(q.names(), ["name"]);
}

#[test]
fn colon_inside_name_is_rejected() {
    let err = compile("SELECT :a:b", BindStyle::Question).unwrap_err();
    assert!(err.is_malformed_template());
    assert!(matches!(err, crate::BindError::MalformedTemplate { position: 9 }));
}

#[test]
fn bind_from_map() {
    let mut args: HashMap<&str, Value> = HashMap::new();
    args.insert("name", Value::Text("Jason".into()));
    args.insert("age", Value::Int(21));

    let (q, values) = bind_named(
        BindStyle::Dollar,
        "SELECT * FROM person WHERE name = :name AND age > :age OR nick = :name",
        &args,
        &lower(),
    )
    .unwrap();
    assert_eq!(q, "SELECT * FROM person WHERE name = $1 AND age > $2 OR nick = $3");
    assert_eq!(
        values,
        vec![
            Value::Text("Jason".into()),
            Value::Int(21),
            Value::Text("Jason".into())
        ]
    );
}

#[test]
fn missing_map_key_names_the_key() {
    let args: BTreeMap<String, i64> = BTreeMap::from([("a".to_string(), 1)]);
    let err = bind_named(BindStyle::Question, "SELECT :a, :b", &args, &lower()).unwrap_err();
    assert!(err.is_unresolved());
    assert!(err.to_string().starts_with("could not find name b in"));
    assert!(err.to_string().contains("\"a\""));
}

#[test]
fn bind_from_json_object() {
    let json = serde_json::json!({ "id": 7, "name": "x", "tags": ["a"] });
    let map = json.as_object().unwrap();
    let (q, values) = named("SELECT :id, :name, :tags", map).unwrap();
    assert_eq!(q, "SELECT ?, ?, ?");
    assert_eq!(values[0], Value::Int(7));
    assert_eq!(values[1], Value::Text("x".into()));
    assert_eq!(values[2], Value::Json(serde_json::json!(["a"])));
}

#[test]
fn bind_from_record() {
    let mut p = Person::new("Jason", "Moiron", 30);
    let (q, values) = bind_named(
        BindStyle::Named,
        "SELECT * FROM person WHERE first_name = :first_name AND age = :age",
        &p,
        &lower(),
    )
    .unwrap();
    assert_eq!(q, "SELECT * FROM person WHERE first_name = :first_name AND age = :age");
    assert_eq!(values, vec![Value::Text("Jason".into()), Value::Int(30)]);

    // unset optional sub-record reads as NULL
    let values = bind_args(&["place.city".to_string()], &p, &lower()).unwrap();
    assert_eq!(values, vec![Value::Null]);

    p.place = Some(Box::new(Place {
        city: "Auckland".into(),
    }));
    let values = bind_args(&["place.city".to_string()], &p, &lower()).unwrap();
    assert_eq!(values, vec![Value::Text("Auckland".into())]);
}

#[test]
fn unresolved_record_name() {
    let p = Person::new("Jason", "Moiron", 30);
    let err = named("SELECT :first", &p).unwrap_err();
    assert!(err.is_unresolved());
    let msg = err.to_string();
    assert!(msg.starts_with("could not find name first in"), "{msg}");
    assert!(msg.ends_with("Person"), "{msg}");
}

#[test]
fn sub_record_is_not_a_value() {
    let mut p = Person::new("a", "b", 1);
    let names = ["place".to_string()];
    let err = bind_args(&names, &p, &lower()).unwrap_err();
    assert!(matches!(err, crate::BindError::Shape(_)), "{err:?}");

    p.place = Some(Box::new(Place {
        city: "Auckland".into(),
    }));
    let err = bind_args(&names, &p, &lower()).unwrap_err();
    assert!(matches!(err, crate::BindError::Shape(_)), "{err:?}");

    let (_, args) = bind_named(BindStyle::Dollar, "SELECT :place.city", &p, &lower()).unwrap();
    assert_eq!(args, vec![Value::Text("Auckland".into())]);
}

#[test]
fn compiled_query_binds_many_sources() {
    let q = compile("INSERT INTO person (first_name, age) VALUES (:first_name, :age)", BindStyle::Dollar)
        .unwrap();
    let m = lower();
    let a = q.bind(&Person::new("a", "x", 1), &m).unwrap();
    let b = q.bind(&Person::new("b", "y", 2), &m).unwrap();
    assert_eq!(a, vec![Value::Text("a".into()), Value::Int(1)]);
    assert_eq!(b, vec![Value::Text("b".into()), Value::Int(2)]);
}

#[test]
fn batch_insert_repeats_values_group() {
    let people = vec![
        Person::new("Ardie", "Savea", 30),
        Person::new("Sonny Bill", "Williams", 35),
        Person::new("Ngani", "Laumape", 26),
    ];
    let (q, values) = bind_named(
        BindStyle::Dollar,
        "INSERT INTO person (first_name, last_name, age) VALUES (:first_name, :last_name, :age)",
        &people,
        &lower(),
    )
    .unwrap();
    assert_eq!(
        q,
        "INSERT INTO person (first_name, last_name, age) VALUES ($1, $2, $3),($4, $5, $6),($7, $8, $9)"
    );
    assert_eq!(values.len(), 9);
    assert_eq!(values[3], Value::Text("Sonny Bill".into()));
    assert_eq!(values[8], Value::Int(26));
}

#[test]
fn batch_of_two_records_yields_all_arguments() {
    let people = [Person::new("a", "b", 1), Person::new("c", "d", 2)];
    let (q, values) = named(
        "INSERT INTO person (first_name, last_name, age) values (:first_name, :last_name, :age)",
        &people,
    )
    .unwrap();
    assert_eq!(
        q,
        "INSERT INTO person (first_name, last_name, age) values (?, ?, ?),(?, ?, ?)"
    );
    assert_eq!(values.len(), 6);
}

#[test]
fn single_element_batch_is_not_expanded() {
    let people = vec![Person::new("a", "b", 1)];
    let (q, values) = named(
        "INSERT INTO person (first_name) VALUES (:first_name)",
        &people,
    )
    .unwrap();
    assert_eq!(q, "INSERT INTO person (first_name) VALUES (?)");
    assert_eq!(values, vec![Value::Text("a".into())]);
}

#[test]
fn batch_of_maps() {
    let rows: Vec<HashMap<&str, i64>> = vec![
        HashMap::from([("a", 1), ("b", 2)]),
        HashMap::from([("a", 3), ("b", 4)]),
    ];
    let (q, values) = bind_named(
        BindStyle::At,
        "INSERT INTO t (a, b) VALUES (:a, :b)",
        &rows,
        &lower(),
    )
    .unwrap();
    assert_eq!(q, "INSERT INTO t (a, b) VALUES (@p1, @p2),(@p3, @p4)");
    assert_eq!(
        values,
        vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
    );
}

#[test]
fn empty_batch_is_rejected() {
    let people: Vec<Person> = Vec::new();
    let err = named("INSERT INTO person (age) VALUES (:age)", &people).unwrap_err();
    assert!(err.is_argument_mismatch());
}

#[test]
fn nested_batch_is_rejected() {
    let rows = vec![vec![HashMap::from([("a", 1i64)])]];
    let err = named("INSERT INTO t (a) VALUES (:a)", &rows).unwrap_err();
    assert!(matches!(err, crate::BindError::Shape(_)));
}

#[test]
fn batch_without_values_group_is_left_alone() {
    let people = vec![Person::new("a", "b", 1), Person::new("c", "d", 2)];
    let (q, values) = named("UPDATE person SET age = :age", &people).unwrap();
    assert_eq!(q, "UPDATE person SET age = ?");
    assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn values_group_with_nested_parens() {
    let q = bind::repeat_values_group(
        "INSERT INTO t (a, b) VALUES (?, lower(?)) ON CONFLICT DO NOTHING",
        2,
    );
    assert_eq!(
        q,
        "INSERT INTO t (a, b) VALUES (?, lower(?)),(?, lower(?)) ON CONFLICT DO NOTHING"
    );

    let unbalanced = "INSERT INTO t (a) VALUES (?";
    assert_eq!(bind::repeat_values_group(unbalanced, 3), unbalanced);
}
