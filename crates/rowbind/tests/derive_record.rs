//! Field mapping of `#[derive(Record)]` types.

#![cfg(feature = "derive")]

use rowbind::{Assign, Mapper, MapperConfig, Record, Value};
use std::sync::Arc;

#[derive(Debug, Default, PartialEq, Record)]
struct Place {
    country: String,
    city: Option<String>,
    #[record(rename = "telcode")]
    tel_code: i32,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Person {
    #[record(rename = "first_name")]
    first: String,
    #[record(rename = "last_name")]
    last: String,
    email: String,
    #[record(nested)]
    place: Option<Box<Place>>,
    #[record(skip)]
    scratch: Vec<u8>,
}

#[derive(Debug, Default, Record)]
struct Base {
    id: i64,
    name: String,
}

#[derive(Debug, Default, Record)]
struct Item {
    #[record(embed)]
    base: Base,
    // shadows the embedded `name`
    name: String,
    price: f64,
}

#[derive(Debug, Default, Record)]
struct Wrapped {
    r#type: String,
    #[record(nested)]
    inner: Base,
    #[record(nested)]
    boxed: Box<Base>,
    #[record(nested)]
    maybe: Option<Base>,
}

fn lowercase() -> Mapper {
    Mapper::new(MapperConfig::lowercase())
}

#[test]
fn derive_names_tagged_and_nested_fields() {
    let mapper = lowercase();
    let map = mapper.type_map::<Person>();

    assert!(map.get_by_name("first_name").is_some());
    assert!(map.get_by_name("email").is_some());
    assert!(map.get_by_name("place.telcode").is_some());
    assert_eq!(map.traversal("place.city"), &[3, 1]);
    // skipped field keeps its slot but has no name
    assert!(map.get_by_name("scratch").is_none());
}

#[test]
fn derive_reads_and_writes_fields() {
    let mapper = lowercase();
    let person = Person {
        first: "Jason".into(),
        last: "Moiron".into(),
        email: "jmoiron@jmoiron.net".into(),
        place: Some(Box::new(Place {
            country: "US".into(),
            city: None,
            tel_code: 1,
        })),
        scratch: vec![1, 2, 3],
    };

    let values = mapper
        .fields_by_name(&person, &["last_name", "place.telcode", "place.city", "nope"])
        .unwrap();
    assert_eq!(
        values,
        vec![
            Some(Value::Text("Moiron".into())),
            Some(Value::Int(1)),
            Some(Value::Null),
            None,
        ]
    );
}

#[test]
fn unset_nested_reads_as_null() {
    let mapper = lowercase();
    let person = Person::default();
    assert_eq!(
        mapper.field_by_name(&person, "place.country").unwrap(),
        Some(Value::Null)
    );
}

#[test]
fn embedded_fields_are_promoted_and_shadowed() {
    let mapper = lowercase();
    let map = mapper.type_map::<Item>();

    assert_eq!(map.traversal("id"), &[0, 0]);
    // the outer field wins over the promoted one
    assert_eq!(map.traversal("name"), &[1]);
    assert!(map.get_by_path("base").unwrap().embedded);
    assert!(map.get_by_name("base").is_none());

    let item = Item {
        base: Base {
            id: 7,
            name: "inner".into(),
        },
        name: "outer".into(),
        price: 2.5,
    };
    let fields = mapper.field_map(&item).unwrap();
    assert_eq!(fields.get("name"), Some(&Value::Text("outer".into())));
    assert_eq!(fields.get("price"), Some(&Value::Float(2.5)));
}

#[test]
fn every_holder_shape_is_reachable() {
    let mapper = lowercase();
    let map = mapper.type_map::<Wrapped>();
    for name in ["type", "inner.id", "boxed.name", "maybe.id"] {
        assert!(map.get_by_name(name).is_some(), "missing {name}");
    }

    let mut w = Wrapped::default();
    let idx = map.traversal("maybe.id").to_vec();
    if let Some(rowbind::FieldMut::Scalar(id)) = rowbind::field_by_indexes_mut(&mut w, &idx) {
        id.assign(Value::Int(9)).unwrap();
    }
    assert_eq!(w.maybe.map(|b| b.id), Some(9));
}

#[test]
fn record_type_matches_static_type() {
    let p = Person::default();
    assert_eq!(p.record_type(), rowbind::RecordType::of::<Person>());
    assert_eq!(Person::fields().len(), 5);
}

#[test]
fn type_maps_are_cached_per_mapper() {
    let mapper = Arc::new(lowercase());
    let a = mapper.type_map::<Person>();
    let b = mapper.type_map::<Person>();
    assert!(Arc::ptr_eq(&a, &b));
}
