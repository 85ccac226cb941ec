// Value model behavior as seen from outside the core crate.

use std::sync::Arc;

use strata_core::dynamic::{Dynamic, PairedView};
use strata_core::error::Error;
use strata_core::item::Record;
use strata_core::order::{partial_compare, partial_compare_desc, PartialOrder};

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn rec(id: u64, ts: i64, a: i64, b: &str) -> Record {
    Record::new(
        id,
        ts,
        Dynamic::object_from([("a", Dynamic::Int(a)), ("b", Dynamic::from(b))]),
    )
}

#[test]
fn json_text_round_trip() {
    let text = r#"{"name": "ada", "tags": ["x", "y"], "n": 3, "score": 1.5, "meta": {"ok": true}}"#;
    let v = Dynamic::from_json(text).unwrap();
    assert_eq!(v.at("name").unwrap(), &Dynamic::from("ada"));
    assert_eq!(v.at("n").unwrap(), &Dynamic::Int(3));
    assert_eq!(v.at("score").unwrap(), &Dynamic::Double(1.5));
    assert_eq!(v.at("tags").unwrap().length().unwrap(), 2);

    let again = Dynamic::from_json(&v.to_json()).unwrap();
    assert_eq!(again.at("name").unwrap(), v.at("name").unwrap());
    assert_eq!(again.at("tags").unwrap(), v.at("tags").unwrap());
    // Booleans come back as integers.
    assert_eq!(again.at("meta").unwrap().at("ok").unwrap(), &Dynamic::Int(1));
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(
        Dynamic::from_json("{\"a\": "),
        Err(Error::MalformedValue(_))
    ));
}

#[test]
fn records_serialize_with_their_cached_fields() {
    let r = Record::new(4, 99, Dynamic::ordered_from([("k", "v")]));
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json, serde_json::json!({"id": 4, "ts": 99, "value": {"k": "v"}}));

    let back: Record = serde_json::from_value(json).unwrap();
    assert_eq!(back.id(), 4);
    assert_eq!(back.ts(), 99);
    assert_eq!(back.value().at("k").unwrap(), &Dynamic::from("v"));
}

#[test]
fn partial_compare_on_columns() {
    let x = rec(1, 0, 5, "m");
    let y = rec(2, 0, 5, "n");

    assert_eq!(partial_compare_desc(&x, &y, &cols(&["a"])), PartialOrder::Eq);
    assert_eq!(partial_compare_desc(&x, &y, &cols(&["a", "b"])), PartialOrder::Lt);
    assert_eq!(partial_compare(&x, &y, &cols(&["b"]), &[false]), PartialOrder::Gt);
    assert_eq!(partial_compare_desc(&x, &y, &cols(&["id"])), PartialOrder::Lt);
}

#[test]
fn incomparable_columns_are_not_equal() {
    let x = Record::new(1, 0, Dynamic::object_from([("a", 1i64)]));
    let y = Record::new(2, 0, Dynamic::object_from([("a", "one")]));
    let order = partial_compare_desc(&x, &y, &cols(&["a"]));
    assert_eq!(order, PartialOrder::None);
    assert!(!order.is_comparable());

    // A later column that differs still decides.
    let x = Record::new(1, 0, Dynamic::object_from([("a", Dynamic::Int(1)), ("b", Dynamic::Int(2))]));
    let y = Record::new(2, 0, Dynamic::object_from([("a", Dynamic::from("one")), ("b", Dynamic::Int(1))]));
    assert_eq!(partial_compare_desc(&x, &y, &cols(&["a", "b"])), PartialOrder::Gt);
}

#[test]
fn cross_kind_ordering_fails_but_equality_does_not() {
    let i = Dynamic::Int(1);
    let s = Dynamic::from("1");
    assert_ne!(i, s);
    assert!(matches!(i.try_less(&s), Err(Error::TypeMismatch(_))));
    assert!(Dynamic::object().try_less(&Dynamic::object()).is_err());
}

#[test]
fn paired_views_read_like_maps() {
    let keys: Arc<[String]> = cols(&["x", "y"]).into();
    let row = Dynamic::Paired(PairedView::new(keys.clone(), vec![Dynamic::Int(1), Dynamic::Int(2)]));
    assert_eq!(row.at("y").unwrap(), &Dynamic::Int(2));
    assert!(matches!(row.at("z"), Err(Error::KeyNotFound(_))));
    assert_eq!(row.length().unwrap(), 2);

    let short = Dynamic::Paired(PairedView::new(keys, vec![Dynamic::Int(1)]));
    assert!(matches!(short.at("x"), Err(Error::MalformedValue(_))));
}

#[test]
fn project_and_rename_build_ordered_maps() {
    let v = Dynamic::object_from([("a", 1i64), ("b", 2i64), ("c", 3i64)]);
    let projected = Dynamic::Ordered(v.project(&cols(&["c", "a", "zzz"])));
    assert_eq!(projected.to_json(), r#"{"a":1, "c":3}"#);

    let renamed = Dynamic::Ordered(projected.rename("a", "z").unwrap());
    assert_eq!(renamed.to_json(), r#"{"c":3, "z":1}"#);
    assert!(Dynamic::Int(1).rename("a", "b").is_err());
}

#[test]
fn merge_combines_payloads() {
    let mut v = Dynamic::object_from([("count", 2i64)]);
    v.merge(&Dynamic::object_from([("count", 3i64), ("extra", 1i64)])).unwrap();
    assert_eq!(v.at("count").unwrap(), &Dynamic::Int(5));
    assert_eq!(v.at("extra").unwrap(), &Dynamic::Int(1));
    assert!(v.merge(&Dynamic::Int(1)).is_err());
}
