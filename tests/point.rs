//! Coordinate validation and multi-source derivations, using the point
//! shape (x/y stored and validated, distance/angle derived from both).
//! Also covers snapshot round-trips through serde_json.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use slotted::{
    rules, AttrSpec, AttrValue, Error, Record, Result, RuleViolation, Schema, Sources,
};

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn distance(sources: &Sources<'_>) -> Result<AttrValue> {
    let x = sources.float("x")?;
    let y = sources.float("y")?;
    Ok(AttrValue::Float((x * x + y * y).sqrt().round()))
}

fn angle(sources: &Sources<'_>) -> Result<AttrValue> {
    let x = sources.float("x")?;
    let y = sources.float("y")?;
    Ok(AttrValue::Float(round1((y / x).atan().to_degrees())))
}

static POINT: Lazy<Schema> = Lazy::new(|| {
    Schema::new(vec![
        AttrSpec::stored("x").validated(rules::numeric),
        AttrSpec::stored("y").validated(rules::numeric),
        AttrSpec::derived("distance", distance, &["x", "y"]),
        AttrSpec::derived("angle", angle, &["x", "y"]),
    ])
    .unwrap()
});

fn point(x: f64, y: f64) -> Record<'static> {
    let mut record = Record::new(&POINT);
    record.set("x", x).unwrap();
    record.set("y", y).unwrap();
    record
}

#[test]
fn test_coordinates_coerce_numeric_text() {
    let mut record = Record::new(&POINT);
    record.set("x", "3").unwrap();
    record.set("y", "4.0").unwrap();
    assert_eq!(record.get("x").unwrap(), AttrValue::Float(3.0));
    assert_eq!(record.get("y").unwrap(), AttrValue::Float(4.0));
}

#[test]
fn test_non_numeric_coordinate_rejected_with_name_and_value() {
    let mut record = Record::new(&POINT);
    let err = record.set("x", "abc").unwrap_err();
    assert_eq!(
        err,
        Error::Validation {
            attribute: "x",
            value: AttrValue::Text("abc".into()),
            reason: RuleViolation::NotANumber("abc".into()),
        }
    );
    // Never set, still missing.
    assert_eq!(
        record.get("x").unwrap_err(),
        Error::Missing { attribute: "x" }
    );
}

#[test]
fn test_rejection_preserves_prior_coordinate() {
    let mut record = point(1.0, 2.0);
    record.set("x", "not a number").unwrap_err();
    assert_eq!(record.get("x").unwrap(), AttrValue::Float(1.0));
}

#[test]
fn test_polar_view_of_cartesian_point() {
    let mut record = point(3.0, 4.0);
    assert_eq!(record.get("distance").unwrap(), AttrValue::Float(5.0));
    assert_eq!(record.get("angle").unwrap(), AttrValue::Float(53.1));
}

#[test]
fn test_either_coordinate_write_invalidates_both_derivations() {
    let mut record = point(3.0, 4.0);
    record.get("distance").unwrap();
    record.get("angle").unwrap();

    record.set("y", 0.0).unwrap();
    assert_eq!(record.get("distance").unwrap(), AttrValue::Float(3.0));
    assert_eq!(record.get("angle").unwrap(), AttrValue::Float(0.0));

    record.set("x", 4.0).unwrap();
    assert_eq!(record.get("distance").unwrap(), AttrValue::Float(4.0));
}

#[test]
fn test_derivation_with_one_source_missing_fails() {
    let mut record = Record::new(&POINT);
    record.set("x", 3.0).unwrap();
    assert_eq!(
        record.get("distance").unwrap_err(),
        Error::Missing { attribute: "y" }
    );
}

#[test]
fn test_snapshot_round_trip_through_json() {
    let mut record = point(3.0, 4.0);
    record.get("distance").unwrap();

    let snapshot = record.snapshot();
    assert_eq!(snapshot.len(), 2); // derived values never snapshot

    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: BTreeMap<String, AttrValue> = serde_json::from_str(&json).unwrap();
    let mut restored = Record::restore(&POINT, decoded).unwrap();

    assert_eq!(restored.get("x").unwrap(), AttrValue::Float(3.0));
    assert_eq!(restored.get("y").unwrap(), AttrValue::Float(4.0));
    assert_eq!(restored.get("distance").unwrap(), AttrValue::Float(5.0));
}

#[test]
fn test_restore_rejects_tampered_snapshot() {
    let mut snapshot = BTreeMap::new();
    snapshot.insert("x".to_string(), AttrValue::Text("abc".into()));
    assert!(matches!(
        Record::restore(&POINT, snapshot),
        Err(Error::Validation { attribute: "x", .. })
    ));
}

#[test]
fn test_restore_rejects_unknown_names() {
    let mut snapshot = BTreeMap::new();
    snapshot.insert("z".to_string(), AttrValue::Float(1.0));
    assert_eq!(
        Record::restore(&POINT, snapshot).unwrap_err(),
        Error::Unknown { attribute: "z".into() }
    );
}
