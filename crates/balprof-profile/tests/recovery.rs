//! Recovery pipeline behavior end to end.

use balprof_core::{Mode, Value};
use balprof_profile::builder::ProfileBuilder;
use balprof_profile::{ProfileValidator, RecoveryPipeline};

fn valid_record() -> Value {
    ProfileBuilder::default().build().unwrap().to_generic()
}

fn break_field(record: &mut Value, field: &str, value: Value) {
    record.get_mut("profile").unwrap().insert(field, value);
}

#[test]
fn muzzle_velocity_below_minimum_recovers_to_default() {
    let pipeline = RecoveryPipeline::default();
    let mut record = valid_record();
    break_field(&mut record, "c_muzzle_velocity", Value::Int(1));

    let report = pipeline.run(&mut record);

    assert!(report.recovered());
    assert_eq!(report.spec_results.len(), 1);
    let result = &report.spec_results[0];
    assert!(result.recovered);
    assert_eq!(result.path.to_string(), "profile.c_muzzle_velocity");
    assert_eq!(result.old_value, Some(Value::Int(1)));
    assert_eq!(result.new_value, Some(Value::Int(8000)));

    // The repaired field alone re-validates.
    let validator = ProfileValidator::default();
    validator.validate(&record, Mode::FailFast).unwrap();
}

#[test]
fn recovery_is_idempotent() {
    let pipeline = RecoveryPipeline::default();
    let mut record = valid_record();
    break_field(&mut record, "zero_x", Value::Int(999_999));
    break_field(&mut record, "user_note", Value::String("n".repeat(2000)));

    let first = pipeline.run(&mut record);
    assert!(first.recovered());
    assert!(first.recovered_count() >= 2);
    let after_first = record.clone();

    // A second run finds nothing to do and touches nothing.
    let second = pipeline.run(&mut record);
    assert_eq!(second.results().count(), 0);
    assert!(second.initial.is_empty());
    assert_eq!(record, after_first);
}

#[test]
fn bad_distances_and_index_recover_together() {
    let pipeline = RecoveryPipeline::default();
    let mut record = valid_record();

    // Distances below the minimum and a zero index past the table.
    break_field(
        &mut record,
        "distances",
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    );
    break_field(&mut record, "c_zero_distance_idx", Value::Int(5));

    let report = pipeline.run(&mut record);

    // Two distinct problems were on the table before recovery: the
    // element ranges and the index dependency.
    assert!(report.initial.len() >= 2);
    assert!(report.recovered_count() >= 1);
    assert!(report.recovered());

    // The dependency rule holds on the repaired record even though the
    // absolute values changed.
    let profile = record.get("profile").unwrap();
    let idx = profile
        .get("c_zero_distance_idx")
        .and_then(Value::as_i64)
        .unwrap();
    let len = profile.get("distances").and_then(Value::as_list).unwrap().len();
    assert!((0..len as i64).contains(&idx));

    let validator = ProfileValidator::default();
    validator.validate(&record, Mode::CollectAll).unwrap();
}

#[test]
fn unknown_drag_tag_recovers_to_standard_model() {
    let pipeline = RecoveryPipeline::default();
    let mut record = valid_record();
    break_field(&mut record, "bc_type", Value::from("G9"));

    let report = pipeline.run(&mut record);

    assert!(report.recovered());
    let profile = record.get("profile").unwrap();
    assert_eq!(profile.get("bc_type").and_then(Value::as_str), Some("G7"));
}

#[test]
fn unrecoverable_faults_are_reported_not_raised() {
    let pipeline = RecoveryPipeline::default();
    let mut record = valid_record();

    // No registry entry exists for the profile container itself, so a
    // mistyped body can only be reported.
    record.insert("profile", Value::Int(0));

    let report = pipeline.run(&mut record);

    assert!(!report.recovered());
    assert!(!report.initial.is_empty());
    assert_eq!(report.recovered_count(), 0);
    assert!(report.results().all(|r| !r.recovered));
    assert!(!report.residual.is_empty());
}

#[test]
fn wrecked_record_recovers_across_many_fields() {
    let pipeline = RecoveryPipeline::default();
    let mut record = valid_record();

    break_field(&mut record, "profile_name", Value::String("p".repeat(400)));
    break_field(&mut record, "zero_x", Value::Int(-9_000_000));
    break_field(&mut record, "zero_y", Value::Int(9_000_000));
    break_field(&mut record, "c_zero_air_pressure", Value::Int(1));
    break_field(&mut record, "b_weight", Value::Int(0));
    break_field(&mut record, "switches", Value::List(Vec::new()));
    break_field(&mut record, "coef_rows", Value::List(Vec::new()));

    let report = pipeline.run(&mut record);

    assert!(report.recovered(), "residual: {:?}", report.residual);
    assert!(report.recovered_count() >= 7);

    let validator = ProfileValidator::default();
    validator.validate(&record, Mode::CollectAll).unwrap();
}
