//! Pipeline integration tests against on-disk artifacts
//!
//! Fixtures live in tests/fixtures: a standard scaler, a logistic model and
//! a two-tree forest fitted on the same six-column schema.

use cosmicoracle::{
    artifacts::{ArtifactStore, ClassifierSpec, ScalerArtifact},
    errors::{ArtifactError, InputError, OracleError},
    measurement::{Field, MeasurementVector},
    pipeline::{predict, InferencePipeline},
    presets, HabitabilityLabel,
};
use quickcheck_macros::quickcheck;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn logistic_pipeline() -> InferencePipeline {
    let store = ArtifactStore::load(&fixture("scaler.json"), &fixture("model.json")).unwrap();
    InferencePipeline::from_store(store).unwrap()
}

fn forest_pipeline() -> InferencePipeline {
    let store =
        ArtifactStore::load(&fixture("scaler.json"), &fixture("forest_model.json")).unwrap();
    InferencePipeline::from_store(store).unwrap()
}

fn preset(name: &str) -> MeasurementVector {
    presets::resolve(name).unwrap()
}

/// Map an arbitrary integer into the inclusive UI range of `field`
fn in_range(field: Field, raw: u16) -> f64 {
    let spec = field.spec();
    spec.min + (spec.max - spec.min) * (raw as f64 / u16::MAX as f64)
}

// Artifact loading

#[test]
fn test_fixtures_load() {
    let store = ArtifactStore::load(&fixture("scaler.json"), &fixture("model.json")).unwrap();
    assert_eq!(store.model.model_id, "habitability-logit-v1");
    assert_eq!(store.model.classifier.kind(), "logistic");
    assert!(store.model.description.is_some());

    let forest =
        ArtifactStore::load(&fixture("scaler.json"), &fixture("forest_model.json")).unwrap();
    match &forest.model.classifier {
        ClassifierSpec::Forest(f) => {
            assert_eq!(f.trees.len(), 2);
            assert_eq!(f.node_count(), 8);
        }
        other => panic!("Expected forest, got {:?}", other),
    }
}

#[test]
fn test_missing_artifact_is_fatal() {
    let err = ArtifactStore::load(&fixture("nope.json"), &fixture("model.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::Missing { kind: "scaler", .. }));
}

#[test]
fn test_five_feature_scaler_is_artifact_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scaler.json");

    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fixture("scaler.json")).unwrap()).unwrap();
    value["mean"].as_array_mut().unwrap().pop();
    value["scale"].as_array_mut().unwrap().pop();
    fs::write(&path, value.to_string()).unwrap();

    let err = ArtifactStore::load(&path, &fixture("model.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::ArityMismatch { expected: 6, found: 5, .. }));
}

#[test]
fn test_reordered_schema_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");

    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fixture("model.json")).unwrap()).unwrap();
    value["schema"]["features"].as_array_mut().unwrap().swap(0, 1);
    fs::write(&path, value.to_string()).unwrap();

    let err = ArtifactStore::load(&fixture("scaler.json"), &path).unwrap_err();
    assert!(matches!(err, ArtifactError::SchemaMismatch { .. }));
}

#[test]
fn test_future_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scaler.json");

    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fixture("scaler.json")).unwrap()).unwrap();
    value["schema"]["version"] = serde_json::json!(2);
    fs::write(&path, value.to_string()).unwrap();

    let err = ArtifactStore::load(&path, &fixture("model.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::UnsupportedVersion { found: 2, .. }));
}

#[test]
fn test_truncated_json_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, "{\"schema\": {\"version\": 1").unwrap();

    let err = ArtifactStore::load(&fixture("scaler.json"), &path).unwrap_err();
    assert!(matches!(err, ArtifactError::Malformed { kind: "model", .. }));
}

// Presets

#[test]
fn test_logistic_preset_verdicts() {
    let pipeline = logistic_pipeline();

    let earth = pipeline.predict(&preset("Earth-like Planet")).unwrap();
    assert_eq!(earth.label, HabitabilityLabel::Habitable);
    assert!(earth.confidence_percent > 90.0);

    let jupiter = pipeline.predict(&preset("Hot Jupiter")).unwrap();
    assert_eq!(jupiter.label, HabitabilityLabel::NotHabitable);
    assert!(jupiter.confidence_percent > 90.0);

    assert!(pipeline.predict(&preset("Super-Earth")).unwrap().is_habitable());
    assert!(!pipeline.predict(&preset("Cold Gas Giant")).unwrap().is_habitable());
}

#[test]
fn test_forest_preset_verdicts() {
    let pipeline = forest_pipeline();

    let earth = pipeline.predict(&preset("earth")).unwrap();
    assert_eq!(earth.label, HabitabilityLabel::Habitable);
    assert_eq!(earth.confidence_percent, 75.0);

    let jupiter = pipeline.predict(&preset("hot")).unwrap();
    assert_eq!(jupiter.label, HabitabilityLabel::NotHabitable);
    assert_eq!(jupiter.confidence_percent, 92.5);

    let cold = pipeline.predict(&preset("cold")).unwrap();
    assert_eq!(cold.label, HabitabilityLabel::NotHabitable);
    assert_eq!(cold.confidence_percent, 87.5);
}

#[test]
fn test_verdict_messages() {
    let pipeline = forest_pipeline();
    assert_eq!(
        pipeline.predict(&preset("earth")).unwrap().message(),
        "Cosmic Scan Complete: This exoplanet shows signs of being habitable! (Confidence: 75.00%)"
    );
    assert_eq!(
        pipeline.predict(&preset("hot")).unwrap().message(),
        "Cosmic Scan Complete: This exoplanet is likely hostile to life. (Confidence: 92.50%)"
    );
}

#[test]
fn test_custom_input_has_no_fixed_values() {
    assert!(presets::resolve("Custom Input").is_err());
    let m = MeasurementVector::custom_default();
    assert_eq!(m.to_array(), [1.0, 300.0, 365.0, 5500.0, 1.0, 4.4]);
    assert!(logistic_pipeline().predict(&m).is_ok());
}

// Boundaries and rejection

#[test]
fn test_range_boundaries_predict() {
    let pipeline = logistic_pipeline();
    let low = MeasurementVector::from_array([0.1, 100.0, 0.1, 2000.0, 0.1, 0.0]);
    let high = MeasurementVector::from_array([20.0, 2000.0, 1000.0, 8000.0, 20.0, 10.0]);

    assert!(low.validate_ranges().is_ok());
    assert!(high.validate_ranges().is_ok());

    for m in [low, high] {
        let result = pipeline.predict(&m).unwrap();
        assert!((0.0..=100.0).contains(&result.confidence_percent));
    }
}

#[test]
fn test_nan_input_is_input_error() {
    let pipeline = logistic_pipeline();
    let mut m = preset("earth");
    m.orbital_period = f64::NAN;

    match pipeline.predict(&m) {
        Err(OracleError::Input(InputError::NonFinite { field, .. })) => {
            assert_eq!(field, "orbital_period")
        }
        other => panic!("Expected NonFinite input error, got {:?}", other),
    }
}

#[test]
fn test_infinite_input_is_input_error() {
    let pipeline = forest_pipeline();
    let mut m = preset("earth");
    m.stellar_eff_temp = f64::INFINITY;
    assert!(matches!(pipeline.predict(&m), Err(OracleError::Input(_))));
}

#[test]
fn test_pipeline_rejects_narrow_scaler() {
    let store = ArtifactStore::load(&fixture("scaler.json"), &fixture("model.json")).unwrap();
    let narrow = ScalerArtifact {
        mean: vec![0.0; 5],
        scale: vec![1.0; 5],
        ..store.scaler.clone()
    };

    let err = predict(&preset("earth"), &narrow, &store.model).unwrap_err();
    assert!(matches!(err, OracleError::Artifact(ArtifactError::ArityMismatch { .. })));
    assert!(InferencePipeline::new(narrow, Box::new(store.model)).is_err());
}

// Properties

#[quickcheck]
fn prop_in_range_inputs_always_predict(raw: (u16, u16, u16, u16, u16, u16)) -> bool {
    let pipeline = logistic_pipeline();
    let m = MeasurementVector::from_array([
        in_range(Field::PlanetRadius, raw.0),
        in_range(Field::EquilibriumTemp, raw.1),
        in_range(Field::OrbitalPeriod, raw.2),
        in_range(Field::StellarEffTemp, raw.3),
        in_range(Field::StellarRadius, raw.4),
        in_range(Field::StellarLogg, raw.5),
    ]);

    match pipeline.predict(&m) {
        // the predicted class always carries at least half the mass
        Ok(r) => r.confidence_percent >= 50.0 && r.confidence_percent <= 100.0,
        Err(_) => false,
    }
}

#[quickcheck]
fn prop_prediction_is_deterministic(raw: (u16, u16, u16, u16, u16, u16)) -> bool {
    let pipeline = forest_pipeline();
    let m = MeasurementVector::from_array([
        in_range(Field::PlanetRadius, raw.0),
        in_range(Field::EquilibriumTemp, raw.1),
        in_range(Field::OrbitalPeriod, raw.2),
        in_range(Field::StellarEffTemp, raw.3),
        in_range(Field::StellarRadius, raw.4),
        in_range(Field::StellarLogg, raw.5),
    ]);

    pipeline.predict(&m).unwrap() == pipeline.predict(&m).unwrap()
}

#[quickcheck]
fn prop_confidence_matches_predicted_class(values: (f64, f64, f64, f64, f64, f64)) -> bool {
    let pipeline = logistic_pipeline();
    let m = MeasurementVector::from_array([
        values.0, values.1, values.2, values.3, values.4, values.5,
    ]);

    match pipeline.predict(&m) {
        Ok(r) => {
            let p = r.probabilities.for_label(r.label) * 100.0;
            (r.confidence_percent - p).abs() <= 0.005 + 1e-9
        }
        // arbitrary floats may be non-finite or overflow the scaler
        Err(e) => matches!(e, OracleError::Input(_) | OracleError::Prediction(_)),
    }
}
