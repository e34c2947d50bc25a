//! Native format round trips and corruption handling.

use approx::assert_abs_diff_eq;
use crabboost::{row, BoostConfig, LoadError, Loss, Model, Pool};

fn classification_model() -> (Model, Pool) {
    let pool = Pool::from_rows(
        vec![
            row!["a", "b", 1, 4, 5, 6],
            row!["a", "b", 4, 5, 6, 7],
            row!["c", "d", 30, 40, 50, 60],
            row!["c", "b", 28, 39, 51, 58],
        ],
        &[0, 1],
    )
    .unwrap()
    .with_class_labels(["1", "1", "-1", "-1"])
    .unwrap();

    let config = BoostConfig::builder()
        .loss(Loss::Logloss)
        .iterations(5)
        .learning_rate(0.5)
        .depth(2)
        .build()
        .unwrap();
    let model = Model::train(config, &pool, None).unwrap();
    (model, pool)
}

#[test]
fn file_round_trip_preserves_predictions() {
    let (model, pool) = classification_model();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.cbm");

    model.save_model(&path).unwrap();
    assert!(path.exists());
    assert!(std::fs::metadata(&path).unwrap().len() > 0);

    let loaded = Model::load_model(&path).unwrap();
    let before = model.predict_proba(&pool).unwrap();
    let after = loaded.predict_proba(&pool).unwrap();
    assert_eq!(before.dim(), after.dim());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-7);
    }
}

#[test]
fn round_trip_preserves_metadata_and_schema() {
    let (mut model, _) = classification_model();
    model
        .metadata_mut()
        .insert("example_key".into(), "example_value".into());
    model.metadata_mut().insert("version".into(), "7".into());

    let loaded = Model::from_bytes(&model.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded.metadata(), model.metadata());
    assert_eq!(loaded.feature_names(), model.feature_names());
    assert_eq!(loaded.meta().class_labels, model.meta().class_labels);
    assert_eq!(loaded.config(), model.config());
}

#[test]
fn class_predictions_survive_reload() {
    let (model, pool) = classification_model();
    let loaded = Model::from_bytes(&model.to_bytes().unwrap()).unwrap();
    assert_eq!(
        loaded.predict_class(&pool).unwrap(),
        model.predict_class(&pool).unwrap()
    );
}

#[test]
fn bad_magic_is_rejected() {
    let (model, _) = classification_model();
    let mut bytes = model.to_bytes().unwrap();
    bytes[0] = b'X';
    assert!(matches!(
        Model::from_bytes(&bytes),
        Err(LoadError::BadMagic)
    ));
}

#[test]
fn unknown_version_is_rejected() {
    let (model, _) = classification_model();
    let mut bytes = model.to_bytes().unwrap();
    bytes[4] = 250;
    assert!(matches!(
        Model::from_bytes(&bytes),
        Err(LoadError::UnsupportedVersion(250))
    ));
}

#[test]
fn truncated_payload_is_an_error() {
    let (model, _) = classification_model();
    let bytes = model.to_bytes().unwrap();
    let truncated = &bytes[..bytes.len() / 2];
    assert!(Model::from_bytes(truncated).is_err());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Model::load_model(dir.path().join("absent.cbm")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}
