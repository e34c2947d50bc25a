//! Multiclass classification on a small Olympic-host dataset.
//!
//! One categorical feature (season) and two numeric ones. Labels are
//! country names; predictions come back as raw scores, per-class
//! probabilities, and country labels.
//!
//! Run with:
//! ```bash
//! cargo run --example multiclassification
//! ```

use crabboost::{row, BoostConfig, Loss, Model, Pool};

fn main() {
    let train = Pool::from_rows(
        vec![
            row!["summer", 1924, 44],
            row!["summer", 1932, 37],
            row!["winter", 1980, 37],
            row!["summer", 2012, 204],
        ],
        &[0],
    )
    .unwrap()
    .with_class_labels(["France", "USA", "USA", "UK"])
    .unwrap();

    let config = BoostConfig::builder()
        .loss(Loss::MultiClass)
        .iterations(10)
        .learning_rate(1.0)
        .depth(2)
        .build()
        .unwrap();
    let model = Model::train(config, &train, None).unwrap();

    let eval = Pool::from_rows(
        vec![
            row!["winter", 1996, 197],
            row!["winter", 1968, 37],
            row!["summer", 2002, 77],
            row!["summer", 1948, 59],
        ],
        &[0],
    )
    .unwrap();

    println!("classes in code order: {:?}", model.meta().class_labels);

    let raw = model.predict_raw(&eval).unwrap();
    println!("raw scores:\n{raw:?}");

    let proba = model.predict_proba(&eval).unwrap();
    println!("probabilities:\n{proba:?}");

    let classes = model.predict_class(&eval).unwrap();
    println!("predicted hosts: {classes:?}");

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/multiclassification.cbm");
    model.save_model(path).unwrap();
    println!("model saved to {path}");
}
