//! Binary classification with categorical features.
//!
//! The first two columns are categorical strings; labels are the strings
//! "1" and "-1". Shows raw scores, positive-class probabilities, and class
//! predictions.
//!
//! Run with:
//! ```bash
//! cargo run --example classifier
//! ```

use crabboost::{row, BoostConfig, Loss, Model, Pool};

fn main() {
    let train = Pool::from_rows(
        vec![
            row!["a", "b", 1, 4, 5, 6],
            row!["a", "b", 4, 5, 6, 7],
            row!["c", "d", 30, 40, 50, 60],
        ],
        &[0, 1],
    )
    .unwrap()
    .with_class_labels(["1", "1", "-1"])
    .unwrap();

    let config = BoostConfig::builder()
        .loss(Loss::Logloss)
        .iterations(2)
        .learning_rate(1.0)
        .depth(2)
        .build()
        .unwrap();
    let model = Model::train(config, &train, None).unwrap();

    let eval = Pool::from_rows(
        vec![row!["a", "b", 2, 4, 6, 8], row!["a", "d", 1, 4, 50, 60]],
        &[0, 1],
    )
    .unwrap();

    let raw = model.predict_raw(&eval).unwrap();
    println!("raw scores: {:?}", raw.row(0).to_vec());

    // Row 1 of the probability matrix is the positive class; class codes
    // are lexicographic, so "1" sorts after "-1".
    let proba = model.predict_proba(&eval).unwrap();
    println!("P(class=1): {:?}", proba.row(1).to_vec());

    let classes = model.predict_class(&eval).unwrap();
    println!("classes:    {classes:?}");

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/classifier.cbm");
    model.save_model(path).unwrap();
    println!("model saved to {path}");
}
