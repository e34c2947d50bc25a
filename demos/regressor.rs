//! Regression training on a tiny numeric dataset.
//!
//! Trains a squared-loss model on three rows, scores two new rows with raw
//! predictions, and round-trips the model through the native format.
//!
//! Run with:
//! ```bash
//! cargo run --example regressor
//! ```

use crabboost::{row, BoostConfig, Model, Pool};

fn main() {
    let train = Pool::from_rows(
        vec![row![1, 4, 5, 6], row![4, 5, 6, 7], row![30, 40, 50, 60]],
        &[],
    )
    .unwrap()
    .with_labels(vec![10.0, 20.0, 30.0])
    .unwrap();

    let config = BoostConfig::builder()
        .iterations(2)
        .learning_rate(1.0)
        .depth(2)
        .build()
        .unwrap();
    let model = Model::train(config, &train, None).unwrap();

    let eval = Pool::from_rows(vec![row![2, 4, 6, 8], row![1, 4, 50, 60]], &[]).unwrap();
    let preds = model.predict_raw(&eval).unwrap();
    println!("raw predictions: {:?}", preds.row(0).to_vec());

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/regressor.cbm");
    model.save_model(path).unwrap();
    let loaded = Model::load_model(path).unwrap();
    let reloaded_preds = loaded.predict_raw(&eval).unwrap();
    println!("after reload:    {:?}", reloaded_preds.row(0).to_vec());
}
