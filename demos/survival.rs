//! Interval-censored survival regression.
//!
//! Labels are `(lower, upper)` time bounds; `f32::INFINITY` as the upper
//! bound marks a right-censored observation (the event had not happened
//! by `lower`). Predictions come back on the time scale.
//!
//! Run with:
//! ```bash
//! cargo run --example survival
//! ```

use crabboost::{BoostConfig, Loss, Metric, Model, Pool, Verbosity};

const INF: f32 = f32::INFINITY;

fn main() {
    let train = Pool::builder()
        .add_feature("age", vec![52.0, 61.0, 45.0, 70.0, 38.0, 66.0, 55.0, 49.0])
        .add_feature("dose", vec![1.0, 2.0, 1.0, 3.0, 1.0, 2.0, 3.0, 2.0])
        .add_categorical(
            "center",
            ["north", "north", "south", "south", "north", "south", "north", "south"],
        )
        .interval_labels(vec![
            (12.0, 14.0),
            (8.0, 8.0),
            (20.0, INF),
            (4.0, 6.0),
            (24.0, INF),
            (7.0, 9.0),
            (10.0, 12.0),
            (16.0, INF),
        ])
        .build()
        .unwrap();

    let eval = Pool::builder()
        .add_feature("age", vec![58.0, 42.0])
        .add_feature("dose", vec![2.0, 1.0])
        .add_categorical("center", ["north", "south"])
        .interval_labels(vec![(9.0, 11.0), (22.0, INF)])
        .build()
        .unwrap();

    let config = BoostConfig::builder()
        .loss(Loss::SurvivalAft)
        .eval_metric(Metric::SurvivalAft)
        .iterations(50)
        .learning_rate(0.3)
        .depth(3)
        .verbose(Verbosity::Info)
        .build()
        .unwrap();
    let model = Model::train(config, &train, Some(&eval)).unwrap();

    // predict() maps the fitted log-times back to the time scale.
    let times = model.predict(&eval).unwrap();
    println!("predicted survival times: {:?}", times.row(0).to_vec());

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/survival.cbm");
    model.save_model(path).unwrap();
    println!("model saved to {path}");
}
