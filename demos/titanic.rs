//! Titanic survival tutorial.
//!
//! An inline excerpt of the Titanic passenger list. Missing ages are
//! replaced with a sentinel value well outside the real range, the data is
//! split 75/25 with a seeded shuffle, and training tracks accuracy on the
//! held-out quarter.
//!
//! Run with:
//! ```bash
//! cargo run --example titanic
//! ```

use crabboost::{row, BoostConfig, Loss, Metric, Model, Pool, RowValue, Verbosity};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const NA: f32 = f32::NAN;

/// Columns: Pclass, Sex, Age, SibSp, Parch, Fare, Embarked.
#[rustfmt::skip]
fn passengers() -> Vec<(Vec<RowValue>, &'static str)> {
    vec![
        (row![3, "male", 22.0, 1, 0, 7.25, "S"], "0"),
        (row![1, "female", 38.0, 1, 0, 71.28, "C"], "1"),
        (row![3, "female", 26.0, 0, 0, 7.93, "S"], "1"),
        (row![1, "female", 35.0, 1, 0, 53.10, "S"], "1"),
        (row![3, "male", 35.0, 0, 0, 8.05, "S"], "0"),
        (row![3, "male", NA, 0, 0, 8.46, "Q"], "0"),
        (row![1, "male", 54.0, 0, 0, 51.86, "S"], "0"),
        (row![3, "male", 2.0, 3, 1, 21.08, "S"], "0"),
        (row![3, "female", 27.0, 0, 2, 11.13, "S"], "1"),
        (row![2, "female", 14.0, 1, 0, 30.07, "C"], "1"),
        (row![3, "female", 4.0, 1, 1, 16.70, "S"], "1"),
        (row![1, "female", 58.0, 0, 0, 26.55, "S"], "1"),
        (row![3, "male", 20.0, 0, 0, 8.05, "S"], "0"),
        (row![3, "male", 39.0, 1, 5, 31.28, "S"], "0"),
        (row![3, "female", 14.0, 0, 0, 7.85, "S"], "0"),
        (row![2, "female", 55.0, 0, 0, 16.00, "S"], "1"),
        (row![3, "male", 2.0, 4, 1, 29.13, "Q"], "0"),
        (row![2, "male", NA, 0, 0, 13.00, "S"], "1"),
        (row![3, "female", 31.0, 1, 0, 18.00, "S"], "0"),
        (row![3, "female", NA, 0, 0, 7.23, "C"], "1"),
        (row![2, "male", 35.0, 0, 0, 26.00, "S"], "0"),
        (row![2, "male", 34.0, 0, 0, 13.00, "S"], "1"),
        (row![3, "female", 15.0, 0, 0, 8.03, "Q"], "1"),
        (row![1, "male", 28.0, 0, 0, 35.50, "S"], "1"),
        (row![3, "female", 8.0, 3, 1, 21.08, "S"], "0"),
        (row![3, "female", 38.0, 1, 5, 31.39, "S"], "1"),
        (row![3, "male", NA, 0, 0, 7.23, "C"], "0"),
        (row![1, "male", 19.0, 3, 2, 263.00, "S"], "0"),
        (row![3, "female", NA, 0, 0, 7.88, "Q"], "1"),
        (row![3, "male", NA, 0, 0, 7.90, "S"], "0"),
        (row![1, "male", 40.0, 0, 0, 27.72, "C"], "0"),
        (row![2, "female", NA, 1, 0, 21.00, "S"], "1"),
        (row![3, "male", 66.0, 0, 0, 10.50, "S"], "0"),
        (row![1, "male", 28.0, 1, 0, 82.17, "C"], "0"),
        (row![2, "male", 42.0, 1, 0, 52.00, "S"], "0"),
        (row![3, "male", NA, 0, 0, 7.90, "C"], "1"),
        (row![1, "female", 49.0, 1, 0, 76.73, "C"], "1"),
        (row![3, "male", 21.0, 0, 0, 7.80, "S"], "0"),
        (row![3, "male", 28.5, 0, 0, 16.10, "S"], "0"),
        (row![2, "female", 5.0, 1, 2, 27.75, "S"], "1"),
    ]
}

fn build_pool(records: &[(Vec<RowValue>, &'static str)]) -> Pool {
    // Missing ages become a sentinel far outside the real range, so they
    // can branch away from every genuine age.
    let rows: Vec<Vec<RowValue>> = records
        .iter()
        .map(|(features, _)| {
            features
                .iter()
                .cloned()
                .map(|value| match value {
                    RowValue::Num(v) if v.is_nan() => RowValue::Num(-999.0),
                    other => other,
                })
                .collect()
        })
        .collect();
    let labels: Vec<&str> = records.iter().map(|(_, survived)| *survived).collect();

    // Sex and Embarked are categorical.
    Pool::from_rows(rows, &[1, 6])
        .unwrap()
        .with_class_labels(labels)
        .unwrap()
}

fn main() {
    let mut records = passengers();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    records.shuffle(&mut rng);
    let split = records.len() * 3 / 4;
    let train = build_pool(&records[..split]);
    let valid = build_pool(&records[split..]);

    let config = BoostConfig::builder()
        .loss(Loss::Logloss)
        .eval_metric(Metric::Accuracy)
        .iterations(100)
        .learning_rate(0.1)
        .depth(3)
        .random_seed(42)
        .early_stopping_rounds(20)
        .verbose(Verbosity::Info)
        .build()
        .unwrap();
    let model = Model::train(config, &train, Some(&valid)).unwrap();

    if let Some(best) = model.meta().best_iteration {
        println!("best iteration: {best}");
    }

    let classes = model.predict_class(&valid).unwrap();
    let proba = model.predict_proba(&valid).unwrap();
    for (i, class) in classes.iter().take(5).enumerate() {
        println!(
            "passenger {i}: survived={class} (p={:.3})",
            proba[[1, i]]
        );
    }

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/titanic.cbm");
    model.save_model(path).unwrap();
    println!("model saved to {path}");
}
