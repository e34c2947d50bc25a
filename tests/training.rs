//! End-to-end training behavior across tasks.

use approx::assert_abs_diff_eq;
use crabboost::{row, BoostConfig, Loss, Metric, Model, Pool, TaskKind};
use rstest::rstest;

fn regression_config(iterations: u32) -> BoostConfig {
    BoostConfig::builder()
        .iterations(iterations)
        .learning_rate(0.3)
        .depth(3)
        .l2_leaf_reg(0.0)
        .build()
        .unwrap()
}

/// y = 2 * x0 + step(x1), learnable to high precision.
fn learnable_pool(n: usize) -> Pool {
    let x0: Vec<f32> = (0..n).map(|i| (i % 10) as f32).collect();
    let x1: Vec<f32> = (0..n).map(|i| ((i * 7) % 20) as f32).collect();
    let labels: Vec<f32> = x0
        .iter()
        .zip(&x1)
        .map(|(&a, &b)| 2.0 * a + if b >= 10.0 { 5.0 } else { 0.0 })
        .collect();
    Pool::builder()
        .add_feature("x0", x0)
        .add_feature("x1", x1)
        .labels(labels)
        .build()
        .unwrap()
}

#[test]
fn regression_quality_smoke() {
    let pool = learnable_pool(200);
    let model = Model::train(regression_config(100), &pool, None).unwrap();

    let preds = model.predict(&pool).unwrap();
    let labels = match pool.labels() {
        crabboost::Labels::Float(v) => v.clone(),
        _ => unreachable!(),
    };
    let rmse: f32 = {
        let sse: f32 = preds
            .row(0)
            .iter()
            .zip(&labels)
            .map(|(&p, &t)| (p - t) * (p - t))
            .sum();
        (sse / labels.len() as f32).sqrt()
    };
    assert!(rmse < 0.5, "rmse too high: {rmse}");
}

#[test]
fn prediction_shape_matches_eval_pool() {
    let pool = learnable_pool(50);
    let model = Model::train(regression_config(10), &pool, None).unwrap();

    let eval = Pool::builder()
        .add_feature("x0", vec![1.0, 2.0, 3.0])
        .add_feature("x1", vec![0.0, 15.0, 19.0])
        .build()
        .unwrap();
    let preds = model.predict(&eval).unwrap();
    assert_eq!(preds.dim(), (1, 3));
}

#[rstest]
#[case(Loss::Logloss)]
#[case(Loss::MultiClass)]
fn probabilities_form_a_distribution(#[case] loss: Loss) {
    let pool = Pool::from_rows(
        vec![
            row!["a", 1.0],
            row!["b", 2.0],
            row!["c", 10.0],
            row!["a", 1.5],
            row!["b", 2.5],
            row!["c", 11.0],
        ],
        &[0],
    )
    .unwrap()
    .with_class_labels(match loss {
        Loss::Logloss => vec!["no", "no", "yes", "no", "no", "yes"],
        _ => vec!["red", "green", "blue", "red", "green", "blue"],
    })
    .unwrap();

    let config = BoostConfig::builder()
        .loss(loss)
        .iterations(20)
        .depth(2)
        .build()
        .unwrap();
    let model = Model::train(config, &pool, None).unwrap();

    let proba = model.predict_proba(&pool).unwrap();
    let n_classes = model.meta().n_classes().unwrap();
    assert_eq!(proba.nrows(), n_classes);
    for column in proba.columns() {
        let sum: f32 = column.sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-4);
        assert!(column.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }
}

#[test]
fn predicted_classes_come_from_training_domain() {
    let pool = Pool::from_rows(
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
    let model = Model::train(config, &pool, None).unwrap();

    assert_eq!(
        model.meta().task,
        TaskKind::MulticlassClassification { n_classes: 3 }
    );
    let eval = Pool::from_rows(vec![row!["winter", 1996, 197], row!["summer", 1948, 59]], &[0])
        .unwrap();
    for class in model.predict_class(&eval).unwrap() {
        assert!(["France", "UK", "USA"].contains(&class.as_str()));
    }
}

#[test]
fn survival_predictions_are_positive_times() {
    let inf = f32::INFINITY;
    let pool = Pool::builder()
        .add_feature("age", vec![52.0, 61.0, 45.0, 70.0, 38.0, 66.0])
        .interval_labels(vec![
            (12.0, 14.0),
            (8.0, 8.0),
            (20.0, inf),
            (4.0, 6.0),
            (24.0, inf),
            (7.0, 9.0),
        ])
        .build()
        .unwrap();

    let config = BoostConfig::builder()
        .loss(Loss::SurvivalAft)
        .eval_metric(Metric::SurvivalAft)
        .iterations(30)
        .depth(2)
        .build()
        .unwrap();
    let model = Model::train(config, &pool, None).unwrap();

    assert_eq!(model.meta().task, TaskKind::IntervalRegression);
    let times = model.predict(&pool).unwrap();
    assert!(times.iter().all(|&t| t > 0.0 && t.is_finite()));
}

#[test]
fn missing_values_are_scored_not_rejected() {
    let pool = Pool::builder()
        .add_feature("x", vec![1.0, 2.0, 10.0, 11.0])
        .labels(vec![1.0, 1.0, 5.0, 5.0])
        .build()
        .unwrap();
    let model = Model::train(regression_config(20), &pool, None).unwrap();

    let with_missing = Pool::builder()
        .add_feature("x", vec![f32::NAN, 1.5])
        .build()
        .unwrap();
    let preds = model.predict(&with_missing).unwrap();
    assert!(preds.iter().all(|p| p.is_finite()));
}

#[test]
fn same_seed_trains_byte_identical_models() {
    let pool = learnable_pool(100);
    let config = BoostConfig::builder()
        .iterations(30)
        .subsample(0.7)
        .random_seed(7)
        .build()
        .unwrap();

    let a = Model::train(config.clone(), &pool, None).unwrap();
    let b = Model::train(config, &pool, None).unwrap();
    assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
}

#[test]
fn eval_set_tracks_best_iteration() {
    let train = learnable_pool(120);
    let valid = learnable_pool(40);

    let config = BoostConfig::builder()
        .iterations(50)
        .eval_metric(Metric::Rmse)
        .early_stopping_rounds(10)
        .build()
        .unwrap();
    let model = Model::train(config, &train, Some(&valid)).unwrap();

    let best = model.meta().best_iteration.unwrap();
    assert!(best < 50);
    assert_eq!(model.forest().n_trees(), best + 1);
}
