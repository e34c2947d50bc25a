//! Model metadata and feature introspection.
//!
//! Trains on a synthetic dataset with named columns, stores user key/value
//! metadata on the model, and reads it back after a save/load round trip.
//!
//! Run with:
//! ```bash
//! cargo run --example metadata
//! ```

use crabboost::{BoostConfig, Model, Pool};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

fn main() {
    let n_samples = 1000;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

    let mut builder = Pool::builder();
    for i in 0..10 {
        let column: Vec<f32> = (0..n_samples).map(|_| rng.random_range(0.0..1.0)).collect();
        builder = builder.add_feature(format!("Column={i}"), column);
    }
    for i in 1..=2 {
        let column: Vec<String> = (0..n_samples)
            .map(|_| format!("cat{}", rng.random_range(0..4)))
            .collect();
        builder = builder.add_categorical(format!("CatColumn_{i}"), column);
    }
    let labels: Vec<f32> = (0..n_samples).map(|_| rng.random_range(0.0..10.0)).collect();
    let pool = builder.labels(labels).build().unwrap();

    let config = BoostConfig::builder().iterations(100).build().unwrap();
    let mut model = Model::train(config, &pool, None).unwrap();

    model
        .metadata_mut()
        .insert("example_key".to_string(), "example_value".to_string());

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/metadata.cbm");
    model.save_model(path).unwrap();
    let loaded = Model::load_model(path).unwrap();

    for (key, value) in loaded.metadata() {
        println!("{key} = {value}");
    }
    println!("feature names: {:?}", loaded.feature_names());
    println!("trees: {}", loaded.forest().n_trees());
}
