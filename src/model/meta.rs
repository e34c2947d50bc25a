//! Model metadata carried alongside the forest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::FeatureType;

/// The learning task a model was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    Regression,
    BinaryClassification,
    MulticlassClassification { n_classes: usize },
    IntervalRegression,
}

/// Everything about a trained model that is not the forest itself.
///
/// `attributes` is a free-form string map owned by the caller; a `BTreeMap`
/// keeps its serialization order stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub n_features: usize,
    pub n_groups: usize,
    pub task: TaskKind,
    pub feature_names: Vec<String>,
    pub feature_types: Vec<FeatureType>,
    /// Class display labels in code order, for classification tasks.
    pub class_labels: Option<Vec<String>>,
    /// Best round found against the eval set, if one was tracked.
    pub best_iteration: Option<usize>,
    pub attributes: BTreeMap<String, String>,
}

impl ModelMeta {
    /// Number of classes, for classification tasks.
    pub fn n_classes(&self) -> Option<usize> {
        match self.task {
            TaskKind::BinaryClassification => Some(2),
            TaskKind::MulticlassClassification { n_classes } => Some(n_classes),
            _ => None,
        }
    }
}
