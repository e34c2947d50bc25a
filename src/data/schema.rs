//! Feature metadata: names and types.

use serde::{Deserialize, Serialize};

/// Type of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureType {
    /// Continuous numeric feature.
    #[default]
    Numeric,
    /// Discrete categorical feature, dictionary-encoded.
    Categorical,
}

/// Per-feature metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureMeta {
    /// Column name.
    pub name: String,
    /// Column type.
    pub kind: FeatureType,
}

impl FeatureMeta {
    /// Named numeric feature.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureType::Numeric,
        }
    }

    /// Named categorical feature.
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureType::Categorical,
        }
    }
}

/// Ordered feature metadata for a pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolSchema {
    features: Vec<FeatureMeta>,
}

impl PoolSchema {
    /// Create a schema from per-feature metadata.
    pub fn from_features(features: Vec<FeatureMeta>) -> Self {
        Self { features }
    }

    /// Number of features.
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Type of feature `idx`.
    pub fn feature_type(&self, idx: usize) -> FeatureType {
        self.features[idx].kind
    }

    /// Name of feature `idx`.
    pub fn feature_name(&self, idx: usize) -> &str {
        &self.features[idx].name
    }

    /// All feature names in column order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|m| m.name.clone()).collect()
    }

    /// All feature types in column order.
    pub fn feature_types(&self) -> Vec<FeatureType> {
        self.features.iter().map(|m| m.kind).collect()
    }

    /// True if any feature is categorical.
    pub fn has_categorical(&self) -> bool {
        self.features
            .iter()
            .any(|m| m.kind == FeatureType::Categorical)
    }

    /// Indices of categorical features.
    pub fn categorical_indices(&self) -> Vec<usize> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, m)| m.kind == FeatureType::Categorical)
            .map(|(i, _)| i)
            .collect()
    }
}
