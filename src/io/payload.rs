//! Serializable mirror of the model, versioned as an enum.

use serde::{Deserialize, Serialize};

use super::native::LoadError;
use crate::data::CategoryVocab;
use crate::model::{BoostConfig, Model, ModelMeta};
use crate::repr::{CategoriesStorage, CategorySegment, Forest, SplitType, Tree};

/// Versioned on-disk payload. New format revisions add variants; old
/// variants keep decoding forever.
#[derive(Debug, Serialize, Deserialize)]
pub enum Payload {
    V1(PayloadV1),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayloadV1 {
    pub meta: ModelMeta,
    pub config: BoostConfig,
    pub forest: ForestPayload,
    /// Category names per feature, in code order. Empty for numeric features.
    pub vocabs: Vec<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForestPayload {
    pub n_groups: u32,
    pub base_score: Vec<f32>,
    pub tree_groups: Vec<u32>,
    pub trees: Vec<TreePayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TreePayload {
    pub split_indices: Vec<u32>,
    pub split_thresholds: Vec<f32>,
    pub left_children: Vec<u32>,
    pub right_children: Vec<u32>,
    pub default_left: Vec<bool>,
    pub is_leaf: Vec<bool>,
    pub leaf_values: Vec<f32>,
    pub split_types: Vec<u8>,
    pub cat_segments: Vec<(u32, u32)>,
    pub cat_words: Vec<u32>,
}

impl From<&Tree> for TreePayload {
    fn from(tree: &Tree) -> Self {
        let arrays = tree.arrays();
        let categories = tree.categories();
        Self {
            split_indices: arrays.split_indices.to_vec(),
            split_thresholds: arrays.split_thresholds.to_vec(),
            left_children: arrays.left_children.to_vec(),
            right_children: arrays.right_children.to_vec(),
            default_left: arrays.default_left.to_vec(),
            is_leaf: arrays.is_leaf.to_vec(),
            leaf_values: arrays.leaf_values.to_vec(),
            split_types: arrays.split_types.iter().map(|&t| t as u8).collect(),
            cat_segments: categories
                .segments()
                .iter()
                .map(|s| (s.start, s.n_words))
                .collect(),
            cat_words: categories.words().to_vec(),
        }
    }
}

impl TreePayload {
    fn into_tree(self) -> Result<Tree, LoadError> {
        let n_nodes = self.split_indices.len();
        let lens = [
            self.split_thresholds.len(),
            self.left_children.len(),
            self.right_children.len(),
            self.default_left.len(),
            self.is_leaf.len(),
            self.leaf_values.len(),
            self.split_types.len(),
        ];
        if lens.iter().any(|&l| l != n_nodes) {
            return Err(LoadError::Malformed(
                "tree arrays have inconsistent lengths".into(),
            ));
        }

        let split_types: Vec<SplitType> =
            self.split_types.into_iter().map(SplitType::from).collect();
        let segments: Vec<CategorySegment> = self
            .cat_segments
            .into_iter()
            .map(|(start, n_words)| CategorySegment { start, n_words })
            .collect();
        let categories = CategoriesStorage::from_parts(segments, self.cat_words);

        let tree = Tree::new(
            self.split_indices,
            self.split_thresholds,
            self.left_children,
            self.right_children,
            self.default_left,
            self.is_leaf,
            self.leaf_values,
            split_types,
            categories,
        );
        tree.validate()
            .map_err(|e| LoadError::Malformed(format!("invalid tree: {e:?}")))?;
        Ok(tree)
    }
}

impl From<&Forest> for ForestPayload {
    fn from(forest: &Forest) -> Self {
        Self {
            n_groups: forest.n_groups(),
            base_score: forest.base_score().to_vec(),
            tree_groups: forest.tree_groups().to_vec(),
            trees: forest
                .trees_with_groups()
                .map(|(tree, _)| TreePayload::from(tree))
                .collect(),
        }
    }
}

impl ForestPayload {
    fn into_forest(self) -> Result<Forest, LoadError> {
        if self.tree_groups.len() != self.trees.len() {
            return Err(LoadError::Malformed(
                "tree group list does not match tree count".into(),
            ));
        }
        if self.base_score.len() != self.n_groups as usize {
            return Err(LoadError::Malformed(format!(
                "base score has {} entries for {} groups",
                self.base_score.len(),
                self.n_groups
            )));
        }
        let mut forest = Forest::new(self.n_groups).with_base_score(self.base_score);
        for (tree, group) in self.trees.into_iter().zip(self.tree_groups) {
            if group >= self.n_groups {
                return Err(LoadError::Malformed(format!(
                    "tree group {group} out of range"
                )));
            }
            forest.push_tree(tree.into_tree()?, group);
        }
        forest
            .validate()
            .map_err(|e| LoadError::Malformed(format!("invalid forest: {e:?}")))?;
        Ok(forest)
    }
}

impl From<&Model> for PayloadV1 {
    fn from(model: &Model) -> Self {
        Self {
            meta: model.meta().clone(),
            config: model.config().clone(),
            forest: ForestPayload::from(model.forest()),
            vocabs: model
                .vocabs()
                .iter()
                .map(|v| v.names().to_vec())
                .collect(),
        }
    }
}

impl PayloadV1 {
    pub(crate) fn into_model(self) -> Result<Model, LoadError> {
        if self.meta.feature_names.len() != self.meta.n_features
            || self.meta.feature_types.len() != self.meta.n_features
            || self.vocabs.len() != self.meta.n_features
        {
            return Err(LoadError::Malformed(
                "feature metadata lengths disagree".into(),
            ));
        }
        let forest = self.forest.into_forest()?;
        let vocabs = self
            .vocabs
            .into_iter()
            .map(CategoryVocab::from_names)
            .collect();
        Ok(Model::from_parts(forest, self.meta, self.config, vocabs))
    }
}
