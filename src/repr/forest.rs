//! Canonical forest representation (collection of trees).

use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    TreeGroupsLenMismatch { n_trees: usize, len: usize },
    TreeGroupOutOfRange { tree_idx: usize, group: u32, n_groups: u32 },
    InvalidTree { tree_idx: usize, error: TreeValidationError },
}

/// Forest of decision trees.
///
/// Stores trees with their output-group assignments; multi-class models
/// train one tree per class per boosting round.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    base_score: Vec<f32>,
}

impl Forest {
    /// Create an empty forest with the given number of output groups.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    /// Set the base score for all groups.
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Self {
        debug_assert_eq!(base_score.len(), self.n_groups as usize);
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        debug_assert!(group < self.n_groups, "group out of range");
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    /// Base score per group.
    #[inline]
    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    /// A specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Tree group assignments.
    #[inline]
    pub fn tree_groups(&self) -> &[u32] {
        &self.tree_groups
    }

    /// Iterate over trees with their group assignments.
    pub fn trees_with_groups(&self) -> impl Iterator<Item = (&Tree, u32)> {
        self.trees
            .iter()
            .zip(self.tree_groups.iter())
            .map(|(t, &g)| (t, g))
    }

    /// Keep only the first `n_trees_per_group * n_groups` trees.
    ///
    /// Used when an eval set identifies a best iteration before the last.
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
        self.tree_groups.truncate(n_trees);
    }

    /// Validate structural invariants of trees and group assignments.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }
        if self.tree_groups.len() != self.trees.len() {
            return Err(ForestValidationError::TreeGroupsLenMismatch {
                n_trees: self.trees.len(),
                len: self.tree_groups.len(),
            });
        }
        for (i, &g) in self.tree_groups.iter().enumerate() {
            if g >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx: i,
                    group: g,
                    n_groups: self.n_groups,
                });
            }
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{CategoriesStorage, SplitType};

    fn stump(threshold: f32, left: f32, right: f32) -> Tree {
        Tree::new(
            vec![0, 0, 0],
            vec![threshold, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, left, right],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        )
    }

    #[test]
    fn push_and_iterate() {
        let mut forest = Forest::new(1).with_base_score(vec![0.5]);
        forest.push_tree(stump(0.5, 1.0, 2.0), 0);
        forest.push_tree(stump(0.5, 0.5, 1.5), 0);

        assert_eq!(forest.n_trees(), 2);
        assert_eq!(forest.base_score(), &[0.5]);
        let groups: Vec<u32> = forest.trees_with_groups().map(|(_, g)| g).collect();
        assert_eq!(groups, vec![0, 0]);
    }

    #[test]
    fn validate_catches_bad_group() {
        let mut forest = Forest::new(2);
        forest.trees.push(stump(0.5, 1.0, 2.0));
        forest.tree_groups.push(5);
        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::TreeGroupOutOfRange { group: 5, .. })
        ));
    }

    #[test]
    fn truncate_drops_later_trees() {
        let mut forest = Forest::new(1);
        forest.push_tree(stump(0.5, 1.0, 2.0), 0);
        forest.push_tree(stump(0.5, 0.5, 1.5), 0);
        forest.truncate(1);
        assert_eq!(forest.n_trees(), 1);
        assert!(forest.validate().is_ok());
    }
}
