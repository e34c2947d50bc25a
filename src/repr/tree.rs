//! Structure-of-Arrays tree storage for cache-friendly traversal.

// Trees carry all their parallel arrays through one constructor.
#![allow(clippy::too_many_arguments)]

use super::categories::{float_to_category, CategoriesStorage};
use super::node::SplitType;
use super::NodeId;

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    ChildOutOfBounds { node: NodeId, child: NodeId, n_nodes: usize },
    /// A node was reached by more than one path, or a cycle exists.
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    UnreachableNode { node: NodeId },
    /// Categorical splits exist but segments are not indexed by node.
    CategoricalSegmentsLenMismatch { segments_len: usize, n_nodes: usize },
    /// A category segment points past the end of the word array.
    CategorySegmentOutOfBounds {
        node: NodeId,
        start: u32,
        n_words: u32,
        words_len: usize,
    },
}

/// Immutable decision tree stored as parallel arrays.
///
/// Child indices are local to this tree (0 = root). Leaf nodes carry their
/// value in `leaf_values`; split arrays hold zeros there.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    split_types: Box<[SplitType]>,
    categories: CategoriesStorage,
}

impl Tree {
    /// Create a tree from parallel arrays.
    ///
    /// All arrays must have the same length. For trees without categorical
    /// splits, pass `SplitType::Numeric` everywhere and
    /// `CategoriesStorage::empty()`.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
        split_types: Vec<SplitType>,
        categories: CategoriesStorage,
    ) -> Self {
        let n_nodes = split_indices.len();
        debug_assert_eq!(n_nodes, split_thresholds.len());
        debug_assert_eq!(n_nodes, left_children.len());
        debug_assert_eq!(n_nodes, right_children.len());
        debug_assert_eq!(n_nodes, default_left.len());
        debug_assert_eq!(n_nodes, is_leaf.len());
        debug_assert_eq!(n_nodes, leaf_values.len());
        debug_assert_eq!(n_nodes, split_types.len());

        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            split_types: split_types.into_boxed_slice(),
            categories,
        }
    }

    /// A single-leaf tree.
    pub fn leaf(value: f32) -> Self {
        Self::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![false],
            vec![true],
            vec![value],
            vec![SplitType::Numeric],
            CategoriesStorage::empty(),
        )
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    /// Check if a node is a leaf.
    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    /// Feature index tested at a split node.
    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    /// Threshold of a numeric split node.
    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    /// Left child index.
    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    /// Right child index.
    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    /// Default direction for missing values.
    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    /// Split type of a node.
    #[inline]
    pub fn split_type(&self, node: NodeId) -> SplitType {
        self.split_types[node as usize]
    }

    /// Leaf value at a leaf node.
    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Category storage for categorical splits.
    pub fn categories(&self) -> &CategoriesStorage {
        &self.categories
    }

    /// Raw parallel arrays, for serialization.
    pub fn arrays(&self) -> TreeArrays<'_> {
        TreeArrays {
            split_indices: &self.split_indices,
            split_thresholds: &self.split_thresholds,
            left_children: &self.left_children,
            right_children: &self.right_children,
            default_left: &self.default_left,
            is_leaf: &self.is_leaf,
            leaf_values: &self.leaf_values,
            split_types: &self.split_types,
        }
    }

    /// Traverse from the root to a leaf for one sample.
    ///
    /// `feature` returns the encoded value of a feature index; `f32::NAN`
    /// marks missing values, which follow the node's default direction.
    /// Categorical values are training-space category codes.
    #[inline]
    pub fn traverse_to_leaf<F: Fn(usize) -> f32>(&self, feature: F) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let fvalue = feature(self.split_index(node) as usize);

            node = if fvalue.is_nan() {
                if self.default_left(node) {
                    self.left_child(node)
                } else {
                    self.right_child(node)
                }
            } else {
                match self.split_type(node) {
                    SplitType::Numeric => {
                        if fvalue < self.split_threshold(node) {
                            self.left_child(node)
                        } else {
                            self.right_child(node)
                        }
                    }
                    SplitType::Categorical => {
                        let category = float_to_category(fvalue);
                        if self.categories.category_goes_right(node, category) {
                            self.right_child(node)
                        } else {
                            self.left_child(node)
                        }
                    }
                }
            };
        }

        node
    }

    /// Validate basic structural invariants.
    ///
    /// Intended for debug checks, tests, and the model load path.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let has_cat_split = self
            .split_types
            .iter()
            .any(|t| matches!(t, SplitType::Categorical));
        if has_cat_split {
            let segments_len = self.categories.segments().len();
            if segments_len > n_nodes {
                return Err(TreeValidationError::CategoricalSegmentsLenMismatch {
                    segments_len,
                    n_nodes,
                });
            }
        }
        let words_len = self.categories.words().len();
        for (node, segment) in self.categories.segments().iter().enumerate() {
            let end = segment.start as usize + segment.n_words as usize;
            if end > words_len {
                return Err(TreeValidationError::CategorySegmentOutOfBounds {
                    node: node as NodeId,
                    start: segment.start,
                    n_words: segment.n_words,
                    words_len,
                });
            }
        }

        // Each node must be reached exactly once from the root.
        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            let idx = node as usize;
            if idx >= n_nodes {
                return Err(TreeValidationError::ChildOutOfBounds {
                    node,
                    child: node,
                    n_nodes,
                });
            }
            if visited[idx] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[idx] = true;
            if !self.is_leaf(node) {
                for child in [self.left_child(node), self.right_child(node)] {
                    if child as usize >= n_nodes {
                        return Err(TreeValidationError::ChildOutOfBounds {
                            node,
                            child,
                            n_nodes,
                        });
                    }
                    stack.push(child);
                }
            }
        }

        if let Some(node) = visited.iter().position(|v| !v) {
            return Err(TreeValidationError::UnreachableNode { node: node as NodeId });
        }

        Ok(())
    }
}

/// Borrowed view of a tree's parallel arrays.
#[derive(Debug, Clone, Copy)]
pub struct TreeArrays<'a> {
    pub split_indices: &'a [u32],
    pub split_thresholds: &'a [f32],
    pub left_children: &'a [u32],
    pub right_children: &'a [u32],
    pub default_left: &'a [bool],
    pub is_leaf: &'a [bool],
    pub leaf_values: &'a [f32],
    pub split_types: &'a [SplitType],
}

#[cfg(test)]
mod tests {
    use super::*;

    /// depth-1 tree: x0 < threshold -> left leaf, else right leaf.
    fn stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
        Tree::new(
            vec![feature, 0, 0],
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
    fn numeric_traversal() {
        let tree = stump(0, 0.5, 1.0, 2.0);
        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| 0.3)), 1.0);
        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| 0.7)), 2.0);
        // Boundary goes right.
        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| 0.5)), 2.0);
    }

    #[test]
    fn missing_uses_default_direction() {
        let tree = stump(0, 0.5, 1.0, 2.0);
        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| f32::NAN)), 1.0);
    }

    #[test]
    fn categorical_traversal() {
        let mut categories = CategoriesStorage::empty();
        categories.insert(0, &[1, 3], 5);
        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.0, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, -1.0, 1.0],
            vec![SplitType::Categorical, SplitType::Numeric, SplitType::Numeric],
            categories,
        );

        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| 1.0)), 1.0);
        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| 0.0)), -1.0);
        // Unseen category goes left.
        assert_eq!(tree.leaf_value(tree.traverse_to_leaf(|_| 9.0)), -1.0);
    }

    #[test]
    fn validate_accepts_stump() {
        assert!(stump(0, 0.5, 1.0, 2.0).validate().is_ok());
        assert!(Tree::leaf(0.25).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_bounds_child() {
        let tree = Tree::new(
            vec![0, 0],
            vec![0.5, 0.0],
            vec![1, 0],
            vec![7, 0], // out of bounds
            vec![true, false],
            vec![false, true],
            vec![0.0, 1.0],
            vec![SplitType::Numeric; 2],
            CategoriesStorage::empty(),
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::ChildOutOfBounds { child: 7, .. })
        ));
    }

    #[test]
    fn validate_rejects_truncated_category_words() {
        // Segment claims a word at offset 1000, but the word array is empty.
        let categories = CategoriesStorage::from_parts(
            vec![crate::repr::CategorySegment {
                start: 1000,
                n_words: 1,
            }],
            vec![],
        );
        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.0, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, -1.0, 1.0],
            vec![SplitType::Categorical, SplitType::Numeric, SplitType::Numeric],
            categories,
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::CategorySegmentOutOfBounds { start: 1000, .. })
        ));
    }

    #[test]
    fn validate_rejects_unreachable_node() {
        let tree = Tree::new(
            vec![0, 0, 0, 0],
            vec![0.5, 0.0, 0.0, 0.0],
            vec![1, 0, 0, 0],
            vec![2, 0, 0, 0],
            vec![true, false, false, false],
            vec![false, true, true, true],
            vec![0.0, 1.0, 2.0, 3.0], // node 3 unreachable
            vec![SplitType::Numeric; 4],
            CategoriesStorage::empty(),
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::UnreachableNode { node: 3 })
        ));
    }
}
