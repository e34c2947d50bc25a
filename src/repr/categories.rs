//! Packed per-node category sets for categorical splits.

use super::NodeId;

/// Convert a stored `f32` feature value to a category code.
///
/// Codes are non-negative integers stored as floats; anything negative after
/// rounding clamps to 0 (the traversal treats NaN separately, before this
/// conversion).
#[inline]
pub fn float_to_category(value: f32) -> u32 {
    let rounded = value.round();
    if rounded < 0.0 {
        0
    } else {
        rounded as u32
    }
}

/// Bitset segment for one node: offset and length into the shared word array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategorySegment {
    /// Start offset in words.
    pub start: u32,
    /// Number of `u32` words (0 means the node has no categorical split).
    pub n_words: u32,
}

/// Storage for all categorical splits of a tree.
///
/// Each categorical split node owns a bitset over training-time category
/// codes; a set bit routes the category right. Segments are indexed by node
/// id once any categorical split exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoriesStorage {
    segments: Vec<CategorySegment>,
    words: Vec<u32>,
}

impl CategoriesStorage {
    /// Storage with no categorical splits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no categorical split is stored.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Register the right-going category set for `node`.
    ///
    /// `n_categories` is the training-time cardinality of the split feature
    /// and sizes the bitset.
    pub fn insert(&mut self, node: NodeId, right_categories: &[u32], n_categories: u32) {
        let node = node as usize;
        if self.segments.len() <= node {
            self.segments.resize(node + 1, CategorySegment::default());
        }
        let n_words = n_categories.div_ceil(32);
        let start = self.words.len() as u32;
        self.words.extend(std::iter::repeat(0).take(n_words as usize));
        for &cat in right_categories {
            debug_assert!(cat < n_categories, "category out of range");
            let word = start as usize + (cat / 32) as usize;
            self.words[word] |= 1 << (cat % 32);
        }
        self.segments[node] = CategorySegment { start, n_words };
    }

    /// True if `category` is routed right at `node`.
    ///
    /// Categories beyond the stored bitset (unseen at training time) are not
    /// in the set and go left.
    #[inline]
    pub fn category_goes_right(&self, node: NodeId, category: u32) -> bool {
        let Some(segment) = self.segments.get(node as usize) else {
            return false;
        };
        let word_idx = category / 32;
        if word_idx >= segment.n_words {
            return false;
        }
        let word = self.words[(segment.start + word_idx) as usize];
        word & (1 << (category % 32)) != 0
    }

    /// Per-node segments (for serialization).
    pub fn segments(&self) -> &[CategorySegment] {
        &self.segments
    }

    /// Packed bitset words (for serialization).
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Rebuild storage from serialized parts.
    pub fn from_parts(segments: Vec<CategorySegment>, words: Vec<u32>) -> Self {
        Self { segments, words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_category_rounds_and_clamps() {
        assert_eq!(float_to_category(2.0), 2);
        assert_eq!(float_to_category(2.4), 2);
        assert_eq!(float_to_category(-1.0), 0);
    }

    #[test]
    fn insert_and_query() {
        let mut storage = CategoriesStorage::empty();
        storage.insert(0, &[1, 3], 6);

        assert!(!storage.category_goes_right(0, 0));
        assert!(storage.category_goes_right(0, 1));
        assert!(storage.category_goes_right(0, 3));
        assert!(!storage.category_goes_right(0, 5));
        // Unseen category beyond the bitset goes left.
        assert!(!storage.category_goes_right(0, 100));
        // Node without a categorical split goes left.
        assert!(!storage.category_goes_right(7, 1));
    }

    #[test]
    fn multiple_nodes_share_words() {
        let mut storage = CategoriesStorage::empty();
        storage.insert(2, &[0], 40);
        storage.insert(5, &[39], 40);

        assert!(storage.category_goes_right(2, 0));
        assert!(!storage.category_goes_right(2, 39));
        assert!(storage.category_goes_right(5, 39));
    }

    #[test]
    fn parts_roundtrip() {
        let mut storage = CategoriesStorage::empty();
        storage.insert(1, &[2, 4], 8);
        let rebuilt =
            CategoriesStorage::from_parts(storage.segments().to_vec(), storage.words().to_vec());
        assert_eq!(rebuilt, storage);
    }
}
