//! Per-feature category dictionaries.

use std::collections::HashMap;

/// Dictionary mapping category strings to dense `u32` codes.
///
/// Codes are assigned in first-appearance order, so encoding is deterministic
/// for a given input order. The trained model retains each categorical
/// feature's vocabulary to re-encode evaluation data; categories never seen
/// during training take the missing-value path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryVocab {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl CategoryVocab {
    /// Empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vocabulary from stored category names (load path).
    pub fn from_names(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as u32))
            .collect();
        Self { names, index }
    }

    /// Code for `name`, inserting it if unseen.
    pub fn insert(&mut self, name: &str) -> u32 {
        if let Some(&code) = self.index.get(name) {
            return code;
        }
        let code = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), code);
        code
    }

    /// Code for `name`, or `None` if unseen.
    pub fn code(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    /// Category name for `code`.
    pub fn name(&self, code: u32) -> Option<&str> {
        self.names.get(code as usize).map(String::as_str)
    }

    /// All category names in code order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when no categories are registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_first_appearance_codes() {
        let mut vocab = CategoryVocab::new();
        assert_eq!(vocab.insert("summer"), 0);
        assert_eq!(vocab.insert("winter"), 1);
        assert_eq!(vocab.insert("summer"), 0);
        assert_eq!(vocab.len(), 2);
    }

    #[test]
    fn from_names_roundtrip() {
        let mut vocab = CategoryVocab::new();
        vocab.insert("a");
        vocab.insert("b");
        let rebuilt = CategoryVocab::from_names(vocab.names().to_vec());
        assert_eq!(rebuilt, vocab);
        assert_eq!(rebuilt.code("b"), Some(1));
        assert_eq!(rebuilt.code("c"), None);
        assert_eq!(rebuilt.name(0), Some("a"));
    }
}
