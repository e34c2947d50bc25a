//! Canonical model representation: SoA trees and forests.

mod categories;
mod forest;
mod node;
mod tree;

pub use categories::{float_to_category, CategoriesStorage, CategorySegment};
pub use forest::{Forest, ForestValidationError};
pub use node::SplitType;
pub use tree::{Tree, TreeArrays, TreeValidationError};

/// Node index within a single tree (0 = root).
pub type NodeId = u32;
