//! Metric evaluation plumbing shared by training and callers.

use std::fmt;

/// A named metric value from one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    pub name: String,
    pub value: f64,
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// True if this value is strictly better than `other` under the
    /// metric's direction.
    pub fn is_better_than_value(&self, other: f64) -> bool {
        if self.higher_is_better {
            self.value > other
        } else {
            self.value < other
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}
