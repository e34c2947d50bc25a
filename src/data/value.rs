//! Cell values and label sequences.

/// A single cell in a mixed-type feature row.
///
/// Numeric cells hold an `f32` (use `f32::NAN` for missing values).
/// String cells are only valid in columns declared categorical.
///
/// The [`row!`](crate::row) macro builds a `Vec<RowValue>` from mixed
/// literals:
///
/// ```
/// use crabboost::row;
///
/// let r = row!["summer", 1924, 44.0];
/// assert_eq!(r.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// Numeric value.
    Num(f32),
    /// Categorical value.
    Str(String),
}

impl RowValue {
    /// The value as a category key.
    ///
    /// Numbers in categorical columns are keyed by their integer rendering
    /// when whole, so `3`, `3.0`, and `"3"` name the same category.
    pub(crate) fn category_key(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(v) if v.fract() == 0.0 && v.is_finite() => format!("{}", *v as i64),
            Self::Num(v) => format!("{v}"),
        }
    }
}

impl From<f32> for RowValue {
    fn from(v: f32) -> Self {
        Self::Num(v)
    }
}

impl From<f64> for RowValue {
    fn from(v: f64) -> Self {
        Self::Num(v as f32)
    }
}

impl From<i32> for RowValue {
    fn from(v: i32) -> Self {
        Self::Num(v as f32)
    }
}

impl From<i64> for RowValue {
    fn from(v: i64) -> Self {
        Self::Num(v as f32)
    }
}

impl From<u32> for RowValue {
    fn from(v: u32) -> Self {
        Self::Num(v as f32)
    }
}

impl From<&str> for RowValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for RowValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Build a feature row from mixed numeric and string literals.
#[macro_export]
macro_rules! row {
    ($($v:expr),* $(,)?) => {
        vec![$($crate::data::RowValue::from($v)),*]
    };
}

/// Label sequence attached to a [`Pool`](super::Pool).
///
/// The variant must match the loss function at training time: scalar floats
/// for regression, class labels for classification, interval bounds for
/// censored regression.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Labels {
    /// No labels (prediction-only pool).
    #[default]
    None,
    /// Scalar regression targets.
    Float(Vec<f32>),
    /// Class labels. The label domain is whatever strings appear here.
    Class(Vec<String>),
    /// Interval bounds `(lower, upper)`; `upper = f32::INFINITY` marks a
    /// right-censored observation.
    Interval(Vec<(f32, f32)>),
}

impl Labels {
    /// Number of labelled samples, or `None` when unlabelled.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::Float(v) => Some(v.len()),
            Self::Class(v) => Some(v.len()),
            Self::Interval(v) => Some(v.len()),
        }
    }

    /// True when no labels are attached.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Human-readable name of the label kind (for error messages).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Float(_) => "float",
            Self::Class(_) => "class",
            Self::Interval(_) => "interval",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_macro_mixes_types() {
        let r = row!["a", "b", 1, 4.0, 5, 6];
        assert_eq!(r[0], RowValue::Str("a".into()));
        assert_eq!(r[2], RowValue::Num(1.0));
        assert_eq!(r.len(), 6);
    }

    #[test]
    fn category_key_normalizes_whole_numbers() {
        assert_eq!(RowValue::Num(3.0).category_key(), "3");
        assert_eq!(RowValue::Str("3".into()).category_key(), "3");
        assert_eq!(RowValue::Num(3.5).category_key(), "3.5");
    }

    #[test]
    fn labels_len() {
        assert_eq!(Labels::None.len(), None);
        assert_eq!(Labels::Float(vec![1.0, 2.0]).len(), Some(2));
        assert_eq!(Labels::Class(vec!["a".into()]).len(), Some(1));
    }
}
