//! Pool container and builder.

use ndarray::{Array2, ArrayView2};

use super::error::PoolError;
use super::schema::{FeatureMeta, PoolSchema};
use super::value::{Labels, RowValue};
use super::vocab::CategoryVocab;

/// A bundled dataset: feature records, labels, and categorical declarations.
///
/// # Storage Layout
///
/// Features are stored feature-major: `[n_features, n_samples]`, each
/// feature's values contiguous. Categorical strings are dictionary-encoded
/// into `f32` codes; the per-feature vocabularies are kept on the pool and
/// copied into the trained model.
///
/// # Construction
///
/// Use [`Pool::from_rows`] for sample-major mixed rows with categorical
/// positions declared by index, or [`Pool::builder`] to add named columns.
///
/// ```
/// use crabboost::{row, Pool};
///
/// let pool = Pool::from_rows(
///     vec![row!["summer", 1924, 44], row!["winter", 1980, 37]],
///     &[0],
/// )
/// .unwrap()
/// .with_class_labels(["France", "USA"])
/// .unwrap();
///
/// assert_eq!(pool.n_samples(), 2);
/// assert_eq!(pool.n_features(), 3);
/// assert!(pool.has_categorical());
/// ```
#[derive(Debug, Clone)]
pub struct Pool {
    /// Encoded feature data: `[n_features, n_samples]`.
    features: Array2<f32>,
    /// Feature names and types.
    schema: PoolSchema,
    /// Category dictionary per feature (empty for numeric features).
    vocabs: Vec<CategoryVocab>,
    /// Attached labels.
    labels: Labels,
}

impl Pool {
    /// Build a pool from sample-major rows of mixed values.
    ///
    /// `cat_features` lists the column indices holding categorical values;
    /// every other column must be numeric. Column names are synthesized as
    /// `f0..fN`; use [`Pool::builder`] when names matter.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] for empty input, ragged rows, out-of-range
    /// categorical indices, or string values in numeric columns.
    pub fn from_rows(rows: Vec<Vec<RowValue>>, cat_features: &[usize]) -> Result<Self, PoolError> {
        if rows.is_empty() {
            return Err(PoolError::EmptyRows);
        }
        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(PoolError::EmptyFeatures);
        }
        for &idx in cat_features {
            if idx >= n_features {
                return Err(PoolError::CatIndexOutOfRange {
                    index: idx,
                    n_features,
                });
            }
        }
        for (i, r) in rows.iter().enumerate() {
            if r.len() != n_features {
                return Err(PoolError::RaggedRow {
                    row: i,
                    expected: n_features,
                    got: r.len(),
                });
            }
        }

        let n_samples = rows.len();
        let mut features = Array2::zeros((n_features, n_samples));
        let mut vocabs = vec![CategoryVocab::new(); n_features];
        let mut metas = Vec::with_capacity(n_features);

        for col in 0..n_features {
            let is_cat = cat_features.contains(&col);
            metas.push(if is_cat {
                FeatureMeta::categorical(format!("f{col}"))
            } else {
                FeatureMeta::numeric(format!("f{col}"))
            });

            for (s, r) in rows.iter().enumerate() {
                let encoded = match (&r[col], is_cat) {
                    // Missing stays missing, it never becomes a category.
                    (RowValue::Num(v), true) if v.is_nan() => f32::NAN,
                    (value, true) => vocabs[col].insert(&value.category_key()) as f32,
                    (RowValue::Num(v), false) => *v,
                    (RowValue::Str(_), false) => {
                        return Err(PoolError::StringInNumericColumn { row: s, column: col })
                    }
                };
                features[[col, s]] = encoded;
            }
        }

        Ok(Self {
            features,
            schema: PoolSchema::from_features(metas),
            vocabs,
            labels: Labels::None,
        })
    }

    /// Create a builder for named, column-wise construction.
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }

    // =========================================================================
    // Label attachment
    // =========================================================================

    /// Attach scalar regression labels.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShapeMismatch`] if the label count differs from
    /// the sample count.
    pub fn with_labels(mut self, labels: impl Into<Vec<f32>>) -> Result<Self, PoolError> {
        let labels = labels.into();
        self.check_label_len(labels.len())?;
        self.labels = Labels::Float(labels);
        Ok(self)
    }

    /// Attach class labels; the distinct values become the label domain.
    pub fn with_class_labels<I, S>(mut self, labels: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.check_label_len(labels.len())?;
        self.labels = Labels::Class(labels);
        Ok(self)
    }

    /// Attach interval labels `(lower, upper)`.
    ///
    /// Use `f32::INFINITY` as the upper bound for right-censored samples.
    pub fn with_interval_labels(
        mut self,
        labels: impl Into<Vec<(f32, f32)>>,
    ) -> Result<Self, PoolError> {
        let labels = labels.into();
        self.check_label_len(labels.len())?;
        self.labels = Labels::Interval(labels);
        Ok(self)
    }

    fn check_label_len(&self, got: usize) -> Result<(), PoolError> {
        if got != self.n_samples() {
            return Err(PoolError::ShapeMismatch {
                field: "labels",
                expected: self.n_samples(),
                got,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    /// Feature names and types.
    pub fn schema(&self) -> &PoolSchema {
        &self.schema
    }

    /// True if any feature is categorical.
    pub fn has_categorical(&self) -> bool {
        self.schema.has_categorical()
    }

    /// Encoded feature matrix, `[n_features, n_samples]`.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Attached labels.
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Category dictionary for feature `idx` (empty for numeric features).
    pub fn vocab(&self, idx: usize) -> &CategoryVocab {
        &self.vocabs[idx]
    }

    /// All category dictionaries in column order.
    pub fn vocabs(&self) -> &[CategoryVocab] {
        &self.vocabs
    }

    /// Category count per feature (0 for numeric features).
    pub fn cat_cardinality(&self) -> Vec<u32> {
        self.vocabs.iter().map(|v| v.len() as u32).collect()
    }
}

/// Builder for column-wise pool construction with explicit names.
///
/// ```
/// use crabboost::Pool;
///
/// let pool = Pool::builder()
///     .add_feature("age", vec![25.0, 30.0, 35.0])
///     .add_categorical("color", ["red", "blue", "red"])
///     .labels(vec![0.0, 1.0, 0.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.n_features(), 2);
/// assert_eq!(pool.schema().feature_name(1), "color");
/// ```
#[derive(Debug, Default)]
pub struct PoolBuilder {
    columns: Vec<(FeatureMeta, ColumnData)>,
    labels: Labels,
}

#[derive(Debug)]
enum ColumnData {
    Num(Vec<f32>),
    Cat(Vec<String>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            Self::Num(v) => v.len(),
            Self::Cat(v) => v.len(),
        }
    }
}

impl PoolBuilder {
    /// Add a numeric feature column.
    pub fn add_feature(mut self, name: impl Into<String>, values: impl Into<Vec<f32>>) -> Self {
        self.columns
            .push((FeatureMeta::numeric(name), ColumnData::Num(values.into())));
        self
    }

    /// Add a categorical feature column of raw category strings.
    pub fn add_categorical<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.columns
            .push((FeatureMeta::categorical(name), ColumnData::Cat(values)));
        self
    }

    /// Set scalar regression labels.
    pub fn labels(mut self, labels: impl Into<Vec<f32>>) -> Self {
        self.labels = Labels::Float(labels.into());
        self
    }

    /// Set class labels.
    pub fn class_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Labels::Class(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Set interval labels `(lower, upper)`.
    pub fn interval_labels(mut self, labels: impl Into<Vec<(f32, f32)>>) -> Self {
        self.labels = Labels::Interval(labels.into());
        self
    }

    /// Build the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] if no columns were added, column lengths
    /// disagree, or the label count differs from the sample count.
    pub fn build(self) -> Result<Pool, PoolError> {
        if self.columns.is_empty() {
            return Err(PoolError::EmptyFeatures);
        }
        let n_samples = self.columns[0].1.len();
        if n_samples == 0 {
            return Err(PoolError::EmptyRows);
        }
        for (_, data) in &self.columns {
            if data.len() != n_samples {
                return Err(PoolError::ShapeMismatch {
                    field: "features",
                    expected: n_samples,
                    got: data.len(),
                });
            }
        }
        if let Some(got) = self.labels.len() {
            if got != n_samples {
                return Err(PoolError::ShapeMismatch {
                    field: "labels",
                    expected: n_samples,
                    got,
                });
            }
        }

        let n_features = self.columns.len();
        let mut features = Array2::zeros((n_features, n_samples));
        let mut vocabs = vec![CategoryVocab::new(); n_features];
        let mut metas = Vec::with_capacity(n_features);

        for (col, (meta, data)) in self.columns.into_iter().enumerate() {
            match data {
                ColumnData::Num(values) => {
                    for (s, v) in values.into_iter().enumerate() {
                        features[[col, s]] = v;
                    }
                }
                ColumnData::Cat(values) => {
                    for (s, v) in values.into_iter().enumerate() {
                        features[[col, s]] = vocabs[col].insert(&v) as f32;
                    }
                }
            }
            metas.push(meta);
        }

        Ok(Pool {
            features,
            schema: PoolSchema::from_features(metas),
            vocabs,
            labels: self.labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureType;
    use crate::row;

    #[test]
    fn from_rows_encodes_categories() {
        let pool = Pool::from_rows(
            vec![row!["a", "b", 1, 4], row!["a", "d", 4, 5], row!["c", "d", 30, 40]],
            &[0, 1],
        )
        .unwrap();

        assert_eq!(pool.n_samples(), 3);
        assert_eq!(pool.n_features(), 4);
        assert_eq!(pool.schema().categorical_indices(), vec![0, 1]);
        // First-appearance codes: a=0, c=1 in column 0; b=0, d=1 in column 1.
        assert_eq!(pool.features()[[0, 0]], 0.0);
        assert_eq!(pool.features()[[0, 2]], 1.0);
        assert_eq!(pool.features()[[1, 1]], 1.0);
        assert_eq!(pool.vocab(0).name(1), Some("c"));
        assert_eq!(pool.cat_cardinality(), vec![2, 2, 0, 0]);
    }

    #[test]
    fn from_rows_numeric_passthrough() {
        let pool = Pool::from_rows(vec![row![1, 4, 5, 6], row![30, 40, 50, 60]], &[]).unwrap();
        assert_eq!(pool.features()[[2, 1]], 50.0);
        assert!(!pool.has_categorical());
    }

    #[test]
    fn from_rows_integer_and_string_categories_agree() {
        let pool = Pool::from_rows(vec![row![3, 1.0], row!["3", 2.0]], &[0]).unwrap();
        assert_eq!(pool.features()[[0, 0]], pool.features()[[0, 1]]);
    }

    #[test]
    fn from_rows_rejects_string_in_numeric_column() {
        let err = Pool::from_rows(vec![row!["a", 1]], &[]).unwrap_err();
        assert!(matches!(err, PoolError::StringInNumericColumn { row: 0, column: 0 }));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let err = Pool::from_rows(vec![row![1, 2], row![1]], &[]).unwrap_err();
        assert!(matches!(err, PoolError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn from_rows_rejects_bad_cat_index() {
        let err = Pool::from_rows(vec![row![1, 2]], &[5]).unwrap_err();
        assert!(matches!(err, PoolError::CatIndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn label_length_is_checked() {
        let pool = Pool::from_rows(vec![row![1, 2], row![3, 4]], &[]).unwrap();
        let err = pool.clone().with_labels(vec![1.0]).unwrap_err();
        assert!(matches!(err, PoolError::ShapeMismatch { field: "labels", .. }));
        assert!(pool.with_labels(vec![1.0, 2.0]).is_ok());
    }

    #[test]
    fn builder_named_columns() {
        let pool = Pool::builder()
            .add_feature("year", vec![1924.0, 1980.0])
            .add_categorical("season", ["summer", "winter"])
            .class_labels(["France", "USA"])
            .build()
            .unwrap();

        assert_eq!(pool.schema().feature_name(0), "year");
        assert_eq!(pool.schema().feature_type(1), FeatureType::Categorical);
        assert_eq!(pool.labels().len(), Some(2));
    }

    #[test]
    fn builder_shape_mismatch() {
        let err = Pool::builder()
            .add_feature("x", vec![1.0, 2.0])
            .add_feature("y", vec![1.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, PoolError::ShapeMismatch { field: "features", .. }));
    }

    #[test]
    fn builder_empty_is_error() {
        assert!(matches!(
            Pool::builder().build().unwrap_err(),
            PoolError::EmptyFeatures
        ));
    }

    #[test]
    fn interval_labels_attach() {
        let pool = Pool::from_rows(vec![row![1.0], row![2.0]], &[])
            .unwrap()
            .with_interval_labels(vec![(5.0, 5.0), (7.0, f32::INFINITY)])
            .unwrap();
        assert_eq!(pool.labels().kind_name(), "interval");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn pool_is_send_sync() {
        assert_send_sync::<Pool>();
    }
}
