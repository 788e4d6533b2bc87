use crate::error::CoreError;
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use std::collections::HashSet;

/// An immutable dates x assets panel of daily returns.
///
/// Rows are trading days in strictly increasing date order, columns are
/// uniquely named assets and every value is finite. These invariants are
/// checked once at construction so the simulator never has to re-validate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    values: DMatrix<f64>,
}

impl ReturnSeries {
    /// Builds a series from a date index, asset names and a matrix whose rows
    /// line up with `dates` and whose columns line up with `assets`.
    pub fn new(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        values: DMatrix<f64>,
    ) -> Result<Self, CoreError> {
        if assets.is_empty() {
            return Err(CoreError::InvalidInput(
                "assets".to_string(),
                "a return series needs at least one asset".to_string(),
            ));
        }
        if values.nrows() != dates.len() || values.ncols() != assets.len() {
            return Err(CoreError::ShapeMismatch {
                expected_rows: dates.len(),
                expected_cols: assets.len(),
                found_rows: values.nrows(),
                found_cols: values.ncols(),
            });
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for asset in &assets {
            if !seen.insert(asset.as_str()) {
                return Err(CoreError::InvalidInput(
                    "assets".to_string(),
                    format!("duplicate asset identifier '{}'", asset),
                ));
            }
        }

        if let Some(pair) = dates.windows(2).find(|w| w[1] <= w[0]) {
            return Err(CoreError::InvalidInput(
                "dates".to_string(),
                format!("dates must be strictly increasing ({} then {})", pair[0], pair[1]),
            ));
        }

        for row in 0..values.nrows() {
            for col in 0..values.ncols() {
                if !values[(row, col)].is_finite() {
                    return Err(CoreError::NonFinite {
                        row,
                        column: assets[col].clone(),
                    });
                }
            }
        }

        Ok(Self { dates, assets, values })
    }

    /// Convenience constructor from row-major nested vectors.
    pub fn from_rows(
        dates: Vec<NaiveDate>,
        assets: Vec<String>,
        rows: &[Vec<f64>],
    ) -> Result<Self, CoreError> {
        let ncols = assets.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(CoreError::ShapeMismatch {
                expected_rows: rows.len(),
                expected_cols: ncols,
                found_rows: rows.len(),
                found_cols: bad.len(),
            });
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let values = DMatrix::from_row_slice(rows.len(), ncols, &flat);
        Self::new(dates, assets, values)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Number of trading days.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// The returns of every asset on day `index`.
    pub fn row(&self, index: usize) -> DVector<f64> {
        self.values.row(index).transpose()
    }

    /// The `len` rows immediately preceding row `end` (exclusive), i.e. the
    /// trailing window that was fully observable before day `end` opened.
    ///
    /// # Panics
    ///
    /// Panics if `len > end` or `end > self.len()`.
    pub fn trailing_window(&self, end: usize, len: usize) -> DMatrix<f64> {
        self.values.rows(end - len, len).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn assets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trailing_window_excludes_current_day() {
        let series = ReturnSeries::from_rows(
            vec![day(1), day(2), day(3), day(4)],
            assets(&["A", "B"]),
            &[vec![0.1, 1.0], vec![0.2, 2.0], vec![0.3, 3.0], vec![0.4, 4.0]],
        )
        .unwrap();

        let window = series.trailing_window(3, 2);
        assert_eq!(window.nrows(), 2);
        assert_eq!(window[(0, 0)], 0.2);
        assert_eq!(window[(1, 1)], 3.0);
        assert_eq!(series.row(3)[1], 4.0);
    }

    #[test]
    fn test_rejects_duplicate_assets() {
        let err = ReturnSeries::from_rows(vec![day(1)], assets(&["A", "A"]), &[vec![0.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(..)));
    }

    #[test]
    fn test_rejects_unsorted_dates() {
        let err = ReturnSeries::from_rows(
            vec![day(2), day(1)],
            assets(&["A"]),
            &[vec![0.0], vec![0.0]],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(..)));
    }

    #[test]
    fn test_rejects_missing_values() {
        let err = ReturnSeries::from_rows(
            vec![day(1), day(2)],
            assets(&["A", "B"]),
            &[vec![0.0, 0.1], vec![f64::NAN, 0.2]],
        )
        .unwrap_err();
        assert_eq!(err, CoreError::NonFinite { row: 1, column: "A".to_string() });
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = ReturnSeries::from_rows(
            vec![day(1), day(2)],
            assets(&["A", "B"]),
            &[vec![0.0, 0.1], vec![0.2]],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ShapeMismatch { .. }));
    }
}
