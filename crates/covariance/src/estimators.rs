use crate::error::CovarianceError;
use crate::psd::ensure_psd;
use configuration::CovarianceSettings;
use core_types::CovarianceMethod;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Arithmetic mean of every column of `window`.
pub fn mean_returns(window: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        window.ncols(),
        (0..window.ncols()).map(|j| window.column(j).mean()),
    )
}

/// Unbiased (n - 1) sample covariance of the columns of `window`.
///
/// A window with fewer than two rows has no unbiased estimate; it yields the
/// zero matrix, which the PSD floor later turns into `floor * I`.
pub fn sample_covariance(window: &DMatrix<f64>) -> DMatrix<f64> {
    let (rows, cols) = window.shape();
    if rows < 2 {
        return DMatrix::zeros(cols, cols);
    }

    let means = mean_returns(window);
    let mut centered = window.clone();
    for (j, mean) in means.iter().enumerate() {
        centered.column_mut(j).add_scalar_mut(-mean);
    }

    (centered.transpose() * &centered) / (rows as f64 - 1.0)
}

/// Exponentially weighted covariance with decay `lambda`.
///
/// The recursion `C = lambda * C + (1 - lambda) * r r'` starts from zero and
/// runs over every row of the window in order. Nothing is carried between
/// calls, so two overlapping windows are estimated independently.
pub fn ewma_covariance(window: &DMatrix<f64>, lambda: f64) -> DMatrix<f64> {
    let cols = window.ncols();
    let mut cov = DMatrix::zeros(cols, cols);
    for row in window.row_iter() {
        let r = row.transpose();
        cov = cov * lambda + (&r * r.transpose()) * (1.0 - lambda);
    }
    cov
}

/// Convex blend `(1 - intensity) * sample + intensity * prior`.
///
/// Without an explicit prior the diagonal of the sample covariance is used,
/// which shrinks every off-diagonal term toward zero.
pub fn shrinkage_covariance(
    window: &DMatrix<f64>,
    intensity: f64,
    prior: Option<&DMatrix<f64>>,
) -> Result<DMatrix<f64>, CovarianceError> {
    let sample = sample_covariance(window);
    let prior = match prior {
        Some(p) if p.shape() != sample.shape() => {
            return Err(CovarianceError::InvalidConfiguration(format!(
                "shrinkage prior is {}x{} but the sample covariance is {}x{}",
                p.nrows(),
                p.ncols(),
                sample.nrows(),
                sample.ncols()
            )));
        }
        Some(p) => p.clone(),
        None => DMatrix::from_diagonal(&sample.diagonal()),
    };

    Ok(sample * (1.0 - intensity) + prior * intensity)
}

/// A validated covariance method together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CovarianceEstimator {
    method: CovarianceMethod,
    settings: CovarianceSettings,
}

impl CovarianceEstimator {
    /// Creates a new estimator, rejecting parameters outside their domain.
    pub fn new(
        method: CovarianceMethod,
        settings: CovarianceSettings,
    ) -> Result<Self, CovarianceError> {
        if !(settings.ewma_lambda > 0.0 && settings.ewma_lambda < 1.0) {
            return Err(CovarianceError::InvalidConfiguration(format!(
                "ewma lambda must lie in (0, 1), got {}",
                settings.ewma_lambda
            )));
        }
        if !(0.0..=1.0).contains(&settings.shrinkage_intensity) {
            return Err(CovarianceError::InvalidConfiguration(format!(
                "shrinkage intensity must lie in [0, 1], got {}",
                settings.shrinkage_intensity
            )));
        }
        if !(settings.psd_floor > 0.0) {
            return Err(CovarianceError::InvalidConfiguration(format!(
                "psd floor must be positive, got {}",
                settings.psd_floor
            )));
        }
        Ok(Self { method, settings })
    }

    /// Resolves the method by name. Unknown names are a configuration error.
    pub fn from_name(name: &str, settings: CovarianceSettings) -> Result<Self, CovarianceError> {
        let method = name.parse::<CovarianceMethod>().map_err(|_| {
            CovarianceError::InvalidConfiguration(format!("Unknown covariance estimator: {}", name))
        })?;
        Self::new(method, settings)
    }

    pub fn method(&self) -> CovarianceMethod {
        self.method
    }

    /// Estimates the covariance of `window` and projects it onto the PSD cone.
    pub fn estimate(&self, window: &DMatrix<f64>) -> Result<DMatrix<f64>, CovarianceError> {
        if window.nrows() == 0 || window.ncols() == 0 {
            return Err(CovarianceError::EmptyWindow {
                rows: window.nrows(),
                cols: window.ncols(),
            });
        }

        let raw = match self.method {
            CovarianceMethod::Sample => sample_covariance(window),
            CovarianceMethod::Ewma => ewma_covariance(window, self.settings.ewma_lambda),
            CovarianceMethod::Shrinkage => {
                shrinkage_covariance(window, self.settings.shrinkage_intensity, None)?
            }
        };

        debug!(
            method = %self.method,
            rows = window.nrows(),
            assets = window.ncols(),
            "Estimated covariance."
        );
        Ok(ensure_psd(&raw, self.settings.psd_floor))
    }
}

/// One-shot estimate with the method given by name.
pub fn estimate(
    window: &DMatrix<f64>,
    method: &str,
    settings: &CovarianceSettings,
) -> Result<DMatrix<f64>, CovarianceError> {
    CovarianceEstimator::from_name(method, settings.clone())?.estimate(window)
}
