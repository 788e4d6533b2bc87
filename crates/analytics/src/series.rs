//! Series helpers shared by the engine and the report exporters.

use crate::error::AnalyticsError;
use core_types::TRADING_DAYS_PER_YEAR;

pub use core_types::stats::{mean, population_std};

/// Unbiased standard deviation (divides by `n - 1`). `None` below two points.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// The `q`-th percentile (0..=100), interpolating linearly between the two
/// closest order statistics. `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (sorted.len() - 1) as f64 * (q / 100.0).clamp(0.0, 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Growth of one unit: the running product of `1 + r`.
pub fn cumulative_growth(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |growth, r| {
            *growth *= 1.0 + r;
            Some(*growth)
        })
        .collect()
}

/// `growth / running_peak - 1` for every day; always `<= 0`.
///
/// The running peak starts at the first day's growth, not at 1.
pub fn drawdown_curve(returns: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    cumulative_growth(returns)
        .into_iter()
        .map(|growth| {
            peak = peak.max(growth);
            growth / peak - 1.0
        })
        .collect()
}

/// Annualized volatility over a trailing `window`, one value per day.
///
/// Days before the window is full are `None`. Uses the unbiased standard
/// deviation, like a pandas rolling window.
pub fn rolling_volatility(returns: &[f64], window: usize) -> Result<Vec<Option<f64>>, AnalyticsError> {
    if window < 2 {
        return Err(AnalyticsError::InvalidWindow(window));
    }
    let annualizer = TRADING_DAYS_PER_YEAR.sqrt();
    Ok((0..returns.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                sample_std(&returns[i + 1 - window..=i]).map(|s| s * annualizer)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolates_between_order_statistics() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_relative_eq!(percentile(&values, 5.0).unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(percentile(&values, 50.0).unwrap(), 3.0, epsilon = 1e-12);
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        assert_eq!(percentile(&[], 5.0), None);
    }

    #[test]
    fn test_std_flavours() {
        let values = [1.0, 3.0];
        assert_relative_eq!(population_std(&values), 1.0, epsilon = 1e-12);
        assert_relative_eq!(sample_std(&values).unwrap(), 2f64.sqrt(), epsilon = 1e-12);
        assert_eq!(sample_std(&[1.0]), None);
    }

    #[test]
    fn test_drawdown_curve_tracks_running_peak() {
        let dd = drawdown_curve(&[0.10, -0.10, 0.05]);
        assert_relative_eq!(dd[0], 0.0);
        assert_relative_eq!(dd[1], -0.10, epsilon = 1e-12);
        assert_relative_eq!(dd[2], 0.9 * 1.05 - 1.0, epsilon = 1e-12);
        assert!(dd.iter().all(|&d| d <= 0.0));
    }

    #[test]
    fn test_rolling_volatility_waits_for_full_window() {
        let returns = [0.01, -0.01, 0.01, -0.01];
        let rolling = rolling_volatility(&returns, 3).unwrap();
        assert_eq!(rolling[0], None);
        assert_eq!(rolling[1], None);
        let expected = sample_std(&[0.01, -0.01, 0.01]).unwrap() * 252f64.sqrt();
        assert_relative_eq!(rolling[2].unwrap(), expected, epsilon = 1e-12);
        assert!(rolling_volatility(&returns, 1).is_err());
    }
}
