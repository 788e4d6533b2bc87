//! Moments shared by the allocators and the analytics engine.

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`). Zero for an empty slice.
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std_divides_by_n() {
        assert!((population_std(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
        assert!((population_std(&[0.01, -0.01, 0.01, -0.01]) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_empty_slice_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std(&[]), 0.0);
        assert_eq!(population_std(&[4.2]), 0.0);
    }
}
