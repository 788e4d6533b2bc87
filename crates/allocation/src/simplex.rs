use nalgebra::DVector;

/// Tolerance on `|sum(w) - 1|` under which a non-negative vector is already
/// considered to lie on the simplex.
pub const SIMPLEX_TOLERANCE: f64 = 1e-8;

/// Uniform weights `1/n`.
pub fn equal_weight(n_assets: usize) -> DVector<f64> {
    DVector::from_element(n_assets, 1.0 / n_assets as f64)
}

/// Returns `true` if `w` is non-negative and sums to one within tolerance.
pub fn is_on_simplex(w: &DVector<f64>) -> bool {
    w.iter().all(|&x| x >= 0.0) && (w.sum() - 1.0).abs() < SIMPLEX_TOLERANCE
}

/// Euclidean projection onto the probability simplex `{w >= 0, sum(w) = 1}`.
///
/// Sort-and-threshold: sort descending, find the last index `rho` where
/// `v[rho] * (rho + 1) > cumsum[rho] - 1`, derive `theta` from that partial sum
/// and clip `w - theta` at zero. Points already on the simplex come back
/// untouched, which makes the projection idempotent.
pub fn project_to_simplex(w: &DVector<f64>) -> DVector<f64> {
    if w.is_empty() || is_on_simplex(w) {
        return w.clone();
    }

    let mut sorted: Vec<f64> = w.iter().copied().collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (k, &v) in sorted.iter().enumerate() {
        cumulative += v;
        let candidate = (cumulative - 1.0) / (k as f64 + 1.0);
        if v > candidate {
            theta = candidate;
        }
    }

    w.map(|x| (x - theta).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_of_simplex_point_is_identity() {
        let w = DVector::from_vec(vec![0.2, 0.3, 0.5]);
        assert_eq!(project_to_simplex(&w), w);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let w = DVector::from_vec(vec![1.7, -0.4, 0.3, 0.05]);
        let once = project_to_simplex(&w);
        let twice = project_to_simplex(&once);
        assert_eq!(once, twice);
        assert_relative_eq!(once.sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_clips_dominated_entries() {
        // theta = (2 + 1 - 1) / 2 = 1 -> [1, 0, 0]
        let w = DVector::from_vec(vec![2.0, 1.0, -3.0]);
        let p = project_to_simplex(&w);
        assert_relative_eq!(p, DVector::from_vec(vec![1.0, 0.0, 0.0]), epsilon = 1e-15);
    }

    #[test]
    fn test_projection_shifts_uniformly_when_interior() {
        let w = DVector::from_vec(vec![0.5, 0.5, 0.5, 0.5]);
        let p = project_to_simplex(&w);
        assert_relative_eq!(p, equal_weight(4), epsilon = 1e-15);
    }

    #[test]
    fn test_equal_weight_sums_to_one() {
        assert_relative_eq!(equal_weight(7).sum(), 1.0, epsilon = 1e-12);
    }
}
