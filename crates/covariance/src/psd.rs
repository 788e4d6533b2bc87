use nalgebra::{DMatrix, SymmetricEigen};

/// Projects `matrix` onto the symmetric matrices whose eigenvalues are all at
/// least `floor`.
///
/// The input is symmetrized first, eigendecomposed, its spectrum clipped from
/// below and the matrix rebuilt. The result is symmetrized once more so that
/// round-off in the reconstruction cannot leave it asymmetric.
pub fn ensure_psd(matrix: &DMatrix<f64>, floor: f64) -> DMatrix<f64> {
    let sym = symmetrize(matrix);
    let eigen = SymmetricEigen::new(sym);

    let clipped = eigen.eigenvalues.map(|v| v.max(floor));
    let rebuilt = &eigen.eigenvectors
        * DMatrix::from_diagonal(&clipped)
        * eigen.eigenvectors.transpose();

    symmetrize(&rebuilt)
}

fn symmetrize(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    (matrix + matrix.transpose()) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_indefinite_matrix_is_lifted_to_floor() {
        // Eigenvalues 3 and -1.
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let psd = ensure_psd(&m, 1e-6);

        let eig = SymmetricEigen::new(psd.clone());
        let min = eig.eigenvalues.min();
        let max = eig.eigenvalues.max();
        assert_relative_eq!(min, 1e-6, epsilon = 1e-12);
        assert_relative_eq!(max, 3.0, epsilon = 1e-12);
        assert_eq!(psd, psd.transpose());
    }

    #[test]
    fn test_well_conditioned_matrix_is_unchanged() {
        let m = DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]);
        let psd = ensure_psd(&m, 1e-6);
        assert_relative_eq!(psd, m, epsilon = 1e-14);
    }

    #[test]
    fn test_asymmetric_input_is_symmetrized() {
        let m = DMatrix::from_row_slice(2, 2, &[0.04, 0.0, 0.02, 0.09]);
        let psd = ensure_psd(&m, 1e-6);
        assert_relative_eq!(psd[(0, 1)], 0.01, epsilon = 1e-14);
        assert_eq!(psd[(0, 1)], psd[(1, 0)]);
    }
}
