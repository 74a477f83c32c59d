use std::time::{Duration, Instant};

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::error::{Error, Result};

/// Overlap eigenvalues below this mean the basis is (numerically) linearly dependent
const LINEAR_DEPENDENCE_CUTOFF: f64 = 1e-8;

pub(crate) fn eigs(matrix: DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let eigs = SymmetricEigen::new(matrix);
    (eigs.eigenvectors, eigs.eigenvalues)
}

pub(crate) fn sorted_eigs(matrix: DMatrix<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let (eigenvectors, eigenvalues) = eigs(matrix);

    let mut val_vec_pairs = eigenvalues
        .iter()
        .copied()
        .zip(eigenvectors.column_iter())
        .collect::<Vec<_>>();

    val_vec_pairs.sort_unstable_by(|(a, _), (b, _)| a.total_cmp(b));

    let (values, vectors): (Vec<_>, Vec<_>) = val_vec_pairs.into_iter().unzip();

    (
        DMatrix::from_columns(&vectors),
        DVector::from_column_slice(&values),
    )
}

/// Symmetric (Löwdin) orthogonalization matrix S^(-1/2)
pub(crate) fn compute_transformation_matrix(overlap: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let (u, eigenvalues) = eigs(overlap.clone());

    let smallest = eigenvalues.min();
    if smallest < LINEAR_DEPENDENCE_CUTOFF {
        return Err(Error::DegenerateGeometry(format!(
            "basis is linearly dependent (smallest overlap eigenvalue {smallest:e})"
        )));
    }

    let diagonal_inv_sqrt = DMatrix::from_diagonal(&eigenvalues.map(|f| f.sqrt().recip()));
    Ok(&u * (diagonal_inv_sqrt * &u.transpose()))
}

/// Orbitals diagonalizing `fock` in the orthogonalized basis, back transformed into the atomic
/// orbital basis. Columns are sorted by ascending orbital energy.
pub(crate) fn solve_roothaan(
    fock: &DMatrix<f64>,
    transform: &DMatrix<f64>,
) -> (DMatrix<f64>, DVector<f64>) {
    let transformed_fock = &transform.transpose() * (fock * transform);
    let (transformed_coefficients, orbital_energies) = sorted_eigs(transformed_fock);
    (transform * transformed_coefficients, orbital_energies)
}

/// Density of `n_occupied` orbitals, each holding a single electron
pub(crate) fn spin_density(coefficients: &DMatrix<f64>, n_occupied: usize) -> DMatrix<f64> {
    let occupied = coefficients.columns(0, n_occupied);
    &occupied * occupied.transpose()
}

pub(crate) fn rms(matrix: &DMatrix<f64>) -> f64 {
    if matrix.is_empty() {
        return 0.0;
    }
    (matrix.norm_squared() / matrix.len() as f64).sqrt()
}

/// Enforces an optional wall clock budget on an iterative calculation
pub(crate) struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        match self.limit {
            Some(limit) if self.start.elapsed() > limit => Err(Error::Timeout(limit)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    use crate::error::Error;

    use super::{compute_transformation_matrix, sorted_eigs, Deadline};

    #[test]
    fn eigenvalues_are_sorted() {
        let matrix = DMatrix::from_row_slice(3, 3, &[3.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 2.0]);
        let (_, values) = sorted_eigs(matrix);
        assert_eq!(values.as_slice(), &[-1.0, 2.0, 3.0]);
    }

    #[test]
    fn orthogonalizes_overlap() {
        let overlap = DMatrix::from_row_slice(2, 2, &[1.0, 0.6, 0.6, 1.0]);
        let transform = compute_transformation_matrix(&overlap).unwrap();
        let identity = &transform.transpose() * &overlap * &transform;
        assert_relative_eq!(identity, DMatrix::identity(2, 2), epsilon = 1e-12);
    }

    #[test]
    fn rejects_linearly_dependent_basis() {
        let overlap = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        assert!(matches!(
            compute_transformation_matrix(&overlap),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn deadline() {
        assert!(Deadline::start(None).check().is_ok());
        assert!(Deadline::start(Some(Duration::from_secs(3600))).check().is_ok());

        let expired = Deadline::start(Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(1));
        assert!(matches!(expired.check(), Err(Error::Timeout(_))));
    }
}
