use nalgebra::{DMatrix, DVector};
use std::collections::VecDeque;

/// How many previous iterations are kept for extrapolation
const HISTORY: usize = 12;
/// Extrapolation only starts once this many samples are available
const MIN_SAMPLES: usize = 5;

struct Sample {
    error: DMatrix<f64>,
    fock: DMatrix<f64>,
}

/// Direct inversion in the iterative subspace. Extrapolates a fock matrix from previous
/// iterations such that the commutator error FDS - SDF is minimized.
pub(crate) struct Diis {
    previous_samples: VecDeque<Sample>,
}

impl Diis {
    pub fn new() -> Self {
        Self {
            previous_samples: VecDeque::with_capacity(HISTORY),
        }
    }

    /// Records a sample and returns the extrapolated fock matrix. Returns `None` if the
    /// subspace equations are singular, in which case the caller uses its own fock matrix.
    pub fn fock(&mut self, error: DMatrix<f64>, fock: DMatrix<f64>) -> Option<DMatrix<f64>> {
        self.previous_samples.push_front(Sample { error, fock });
        self.previous_samples.truncate(HISTORY);

        let n = self.previous_samples.len();
        if n < MIN_SAMPLES {
            return self
                .previous_samples
                .front()
                .map(|Sample { fock, .. }| fock.to_owned());
        }

        let matrix = DMatrix::from_fn(n + 1, n + 1, |i, j| match (i, j) {
            (i, j) if i == n && j == n => 0.0,
            (i, j) if i == n || j == n => -1.0,
            _ => self.previous_samples[j]
                .error
                .dot(&self.previous_samples[i].error),
        });

        let b = DVector::from_fn(n + 1, |i, _| if i == n { -1.0 } else { 0.0 });

        let solution = matrix.qr().solve(&b)?;
        if solution.iter().any(|x| !x.is_finite()) {
            return None;
        }

        Some(
            solution
                .iter()
                .take(n)
                .zip(&self.previous_samples)
                .map(|(&weight, sample)| weight * &sample.fock)
                .sum(),
        )
    }
}
