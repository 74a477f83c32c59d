use std::ops::Index;

use crate::basis::BasisFunction;

use super::Integrator;

/// An integral index used in the two-electron integrals of a basis set.
///
/// The index represents the four indices (x, y, z, w) used to calculate a two-electron integral:
///   int_{x,y,z,w} = int_{xy|zw} = <x y | z w>
///
/// Two-electron integrals are symmetric under x <-> y, z <-> w and (xy) <-> (zw). An index is
/// therefore stored in canonical order, x <= y, z <= w and pair(x, y) <= pair(z, w), which
/// reduces the number of unique integrals to roughly n^4 / 8.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct IntegralIndex(usize, usize, usize, usize);

impl IntegralIndex {
    /// Creates a new integral index with the given indices.
    pub(crate) const fn new(index: (usize, usize, usize, usize)) -> Self {
        let (i, j, k, l) = Self::correct_order(index);
        Self(i, j, k, l)
    }

    /// Returns the indices with the correct order, such that xy <= zw.
    #[inline(always)]
    const fn correct_order(
        (i, j, k, l): (usize, usize, usize, usize),
    ) -> (usize, usize, usize, usize) {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        let (k, l) = if k <= l { (k, l) } else { (l, k) };

        if pair(i, j) <= pair(k, l) {
            (i, j, k, l)
        } else {
            (k, l, i, j)
        }
    }

    /// Position of this index in the packed storage
    #[inline(always)]
    pub(crate) const fn linear(&self) -> usize {
        let &Self(i, j, k, l) = self;
        let ij = pair(i, j);
        let kl = pair(k, l);
        kl * (kl + 1) / 2 + ij
    }
}

/// Packs an ordered pair i <= j into a single index
#[inline(always)]
const fn pair(i: usize, j: usize) -> usize {
    j * (j + 1) / 2 + i
}

impl std::fmt::Display for IntegralIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let &Self(i, j, k, l) = self;
        write!(f, "({} {}|{} {})", i, j, k, l)
    }
}

/// An electron tensor representing electron-electron repulsion integrals between
/// four contracted Gaussian functions in a given basis set.
pub struct ElectronTensor {
    data: Vec<f64>,
    /// side length
    size: usize,
}

impl ElectronTensor {
    /// Computes the electron-electron repulsion integral of every unique combination of four
    /// basis functions. With the `rayon` feature, the integrals are evaluated in parallel.
    pub fn from_basis(
        basis: &[BasisFunction],
        integrator: &(impl Integrator<Function = BasisFunction> + Sync),
    ) -> Self {
        let n_basis = basis.len();
        let n_pairs = n_basis * (n_basis + 1) / 2;

        let mut to_compute = Vec::with_capacity(n_pairs * (n_pairs + 1) / 2);
        for l in 0..n_basis {
            for k in 0..=l {
                for j in 0..n_basis {
                    for i in 0..=j {
                        if pair(i, j) <= pair(k, l) {
                            to_compute.push(IntegralIndex(i, j, k, l));
                        }
                    }
                }
            }
        }
        to_compute.sort_unstable_by_key(IntegralIndex::linear);

        #[cfg(feature = "rayon")]
        let data = {
            use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

            to_compute
                .par_iter()
                .map(|index @ &IntegralIndex(x, y, z, w)| {
                    let integral = integrator
                        .electron_repulsion((&basis[x], &basis[y], &basis[z], &basis[w]));
                    log::trace!("ERI {index} = {integral:<1.8}");
                    integral
                })
                .collect::<Vec<_>>()
        };

        #[cfg(not(feature = "rayon"))]
        let data = to_compute
            .iter()
            .map(|index @ &IntegralIndex(x, y, z, w)| {
                let integral =
                    integrator.electron_repulsion((&basis[x], &basis[y], &basis[z], &basis[w]));
                log::trace!("ERI {index} = {integral:<1.8}");
                integral
            })
            .collect::<Vec<_>>();

        Self {
            data,
            size: n_basis,
        }
    }

    /// Number of basis functions along each axis
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Index<(usize, usize, usize, usize)> for ElectronTensor {
    type Output = f64;

    fn index(&self, index: (usize, usize, usize, usize)) -> &Self::Output {
        &self[IntegralIndex::new(index)]
    }
}

impl Index<IntegralIndex> for ElectronTensor {
    type Output = f64;

    fn index(&self, index: IntegralIndex) -> &Self::Output {
        &self.data[index.linear()]
    }
}
