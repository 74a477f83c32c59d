use nalgebra::{DMatrix, Vector3};

use crate::{
    basis::{BasisFunction, BasisSet},
    error::Result,
    molecule::Molecule,
};

mod electron_tensor;
pub mod mmd;
pub(crate) mod utils;

pub use electron_tensor::ElectronTensor;

pub type DefaultIntegrator = mmd::McMurchieDavidson;

/// A point charge the electrons are attracted to. Positions are in bohr.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Nucleus {
    pub charge: f64,
    pub position: Vector3<f64>,
}

impl Nucleus {
    pub fn of_molecule(molecule: &Molecule) -> Vec<Self> {
        molecule
            .atoms()
            .iter()
            .map(|atom| Nucleus {
                charge: atom.nuclear_charge() as f64,
                position: atom.position_bohr(),
            })
            .collect()
    }
}

pub trait Integrator {
    type Function;

    /// Calculate the overlap integral between two basis functions.
    fn overlap(&self, functions: (&Self::Function, &Self::Function)) -> f64;

    /// Calculate the kinetic energy integral between two basis functions.
    fn kinetic(&self, functions: (&Self::Function, &Self::Function)) -> f64;

    /// Calculate the nuclear attraction integral between two basis functions and the nuclei of a quantum system.
    fn nuclear(&self, functions: (&Self::Function, &Self::Function), nuclei: &[Nucleus]) -> f64;

    /// Calculate the electron-electron repulsion integral between four basis functions.
    fn electron_repulsion(
        &self,
        functions: (
            &Self::Function,
            &Self::Function,
            &Self::Function,
            &Self::Function,
        ),
    ) -> f64;
}

/// Every integral over the atomic orbital basis of one molecule that a Hartree-Fock or
/// configuration interaction calculation needs.
pub struct AtomicIntegrals {
    pub overlap: DMatrix<f64>,
    /// kinetic energy plus nuclear attraction
    pub core_hamiltonian: DMatrix<f64>,
    pub electron: ElectronTensor,
}

impl AtomicIntegrals {
    pub fn compute(
        basis: &[BasisFunction],
        nuclei: &[Nucleus],
        integrator: &(impl Integrator<Function = BasisFunction> + Sync),
    ) -> Self {
        let overlap = compute_overlap_matrix(basis, integrator);
        log::trace!("overlap matrix: {overlap:0.4}");
        let kinetic = compute_kinetic_matrix(basis, integrator);
        log::trace!("kinetic matrix: {kinetic:0.4}");
        let nuclear = compute_nuclear_matrix(basis, nuclei, integrator);
        log::trace!("nuclear matrix: {nuclear:0.4}");
        let electron = ElectronTensor::from_basis(basis, integrator);

        Self {
            overlap,
            core_hamiltonian: kinetic + nuclear,
            electron,
        }
    }

    /// Places `basis_set` on the atoms of `molecule` and integrates with the default integrator
    pub fn for_molecule(molecule: &Molecule, basis_set: &BasisSet) -> Result<Self> {
        let basis = basis_set.basis_for(molecule.atoms())?;
        let nuclei = Nucleus::of_molecule(molecule);
        log::debug!(
            "{} basis functions of {} on {} nuclei",
            basis.len(),
            basis_set.name(),
            nuclei.len()
        );
        Ok(Self::compute(&basis, &nuclei, &DefaultIntegrator::default()))
    }

    pub fn n_basis(&self) -> usize {
        self.overlap.nrows()
    }
}

pub fn compute_overlap_matrix(
    basis: &[BasisFunction],
    integrator: &impl Integrator<Function = BasisFunction>,
) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| {
        let overlap_ij = integrator.overlap((&basis[i], &basis[j]));
        log::trace!("overlap ({i}{j}) = {overlap_ij}");
        overlap_ij
    })
}

pub fn compute_kinetic_matrix(
    basis: &[BasisFunction],
    integrator: &impl Integrator<Function = BasisFunction>,
) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| {
        let kinetic_ij = integrator.kinetic((&basis[i], &basis[j]));
        log::trace!("kinetic ({i}{j}) = {kinetic_ij}");
        kinetic_ij
    })
}

pub fn compute_nuclear_matrix(
    basis: &[BasisFunction],
    nuclei: &[Nucleus],
    integrator: &impl Integrator<Function = BasisFunction>,
) -> DMatrix<f64> {
    symmetric_matrix(basis.len(), |i, j| {
        let nuclear_ij = integrator.nuclear((&basis[i], &basis[j]), nuclei);
        log::trace!("nuclear ({i}{j}) = {nuclear_ij}");
        nuclear_ij
    })
}

#[inline(always)]
/// Create a symmetric, square matrix. Function is only run for upper triangle of the matrix
pub(crate) fn symmetric_matrix(
    n: usize,
    mut func: impl FnMut(usize, usize) -> f64,
) -> DMatrix<f64> {
    let m = DMatrix::from_fn(n, n, |i, j| if i <= j { func(i, j) } else { 0.0 });
    DMatrix::from_fn(n, n, |i, j| if i <= j { m[(i, j)] } else { m[(j, i)] })
}
