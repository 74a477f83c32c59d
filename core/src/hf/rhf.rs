use nalgebra::DMatrix;

use crate::{
    diis::Diis,
    error::{Error, Result},
    integrals::{symmetric_matrix, ElectronTensor},
};

use super::{utils, HartreeFockInput};

/// The output of a restricted hartree fock calculation
#[derive(Debug)]
#[non_exhaustive]
pub struct RestrictedHartreeFockOutput {
    /// the orbital energies that were found in this hartree fock calculation, sorted in
    /// ascending order
    pub orbital_energies: Vec<f64>,
    /// molecular orbital coefficients, one column per orbital in the order of `orbital_energies`
    pub coefficients: DMatrix<f64>,
    /// The electronic energy of the system
    pub electronic_energy: f64,
    /// The nuclear repulsion energy
    pub nuclear_repulsion: f64,
    /// After how many iterations did the system converge
    pub iterations: usize,
}

impl RestrictedHartreeFockOutput {
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }
}

pub fn restricted_hartree_fock(input: &HartreeFockInput) -> Result<RestrictedHartreeFockOutput> {
    let molecule = input.molecule;
    if !molecule.is_closed_shell() {
        return Err(Error::InvalidMolecule(format!(
            "restricted hartree fock needs a closed shell, got multiplicity {}",
            molecule.multiplicity()
        )));
    }

    let deadline = utils::Deadline::start(input.config.time_limit);
    let n_electrons = molecule.n_electrons();
    let nuclear_repulsion = molecule.nuclear_repulsion();
    log::debug!("nuclear repulsion energy: {nuclear_repulsion}");

    let integrals = input.integrals()?;
    let n_basis = integrals.n_basis();
    if n_electrons > 2 * n_basis {
        return Err(Error::InvalidMolecule(format!(
            "{n_electrons} electrons don't fit into {n_basis} spatial orbitals"
        )));
    }

    let overlap = &integrals.overlap;
    let core_hamiltonian = &integrals.core_hamiltonian;
    let transform = utils::compute_transformation_matrix(overlap)?;
    let mut density = compute_hückel_density(
        core_hamiltonian,
        overlap,
        &transform,
        n_basis,
        n_electrons,
    );

    let electron_terms = compute_electron_terms(&integrals.electron, n_basis);

    // start of scf iteration
    let mut diis = Diis::new();
    let mut previous_energy = f64::INFINITY;
    for iteration in 0..=input.config.max_iterations {
        deadline.check()?;

        let electronic_hamiltonian =
            compute_electronic_hamiltonian(&density, &electron_terms, n_basis);

        let fock = core_hamiltonian + &electronic_hamiltonian;
        let electronic_energy =
            0.5 * (&density * (2.0 * core_hamiltonian + &electronic_hamiltonian)).trace();

        let error = &fock * &density * overlap - overlap * &density * &fock;
        let extrapolated = diis.fock(error, fock.clone()).unwrap_or(fock);

        let (coefficients, orbital_energies) =
            utils::solve_roothaan(&extrapolated, &transform);
        let new_density = compute_updated_density(&coefficients, n_electrons);

        let density_rms = utils::rms(&(&new_density - &density));
        let energy_change = (electronic_energy - previous_energy).abs();
        density = new_density;
        previous_energy = electronic_energy;

        log::info!(
            "iteration {iteration:<4} - electronic energy {electronic_energy:1.8}. density rms {density_rms:1.4e}",
        );

        if density_rms < input.config.epsilon && energy_change < input.config.epsilon.sqrt() {
            // energy of the final density, consistent with the returned orbitals
            let electronic_hamiltonian =
                compute_electronic_hamiltonian(&density, &electron_terms, n_basis);
            let electronic_energy =
                0.5 * (&density * (2.0 * core_hamiltonian + &electronic_hamiltonian)).trace();

            return Ok(RestrictedHartreeFockOutput {
                orbital_energies: orbital_energies.as_slice().to_vec(),
                coefficients,
                electronic_energy,
                nuclear_repulsion,
                iterations: iteration,
            });
        }
    }

    Err(Error::ScfNotConverged {
        iterations: input.config.max_iterations,
    })
}

/// (ij|xy) - 1/2 (ix|jy), laid out such that contracting with the density gives the two
/// electron part of the fock matrix
fn compute_electron_terms(electron: &ElectronTensor, n_basis: usize) -> Vec<f64> {
    let mut electron_terms = vec![0.0; n_basis.pow(4)];
    for (j, i, x, y) in itertools::iproduct!(0..n_basis, 0..n_basis, 0..n_basis, 0..n_basis) {
        electron_terms[j * n_basis.pow(3) + i * n_basis.pow(2) + y * n_basis + x] =
            electron[(i, j, x, y)] - 0.5 * electron[(i, x, j, y)];
    }
    electron_terms
}

fn compute_hückel_density(
    hamiltonian: &DMatrix<f64>,
    overlap: &DMatrix<f64>,
    transform: &DMatrix<f64>,
    n_basis: usize,
    n_electrons: usize,
) -> DMatrix<f64> {
    const WOLFSBERG_HELMHOLTZ: f64 = 1.75;
    let hamiltonian_eht = symmetric_matrix(n_basis, |i, j| {
        WOLFSBERG_HELMHOLTZ * overlap[(i, j)] * (hamiltonian[(i, i)] + hamiltonian[(j, j)]) / 2.0
    });

    let (coeffs, _orbital_energies) = utils::solve_roothaan(&hamiltonian_eht, transform);
    compute_updated_density(&coeffs, n_electrons)
}

fn compute_electronic_hamiltonian(
    density: &DMatrix<f64>,
    electron_terms: &[f64],
    n_basis: usize,
) -> DMatrix<f64> {
    symmetric_matrix(n_basis, |i, j| {
        let mut sum = 0.0;
        for y in 0..n_basis {
            for x in 0..n_basis {
                sum += density[(x, y)]
                    * electron_terms[j * n_basis.pow(3) + i * n_basis.pow(2) + y * n_basis + x];
            }
        }
        sum
    })
}

fn compute_updated_density(coefficients: &DMatrix<f64>, n_electrons: usize) -> DMatrix<f64> {
    2.0 * utils::spin_density(coefficients, n_electrons / 2)
}
