use nalgebra::DMatrix;

use crate::{
    error::{Error, Result},
    integrals::{symmetric_matrix, ElectronTensor},
};

use super::{utils, HartreeFockInput};

/// The output of an unrestricted hartree fock calculation
#[derive(Debug)]
#[non_exhaustive]
pub struct UnrestrictedHartreeFockOutput {
    /// the spin up orbital energies that were found in this hartree fock calculation, sorted in
    /// ascending order
    pub orbital_energies_alpha: Vec<f64>,
    /// the spin down orbital energies that were found in this hartree fock calculation, sorted in
    /// ascending order
    pub orbital_energies_beta: Vec<f64>,
    pub coefficients_alpha: DMatrix<f64>,
    pub coefficients_beta: DMatrix<f64>,
    /// The electronic energy of the system
    pub electronic_energy: f64,
    /// The nuclear repulsion energy
    pub nuclear_repulsion: f64,
    /// After how many iterations did the system converge
    pub iterations: usize,
}

impl UnrestrictedHartreeFockOutput {
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }
}

/// Fraction of the new density mixed into the old one each iteration
const DAMPING: f64 = 0.5;

pub fn unrestricted_hartree_fock(
    input: &HartreeFockInput,
) -> Result<UnrestrictedHartreeFockOutput> {
    let molecule = input.molecule;
    let deadline = utils::Deadline::start(input.config.time_limit);

    let n_alpha = molecule.n_alpha();
    let n_beta = molecule.n_beta();
    let nuclear_repulsion = molecule.nuclear_repulsion();
    log::debug!("nuclear repulsion energy: {nuclear_repulsion}, {n_alpha} alpha and {n_beta} beta electrons");

    let integrals = input.integrals()?;
    let n_basis = integrals.n_basis();
    if n_alpha > n_basis {
        return Err(Error::InvalidMolecule(format!(
            "{n_alpha} alpha electrons don't fit into {n_basis} spatial orbitals"
        )));
    }

    let overlap = &integrals.overlap;
    let core_hamiltonian = &integrals.core_hamiltonian;
    let transform = utils::compute_transformation_matrix(overlap)?;

    // core hamiltonian guess
    let (guess, _) = utils::solve_roothaan(core_hamiltonian, &transform);
    let mut densities = [
        utils::spin_density(&guess, n_alpha),
        utils::spin_density(&guess, n_beta),
    ];
    let occupations = [n_alpha, n_beta];

    for iteration in 0..=input.config.max_iterations {
        deadline.check()?;

        let total_density = &densities[0] + &densities[1];
        let focks = [0, 1].map(|spin| {
            core_hamiltonian
                + compute_electronic_hamiltonian(
                    &densities[spin],
                    &total_density,
                    &integrals.electron,
                    n_basis,
                )
        });
        let solutions = [0, 1].map(|spin| utils::solve_roothaan(&focks[spin], &transform));
        let electronic_energy = compute_energy(core_hamiltonian, &densities, &focks);

        let mut density_rms = 0.0;
        for spin in 0..=1 {
            let new_density = utils::spin_density(&solutions[spin].0, occupations[spin]);
            let density_change = &new_density - &densities[spin];
            densities[spin] += &density_change * DAMPING;

            let spin_rms = utils::rms(&density_change);
            density_rms += spin_rms;
            log::debug!(
                "spin {} - density rms {spin_rms:03.3e}",
                ["up", "down"][spin]
            );
        }

        log::info!(
            "iteration {iteration:<4} - electronic energy {electronic_energy:1.8}. density rms {:1.4e}",
            density_rms / 2.0
        );

        if density_rms / 2.0 < input.config.epsilon {
            let [(coefficients_alpha, energies_alpha), (coefficients_beta, energies_beta)] =
                solutions;

            return Ok(UnrestrictedHartreeFockOutput {
                orbital_energies_alpha: energies_alpha.as_slice().to_vec(),
                orbital_energies_beta: energies_beta.as_slice().to_vec(),
                coefficients_alpha,
                coefficients_beta,
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

/// E = 1/2 sum_ij [ P_total H + P_alpha F_alpha + P_beta F_beta ]_ij
fn compute_energy(
    core_hamiltonian: &DMatrix<f64>,
    densities: &[DMatrix<f64>; 2],
    focks: &[DMatrix<f64>; 2],
) -> f64 {
    let total_density = &densities[0] + &densities[1];
    0.5 * (total_density.dot(core_hamiltonian)
        + densities[0].dot(&focks[0])
        + densities[1].dot(&focks[1]))
}

/// Coulomb interaction with every electron minus exchange with electrons of the same spin
fn compute_electronic_hamiltonian(
    density_same: &DMatrix<f64>,
    density_total: &DMatrix<f64>,
    electron: &ElectronTensor,
    n_basis: usize,
) -> DMatrix<f64> {
    symmetric_matrix(n_basis, |i, j| {
        let mut sum = 0.0;
        for k in 0..n_basis {
            for l in 0..n_basis {
                sum += density_total[(k, l)] * electron[(i, j, k, l)]
                    - density_same[(k, l)] * electron[(i, k, j, l)]
            }
        }
        sum
    })
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::{
        atom::Atom,
        basis::BasisSet,
        hf::{
            restricted_hartree_fock, unrestricted_hartree_fock, HartreeFockConfig,
            HartreeFockInput,
        },
        molecule::Molecule,
        periodic_table::ElementType,
    };

    #[test]
    fn hydrogen_atom() {
        let molecule = Molecule::new(
            vec![Atom::new(ElementType::H, Vector3::zeros())],
            0,
            NonZeroU32::new(2).unwrap(),
        )
        .unwrap();

        let output = unrestricted_hartree_fock(&HartreeFockInput {
            molecule: &molecule,
            basis_set: &BasisSet::sto_3g(),
            config: &HartreeFockConfig::default(),
        })
        .unwrap();

        assert_relative_eq!(output.total_energy(), -0.466582, epsilon = 1e-4);
        assert_relative_eq!(output.nuclear_repulsion, 0.0);
        assert_relative_eq!(
            output.orbital_energies_alpha[0],
            output.electronic_energy,
            epsilon = 1e-6
        );
    }

    #[test]
    fn closed_shell_matches_restricted() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.735)
        };
        let basis_set = BasisSet::sto_3g();
        let config = HartreeFockConfig::default();
        let input = HartreeFockInput {
            molecule: &molecule,
            basis_set: &basis_set,
            config: &config,
        };

        let restricted = restricted_hartree_fock(&input).unwrap();
        let unrestricted = unrestricted_hartree_fock(&input).unwrap();

        assert_relative_eq!(
            restricted.total_energy(),
            unrestricted.total_energy(),
            epsilon = 1e-6
        );
    }
}
