//! Full configuration interaction.
//!
//! The molecular Hamiltonian is diagonalized exactly within the space of all Slater
//! determinants that distribute the alpha and beta electrons over the orbitals of the basis.
//! The result is independent of the orthonormal orbital set used, so the symmetrically
//! orthogonalized atomic orbitals serve as orbitals and no Hartree-Fock step is needed.

use std::time::Duration;

use itertools::Itertools;
use nalgebra::{DMatrix, SymmetricEigen};

use crate::{
    basis::BasisSet,
    error::{Error, Result},
    hf::utils::{compute_transformation_matrix, Deadline},
    integrals::{AtomicIntegrals, ElectronTensor},
    molecule::Molecule,
};

/// Occupation of the orbitals of a single spin, bit `p` set if orbital `p` is occupied
type OccupationString = u64;

/// The input to a full configuration interaction calculation
pub struct FullConfigurationInteractionInput<'a> {
    pub molecule: &'a Molecule,
    pub basis_set: &'a BasisSet,
    /// largest number of determinants that will be diagonalized
    pub max_determinants: usize,
    /// wall clock budget of a single calculation
    pub time_limit: Option<Duration>,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct FullConfigurationInteractionOutput {
    /// The lowest eigenvalue of the electronic hamiltonian
    pub electronic_energy: f64,
    pub nuclear_repulsion: f64,
    pub n_determinants: usize,
}

impl FullConfigurationInteractionOutput {
    pub fn total_energy(&self) -> f64 {
        self.electronic_energy + self.nuclear_repulsion
    }
}

/// Number of determinants with `n_alpha` and `n_beta` electrons in `n_orbitals` spatial
/// orbitals. Saturates at `usize::MAX`.
pub fn determinant_count(n_orbitals: usize, n_alpha: usize, n_beta: usize) -> usize {
    binomial(n_orbitals, n_alpha).saturating_mul(binomial(n_orbitals, n_beta))
}

fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: usize = 1;
    for i in 0..k {
        // result * (n - i) is always divisible by (i + 1)
        result = match result.checked_mul(n - i) {
            Some(product) => product / (i + 1),
            None => return usize::MAX,
        };
    }
    result
}

pub fn full_configuration_interaction(
    input: &FullConfigurationInteractionInput,
) -> Result<FullConfigurationInteractionOutput> {
    let molecule = input.molecule;
    let deadline = Deadline::start(input.time_limit);

    let n_alpha = molecule.n_alpha();
    let n_beta = molecule.n_beta();
    let nuclear_repulsion = molecule.nuclear_repulsion();

    let integrals = AtomicIntegrals::for_molecule(molecule, input.basis_set)?;
    let n_orbitals = integrals.n_basis();
    if n_alpha > n_orbitals {
        return Err(Error::InvalidMolecule(format!(
            "{n_alpha} alpha electrons don't fit into {n_orbitals} spatial orbitals"
        )));
    }

    let n_determinants = determinant_count(n_orbitals, n_alpha, n_beta);
    if n_determinants > input.max_determinants || n_orbitals > OccupationString::BITS as usize {
        return Err(Error::DeterminantSpaceTooLarge {
            determinants: n_determinants,
            limit: input.max_determinants,
        });
    }
    log::debug!("full ci with {n_determinants} determinants over {n_orbitals} orbitals");

    let orbitals = compute_transformation_matrix(&integrals.overlap)?;
    let spin_orbitals = SpinOrbitalIntegrals::new(&integrals, &orbitals);
    deadline.check()?;

    let determinants = occupation_strings(n_orbitals, n_alpha)
        .into_iter()
        .cartesian_product(occupation_strings(n_orbitals, n_beta))
        .map(|(alpha, beta)| Determinant::new(alpha, beta, n_orbitals))
        .collect::<Vec<_>>();
    debug_assert_eq!(determinants.len(), n_determinants);

    let mut hamiltonian = DMatrix::zeros(n_determinants, n_determinants);
    for (i, bra) in determinants.iter().enumerate() {
        deadline.check()?;
        for (j, ket) in determinants.iter().enumerate().skip(i) {
            let element = spin_orbitals.matrix_element(bra, ket);
            hamiltonian[(i, j)] = element;
            hamiltonian[(j, i)] = element;
        }
    }

    let electronic_energy = SymmetricEigen::new(hamiltonian).eigenvalues.min();
    log::info!("full ci electronic energy {electronic_energy:1.8}");

    Ok(FullConfigurationInteractionOutput {
        electronic_energy,
        nuclear_repulsion,
        n_determinants,
    })
}

/// Every way to place `n_electrons` into `n_orbitals`, in lexicographic order
fn occupation_strings(n_orbitals: usize, n_electrons: usize) -> Vec<OccupationString> {
    if n_electrons == 0 {
        return vec![0];
    }
    (0..n_orbitals)
        .combinations(n_electrons)
        .map(|occupied| occupied.into_iter().fold(0, |string, p| string | 1 << p))
        .collect()
}

/// A Slater determinant over spin orbitals. Alpha orbital `p` is spin orbital `p`, beta
/// orbital `p` is spin orbital `n_orbitals + p`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Determinant(u128);

impl Determinant {
    fn new(alpha: OccupationString, beta: OccupationString, n_orbitals: usize) -> Self {
        Self(alpha as u128 | (beta as u128) << n_orbitals)
    }

    fn occupied(self) -> impl Iterator<Item = usize> {
        let Self(mut bits) = self;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let p = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(p)
        })
    }

    /// Sign picked up when moving an electron from `from` to `to`: one factor of -1 for
    /// every occupied spin orbital strictly between the two.
    fn phase(self, from: usize, to: usize) -> f64 {
        let (low, high) = if from < to { (from, to) } else { (to, from) };
        if high - low < 2 {
            return 1.0;
        }
        let between = ((1u128 << high) - 1) & !((1u128 << (low + 1)) - 1);
        if (self.0 & between).count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    fn excite(self, from: usize, to: usize) -> Self {
        Self(self.0 & !(1 << from) | 1 << to)
    }
}

/// One and two electron integrals over an orthonormal orbital set, with spin integration
/// done on access.
struct SpinOrbitalIntegrals {
    n_orbitals: usize,
    one_electron: DMatrix<f64>,
    /// (pq|rs) in chemists' notation, row major
    two_electron: Vec<f64>,
}

impl SpinOrbitalIntegrals {
    fn new(integrals: &AtomicIntegrals, orbitals: &DMatrix<f64>) -> Self {
        let one_electron = orbitals.transpose() * &integrals.core_hamiltonian * orbitals;
        let two_electron = transform_electron_tensor(&integrals.electron, orbitals);
        Self {
            n_orbitals: orbitals.ncols(),
            one_electron,
            two_electron,
        }
    }

    fn spatial(&self, p: usize) -> (usize, usize) {
        (p % self.n_orbitals, p / self.n_orbitals)
    }

    fn one(&self, p: usize, q: usize) -> f64 {
        let ((p, spin_p), (q, spin_q)) = (self.spatial(p), self.spatial(q));
        if spin_p != spin_q {
            return 0.0;
        }
        self.one_electron[(p, q)]
    }

    /// <pq|rs> in physicists' notation
    fn physicist(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        let (p, spin_p) = self.spatial(p);
        let (q, spin_q) = self.spatial(q);
        let (r, spin_r) = self.spatial(r);
        let (s, spin_s) = self.spatial(s);
        if spin_p != spin_r || spin_q != spin_s {
            return 0.0;
        }
        let n = self.n_orbitals;
        self.two_electron[((p * n + r) * n + q) * n + s]
    }

    /// <pq||rs> = <pq|rs> - <pq|sr>
    fn antisymmetrized(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.physicist(p, q, r, s) - self.physicist(p, q, s, r)
    }

    /// Slater-Condon rules
    fn matrix_element(&self, bra: &Determinant, ket: &Determinant) -> f64 {
        let difference = bra.0 ^ ket.0;
        match difference.count_ones() {
            0 => {
                let occupied = bra.occupied().collect::<Vec<_>>();
                let mut energy = occupied.iter().map(|&i| self.one(i, i)).sum::<f64>();
                for (&i, &j) in occupied.iter().tuple_combinations() {
                    energy += self.antisymmetrized(i, j, i, j);
                }
                energy
            }
            2 => {
                let hole = (bra.0 & difference).trailing_zeros() as usize;
                let particle = (ket.0 & difference).trailing_zeros() as usize;
                let mut element = self.one(hole, particle);
                for j in Determinant(bra.0 & ket.0).occupied() {
                    element += self.antisymmetrized(hole, j, particle, j);
                }
                bra.phase(hole, particle) * element
            }
            4 => {
                let mut holes = Determinant(bra.0 & difference).occupied();
                let mut particles = Determinant(ket.0 & difference).occupied();
                let (Some(i), Some(j), Some(a), Some(b)) =
                    (holes.next(), holes.next(), particles.next(), particles.next())
                else {
                    return 0.0;
                };

                let intermediate = bra.excite(i, a);
                let phase = bra.phase(i, a) * intermediate.phase(j, b);
                phase * self.antisymmetrized(i, j, a, b)
            }
            _ => 0.0,
        }
    }
}

/// Transforms every index of the atomic orbital tensor into the orbital basis, one index at a
/// time. Each pass contracts the leading index and moves the new one to the back.
fn transform_electron_tensor(electron: &ElectronTensor, orbitals: &DMatrix<f64>) -> Vec<f64> {
    let n = orbitals.nrows();
    let index = |i: usize, j: usize, k: usize, l: usize| ((i * n + j) * n + k) * n + l;

    let mut current = vec![0.0; n.pow(4)];
    for (i, j, k, l) in itertools::iproduct!(0..n, 0..n, 0..n, 0..n) {
        current[index(i, j, k, l)] = electron[(i, j, k, l)];
    }

    for _ in 0..4 {
        let mut next = vec![0.0; n.pow(4)];
        for (p, j, k, l) in itertools::iproduct!(0..n, 0..n, 0..n, 0..n) {
            next[index(j, k, l, p)] = (0..n)
                .map(|i| orbitals[(i, p)] * current[index(i, j, k, l)])
                .sum();
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::{
        atom::Atom,
        basis::BasisSet,
        error::Error,
        hf::{restricted_hartree_fock, HartreeFockConfig, HartreeFockInput},
        molecule::Molecule,
        periodic_table::ElementType,
    };

    use super::{
        determinant_count, full_configuration_interaction, occupation_strings, Determinant,
        FullConfigurationInteractionInput,
    };

    fn input<'a>(
        molecule: &'a Molecule,
        basis_set: &'a BasisSet,
    ) -> FullConfigurationInteractionInput<'a> {
        FullConfigurationInteractionInput {
            molecule,
            basis_set,
            max_determinants: 2000,
            time_limit: None,
        }
    }

    #[test]
    fn counts_determinants() {
        assert_eq!(determinant_count(2, 1, 1), 4);
        assert_eq!(determinant_count(7, 5, 5), 441);
        assert_eq!(determinant_count(4, 0, 0), 1);
        assert_eq!(determinant_count(2, 3, 0), 0);
        assert_eq!(determinant_count(200, 100, 100), usize::MAX);
    }

    #[test]
    fn occupation_strings_are_complete() {
        assert_eq!(occupation_strings(3, 2), vec![0b011, 0b101, 0b110]);
        assert_eq!(occupation_strings(3, 0), vec![0]);
    }

    #[test]
    fn phase_counts_occupied_orbitals_in_between() {
        let determinant = Determinant(0b10110);
        assert_eq!(determinant.phase(1, 3), -1.0);
        assert_eq!(determinant.phase(1, 5), 1.0);
        assert_eq!(determinant.phase(4, 0), 1.0);
        assert_eq!(determinant.phase(2, 0), -1.0);
        assert_eq!(determinant.excite(1, 3), Determinant(0b11100));
    }

    #[test]
    fn hydrogen_molecule() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.735)
        };
        let basis_set = BasisSet::sto_3g();

        let output = full_configuration_interaction(&input(&molecule, &basis_set)).unwrap();

        assert_eq!(output.n_determinants, 4);
        assert_relative_eq!(output.total_energy(), -1.137306, epsilon = 1e-4);
        assert_relative_eq!(output.electronic_energy, -1.8573, epsilon = 1e-3);
        assert_relative_eq!(output.nuclear_repulsion, 0.7199689944, epsilon = 1e-8);
    }

    #[test]
    fn single_electron_is_exact_in_hartree_fock() {
        let molecule = Molecule::new(
            vec![Atom::new(ElementType::H, Vector3::zeros())],
            0,
            NonZeroU32::new(2).unwrap(),
        )
        .unwrap();
        let basis_set = BasisSet::sto_3g();

        let output = full_configuration_interaction(&input(&molecule, &basis_set)).unwrap();

        assert_eq!(output.n_determinants, 1);
        assert_relative_eq!(output.total_energy(), -0.466582, epsilon = 1e-4);
    }

    #[test]
    fn correlation_lowers_the_energy() {
        let molecule = molecule! {
            O => (0.0, 0.0, 0.0),
            H => (0.0, 0.757, 0.587),
            H => (0.0, -0.757, 0.587)
        };
        let basis_set = BasisSet::sto_3g();

        let hartree_fock = restricted_hartree_fock(&HartreeFockInput {
            molecule: &molecule,
            basis_set: &basis_set,
            config: &HartreeFockConfig::default(),
        })
        .unwrap();
        let full_ci = full_configuration_interaction(&input(&molecule, &basis_set)).unwrap();

        let correlation = full_ci.total_energy() - hartree_fock.total_energy();
        assert!(correlation < 0.0);
        assert!(correlation > -0.1);
    }

    #[test]
    fn rejects_large_determinant_spaces() {
        let molecule = molecule! {
            O => (0.0, 0.0, 0.0),
            H => (0.0, 0.757, 0.587),
            H => (0.0, -0.757, 0.587)
        };
        let basis_set = BasisSet::sto_3g();

        let result = full_configuration_interaction(&FullConfigurationInteractionInput {
            max_determinants: 100,
            ..input(&molecule, &basis_set)
        });

        assert!(matches!(
            result,
            Err(Error::DeterminantSpaceTooLarge {
                determinants: 441,
                limit: 100
            })
        ));
    }
}
