mod rhf;
mod uhf;
pub(crate) mod utils;

use std::time::Duration;

pub use rhf::{restricted_hartree_fock, RestrictedHartreeFockOutput};
pub use uhf::{unrestricted_hartree_fock, UnrestrictedHartreeFockOutput};

use crate::{basis::BasisSet, error::Result, integrals::AtomicIntegrals, molecule::Molecule};

/// Settings of the self consistent field loop
#[derive(Clone, Debug, PartialEq)]
pub struct HartreeFockConfig {
    /// the maximum number of iterations to try
    pub max_iterations: usize,
    /// the smallest number that isn't treated as zero. For example, if the density
    /// matrix rms changes by less than this, the system is considered converged.
    pub epsilon: f64,
    /// wall clock budget of a single calculation
    pub time_limit: Option<Duration>,
}

impl Default for HartreeFockConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            epsilon: 1e-8,
            time_limit: None,
        }
    }
}

/// The input to a hartree fock calculation
pub struct HartreeFockInput<'a> {
    /// the molecule to run hartree fock for. Charge and multiplicity decide how many
    /// electrons of each spin are placed.
    pub molecule: &'a Molecule,
    /// what basis set to use
    pub basis_set: &'a BasisSet,
    pub config: &'a HartreeFockConfig,
}

impl HartreeFockInput<'_> {
    pub(crate) fn integrals(&self) -> Result<AtomicIntegrals> {
        AtomicIntegrals::for_molecule(self.molecule, self.basis_set)
    }
}
