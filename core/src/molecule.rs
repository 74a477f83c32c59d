use std::num::NonZeroU32;

use itertools::Itertools;
use nalgebra::Vector3;

use crate::{
    atom::{Atom, ANGSTROM_TO_BOHR},
    error::{Error, Result},
};

/// Represents a molecule: an ordered list of atoms together with its net charge and spin
/// multiplicity.
///
/// A molecule is validated once on construction and never mutated afterwards. Moving an atom
/// produces a new molecule, see [`Molecule::with_updated_atom`].
#[derive(Clone, Debug, PartialEq)]
pub struct Molecule {
    pub(crate) atoms: Vec<Atom>,
    charge: i32,
    multiplicity: NonZeroU32,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>, charge: i32, multiplicity: NonZeroU32) -> Result<Self> {
        let molecule = Self {
            atoms,
            charge,
            multiplicity,
        };
        molecule.validate()?;
        Ok(molecule)
    }

    /// A neutral singlet
    pub fn neutral(atoms: Vec<Atom>) -> Result<Self> {
        Self::new(atoms, 0, NonZeroU32::MIN)
    }

    fn validate(&self) -> Result<()> {
        if self.atoms.is_empty() {
            return Err(Error::InvalidMolecule(
                "a molecule needs at least one atom".to_owned(),
            ));
        }

        if let Some(atom) = self
            .atoms
            .iter()
            .find(|atom| atom.position.iter().any(|x| !x.is_finite()))
        {
            return Err(Error::InvalidMolecule(format!(
                "atom {} has a non-finite position {:?}",
                atom.symbol(),
                atom.position.as_slice()
            )));
        }

        let nuclear_charge = self
            .atoms
            .iter()
            .map(|atom| atom.nuclear_charge() as i64)
            .sum::<i64>();
        let n_electrons = nuclear_charge - self.charge as i64;
        if n_electrons < 0 {
            return Err(Error::InvalidMolecule(format!(
                "charge {} exceeds the total nuclear charge {nuclear_charge}",
                self.charge
            )));
        }

        let unpaired = self.multiplicity.get() as i64 - 1;
        if unpaired > n_electrons || (n_electrons - unpaired) % 2 != 0 {
            return Err(Error::InvalidMolecule(format!(
                "spin multiplicity {} is impossible with {n_electrons} electrons",
                self.multiplicity
            )));
        }

        Ok(())
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn last_atom(&self) -> &Atom {
        // validated to be non-empty
        &self.atoms[self.atoms.len() - 1]
    }

    pub fn charge(&self) -> i32 {
        self.charge
    }

    pub fn multiplicity(&self) -> NonZeroU32 {
        self.multiplicity
    }

    /// Returns a copy of this molecule where the atom at `index` is moved to `position`.
    /// All other atoms, the charge and the multiplicity are unchanged.
    pub fn with_updated_atom(&self, index: usize, position: Vector3<f64>) -> Result<Self> {
        let n_atoms = self.atoms.len();
        let atom = self
            .atoms
            .get(index)
            .ok_or(Error::AtomIndexOutOfRange { index, n_atoms })?;

        let mut atoms = self.atoms.clone();
        atoms[index] = atom.moved_to(position);
        Self::new(atoms, self.charge, self.multiplicity)
    }

    pub fn with_last_atom_at(&self, position: Vector3<f64>) -> Result<Self> {
        self.with_updated_atom(self.atoms.len() - 1, position)
    }

    /// Returns the number of total electrons in the system
    pub fn n_electrons(&self) -> usize {
        let nuclear_charge = self
            .atoms
            .iter()
            .map(|atom| atom.nuclear_charge() as usize)
            .sum::<usize>();
        nuclear_charge.saturating_add_signed(-(self.charge as isize))
    }

    /// Returns the number of electrons in the alpha (by convention, spin up) state
    pub fn n_alpha(&self) -> usize {
        (self.n_electrons() + self.multiplicity.get() as usize - 1) / 2
    }

    /// Returns the number of electrons in the beta (by convention, spin down) state
    pub fn n_beta(&self) -> usize {
        (self.n_electrons() + 1 - self.multiplicity.get() as usize) / 2
    }

    pub fn is_closed_shell(&self) -> bool {
        self.n_alpha() == self.n_beta()
    }

    /// Coulomb repulsion between all pairs of nuclei, in Hartree.
    pub fn nuclear_repulsion(&self) -> f64 {
        let n_atoms = self.atoms.len();

        let mut potential = 0.0;
        for atom_a in 0..n_atoms {
            for atom_b in atom_a + 1..n_atoms {
                let distance = (self.atoms[atom_b].position - self.atoms[atom_a].position).norm()
                    * ANGSTROM_TO_BOHR;
                potential += (self.atoms[atom_a].nuclear_charge()
                    * self.atoms[atom_b].nuclear_charge()) as f64
                    / distance
            }
        }
        potential
    }

    /// Smallest distance between two atoms in Ångström, `None` for single atoms.
    pub fn min_interatomic_distance(&self) -> Option<f64> {
        self.atoms
            .iter()
            .tuple_combinations()
            .map(|(a, b)| (b.position - a.position).norm())
            .min_by(f64::total_cmp)
    }
}
