use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use crate::{
    atom::Atom,
    config::ConfigBasisSet,
    error::{Error, Result},
    periodic_table::ElementType,
};

use super::{sto3g::STO_3G, BasisFunction, ContractedGaussian};

#[derive(Clone, Debug)]
pub struct BasisSet {
    name: String,
    atomic_mapping: HashMap<ElementType, AtomicBasis>,
}

impl BasisSet {
    /// Returns the basis of a given atom, if it exists.
    pub fn for_atom(&self, atom: &Atom) -> Option<&AtomicBasis> {
        self.atomic_mapping.get(&atom.element_type)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create a new basis set given mappings from element type to the basis of that element
    pub(crate) fn new(name: String, atomic_mapping: HashMap<ElementType, AtomicBasis>) -> Self {
        Self {
            name,
            atomic_mapping,
        }
    }

    /// The built-in STO-3G minimal basis, covering hydrogen to neon.
    pub fn sto_3g() -> Self {
        let config: ConfigBasisSet =
            serde_json::from_str(STO_3G).expect("built-in STO-3G basis set is valid json");
        Self::try_from(config).expect("built-in STO-3G basis set is well formed")
    }

    /// Looks up a built-in basis set by name, e.g. `"sto3g"` or `"STO-3G"`.
    pub fn named(name: &str) -> Result<Self> {
        let normalized = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "sto3g" => Ok(Self::sto_3g()),
            _ => Err(Error::UnknownBasisSet(name.to_owned())),
        }
    }

    /// Loads a basis set in the Basis Set Exchange json format.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ConfigBasisSet = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        Self::try_from(config)
    }

    /// Places the basis functions of every atom of `atoms` at the atom's position, in bohr.
    pub(crate) fn basis_for(&self, atoms: &[Atom]) -> Result<Vec<BasisFunction>> {
        let mut basis = Vec::new();
        for atom in atoms {
            let atomic_basis = self
                .for_atom(atom)
                .ok_or(Error::MissingBasis(atom.element_type))?;

            let position = atom.position_bohr();
            basis.extend(
                atomic_basis
                    .basis_functions()
                    .map(|contracted_gaussian| BasisFunction {
                        contracted_gaussian: contracted_gaussian.clone(),
                        position,
                    }),
            );
        }
        Ok(basis)
    }
}

/// Represents the basis functions for a single atom.
#[derive(Clone, Debug)]
pub struct AtomicBasis {
    pub(crate) shells: Vec<ElectronShell>,
}

impl AtomicBasis {
    pub(crate) fn empty() -> Self {
        Self { shells: Vec::new() }
    }

    pub fn basis_functions(&self) -> impl Iterator<Item = &ContractedGaussian> {
        self.shells.iter().flat_map(|shell| &shell.basis_functions)
    }

    pub fn max_angular_momentum(&self) -> Option<i32> {
        self.shells.iter().map(|shell| shell.angular_magnitude).max()
    }

    pub fn n_functions(&self) -> usize {
        self.shells
            .iter()
            .map(|shell| shell.basis_functions.len())
            .sum()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ElectronShell {
    pub(crate) angular_magnitude: i32,
    pub(crate) basis_functions: Vec<ContractedGaussian>,
}

impl ElectronShell {
    pub(crate) fn new(angular_magnitude: i32) -> Self {
        Self {
            angular_magnitude,
            basis_functions: Vec::new(),
        }
    }
}
