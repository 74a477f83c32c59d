use std::{fs::File, io::BufReader, num::NonZeroU32, path::Path};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    atom::Atom,
    error::{Error, Result},
    molecule::Molecule,
    periodic_table::ElementType,
};

/// Represents a full molecule in a config file.
///
/// Either just a list of positioned atoms (a neutral singlet), or an object carrying the atoms
/// together with the charge and the spin multiplicity. Positions are in Ångström.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigMolecule {
    Atoms(Vec<ConfigAtom>),
    Full {
        atoms: Vec<ConfigAtom>,
        #[serde(default)]
        charge: i32,
        #[serde(default = "singlet")]
        multiplicity: u32,
    },
}

fn singlet() -> u32 {
    1
}

#[derive(Serialize, Deserialize)]
pub struct ConfigAtom {
    element: ElementType,
    position: Vec<f64>,
}

impl ConfigMolecule {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(
            path,
        )?))?)
    }
}

impl TryFrom<ConfigMolecule> for Molecule {
    type Error = Error;

    fn try_from(value: ConfigMolecule) -> Result<Self> {
        let (config_atoms, charge, multiplicity) = match value {
            ConfigMolecule::Atoms(atoms) => (atoms, 0, 1),
            ConfigMolecule::Full {
                atoms,
                charge,
                multiplicity,
            } => (atoms, charge, multiplicity),
        };

        let mut atoms = Vec::with_capacity(config_atoms.len());

        for atom in config_atoms {
            let &[x, y, z] = atom.position.as_slice() else {
                return Err(Error::InvalidMolecule(format!(
                    "atom {} needs exactly three coordinates, got {}",
                    atom.element,
                    atom.position.len()
                )));
            };

            atoms.push(Atom::new(atom.element, Vector3::new(x, y, z)));
        }

        let multiplicity = NonZeroU32::new(multiplicity).ok_or_else(|| {
            Error::InvalidMolecule("spin multiplicity must be at least one".to_owned())
        })?;

        Molecule::new(atoms, charge, multiplicity)
    }
}

impl From<&Molecule> for ConfigMolecule {
    fn from(value: &Molecule) -> Self {
        ConfigMolecule::Full {
            atoms: value
                .atoms()
                .iter()
                .map(|atom| ConfigAtom {
                    element: atom.element_type(),
                    position: atom.position().as_slice().to_vec(),
                })
                .collect(),
            charge: value.charge(),
            multiplicity: value.multiplicity().get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::Error, molecule::Molecule};

    use super::ConfigMolecule;

    #[test]
    fn bare_atom_list_is_a_neutral_singlet() {
        let config: ConfigMolecule = serde_json::from_str(
            r#"[{"element": "H", "position": [0.0, 0.0, 0.0]}, {"element": "H", "position": [0.0, 0.0, 0.735]}]"#,
        )
        .unwrap();
        let molecule = Molecule::try_from(config).unwrap();

        assert_eq!(molecule.atoms().len(), 2);
        assert_eq!(molecule.charge(), 0);
        assert_eq!(molecule.multiplicity().get(), 1);
    }

    #[test]
    fn charge_and_multiplicity() {
        let config: ConfigMolecule = serde_json::from_str(
            r#"{"atoms": [{"element": "H", "position": [0.0, 0.0, 0.0]}], "multiplicity": 2}"#,
        )
        .unwrap();
        let molecule = Molecule::try_from(config).unwrap();
        assert_eq!(molecule.n_alpha(), 1);
        assert_eq!(molecule.n_beta(), 0);
    }

    #[test]
    fn rejects_two_dimensional_positions() {
        let config: ConfigMolecule =
            serde_json::from_str(r#"[{"element": "He", "position": [0.0, 0.0]}]"#).unwrap();
        assert!(matches!(
            Molecule::try_from(config),
            Err(Error::InvalidMolecule(_))
        ));
    }

    #[test]
    fn round_trips_through_json() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.735)
        };
        let json = serde_json::to_string(&ConfigMolecule::from(&molecule)).unwrap();
        let config: ConfigMolecule = serde_json::from_str(&json).unwrap();
        assert_eq!(Molecule::try_from(config).unwrap(), molecule);
    }
}
