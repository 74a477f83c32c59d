use serde::{Deserialize, Serialize};

use crate::{
    basis::BasisSet,
    ci::{full_configuration_interaction, FullConfigurationInteractionInput},
    error::{Error, Result},
    hf::{
        restricted_hartree_fock, unrestricted_hartree_fock, HartreeFockConfig, HartreeFockInput,
    },
    molecule::Molecule,
};

/// Atoms closer than this (in Ångström) are treated as sitting on top of each other
const MIN_SEPARATION: f64 = 1e-3;

/// Ground state energy of a molecule, in Hartree
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub electronic: f64,
    pub nuclear_repulsion: f64,
}

impl Energy {
    pub fn total(&self) -> f64 {
        self.electronic + self.nuclear_repulsion
    }
}

/// Anything that maps a molecular geometry to its ground state energy.
///
/// Evaluations are assumed to be expensive and deterministic: the same molecule always yields
/// the same energy, so callers never evaluate an unchanged geometry twice.
pub trait EnergyOracle {
    fn evaluate(&mut self, molecule: &Molecule) -> Result<Energy>;
}

impl<F> EnergyOracle for F
where
    F: FnMut(&Molecule) -> Result<Energy>,
{
    fn evaluate(&mut self, molecule: &Molecule) -> Result<Energy> {
        self(molecule)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Mean field energy. Restricted for closed shells, unrestricted otherwise.
    HartreeFock,
    /// Exact ground state within the basis
    #[default]
    FullConfigurationInteraction,
}

#[derive(Clone, Debug)]
pub struct OracleConfig {
    pub basis_set: BasisSet,
    pub method: Method,
    pub scf: HartreeFockConfig,
    /// largest determinant space a configuration interaction calculation may diagonalize
    pub max_determinants: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            basis_set: BasisSet::sto_3g(),
            method: Method::default(),
            scf: HartreeFockConfig::default(),
            max_determinants: 2000,
        }
    }
}

/// Computes energies in process, from the integrals up. Nothing is cached between calls.
pub struct QuantumChemistryOracle {
    config: OracleConfig,
    evaluations: usize,
}

impl QuantumChemistryOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            evaluations: 0,
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Number of evaluations started so far, including failed ones
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn compute(&self, molecule: &Molecule) -> Result<Energy> {
        let OracleConfig {
            basis_set,
            method,
            scf,
            max_determinants,
        } = &self.config;

        let (electronic, nuclear_repulsion) = match method {
            Method::HartreeFock => {
                let input = HartreeFockInput {
                    molecule,
                    basis_set,
                    config: scf,
                };
                if molecule.is_closed_shell() {
                    let output = restricted_hartree_fock(&input)?;
                    (output.electronic_energy, output.nuclear_repulsion)
                } else {
                    let output = unrestricted_hartree_fock(&input)?;
                    (output.electronic_energy, output.nuclear_repulsion)
                }
            }
            Method::FullConfigurationInteraction => {
                let output = full_configuration_interaction(&FullConfigurationInteractionInput {
                    molecule,
                    basis_set,
                    max_determinants: *max_determinants,
                    time_limit: scf.time_limit,
                })?;
                (output.electronic_energy, output.nuclear_repulsion)
            }
        };

        Ok(Energy {
            electronic,
            nuclear_repulsion,
        })
    }
}

impl Default for QuantumChemistryOracle {
    fn default() -> Self {
        Self::new(OracleConfig::default())
    }
}

impl EnergyOracle for QuantumChemistryOracle {
    fn evaluate(&mut self, molecule: &Molecule) -> Result<Energy> {
        self.evaluations += 1;

        if let Some(distance) = molecule.min_interatomic_distance() {
            if distance < MIN_SEPARATION {
                return Err(Error::DegenerateGeometry(format!(
                    "atoms are {distance:e} Å apart"
                )));
            }
        }

        let energy = self.compute(molecule)?;
        if !energy.total().is_finite() {
            return Err(Error::NonFiniteEnergy);
        }

        log::debug!(
            "evaluation {}: {:?} on {} atoms -> {:1.8} Hartree",
            self.evaluations,
            self.config.method,
            molecule.atoms().len(),
            energy.total()
        );
        Ok(energy)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use std::{num::NonZeroU32, time::Duration};

    use nalgebra::Vector3;

    use crate::{
        atom::Atom,
        error::{Error, Result},
        hf::HartreeFockConfig,
        molecule::Molecule,
        periodic_table::ElementType,
    };

    use super::{Energy, EnergyOracle, Method, OracleConfig, QuantumChemistryOracle};

    #[test]
    fn hydrogen_reference_energy() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.735)
        };
        let mut oracle = QuantumChemistryOracle::default();

        let energy = oracle.evaluate(&molecule).unwrap();

        assert_relative_eq!(energy.total(), -1.1373, epsilon = 1e-3);
        assert_relative_eq!(energy.electronic, -1.8573, epsilon = 1e-3);
        assert_relative_eq!(energy.nuclear_repulsion, 0.7200, epsilon = 1e-3);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.735)
        };
        let mut oracle = QuantumChemistryOracle::default();

        let first = oracle.evaluate(&molecule).unwrap();
        let second = oracle.evaluate(&molecule).unwrap();

        assert_relative_eq!(first.total(), second.total(), epsilon = 1e-6);
        assert_eq!(oracle.evaluations(), 2);
    }

    #[test]
    fn hartree_fock_is_above_full_ci() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.735)
        };
        let mut hartree_fock = QuantumChemistryOracle::new(OracleConfig {
            method: Method::HartreeFock,
            ..Default::default()
        });
        let mut full_ci = QuantumChemistryOracle::default();

        let mean_field = hartree_fock.evaluate(&molecule).unwrap().total();
        let exact = full_ci.evaluate(&molecule).unwrap().total();

        assert!(exact < mean_field);
        assert_relative_eq!(mean_field, -1.1170, epsilon = 1e-3);
    }

    #[test]
    fn exhausted_time_limit_fails_every_method() {
        let water = molecule! {
            O => (0.0, 0.0, 0.0),
            H => (0.0, 0.757, 0.587),
            H => (0.0, -0.757, 0.587)
        };
        let lithium_hydride_cation = Molecule::new(
            vec![
                Atom::new(ElementType::Li, Vector3::zeros()),
                Atom::new(ElementType::H, Vector3::new(0.0, 0.0, 1.6)),
            ],
            1,
            NonZeroU32::new(2).unwrap(),
        )
        .unwrap();

        for method in [Method::HartreeFock, Method::FullConfigurationInteraction] {
            for molecule in [&water, &lithium_hydride_cation] {
                let mut oracle = QuantumChemistryOracle::new(OracleConfig {
                    method,
                    scf: HartreeFockConfig {
                        time_limit: Some(Duration::ZERO),
                        ..Default::default()
                    },
                    ..Default::default()
                });

                assert!(matches!(
                    oracle.evaluate(molecule),
                    Err(Error::Timeout(limit)) if limit == Duration::ZERO
                ));
            }
        }
    }

    #[test]
    fn rejects_overlapping_atoms() {
        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 0.0, 0.0)
        };
        let mut oracle = QuantumChemistryOracle::default();

        assert!(matches!(
            oracle.evaluate(&molecule),
            Err(Error::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn closures_are_oracles() {
        let mut calls = 0;
        let mut oracle = |molecule: &Molecule| -> Result<Energy> {
            calls += 1;
            Ok(Energy {
                electronic: -molecule.last_atom().position().norm(),
                nuclear_repulsion: 0.0,
            })
        };

        let molecule = molecule! {
            H => (0.0, 0.0, 0.0),
            H => (0.0, 3.0, 4.0)
        };
        assert_eq!(oracle.evaluate(&molecule).unwrap().total(), -5.0);
        assert_eq!(calls, 1);
    }
}
