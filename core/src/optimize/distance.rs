use std::num::NonZeroU32;

use nalgebra::Vector3;

use crate::{
    atom::Atom,
    error::{Error, Result},
    molecule::Molecule,
    oracle::EnergyOracle,
    periodic_table::ElementType,
    report::{IterationInfo, Observer},
};

use super::simplex::{Minimizer, NelderMead};

/// A diatomic search: the first atom sits at the origin, the second starts on the z axis
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceFinderConfig {
    pub atoms: (ElementType, ElementType),
    /// starting separation, in Ångström
    pub init_distance: f64,
    /// tolerance handed to the minimizer
    pub tolerance: f64,
    pub charge: i32,
    pub multiplicity: NonZeroU32,
}

impl Default for DistanceFinderConfig {
    fn default() -> Self {
        Self {
            atoms: (ElementType::H, ElementType::H),
            init_distance: 3.0,
            tolerance: 0.01,
            charge: 0,
            multiplicity: NonZeroU32::MIN,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DistanceReport {
    /// distance of the optimal position from the fixed atom, in Ångström
    pub distance: f64,
    /// total energy at the optimal position, in Hartree
    pub energy: f64,
    pub converged: bool,
    pub iterations: usize,
    pub evaluations: usize,
    /// optimal position of the moving atom
    pub point: Vector3<f64>,
}

/// Finds the equilibrium separation of two atoms by minimizing the energy over the position
/// of the second atom.
pub struct DistanceFinder<O, R = (), M = NelderMead> {
    molecule: Molecule,
    tolerance: f64,
    oracle: O,
    observer: R,
    minimizer: M,
    progress: Progress,
}

impl<O: EnergyOracle> DistanceFinder<O> {
    pub fn new(config: DistanceFinderConfig, oracle: O) -> Result<Self> {
        let (fixed, moving) = config.atoms;
        let molecule = Molecule::new(
            vec![
                Atom::new(fixed, Vector3::zeros()),
                Atom::new(moving, Vector3::new(0.0, 0.0, config.init_distance)),
            ],
            config.charge,
            config.multiplicity,
        )?;

        Ok(Self {
            molecule,
            tolerance: config.tolerance,
            oracle,
            observer: (),
            minimizer: NelderMead::default(),
            progress: Progress::default(),
        })
    }
}

impl<O: EnergyOracle, R: Observer, M: Minimizer> DistanceFinder<O, R, M> {
    pub fn with_observer<S: Observer>(self, observer: S) -> DistanceFinder<O, S, M> {
        DistanceFinder {
            molecule: self.molecule,
            tolerance: self.tolerance,
            oracle: self.oracle,
            observer,
            minimizer: self.minimizer,
            progress: self.progress,
        }
    }

    pub fn with_minimizer<N: Minimizer>(self, minimizer: N) -> DistanceFinder<O, R, N> {
        DistanceFinder {
            molecule: self.molecule,
            tolerance: self.tolerance,
            oracle: self.oracle,
            observer: self.observer,
            minimizer,
            progress: self.progress,
        }
    }

    /// The molecule with the moving atom at its latest evaluated position
    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    pub fn observer(&self) -> &R {
        &self.observer
    }

    pub fn into_observer(self) -> R {
        self.observer
    }

    /// Total energy with the moving atom at `coords`. Reports the evaluation to the observer.
    pub fn evaluate(&mut self, coords: &[f64]) -> Result<f64> {
        evaluate_at(
            &mut self.molecule,
            &mut self.oracle,
            &mut self.observer,
            &mut self.progress,
            coords,
        )
    }

    pub fn run(&mut self) -> Result<DistanceReport> {
        let Self {
            molecule,
            tolerance,
            oracle,
            observer,
            minimizer,
            progress,
        } = self;

        let initial = molecule.last_atom().position().as_slice().to_vec();
        let result = minimizer.minimize(
            |coords| {
                evaluate_at(
                    &mut *molecule,
                    &mut *oracle,
                    &mut *observer,
                    &mut *progress,
                    coords,
                )
            },
            &initial,
            *tolerance,
        )?;

        let point = to_vector(&result.point)?;
        *molecule = molecule.with_last_atom_at(point)?;

        let distance = point.norm();
        log::info!(
            "optimal distance {distance:1.4} Å with energy {:1.8} after {} evaluations",
            result.value,
            result.evaluations
        );
        if !result.converged {
            log::warn!(
                "distance search did not converge within {} iterations",
                result.iterations
            );
        }

        Ok(DistanceReport {
            distance,
            energy: result.value,
            converged: result.converged,
            iterations: result.iterations,
            evaluations: result.evaluations,
            point,
        })
    }
}

/// Energies seen so far by a distance search
#[derive(Copy, Clone, Debug, Default)]
struct Progress {
    best: Option<f64>,
    previous: Option<f64>,
}

fn to_vector(coords: &[f64]) -> Result<Vector3<f64>> {
    match coords {
        &[x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(Error::InvalidMolecule(format!(
            "expected 3 coordinates, got {}",
            coords.len()
        ))),
    }
}

fn evaluate_at(
    molecule: &mut Molecule,
    oracle: &mut impl EnergyOracle,
    observer: &mut impl Observer,
    progress: &mut Progress,
    coords: &[f64],
) -> Result<f64> {
    let coords = to_vector(coords)?;
    *molecule = molecule.with_last_atom_at(coords)?;

    let energy = oracle.evaluate(molecule)?.total();
    if !energy.is_finite() {
        return Err(Error::NonFiniteEnergy);
    }

    let delta = progress.previous.map(|previous| energy - previous);
    let accepted = progress.best.map_or(true, |best| energy < best);
    progress.previous = Some(energy);
    if accepted {
        progress.best = Some(energy);
    }

    observer.on_evaluation(&IterationInfo {
        coords,
        energy,
        delta,
        accepted,
    });
    Ok(energy)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use crate::{
        error::{Error, Result},
        molecule::Molecule,
        optimize::simplex::{Minimizer, MinimizerResult},
        oracle::{Energy, QuantumChemistryOracle},
        report::{IterationInfo, TrajectoryRecorder},
    };

    use super::{DistanceFinder, DistanceFinderConfig};

    fn constant(_: &Molecule) -> Result<Energy> {
        Ok(Energy {
            electronic: -1.8,
            nuclear_repulsion: 0.0,
        })
    }

    /// Proposes a fixed point after a single evaluation
    struct FixedPoint(Vec<f64>);

    impl Minimizer for FixedPoint {
        fn minimize<F>(
            &self,
            mut objective: F,
            _initial: &[f64],
            _tolerance: f64,
        ) -> Result<MinimizerResult>
        where
            F: FnMut(&[f64]) -> Result<f64>,
        {
            let value = objective(&self.0)?;
            Ok(MinimizerResult {
                point: self.0.clone(),
                value,
                converged: true,
                iterations: 1,
                evaluations: 1,
            })
        }
    }

    #[test]
    fn constant_energy() {
        let mut finder = DistanceFinder::new(DistanceFinderConfig::default(), constant).unwrap();

        let report = finder.run().unwrap();

        assert!(report.converged);
        assert!(report.distance.is_finite());
        assert_relative_eq!(report.distance, report.point.norm());
        assert_relative_eq!(report.distance, 3.0);
        assert_relative_eq!(report.energy, -1.8);
    }

    #[test]
    fn distance_is_the_norm_of_the_minimizer_point() {
        let mut finder = DistanceFinder::new(DistanceFinderConfig::default(), constant)
            .unwrap()
            .with_minimizer(FixedPoint(vec![0.0, 0.0, 1.5]));

        let report = finder.run().unwrap();

        assert_relative_eq!(report.distance, 1.5);
        assert_eq!(*finder.molecule().last_atom().position(), Vector3::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn observer_sees_each_evaluation_once() {
        let linear = |molecule: &Molecule| -> Result<Energy> {
            Ok(Energy {
                electronic: -molecule.last_atom().position().z,
                nuclear_repulsion: 0.5,
            })
        };
        let mut seen = Vec::new();
        let mut finder = DistanceFinder::new(DistanceFinderConfig::default(), linear)
            .unwrap()
            .with_observer(|info: &IterationInfo| seen.push(*info));

        let energy = finder.evaluate(&[0.1, 0.2, 2.0]).unwrap();
        drop(finder);

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].coords, Vector3::new(0.1, 0.2, 2.0));
        assert_eq!(seen[0].energy, energy);
        assert_relative_eq!(energy, -1.5);
    }

    #[test]
    fn deltas_are_relative_to_the_previous_evaluation() {
        let linear = |molecule: &Molecule| -> Result<Energy> {
            Ok(Energy {
                electronic: -molecule.last_atom().position().z,
                nuclear_repulsion: 0.0,
            })
        };
        let mut finder = DistanceFinder::new(DistanceFinderConfig::default(), linear)
            .unwrap()
            .with_observer(TrajectoryRecorder::new());

        finder.evaluate(&[0.0, 0.0, 2.0]).unwrap();
        finder.evaluate(&[0.0, 0.0, 1.0]).unwrap();
        finder.evaluate(&[0.0, 0.0, 1.5]).unwrap();

        let seen = finder.observer().evaluations();
        assert_eq!(seen[0].delta, None);
        assert_relative_eq!(seen[1].delta.unwrap(), 1.0);
        assert_relative_eq!(seen[2].delta.unwrap(), -0.5);
        // -1.5 is above the best energy of -2.0
        assert_eq!(
            seen.iter().map(|info| info.accepted).collect::<Vec<_>>(),
            vec![true, false, false]
        );
    }

    #[test]
    fn every_objective_call_is_reported() {
        let mut finder = DistanceFinder::new(DistanceFinderConfig::default(), constant)
            .unwrap()
            .with_observer(TrajectoryRecorder::new());

        let report = finder.run().unwrap();

        assert_eq!(finder.observer().len(), report.evaluations);
    }

    #[test]
    fn rejects_wrong_dimension() {
        let mut finder = DistanceFinder::new(DistanceFinderConfig::default(), constant).unwrap();
        assert!(matches!(
            finder.evaluate(&[1.0, 2.0]),
            Err(Error::InvalidMolecule(_))
        ));
    }

    #[test]
    fn hydrogen_equilibrium_distance() {
        let mut finder = DistanceFinder::new(
            DistanceFinderConfig {
                init_distance: 1.0,
                ..Default::default()
            },
            QuantumChemistryOracle::default(),
        )
        .unwrap();

        let report = finder.run().unwrap();

        // the exact STO-3G bond length is 0.735 Å
        assert!((report.distance - 0.735).abs() < 0.05);
        assert!(report.energy < -1.13);
    }
}
