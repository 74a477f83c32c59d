use nalgebra::Vector3;
use rand::Rng;

use crate::{
    error::{Error, Result},
    molecule::Molecule,
    oracle::EnergyOracle,
    report::{IterationInfo, Observer},
};

/// How a sweep over the six axis directions ends
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SweepPolicy {
    /// Every direction is tried in every sweep
    #[default]
    Exhaustive,
    /// The sweep ends as soon as the direction that improved last fails to improve again.
    /// This can end a sweep before all six directions were explored.
    StopOnRepeatedFailure,
}

/// What happens along each axis direction during a sweep
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AxisSearch {
    /// a single trial step
    #[default]
    SingleStep,
    /// keep stepping while the energy decreases
    LineSearch,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateDescentConfig {
    /// length of a trial step, in Ångström
    pub step_size: f64,
    /// the search stops once an outer iteration lowers the energy by less than this (Hartree)
    pub epsilon: f64,
    /// ceiling on outer iterations
    pub max_iterations: usize,
    /// ceiling on oracle evaluations of a single line search
    pub max_line_steps: usize,
    pub sweep_policy: SweepPolicy,
    pub axis_search: AxisSearch,
    /// the atom that moves, the last atom if `None`
    pub atom_index: Option<usize>,
}

impl Default for CoordinateDescentConfig {
    fn default() -> Self {
        Self {
            step_size: 0.1,
            epsilon: 0.01,
            max_iterations: 100,
            max_line_steps: 50,
            sweep_policy: SweepPolicy::default(),
            axis_search: AxisSearch::default(),
            atom_index: None,
        }
    }
}

/// A geometry together with its energy. The energy is never recomputed for an unchanged
/// geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct DescentState {
    pub molecule: Molecule,
    /// total energy, in Hartree
    pub energy: f64,
}

#[derive(Clone, Debug)]
pub struct DescentOutcome {
    pub molecule: Molecule,
    pub energy: f64,
    /// number of oracle evaluations, including the starting geometry
    pub evaluations: usize,
    /// number of outer iterations (sweep plus acceleration step)
    pub iterations: usize,
    pub converged: bool,
}

/// Gradient free minimization of the energy with respect to the position of one atom, all
/// other atoms held fixed.
///
/// Each outer iteration sweeps over the directions `+x, -x, +y, -y, +z, -z` and only moves
/// when the energy strictly decreases. Afterwards a line search along the total displacement
/// of the sweep accelerates the descent.
pub struct CoordinateDescent<O, R = ()> {
    config: CoordinateDescentConfig,
    oracle: O,
    observer: R,
    evaluations: usize,
    /// energy of the latest reported evaluation
    previous_energy: Option<f64>,
}

impl<O: EnergyOracle> CoordinateDescent<O> {
    pub fn new(config: CoordinateDescentConfig, oracle: O) -> Self {
        Self {
            config,
            oracle,
            observer: (),
            evaluations: 0,
            previous_energy: None,
        }
    }
}

impl<O: EnergyOracle, R: Observer> CoordinateDescent<O, R> {
    pub fn with_observer<S: Observer>(self, observer: S) -> CoordinateDescent<O, S> {
        CoordinateDescent {
            config: self.config,
            oracle: self.oracle,
            observer,
            evaluations: self.evaluations,
            previous_energy: self.previous_energy,
        }
    }

    pub fn config(&self) -> &CoordinateDescentConfig {
        &self.config
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn observer(&self) -> &R {
        &self.observer
    }

    pub fn into_observer(self) -> R {
        self.observer
    }

    fn atom_index(&self, molecule: &Molecule) -> Result<usize> {
        let n_atoms = molecule.atoms().len();
        match self.config.atom_index {
            Some(index) if index >= n_atoms => Err(Error::AtomIndexOutOfRange { index, n_atoms }),
            Some(index) => Ok(index),
            None => Ok(n_atoms - 1),
        }
    }

    fn coords(&self, molecule: &Molecule) -> Result<Vector3<f64>> {
        let index = self.atom_index(molecule)?;
        Ok(*molecule.atoms()[index].position())
    }

    fn evaluate(&mut self, molecule: &Molecule) -> Result<f64> {
        self.evaluations += 1;
        let energy = self.oracle.evaluate(molecule)?.total();
        if !energy.is_finite() {
            return Err(Error::NonFiniteEnergy);
        }
        Ok(energy)
    }

    fn report(&mut self, coords: Vector3<f64>, energy: f64, accepted: bool) {
        let delta = self.previous_energy.map(|previous| energy - previous);
        self.previous_energy = Some(energy);
        self.observer.on_evaluation(&IterationInfo {
            coords,
            energy,
            delta,
            accepted,
        });
    }

    /// Evaluates the starting geometry
    pub fn start(&mut self, molecule: Molecule) -> Result<DescentState> {
        let coords = self.coords(&molecule)?;
        let energy = self.evaluate(&molecule)?;
        self.report(coords, energy, true);
        Ok(DescentState { molecule, energy })
    }

    /// Moves the atom by `direction` if, and only if, that strictly lowers the energy.
    /// Returns the resulting state and whether the step was taken.
    pub fn try_step(
        &mut self,
        state: DescentState,
        direction: Vector3<f64>,
    ) -> Result<(DescentState, bool)> {
        let index = self.atom_index(&state.molecule)?;
        let candidate_coords = state.molecule.atoms()[index].position() + direction;
        let candidate = state.molecule.with_updated_atom(index, candidate_coords)?;

        let energy = self.evaluate(&candidate)?;
        let accepted = energy < state.energy;
        self.report(candidate_coords, energy, accepted);

        log::debug!(
            "step {:?} - change {:+1.3e} {}",
            direction.as_slice(),
            energy - state.energy,
            if accepted { "accepted" } else { "rejected" }
        );

        if accepted {
            Ok((
                DescentState {
                    molecule: candidate,
                    energy,
                },
                true,
            ))
        } else {
            Ok((state, false))
        }
    }

    /// Steps along `direction` for as long as the energy decreases, with at most
    /// `max_line_steps` evaluations.
    pub fn line_search(
        &mut self,
        mut state: DescentState,
        direction: Vector3<f64>,
    ) -> Result<DescentState> {
        for _ in 0..self.config.max_line_steps {
            let (next, improved) = self.try_step(state, direction)?;
            state = next;
            if !improved {
                break;
            }
        }
        Ok(state)
    }

    fn directions(&self) -> [Vector3<f64>; 6] {
        let step = self.config.step_size;
        [
            Vector3::x() * step,
            -Vector3::x() * step,
            Vector3::y() * step,
            -Vector3::y() * step,
            Vector3::z() * step,
            -Vector3::z() * step,
        ]
    }

    /// One pass over the axis directions. `last_improved` carries the index of the direction
    /// that last lowered the energy across sweeps.
    fn sweep(
        &mut self,
        mut state: DescentState,
        last_improved: &mut Option<usize>,
    ) -> Result<DescentState> {
        for (k, direction) in self.directions().into_iter().enumerate() {
            let improved = match self.config.axis_search {
                AxisSearch::SingleStep => {
                    let (next, improved) = self.try_step(state, direction)?;
                    state = next;
                    improved
                }
                AxisSearch::LineSearch => {
                    let before = state.energy;
                    state = self.line_search(state, direction)?;
                    state.energy < before
                }
            };

            if improved {
                *last_improved = Some(k);
            } else if self.config.sweep_policy == SweepPolicy::StopOnRepeatedFailure
                && *last_improved == Some(k)
            {
                break;
            }
        }
        Ok(state)
    }

    pub fn run(&mut self, molecule: Molecule) -> Result<DescentOutcome> {
        let mut state = self.start(molecule)?;
        let mut previous_energy = f64::INFINITY;
        let mut last_improved = None;

        for iteration in 1..=self.config.max_iterations {
            let sweep_start = self.coords(&state.molecule)?;
            state = self.sweep(state, &mut last_improved)?;

            let displacement = self.coords(&state.molecule)? - sweep_start;
            if displacement.norm() > 0.0 {
                state = self.line_search(state, displacement)?;
            }

            log::info!(
                "iteration {iteration:<4} - energy {:1.8} after {} evaluations",
                state.energy,
                self.evaluations
            );

            if (previous_energy - state.energy).abs() < self.config.epsilon {
                return Ok(DescentOutcome {
                    molecule: state.molecule,
                    energy: state.energy,
                    evaluations: self.evaluations,
                    iterations: iteration,
                    converged: true,
                });
            }
            previous_energy = state.energy;
        }

        log::warn!(
            "coordinate descent did not converge within {} iterations",
            self.config.max_iterations
        );
        Ok(DescentOutcome {
            molecule: state.molecule,
            energy: state.energy,
            evaluations: self.evaluations,
            iterations: self.config.max_iterations,
            converged: false,
        })
    }
}

/// Moves atom `atom_index` to a position drawn uniformly from `[-1, 1)` Ångström along
/// every axis.
pub fn random_start(
    molecule: &Molecule,
    atom_index: usize,
    rng: &mut impl Rng,
) -> Result<Molecule> {
    let position = Vector3::from_fn(|_, _| rng.gen_range(-1.0..1.0));
    molecule.with_updated_atom(atom_index, position)
}
