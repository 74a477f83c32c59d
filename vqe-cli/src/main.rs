use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, SeedableRng};
use vqe_core::{
    basis::BasisSet,
    config::ConfigMolecule,
    hf::HartreeFockConfig,
    optimize::{
        random_start, AxisSearch, CoordinateDescent, CoordinateDescentConfig, DistanceFinder,
        DistanceFinderConfig, NelderMead, SweepPolicy,
    },
    periodic_table::ElementType,
    report::{IterationInfo, LogReporter, Observer, TrajectoryRecorder},
    EnergyOracle, Method, Molecule, OracleConfig, QuantumChemistryOracle,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: VqeCommand,

    /// Log every oracle evaluation and SCF iteration. `RUST_LOG` takes precedence.
    #[arg(long, short, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum VqeCommand {
    /// Ground state energy of a single geometry
    Energy {
        /// A path to the molecule to compute the energy of
        #[arg(long, short)]
        molecule: PathBuf,
        #[command(flatten)]
        oracle: OracleArgs,
    },
    /// Coordinate descent over the position of the last atom
    Descend {
        /// A path to the starting geometry
        #[arg(long, short)]
        molecule: PathBuf,
        #[command(flatten)]
        oracle: OracleArgs,
        /// Length of a trial step in Ångström
        #[arg(long, default_value_t = 0.1)]
        step_size: f64,
        /// The search stops once an outer iteration lowers the energy by less than this
        #[arg(long, default_value_t = 0.01)]
        epsilon: f64,
        #[arg(long, default_value_t = 100)]
        max_iterations: usize,
        /// Maximum number of evaluations of a single line search
        #[arg(long, default_value_t = 50)]
        max_line_steps: usize,
        /// Line search along every axis instead of a single step
        #[arg(long)]
        line_search_axes: bool,
        /// End a sweep when the direction that improved last fails
        #[arg(long)]
        stop_on_repeated_failure: bool,
        /// Place the last atom at a random position in [-1, 1)^3 Å before starting
        #[arg(long)]
        random_start: bool,
        /// Seed of the random start
        #[arg(long, requires = "random_start")]
        seed: Option<u64>,
        /// Where to write the trajectory as json
        #[arg(long)]
        trajectory: Option<PathBuf>,
    },
    /// Equilibrium distance of a diatomic molecule
    Distance {
        #[arg(long, num_args = 2, value_names = ["FIXED", "MOVING"], default_values = ["H", "H"])]
        atoms: Vec<ElementType>,
        /// Starting separation in Ångström
        #[arg(long, default_value_t = 3.0)]
        init_distance: f64,
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        charge: i32,
        /// Spin multiplicity 2S + 1
        #[arg(long, default_value = "1")]
        multiplicity: NonZeroU32,
        /// Iteration budget of the simplex minimizer
        #[arg(long, default_value_t = 200)]
        max_iterations: usize,
        #[command(flatten)]
        oracle: OracleArgs,
        /// Where to write the trajectory as json
        #[arg(long)]
        trajectory: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MethodArg {
    /// full configuration interaction
    Fci,
    /// hartree fock
    Hf,
}

#[derive(Args, Debug)]
struct OracleArgs {
    /// Name of a built-in basis set or a path to a Basis Set Exchange json file
    #[arg(long, short, default_value = "sto3g")]
    basis: String,
    #[arg(long, value_enum, default_value_t = MethodArg::Fci)]
    method: MethodArg,
    /// The maximum number of iterations the SCF loop should attempt before the
    /// system is considered to not converge
    #[arg(long, default_value_t = 100)]
    max_scf_iterations: usize,
    /// if the rms of the density matrix drops below this, the system is considered
    /// converged
    #[arg(long, default_value_t = 1e-8)]
    scf_epsilon: f64,
    /// Wall clock budget of a single energy evaluation, in seconds
    #[arg(long)]
    time_limit: Option<f64>,
    /// Largest determinant space full configuration interaction may diagonalize
    #[arg(long, default_value_t = 2000)]
    max_determinants: usize,
}

impl OracleArgs {
    fn oracle(&self) -> anyhow::Result<QuantumChemistryOracle> {
        let basis_set = if Path::new(&self.basis).is_file() {
            BasisSet::load(&self.basis)
                .with_context(|| format!("failed to load basis set {}", self.basis))?
        } else {
            BasisSet::named(&self.basis)?
        };
        let time_limit = self
            .time_limit
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("invalid time limit of {secs} seconds"))
            })
            .transpose()?;

        Ok(QuantumChemistryOracle::new(OracleConfig {
            basis_set,
            method: match self.method {
                MethodArg::Fci => Method::FullConfigurationInteraction,
                MethodArg::Hf => Method::HartreeFock,
            },
            scf: HartreeFockConfig {
                max_iterations: self.max_scf_iterations,
                epsilon: self.scf_epsilon,
                time_limit,
            },
            max_determinants: self.max_determinants,
        }))
    }
}

fn load_molecule(path: &Path) -> anyhow::Result<Molecule> {
    let config = ConfigMolecule::load(path)
        .with_context(|| format!("failed to read molecule {}", path.display()))?;
    Ok(Molecule::try_from(config)?)
}

fn save_trajectory(recorder: &TrajectoryRecorder, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        recorder
            .save(path)
            .with_context(|| format!("failed to write trajectory {}", path.display()))?;
        println!("trajectory of {} evaluations written to {}", recorder.len(), path.display());
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) if verbose => {
            builder.filter_level(log::LevelFilter::Info);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Warn);
        }
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        VqeCommand::Energy { molecule, oracle } => {
            let molecule = load_molecule(&molecule)?;
            let mut oracle = oracle.oracle()?;

            let start = Instant::now();
            let energy = oracle.evaluate(&molecule)?;

            println!("energy evaluated in {:0.2?}", start.elapsed());
            println!("electronic energy: {:3.6}", energy.electronic);
            println!("nuclear repulsion energy: {:3.6}", energy.nuclear_repulsion);
            println!("total energy: {:3.6}", energy.total());
        }

        VqeCommand::Descend {
            molecule,
            oracle,
            step_size,
            epsilon,
            max_iterations,
            max_line_steps,
            line_search_axes,
            stop_on_repeated_failure,
            random_start: randomize,
            seed,
            trajectory,
        } => {
            let mut molecule = load_molecule(&molecule)?;
            if randomize {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                molecule = random_start(&molecule, molecule.atoms().len() - 1, &mut rng)?;
            }

            let config = CoordinateDescentConfig {
                step_size,
                epsilon,
                max_iterations,
                max_line_steps,
                sweep_policy: if stop_on_repeated_failure {
                    SweepPolicy::StopOnRepeatedFailure
                } else {
                    SweepPolicy::Exhaustive
                },
                axis_search: if line_search_axes {
                    AxisSearch::LineSearch
                } else {
                    AxisSearch::SingleStep
                },
                atom_index: None,
            };

            let mut logger = LogReporter::new();
            let mut recorder = TrajectoryRecorder::new();
            let start = Instant::now();
            let outcome = CoordinateDescent::new(config, oracle.oracle()?)
                .with_observer(|info: &IterationInfo| {
                    logger.on_evaluation(info);
                    recorder.on_evaluation(info);
                })
                .run(molecule)?;

            println!(
                "coordinate descent {} after {} iterations, {} evaluations and {:0.2?}",
                if outcome.converged { "converged" } else { "stopped" },
                outcome.iterations,
                outcome.evaluations,
                start.elapsed()
            );
            println!("total energy: {:3.6}", outcome.energy);
            println!(
                "{}",
                serde_json::to_string_pretty(&ConfigMolecule::from(&outcome.molecule))?
            );
            save_trajectory(&recorder, trajectory.as_deref())?;
        }

        VqeCommand::Distance {
            atoms,
            init_distance,
            tolerance,
            charge,
            multiplicity,
            max_iterations,
            oracle,
            trajectory,
        } => {
            let &[fixed, moving] = atoms.as_slice() else {
                anyhow::bail!("expected two atoms, got {}", atoms.len());
            };

            let mut logger = LogReporter::new();
            let mut recorder = TrajectoryRecorder::new();
            let start = Instant::now();
            let report = DistanceFinder::new(
                DistanceFinderConfig {
                    atoms: (fixed, moving),
                    init_distance,
                    tolerance,
                    charge,
                    multiplicity,
                },
                oracle.oracle()?,
            )?
            .with_minimizer(NelderMead {
                max_iterations,
                ..Default::default()
            })
            .with_observer(|info: &IterationInfo| {
                logger.on_evaluation(info);
                recorder.on_evaluation(info);
            })
            .run()?;

            println!(
                "distance search {} after {} iterations, {} evaluations and {:0.2?}",
                if report.converged { "converged" } else { "stopped" },
                report.iterations,
                report.evaluations,
                start.elapsed()
            );
            println!("optimal distance: {:1.4} Å", report.distance);
            println!("total energy: {:3.6}", report.energy);
            save_trajectory(&recorder, trajectory.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use vqe_core::periodic_table::ElementType;

    use super::{Cli, OracleArgs, VqeCommand};

    fn oracle_args(time_limit: &str) -> OracleArgs {
        let cli = Cli::try_parse_from([
            "vqe-cli",
            "energy",
            "--molecule",
            "water.json",
            &format!("--time-limit={time_limit}"),
        ])
        .unwrap();
        match cli.command {
            VqeCommand::Energy { oracle, .. } => oracle,
            command => panic!("unexpected command {command:?}"),
        }
    }

    #[test]
    fn time_limit() {
        let oracle = oracle_args("2.5").oracle().unwrap();
        assert_eq!(oracle.config().scf.time_limit, Some(Duration::from_millis(2500)));

        assert!(oracle_args("-1").oracle().is_err());
        assert!(oracle_args("NaN").oracle().is_err());
    }

    #[test]
    fn distance_spin_state() {
        let cli = Cli::try_parse_from([
            "vqe-cli",
            "distance",
            "--atoms",
            "H",
            "He",
            "--charge",
            "-1",
            "--multiplicity",
            "3",
        ])
        .unwrap();

        let VqeCommand::Distance {
            atoms,
            charge,
            multiplicity,
            ..
        } = cli.command
        else {
            panic!("expected the distance command");
        };
        assert_eq!(atoms, vec![ElementType::H, ElementType::He]);
        assert_eq!(charge, -1);
        assert_eq!(multiplicity.get(), 3);

        assert!(Cli::try_parse_from(["vqe-cli", "distance", "--multiplicity", "0"]).is_err());
    }
}
