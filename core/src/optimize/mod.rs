//! Geometry optimizers driven by an [`EnergyOracle`](crate::oracle::EnergyOracle).

mod coordinate_descent;
mod distance;
mod simplex;

pub use coordinate_descent::{
    random_start, AxisSearch, CoordinateDescent, CoordinateDescentConfig, DescentOutcome,
    DescentState, SweepPolicy,
};
pub use distance::{DistanceFinder, DistanceFinderConfig, DistanceReport};
pub use simplex::{Minimizer, MinimizerResult, NelderMead};
