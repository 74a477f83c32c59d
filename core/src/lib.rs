/// Builds a neutral singlet from `Element => (x, y, z)` pairs, positions in Ångström.
#[cfg(test)]
macro_rules! molecule {
    ($(
        $element:ident => ($x:expr, $y:expr, $z:expr)
    ),*) => {
        $crate::molecule::Molecule::neutral(vec![
            $($crate::atom::Atom::new(
                $crate::periodic_table::ElementType::$element,
                ::nalgebra::Vector3::new($x, $y, $z),
            )),*
        ])
        .unwrap()
    };
}

pub mod atom;
pub mod basis;
pub mod ci;
pub mod config;
mod diis;
pub mod error;
pub mod hf;
pub mod integrals;
pub mod molecule;
pub mod optimize;
pub mod oracle;
pub mod periodic_table;
pub mod report;

pub use error::{Error, Result};
pub use molecule::Molecule;
pub use oracle::{Energy, EnergyOracle, Method, OracleConfig, QuantumChemistryOracle};
