use std::collections::HashMap;

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    basis::{AtomicBasis, BasisSet, ContractedGaussian, ElectronShell, Gaussian},
    error::Error,
    periodic_table::ElementType,
};

/// A basis set as downloaded from the Basis Set Exchange in json format.
#[derive(Deserialize)]
pub(crate) struct ConfigBasisSet {
    #[serde(default)]
    name: Option<String>,
    elements: HashMap<ElementType, ConfigElectronicConfiguration>,
}

#[derive(Deserialize)]
struct ConfigElectronicConfiguration {
    electron_shells: Vec<ConfigElectronShell>,
}

#[derive(Deserialize)]
struct ConfigElectronShell {
    function_type: String,
    angular_momentum: Vec<i32>,
    exponents: Vec<String>,
    coefficients: Vec<Vec<String>>,
}

impl TryFrom<ConfigBasisSet> for BasisSet {
    type Error = Error;

    fn try_from(value: ConfigBasisSet) -> Result<Self, Self::Error> {
        let mut atomic_mapping = HashMap::with_capacity(value.elements.len());

        for (element, configuration) in value.elements {
            let mut element_atomic_basis = AtomicBasis::empty();

            for electron_shell in &configuration.electron_shells {
                element_atomic_basis
                    .shells
                    .extend(parse_shell(element, electron_shell)?);
            }

            atomic_mapping.insert(element, element_atomic_basis);
        }

        let name = value.name.unwrap_or_else(|| "custom".to_owned());
        Ok(Self::new(name, atomic_mapping))
    }
}

/// Split a (possibly combined, e.g. `sp`) shell into one [`ElectronShell`] per angular momentum
fn parse_shell(
    element: ElementType,
    electron_shell: &ConfigElectronShell,
) -> Result<Vec<ElectronShell>, Error> {
    if !electron_shell.function_type.starts_with("gto") {
        return Err(Error::BasisSetParse(format!(
            "{element}: unsupported function type `{}`",
            electron_shell.function_type
        )));
    }

    if electron_shell.coefficients.len() != electron_shell.angular_momentum.len() {
        return Err(Error::BasisSetParse(format!(
            "{element}: {} coefficient sets for {} angular momenta",
            electron_shell.coefficients.len(),
            electron_shell.angular_momentum.len()
        )));
    }

    let exponents = electron_shell
        .exponents
        .iter()
        .map(|exponent| parse_number(element, exponent))
        .collect::<Result<Vec<_>, _>>()?;

    let mut shells = Vec::with_capacity(electron_shell.angular_momentum.len());
    for (&angular_magnitude, coefficients) in electron_shell
        .angular_momentum
        .iter()
        .zip(&electron_shell.coefficients)
    {
        if coefficients.len() != exponents.len() {
            return Err(Error::BasisSetParse(format!(
                "{element}: {} coefficients for {} exponents",
                coefficients.len(),
                exponents.len()
            )));
        }

        let coefficients = coefficients
            .iter()
            .map(|coefficient| parse_number(element, coefficient))
            .collect::<Result<Vec<_>, _>>()?;

        let mut shell = ElectronShell::new(angular_magnitude);
        for angular in generate_angular_vectors(angular_magnitude) {
            let primitives = exponents
                .iter()
                .zip(&coefficients)
                .map(|(&exponent, &coefficient)| Gaussian {
                    exponent,
                    coefficient: coefficient * Gaussian::norm(exponent, angular),
                    angular,
                })
                .collect::<SmallVec<_>>();

            shell
                .basis_functions
                .push(ContractedGaussian(primitives).normalized());
        }
        shells.push(shell);
    }

    Ok(shells)
}

fn parse_number(element: ElementType, text: &str) -> Result<f64, Error> {
    // some sources still use fortran style exponents
    text.trim()
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|err| Error::BasisSetParse(format!("{element}: `{text}` {err}")))
}

// generate all (i, j, k) such that i + j + k = angular
fn generate_angular_vectors(angular_magnitude: i32) -> Vec<(i32, i32, i32)> {
    let mut angular_vectors = Vec::with_capacity(8);

    for (i, j, k) in itertools::iproduct!(
        0..=angular_magnitude,
        0..=angular_magnitude,
        0..=angular_magnitude
    ) {
        if i + j + k == angular_magnitude {
            angular_vectors.push((i, j, k));
        }
    }

    angular_vectors
}

#[cfg(test)]
mod tests {
    use crate::basis::BasisSet;

    use super::{generate_angular_vectors, ConfigBasisSet};

    #[test]
    fn angular_vectors() {
        assert_eq!(generate_angular_vectors(0), vec![(0, 0, 0)]);
        assert_eq!(generate_angular_vectors(1).len(), 3);
        assert_eq!(generate_angular_vectors(2).len(), 6);
    }

    #[test]
    fn rejects_mismatched_coefficients() {
        const BROKEN: &str = r#"{"elements":{"1":{"electron_shells":[{"function_type":"gto","angular_momentum":[0],"exponents":["1.0","2.0"],"coefficients":[["0.5"]]}]}}}"#;
        let config: ConfigBasisSet = serde_json::from_str(BROKEN).unwrap();
        assert!(BasisSet::try_from(config).is_err());
    }

    #[test]
    fn fortran_exponents() {
        const BASIS: &str = r#"{"name":"one-s","elements":{"H":{"electron_shells":[{"function_type":"gto","angular_momentum":[0],"exponents":["0.1D+01"],"coefficients":[["1.0"]]}]}}}"#;
        let config: ConfigBasisSet = serde_json::from_str(BASIS).unwrap();
        let basis_set = BasisSet::try_from(config).unwrap();
        assert_eq!(basis_set.name(), "one-s");
    }
}
