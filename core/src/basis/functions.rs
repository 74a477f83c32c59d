use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Function of the form K*x^i*y^j*z^k*exp(-alpha*x^2)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub exponent: f64,
    /// The coefficient of this gaussian and optionally the normalization constant
    pub coefficient: f64,
    /// (i, j, k) exponents of polynomial terms
    pub angular: (i32, i32, i32),
}

impl Gaussian {
    pub fn norm(exponent: f64, angular: (i32, i32, i32)) -> f64 {
        let (i, j, k) = angular;

        (std::f64::consts::FRAC_2_PI * exponent)
            .powi(3)
            .sqrt()
            .sqrt()
            * f64::sqrt(
                (8.0 * exponent).powi(i + j + k)
                    / ((i + 1..=2 * i).product::<i32>()
                        * (j + 1..=2 * j).product::<i32>()
                        * (k + 1..=2 * k).product::<i32>()) as f64,
            )
    }
}

/// Linear combination of many [`Gaussian`]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractedGaussian(pub SmallVec<[Gaussian; 6]>);

impl ContractedGaussian {
    /// Rescales the coefficients so that the contraction has unit norm. Basis set libraries
    /// publish coefficients for normalized primitives, but the contraction itself is only
    /// normalized to the printed precision.
    pub fn normalized(self) -> Self {
        let ContractedGaussian(primitives) = self;

        let mut norm_squared = 0.0;
        for (a, b) in itertools::iproduct!(&primitives, &primitives) {
            norm_squared += a.coefficient * b.coefficient * same_center_overlap(a, b);
        }

        let scale = norm_squared.sqrt().recip();
        ContractedGaussian(
            primitives
                .into_iter()
                .map(|primitive| Gaussian {
                    coefficient: primitive.coefficient * scale,
                    ..primitive
                })
                .collect(),
        )
    }

    pub fn primitives(&self) -> &[Gaussian] {
        &self.0
    }
}

/// Overlap of two primitives that share a center and an angular part.
fn same_center_overlap(a: &Gaussian, b: &Gaussian) -> f64 {
    let p = a.exponent + b.exponent;
    let (i, j, k) = a.angular;

    let axis = |l: i32| {
        let double_factorial = (1..2 * l).step_by(2).product::<i32>() as f64;
        double_factorial / (2.0 * p).powi(l)
    };

    (std::f64::consts::PI / p).powi(3).sqrt() * axis(i) * axis(j) * axis(k)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    /// The type of basis function this basis function has
    pub contracted_gaussian: ContractedGaussian,
    /// The position of this basis function, in natural units
    pub position: Vector3<f64>,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use smallvec::smallvec;

    use super::{same_center_overlap, ContractedGaussian, Gaussian};

    #[test]
    fn normalized_primitives_have_unit_self_overlap() {
        for angular in [(0, 0, 0), (1, 0, 0), (0, 2, 0), (1, 1, 0)] {
            let primitive = Gaussian {
                exponent: 0.8,
                coefficient: Gaussian::norm(0.8, angular),
                angular,
            };
            let overlap = primitive.coefficient.powi(2) * same_center_overlap(&primitive, &primitive);
            assert_relative_eq!(overlap, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn contraction_is_normalized() {
        let contracted = ContractedGaussian(smallvec![
            Gaussian {
                exponent: 3.0,
                coefficient: 2.0,
                angular: (0, 0, 1),
            },
            Gaussian {
                exponent: 0.5,
                coefficient: 0.7,
                angular: (0, 0, 1),
            },
        ])
        .normalized();

        let mut norm = 0.0;
        for a in contracted.primitives() {
            for b in contracted.primitives() {
                norm += a.coefficient * b.coefficient * same_center_overlap(a, b);
            }
        }
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
    }
}
