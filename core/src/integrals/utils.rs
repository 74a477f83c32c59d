//! Recursions shared by the McMurchie-Davidson integrals.
use nalgebra::Vector3;

/// Hermite expansion coefficient E_t^{ij} of the product of two one dimensional gaussians with
/// exponents `a` and `b`, separated by `diff = A - B` along that axis.
pub(crate) fn hermite_expansion([i, j, t]: [i32; 3], diff: f64, a: f64, b: f64) -> f64 {
    let p = a + b;
    let q = a * b / p;

    if i < 0 || j < 0 || t < 0 || t > i + j {
        0.0
    } else if i == 0 && j == 0 && t == 0 {
        (-q * diff * diff).exp()
    } else if j == 0 {
        // decrement i
        (2.0 * p).recip() * hermite_expansion([i - 1, j, t - 1], diff, a, b)
            - (q * diff / a) * hermite_expansion([i - 1, j, t], diff, a, b)
            + (t + 1) as f64 * hermite_expansion([i - 1, j, t + 1], diff, a, b)
    } else {
        // decrement j
        (2.0 * p).recip() * hermite_expansion([i, j - 1, t - 1], diff, a, b)
            + (q * diff / b) * hermite_expansion([i, j - 1, t], diff, a, b)
            + (t + 1) as f64 * hermite_expansion([i, j - 1, t + 1], diff, a, b)
    }
}

/// Hermite coulomb integral R_{tuv}^n, with `diff` being the vector from the second center to
/// the gaussian product center (P - C for nuclear attraction, P - Q for electron repulsion).
pub(crate) fn coulomb_auxiliary(t: i32, u: i32, v: i32, n: i32, p: f64, diff: Vector3<f64>) -> f64 {
    if t < 0 || u < 0 || v < 0 {
        return 0.0;
    }

    if t == 0 && u == 0 && v == 0 {
        return (-2.0 * p).powi(n) * boys(n, p * diff.norm_squared());
    }

    if t == 0 && u == 0 {
        (v - 1) as f64 * coulomb_auxiliary(t, u, v - 2, n + 1, p, diff)
            + diff.z * coulomb_auxiliary(t, u, v - 1, n + 1, p, diff)
    } else if t == 0 {
        (u - 1) as f64 * coulomb_auxiliary(t, u - 2, v, n + 1, p, diff)
            + diff.y * coulomb_auxiliary(t, u - 1, v, n + 1, p, diff)
    } else {
        (t - 1) as f64 * coulomb_auxiliary(t - 2, u, v, n + 1, p, diff)
            + diff.x * coulomb_auxiliary(t - 1, u, v, n + 1, p, diff)
    }
}

/// Above this argument the asymptotic form is exact to machine precision.
const BOYS_ASYMPTOTIC_LIMIT: f64 = 35.0;
const BOYS_SERIES_TOLERANCE: f64 = 1e-16;

/// The Boys function F_n(x) = ∫_0^1 t^{2n} exp(-x t^2) dt.
pub(crate) fn boys(n: i32, x: f64) -> f64 {
    let two_n_plus_one = (2 * n + 1) as f64;

    if x < 1e-14 {
        return two_n_plus_one.recip() - x / (2 * n + 3) as f64;
    }

    if x > BOYS_ASYMPTOTIC_LIMIT {
        // (2n - 1)!! / 2^(n + 1) * sqrt(pi / x^(2n + 1))
        let double_factorial = (1..2 * n).step_by(2).map(|k| k as f64).product::<f64>();
        return double_factorial / 2f64.powi(n + 1)
            * (std::f64::consts::PI / x.powi(2 * n + 1)).sqrt();
    }

    // F_n(x) = exp(-x) * sum_k (2x)^k / ((2n + 1)(2n + 3)...(2n + 2k + 1))
    let mut term = two_n_plus_one.recip();
    let mut sum = term;
    let mut denominator = two_n_plus_one;
    while term > BOYS_SERIES_TOLERANCE * sum {
        denominator += 2.0;
        term *= 2.0 * x / denominator;
        sum += term;
    }

    (-x).exp() * sum
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    use super::{boys, coulomb_auxiliary, hermite_expansion};

    #[test]
    fn boys_limits() {
        assert_relative_eq!(boys(0, 0.0), 1.0);
        assert_relative_eq!(boys(2, 0.0), 0.2);

        // F_0(x) = sqrt(pi / x) / 2 * erf(sqrt(x)); erf(1) = 0.8427007929497149
        assert_relative_eq!(
            boys(0, 1.0),
            0.5 * std::f64::consts::PI.sqrt() * 0.8427007929497149,
            epsilon = 1e-14
        );

        // both branches agree around the switch
        assert_relative_eq!(boys(0, 34.999), boys(0, 35.001), epsilon = 1e-5);
        assert_relative_eq!(boys(3, 34.999), boys(3, 35.001), epsilon = 1e-7);
    }

    #[test]
    fn boys_downward_recursion() {
        // F_n(x) = (2x F_{n+1}(x) + exp(-x)) / (2n + 1)
        for x in [0.3_f64, 2.5, 12.0, 30.0] {
            for n in 0..4 {
                let recursed = (2.0 * x * boys(n + 1, x) + (-x).exp()) / (2 * n + 1) as f64;
                assert_relative_eq!(boys(n, x), recursed, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn hermite_expansion_base_cases() {
        assert_relative_eq!(hermite_expansion([0, 0, 0], 0.0, 1.0, 1.0), 1.0);
        assert_eq!(hermite_expansion([0, 0, 1], 0.5, 1.0, 1.0), 0.0);
        assert_eq!(hermite_expansion([-1, 0, 0], 0.5, 1.0, 1.0), 0.0);
        // E_1^{10} = 1 / 2p
        assert_relative_eq!(hermite_expansion([1, 0, 1], 0.0, 1.0, 1.0), 0.25);
    }

    #[test]
    fn coulomb_auxiliary_at_origin() {
        assert_relative_eq!(coulomb_auxiliary(0, 0, 0, 0, 1.3, Vector3::zeros()), 1.0);
        // odd derivatives vanish for coinciding centers
        assert_relative_eq!(coulomb_auxiliary(1, 0, 0, 0, 1.3, Vector3::zeros()), 0.0);
    }
}
