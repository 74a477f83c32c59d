use crate::error::Result;

/// The outcome of a minimization
#[derive(Clone, Debug, PartialEq)]
pub struct MinimizerResult {
    /// best point that was found
    pub point: Vec<f64>,
    /// objective value at `point`
    pub value: f64,
    /// whether the convergence criterion was met before the iteration budget ran out
    pub converged: bool,
    pub iterations: usize,
    pub evaluations: usize,
}

/// A derivative free minimizer of scalar functions.
pub trait Minimizer {
    /// Minimizes `objective` starting from `initial`. Errors returned by the objective abort the
    /// minimization. Running out of iterations is not an error; it is reported through
    /// [`MinimizerResult::converged`].
    fn minimize<F>(&self, objective: F, initial: &[f64], tolerance: f64) -> Result<MinimizerResult>
    where
        F: FnMut(&[f64]) -> Result<f64>;
}

/// The Nelder-Mead downhill simplex method
#[derive(Clone, Debug, PartialEq)]
pub struct NelderMead {
    pub max_iterations: usize,
    /// offset of the initial simplex vertices from the starting point, along each coordinate
    pub initial_step: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            initial_step: 0.5,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

struct Vertex {
    point: Vec<f64>,
    value: f64,
}

/// a + t (b - a)
fn along(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(a, b)| a + t * (b - a)).collect()
}

impl Minimizer for NelderMead {
    fn minimize<F>(
        &self,
        mut objective: F,
        initial: &[f64],
        tolerance: f64,
    ) -> Result<MinimizerResult>
    where
        F: FnMut(&[f64]) -> Result<f64>,
    {
        let n = initial.len();
        let mut evaluations = 0;
        let mut evaluate = |point: Vec<f64>| -> Result<Vertex> {
            evaluations += 1;
            let value = objective(&point)?;
            Ok(Vertex { point, value })
        };

        let mut simplex = Vec::with_capacity(n + 1);
        simplex.push(evaluate(initial.to_vec())?);
        for i in 0..n {
            let mut point = initial.to_vec();
            point[i] += self.initial_step;
            simplex.push(evaluate(point)?);
        }

        let point_tolerance = tolerance.max(1e-4);
        let mut converged = false;
        let mut iterations = 0;
        while iterations < self.max_iterations {
            // stable, so the incumbent stays first among equal values
            simplex.sort_by(|a, b| a.value.total_cmp(&b.value));

            let spread = simplex[n].value - simplex[0].value;
            let diameter = simplex[1..]
                .iter()
                .flat_map(|vertex| {
                    vertex
                        .point
                        .iter()
                        .zip(&simplex[0].point)
                        .map(|(a, b)| (a - b).abs())
                })
                .fold(0.0, f64::max);
            if spread <= tolerance && diameter <= point_tolerance {
                converged = true;
                break;
            }
            iterations += 1;

            let mut centroid = vec![0.0; n];
            for vertex in &simplex[..n] {
                for (c, x) in centroid.iter_mut().zip(&vertex.point) {
                    *c += x / n as f64;
                }
            }

            let worst = &simplex[n];
            let reflected = evaluate(along(&centroid, &worst.point, -self.reflection))?;

            if reflected.value < simplex[0].value {
                let expanded = evaluate(along(&centroid, &reflected.point, self.expansion))?;
                simplex[n] = if expanded.value < reflected.value {
                    expanded
                } else {
                    reflected
                };
                continue;
            }

            if reflected.value < simplex[n - 1].value {
                simplex[n] = reflected;
                continue;
            }

            let contracted = if reflected.value < simplex[n].value {
                evaluate(along(&centroid, &reflected.point, self.contraction))?
            } else {
                evaluate(along(&centroid, &simplex[n].point, self.contraction))?
            };
            if contracted.value < reflected.value.min(simplex[n].value) {
                simplex[n] = contracted;
                continue;
            }

            let best = simplex[0].point.clone();
            for vertex in simplex.iter_mut().skip(1) {
                *vertex = evaluate(along(&best, &vertex.point, self.shrink))?;
            }
        }

        simplex.sort_by(|a, b| a.value.total_cmp(&b.value));
        let Vertex { point, value } = simplex.swap_remove(0);
        if !converged {
            log::warn!("nelder mead did not converge within {iterations} iterations");
        }

        Ok(MinimizerResult {
            point,
            value,
            converged,
            iterations,
            evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::error::Error;

    use super::{Minimizer, NelderMead};

    #[test]
    fn quadratic_bowl() {
        let minimizer = NelderMead {
            max_iterations: 1000,
            ..Default::default()
        };
        let result = minimizer
            .minimize(
                |x| Ok((x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2) + (x[2] - 2.0).powi(2)),
                &[0.0, 0.0, 0.0],
                1e-6,
            )
            .unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.point[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.point[1], -0.5, epsilon = 1e-3);
        assert_relative_eq!(result.point[2], 2.0, epsilon = 1e-3);
        assert!(result.value < 1e-6);
    }

    #[test]
    fn counts_evaluations() {
        let mut calls = 0;
        let result = NelderMead::default()
            .minimize(
                |x| {
                    calls += 1;
                    Ok(x[0].powi(2))
                },
                &[3.0],
                1e-6,
            )
            .unwrap();

        assert_eq!(result.evaluations, calls);
    }

    #[test]
    fn flat_objective_keeps_the_start() {
        let result = NelderMead::default()
            .minimize(|_| Ok(-1.8), &[0.0, 0.0, 3.0], 0.01)
            .unwrap();

        assert!(result.converged);
        assert_eq!(result.point, vec![0.0, 0.0, 3.0]);
        assert_eq!(result.value, -1.8);
    }

    #[test]
    fn iteration_budget() {
        let minimizer = NelderMead {
            max_iterations: 3,
            ..Default::default()
        };
        let result = minimizer
            .minimize(|x| Ok(x[0].powi(2) + x[1].powi(2)), &[10.0, 10.0], 1e-12)
            .unwrap();

        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }

    #[test]
    fn objective_errors_propagate() {
        let result = NelderMead::default().minimize(
            |_| Err(Error::NonFiniteEnergy),
            &[0.0, 0.0, 0.0],
            0.01,
        );
        assert!(matches!(result, Err(Error::NonFiniteEnergy)));
    }
}
