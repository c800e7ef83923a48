//! Two-dimensional downhill simplex (Nelder–Mead) minimization.
//!
//! The profit surface solved here is smooth and low-dimensional, so a
//! plain simplex with the standard reflection/expansion/contraction
//! coefficients is sufficient. The search is deterministic for fixed
//! inputs: the initial simplex is built from the starting point and a
//! fixed step, and there is no randomized restart.

use crate::errors::PhydroError;
use log::debug;
use nalgebra::Vector2;

const ALPHA: f64 = 1.0; // reflection
const GAMMA: f64 = 2.0; // expansion
const RHO: f64 = 0.5; // contraction
const SIGMA: f64 = 0.5; // shrink

/// Outcome of a simplex minimization.
#[derive(Debug, Clone, Copy)]
pub struct SimplexResult {
    /// Location of the minimum.
    pub x: Vector2<f64>,
    /// Objective value at the minimum.
    pub fmin: f64,
    /// Number of simplex iterations performed.
    pub niter: u32,
    /// Number of objective evaluations performed.
    pub nfev: u32,
}

/// Minimize `f` starting from `x0`, with an initial simplex of edge
/// length `step` along each axis.
///
/// Converges when the spread of objective values across the simplex falls
/// below `ftol`; fails with [`PhydroError::ConvergenceFailure`] if
/// `max_iter` is exhausted first.
pub fn minimize<F>(
    mut f: F,
    x0: Vector2<f64>,
    step: Vector2<f64>,
    ftol: f64,
    max_iter: u32,
) -> Result<SimplexResult, PhydroError>
where
    F: FnMut(&Vector2<f64>) -> f64,
{
    let mut nfev: u32 = 0;
    let mut eval = |x: &Vector2<f64>, nfev: &mut u32| {
        *nfev += 1;
        f(x)
    };

    let mut simplex = [
        x0,
        x0 + Vector2::new(step.x, 0.0),
        x0 + Vector2::new(0.0, step.y),
    ];
    let mut values = [
        eval(&simplex[0], &mut nfev),
        eval(&simplex[1], &mut nfev),
        eval(&simplex[2], &mut nfev),
    ];

    for niter in 0..max_iter {
        // Order the simplex: best, middle, worst.
        let mut order = [0usize, 1, 2];
        order.sort_by(|&i, &j| values[i].total_cmp(&values[j]));
        let (best, mid, worst) = (order[0], order[1], order[2]);

        if (values[worst] - values[best]).abs() <= ftol {
            debug!(
                "nelder_mead: converged after {niter} iterations ({nfev} evaluations), fmin={}",
                values[best]
            );
            return Ok(SimplexResult {
                x: simplex[best],
                fmin: values[best],
                niter,
                nfev,
            });
        }

        let centroid = (simplex[best] + simplex[mid]) / 2.0;
        let reflected = centroid + ALPHA * (centroid - simplex[worst]);
        let f_reflected = eval(&reflected, &mut nfev);

        if f_reflected < values[best] {
            let expanded = centroid + GAMMA * (reflected - centroid);
            let f_expanded = eval(&expanded, &mut nfev);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
        } else if f_reflected < values[mid] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
        } else {
            let contracted = centroid + RHO * (simplex[worst] - centroid);
            let f_contracted = eval(&contracted, &mut nfev);
            if f_contracted < values[worst] {
                simplex[worst] = contracted;
                values[worst] = f_contracted;
            } else {
                // Shrink toward the best vertex.
                for i in [mid, worst] {
                    simplex[i] = simplex[best] + SIGMA * (simplex[i] - simplex[best]);
                    values[i] = eval(&simplex[i], &mut nfev);
                }
            }
        }
    }

    Err(PhydroError::ConvergenceFailure(format!(
        "simplex exhausted {max_iter} iterations without reaching ftol={ftol}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_quadratic_bowl() {
        let res = minimize(
            |x| (x.x - 1.5).powi(2) + 2.0 * (x.y + 0.5).powi(2),
            Vector2::new(0.0, 0.0),
            Vector2::new(0.5, 0.5),
            1e-12,
            500,
        )
        .unwrap();
        assert!(
            is_close!(res.x.x, 1.5, abs_tol = 1e-4),
            "Expected x=1.5, got {}",
            res.x.x
        );
        assert!(
            is_close!(res.x.y, -0.5, abs_tol = 1e-4),
            "Expected y=-0.5, got {}",
            res.x.y
        );
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            minimize(
                |x| x.x.powi(2) + x.y.powi(2) + (x.x * x.y).sin(),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.3, 0.3),
                1e-12,
                500,
            )
            .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.x, b.x, "Fixed inputs must give identical results");
        assert_eq!(a.nfev, b.nfev);
    }

    #[test]
    fn test_iteration_cap() {
        let res = minimize(
            |x| x.x + x.y, // unbounded below
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            1e-12,
            20,
        );
        assert!(matches!(res, Err(PhydroError::ConvergenceFailure(_))));
    }
}
