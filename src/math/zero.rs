//! Bracketed scalar zero finding (Brent's method).

use crate::errors::PhydroError;
use log::debug;

/// Maximum number of Brent iterations before giving up.
const MAX_ITER: usize = 100;

/// Outcome of a successful bracketed zero search.
#[derive(Debug, Clone, Copy)]
pub struct ZeroResult {
    /// Abscissa at which the objective crosses zero, to within the
    /// requested tolerance.
    pub root: f64,
    /// Number of objective evaluations performed.
    pub nfnct: u32,
}

/// Find a zero of `f` in `[a, b]` using Brent's method.
///
/// The objective is evaluated only inside the bracket. Fails with
/// [`PhydroError::ConvergenceFailure`] if the bracket does not straddle a
/// sign change, or if the iteration budget is exhausted.
pub fn zero<F>(a: f64, b: f64, mut f: F, tol: f64) -> Result<ZeroResult, PhydroError>
where
    F: FnMut(f64) -> f64,
{
    let mut nfnct: u32 = 2;
    let (mut a, mut b) = (a, b);
    let mut fa = f(a);
    let mut fb = f(b);

    if fa == 0.0 {
        return Ok(ZeroResult { root: a, nfnct });
    }
    if fb == 0.0 {
        return Ok(ZeroResult { root: b, nfnct });
    }
    if fa.signum() == fb.signum() {
        return Err(PhydroError::ConvergenceFailure(format!(
            "no sign change in bracket [{a}, {b}]: f(a)={fa}, f(b)={fb}"
        )));
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = b - a;

    for iter in 0..MAX_ITER {
        if fb.signum() == fc.signum() {
            // Best estimate and the counterpoint must bracket the root.
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            debug!("zero: converged to {b} after {iter} iterations ({nfnct} evaluations)");
            return Ok(ZeroResult { root: b, nfnct });
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            // Attempt inverse quadratic interpolation (secant if a == c).
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                // Interpolation accepted.
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += tol1.copysign(xm);
        }
        fb = f(b);
        nfnct += 1;
    }

    Err(PhydroError::ConvergenceFailure(format!(
        "zero finder exhausted {MAX_ITER} iterations (last estimate {b})"
    )))
}
