//! Golden-section search on a bracketed interval.
//!
//! A derivative-free line optimizer: each step shrinks the bracket by the
//! inverse golden ratio, reusing one interior evaluation, so the number of
//! iterations for a given tolerance is fixed and the search is fully
//! deterministic.

/// Inverse golden ratio.
const INVPHI: f64 = 0.618_033_988_749_894_8;

/// Outcome of a golden-section search.
#[derive(Debug, Clone, Copy)]
pub struct GoldenResult {
    /// Location of the optimum within the supplied bracket.
    pub x: f64,
    /// Number of bracket-shrinking iterations performed.
    pub niter: u32,
}

/// Minimize `f` over `[lo, hi]`, shrinking the bracket until its width is
/// below `tol`.
pub fn minimize<F>(lo: f64, hi: f64, mut f: F, tol: f64) -> GoldenResult
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = (lo, hi);
    let mut h = b - a;

    let mut c = b - INVPHI * h;
    let mut d = a + INVPHI * h;
    let mut fc = f(c);
    let mut fd = f(d);
    let mut niter: u32 = 0;

    while h > tol {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            h = b - a;
            c = b - INVPHI * h;
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            h = b - a;
            d = a + INVPHI * h;
            fd = f(d);
        }
        niter += 1;
    }

    let x = if fc < fd { 0.5 * (a + d) } else { 0.5 * (c + b) };
    GoldenResult { x, niter }
}

/// Maximize `f` over `[lo, hi]`; thin wrapper over [`minimize`] with the
/// objective negated.
pub fn maximize<F>(lo: f64, hi: f64, mut f: F, tol: f64) -> GoldenResult
where
    F: FnMut(f64) -> f64,
{
    minimize(lo, hi, |x| -f(x), tol)
}
