//! Profit objective and its derivative machinery.
//!
//! The stomatal operating point maximizes
//! $$F(\Delta\psi, J_{max}) = A - \alpha J_{max} - \gamma \Delta\psi^2$$
//! where `A` couples the hydraulic supply ([`crate::hydraulics`]) to the
//! biochemical demand ([`crate::photosynthesis`]). This module provides
//! the objective for the numerical paths and the semi-analytical
//! reduction used by the analytical paths: stationarity of F in dpsi
//! gives a closed-form optimal chi at every dpsi, and stationarity in
//! chi then becomes a scalar root-finding problem in dpsi alone.
//!
//! Internal unit convention: CO2 quantities as mole fractions
//! (umol/mol), conductance in mol m-2 s-1, dpsi in MPa, rates in
//! umol m-2 s-1.

use crate::errors::PhydroError;
use crate::hydraulics::{calc_gs, calc_gs_prime};
use crate::math::zero;
use crate::parameters::{ParCost, ParEnv, ParPhotosynth, ParPlant};
use crate::photosynthesis::{
    calc_assim_light_limited, calc_assimilation_limiting, calc_electron_transport,
};
use log::{debug, warn};

/// Cap on the electron-transport ratio J/Jlim when back-deriving the
/// marginal Jmax cost; keeps the objective finite as J approaches the
/// light-limited ceiling.
const J_RATIO_CAP: f64 = 0.999;

/// Steady-state profit at decision variables `(dpsi, jmax)`.
pub fn profit(
    dpsi: f64,
    jmax: f64,
    psi_soil: f64,
    par_plant: &ParPlant,
    par_env: &ParEnv,
    par_photosynth: &ParPhotosynth,
    par_cost: &ParCost,
) -> f64 {
    let gs = calc_gs(dpsi, psi_soil, par_plant, par_env);
    let aj = calc_assim_light_limited(gs, jmax, par_photosynth);
    aj.a - par_cost.alpha * jmax - par_cost.gamma * dpsi * dpsi
}

/// Instantaneous profit at `dpsi` under fixed, already-paid-for
/// capacities: only the hydraulic risk term remains on the cost side.
#[allow(clippy::too_many_arguments)]
pub fn profit_instantaneous(
    dpsi: f64,
    vcmax: f64,
    jmax: f64,
    psi_soil: f64,
    par_plant: &ParPlant,
    par_env: &ParEnv,
    par_photosynth: &ParPhotosynth,
    par_cost: &ParCost,
) -> f64 {
    let gs = calc_gs(dpsi, psi_soil, par_plant, par_env);
    let a = calc_assimilation_limiting(vcmax, jmax, gs, par_photosynth).a;
    a - par_cost.gamma * dpsi * dpsi
}

/// Optimal ci/ca ratio at a given `dpsi`, from the stationarity of the
/// profit in dpsi.
///
/// Eliminating gs and J between the supply/demand equalities turns the
/// condition `dF/ddpsi = 0` into a quadratic in chi; the physical root is
/// the smaller one, evaluated in the cancellation-free `a0 / qhat` form
/// (the quadratic coefficient changes sign inside the feasible interval,
/// the root itself stays finite).
pub fn calc_x_from_dpsi(
    dpsi: f64,
    psi_soil: f64,
    par_plant: &ParPlant,
    par_env: &ParEnv,
    par_photosynth: &ParPhotosynth,
    par_cost: &ParCost,
) -> f64 {
    let gsprime = calc_gs_prime(dpsi, psi_soil, par_plant, par_env);
    let ca = par_photosynth.ca_mole_fraction();
    let gstar = par_photosynth.gammastar_mole_fraction();
    let km = par_photosynth.kmm_mole_fraction();
    let d = par_photosynth.delta;
    let y = par_cost.gamma;

    // Slope of the light-limited demand curve in ci, common to both
    // stationarity conditions.
    let s = gstar * (3.0 - 2.0 * d) + d * km;

    let p = gsprime * s * ca * ca;
    let q = 2.0 * y * dpsi * ca * (gstar + d * km);
    let r = 2.0 * y * dpsi * ca * ca * (1.0 - d);
    let t = 2.0 * y * dpsi * s * ca;
    let u = 4.0 * y * dpsi * gstar * (gstar + d * km);

    let a2 = p - r;
    let a1 = 2.0 * (q - p);
    let a0 = p - t + u;

    let disc = (a1 * a1 - 4.0 * a2 * a0).max(0.0);
    let qhat = 0.5 * (-a1 + disc.sqrt());
    let mut x = a0 / qhat;

    let x_min = (gstar + d * km) / (ca * (1.0 - d));
    if x < x_min {
        warn!("chi fell below the compensation ratio at dpsi={dpsi}; clamping");
        x = x_min + 1e-12;
    }
    x
}

/// Electron transport rate required to support the operating point
/// `(gs, x)`, inverting the light-limited demand curve.
pub fn calc_j(gs: f64, x: f64, par_photosynth: &ParPhotosynth) -> f64 {
    let ca = par_photosynth.ca_mole_fraction();
    let g = par_photosynth.gammastar / par_photosynth.ca;
    let k = par_photosynth.kmm / par_photosynth.ca;
    let d = par_photosynth.delta;
    4.0 * gs * ca * (1.0 - x) * (x + 2.0 * g) / ((1.0 - d) * x - (g + d * k))
}

/// Capacity whose light response delivers electron transport `j`.
pub fn calc_jmax_from_j(j: f64, par_photosynth: &ParPhotosynth) -> Result<f64, PhydroError> {
    let ij = 4.0 * par_photosynth.phi0 * par_photosynth.iabs;
    let r = j / ij;
    if !(0.0..1.0).contains(&r) {
        return Err(PhydroError::ConvergenceFailure(format!(
            "required electron transport {j} exceeds the light-limited ceiling {ij}"
        )));
    }
    Ok(j / (1.0 - r * r).sqrt())
}

/// Marginal capacity cost dJmax/dJ of delivering one more unit of
/// electron transport, capped near the light-limited ceiling.
fn calc_djmax_dj(j: f64, par_photosynth: &ParPhotosynth) -> f64 {
    let ij = 4.0 * par_photosynth.phi0 * par_photosynth.iabs;
    let r = (j / ij).min(J_RATIO_CAP);
    (1.0 - r * r).powf(-1.5)
}

/// Sensitivity dJ/dchi of the required electron transport to the ci/ca
/// ratio at fixed conductance.
fn calc_dj_dchi(gs: f64, x: f64, par_photosynth: &ParPhotosynth) -> f64 {
    let ca = par_photosynth.ca_mole_fraction();
    let g = par_photosynth.gammastar / par_photosynth.ca;
    let k = par_photosynth.kmm / par_photosynth.ca;
    let d = par_photosynth.delta;

    let num = -(1.0 - d) * x * x + 2.0 * (g + d * k) * x
        - ((1.0 - 2.0 * g) * (g + d * k) + 2.0 * g * (1.0 - d));
    let den = (1.0 - d) * x - (g + d * k);
    4.0 * gs * ca * num / (den * den)
}

/// Derivative of the steady-state profit with respect to chi, evaluated
/// along the dpsi-stationarity manifold. Its zero in dpsi is the
/// steady-state analytical optimum.
pub fn dprofit_dchi(
    dpsi: f64,
    psi_soil: f64,
    par_plant: &ParPlant,
    par_env: &ParEnv,
    par_photosynth: &ParPhotosynth,
    par_cost: &ParCost,
) -> f64 {
    let gs = calc_gs(dpsi, psi_soil, par_plant, par_env);
    let x = calc_x_from_dpsi(dpsi, psi_soil, par_plant, par_env, par_photosynth, par_cost);
    let j = calc_j(gs, x, par_photosynth);
    let ca = par_photosynth.ca_mole_fraction();

    -gs * ca - par_cost.alpha * calc_djmax_dj(j, par_photosynth) * calc_dj_dchi(gs, x, par_photosynth)
}

/// Derivative of the instantaneous profit with respect to dpsi under
/// fixed capacities. Well-behaved over a generic bracket, so the
/// instantaneous analytical path can root-find it directly.
#[allow(clippy::too_many_arguments)]
pub fn dprofit_ddpsi_instantaneous(
    dpsi: f64,
    vcmax: f64,
    jmax: f64,
    psi_soil: f64,
    par_plant: &ParPlant,
    par_env: &ParEnv,
    par_photosynth: &ParPhotosynth,
    par_cost: &ParCost,
) -> f64 {
    let gs = calc_gs(dpsi, psi_soil, par_plant, par_env);
    let gsprime = calc_gs_prime(dpsi, psi_soil, par_plant, par_env);
    let outcome = calc_assimilation_limiting(vcmax, jmax, gs, par_photosynth);

    let ca = par_photosynth.ca_mole_fraction();
    let gstar = par_photosynth.gammastar_mole_fraction();
    let km = par_photosynth.kmm_mole_fraction();
    let d = par_photosynth.delta;
    let ci = outcome.ci / par_photosynth.patm * 1e6;

    // Slope of the limiting demand curve in ci.
    let da_dci = if outcome.is_vcmax_limited {
        vcmax * (km + gstar) / ((ci + km) * (ci + km))
    } else {
        let jlim = calc_electron_transport(jmax, par_photosynth) / 4.0;
        let s = gstar * (3.0 - 2.0 * d) + d * km;
        jlim * s / ((ci + 2.0 * gstar) * (ci + 2.0 * gstar))
    };

    let da_dgs = (ca - ci) * da_dci / (da_dci + gs);
    da_dgs * gsprime - 2.0 * par_cost.gamma * dpsi
}

/// Supply-side upper bound on feasible dpsi: the drop at which the
/// closed-form chi expression loses its real root, i.e. the zero of
/// `-2 gamma dpsi + (ca + 2 Gamma*) gs'(dpsi)`.
pub fn calc_dpsi_bound(
    psi_soil: f64,
    par_plant: &ParPlant,
    par_env: &ParEnv,
    par_photosynth: &ParPhotosynth,
    par_cost: &ParCost,
) -> Result<f64, PhydroError> {
    let ca = par_photosynth.ca_mole_fraction();
    let gstar = par_photosynth.gammastar_mole_fraction();
    let y = par_cost.gamma;

    let h = |dpsi: f64| {
        -2.0 * y * dpsi + (ca + 2.0 * gstar) * calc_gs_prime(dpsi, psi_soil, par_plant, par_env)
    };

    // Geometric bracket expansion; h starts positive and the linear risk
    // term always wins eventually.
    let mut hi = 1.0;
    while h(hi) > 0.0 {
        hi *= 2.0;
        if hi > 1e6 {
            return Err(PhydroError::ConvergenceFailure(
                "could not bracket the dpsi supply bound".to_string(),
            ));
        }
    }

    let res = zero(0.0, hi, h, 1e-6)?;
    debug!("dpsi supply bound at {} (bracket upper end {hi})", res.root);
    Ok(res.root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn setup() -> (ParPlant, ParEnv, ParPhotosynth, ParCost) {
        let plant = ParPlant::new(3e-17, -2.0, 2.0).unwrap();
        let env = ParEnv::new(25.0, 101_325.0, 1000.0).unwrap();
        let photo = ParPhotosynth::new(25.0, 101_325.0, 0.087, 400.0, 1000.0, 0.8, 0.02).unwrap();
        let cost = ParCost::default();
        (plant, env, photo, cost)
    }

    #[test]
    fn test_dpsi_bound_is_positive_and_finite() {
        let (plant, env, photo, cost) = setup();
        let bound = calc_dpsi_bound(-0.5, &plant, &env, &photo, &cost).unwrap();
        assert!(bound > 0.0 && bound.is_finite(), "bound = {bound}");
    }

    #[test]
    fn test_chi_approaches_one_as_dpsi_vanishes() {
        let (plant, env, photo, cost) = setup();
        let x = calc_x_from_dpsi(1e-6, -0.5, &plant, &env, &photo, &cost);
        assert!(
            x > 0.95 && x <= 1.0 + 1e-9,
            "With no hydraulic cost incurred chi should approach 1, got {x}"
        );
    }

    #[test]
    fn test_chi_decreases_with_dpsi() {
        let (plant, env, photo, cost) = setup();
        let bound = calc_dpsi_bound(-0.5, &plant, &env, &photo, &cost).unwrap();
        let x_small = calc_x_from_dpsi(0.1 * bound, -0.5, &plant, &env, &photo, &cost);
        let x_large = calc_x_from_dpsi(0.8 * bound, -0.5, &plant, &env, &photo, &cost);
        assert!(
            x_large < x_small,
            "A costlier drop must close stomata: chi({:.3}) = {x_small}, chi({:.3}) = {x_large}",
            0.1 * bound,
            0.8 * bound
        );
    }

    #[test]
    fn test_jmax_inversion_round_trip() {
        let (_, _, photo, _) = setup();
        let jmax = 90.0;
        let j = calc_electron_transport(jmax, &photo);
        let back = calc_jmax_from_j(j, &photo).unwrap();
        assert!(
            is_close!(back, jmax, rel_tol = 1e-10),
            "Expected {jmax}, got {back}"
        );
    }

    #[test]
    fn test_jmax_from_j_rejects_superceiling_transport() {
        let (_, _, photo, _) = setup();
        let ij = 4.0 * photo.phi0 * photo.iabs;
        assert!(matches!(
            calc_jmax_from_j(ij * 1.01, &photo),
            Err(PhydroError::ConvergenceFailure(_))
        ));
    }

    #[test]
    fn test_instantaneous_derivative_matches_finite_difference() {
        let (plant, env, photo, cost) = setup();
        let (vcmax, jmax) = (60.0, 110.0);
        let dpsi = 0.6;
        let h = 1e-5;
        let f = |d: f64| {
            profit_instantaneous(d, vcmax, jmax, -0.5, &plant, &env, &photo, &cost)
        };
        let numeric = (f(dpsi + h) - f(dpsi - h)) / (2.0 * h);
        let analytic = dprofit_ddpsi_instantaneous(
            dpsi, vcmax, jmax, -0.5, &plant, &env, &photo, &cost,
        );
        assert!(
            is_close!(numeric, analytic, rel_tol = 1e-4),
            "Analytic {analytic} vs finite difference {numeric}"
        );
    }

    #[test]
    fn test_steady_state_objective_changes_sign() {
        let (plant, env, photo, cost) = setup();
        let bound = calc_dpsi_bound(-0.5, &plant, &env, &photo, &cost).unwrap();
        let lo = dprofit_dchi(0.001 * bound, -0.5, &plant, &env, &photo, &cost);
        let hi = dprofit_dchi(0.999 * bound, -0.5, &plant, &env, &photo, &cost);
        assert!(
            lo.signum() != hi.signum(),
            "Objective must straddle zero across the bracket: f(lo)={lo}, f(hi)={hi}"
        );
    }
}
