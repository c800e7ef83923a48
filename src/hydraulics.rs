//! Hydraulic submodel: vulnerability curve, sap flux and stomatal
//! conductance as functions of the soil-to-leaf water potential drop.
//!
//! The supply side of the model. Conductance along the pathway declines
//! with water potential following a Weibull-type vulnerability curve
//! $$P(\psi) = 0.5^{(\psi/\psi_{50})^b}$$
//! and the sap flux sustained by a drop `dpsi` below the soil potential
//! is the conductivity-weighted integral of that curve, which has a
//! closed form in the lower incomplete gamma function. Stomatal
//! conductance follows from flux balance with the transpiration demand
//! `1.6 gs D`.

use crate::math::gamma::gamma_inc_lower;
use crate::parameters::{ParEnv, ParPlant};

/// Moles of water per kg.
const MOL_H2O_PER_KG: f64 = 55.5;

/// Fractional conductance remaining at water potential `psi` (MPa).
pub fn vulnerability(psi: f64, psi50: f64, b: f64) -> f64 {
    0.5_f64.powf((psi / psi50).powf(b))
}

/// Derivative of [`vulnerability`] with respect to `psi`.
pub fn vulnerability_prime(psi: f64, psi50: f64, b: f64) -> f64 {
    -std::f64::consts::LN_2 * vulnerability(psi, psi50, b) * b * (psi / psi50).powf(b - 1.0)
        / psi50
}

/// Scale the reference conductivity (liquid-phase units, m) to a molar
/// flux per unit water potential (mol m-2 s-1 MPa-1) at the evaluation
/// temperature.
pub fn scale_conductivity(k: f64, par_env: &ParEnv) -> f64 {
    // m3 m-2 s-1 Pa-1
    let k_volumetric = k / par_env.viscosity_water;
    // mol m-2 s-1 Pa-1
    let k_molar = k_volumetric * par_env.density_water * MOL_H2O_PER_KG;
    // mol m-2 s-1 MPa-1
    k_molar * 1e6
}

/// Sap flux (mol m-2 s-1) sustained by a water potential drop `dpsi`
/// below the soil potential `psi_soil` (both MPa).
///
/// Evaluates `K * Int_{psi_soil - dpsi}^{psi_soil} P(psi) dpsi` in closed
/// form via the lower incomplete gamma function.
pub fn calc_sapflux(dpsi: f64, psi_soil: f64, par_plant: &ParPlant, par_env: &ParEnv) -> f64 {
    let k = scale_conductivity(par_plant.conductivity, par_env);
    let b = par_plant.b;
    let l2 = std::f64::consts::LN_2;

    let ps = psi_soil / par_plant.psi50;
    let pl = (psi_soil - dpsi) / par_plant.psi50;

    let integral = -par_plant.psi50 * l2.powf(-1.0 / b) / b
        * (gamma_inc_lower(1.0 / b, l2 * pl.powf(b)) - gamma_inc_lower(1.0 / b, l2 * ps.powf(b)));
    k * integral
}

/// Stomatal conductance to water vapour (mol m-2 s-1) implied by the
/// water potential drop `dpsi`: the supply flux divided by `1.6 D`.
pub fn calc_gs(dpsi: f64, psi_soil: f64, par_plant: &ParPlant, par_env: &ParEnv) -> f64 {
    calc_sapflux(dpsi, psi_soil, par_plant, par_env) / (1.6 * par_env.vpd_mole_fraction())
}

/// Derivative of [`calc_gs`] with respect to `dpsi`: by the fundamental
/// theorem, the vulnerability curve evaluated at the leaf potential.
pub fn calc_gs_prime(dpsi: f64, psi_soil: f64, par_plant: &ParPlant, par_env: &ParEnv) -> f64 {
    let k = scale_conductivity(par_plant.conductivity, par_env);
    k * vulnerability(psi_soil - dpsi, par_plant.psi50, par_plant.b)
        / (1.6 * par_env.vpd_mole_fraction())
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn plant() -> ParPlant {
        ParPlant::new(3e-17, -2.0, 2.0).unwrap()
    }

    fn env() -> ParEnv {
        ParEnv::new(25.0, 101_325.0, 1000.0).unwrap()
    }

    #[test]
    fn test_half_conductance_at_psi50() {
        let p = plant();
        assert!(
            is_close!(vulnerability(p.psi50, p.psi50, p.b), 0.5),
            "P(psi50) must be exactly one half"
        );
        assert!(is_close!(vulnerability(0.0, p.psi50, p.b), 1.0));
    }

    #[test]
    fn test_vulnerability_declines_with_potential() {
        let p = plant();
        let high = vulnerability(-0.5, p.psi50, p.b);
        let low = vulnerability(-3.0, p.psi50, p.b);
        assert!(high > low, "Conductance must be lost as psi drops");
    }

    #[test]
    fn test_vulnerability_prime_sign() {
        let p = plant();
        // P decreases as psi becomes more negative, so dP/dpsi > 0.
        assert!(vulnerability_prime(-1.0, p.psi50, p.b) > 0.0);
    }

    #[test]
    fn test_sapflux_positive_and_increasing() {
        let (p, e) = (plant(), env());
        let q1 = calc_sapflux(0.5, -0.5, &p, &e);
        let q2 = calc_sapflux(1.5, -0.5, &p, &e);
        assert!(q1 > 0.0);
        assert!(q2 > q1, "A larger drop must drive a larger flux");
    }

    #[test]
    fn test_sapflux_vanishes_at_zero_drop() {
        let (p, e) = (plant(), env());
        assert!(is_close!(calc_sapflux(0.0, -0.5, &p, &e), 0.0, abs_tol = 1e-15));
    }

    #[test]
    fn test_gs_prime_matches_finite_difference() {
        let (p, e) = (plant(), env());
        let dpsi = 0.8;
        let h = 1e-6;
        let numeric =
            (calc_gs(dpsi + h, -0.3, &p, &e) - calc_gs(dpsi - h, -0.3, &p, &e)) / (2.0 * h);
        let analytic = calc_gs_prime(dpsi, -0.3, &p, &e);
        assert!(
            is_close!(numeric, analytic, rel_tol = 1e-5),
            "Analytic gs' {analytic} vs finite difference {numeric}"
        );
    }

    #[test]
    fn test_gs_falls_with_vpd() {
        let p = plant();
        let dry = ParEnv::new(25.0, 101_325.0, 2000.0).unwrap();
        let humid = ParEnv::new(25.0, 101_325.0, 500.0).unwrap();
        assert!(calc_gs(1.0, -0.5, &p, &dry) < calc_gs(1.0, -0.5, &p, &humid));
    }
}
