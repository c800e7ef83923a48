//! Physical environment of the leaf: pressure, temperature, humidity and
//! the temperature-dependent properties of liquid water.
//!
//! The water density and viscosity formulations are the standard ones
//! used across the P-model family: Chen et al. (1977) for density and
//! Huber et al. (2009) for viscosity.

use crate::errors::PhydroError;

/// Standard sea-level pressure, Pa
const KPO: f64 = 101_325.0;
/// Base temperature of the standard atmosphere, K
const KTO: f64 = 288.15;
/// Adiabatic lapse rate, K/m
const KL: f64 = 0.0065;
/// Gravitational acceleration, m s-2
const KG: f64 = 9.80665;
/// Molecular weight of dry air, kg/mol
const KMA: f64 = 0.028963;
/// Universal gas constant, J mol-1 K-1
pub(crate) const KR: f64 = 8.3145;

/// Huber et al. (2009) viscosity coefficients H_ij, rows j = 0..6 over
/// powers of (rho/rho* - 1), columns i = 0..5 over powers of (T*/T - 1).
const HUBER_H: [[f64; 6]; 7] = [
    [0.520094, 0.0850895, -1.08374, -0.289555, 0.0, 0.0],
    [0.222531, 0.999115, 1.88797, 1.26613, 0.0, 0.120573],
    [-0.281378, -0.906851, -0.772479, -0.489837, -0.25704, 0.0],
    [0.161913, 0.257399, 0.0, 0.0, 0.0, 0.0],
    [-0.0325372, 0.0, 0.0, 0.0698452, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.00872102, 0.0],
    [0.0, 0.0, 0.0, -0.00435673, 0.0, -0.000593264],
];

/// Atmospheric pressure (Pa) at elevation `elv` (m) from the standard
/// barometric formula.
pub fn calc_patm(elv: f64) -> f64 {
    KPO * (1.0 - KL * elv / KTO).powf(KG * KMA / (KR * KL))
}

/// Density of liquid water (kg m-3) at temperature `tc` (deg C) and
/// pressure `p` (Pa), after Chen et al. (1977).
pub fn density_h2o(tc: f64, p: f64) -> f64 {
    let lambda = 1788.316 + 21.55053 * tc - 0.4695911 * tc.powi(2) + 3.096363e-3 * tc.powi(3)
        - 7.341182e-6 * tc.powi(4);
    let po = 5918.499 + 58.05267 * tc - 1.1253317 * tc.powi(2) + 6.6123869e-3 * tc.powi(3)
        - 1.4661625e-5 * tc.powi(4);
    let vinf = 0.6980547 - 7.435626e-4 * tc + 3.704258e-5 * tc.powi(2)
        - 6.315724e-7 * tc.powi(3)
        + 9.829576e-9 * tc.powi(4)
        - 1.197269e-10 * tc.powi(5)
        + 1.005461e-12 * tc.powi(6)
        - 5.437898e-15 * tc.powi(7)
        + 1.69946e-17 * tc.powi(8)
        - 2.295063e-20 * tc.powi(9);

    let pbar = 1e-5 * p;
    // Specific volume in cm3/g, converted to kg/m3.
    let v = vinf + lambda / (po + pbar);
    1e3 / v
}

/// Viscosity of liquid water (Pa s) at temperature `tc` (deg C) and
/// pressure `p` (Pa), after Huber et al. (2009).
pub fn viscosity_h2o(tc: f64, p: f64) -> f64 {
    const TK_AST: f64 = 647.096; // K
    const RHO_AST: f64 = 322.0; // kg m-3
    const MU_AST: f64 = 1e-6; // Pa s

    let rho = density_h2o(tc, p);
    let tbar = (tc + 273.15) / TK_AST;
    let rbar = rho / RHO_AST;

    let mu0 = 1e2 * tbar.sqrt()
        / (1.67752 + 2.20462 / tbar + 0.6366564 / tbar.powi(2) - 0.241605 / tbar.powi(3));

    let ctbar = 1.0 / tbar - 1.0;
    let mut mu1 = 0.0;
    for i in 0..6 {
        let mut coef2 = 0.0;
        for (j, h_row) in HUBER_H.iter().enumerate() {
            coef2 += h_row[i] * (rbar - 1.0).powi(j as i32);
        }
        mu1 += ctbar.powi(i as i32) * coef2;
    }
    let mu1 = (rbar * mu1).exp();

    mu0 * mu1 * MU_AST
}

/// Derived environmental state, computed once per evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ParEnv {
    /// Air temperature, deg C
    pub tc: f64,
    /// Atmospheric pressure, Pa
    pub patm: f64,
    /// Vapour pressure deficit, Pa
    pub vpd: f64,
    /// Viscosity of liquid water at `tc`, Pa s
    pub viscosity_water: f64,
    /// Density of liquid water at `tc`, kg m-3
    pub density_water: f64,
}

impl ParEnv {
    /// Build the derived environmental state.
    pub fn new(tc: f64, patm: f64, vpd: f64) -> Result<Self, PhydroError> {
        if !(tc > -273.15 && tc.is_finite()) {
            return Err(PhydroError::domain(format!(
                "temperature must be above absolute zero, got {tc} degC"
            )));
        }
        if !(patm > 0.0 && patm.is_finite()) {
            return Err(PhydroError::domain(format!(
                "atmospheric pressure must be positive, got {patm} Pa"
            )));
        }
        if !(vpd >= 0.0 && vpd.is_finite()) {
            return Err(PhydroError::domain(format!(
                "vapour pressure deficit must be non-negative, got {vpd} Pa"
            )));
        }
        Ok(Self {
            tc,
            patm,
            vpd,
            viscosity_water: viscosity_h2o(tc, patm),
            density_water: density_h2o(tc, patm),
        })
    }

    /// Leaf-to-air vapour mole fraction gradient (dimensionless).
    pub fn vpd_mole_fraction(&self) -> f64 {
        self.vpd / self.patm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_sea_level_pressure() {
        assert!(is_close!(calc_patm(0.0), 101_325.0));
    }

    #[test]
    fn test_pressure_decreases_with_elevation() {
        let p0 = calc_patm(0.0);
        let p1 = calc_patm(1000.0);
        let p2 = calc_patm(3000.0);
        assert!(p1 < p0 && p2 < p1);
        // ~89.9 kPa at 1000 m in the standard atmosphere
        assert!(
            is_close!(p1, 89_874.0, rel_tol = 1e-3),
            "Expected ~89.9 kPa at 1000 m, got {p1}"
        );
    }

    #[test]
    fn test_water_density_at_25c() {
        let rho = density_h2o(25.0, 101_325.0);
        assert!(
            is_close!(rho, 997.047, rel_tol = 1e-4),
            "Expected ~997.05 kg/m3, got {rho}"
        );
    }

    #[test]
    fn test_water_viscosity_at_25c() {
        let mu = viscosity_h2o(25.0, 101_325.0);
        assert!(
            is_close!(mu, 8.9e-4, rel_tol = 1e-2),
            "Expected ~0.89 mPa s, got {mu}"
        );
    }

    #[test]
    fn test_viscosity_falls_with_temperature() {
        let cold = viscosity_h2o(5.0, 101_325.0);
        let warm = viscosity_h2o(35.0, 101_325.0);
        assert!(warm < cold);
    }

    #[test]
    fn test_rejects_negative_vpd() {
        assert!(ParEnv::new(25.0, 101_325.0, -100.0).is_err());
    }
}
