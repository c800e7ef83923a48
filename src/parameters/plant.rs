//! Plant hydraulic traits.

use crate::errors::PhydroError;
use serde::{Deserialize, Serialize};

/// Hydraulic traits of the plant under evaluation.
///
/// Describes the vulnerability of the soil-to-leaf pathway: a reference
/// conductivity and the two-parameter Weibull-type curve along which
/// conductance is lost as water potential drops.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParPlant {
    /// Whole-pathway reference conductivity
    /// unit: m (liquid-phase units; scaled to mol m-2 s-1 MPa-1 through
    /// water viscosity and density at the evaluation temperature)
    pub conductivity: f64,
    /// Water potential at which half the conductance is lost
    /// unit: MPa (negative)
    pub psi50: f64,
    /// Shape parameter of the vulnerability curve
    /// unit: dimensionless
    pub b: f64,
}

impl ParPlant {
    /// Build a validated set of plant traits.
    pub fn new(conductivity: f64, psi50: f64, b: f64) -> Result<Self, PhydroError> {
        if !(conductivity > 0.0 && conductivity.is_finite()) {
            return Err(PhydroError::domain(format!(
                "plant conductivity must be positive, got {conductivity}"
            )));
        }
        if !(psi50 < 0.0 && psi50.is_finite()) {
            return Err(PhydroError::domain(format!(
                "psi50 must be negative (a water potential), got {psi50}"
            )));
        }
        if !(b > 0.0 && b.is_finite()) {
            return Err(PhydroError::domain(format!(
                "vulnerability shape parameter must be positive, got {b}"
            )));
        }
        Ok(Self {
            conductivity,
            psi50,
            b,
        })
    }
}
