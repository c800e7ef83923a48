//! Cost-function shape parameters.

use crate::errors::PhydroError;
use serde::{Deserialize, Serialize};

/// Weights of the two cost terms in the profit objective.
///
/// The profit maximized by the solvers is
/// $$F = A - \alpha J_{max} - \gamma \Delta\psi^2$$
/// so `alpha` prices the maintenance of electron-transport capacity and
/// `gamma` prices hydraulic risk from the soil-to-leaf water potential
/// drop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ParCost {
    /// Unit cost of maintaining Jmax
    /// unit: dimensionless (umol CO2 per umol Jmax)
    /// default: 0.1
    pub alpha: f64,
    /// Unit cost of the water potential drop
    /// unit: umol m-2 s-1 MPa-2
    /// default: 1.0
    pub gamma: f64,
}

impl Default for ParCost {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 1.0,
        }
    }
}

impl ParCost {
    /// Build a validated cost parameterization.
    pub fn new(alpha: f64, gamma: f64) -> Result<Self, PhydroError> {
        if !(alpha >= 0.0 && alpha.is_finite()) {
            return Err(PhydroError::domain(format!(
                "cost weight alpha must be non-negative, got {alpha}"
            )));
        }
        if !(gamma >= 0.0 && gamma.is_finite()) {
            return Err(PhydroError::domain(format!(
                "cost weight gamma must be non-negative, got {gamma}"
            )));
        }
        Ok(Self { alpha, gamma })
    }
}
