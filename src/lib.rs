//! Optimality-based coupling of leaf photosynthesis, stomatal
//! conductance and plant hydraulics.
//!
//! The model chooses the leaf operating point that maximizes the profit
//! `A - alpha Jmax - gamma dpsi^2`: carbon gained, net of the costs of
//! maintaining photosynthetic capacity and of sustaining a soil-to-leaf
//! water potential drop. Entry points live in [`solver`]; the submodels
//! ([`hydraulics`], [`photosynthesis`]) and the optimization machinery
//! ([`optimality`]) are public for callers that want to probe the
//! supply/demand pieces directly.

pub mod errors;
pub mod hydraulics;
pub mod math;
pub mod optimality;
pub mod parameters;
pub mod photosynthesis;
pub mod smoothing;
pub mod solver;

pub use errors::PhydroError;
pub use parameters::{ParCost, ParEnv, ParPhotosynth, ParPlant};
pub use smoothing::ExpAverager;
pub use solver::{
    phydro_analytical, phydro_instantaneous_analytical, phydro_instantaneous_numerical,
    phydro_numerical, phydro_solve, PHydroResult, PhydroMethod, PhydroMode,
};
