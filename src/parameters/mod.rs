//! Parameter objects for one model evaluation.
//!
//! These are pure data holders computed once per evaluation from the raw
//! inputs. Construction validates physical ranges and returns
//! [`PhydroError::DomainInput`](crate::errors::PhydroError) for anything
//! non-physical; once built, every struct is immutable for the lifetime
//! of the evaluation.

mod cost;
mod environment;
mod photosynthesis;
mod plant;

pub use cost::ParCost;
pub use environment::{calc_patm, density_h2o, viscosity_h2o, ParEnv};
pub use photosynthesis::ParPhotosynth;
pub use plant::ParPlant;
