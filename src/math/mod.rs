//! Generic numerical primitives consumed by the solver orchestrators.
//!
//! These are deliberately small, deterministic routines with explicit
//! contracts: a bracketed scalar zero finder ([`zero`]), a golden-section
//! line optimizer ([`golden`]), a two-dimensional downhill simplex
//! ([`nelder_mead`]) and the incomplete gamma function ([`gamma`]) needed
//! by the hydraulic supply integral. The physical modules treat them as
//! black boxes; nothing in here knows about leaves or water.

pub mod gamma;
pub mod golden;
pub mod nelder_mead;
mod zero;

pub use zero::{zero, ZeroResult};
