//! Model entry points: assemble the derived parameter state from raw
//! forcings, run the requested optimization variant and package the
//! operating point.
//!
//! Four variants are exposed, the cross product of two axes:
//! * mode — [`PhydroMode::SteadyState`] co-optimizes the water potential
//!   drop and the photosynthetic capacities; [`PhydroMode::Instantaneous`]
//!   takes the capacities as given and optimizes the drop alone.
//! * method — [`PhydroMethod::Analytical`] reduces each problem to a
//!   scalar root via the closed-form stationarity conditions;
//!   [`PhydroMethod::Numerical`] optimizes the profit surface directly.
//!
//! All variants agree on the optimum for the same forcings; the
//! analytical paths are simply cheaper and carry evaluation counts.

use crate::errors::PhydroError;
use crate::hydraulics::calc_gs;
use crate::math::{golden, nelder_mead, zero};
use crate::optimality::{
    calc_dpsi_bound, calc_j, calc_jmax_from_j, calc_x_from_dpsi, dprofit_dchi,
    dprofit_ddpsi_instantaneous, profit, profit_instantaneous,
};
use crate::parameters::{calc_patm, ParCost, ParEnv, ParPhotosynth, ParPlant};
use crate::photosynthesis::{calc_assim_light_limited, calc_assimilation_limiting, calc_vcmax_coordinated};
use log::debug;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Convergence tolerance of the scalar searches (MPa on dpsi for the
/// bracketed methods, profit spread for the simplex).
const TOL_DPSI: f64 = 1e-6;
const TOL_PROFIT: f64 = 1e-12;

/// Upper end of the dpsi search bracket for the instantaneous variants
/// (MPa). Far beyond any survivable drop, so the optimum is interior.
const DPSI_MAX: f64 = 20.0;

/// Iteration budget for the steady-state simplex search.
const SIMPLEX_MAX_ITER: u32 = 1000;

/// Which capacities the optimization is allowed to move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhydroMode {
    /// Acclimated response: Jmax (and with it the coordinated Vcmax) is a
    /// decision variable alongside the water potential drop.
    SteadyState,
    /// Fast response under fixed, previously acclimated capacities
    /// (umol m-2 s-1 each).
    Instantaneous { vcmax: f64, jmax: f64 },
}

/// How the optimum is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhydroMethod {
    /// Scalar root finding on the closed-form stationarity conditions.
    Analytical,
    /// Direct search on the profit surface.
    Numerical,
}

/// Optimal leaf operating point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PHydroResult {
    /// Net assimilation rate, umol m-2 s-1
    pub a: f64,
    /// Transpiration, mol m-2 s-1
    pub e: f64,
    /// Stomatal conductance to water vapour, mol m-2 s-1
    pub gs: f64,
    /// Internal CO2 partial pressure, Pa
    pub ci: f64,
    /// Ratio of internal to ambient CO2
    pub chi: f64,
    /// Carboxylation capacity, umol m-2 s-1
    pub vcmax: f64,
    /// Electron-transport capacity, umol m-2 s-1
    pub jmax: f64,
    /// Soil-to-leaf water potential drop, MPa
    pub dpsi: f64,
    /// Leaf water potential, MPa
    pub psi_l: f64,
    /// Objective evaluations of the scalar root search, when one ran.
    pub nfnct: u32,
    /// Iterations of the direct search, when one ran.
    pub niter: u32,
}

/// Raw forcings shared by every variant, validated and expanded into the
/// derived parameter state.
struct Forcings {
    env: ParEnv,
    photo: ParPhotosynth,
    psi_soil: f64,
}

impl Forcings {
    #[allow(clippy::too_many_arguments)]
    fn new(
        tc: f64,
        ppfd: f64,
        vpd: f64,
        co2: f64,
        elv: f64,
        fapar: f64,
        kphio: f64,
        psi_soil: f64,
        rdark: f64,
    ) -> Result<Self, PhydroError> {
        if !(psi_soil <= 0.0 && psi_soil.is_finite()) {
            return Err(PhydroError::domain(format!(
                "soil water potential must be non-positive, got {psi_soil} MPa"
            )));
        }
        if !(vpd > 0.0) {
            return Err(PhydroError::domain(format!(
                "vapour pressure deficit must be positive, got {vpd} Pa"
            )));
        }
        let patm = calc_patm(elv);
        let env = ParEnv::new(tc, patm, vpd)?;
        let photo = ParPhotosynth::new(tc, patm, kphio, co2, ppfd, fapar, rdark)?;
        Ok(Self {
            env,
            photo,
            psi_soil,
        })
    }
}

/// Run the model for one set of forcings.
///
/// This is the single dispatch point; the four named entry functions
/// below are thin wrappers fixing the mode/method pair.
#[allow(clippy::too_many_arguments)]
pub fn phydro_solve(
    tc: f64,
    ppfd: f64,
    vpd: f64,
    co2: f64,
    elv: f64,
    fapar: f64,
    kphio: f64,
    psi_soil: f64,
    rdark: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
    mode: PhydroMode,
    method: PhydroMethod,
) -> Result<PHydroResult, PhydroError> {
    let f = Forcings::new(tc, ppfd, vpd, co2, elv, fapar, kphio, psi_soil, rdark)?;

    match (mode, method) {
        (PhydroMode::SteadyState, PhydroMethod::Analytical) => {
            solve_steady_analytical(&f, par_plant, par_cost)
        }
        (PhydroMode::SteadyState, PhydroMethod::Numerical) => {
            solve_steady_numerical(&f, par_plant, par_cost)
        }
        (PhydroMode::Instantaneous { vcmax, jmax }, method) => {
            if !(vcmax > 0.0 && vcmax.is_finite()) {
                return Err(PhydroError::domain(format!(
                    "carboxylation capacity must be positive, got {vcmax}"
                )));
            }
            if !(jmax > 0.0 && jmax.is_finite()) {
                return Err(PhydroError::domain(format!(
                    "electron-transport capacity must be positive, got {jmax}"
                )));
            }
            match method {
                PhydroMethod::Analytical => {
                    solve_instantaneous_analytical(&f, vcmax, jmax, par_plant, par_cost)
                }
                PhydroMethod::Numerical => {
                    solve_instantaneous_numerical(&f, vcmax, jmax, par_plant, par_cost)
                }
            }
        }
    }
}

fn solve_steady_analytical(
    f: &Forcings,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    let bound = calc_dpsi_bound(f.psi_soil, par_plant, &f.env, &f.photo, par_cost)?;
    let res = zero(
        0.001 * bound,
        0.999 * bound,
        |dpsi| dprofit_dchi(dpsi, f.psi_soil, par_plant, &f.env, &f.photo, par_cost),
        TOL_DPSI,
    )?;
    let dpsi = res.root;
    debug!("steady-state analytical optimum at dpsi={dpsi} (bound {bound})");

    let x = calc_x_from_dpsi(dpsi, f.psi_soil, par_plant, &f.env, &f.photo, par_cost);
    let gs = calc_gs(dpsi, f.psi_soil, par_plant, &f.env);
    let j = calc_j(gs, x, &f.photo);
    let jmax = calc_jmax_from_j(j, &f.photo)?;
    let vcmax =
        (j / 4.0) * (x * f.photo.ca + f.photo.kmm) / (x * f.photo.ca + 2.0 * f.photo.gammastar);
    let a = gs * f.photo.ca_mole_fraction() * (1.0 - x);

    Ok(PHydroResult {
        a,
        e: 1.6 * gs * f.env.vpd_mole_fraction(),
        gs,
        ci: x * f.photo.ca,
        chi: x,
        vcmax,
        jmax,
        dpsi,
        psi_l: f.psi_soil - dpsi,
        nfnct: res.nfnct,
        niter: 0,
    })
}

fn solve_steady_numerical(
    f: &Forcings,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    // Decision variables in log space: both are positive and the search
    // then needs no explicit bounds.
    let jmax0 = 4.0 * f.photo.phi0 * f.photo.iabs;
    let x0 = Vector2::new(jmax0.max(1.0).ln(), 0.0);

    let res = nelder_mead::minimize(
        |v: &Vector2<f64>| {
            let jmax = v.x.exp();
            let dpsi = v.y.exp();
            -profit(
                dpsi, jmax, f.psi_soil, par_plant, &f.env, &f.photo, par_cost,
            )
        },
        x0,
        Vector2::new(0.4, 0.7),
        TOL_PROFIT,
        SIMPLEX_MAX_ITER,
    )?;
    let jmax = res.x.x.exp();
    let dpsi = res.x.y.exp();
    debug!(
        "steady-state numerical optimum at dpsi={dpsi}, jmax={jmax} ({} iterations)",
        res.niter
    );

    let gs = calc_gs(dpsi, f.psi_soil, par_plant, &f.env);
    let aj = calc_assim_light_limited(gs, jmax, &f.photo);
    let vcmax = calc_vcmax_coordinated(aj.a, aj.ci, &f.photo);

    Ok(PHydroResult {
        a: aj.a,
        e: 1.6 * gs * f.env.vpd_mole_fraction(),
        gs,
        ci: aj.ci,
        chi: aj.ci / f.photo.ca,
        vcmax,
        jmax,
        dpsi,
        psi_l: f.psi_soil - dpsi,
        nfnct: res.nfev,
        niter: res.niter,
    })
}

fn solve_instantaneous_analytical(
    f: &Forcings,
    vcmax: f64,
    jmax: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    let res = zero(
        0.0,
        DPSI_MAX,
        |dpsi| {
            dprofit_ddpsi_instantaneous(
                dpsi, vcmax, jmax, f.psi_soil, par_plant, &f.env, &f.photo, par_cost,
            )
        },
        TOL_DPSI,
    )?;
    Ok(assemble_instantaneous(
        f, res.root, vcmax, jmax, par_plant, res.nfnct, 0,
    ))
}

fn solve_instantaneous_numerical(
    f: &Forcings,
    vcmax: f64,
    jmax: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    let res = golden::maximize(
        0.0,
        DPSI_MAX,
        |dpsi| {
            profit_instantaneous(
                dpsi, vcmax, jmax, f.psi_soil, par_plant, &f.env, &f.photo, par_cost,
            )
        },
        TOL_DPSI,
    );
    Ok(assemble_instantaneous(
        f, res.x, vcmax, jmax, par_plant, 0, res.niter,
    ))
}

fn assemble_instantaneous(
    f: &Forcings,
    dpsi: f64,
    vcmax: f64,
    jmax: f64,
    par_plant: &ParPlant,
    nfnct: u32,
    niter: u32,
) -> PHydroResult {
    let gs = calc_gs(dpsi, f.psi_soil, par_plant, &f.env);
    let outcome = calc_assimilation_limiting(vcmax, jmax, gs, &f.photo);
    PHydroResult {
        a: outcome.a,
        e: 1.6 * gs * f.env.vpd_mole_fraction(),
        gs,
        ci: outcome.ci,
        chi: outcome.ci / f.photo.ca,
        vcmax,
        jmax,
        dpsi,
        psi_l: f.psi_soil - dpsi,
        nfnct,
        niter,
    }
}

/// Steady-state optimum via the semi-analytical reduction.
#[allow(clippy::too_many_arguments)]
pub fn phydro_analytical(
    tc: f64,
    ppfd: f64,
    vpd: f64,
    co2: f64,
    elv: f64,
    fapar: f64,
    kphio: f64,
    psi_soil: f64,
    rdark: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    phydro_solve(
        tc,
        ppfd,
        vpd,
        co2,
        elv,
        fapar,
        kphio,
        psi_soil,
        rdark,
        par_plant,
        par_cost,
        PhydroMode::SteadyState,
        PhydroMethod::Analytical,
    )
}

/// Steady-state optimum via direct search on the profit surface.
#[allow(clippy::too_many_arguments)]
pub fn phydro_numerical(
    tc: f64,
    ppfd: f64,
    vpd: f64,
    co2: f64,
    elv: f64,
    fapar: f64,
    kphio: f64,
    psi_soil: f64,
    rdark: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    phydro_solve(
        tc,
        ppfd,
        vpd,
        co2,
        elv,
        fapar,
        kphio,
        psi_soil,
        rdark,
        par_plant,
        par_cost,
        PhydroMode::SteadyState,
        PhydroMethod::Numerical,
    )
}

/// Instantaneous optimum under fixed capacities, via root finding on the
/// profit derivative.
#[allow(clippy::too_many_arguments)]
pub fn phydro_instantaneous_analytical(
    vcmax: f64,
    jmax: f64,
    tc: f64,
    ppfd: f64,
    vpd: f64,
    co2: f64,
    elv: f64,
    fapar: f64,
    kphio: f64,
    psi_soil: f64,
    rdark: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    phydro_solve(
        tc,
        ppfd,
        vpd,
        co2,
        elv,
        fapar,
        kphio,
        psi_soil,
        rdark,
        par_plant,
        par_cost,
        PhydroMode::Instantaneous { vcmax, jmax },
        PhydroMethod::Analytical,
    )
}

/// Instantaneous optimum under fixed capacities, via golden-section
/// search on the profit itself.
#[allow(clippy::too_many_arguments)]
pub fn phydro_instantaneous_numerical(
    vcmax: f64,
    jmax: f64,
    tc: f64,
    ppfd: f64,
    vpd: f64,
    co2: f64,
    elv: f64,
    fapar: f64,
    kphio: f64,
    psi_soil: f64,
    rdark: f64,
    par_plant: &ParPlant,
    par_cost: &ParCost,
) -> Result<PHydroResult, PhydroError> {
    phydro_solve(
        tc,
        ppfd,
        vpd,
        co2,
        elv,
        fapar,
        kphio,
        psi_soil,
        rdark,
        par_plant,
        par_cost,
        PhydroMode::Instantaneous { vcmax, jmax },
        PhydroMethod::Numerical,
    )
}
