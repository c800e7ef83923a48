//! Derived photosynthetic state: temperature-adjusted kinetic constants
//! and absorbed light, computed once per evaluation.
//!
//! Kinetics follow the Bernacchi-type Arrhenius formulations used across
//! the P-model family (Michaelis-Menten coefficient for carboxylation and
//! the photorespiratory CO2 compensation point).

use super::environment::KR;
use crate::errors::PhydroError;

/// Activation energy for Kc, J/mol
const DHA_KC: f64 = 79_430.0;
/// Activation energy for Ko, J/mol
const DHA_KO: f64 = 36_380.0;
/// Activation energy for Gamma*, J/mol
const DHA_GAMMASTAR: f64 = 37_830.0;
/// Kc at 25 degC and standard pressure, Pa
const KC25: f64 = 39.97;
/// Ko at 25 degC and standard pressure, Pa
const KO25: f64 = 27_480.0;
/// Gamma* at 25 degC and standard pressure, Pa
const GAMMASTAR25: f64 = 4.332;
/// O2 mole fraction of dry air
const KCO: f64 = 0.209_476;

/// Arrhenius-type temperature scaling relative to 25 degC.
fn ftemp_arrh(tk: f64, dha: f64) -> f64 {
    (dha * (tk - 298.15) / (298.15 * KR * tk)).exp()
}

/// Michaelis-Menten coefficient for Rubisco-limited carboxylation (Pa).
pub(crate) fn calc_kmm(tc: f64, patm: f64) -> f64 {
    let tk = tc + 273.15;
    let kc = KC25 * ftemp_arrh(tk, DHA_KC);
    let ko = KO25 * ftemp_arrh(tk, DHA_KO);
    let po = KCO * patm;
    kc * (1.0 + po / ko)
}

/// Photorespiratory CO2 compensation point (Pa).
pub(crate) fn calc_gammastar(tc: f64, patm: f64) -> f64 {
    let tk = tc + 273.15;
    GAMMASTAR25 * patm / 101_325.0 * ftemp_arrh(tk, DHA_GAMMASTAR)
}

/// Derived biochemical state of the photosynthesis submodel.
#[derive(Debug, Clone, Copy)]
pub struct ParPhotosynth {
    /// Michaelis-Menten coefficient at `tc`, Pa
    pub kmm: f64,
    /// CO2 compensation point at `tc`, Pa
    pub gammastar: f64,
    /// Intrinsic quantum yield of photosynthesis
    pub phi0: f64,
    /// Absorbed photosynthetic photon flux density, umol m-2 s-1
    pub iabs: f64,
    /// Ambient CO2 partial pressure, Pa
    pub ca: f64,
    /// Atmospheric pressure, Pa
    pub patm: f64,
    /// Dark respiration as a fraction of Vcmax
    pub delta: f64,
}

impl ParPhotosynth {
    /// Build the derived photosynthetic state from raw inputs.
    ///
    /// `co2` is the ambient mole fraction in ppm, `ppfd` the incident
    /// photon flux (umol m-2 s-1) and `fapar` the fraction absorbed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tc: f64,
        patm: f64,
        kphio: f64,
        co2: f64,
        ppfd: f64,
        fapar: f64,
        rdark: f64,
    ) -> Result<Self, PhydroError> {
        if !(tc > -273.15 && tc.is_finite()) {
            return Err(PhydroError::domain(format!(
                "temperature must be above absolute zero, got {tc} degC"
            )));
        }
        if !(co2 > 0.0 && co2.is_finite()) {
            return Err(PhydroError::domain(format!(
                "ambient CO2 must be positive, got {co2} ppm"
            )));
        }
        if !(ppfd >= 0.0 && ppfd.is_finite()) {
            return Err(PhydroError::domain(format!(
                "ppfd must be non-negative, got {ppfd}"
            )));
        }
        if !(0.0..=1.0).contains(&fapar) {
            return Err(PhydroError::domain(format!(
                "fapar must lie in [0, 1], got {fapar}"
            )));
        }
        if !(kphio > 0.0 && kphio.is_finite()) {
            return Err(PhydroError::domain(format!(
                "quantum yield must be positive, got {kphio}"
            )));
        }
        if !(rdark >= 0.0 && rdark.is_finite()) {
            return Err(PhydroError::domain(format!(
                "dark respiration fraction must be non-negative, got {rdark}"
            )));
        }
        Ok(Self {
            kmm: calc_kmm(tc, patm),
            gammastar: calc_gammastar(tc, patm),
            phi0: kphio,
            iabs: ppfd * fapar,
            ca: co2 * patm * 1e-6,
            patm,
            delta: rdark,
        })
    }

    /// Ambient CO2 as a mole fraction (umol/mol).
    pub fn ca_mole_fraction(&self) -> f64 {
        self.ca / self.patm * 1e6
    }

    /// Compensation point as a mole fraction (umol/mol).
    pub fn gammastar_mole_fraction(&self) -> f64 {
        self.gammastar / self.patm * 1e6
    }

    /// Michaelis-Menten coefficient as a mole fraction (umol/mol).
    pub fn kmm_mole_fraction(&self) -> f64 {
        self.kmm / self.patm * 1e6
    }
}
