//! Consistency tests across the solver variants.
//!
//! These tests verify that the model's structural identities hold:
//! - Analytical and numerical steady-state paths locate the same optimum
//! - Instantaneous paths reproduce the steady state when handed its
//!   acclimated capacities
//! - Reported fields satisfy their defining relations exactly
//! - The operating point responds to forcings with the right sign

use approx::assert_relative_eq;
use phydro::{
    phydro_analytical, phydro_instantaneous_analytical, phydro_instantaneous_numerical,
    phydro_numerical, PHydroResult, ParCost, ParPlant,
};

fn plant() -> ParPlant {
    ParPlant::new(3e-17, -2.0, 2.0).unwrap()
}

/// Moist temperate midday: 25 degC, sea level, moderate drought.
const TC: f64 = 25.0;
const PPFD: f64 = 1000.0;
const VPD: f64 = 1000.0;
const CO2: f64 = 400.0;
const ELV: f64 = 0.0;
const FAPAR: f64 = 0.8;
const KPHIO: f64 = 0.087;
const PSI_SOIL: f64 = -0.5;
const RDARK: f64 = 0.02;

fn run_analytical() -> PHydroResult {
    phydro_analytical(
        TC, PPFD, VPD, CO2, ELV, FAPAR, KPHIO, PSI_SOIL, RDARK,
        &plant(),
        &ParCost::default(),
    )
    .unwrap()
}

fn run_numerical() -> PHydroResult {
    phydro_numerical(
        TC, PPFD, VPD, CO2, ELV, FAPAR, KPHIO, PSI_SOIL, RDARK,
        &plant(),
        &ParCost::default(),
    )
    .unwrap()
}

mod steady_state_agreement {
    use super::*;

    /// The scalar root of the stationarity conditions and the direct
    /// simplex search must land on the same profit maximum.
    #[test]
    fn test_analytical_matches_numerical() {
        let ana = run_analytical();
        let num = run_numerical();

        assert_relative_eq!(ana.dpsi, num.dpsi, max_relative = 1e-2);
        assert_relative_eq!(ana.gs, num.gs, max_relative = 1e-2);
        assert_relative_eq!(ana.a, num.a, max_relative = 1e-2);
        assert_relative_eq!(ana.ci, num.ci, max_relative = 1e-2);
        assert_relative_eq!(ana.jmax, num.jmax, max_relative = 2e-2);
        assert_relative_eq!(ana.vcmax, num.vcmax, max_relative = 2e-2);
    }
}

mod instantaneous_agreement {
    use super::*;

    /// Root finding on the profit derivative and golden-section search on
    /// the profit itself must agree under identical fixed capacities.
    #[test]
    fn test_analytical_matches_numerical() {
        let (vcmax, jmax) = (60.0, 110.0);
        let ana = phydro_instantaneous_analytical(
            vcmax, jmax, TC, PPFD, VPD, CO2, ELV, FAPAR, KPHIO, PSI_SOIL, RDARK,
            &plant(),
            &ParCost::default(),
        )
        .unwrap();
        let num = phydro_instantaneous_numerical(
            vcmax, jmax, TC, PPFD, VPD, CO2, ELV, FAPAR, KPHIO, PSI_SOIL, RDARK,
            &plant(),
            &ParCost::default(),
        )
        .unwrap();

        assert_relative_eq!(ana.dpsi, num.dpsi, max_relative = 1e-2);
        assert_relative_eq!(ana.gs, num.gs, max_relative = 1e-2);
        assert_relative_eq!(ana.a, num.a, max_relative = 1e-2);
    }

    /// Handing the instantaneous solver the capacities the steady state
    /// acclimated to must reproduce the steady-state operating point.
    #[test]
    fn test_recovers_steady_state_at_acclimated_capacities() {
        let steady = run_numerical();
        let inst = phydro_instantaneous_numerical(
            steady.vcmax, steady.jmax, TC, PPFD, VPD, CO2, ELV, FAPAR, KPHIO, PSI_SOIL, RDARK,
            &plant(),
            &ParCost::default(),
        )
        .unwrap();

        assert_relative_eq!(inst.dpsi, steady.dpsi, max_relative = 5e-2);
        assert_relative_eq!(inst.gs, steady.gs, max_relative = 5e-2);
        assert_relative_eq!(inst.a, steady.a, max_relative = 5e-2);
    }
}

mod structural_identities {
    use super::*;

    #[test]
    fn test_leaf_potential_and_chi_definitions() {
        for res in [run_analytical(), run_numerical()] {
            // psi_l and chi are defined, not fitted
            assert_relative_eq!(res.psi_l, PSI_SOIL - res.dpsi, max_relative = 1e-12);
            let ca = CO2 * 101_325.0 * 1e-6;
            assert_relative_eq!(res.chi, res.ci / ca, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_transpiration_follows_conductance() {
        let res = run_analytical();
        assert_relative_eq!(res.e, 1.6 * res.gs * VPD / 101_325.0, max_relative = 1e-12);
    }

    #[test]
    fn test_operating_point_is_interior() {
        for res in [run_analytical(), run_numerical()] {
            assert!(res.dpsi > 0.0, "dpsi must be a genuine drop");
            assert!(res.psi_l < PSI_SOIL, "leaf must be drier than soil");
            assert!(res.chi > 0.0 && res.chi < 1.0);
        }
    }
}

mod forcing_responses {
    use super::*;

    fn run_at(vpd: f64, ppfd: f64, psi_soil: f64) -> PHydroResult {
        phydro_analytical(
            TC, ppfd, vpd, CO2, ELV, FAPAR, KPHIO, psi_soil, RDARK,
            &plant(),
            &ParCost::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_stomata_close_with_drier_air() {
        let humid = run_at(500.0, PPFD, PSI_SOIL);
        let dry = run_at(2500.0, PPFD, PSI_SOIL);
        assert!(
            dry.gs < humid.gs,
            "gs must fall with vpd: {} vs {}",
            dry.gs,
            humid.gs
        );
    }

    #[test]
    fn test_assimilation_rises_with_light() {
        let dim = run_at(VPD, 400.0, PSI_SOIL);
        let bright = run_at(VPD, 1600.0, PSI_SOIL);
        assert!(bright.a > dim.a);
        assert!(
            bright.jmax > dim.jmax,
            "acclimated capacity must track light"
        );
    }

    #[test]
    fn test_drought_reduces_gas_exchange() {
        let moist = run_at(VPD, PPFD, -0.3);
        let droughted = run_at(VPD, PPFD, -1.5);
        assert!(droughted.gs < moist.gs);
        assert!(droughted.a < moist.a);
        assert!(
            droughted.psi_l < moist.psi_l,
            "leaf potential must track soil drying"
        );
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_result_round_trips_through_json() {
        let res = run_analytical();
        let json = serde_json::to_string(&res).unwrap();
        let back: PHydroResult = serde_json::from_str(&json).unwrap();
        assert_eq!(res.a, back.a);
        assert_eq!(res.dpsi, back.dpsi);
        assert_eq!(res.nfnct, back.nfnct);
    }
}
