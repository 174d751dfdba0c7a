//! Power-law parameters for a fluid in one flow path
//!
//! Resolution order: direct lab fit for the path, Fann 600/300 dial
//! readings, then PV/YP converted to dial readings.

use serde::{Deserialize, Serialize};

use crate::config::defaults::{DIAL_TO_PA, SHEAR_RATE_600_PER_S};
use crate::types::{Domain, FluidSpec, PowerLaw, Rheology};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RheologySource {
    DirectFit,
    DialReadings,
    PlasticViscosityYieldPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRheology {
    pub power_law: PowerLaw,
    pub source: RheologySource,
}

/// Power law from 600 and 300 rpm dial readings.
///
/// n = ln(θ600/θ300)/ln 2, K = 0.4788·θ600 / 1022ⁿ.
pub fn power_law_from_dials(theta_600: f64, theta_300: f64) -> Option<PowerLaw> {
    if !(theta_600 > 0.0 && theta_300 > 0.0) {
        return None;
    }
    let n = (theta_600 / theta_300).ln() / std::f64::consts::LN_2;
    let k = DIAL_TO_PA * theta_600 / SHEAR_RATE_600_PER_S.powf(n);
    Some(PowerLaw::new(k, n)).filter(PowerLaw::is_usable)
}

/// Dial readings implied by Bingham PV (cP) and YP (lbf/100ft²).
pub fn dials_from_pv_yp(pv_cp: f64, yp: f64) -> (f64, f64) {
    (2.0 * pv_cp + yp, pv_cp + yp)
}

fn from_rheology(rheology: &Rheology, domain: Domain) -> Option<ResolvedRheology> {
    let direct = match domain {
        Domain::Annulus => rheology.annulus_fit,
        Domain::String => rheology.pipe_fit,
    };
    if let Some(power_law) = direct.filter(PowerLaw::is_usable) {
        return Some(ResolvedRheology {
            power_law,
            source: RheologySource::DirectFit,
        });
    }
    if let (Some(t600), Some(t300)) = (rheology.dial_600, rheology.dial_300) {
        if let Some(power_law) = power_law_from_dials(t600, t300) {
            return Some(ResolvedRheology {
                power_law,
                source: RheologySource::DialReadings,
            });
        }
    }
    let (pv, yp) = (rheology.plastic_viscosity_cp?, rheology.yield_point_lbf_100ft2?);
    let (t600, t300) = dials_from_pv_yp(pv, yp);
    power_law_from_dials(t600, t300).map(|power_law| ResolvedRheology {
        power_law,
        source: RheologySource::PlasticViscosityYieldPoint,
    })
}

/// Power-law parameters for `fluid` flowing in `domain`, if any can be derived.
pub fn resolve_power_law(fluid: &FluidSpec, domain: Domain) -> Option<ResolvedRheology> {
    fluid.rheology.as_ref().and_then(|r| from_rheology(r, domain))
}
