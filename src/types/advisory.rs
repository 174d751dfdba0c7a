//! Advisory flags raised by the numerical core.
//!
//! The core never fails: each degraded condition yields a safe numeric default
//! and one of these advisories on the result that produced it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fluid::Domain;

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    #[error(
        "Drill string OD {string_od_m:.4} m exceeds hole ID {hole_id_m:.4} m over \
         {top_m:.2}-{bottom_m:.2} m; annular area clamped to 0"
    )]
    GeometryInterference {
        top_m: f64,
        bottom_m: f64,
        string_od_m: f64,
        hole_id_m: f64,
    },

    #[error("Degenerate interval {top_m:.3}-{bottom_m:.3} m (bottom <= top)")]
    DegenerateInterval { top_m: f64, bottom_m: f64 },

    #[error(
        "Volume {target_m3:.4} m³ exceeds achievable capacity {achievable_m3:.4} m³; \
         using full interval length"
    )]
    UnsolvableVolumeMatch { target_m3: f64, achievable_m3: f64 },

    #[error("Survey has {stations} station(s); MD used as TVD")]
    MissingSurveyData { stations: usize },

    #[error("No rheology for fluid '{fluid}' in the {domain}; friction taken as 0")]
    MissingRheology { fluid: String, domain: Domain },
}

impl Advisory {
    /// Short machine-friendly code for reports.
    pub const fn code(&self) -> &'static str {
        match self {
            Advisory::GeometryInterference { .. } => "GEOMETRY_INTERFERENCE",
            Advisory::DegenerateInterval { .. } => "DEGENERATE_INTERVAL",
            Advisory::UnsolvableVolumeMatch { .. } => "UNSOLVABLE_VOLUME_MATCH",
            Advisory::MissingSurveyData { .. } => "MISSING_SURVEY_DATA",
            Advisory::MissingRheology { .. } => "MISSING_RHEOLOGY",
        }
    }
}

/// Push `advisory` unless an equal one is already recorded.
pub fn push_unique(advisories: &mut Vec<Advisory>, advisory: Advisory) {
    if !advisories.contains(&advisory) {
        advisories.push(advisory);
    }
}
