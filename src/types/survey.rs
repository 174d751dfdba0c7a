//! Directional survey stations

use serde::{Deserialize, Serialize};

/// A survey station pairing measured depth with true vertical depth (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurveyStation {
    pub md_m: f64,
    pub tvd_m: f64,
}

impl SurveyStation {
    pub const fn new(md_m: f64, tvd_m: f64) -> Self {
        Self { md_m, tvd_m }
    }
}
