//! ROI scoring and the execute/delegate/defer/eliminate recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Priority;

/// Recommendation bucket for an ROI score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Execute,
    Delegate,
    Defer,
    Eliminate,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Execute => "execute",
            Recommendation::Delegate => "delegate",
            Recommendation::Defer => "defer",
            Recommendation::Eliminate => "eliminate",
        };
        write!(f, "{}", s)
    }
}

/// The full verdict produced by `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiVerdict {
    /// ROI scalar, one-decimal rounding (or impact * 10 for zero effort)
    pub roi: f64,
    /// What to do with the item
    pub recommendation: Recommendation,
    /// How urgently to do it
    pub priority: Priority,
}

/// Compute the ROI scalar and recommendation for an impact/effort pair.
///
/// Zero effort is treated as maximal leverage (roi = impact * 10) rather
/// than a division error. Inputs are not validated or clamped; negative
/// values produce mathematically consistent output.
pub fn score(impact: f64, effort: f64) -> RoiVerdict {
    let roi = if effort == 0.0 {
        impact * 10.0
    } else {
        (impact / effort * 10.0).round() / 10.0
    };

    // Thresholds evaluated top-down, first match wins.
    let (recommendation, priority) = if roi >= 2.0 {
        (Recommendation::Execute, Priority::Critical)
    } else if roi >= 1.5 {
        (Recommendation::Execute, Priority::High)
    } else if roi >= 1.0 {
        (Recommendation::Delegate, Priority::Medium)
    } else if roi >= 0.5 {
        (Recommendation::Defer, Priority::Low)
    } else {
        (Recommendation::Eliminate, Priority::Low)
    };

    RoiVerdict {
        roi,
        recommendation,
        priority,
    }
}
