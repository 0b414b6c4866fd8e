//! Feedback control policy for the fog coding degree.

use serde::{Deserialize, Serialize};

use super::aggregator::AggregateMetrics;

/// Bandwidth efficiency below this floor asks the fog to back off.
pub const EFFICIENCY_FLOOR: f64 = 0.5;

const LOW_EFFICIENCY_MESSAGE: &str = "Low bandwidth efficiency detected, consider reducing coding degree.";
const GOOD_EFFICIENCY_MESSAGE: &str = "Bandwidth efficiency is satisfactory, consider increasing coding degree.";

/// Per-window reply instructing the fog to adjust its coding degree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackDirective {
    /// Coding-degree adjustment: −1 or +1.
    pub adjust_dt: i32,
    pub message: String,
    pub aggregated_metrics: AggregateMetrics,
}

impl FeedbackDirective {
    /// Whether the adjustment is one of the two defined nudges.
    pub fn adjustment_is_valid(&self) -> bool {
        matches!(self.adjust_dt, -1 | 1)
    }
}

/// Evaluate the feedback policy on a fresh aggregate.
pub fn evaluate(aggregate: AggregateMetrics) -> FeedbackDirective {
    if aggregate.bandwidth_utilization_efficiency < EFFICIENCY_FLOOR {
        FeedbackDirective {
            adjust_dt: -1,
            message: LOW_EFFICIENCY_MESSAGE.to_string(),
            aggregated_metrics: aggregate,
        }
    } else {
        FeedbackDirective {
            adjust_dt: 1,
            message: GOOD_EFFICIENCY_MESSAGE.to_string(),
            aggregated_metrics: aggregate,
        }
    }
}
