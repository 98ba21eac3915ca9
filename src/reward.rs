use serde::Serialize;

use crate::ev::EnvironmentState;
use crate::scenario::ScenarioConfig;

pub const PROGRESS_WEIGHT: f64 = 5.0;
pub const COST_WEIGHT: f64 = 4.0;
/// Extra grid stress contributed by charging at full rate.
pub const ACTION_LOAD_IMPACT: f64 = 0.2;
pub const OVERLOAD_WEIGHT: f64 = 6.0;
pub const TIME_PENALTY: f64 = 0.01;

/// Per-step reward terms. `total()` is the scalar reward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RewardBreakdown {
    pub progress_reward: f64,
    pub cost_penalty: f64,
    pub overload_penalty: f64,
    pub time_penalty: f64,
}

impl RewardBreakdown {
    pub fn total(&self) -> f64 {
        self.progress_reward - self.cost_penalty - self.overload_penalty - self.time_penalty
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RewardModel;

impl RewardModel {
    /// Scores a transition. `state` is the post-update state and `rate` the
    /// clamped action that produced it.
    ///
    /// Progress is credited on `rate * charge_rate_scale` rather than on the
    /// charge actually gained, so a saturated battery still earns it.
    pub fn score(&self, scenario: &ScenarioConfig, state: &EnvironmentState, rate: f64) -> RewardBreakdown {
        let progress = rate * scenario.charge_rate_scale;
        let effective_load = state.grid_load + rate * ACTION_LOAD_IMPACT;
        let overload = (effective_load - scenario.load_threshold).max(0.0);

        RewardBreakdown {
            progress_reward: progress * PROGRESS_WEIGHT,
            cost_penalty: state.price * rate * COST_WEIGHT,
            overload_penalty: overload * OVERLOAD_WEIGHT,
            time_penalty: TIME_PENALTY,
        }
    }
}
