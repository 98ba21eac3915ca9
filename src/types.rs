use fxhash::FxHashMap;
use serde::Serialize;

use crate::error::EnvError;
use crate::reward::RewardBreakdown;

/// Auxiliary diagnostics returned alongside observations.
pub type Info = FxHashMap<&'static str, f64>;

pub type StateKey = (u8, u8, u8, u8); // (charge, price, load, time) buckets
pub type InnerMap = FxHashMap<usize, f64>;
pub type QTable = FxHashMap<StateKey, InnerMap>;

/// What a policy sees after every reset/step. All fields lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub charge: f64,
    pub price: f64,
    pub grid_load: f64,
    pub normalized_time: f64,
}

impl Observation {
    pub const LEN: usize = 4;

    pub fn to_array(&self) -> [f64; 4] {
        [self.charge, self.price, self.grid_load, self.normalized_time]
    }
}

impl From<[f64; 4]> for Observation {
    fn from([charge, price, grid_load, normalized_time]: [f64; 4]) -> Self {
        Observation {
            charge,
            price,
            grid_load,
            normalized_time,
        }
    }
}

/// Requested charging rate. Any value is accepted; [`Action::clamped`]
/// maps it into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Action(pub f64);

impl Action {
    pub fn clamped(self) -> f64 {
        if self.0.is_nan() {
            return 0.0;
        }
        self.0.clamp(0.0, 1.0)
    }
}

impl From<f64> for Action {
    fn from(value: f64) -> Self {
        Action(value)
    }
}

impl From<[f64; 1]> for Action {
    fn from([value]: [f64; 1]) -> Self {
        Action(value)
    }
}

impl TryFrom<&[f64]> for Action {
    type Error = EnvError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match values {
            [value] => Ok(Action(*value)),
            _ => Err(EnvError::InvalidAction(values.len())),
        }
    }
}

/// Result of a single environment transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    /// Goal reached (battery effectively full).
    pub terminated: bool,
    /// Step budget exhausted.
    pub truncated: bool,
    pub breakdown: RewardBreakdown,
}

impl Step {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }

    pub fn info(&self) -> Info {
        let mut info = Info::default();
        info.insert("progress_reward", self.breakdown.progress_reward);
        info.insert("cost_penalty", self.breakdown.cost_penalty);
        info.insert("overload_penalty", self.breakdown.overload_penalty);
        info
    }
}
