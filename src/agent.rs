use serde::{Deserialize, Serialize};

use crate::types::{Action, Observation};

/// Anything that maps an observation to a charging rate.
pub trait Policy {
    fn select_action(&mut self, observation: &Observation) -> Action;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn select_action(&mut self, observation: &Observation) -> Action {
        (**self).select_action(observation)
    }
}

/// Always requests the same rate.
#[derive(Debug, Clone, Copy)]
pub struct ConstantAgent(pub f64);

impl Policy for ConstantAgent {
    fn select_action(&mut self, _observation: &Observation) -> Action {
        Action(self.0)
    }
}

/// Rule-based agent: charges hard when power is cheap and the grid is
/// calm, backs off otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceAwareAgent {
    pub low_price_threshold: f64,
    pub high_price_threshold: f64,
    pub high_load_threshold: f64,
}

impl PriceAwareAgent {
    const NEARLY_FULL: f64 = 0.98;
}

impl Default for PriceAwareAgent {
    fn default() -> Self {
        PriceAwareAgent {
            low_price_threshold: 0.4,
            high_price_threshold: 0.7,
            high_load_threshold: 0.8,
        }
    }
}

impl Policy for PriceAwareAgent {
    fn select_action(&mut self, observation: &Observation) -> Action {
        let rate = if observation.charge >= Self::NEARLY_FULL {
            0.0
        } else if observation.grid_load >= self.high_load_threshold {
            0.1
        } else if observation.price <= self.low_price_threshold {
            0.9
        } else if observation.price >= self.high_price_threshold {
            0.2
        } else {
            0.5
        };
        Action(rate)
    }
}
