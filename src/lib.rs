//! Stochastic EV charging environment for reinforcement-learning policies.
//!
//! A policy observes `(charge, price, grid_load, normalized_time)`, picks a
//! charging rate in `[0, 1]`, and the environment advances its price and
//! grid-load processes and scores the transition:
//!
//! ```
//! use ev_charge_env::{EvChargeEnv, Scenario};
//!
//! let mut env = EvChargeEnv::new(Scenario::Medium, 48)?;
//! let (obs, _info) = env.reset(Some(0));
//! let step = env.step(0.9)?;
//! assert!(step.observation.charge > obs.charge);
//! # Ok::<(), ev_charge_env::EnvError>(())
//! ```

pub mod agent;
pub mod config;
pub mod dynamics;
pub mod env;
pub mod error;
pub mod eval;
pub mod ev;
pub mod qlearn;
pub mod reward;
pub mod scenario;
pub mod telemetry;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use agent::{ConstantAgent, Policy, PriceAwareAgent};
pub use env::EvChargeEnv;
pub use error::EnvError;
pub use ev::EnvironmentState;
pub use reward::RewardBreakdown;
pub use scenario::{Scenario, ScenarioConfig};
pub use types::{Action, Info, Observation, Step};
