use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::agent::PriceAwareAgent;
use crate::env::DEFAULT_MAX_STEPS;
use crate::qlearn::TrainParams;

pub const ENV_PREFIX: &str = "EVCHARGE__";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub env: EnvConfig,
    pub eval: EvalConfig,
    /// Thresholds of the price-aware agent.
    pub agent: PriceAwareAgent,
    pub train: TrainParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Scenario label, validated when the environment is built.
    pub scenario: String,
    pub max_steps: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            scenario: "medium".to_string(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub episodes: usize,
    /// Seed of the first episode; episode `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig { episodes: 10, seed: 0 }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then `EVCHARGE__*` variables
    /// (`EVCHARGE__ENV__SCENARIO=hard`).
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
        }
        Self::figment(path)
            .extract()
            .context("failed to load configuration")
    }
}
