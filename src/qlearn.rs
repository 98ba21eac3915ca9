//! Tabular Q-learning over a discretized observation.
//!
//! A compact learned policy for the environment: observations are bucketed
//! into a small grid and the charging rate is picked from a fixed ladder.

use fxhash::FxBuildHasher;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::Policy;
use crate::env::EvChargeEnv;
use crate::error::EnvError;
use crate::types::{Action, InnerMap, Observation, QTable, StateKey};

/// Charging rates available to the learner, indexed by action id.
pub const ACTION_LEVELS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

const CHARGE_BUCKETS: u8 = 10;
const PRICE_BUCKETS: u8 = 5;
const LOAD_BUCKETS: u8 = 5;
const TIME_BUCKETS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainParams {
    pub episodes: usize,
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    /// Exploration rate.
    pub epsilon: f64,
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        TrainParams {
            episodes: 5_000,
            alpha: 0.1,
            gamma: 0.99,
            epsilon: 0.1,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainSummary {
    pub episodes: usize,
    pub best_reward: f64,
    /// Mean return over the final tenth of training.
    pub recent_mean_reward: f64,
    pub table_size: usize,
}

fn bucket(value: f64, buckets: u8) -> u8 {
    let idx = (value.clamp(0.0, 1.0) * buckets as f64) as u8;
    idx.min(buckets - 1)
}

pub fn state_key(observation: &Observation) -> StateKey {
    (
        bucket(observation.charge, CHARGE_BUCKETS),
        bucket(observation.price, PRICE_BUCKETS),
        bucket(observation.grid_load, LOAD_BUCKETS),
        bucket(observation.normalized_time, TIME_BUCKETS),
    )
}

fn empty_row() -> InnerMap {
    let mut row = InnerMap::with_hasher(FxBuildHasher::default());
    for a in 0..ACTION_LEVELS.len() {
        row.insert(a, 0.0);
    }
    row
}

/// Highest-valued action in a row; ties go to the lowest id.
fn best_action(row: &InnerMap) -> Option<(usize, f64)> {
    (0..ACTION_LEVELS.len())
        .filter_map(|a| row.get(&a).map(|&q| (a, q)))
        .fold(None, |best, (a, q)| match best {
            Some((_, best_q)) if best_q >= q => best,
            _ => Some((a, q)),
        })
}

pub fn train(q_table: &mut QTable, env: &mut EvChargeEnv, params: &TrainParams) -> Result<TrainSummary, EnvError> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let actions: Vec<usize> = (0..ACTION_LEVELS.len()).collect();

    let mut best_reward = f64::NEG_INFINITY;
    let recent_window = (params.episodes / 10).max(1);
    let mut recent_total = 0.0;
    let progress_every = (params.episodes / 10).max(1);

    for ep in 0..params.episodes {
        let (obs, _) = env.reset(Some(params.seed.wrapping_add(ep as u64)));
        let mut key = state_key(&obs);
        q_table.entry(key).or_insert_with(empty_row);
        let mut total_reward = 0.0;

        loop {
            let greedy = q_table.get(&key).and_then(best_action).map(|(a, _)| a);
            let action = match greedy {
                Some(a) if rng.random_range(0.0..1.0) >= params.epsilon => a,
                _ => *actions.choose(&mut rng).unwrap_or(&0),
            };

            let step = env.step(ACTION_LEVELS[action])?;
            let next_key = state_key(&step.observation);
            let max_next_q = if step.terminated {
                0.0
            } else {
                q_table
                    .entry(next_key)
                    .or_insert_with(empty_row)
                    .values()
                    .copied()
                    .fold(f64::NEG_INFINITY, f64::max)
            };

            if let Some(current_q) = q_table.get_mut(&key).and_then(|row| row.get_mut(&action)) {
                *current_q = (1.0 - params.alpha) * *current_q
                    + params.alpha * (step.reward + params.gamma * max_next_q);
            }

            total_reward += step.reward;
            key = next_key;
            if step.done() {
                break;
            }
        }

        if total_reward > best_reward {
            best_reward = total_reward;
        }
        if ep + recent_window >= params.episodes {
            recent_total += total_reward;
        }
        if ep % progress_every == 0 {
            info!(episode = ep, best_reward, states = q_table.len(), "training progress");
        }
    }

    let counted = recent_window.min(params.episodes).max(1);
    let summary = TrainSummary {
        episodes: params.episodes,
        best_reward,
        recent_mean_reward: recent_total / counted as f64,
        table_size: q_table.len() + q_table.values().map(|row| row.len()).sum::<usize>(),
    };
    info!(
        episodes = summary.episodes,
        best_reward = summary.best_reward,
        recent_mean_reward = summary.recent_mean_reward,
        "training finished"
    );
    Ok(summary)
}

/// Greedy policy over a trained table.
#[derive(Debug, Clone, Default)]
pub struct QPolicy {
    table: QTable,
}

impl QPolicy {
    pub fn new(table: QTable) -> Self {
        QPolicy { table }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn action_index(&self, observation: &Observation) -> usize {
        self.table
            .get(&state_key(observation))
            .and_then(best_action)
            .map(|(a, _)| a)
            // unvisited states charge at full rate
            .unwrap_or(ACTION_LEVELS.len() - 1)
    }
}

impl Policy for QPolicy {
    fn select_action(&mut self, observation: &Observation) -> Action {
        Action(ACTION_LEVELS[self.action_index(observation)])
    }
}
