//! Episode rollouts and aggregate statistics for any [`Policy`].

use serde::Serialize;
use tracing::info;

use crate::agent::Policy;
use crate::env::EvChargeEnv;
use crate::error::EnvError;
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub total_reward: f64,
    pub steps: usize,
    /// Reached full charge before the step limit.
    pub terminated: bool,
    pub final_charge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub agent_type: String,
    pub scenario: Scenario,
    pub episodes: usize,
    pub avg_reward: f64,
    pub avg_steps: f64,
    /// Fraction of episodes that ended by reaching full charge.
    pub completion_rate: f64,
}

impl EvalReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn run_episode<P: Policy + ?Sized>(
    env: &mut EvChargeEnv,
    policy: &mut P,
    seed: Option<u64>,
) -> Result<EpisodeSummary, EnvError> {
    run_episode_with(env, policy, seed, |_| {})
}

/// Like [`run_episode`], calling `on_step` with the environment after every
/// transition (used for rendering rollouts).
pub fn run_episode_with<P, F>(
    env: &mut EvChargeEnv,
    policy: &mut P,
    seed: Option<u64>,
    mut on_step: F,
) -> Result<EpisodeSummary, EnvError>
where
    P: Policy + ?Sized,
    F: FnMut(&EvChargeEnv),
{
    let (mut obs, _) = env.reset(seed);
    let mut total_reward = 0.0;
    let mut steps = 0;

    loop {
        let action = policy.select_action(&obs);
        let step = env.step(action)?;
        total_reward += step.reward;
        steps += 1;
        obs = step.observation;
        on_step(env);
        if step.done() {
            return Ok(EpisodeSummary {
                total_reward,
                steps,
                terminated: step.terminated,
                final_charge: obs.charge,
            });
        }
    }
}

/// Runs `episodes` episodes, seeding episode `i` with `seed + i`.
pub fn evaluate<P: Policy + ?Sized>(
    env: &mut EvChargeEnv,
    policy: &mut P,
    agent_type: &str,
    episodes: usize,
    seed: u64,
) -> Result<EvalReport, EnvError> {
    let mut rewards = Vec::with_capacity(episodes);
    let mut steps = Vec::with_capacity(episodes);
    let mut completed = 0usize;

    for i in 0..episodes {
        let summary = run_episode(env, policy, Some(seed.wrapping_add(i as u64)))?;
        rewards.push(summary.total_reward);
        steps.push(summary.steps as f64);
        if summary.terminated {
            completed += 1;
        }
    }

    let n = episodes.max(1) as f64;
    let report = EvalReport {
        agent_type: agent_type.to_string(),
        scenario: env.scenario(),
        episodes,
        avg_reward: rewards.iter().sum::<f64>() / n,
        avg_steps: steps.iter().sum::<f64>() / n,
        completion_rate: completed as f64 / n,
    };
    info!(
        agent = agent_type,
        scenario = %report.scenario,
        episodes,
        avg_reward = report.avg_reward,
        avg_steps = report.avg_steps,
        "evaluation finished"
    );
    Ok(report)
}
