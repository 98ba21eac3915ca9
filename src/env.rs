use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::dynamics::DynamicsModel;
use crate::error::EnvError;
use crate::ev::EnvironmentState;
use crate::reward::RewardModel;
use crate::scenario::{Scenario, ScenarioConfig};
use crate::types::{Action, Info, Observation, Step};

pub const DEFAULT_MAX_STEPS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Constructed, never reset.
    Idle,
    Running,
    Finished,
}

/// Single-battery charging environment.
///
/// Not reentrant: each instance owns its state and random source, so
/// separate instances can be stepped in any order without affecting each
/// other's seeded trajectories.
#[derive(Debug, Clone)]
pub struct EvChargeEnv {
    scenario: Scenario,
    params: ScenarioConfig,
    max_steps: usize,
    state: EnvironmentState,
    phase: Phase,
    rng: StdRng,
    dynamics: DynamicsModel,
    reward: RewardModel,
}

impl EvChargeEnv {
    pub fn new(scenario: Scenario, max_steps: usize) -> Result<Self, EnvError> {
        Self::with_rng(scenario, max_steps, StdRng::from_os_rng())
    }

    /// Like [`EvChargeEnv::new`], but the random source starts from `seed`
    /// so unseeded resets are reproducible too.
    pub fn with_seed(scenario: Scenario, max_steps: usize, seed: u64) -> Result<Self, EnvError> {
        Self::with_rng(scenario, max_steps, StdRng::seed_from_u64(seed))
    }

    /// Parses the scenario label eagerly, failing with
    /// [`EnvError::InvalidScenario`] for anything but easy/medium/hard.
    pub fn from_label(scenario: &str, max_steps: usize) -> Result<Self, EnvError> {
        Self::new(scenario.parse()?, max_steps)
    }

    fn with_rng(scenario: Scenario, max_steps: usize, rng: StdRng) -> Result<Self, EnvError> {
        if max_steps == 0 {
            return Err(EnvError::InvalidMaxSteps);
        }
        Ok(EvChargeEnv {
            scenario,
            params: scenario.config(),
            max_steps,
            state: EnvironmentState::default(),
            phase: Phase::Idle,
            rng,
            dynamics: DynamicsModel::default(),
            reward: RewardModel,
        })
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn params(&self) -> &ScenarioConfig {
        &self.params
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn observation(&self) -> Observation {
        self.state.observation(self.max_steps)
    }

    /// Starts a new episode. A `seed` reseeds this instance's random source;
    /// without one the current stream continues.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, Info) {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.state = self.dynamics.initial_state(&self.params, &mut self.rng);
        self.phase = Phase::Running;

        debug!(
            scenario = %self.scenario,
            seed = ?seed,
            charge = self.state.charge,
            price = self.state.price,
            grid_load = self.state.grid_load,
            "episode reset"
        );

        (self.observation(), Info::default())
    }

    /// Advances one step. Fails fast if called before [`reset`](Self::reset)
    /// or after the episode ended.
    pub fn step(&mut self, action: impl Into<Action>) -> Result<Step, EnvError> {
        match self.phase {
            Phase::Idle => return Err(EnvError::NotReset),
            Phase::Finished => return Err(EnvError::EpisodeFinished),
            Phase::Running => {}
        }

        self.state.step_count += 1;
        let action: Action = action.into();
        let rate = action.clamped();

        self.dynamics
            .advance(&mut self.state, &self.params, rate, &mut self.rng);
        let breakdown = self.reward.score(&self.params, &self.state, rate);

        let terminated = self.state.is_full();
        let truncated = self.state.step_count >= self.max_steps;
        if terminated || truncated {
            self.phase = Phase::Finished;
        }

        let reward = breakdown.total();
        debug!(
            step = self.state.step_count,
            rate,
            charge = self.state.charge,
            price = self.state.price,
            grid_load = self.state.grid_load,
            reward,
            terminated,
            truncated,
            "step"
        );

        Ok(Step {
            observation: self.observation(),
            reward,
            terminated,
            truncated,
            breakdown,
        })
    }

    pub fn render(&self) {
        println!("{}", self.state);
    }
}
