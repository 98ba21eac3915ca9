use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid scenario '{0}', expected one of: easy, medium, hard")]
    InvalidScenario(String),

    #[error("max_steps must be a positive integer")]
    InvalidMaxSteps,

    /// `step` was called before the first `reset`.
    #[error("environment has not been reset, call reset() before step()")]
    NotReset,

    /// `step` was called after the episode terminated or was truncated.
    #[error("episode has finished, call reset() before stepping again")]
    EpisodeFinished,

    /// A sequence action did not hold exactly one rate.
    #[error("action must hold exactly one value, got {0}")]
    InvalidAction(usize),
}
