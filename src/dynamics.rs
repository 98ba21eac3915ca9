//! Stochastic state transitions.
//!
//! Price and grid load follow mean-reverting AR(1) processes around the
//! scenario's base values. Every derived value is clamped to `[0, 1]` as
//! soon as it is computed.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::ev::{EnvironmentState, clamp_unit};
use crate::scenario::ScenarioConfig;

pub const INITIAL_CHARGE_MIN: f64 = 0.1;
pub const INITIAL_CHARGE_MAX: f64 = 0.4;
pub const INITIAL_NOISE_STD: f64 = 0.05;

pub const PRICE_PERSISTENCE: f64 = 0.7;
pub const PRICE_REVERSION: f64 = 0.3;
pub const PRICE_NOISE_STD: f64 = 0.05;
pub const LOAD_PERSISTENCE: f64 = 0.6;
pub const LOAD_REVERSION: f64 = 0.4;
pub const LOAD_NOISE_STD: f64 = 0.07;

/// Zero-mean gaussian noise scales for each draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsModel {
    pub initial_noise_std: f64,
    pub price_noise_std: f64,
    pub load_noise_std: f64,
}

impl Default for DynamicsModel {
    fn default() -> Self {
        DynamicsModel {
            initial_noise_std: INITIAL_NOISE_STD,
            price_noise_std: PRICE_NOISE_STD,
            load_noise_std: LOAD_NOISE_STD,
        }
    }
}

fn gaussian<R: Rng + ?Sized>(std: f64, rng: &mut R) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    std * z
}

impl DynamicsModel {
    /// Draws a fresh episode start: charge, then price, then load.
    pub fn initial_state<R: Rng + ?Sized>(
        &self,
        scenario: &ScenarioConfig,
        rng: &mut R,
    ) -> EnvironmentState {
        let charge = rng.random_range(INITIAL_CHARGE_MIN..INITIAL_CHARGE_MAX);
        let price = scenario.base_price + gaussian(self.initial_noise_std, rng);
        let grid_load = scenario.base_load + gaussian(self.initial_noise_std, rng);
        EnvironmentState::new(charge, price, grid_load)
    }

    /// Applies one transition for an already clamped `rate`.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        state: &mut EnvironmentState,
        scenario: &ScenarioConfig,
        rate: f64,
        rng: &mut R,
    ) {
        state.apply_charge(rate, scenario.charge_rate_scale);
        state.price = clamp_unit(
            PRICE_PERSISTENCE * state.price
                + PRICE_REVERSION * scenario.base_price
                + gaussian(self.price_noise_std, rng),
        );
        state.grid_load = clamp_unit(
            LOAD_PERSISTENCE * state.grid_load
                + LOAD_REVERSION * scenario.base_load
                + gaussian(self.load_noise_std, rng),
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::scenario::Scenario;

    #[test]
    fn initial_state_within_bounds() {
        let model = DynamicsModel::default();
        let mut rng = StdRng::seed_from_u64(11);
        for scenario in Scenario::ALL {
            let cfg = scenario.config();
            for _ in 0..500 {
                let state = model.initial_state(&cfg, &mut rng);
                assert!((INITIAL_CHARGE_MIN..INITIAL_CHARGE_MAX).contains(&state.charge));
                assert!((0.0..=1.0).contains(&state.price));
                assert!((0.0..=1.0).contains(&state.grid_load));
                assert_eq!(state.step_count, 0);
            }
        }
    }

    #[test]
    fn advance_keeps_state_clamped_from_extremes() {
        let model = DynamicsModel::default();
        let cfg = Scenario::Hard.config();
        let mut rng = StdRng::seed_from_u64(5);
        let mut state = EnvironmentState::new(1.0, 1.0, 1.0);
        for _ in 0..1000 {
            model.advance(&mut state, &cfg, 1.0, &mut rng);
            assert_eq!(state.charge, 1.0);
            assert!((0.0..=1.0).contains(&state.price));
            assert!((0.0..=1.0).contains(&state.grid_load));
        }
    }

    #[test]
    fn price_reverts_towards_base() {
        let model = DynamicsModel::default();
        let cfg = Scenario::Easy.config();
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = EnvironmentState::new(0.2, 1.0, 1.0);
        let mut price_sum = 0.0;
        let mut load_sum = 0.0;
        let n = 2000;
        for _ in 0..n {
            model.advance(&mut state, &cfg, 0.0, &mut rng);
            price_sum += state.price;
            load_sum += state.grid_load;
        }
        let mean_price = price_sum / n as f64;
        let mean_load = load_sum / n as f64;
        assert!((mean_price - cfg.base_price).abs() < 0.05, "mean price {mean_price}");
        assert!((mean_load - cfg.base_load).abs() < 0.05, "mean load {mean_load}");
        assert_eq!(state.charge, 0.2);
    }

    #[test]
    fn noiseless_model_follows_the_mean_path() {
        let model = DynamicsModel {
            initial_noise_std: 0.0,
            price_noise_std: 0.0,
            load_noise_std: 0.0,
        };
        let cfg = Scenario::Medium.config();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = model.initial_state(&cfg, &mut rng);
        assert_eq!(state.price, cfg.base_price);
        assert_eq!(state.grid_load, cfg.base_load);

        state.price = 1.0;
        state.grid_load = 0.0;
        model.advance(&mut state, &cfg, 0.0, &mut rng);
        let price = PRICE_PERSISTENCE + PRICE_REVERSION * cfg.base_price;
        let load = LOAD_REVERSION * cfg.base_load;
        assert!((state.price - price).abs() < 1e-12);
        assert!((state.grid_load - load).abs() < 1e-12);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let model = DynamicsModel::default();
        let cfg = Scenario::Medium.config();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = model.initial_state(&cfg, &mut rng);
            let mut trace = vec![state];
            for _ in 0..20 {
                model.advance(&mut state, &cfg, 0.5, &mut rng);
                trace.push(state);
            }
            trace
        };
        assert_eq!(run(3), run(3));
        assert_ne!(run(3), run(4));
    }
}
