use std::fmt;

use serde::Serialize;

use crate::types::Observation;

/// Charge level at which the battery counts as full.
pub const FULL_CHARGE: f64 = 0.999;

/// Mutable simulation state, recreated on every reset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnvironmentState {
    /// Battery state of charge in `[0, 1]`.
    pub charge: f64,
    /// Normalized energy price in `[0, 1]`.
    pub price: f64,
    /// Normalized grid stress in `[0, 1]`.
    pub grid_load: f64,
    pub step_count: usize,
}

impl EnvironmentState {
    pub fn new(charge: f64, price: f64, grid_load: f64) -> Self {
        EnvironmentState {
            charge: clamp_unit(charge),
            price: clamp_unit(price),
            grid_load: clamp_unit(grid_load),
            step_count: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.charge >= FULL_CHARGE
    }

    /// Adds `rate * charge_rate_scale` to the battery and returns the
    /// charge actually gained. `rate` must already be clamped to `[0, 1]`.
    pub fn apply_charge(&mut self, rate: f64, charge_rate_scale: f64) -> f64 {
        let before = self.charge;
        self.charge = clamp_unit(self.charge + rate * charge_rate_scale);
        self.charge - before
    }

    pub fn observation(&self, max_steps: usize) -> Observation {
        let horizon = max_steps.saturating_sub(1).max(1) as f64;
        Observation {
            charge: self.charge,
            price: self.price,
            grid_load: self.grid_load,
            normalized_time: (self.step_count as f64 / horizon).min(1.0),
        }
    }
}

impl fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step={} charge={:.3} price={:.3} load={:.3}",
            self.step_count, self.charge, self.price, self.grid_load
        )
    }
}

/// Clamps into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_adds_scaled_rate() {
        let mut state = EnvironmentState::new(0.2, 0.3, 0.5);
        let gained = state.apply_charge(0.5, 0.08);
        assert!((gained - 0.04).abs() < 1e-12);
        assert!((state.charge - 0.24).abs() < 1e-12);
    }

    #[test]
    fn charge_saturates_at_full() {
        let mut state = EnvironmentState::new(0.97, 0.3, 0.5);
        state.apply_charge(1.0, 0.1);
        assert_eq!(state.charge, 1.0);
        assert!(state.is_full());
        assert_eq!(state.apply_charge(1.0, 0.1), 0.0);
    }

    #[test]
    fn zero_rate_leaves_charge_unchanged() {
        let mut state = EnvironmentState::new(0.35, 0.3, 0.5);
        assert_eq!(state.apply_charge(0.0, 0.06), 0.0);
        assert_eq!(state.charge, 0.35);
    }

    #[test]
    fn new_clamps_fields() {
        let state = EnvironmentState::new(-0.2, 1.4, f64::NAN);
        assert_eq!(state.charge, 0.0);
        assert_eq!(state.price, 1.0);
        assert_eq!(state.grid_load, 0.0);
    }

    #[test]
    fn normalized_time_stays_in_range() {
        let mut state = EnvironmentState::new(0.2, 0.3, 0.5);
        state.step_count = 24;
        assert!((state.observation(48).normalized_time - 24.0 / 47.0).abs() < 1e-12);
        state.step_count = 48;
        assert_eq!(state.observation(48).normalized_time, 1.0);
        state.step_count = 1;
        assert_eq!(state.observation(1).normalized_time, 1.0);
    }

    #[test]
    fn display_matches_render_format() {
        let mut state = EnvironmentState::new(0.25, 0.3, 0.5);
        state.step_count = 3;
        assert_eq!(state.to_string(), "step=3 charge=0.250 price=0.300 load=0.500");
    }
}
