use std::collections::HashMap;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use tracing::debug;

use crate::agent::{Policy, PriceAwareAgent};
use crate::env::{DEFAULT_MAX_STEPS, EvChargeEnv};
use crate::error::EnvError;
use crate::types::{Action, Info, Observation};

impl From<EnvError> for PyErr {
    fn from(err: EnvError) -> Self {
        match err {
            EnvError::InvalidScenario(_) | EnvError::InvalidMaxSteps | EnvError::InvalidAction(_) => {
                PyValueError::new_err(err.to_string())
            }
            EnvError::NotReset | EnvError::EpisodeFinished => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn to_dict(info: Info) -> HashMap<String, f64> {
    info.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Accepts a float or a one-element sequence.
fn extract_action(action: &Bound<'_, PyAny>) -> PyResult<Action> {
    if let Ok(value) = action.extract::<f64>() {
        return Ok(Action(value));
    }
    let values: Vec<f64> = action.extract()?;
    Ok(Action::try_from(values.as_slice())?)
}

#[pyclass(name = "EVChargeEnv", module = "ev_charge_env")]
pub struct PyEvChargeEnv {
    inner: EvChargeEnv,
}

#[pymethods]
impl PyEvChargeEnv {
    #[new]
    #[pyo3(signature = (max_steps = DEFAULT_MAX_STEPS, scenario = "medium"))]
    fn new(max_steps: usize, scenario: &str) -> PyResult<Self> {
        Ok(PyEvChargeEnv {
            inner: EvChargeEnv::from_label(scenario, max_steps)?,
        })
    }

    #[getter]
    fn scenario(&self) -> &'static str {
        self.inner.scenario().as_str()
    }

    #[getter]
    fn max_steps(&self) -> usize {
        self.inner.max_steps()
    }

    /// `options` is accepted for gym compatibility and ignored.
    #[pyo3(signature = (seed = None, options = None))]
    fn reset(&mut self, seed: Option<u64>, options: Option<&Bound<'_, PyAny>>) -> (Vec<f64>, HashMap<String, f64>) {
        if options.is_some() {
            debug!("reset options ignored");
        }
        let (obs, info) = self.inner.reset(seed);
        (obs.to_array().to_vec(), to_dict(info))
    }

    fn step(&mut self, action: &Bound<'_, PyAny>) -> PyResult<(Vec<f64>, f64, bool, bool, HashMap<String, f64>)> {
        let step = self.inner.step(extract_action(action)?)?;
        Ok((
            step.observation.to_array().to_vec(),
            step.reward,
            step.terminated,
            step.truncated,
            to_dict(step.info()),
        ))
    }

    fn render(&self) {
        self.inner.render();
    }
}

#[pyclass(name = "PriceAwareAgent", module = "ev_charge_env")]
pub struct PyPriceAwareAgent {
    inner: PriceAwareAgent,
}

#[pymethods]
impl PyPriceAwareAgent {
    #[new]
    #[pyo3(signature = (low_price_threshold = 0.4, high_price_threshold = 0.7, high_load_threshold = 0.8))]
    fn new(low_price_threshold: f64, high_price_threshold: f64, high_load_threshold: f64) -> Self {
        PyPriceAwareAgent {
            inner: PriceAwareAgent {
                low_price_threshold,
                high_price_threshold,
                high_load_threshold,
            },
        }
    }

    fn select_action(&mut self, observation: [f64; 4]) -> Vec<f64> {
        vec![self.inner.select_action(&Observation::from(observation)).0]
    }
}

#[pymodule]
fn ev_charge_env(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEvChargeEnv>()?;
    m.add_class::<PyPriceAwareAgent>()?;
    Ok(())
}
