//! Heading-control window generator
//!
//! Rejection-samples `(t_head_min, t_head_max)` so that the window width lies
//! strictly between two fractions of the trajectory duration and both bounds
//! are non-negative.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::common::{ControlWindow, PlanningError, PlanningResult, TimeSpan};

/// How candidate window bounds are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWindowPolicy {
    /// Both bounds uniform over the trajectory time span
    Uniform,
    /// Bounds drawn from normals expressed as fractions of the duration
    NormalBiased,
}

impl fmt::Display for ControlWindowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlWindowPolicy::Uniform => write!(f, "uniform"),
            ControlWindowPolicy::NormalBiased => write!(f, "normal"),
        }
    }
}

/// Configuration for the control-window generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlWindowConfig {
    /// Lower bound on the window width, percent of duration
    pub dt_min_percent: f64,
    /// Upper bound on the window width, percent of duration
    pub dt_max_percent: f64,
    /// Mean of (t_head_min, t_head_max) as fractions of duration
    pub normal_mean: [f64; 2],
    /// Standard deviation of (t_head_min, t_head_max) as fractions of duration
    pub normal_std_dev: [f64; 2],
    /// Rejection attempts before giving up
    pub max_attempts: usize,
}

impl Default for ControlWindowConfig {
    fn default() -> Self {
        Self {
            dt_min_percent: 25.0,
            dt_max_percent: 50.0,
            normal_mean: [0.10, 0.25],
            normal_std_dev: [0.05, 0.10],
            max_attempts: 10_000,
        }
    }
}

/// Rejection sampler for heading-control windows
#[derive(Debug, Clone)]
pub struct ControlWindowGenerator {
    config: ControlWindowConfig,
}

impl ControlWindowGenerator {
    pub fn new(config: ControlWindowConfig) -> PlanningResult<Self> {
        let finite = [config.dt_min_percent, config.dt_max_percent]
            .iter()
            .chain(config.normal_mean.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(PlanningError::InvalidParameter(
                "control window parameters must be finite".to_string(),
            ));
        }
        if config.normal_std_dev.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(PlanningError::InvalidParameter(
                "control window standard deviations must be non-negative".to_string(),
            ));
        }
        if config.max_attempts == 0 {
            return Err(PlanningError::InvalidParameter(
                "control window max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(ControlWindowGenerator { config })
    }

    pub fn with_defaults() -> Self {
        ControlWindowGenerator {
            config: ControlWindowConfig::default(),
        }
    }

    pub fn config(&self) -> &ControlWindowConfig {
        &self.config
    }

    /// `(dt_min, dt_max)` in seconds for a trajectory spanning `span`
    pub fn width_limits(&self, span: TimeSpan) -> (f64, f64) {
        let duration = span.duration();
        (
            self.config.dt_min_percent / 100.0 * duration,
            self.config.dt_max_percent / 100.0 * duration,
        )
    }

    /// Whether `window` satisfies the width and non-negativity constraints
    pub fn is_admissible(&self, window: &ControlWindow, span: TimeSpan) -> bool {
        let (dt_min, dt_max) = self.width_limits(span);
        let dt = window.width();
        dt > dt_min && dt < dt_max && window.t_head_min >= 0.0 && window.t_head_max >= 0.0
    }

    /// Draw windows under `policy` until one is admissible.
    ///
    /// Fails with `SamplingExhausted` after `max_attempts` rejections.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        span: TimeSpan,
        policy: ControlWindowPolicy,
        rng: &mut R,
    ) -> PlanningResult<ControlWindow> {
        let duration = span.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "time span must have positive duration, got {:?}",
                span
            )));
        }

        let normals = match policy {
            ControlWindowPolicy::NormalBiased => {
                let [mu_min, mu_max] = self.config.normal_mean;
                let [sd_min, sd_max] = self.config.normal_std_dev;
                let to_err = |e: rand_distr::NormalError| PlanningError::InvalidParameter(e.to_string());
                Some((
                    Normal::new(mu_min * duration, sd_min * duration).map_err(to_err)?,
                    Normal::new(mu_max * duration, sd_max * duration).map_err(to_err)?,
                ))
            }
            ControlWindowPolicy::Uniform => None,
        };

        for attempt in 1..=self.config.max_attempts {
            let window = match normals {
                Some((ref n_min, ref n_max)) => ControlWindow::new(n_min.sample(rng), n_max.sample(rng)),
                None => ControlWindow::new(
                    rng.gen_range(span.t_1..=span.t_2),
                    rng.gen_range(span.t_1..=span.t_2),
                ),
            };
            if self.is_admissible(&window, span) {
                log::debug!(
                    "{} control window ({:.3}, {:.3}) accepted after {} attempts",
                    policy,
                    window.t_head_min,
                    window.t_head_max,
                    attempt
                );
                return Ok(window);
            }
        }

        Err(PlanningError::SamplingExhausted {
            attempts: self.config.max_attempts,
        })
    }
}

impl Default for ControlWindowGenerator {
    fn default() -> Self {
        Self::with_defaults()
    }
}
