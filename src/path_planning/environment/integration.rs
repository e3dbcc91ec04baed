//! Trajectory integration controller
//!
//! Requests trajectories from a [`Robot`] and, while integration keeps
//! failing, escalates how the next heading-control window is chosen:
//!
//! 1. `k < gaussian_ceiling`: normal-biased random window
//! 2. `k + 1 == absolute_ceiling`: the robot's full time span
//! 3. otherwise: uniform random window
//!
//! At most `absolute_ceiling` integration calls are made per session,
//! including the initial one.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{ControlWindow, PlanningError, PlanningResult, Robot, Trajectory};

use super::control_window::{ControlWindowGenerator, ControlWindowPolicy};

/// Retry ceilings for the integration controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries below this count use normal-biased windows
    pub gaussian_ceiling: usize,
    /// Total integration calls allowed per session
    pub absolute_ceiling: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            gaussian_ceiling: 4,
            absolute_ceiling: 6,
        }
    }
}

/// Window selection stage for a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStage {
    NormalRetry,
    FullControl,
    UniformRetry,
}

impl fmt::Display for RetryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryStage::NormalRetry => write!(f, "normal heading time control"),
            RetryStage::FullControl => write!(f, "full heading time control"),
            RetryStage::UniformRetry => write!(f, "uniform heading time control"),
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> PlanningResult<()> {
        if self.absolute_ceiling < 2 {
            return Err(PlanningError::InvalidParameter(format!(
                "absolute retry ceiling must be at least 2, got {}",
                self.absolute_ceiling
            )));
        }
        if self.gaussian_ceiling > self.absolute_ceiling {
            return Err(PlanningError::InvalidParameter(format!(
                "gaussian retry ceiling {} exceeds absolute ceiling {}",
                self.gaussian_ceiling, self.absolute_ceiling
            )));
        }
        Ok(())
    }

    /// Stage used to pick the window after `k` failed attempts
    pub fn stage(&self, k: usize) -> RetryStage {
        if k < self.gaussian_ceiling {
            RetryStage::NormalRetry
        } else if k + 1 == self.absolute_ceiling {
            RetryStage::FullControl
        } else {
            RetryStage::UniformRetry
        }
    }
}

/// Cooperative cancellation for the retry loop: a shared flag plus an
/// optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

/// Successful integration session
#[derive(Debug, Clone)]
pub struct IntegrationSuccess {
    pub trajectory: Trajectory,
    /// Window the successful attempt ran under
    pub window: ControlWindow,
    /// Integration calls made, including the successful one
    pub attempts: usize,
}

/// Integration controller with an escalating retry schedule
#[derive(Debug, Clone)]
pub struct TrajectoryIntegrator {
    retry: RetryConfig,
    generator: ControlWindowGenerator,
}

impl TrajectoryIntegrator {
    pub fn new(retry: RetryConfig, generator: ControlWindowGenerator) -> PlanningResult<Self> {
        retry.validate()?;
        Ok(TrajectoryIntegrator { retry, generator })
    }

    pub fn with_defaults() -> Self {
        TrajectoryIntegrator {
            retry: RetryConfig::default(),
            generator: ControlWindowGenerator::with_defaults(),
        }
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn generator(&self) -> &ControlWindowGenerator {
        &self.generator
    }

    /// Window to use at `stage`
    fn select_window<B: Robot + ?Sized, R: Rng + ?Sized>(
        &self,
        stage: RetryStage,
        robot: &B,
        rng: &mut R,
    ) -> PlanningResult<ControlWindow> {
        let span = robot.time_span();
        match stage {
            RetryStage::NormalRetry => {
                self.generator.generate(span, ControlWindowPolicy::NormalBiased, rng)
            }
            RetryStage::FullControl => Ok(ControlWindow::full(span)),
            RetryStage::UniformRetry => {
                self.generator.generate(span, ControlWindowPolicy::Uniform, rng)
            }
        }
    }

    /// Run one trajectory-generation session.
    ///
    /// The first attempt uses the robot's current control window. The
    /// returned trajectory is not collision checked.
    pub fn integrate<B: Robot + ?Sized, R: Rng + ?Sized>(
        &self,
        robot: &mut B,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> PlanningResult<IntegrationSuccess> {
        let mut stages = Vec::new();
        self.integrate_traced(robot, rng, cancel, &mut stages)
    }

    /// [`Self::integrate`], appending the stage chosen for every retry to
    /// `stages` in order.
    pub fn integrate_traced<B: Robot + ?Sized, R: Rng + ?Sized>(
        &self,
        robot: &mut B,
        rng: &mut R,
        cancel: &CancelToken,
        stages: &mut Vec<RetryStage>,
    ) -> PlanningResult<IntegrationSuccess> {
        if cancel.is_cancelled() {
            return Err(PlanningError::Cancelled);
        }

        let mut window = robot.control_window();
        let mut report = robot.integrate(window);
        let mut k = 1;

        while !report.success {
            if cancel.is_cancelled() {
                log::warn!("integration cancelled after {} attempts", k);
                return Err(PlanningError::Cancelled);
            }

            let stage = self.retry.stage(k);
            stages.push(stage);
            window = self.select_window(stage, robot, rng)?;
            log::warn!(
                "integration failed ({}), retrying with {}: ({:.3}, {:.3})",
                report.message,
                stage,
                window.t_head_min,
                window.t_head_max
            );

            k += 1;
            report = robot.integrate(window);

            if k >= self.retry.absolute_ceiling {
                if !report.success {
                    log::warn!("integration failed, max iterations reached after {} attempts", k);
                    return Err(PlanningError::IntegrationFailed {
                        message: report.message,
                        attempts: k,
                    });
                }
                break;
            }
        }

        log::info!("integration successful after {} attempts", k);
        Ok(IntegrationSuccess {
            trajectory: report.trajectory,
            window,
            attempts: k,
        })
    }
}

impl Default for TrajectoryIntegrator {
    fn default() -> Self {
        Self::with_defaults()
    }
}
