//! Planning Environment Module
//!
//! Bounded 2-D workspace with convex polygonal obstacles, and the pieces a
//! sampling-based planner needs on top of it.
//!
//! # Components
//!
//! - `geometry`: workspace rectangle and half-space obstacles
//! - `collision`: point and down-sampled trajectory collision oracle
//! - `sampler`: uniform and pose-biased configuration sampling
//! - `control_window`: rejection sampler for heading-control windows
//! - `integration`: trajectory integration with escalating retries
//! - `config`: TOML-loadable configuration
//!
//! # Example
//!
//! ```no_run
//! use rrt_environment::path_planning::environment::{Environment, EnvironmentConfig};
//! use rrt_environment::common::Point2D;
//!
//! let env = Environment::from_config(&EnvironmentConfig::default()).unwrap();
//! assert!(!env.is_collision(Point2D::new(5.0, 5.0)));
//! assert!(env.is_collision(Point2D::new(10.0, 5.0)));
//! ```

pub mod geometry;
pub mod collision;
pub mod sampler;
pub mod control_window;
pub mod integration;
pub mod config;

pub use geometry::*;
pub use collision::*;
pub use sampler::*;
pub use control_window::*;
pub use integration::*;
pub use config::*;

use rand::Rng;

use crate::common::{ControlWindow, PlanningResult, Point2D, Pose2D, Robot, Trajectory};

/// Workspace, obstacles, start and goal plus the collision oracle, sampler
/// and integration controller built over them.
#[derive(Debug, Clone)]
pub struct Environment {
    checker: CollisionChecker,
    sampler: ConfigurationSampler,
    integrator: TrajectoryIntegrator,
    start: Point2D,
    goal: Point2D,
}

impl Environment {
    /// Environment with default sampler, control-window and retry settings
    pub fn new(
        bounds: WorkspaceBounds,
        obstacles: Vec<HalfSpaceObstacle>,
        start: Point2D,
        goal: Point2D,
    ) -> PlanningResult<Self> {
        let config = EnvironmentConfig {
            bounds,
            start: [start.x, start.y],
            goal: [goal.x, goal.y],
            ..Default::default()
        };
        Self::build(&config, obstacles)
    }

    pub fn from_config(config: &EnvironmentConfig) -> PlanningResult<Self> {
        let obstacles = config.build_obstacles()?;
        Self::build(config, obstacles)
    }

    fn build(config: &EnvironmentConfig, obstacles: Vec<HalfSpaceObstacle>) -> PlanningResult<Self> {
        let checker = CollisionChecker::new(config.bounds, obstacles, config.trajectory_stride)?;
        let sampler = ConfigurationSampler::new(config.bounds, &config.sampler)?;
        let generator = ControlWindowGenerator::new(config.control_window)?;
        let integrator = TrajectoryIntegrator::new(config.retry, generator)?;

        log::info!(
            "environment [{}, {}] x [{}, {}] with {} obstacles",
            config.bounds.x_min,
            config.bounds.x_max,
            config.bounds.y_min,
            config.bounds.y_max,
            checker.obstacles().len()
        );

        Ok(Environment {
            checker,
            sampler,
            integrator,
            start: Point2D::from(config.start),
            goal: Point2D::from(config.goal),
        })
    }

    pub fn bounds(&self) -> &WorkspaceBounds {
        self.checker.bounds()
    }

    pub fn obstacles(&self) -> &[HalfSpaceObstacle] {
        self.checker.obstacles()
    }

    pub fn start(&self) -> Point2D {
        self.start
    }

    pub fn goal(&self) -> Point2D {
        self.goal
    }

    pub fn set_start(&mut self, start: Point2D) {
        self.start = start;
    }

    pub fn set_goal(&mut self, goal: Point2D) {
        self.goal = goal;
    }

    pub fn checker(&self) -> &CollisionChecker {
        &self.checker
    }

    pub fn sampler(&self) -> &ConfigurationSampler {
        &self.sampler
    }

    pub fn integrator(&self) -> &TrajectoryIntegrator {
        &self.integrator
    }

    pub fn is_collision(&self, point: Point2D) -> bool {
        self.checker.is_collision(point)
    }

    pub fn is_trajectory_collision(&self, trajectory: &Trajectory) -> bool {
        self.checker.is_trajectory_collision(trajectory)
    }

    /// Draw `n` configurations around `pose` (used by the biased distribution)
    pub fn sample<R: Rng + ?Sized>(
        &self,
        n: usize,
        distribution: SamplingDistribution,
        pose: &Pose2D,
        rng: &mut R,
    ) -> PlanningResult<SampleSet> {
        self.sampler.sample(n, distribution, pose, &self.checker, rng)
    }

    /// Draw `n` configurations biased by the robot's current pose, with the
    /// distribution given by name
    pub fn random_configurations<B: Robot + ?Sized, R: Rng + ?Sized>(
        &self,
        n: usize,
        distribution: &str,
        robot: &B,
        rng: &mut R,
    ) -> PlanningResult<SampleSet> {
        let pose = robot.current_pose();
        self.sampler
            .sample_named(n, distribution, &pose, &self.checker, rng)
    }

    /// Random heading-control window for the robot's current time span
    pub fn random_control_window<B: Robot + ?Sized, R: Rng + ?Sized>(
        &self,
        robot: &B,
        policy: ControlWindowPolicy,
        rng: &mut R,
    ) -> PlanningResult<ControlWindow> {
        self.integrator
            .generator()
            .generate(robot.time_span(), policy, rng)
    }

    /// Integrate a robot trajectory, retrying with new control windows on
    /// failure. Call [`Self::is_trajectory_collision`] on the result to
    /// validate it.
    pub fn draw_robot_trajectory<B: Robot + ?Sized, R: Rng + ?Sized>(
        &self,
        robot: &mut B,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> PlanningResult<IntegrationSuccess> {
        self.integrator.integrate(robot, rng, cancel)
    }
}
