//! rrt_environment - planning environment for sampling-based motion planners
//!
//! This crate provides the collision oracle, configuration sampler and
//! trajectory integration controller used by an RRT planner working in a
//! bounded 2-D workspace with convex polygonal obstacles.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Pose2D, Configuration, ControlWindow, TimeSpan, Trajectory, IntegrationReport};
pub use common::{Robot, MotionTree};
pub use common::{PlanningError, PlanningResult};
