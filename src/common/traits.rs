//! Common traits defining the collaborators of the planning environment

use crate::common::types::*;

/// Robot model owning the dynamics and the ODE integrator.
///
/// The integration controller only ever asks for one trajectory at a time
/// and hands the heading-control window in explicitly.
pub trait Robot {
    /// Run one integration attempt under `window`
    fn integrate(&mut self, window: ControlWindow) -> IntegrationReport;

    /// Time span of a full trajectory
    fn time_span(&self) -> TimeSpan;

    /// Current pose of the robot
    fn current_pose(&self) -> Pose2D;

    /// Window used for the first attempt of a session
    fn control_window(&self) -> ControlWindow;
}

/// Storage for an RRT: vertices, parent edges and nearest-neighbor lookup
pub trait MotionTree {
    /// Insert a configuration and return its vertex id
    fn insert_vertex(&mut self, configuration: Configuration) -> usize;

    /// Connect `parent` to `child`; false if either id is unknown
    fn insert_edge(&mut self, parent: usize, child: usize) -> bool;

    /// Id of the vertex closest to `point`, None for an empty tree
    fn nearest_neighbor(&self, point: Point2D) -> Option<usize>;
}
