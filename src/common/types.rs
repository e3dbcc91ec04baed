//! Common types used throughout rrt_environment

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(a: [f64; 2]) -> Self {
        Self { x: a[0], y: a[1] }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// 2D pose (position + heading) in Cartesian form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Polar form of this pose
    pub fn to_configuration(&self) -> Configuration {
        Configuration::from_pose(self)
    }
}

/// Planner configuration in polar form: range, bearing and heading.
///
/// The robot's integrator works in polar coordinates about the workspace
/// origin, so trajectories come back as sequences of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    /// Range from the origin
    pub rho: f64,
    /// Bearing from the x axis
    pub phi: f64,
    /// Heading
    pub theta: f64,
}

impl Configuration {
    pub fn new(rho: f64, phi: f64, theta: f64) -> Self {
        Self { rho, phi, theta }
    }

    pub fn from_cartesian(x: f64, y: f64, theta: f64) -> Self {
        Self {
            rho: x.hypot(y),
            phi: y.atan2(x),
            theta,
        }
    }

    pub fn from_pose(pose: &Pose2D) -> Self {
        Self::from_cartesian(pose.x, pose.y, pose.yaw)
    }

    /// Cartesian position of this configuration
    pub fn position(&self) -> Point2D {
        Point2D::new(self.rho * self.phi.cos(), self.rho * self.phi.sin())
    }

    pub fn to_pose(&self) -> Pose2D {
        let p = self.position();
        Pose2D::new(p.x, p.y, self.theta)
    }
}

/// Time span `[t_1, t_2]` covered by a robot trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub t_1: f64,
    pub t_2: f64,
}

impl TimeSpan {
    pub fn new(t_1: f64, t_2: f64) -> Self {
        Self { t_1, t_2 }
    }

    pub fn duration(&self) -> f64 {
        self.t_2 - self.t_1
    }
}

/// Integrated robot trajectory, one configuration per time step
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub states: Vec<Configuration>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    pub fn from_states(states: Vec<Configuration>) -> Self {
        Self { states }
    }

    pub fn push(&mut self, state: Configuration) {
        self.states.push(state);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Cartesian positions of every state
    pub fn positions(&self) -> Vec<Point2D> {
        self.states.iter().map(|s| s.position()).collect()
    }

    pub fn last(&self) -> Option<&Configuration> {
        self.states.last()
    }
}

/// Heading-control time window `[t_head_min, t_head_max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlWindow {
    pub t_head_min: f64,
    pub t_head_max: f64,
}

impl ControlWindow {
    pub fn new(t_head_min: f64, t_head_max: f64) -> Self {
        Self { t_head_min, t_head_max }
    }

    /// Window covering the whole time span
    pub fn full(span: TimeSpan) -> Self {
        Self::new(span.t_1, span.t_2)
    }

    pub fn width(&self) -> f64 {
        self.t_head_max - self.t_head_min
    }
}

/// Outcome of a single integration attempt
#[derive(Debug, Clone)]
pub struct IntegrationReport {
    pub trajectory: Trajectory,
    pub success: bool,
    /// Integrator diagnostic
    pub message: String,
}

impl IntegrationReport {
    pub fn succeeded(trajectory: Trajectory) -> Self {
        Self {
            trajectory,
            success: true,
            message: "Integration successful.".to_string(),
        }
    }

    pub fn failed(trajectory: Trajectory, message: &str) -> Self {
        Self {
            trajectory,
            success: false,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_polar_round_trip() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = rng.gen_range(-50.0..50.0);
            let y = rng.gen_range(-50.0..50.0);
            if x * x + y * y == 0.0 {
                continue;
            }
            let q = Configuration::from_cartesian(x, y, 0.3);
            let p = q.position();
            assert!((p.x - x).abs() < 1e-9, "x: {} vs {}", p.x, x);
            assert!((p.y - y).abs() < 1e-9, "y: {} vs {}", p.y, y);
        }
    }

    #[test]
    fn test_configuration_pose_conversion() {
        let pose = Pose2D::new(0.0, 2.0, 1.2);
        let q = pose.to_configuration();
        assert!((q.rho - 2.0).abs() < 1e-12);
        assert!((q.phi - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(q.theta, 1.2);

        let back = q.to_pose();
        assert!(back.x.abs() < 1e-12);
        assert!((back.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_time_span_duration() {
        let span = TimeSpan::new(1.0, 6.0);
        assert_eq!(span.duration(), 5.0);
    }

    #[test]
    fn test_trajectory_positions() {
        let traj = Trajectory::from_states(vec![
            Configuration::from_cartesian(1.0, 0.0, 0.0),
            Configuration::from_cartesian(0.0, 1.0, 0.0),
        ]);
        let pts = traj.positions();
        assert_eq!(pts.len(), 2);
        assert!((pts[1].y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_control_window() {
        let w = ControlWindow::full(TimeSpan::new(0.0, 5.0));
        assert_eq!(w, ControlWindow::new(0.0, 5.0));
        assert_eq!(w.width(), 5.0);
    }
}
