//! Collision oracle for points and down-sampled trajectories

use crate::common::{PlanningError, PlanningResult, Point2D, Trajectory};

use super::geometry::{in_workspace, inside_obstacle, HalfSpaceObstacle, WorkspaceBounds};

/// Default spacing, in samples, between checked trajectory points
pub const DEFAULT_TRAJECTORY_STRIDE: usize = 5;

/// Point and trajectory collision tests against a fixed obstacle set.
///
/// Trajectories are only checked every `stride` samples, so a collision that
/// falls strictly between two checked samples goes unnoticed.
#[derive(Debug, Clone)]
pub struct CollisionChecker {
    bounds: WorkspaceBounds,
    obstacles: Vec<HalfSpaceObstacle>,
    stride: usize,
}

impl CollisionChecker {
    pub fn new(
        bounds: WorkspaceBounds,
        obstacles: Vec<HalfSpaceObstacle>,
        stride: usize,
    ) -> PlanningResult<Self> {
        bounds.validate()?;
        if stride == 0 {
            return Err(PlanningError::InvalidParameter(
                "trajectory stride must be at least 1".to_string(),
            ));
        }
        Ok(CollisionChecker {
            bounds,
            obstacles,
            stride,
        })
    }

    pub fn bounds(&self) -> &WorkspaceBounds {
        &self.bounds
    }

    pub fn obstacles(&self) -> &[HalfSpaceObstacle] {
        &self.obstacles
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// True if `point` is outside (or on the border of) the workspace, or
    /// inside any obstacle.
    pub fn is_collision(&self, point: Point2D) -> bool {
        !in_workspace(&self.bounds, point)
            || self.obstacles.iter().any(|obs| inside_obstacle(obs, point))
    }

    /// Positions examined by [`Self::is_trajectory_collision`]: samples
    /// `0, stride, 2*stride, ...`
    pub fn checkpoints<'a>(&self, trajectory: &'a Trajectory) -> impl Iterator<Item = Point2D> + 'a {
        trajectory
            .states
            .iter()
            .step_by(self.stride)
            .map(|s| s.position())
    }

    /// True if any checkpoint of `trajectory` collides
    pub fn is_trajectory_collision(&self, trajectory: &Trajectory) -> bool {
        let mut checkpoints = self.checkpoints(trajectory);
        checkpoints.any(|p| self.is_collision(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Configuration;

    fn create_test_checker(stride: usize) -> CollisionChecker {
        let bounds = WorkspaceBounds::new(-10.0, 10.0, -10.0, 10.0).unwrap();
        let square = HalfSpaceObstacle::from_arrays(
            &[[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]],
            &[0.5, 0.5, 0.5, 0.5],
        )
        .unwrap();
        CollisionChecker::new(bounds, vec![square], stride).unwrap()
    }

    fn straight_line(n: usize, y: f64) -> Trajectory {
        Trajectory::from_states(
            (0..n)
                .map(|i| Configuration::from_cartesian(-5.0 + i as f64 * 0.1, y, 0.0))
                .collect(),
        )
    }

    #[test]
    fn test_point_collision() {
        let checker = create_test_checker(DEFAULT_TRAJECTORY_STRIDE);
        assert!(checker.is_collision(Point2D::new(0.0, 0.0)));
        assert!(checker.is_collision(Point2D::new(0.5, 0.5)));
        assert!(!checker.is_collision(Point2D::new(3.0, 3.0)));
        // outside workspace
        assert!(checker.is_collision(Point2D::new(10.0, 10.0)));
    }

    #[test]
    fn test_workspace_only() {
        let bounds = WorkspaceBounds::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let checker = CollisionChecker::new(bounds, Vec::new(), 5).unwrap();
        assert!(checker.is_collision(Point2D::new(10.0, 5.0)));
        assert!(!checker.is_collision(Point2D::new(5.0, 5.0)));
    }

    #[test]
    fn test_zero_stride_rejected() {
        let bounds = WorkspaceBounds::new(0.0, 10.0, 0.0, 10.0).unwrap();
        assert!(CollisionChecker::new(bounds, Vec::new(), 0).is_err());
    }

    #[test]
    fn test_checkpoint_count() {
        for &(len, stride) in &[(0usize, 5usize), (1, 5), (5, 5), (6, 5), (101, 5), (10, 3), (7, 1)] {
            let checker = create_test_checker(stride);
            let traj = straight_line(len, 3.0);
            let expected = (len + stride - 1) / stride;
            assert_eq!(checker.checkpoints(&traj).count(), expected, "len {} stride {}", len, stride);
        }
    }

    #[test]
    fn test_trajectory_collision() {
        let checker = create_test_checker(5);
        // passes straight through the square
        let through = straight_line(101, 0.0);
        assert!(checker.is_trajectory_collision(&through));
        assert!(checker.is_trajectory_collision(&through));

        let clear = straight_line(101, 3.0);
        assert!(!checker.is_trajectory_collision(&clear));
        assert!(!checker.is_trajectory_collision(&clear));
    }

    #[test]
    fn test_collision_between_checkpoints_missed() {
        // only the sample at index 2 is inside the square
        let traj = Trajectory::from_states(vec![
            Configuration::from_cartesian(-3.0, 0.0, 0.0),
            Configuration::from_cartesian(-2.0, 0.0, 0.0),
            Configuration::from_cartesian(0.0, 0.0, 0.0),
            Configuration::from_cartesian(2.0, 0.0, 0.0),
        ]);
        assert!(!create_test_checker(5).is_trajectory_collision(&traj));
        assert!(create_test_checker(1).is_trajectory_collision(&traj));
    }
}
