//! Visualization utilities for rrt_environment
//!
//! Plots the workspace, obstacles, samples and trajectories with gnuplot.
//! Nothing in the planning core depends on this module.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{PlanningError, PlanningResult, Point2D, Pose2D, Trajectory};
use crate::path_planning::environment::{CollisionChecker, Environment, HalfSpaceObstacle, SampleSet, WorkspaceBounds};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#66BF1A";
    pub const BLUE: &str = "#0000FF";
    pub const CYAN: &str = "#00FFFF";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const WORKSPACE: &str = BLUE;
    pub const OBSTACLE: &str = BLUE;
    pub const FREE_SAMPLE: &str = GREEN;
    pub const COLLISION_SAMPLE: &str = RED;
    pub const START: &str = GREEN;
    pub const GOAL: &str = "#804026";
    pub const TRAJECTORY: &str = BLACK;
    pub const CHECKPOINT: &str = RED;
    pub const ROBOT: &str = CYAN;
}

/// Style for line rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: colors::TRAJECTORY.to_string(),
            line_width: 2.0,
            caption: "Trajectory".to_string(),
        }
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

fn split_xy(points: &[Point2D]) -> (Vec<f64>, Vec<f64>) {
    (points.iter().map(|p| p.x).collect(), points.iter().map(|p| p.y).collect())
}

/// Layered 2D plot, rendered into a single gnuplot axes on output
pub struct Visualizer {
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn plot_lines(&mut self, points: &[Point2D], style: &PathStyle) -> &mut Self {
        let (x, y) = split_xy(points);
        self.layers.push(Layer::Lines { x, y, style: style.clone() });
        self
    }

    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        if points.is_empty() {
            return self;
        }
        let (x, y) = split_xy(points);
        self.layers.push(Layer::Points { x, y, style: style.clone() });
        self
    }

    /// Workspace border, with a margin of 1 around it on the axes
    pub fn plot_workspace(&mut self, bounds: &WorkspaceBounds) -> &mut Self {
        let mut border = bounds.corners().to_vec();
        border.push(border[0]);
        self.plot_lines(&border, &PathStyle::new(colors::WORKSPACE, "").with_line_width(0.75));
        self.set_x_range(bounds.x_min - 1.0, bounds.x_max + 1.0);
        self.set_y_range(bounds.y_min - 1.0, bounds.y_max + 1.0)
    }

    /// Obstacle outlines and centroids; obstacles without vertices are skipped
    pub fn plot_obstacles(&mut self, obstacles: &[HalfSpaceObstacle]) -> &mut Self {
        let mut centroids = Vec::new();
        for obstacle in obstacles {
            if obstacle.vertices().is_empty() {
                log::debug!("obstacle without boundary vertices not drawn");
                continue;
            }
            let mut outline = obstacle.vertices().to_vec();
            outline.push(outline[0]);
            self.plot_lines(&outline, &PathStyle::new(colors::OBSTACLE, "").with_line_width(0.75));
            centroids.extend(obstacle.centroid());
        }
        self.plot_points(
            &centroids,
            &PointStyle::new(colors::GRAY, "Obstacles").with_symbol('S').with_size(1.5),
        )
    }

    /// Samples split into free and colliding
    pub fn plot_samples(&mut self, samples: &SampleSet) -> &mut Self {
        let (free, colliding) = samples.partition_positions();
        self.plot_points(&free, &PointStyle::new(colors::FREE_SAMPLE, "Free").with_size(0.5));
        self.plot_points(
            &colliding,
            &PointStyle::new(colors::COLLISION_SAMPLE, "Collision").with_size(0.5),
        )
    }

    pub fn plot_trajectory(&mut self, trajectory: &Trajectory, style: &PathStyle) -> &mut Self {
        self.plot_lines(&trajectory.positions(), style)
    }

    /// Points the collision checker examines along `trajectory`
    pub fn plot_checkpoints(&mut self, checker: &CollisionChecker, trajectory: &Trajectory) -> &mut Self {
        let points: Vec<Point2D> = checker.checkpoints(trajectory).collect();
        self.plot_points(&points, &PointStyle::new(colors::CHECKPOINT, "Checked").with_size(0.5))
    }

    /// Robot position with a heading tick
    pub fn plot_robot(&mut self, pose: &Pose2D, size: f64) -> &mut Self {
        self.plot_points(&[pose.position()], &PointStyle::new(colors::ROBOT, "Robot").with_size(size));
        let tip = Point2D::new(
            pose.x + size * 0.5 * pose.yaw.cos(),
            pose.y + size * 0.5 * pose.yaw.sin(),
        );
        self.plot_lines(&[pose.position(), tip], &PathStyle::new(colors::ROBOT, ""))
    }

    /// Workspace, obstacles, start and goal of an environment
    pub fn plot_environment(&mut self, env: &Environment) -> &mut Self {
        self.plot_workspace(env.bounds());
        self.plot_obstacles(env.obstacles());
        self.plot_points(&[env.start()], &PointStyle::new(colors::START, "Start").with_size(1.5));
        self.plot_points(&[env.goal()], &PointStyle::new(colors::GOAL, "Goal").with_size(3.0))
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        {
            let axes = figure.axes2d();
            for layer in &self.layers {
                match layer {
                    Layer::Lines { x, y, style } => {
                        axes.lines(x, y, &[
                            Caption(&style.caption),
                            Color(&style.color),
                            LineWidth(style.line_width),
                        ]);
                    }
                    Layer::Points { x, y, style } => {
                        axes.points(x, y, &[
                            Caption(&style.caption),
                            Color(&style.color),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ]);
                    }
                }
            }

            if !self.title.is_empty() {
                axes.set_title(&self.title, &[]);
            }
            axes.set_x_label(&self.x_label, &[]);
            axes.set_y_label(&self.y_label, &[]);
            if let Some((min, max)) = self.x_range {
                axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            if let Some((min, max)) = self.y_range {
                axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
            }
            if let Some(ratio) = self.aspect_ratio {
                axes.set_aspect_ratio(AutoOption::Fix(ratio));
            }
        }
        figure
    }

    /// Finalize and show the plot
    pub fn show(&self) -> PlanningResult<()> {
        self.render()
            .show()
            .map(|_| ())
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&self, path: &str, width: u32, height: u32) -> PlanningResult<()> {
        self.render()
            .save_to_png(path, width, height)
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }

    /// Save plot to SVG file
    pub fn save_svg(&self, path: &str) -> PlanningResult<()> {
        self.render()
            .save_to_svg(path, 800, 600)
            .map_err(|e| PlanningError::VisualizationError(e.to_string()))
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Configuration;

    #[test]
    fn test_visualizer_creation() {
        let vis = Visualizer::new();
        assert!(vis.aspect_ratio.is_some());
        assert_eq!(vis.layer_count(), 0);
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_layers() {
        let bounds = WorkspaceBounds::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let triangle = HalfSpaceObstacle::from_vertices(&[
            Point2D::new(2.0, 2.0),
            Point2D::new(3.0, 2.0),
            Point2D::new(2.5, 3.0),
        ])
        .unwrap();
        let bare = HalfSpaceObstacle::from_arrays(&[[1.0, 0.0]], &[0.0]).unwrap();
        let checker = CollisionChecker::new(bounds, vec![triangle.clone(), bare.clone()], 5).unwrap();
        let traj = Trajectory::from_states(
            (0..12).map(|i| Configuration::from_cartesian(1.0 + i as f64 * 0.5, 1.0, 0.0)).collect(),
        );

        let mut vis = Visualizer::new();
        vis.plot_workspace(&bounds);
        assert_eq!(vis.x_range, Some((-1.0, 11.0)));
        // border
        assert_eq!(vis.layer_count(), 1);
        vis.plot_obstacles(&[triangle, bare]);
        // one outline plus the centroid layer
        assert_eq!(vis.layer_count(), 3);
        vis.plot_trajectory(&traj, &PathStyle::default());
        vis.plot_checkpoints(&checker, &traj);
        assert_eq!(vis.layer_count(), 5);
        vis.plot_samples(&SampleSet::default());
        assert_eq!(vis.layer_count(), 5);
    }
}
