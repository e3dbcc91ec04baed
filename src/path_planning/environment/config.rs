//! Configuration for the planning environment
//!
//! Every parameter has a default matching the reference planner setup; a
//! TOML file only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{PlanningResult, Point2D};

use super::collision::DEFAULT_TRAJECTORY_STRIDE;
use super::control_window::ControlWindowConfig;
use super::geometry::{HalfSpaceObstacle, WorkspaceBounds};
use super::integration::RetryConfig;
use super::sampler::SamplerConfig;

/// Obstacle description, either as a half-space system or as polygon vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObstacleSpec {
    HalfSpace {
        normals: Vec<[f64; 2]>,
        offsets: Vec<f64>,
    },
    Polygon {
        vertices: Vec<[f64; 2]>,
    },
}

impl ObstacleSpec {
    pub fn build(&self) -> PlanningResult<HalfSpaceObstacle> {
        match self {
            ObstacleSpec::HalfSpace { normals, offsets } => {
                HalfSpaceObstacle::from_arrays(normals, offsets)
            }
            ObstacleSpec::Polygon { vertices } => {
                let pts: Vec<Point2D> = vertices.iter().map(|&v| Point2D::from(v)).collect();
                HalfSpaceObstacle::from_vertices(&pts)
            }
        }
    }
}

/// Complete environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub bounds: WorkspaceBounds,
    pub start: [f64; 2],
    pub goal: [f64; 2],
    pub obstacles: Vec<ObstacleSpec>,
    /// Spacing, in samples, between checked trajectory points
    pub trajectory_stride: usize,
    pub sampler: SamplerConfig,
    pub control_window: ControlWindowConfig,
    pub retry: RetryConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            bounds: WorkspaceBounds {
                x_min: 0.0,
                x_max: 10.0,
                y_min: 0.0,
                y_max: 10.0,
            },
            start: [1.0, 1.0],
            goal: [9.0, 9.0],
            obstacles: Vec::new(),
            trajectory_stride: DEFAULT_TRAJECTORY_STRIDE,
            sampler: SamplerConfig::default(),
            control_window: ControlWindowConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    pub fn from_toml_str(contents: &str) -> PlanningResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> PlanningResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Build every obstacle, in order
    pub fn build_obstacles(&self) -> PlanningResult<Vec<HalfSpaceObstacle>> {
        self.obstacles.iter().map(|o| o.build()).collect()
    }
}
