//! Utility modules for rrt_environment

pub mod visualization;

pub use visualization::{Visualizer, PathStyle, PointStyle, colors};
