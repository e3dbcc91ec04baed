//! Common types, traits, and error definitions for rrt_environment
//!
//! This module provides the foundational building blocks shared by the
//! collision oracle, the samplers and the integration controller.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
