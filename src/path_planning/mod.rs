// Path Planning module

pub mod environment;
pub mod tree;

pub use environment::*;
pub use tree::*;
