//! FILENAME: app/cli/src/cube/mod.rs
pub mod types;
pub mod utils;
pub mod operations;
pub mod commands;

pub use commands::*;
pub use operations::CubeState;
pub use types::*;
