//! CLI front door and configuration loading for the exploration engine.
//! The algorithmic core lives in `explorer_engine`; this crate only wires
//! concrete collaborators to it.

pub mod config;
pub mod demo;
pub mod logging;

pub use explorer_engine::{EngineConfig, ExplorerError};
