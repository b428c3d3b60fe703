//! Domain layer: pure models, calendar math, error taxonomy, and the ports
//! the engine's collaborators implement.

pub mod calendar;
pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{EngineError, EngineResult};
