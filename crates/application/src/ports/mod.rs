//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the interception engine and the
//! framework it is plugged into: the application's view engine table and the
//! test driver that issues requests.

mod engine_host;
mod request_driver;

pub use engine_host::{EngineHost, EngineTable, RenderEngine, SharedEngine};
pub use request_driver::RequestDriver;
