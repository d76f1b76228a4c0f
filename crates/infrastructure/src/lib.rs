//! Toboggan Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer: an axum view layer that owns an engine table, an
//! in-process request driver and the tracing setup used by tests.

pub mod driver;
pub mod telemetry;
pub mod views;

pub use driver::{
    DriverFailure, ResponseExpectation, StatusExpectation, TestClient, TestRequest, TestResponse,
};
pub use telemetry::init_tracing;
pub use views::{RawFileEngine, ResolvedView, ViewError, ViewRegistry};
