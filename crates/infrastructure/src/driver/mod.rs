//! Test driver for axum applications.
//!
//! [`TestClient`] sends requests straight into a router through tower's
//! `oneshot`, so no socket is bound. [`TestRequest`] implements the
//! `RequestDriver` port and checks its response expectations in the order
//! they were added.

mod client;
mod expectation;

pub use client::{TestClient, TestRequest, TestResponse};
pub use expectation::{DriverFailure, ResponseExpectation, StatusExpectation};
