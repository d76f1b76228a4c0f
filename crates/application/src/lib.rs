//! Toboggan Application - Render interception and checker aggregation
//!
//! This crate hooks a template engine slot, runs the checkers registered for
//! the next render and feeds the aggregated verdict back into the test
//! driver's completion.

pub mod aggregator;
pub mod bridge;
pub mod checker;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod ports;
pub mod registry;

pub use aggregator::Aggregator;
pub use bridge::{CompletionBridge, TemplateTestError};
pub use checker::{CheckResult, Checker, Expectation, Signal, TemplateCheck, TemplateName};
pub use config::{InterceptorConfig, SETTLE_TIMEOUT_ENV};
pub use error::{RenderError, RenderResult};
pub use interceptor::Toboggan;
pub use ports::{EngineHost, EngineTable, RenderEngine, RequestDriver, SharedEngine};
pub use registry::CheckerRegistry;
pub use template_test::{RequestDriverExt, TemplateTest};
