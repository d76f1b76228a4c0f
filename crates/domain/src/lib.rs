//! Toboggan Domain - Core types
//!
//! This crate defines the values exchanged while asserting on template
//! renders: render options, checker failures and verdicts.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod failure;
pub mod id;
pub mod options;
pub mod path;
pub mod verdict;

pub use error::{ConfigurationError, ConfigurationResult};
pub use failure::{
    AssertionFailure, CheckFailure, CheckMessage, CheckerPanicked, SettleTimeout, SignalDropped,
    assert_equal,
};
pub use id::CycleId;
pub use options::RenderOptions;
pub use path::basename;
pub use verdict::Verdict;
