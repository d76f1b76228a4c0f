//! Reference view layer.

mod raw_file;
mod registry;

pub use raw_file::RawFileEngine;
pub use registry::{ResolvedView, ViewError, ViewRegistry};
