//! Application error types

use thiserror::Error;

/// Errors a view layer reports while rendering a template.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// No engine is registered for the template's extension.
    #[error("no view engine registered for '{engine}' (template '{template}')")]
    EngineNotFound {
        /// Engine name derived from the template.
        engine: String,
        /// Template that was requested.
        template: String,
    },

    /// The template has no extension and no default engine is configured.
    #[error("no default engine was specified and no extension was provided for '{0}'")]
    NoDefaultEngine(String),

    /// The template file could not be read.
    #[error("failed to read template '{path}': {message}")]
    Io {
        /// Resolved template path.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// The engine failed for another reason.
    #[error("render failed: {0}")]
    Engine(String),
}

/// Result type alias for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
