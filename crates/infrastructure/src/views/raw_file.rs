//! Fallback engine that serves template files verbatim.

use async_trait::async_trait;
use tokio::fs;
use toboggan_application::{RenderEngine, RenderError, RenderResult};
use toboggan_domain::RenderOptions;

/// Engine that returns the template file's contents without processing.
///
/// Used by [`ViewRegistry`](super::ViewRegistry) when no engine is registered
/// for a template's extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFileEngine;

impl RawFileEngine {
    /// Creates a new `RawFileEngine`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderEngine for RawFileEngine {
    async fn render(&self, path: &str, _options: &RenderOptions) -> RenderResult<String> {
        fs::read_to_string(path).await.map_err(|e| RenderError::Io {
            path: path.to_string(),
            message: if e.kind() == std::io::ErrorKind::NotFound {
                "not found".to_string()
            } else {
                e.to_string()
            },
        })
    }
}
