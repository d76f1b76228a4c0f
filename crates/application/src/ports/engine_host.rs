//! View engine ports

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use toboggan_domain::RenderOptions;

use crate::error::RenderResult;

/// A render function registered under an engine name.
///
/// The view layer calls it once per response render with the resolved
/// template path and the options the handler supplied. Returning is the
/// completion signal: the response is written only after `render` resolves.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Renders the template at `path`.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` if the template cannot be rendered.
    async fn render(&self, path: &str, options: &RenderOptions) -> RenderResult<String>;
}

/// Engine shared between a host table and whoever installed it.
pub type SharedEngine = Arc<dyn RenderEngine>;

/// Engine name to render function mapping.
pub type EngineTable = HashMap<String, SharedEngine>;

/// Port for an application object that owns an engine table.
///
/// Implementations must apply changes immediately, so code issuing requests
/// against the application sees them on the next render.
pub trait EngineHost: Send + Sync {
    /// Returns a copy of the current engine table.
    fn engines(&self) -> EngineTable;

    /// Replaces the whole engine table.
    fn replace_engines(&self, engines: EngineTable);

    /// Registers `engine` under `name`, replacing any existing entry.
    fn register_engine(&self, name: &str, engine: SharedEngine);

    /// Looks up the engine registered under `name`.
    fn engine(&self, name: &str) -> Option<SharedEngine> {
        self.engines().get(name).cloned()
    }
}
