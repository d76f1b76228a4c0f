//! View layer for axum applications.
//!
//! Handlers render templates by name. The name is resolved against the views
//! directory, the engine is chosen from the file extension (the default
//! engine's extension is appended when the name has none) and the engine
//! receives the absolute template path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use parking_lot::RwLock;
use thiserror::Error;
use toboggan_application::{
    EngineHost, EngineTable, RenderEngine, RenderError, RenderResult, SharedEngine,
};
use toboggan_domain::RenderOptions;
use tracing::{debug, warn};

use super::RawFileEngine;

/// Render failure returned from axum handlers.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ViewError(#[from] pub RenderError);

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        warn!(error = %self.0, "view render failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// A template name resolved to a file and an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedView {
    /// Absolute (or views-relative) template path handed to the engine.
    pub path: String,
    /// Engine name, the file extension without its dot.
    pub engine: String,
}

struct ViewState {
    views_dir: PathBuf,
    default_engine: Option<String>,
    engines: EngineTable,
    fallback: Option<SharedEngine>,
}

/// Engine table, views directory and default engine of one application.
///
/// Cloning yields another handle to the same table, so a clone can be moved
/// into router state while another is handed to an interceptor.
#[derive(Clone)]
pub struct ViewRegistry {
    state: Arc<RwLock<ViewState>>,
}

impl ViewRegistry {
    /// Creates a registry serving templates from `views_dir`.
    ///
    /// Templates whose engine is not registered are served verbatim by a
    /// [`RawFileEngine`].
    #[must_use]
    pub fn new(views_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewState {
                views_dir: views_dir.into(),
                default_engine: None,
                engines: EngineTable::new(),
                fallback: Some(Arc::new(RawFileEngine::new())),
            })),
        }
    }

    /// Sets the engine used for names without an extension.
    #[must_use]
    pub fn with_default_engine(self, engine: impl Into<String>) -> Self {
        let engine = engine.into();
        self.state.write().default_engine = Some(engine.trim_start_matches('.').to_string());
        self
    }

    /// Registers `engine` for templates with the extension `name`.
    #[must_use]
    pub fn with_engine(self, name: &str, engine: impl RenderEngine + 'static) -> Self {
        self.register_engine(name, Arc::new(engine));
        self
    }

    /// Makes templates without a registered engine fail with `EngineNotFound`.
    #[must_use]
    pub fn without_fallback(self) -> Self {
        self.state.write().fallback = None;
        self
    }

    /// Returns the views directory.
    #[must_use]
    pub fn views_dir(&self) -> PathBuf {
        self.state.read().views_dir.clone()
    }

    /// Returns the default engine name.
    #[must_use]
    pub fn default_engine(&self) -> Option<String> {
        self.state.read().default_engine.clone()
    }

    /// Resolves a template name to its path and engine.
    ///
    /// # Errors
    ///
    /// Returns `NoDefaultEngine` if `name` has no extension and no default
    /// engine is set.
    pub fn resolve(&self, name: &str) -> RenderResult<ResolvedView> {
        let state = self.state.read();
        let extension = Path::new(name).extension().and_then(|ext| ext.to_str());

        let (file, engine) = match extension {
            Some(ext) => (name.to_string(), ext.to_string()),
            None => {
                let default = state
                    .default_engine
                    .clone()
                    .ok_or_else(|| RenderError::NoDefaultEngine(name.to_string()))?;
                (format!("{name}.{default}"), default)
            }
        };

        Ok(ResolvedView {
            path: state.views_dir.join(file).to_string_lossy().into_owned(),
            engine,
        })
    }

    /// Renders the template `name` with `options`.
    ///
    /// # Errors
    ///
    /// Returns a `RenderError` if the name cannot be resolved, no engine
    /// serves it or the engine fails.
    pub async fn render(&self, name: &str, options: &RenderOptions) -> RenderResult<String> {
        let view = self.resolve(name)?;
        let engine = {
            let state = self.state.read();
            state
                .engines
                .get(&view.engine)
                .cloned()
                .or_else(|| state.fallback.clone())
        };
        let Some(engine) = engine else {
            return Err(RenderError::EngineNotFound {
                engine: view.engine,
                template: name.to_string(),
            });
        };

        debug!(template = name, path = %view.path, engine = %view.engine, "rendering view");
        engine.render(&view.path, options).await
    }

    /// Renders the template `name` as an HTML response body.
    ///
    /// # Errors
    ///
    /// Returns a `ViewError`, which responds with 500.
    pub async fn render_html(
        &self,
        name: &str,
        options: &RenderOptions,
    ) -> Result<Html<String>, ViewError> {
        Ok(Html(self.render(name, options).await?))
    }
}

impl EngineHost for ViewRegistry {
    fn engines(&self) -> EngineTable {
        self.state.read().engines.clone()
    }

    fn replace_engines(&self, engines: EngineTable) {
        self.state.write().engines = engines;
    }

    fn register_engine(&self, name: &str, engine: SharedEngine) {
        self.state.write().engines.insert(name.to_string(), engine);
    }
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let mut engines: Vec<&String> = state.engines.keys().collect();
        engines.sort();
        f.debug_struct("ViewRegistry")
            .field("views_dir", &state.views_dir)
            .field("default_engine", &state.default_engine)
            .field("engines", &engines)
            .field("fallback", &state.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    /// Engine that records the paths it was asked to render.
    #[derive(Default)]
    struct Recording {
        paths: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RenderEngine for Recording {
        async fn render(&self, path: &str, options: &RenderOptions) -> RenderResult<String> {
            self.paths.lock().push(path.to_string());
            Ok(format!("hello {}", options.get_str("name").unwrap_or_default()))
        }
    }

    #[test]
    fn test_resolve_appends_default_extension() {
        let views = ViewRegistry::new("/srv/app/views").with_default_engine(".jade");

        assert_eq!(
            views.resolve("user").unwrap(),
            ResolvedView {
                path: "/srv/app/views/user.jade".to_string(),
                engine: "jade".to_string(),
            }
        );
        assert_eq!(views.resolve("admin/index.ejs").unwrap().engine, "ejs");
    }

    #[test]
    fn test_resolve_without_default_engine() {
        let views = ViewRegistry::new("/srv/app/views");
        assert_eq!(
            views.resolve("user").unwrap_err(),
            RenderError::NoDefaultEngine("user".to_string())
        );
    }

    #[tokio::test]
    async fn test_render_uses_registered_engine() {
        let engine = Recording::default();
        let paths = Arc::clone(&engine.paths);
        let views = ViewRegistry::new("/srv/app/views")
            .with_default_engine("jade")
            .with_engine("jade", engine);

        let output = views
            .render("user", &RenderOptions::new().with("name", "tj"))
            .await
            .unwrap();

        assert_eq!(output, "hello tj");
        assert_eq!(*paths.lock(), vec!["/srv/app/views/user.jade".to_string()]);
    }

    #[tokio::test]
    async fn test_unregistered_engine_falls_back_to_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("user.jade"), "p user").unwrap();
        let views = ViewRegistry::new(dir.path()).with_default_engine("jade");

        let output = views.render("user", &RenderOptions::new()).await.unwrap();

        assert_eq!(output, "p user");
    }

    #[tokio::test]
    async fn test_without_fallback_reports_missing_engine() {
        let views = ViewRegistry::new("/srv/app/views").without_fallback();

        let err = views
            .render("user.jade", &RenderOptions::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            RenderError::EngineNotFound {
                engine: "jade".to_string(),
                template: "user.jade".to_string(),
            }
        );
    }

    #[test]
    fn test_engine_host_table_operations() {
        let views = ViewRegistry::new("/views").with_engine("jade", Recording::default());
        assert!(views.engine("jade").is_some());

        let snapshot = views.engines();
        views.register_engine("ejs", Arc::new(Recording::default()));
        assert_eq!(views.engines().len(), 2);

        views.replace_engines(snapshot);
        assert!(views.engine("ejs").is_none());
        assert!(views.engine("jade").is_some());
    }

    #[test]
    fn test_clones_share_the_table() {
        let views = ViewRegistry::new("/views");
        let handle = views.clone();
        handle.register_engine("jade", Arc::new(Recording::default()));
        assert!(views.engine("jade").is_some());
        assert!(format!("{views:?}").contains("jade"));
    }

    #[test]
    fn test_view_error_responds_with_500() {
        let response = ViewError(RenderError::Engine("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
