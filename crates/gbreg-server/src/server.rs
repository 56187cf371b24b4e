//! Live registry site.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use gbreg_registry::{FetchError, Registry, RegistryClient, RegistryConfig, SearchHit, SearchIndex};
use gbreg_render::{
    AssetPipeline, DashboardPage, DetailPage, Format, HtmlMarkup, ListPage, NotFoundPage, Site,
    TemplateEngine, REGISTRY_TITLE,
};

/// Configuration for the live server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open browser on start
    pub open: bool,

    /// Site title
    pub title: String,

    /// Registry source and freshness window
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open: false,
            title: REGISTRY_TITLE.to_string(),
            registry: RegistryConfig::default(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Invalid Cache-Control value {0:?}")]
    CacheControl(String),

    #[error(transparent)]
    Client(#[from] FetchError),
}

/// Shared server state.
struct SiteState {
    client: RegistryClient,
    templates: TemplateEngine,
    site: Site,
}

impl SiteState {
    async fn registry(&self) -> Result<Registry, FetchError> {
        self.client.fetch().await
    }

    /// Failure response carrying the rendered error page.
    fn failure(&self, cause: impl Into<Failure>) -> PageError {
        PageError {
            cause: cause.into(),
            page: self.templates.render_error(&self.site).ok(),
        }
    }
}

/// Live registry server.
pub struct SiteServer {
    config: ServerConfig,
}

impl SiteServer {
    /// Create a new server.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Start serving until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| ServerError::InvalidAddress(address.clone()))?;

        let app = app(&self.config)?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Serving graph-break registry at http://{}", addr);
        tracing::info!("Registry source: {}", self.config.registry.url);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Could not open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Build the site router.
///
/// Every request fetches a fresh registry copy; freshness across requests
/// is left to intermediary caches via `Cache-Control`.
pub fn app(config: &ServerConfig) -> Result<Router, ServerError> {
    let cache_control = config.registry.cache_control();
    let cache_control = HeaderValue::from_str(&cache_control)
        .map_err(|_| ServerError::CacheControl(cache_control.clone()))?;

    let state = Arc::new(SiteState {
        client: RegistryClient::new(config.registry.clone())?,
        templates: TemplateEngine::new(),
        site: Site::live(config.title.clone()),
    });

    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/gb/{gbid}", get(detail_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/api/registry", get(api_registry_handler))
        .route("/api/search", get(api_search_handler))
        .route("/assets/style.css", get(stylesheet_handler))
        .with_state(state)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            cache_control,
        ))
        .layer(TraceLayer::new_for_http()))
}

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Listing page, filtered when `q` is present.
async fn index_handler(
    State(state): State<Arc<SiteState>>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, PageError> {
    let registry = state.registry().await.map_err(|e| state.failure(e))?;

    let hits = SearchIndex::build(&registry).search(&params.q);
    let page = ListPage::build(hits.iter().map(|hit| &hit.record), &state.site, &HtmlMarkup)
        .with_search(params.q);

    state
        .templates
        .render_list(Format::Html, &state.site, &page)
        .map(Html)
        .map_err(|e| state.failure(e))
}

/// Detail page for one GBID, matched case-insensitively.
async fn detail_handler(
    State(state): State<Arc<SiteState>>,
    Path(gbid): Path<String>,
) -> Result<Response, PageError> {
    let registry = state.registry().await.map_err(|e| state.failure(e))?;

    let rendered = match registry.current(&gbid) {
        Some(entry) => {
            let page = DetailPage::build(&gbid, entry, &HtmlMarkup);
            state
                .templates
                .render_detail(Format::Html, &state.site, &page)
                .map(|html| Html(html).into_response())
        }
        None => {
            tracing::debug!("No registry entry for {}", gbid);
            let page = NotFoundPage::new(&gbid);
            state
                .templates
                .render_not_found(&state.site, &page)
                .map(|html| (StatusCode::NOT_FOUND, Html(html)).into_response())
        }
    };

    rendered.map_err(|e| state.failure(e))
}

async fn dashboard_handler(
    State(state): State<Arc<SiteState>>,
) -> Result<Html<String>, PageError> {
    let registry = state.registry().await.map_err(|e| state.failure(e))?;
    let page = DashboardPage::from_registry(&registry);

    state
        .templates
        .render_dashboard(Format::Html, &state.site, &page)
        .map(Html)
        .map_err(|e| state.failure(e))
}

/// Raw registry document.
async fn api_registry_handler(
    State(state): State<Arc<SiteState>>,
) -> Result<Json<Registry>, ApiError> {
    Ok(Json(state.registry().await?))
}

/// Ranked search hits as JSON.
async fn api_search_handler(
    State(state): State<Arc<SiteState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let registry = state.registry().await?;
    Ok(Json(SearchIndex::build(&registry).search(&params.q)))
}

async fn stylesheet_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/css; charset=utf-8")],
        AssetPipeline::generate_css(),
    )
}

/// Why a page could not be served.
#[derive(Debug, thiserror::Error)]
enum Failure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// A page request that failed. The cause is logged, never shown.
struct PageError {
    cause: Failure,
    page: Option<String>,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.cause);

        let body = self
            .page
            .unwrap_or_else(|| String::from("<h1>Something went wrong</h1>"));

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CACHE_CONTROL, HeaderValue::from_static("no-store"))],
            Html(body),
        )
            .into_response()
    }
}

/// A JSON request that failed.
struct ApiError(FetchError);

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CACHE_CONTROL, HeaderValue::from_static("no-store"))],
            Json(serde_json::json!({ "error": "registry unavailable" })),
        )
            .into_response()
    }
}
