//! API server setup and configuration.

use std::net::{IpAddr, SocketAddr};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{AppConfig, LangIdError, Result};

use super::{
    handlers::{
        api_identify_handler, health_handler, identify_handler, identify_notice_handler, info_handler,
        upload_form_handler,
    },
    types::ApiState,
};

/// Comma-separated list of allowed CORS origins. Unset means any origin.
pub const CORS_ORIGINS_ENV: &str = "OCR_LANGID_CORS_ORIGINS";

fn cors_layer() -> CorsLayer {
    let Ok(origins_str) = std::env::var(CORS_ORIGINS_ENV) else {
        tracing::debug!("CORS allows all origins; set {} to restrict", CORS_ORIGINS_ENV);
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    };

    let origins: Vec<_> = origins_str
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "{} set but empty/invalid - falling back to permissive CORS",
            CORS_ORIGINS_ENV
        );
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    tracing::info!("CORS configured with {} explicit allowed origin(s)", origins.len());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the router with Tesseract and the configured model artifacts.
///
/// # Examples
///
/// ```no_run
/// use ocr_langid::{AppConfig, api::create_router};
///
/// let router = create_router(AppConfig::default());
/// let app = axum::Router::new().nest("/ocr", router);
/// ```
pub fn create_router(config: AppConfig) -> Router {
    create_router_with_state(ApiState::new(config))
}

/// Create the router around an existing state, e.g. one with stub backends.
pub fn create_router_with_state(state: ApiState) -> Router {
    let max_body = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(upload_form_handler))
        .route("/identify", get(identify_notice_handler).post(identify_handler))
        .route("/api/identify", post(api_identify_handler))
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server with an explicit configuration.
///
/// Binds to `config.server.host:config.server.port` and runs until Ctrl-C.
///
/// # Examples
///
/// ```no_run
/// use ocr_langid::{AppConfig, api::serve};
///
/// #[tokio::main]
/// async fn main() -> ocr_langid::Result<()> {
///     let config = AppConfig::from_toml_file("ocr-langid.toml")?;
///     serve(config).await
/// }
/// ```
pub async fn serve(config: AppConfig) -> Result<()> {
    config.validate()?;

    let ip: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| LangIdError::validation(format!("Invalid host address: {}", e)))?;
    let addr = SocketAddr::new(ip, config.server.port);

    if !config.models.model_path.is_file() || !config.models.vectorizer_path.is_file() {
        tracing::warn!(
            model = %config.models.model_path.display(),
            vectorizer = %config.models.vectorizer_path.display(),
            "classifier artifacts not found; /identify will return 500 until they exist"
        );
    }

    tracing::info!(
        ocr_language = %config.ocr.language,
        max_upload_bytes = config.server.max_upload_bytes,
        "Starting ocr-langid server on http://{}",
        addr
    );

    let app = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(LangIdError::Io)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LangIdError::Other(e.to_string()))?;

    tracing::info!("server stopped");
    Ok(())
}

/// Start the server with a discovered `ocr-langid.toml` (or defaults), then
/// environment overrides.
pub async fn serve_default() -> Result<()> {
    let mut config = match AppConfig::discover()? {
        Some(config) => {
            tracing::info!("Loaded configuration from discovered file");
            config
        }
        None => {
            tracing::info!("No config file found, using default configuration");
            AppConfig::default()
        }
    };
    config.apply_env_overrides();
    serve(config).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
