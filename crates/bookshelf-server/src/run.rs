use crate::config::ServerConfig;
use crate::error::Result;
use axum::http::{HeaderValue, StatusCode};
use axum::{response::IntoResponse, routing::get, Json, Router};
use bookshelf_app::state::{AppConfig, AppState};
use futures::FutureExt;
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let mut app = main_router(state);

    if !args.no_cors {
        let origin = HeaderValue::from_str(&args.cors_origin)?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        );
    }

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    debug!("Server stopped");
    Ok(())
}

#[cfg(feature = "openapi")]
fn api_docs() -> utoipa::openapi::OpenApi {
    #[derive(utoipa::OpenApi)]
    #[openapi(info(title = "Bookshelf API"))]
    struct OpenApi;

    use utoipa::OpenApi as _;
    OpenApi::openapi().nest("/api/books", bookshelf_app::rest_api::book::api_docs())
}

pub fn main_router(state: AppState) -> Router<()> {
    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/books", bookshelf_app::rest_api::book::router())
        .with_state(state)
        .route("/", get(root))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http());

    #[cfg(feature = "openapi")]
    {
        let docs = api_docs();
        router = router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs),
        );
    }
    router
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Bookshelf API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": "SQLite",
    }))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    if config.uses_default_database() {
        let data_dir = config.data_dir();
        if !data_dir.is_dir() {
            tokio::fs::create_dir_all(&data_dir).await?;
            info!("Created data directory {data_dir:?}");
        }
    }

    let pool = bookshelf_dal::new_pool(&config.database_url()).await?;
    bookshelf_dal::migrate(&pool).await?;
    info!("Database ready");

    let app_config: AppConfig = config.into();
    Ok(AppState::new(app_config, pool))
}
