use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockdx_core::config::DisplayConfig;
use stockdx_core::diagnosis::{self, DiagnoseError, Diagnosis};
use stockdx_core::domain::recommendation::RuleSet;
use stockdx_core::domain::symbol::SymbolQuery;
use stockdx_core::ingest::provider::MarketDataProvider;
use stockdx_core::ingest::yahoo::YahooClient;
use stockdx_core::time::lookback::LookbackWindow;

mod chart;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockdx_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let display = settings.display_config()?;
    let provider = YahooClient::from_settings(&settings)?;

    let state = AppState {
        provider: Arc::new(provider),
        display: Arc::new(display),
        rules: settings.rules(),
        window: LookbackWindow::default(),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, trend_verdict = settings.trend_verdict, "web listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/diagnose", get(diagnose_page))
        .route("/api/diagnose", get(diagnose_json))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn MarketDataProvider>,
    display: Arc<DisplayConfig>,
    rules: RuleSet,
    window: LookbackWindow,
}

#[derive(Debug, Deserialize)]
struct DiagnoseParams {
    code: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render::page(&state.display, None, None))
}

async fn diagnose_page(
    State(state): State<AppState>,
    Query(params): Query<DiagnoseParams>,
) -> Html<String> {
    let input = params.code.unwrap_or_default();

    // A blank submission shows the form again without running anything.
    let Some(query) = SymbolQuery::parse(&input) else {
        return Html(render::page(&state.display, Some(&input), None));
    };

    let outcome = run_diagnosis(&state, &query).await;
    Html(render::page(&state.display, Some(&input), Some(&outcome)))
}

async fn diagnose_json(
    State(state): State<AppState>,
    Query(params): Query<DiagnoseParams>,
) -> Result<Json<Diagnosis>, (StatusCode, Json<ApiError>)> {
    let Some(query) = params.code.as_deref().and_then(SymbolQuery::parse) else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "query parameter `code` is required".to_string(),
            }),
        ));
    };

    run_diagnosis(&state, &query).await.map(Json).map_err(|err| {
        let status = match &err {
            DiagnoseError::NoData { .. } => StatusCode::NOT_FOUND,
            DiagnoseError::InsufficientHistory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            DiagnoseError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ApiError {
                error: err.user_message(),
            }),
        )
    })
}

async fn run_diagnosis(state: &AppState, query: &SymbolQuery) -> Result<Diagnosis, DiagnoseError> {
    let res = diagnosis::diagnose(state.provider.as_ref(), query, state.rules, state.window).await;

    match &res {
        Ok(_) => {}
        Err(DiagnoseError::Unexpected(err)) => {
            sentry_anyhow::capture_anyhow(err);
            tracing::error!(code = %query.code(), error = %format!("{err:#}"), "diagnosis failed");
        }
        Err(err) => {
            tracing::warn!(code = %query.code(), error = %err, "diagnosis produced no report");
        }
    }
    res
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockdx_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
