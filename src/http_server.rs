use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::check::{DomainChecker, report::Report};

/// HTTP API for domain checks
pub struct HttpServer {
    checker: Arc<DomainChecker>,
    bind_addr: SocketAddr,
}

impl HttpServer {
    pub fn new(checker: Arc<DomainChecker>, bind_addr: SocketAddr) -> Self {
        Self { checker, bind_addr }
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(self.checker);

        info!("Starting HTTP server on {}", self.bind_addr);
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;

        let shutdown_signal = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    checker: Arc<DomainChecker>,
}

pub fn router(checker: Arc<DomainChecker>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/domain/{domain}", get(check_by_path))
        .route("/v1/domain", post(check_by_form))
        .with_state(AppState { checker })
        .layer(CorsLayer::permissive())
}

#[derive(Debug, Deserialize)]
struct NameserverParam {
    nameserver: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckForm {
    #[serde(default)]
    domain: String,
    nameserver: Option<String>,
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}

async fn check_by_path(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Query(params): Query<NameserverParam>,
) -> Json<Report> {
    run_check(&state, &domain, params.nameserver.as_deref()).await
}

async fn check_by_form(State(state): State<AppState>, Form(form): Form<CheckForm>) -> Json<Report> {
    run_check(&state, &form.domain, form.nameserver.as_deref()).await
}

/// Failed checks still answer 200; the outcome lives in `question.status`.
async fn run_check(state: &AppState, domain: &str, nameserver: Option<&str>) -> Json<Report> {
    debug!("Check requested for {} (nameserver {:?})", domain, nameserver);
    match state.checker.check_domain(domain, nameserver).await {
        Ok(report) => Json(report),
        Err(failure) => Json(*failure.report),
    }
}
