//! HTTP API Server
//!
//! Exposes the transformation pipeline as a local HTTP API. One quota
//! unit is consumed per request before the pipeline runs; successful
//! results are persisted fire-and-forget.
//!
//! Compatibility note: every response is HTTP 200, failures carry an
//! `error` key in the body. The existing web client depends on this.

use anyhow::Result;
use axum::{
    extract::{ConnectInfo, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use colored::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::prompt::{Perspective, RelationshipContext, TransformRequest};
use crate::quota::QuotaStore;
use crate::store::{MessageRecord, MessageStore};
use crate::transform::Transformer;

pub struct AppState {
    pub transformer: Transformer,
    pub quota: QuotaStore,
    pub store: Arc<dyn MessageStore>,
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct TransformHttpRequest {
    pub input: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub perspective: Option<String>,
}

const QUOTA_MESSAGE: &str = "Dein Tageskontingent ist aufgebraucht. Bitte versuche es morgen wieder.";

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "gfkcoach",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn transform_handler(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(body): Json<TransformHttpRequest>,
) -> Json<Value> {
    let source = addr.ip().to_string();

    if !state.quota.try_consume(&source).await {
        eprintln!("{}", format!("🚫 Quota exhausted for {}", source).yellow());
        return Json(json!({ "error": QUOTA_MESSAGE }));
    }

    let request = TransformRequest {
        input_text: body.input,
        relationship_context: RelationshipContext::from_key(
            body.context.as_deref().unwrap_or("general"),
        ),
        perspective: Perspective::from_key(body.perspective.as_deref().unwrap_or("sender")),
    };

    match state.transformer.transform(&request).await {
        Ok(result) => {
            let record = MessageRecord::new(&source, &request.input_text, result.clone());
            let store = state.store.clone();
            tokio::spawn(async move {
                if let Err(e) = store.record(&record).await {
                    eprintln!("Failed to persist message: {}", e);
                }
            });

            Json(serde_json::to_value(&result).unwrap_or_default())
        }
        Err(err) => {
            // Full detail stays server-side, the client gets the generic message.
            eprintln!("{}", format!("❌ Transformation failed: {}", err).red());
            Json(json!({ "error": err.user_message() }))
        }
    }
}

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/transform", post(transform_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(state: SharedState, port: u16) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    println!(
        "🌐 GFKCoach API listening on http://127.0.0.1:{}",
        port
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
