//! Read-only stats API: the regional vote tallies behind the public map.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use votepulse_common::Config;
use votepulse_store::{QueueStore, RedisQueue, VOTED_STATES_SET};

/// How many state entries the endpoint returns at most.
const STATE_STATS_LIMIT: usize = 200;

pub struct AppState {
    pub queue: Arc<dyn QueueStore>,
}

/// `GET /api/state-stats`: state code → vote count, highest first.
async fn api_state_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state
        .queue
        .top_scores(VOTED_STATES_SET, STATE_STATS_LIMIT)
        .await
    {
        Ok(scores) => Json(scores_to_object(scores)).into_response(),
        Err(e) => {
            warn!(error = %e, "State stats query failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn scores_to_object(scores: Vec<(String, i64)>) -> Value {
    let mut object = Map::new();
    for (member, count) in scores {
        object.insert(member, Value::from(count));
    }
    Value::Object(object)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("votepulse=info".parse()?))
        .init();

    let config = Config::web_from_env();

    let queue = Arc::new(RedisQueue::connect(&config.redis_url).await?);
    let state = Arc::new(AppState { queue });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/api/state-stats", get(api_state_stats))
        .with_state(state)
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("VotePulse API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
