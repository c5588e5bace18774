/*
 * ASN Blocklist Generator
 * Copyright (C) 2025 Akaere Networks
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::core::asn::normalize;
use crate::core::error::BlocklistError;
use crate::core::pipeline::Pipeline;
use crate::core::stats::{StatsState, get_stats_response, record_failure, record_success};
use crate::{log_error, log_info};

#[derive(Debug, Deserialize)]
struct GenerateQuery {
    asn: Option<String>,
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
    stats: StatsState,
}

/// HTTP front end for the pipeline, bound to one listen address.
pub struct BlocklistServer {
    addr: String,
    state: AppState,
}

impl BlocklistServer {
    pub fn new(addr: impl Into<String>, pipeline: Arc<Pipeline>, stats: StatsState) -> Self {
        Self {
            addr: addr.into(),
            state: AppState { pipeline, stats },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/generate", get(generate_blocklist))
            .route("/api/stats", get(get_stats_api))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .context(format!("Failed to bind to {}", self.addr))?;

        log_info!("Listening for blocklist requests on {}", self.addr);
        axum::serve(listener, app).await.context("HTTP server terminated")?;
        Ok(())
    }
}

fn text_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

fn error_response(err: &BlocklistError) -> Response {
    match err {
        BlocklistError::InvalidAsn(_) => text_response(StatusCode::BAD_REQUEST, "Invalid ASN format\n".to_string()),
        BlocklistError::Network(e) => text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to fetch IPs: {}\n", e),
        ),
        BlocklistError::Cache(e) => text_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to read from cache: {}\n", e),
        ),
    }
}

// GET /generate?asn=AS13335
async fn generate_blocklist(State(state): State<AppState>, Query(params): Query<GenerateQuery>) -> Response {
    let raw = params.asn.as_deref().unwrap_or_default();
    if raw.is_empty() {
        record_failure(&state.stats, true).await;
        return text_response(StatusCode::BAD_REQUEST, "ASN parameter is missing\n".to_string());
    }

    match state.pipeline.generate(&normalize(raw)).await {
        Ok(blocklist) => {
            record_success(&state.stats, blocklist.provenance, blocklist.body.len()).await;
            let cache_status = if blocklist.provenance.is_cache_hit() { "HIT" } else { "MISS" };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain"), (HeaderName::from_static("x-cache"), cache_status)],
                blocklist.body,
            )
                .into_response()
        }
        Err(e) => {
            if e.is_client_error() {
                log_info!("Rejected ASN {:?}: {}", raw, e);
            } else {
                log_error!("Blocklist generation for {} failed: {}", raw, e);
            }
            record_failure(&state.stats, e.is_client_error()).await;
            error_response(&e)
        }
    }
}

async fn get_stats_api(State(state): State<AppState>) -> impl IntoResponse {
    Json(get_stats_response(&state.stats).await)
}
