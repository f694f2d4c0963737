//! Read-only HTTP projection of a loaded catalogue.
//!
//! Two endpoints, both GET: `/sources` (optionally filtered by `?scope=`)
//! and `/topics`. There are no mutation endpoints; revalidation means
//! reloading the catalogue and restarting the service.

use crate::catalogue::{Catalogue, DataProducer, Scope};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Build the router over a shared catalogue.
pub fn router(catalogue: Arc<Catalogue>) -> Router {
    Router::new()
        .route("/sources", get(list_sources))
        .route("/topics", get(list_topics))
        .with_state(catalogue)
}

/// Bind `addr` and serve the catalogue until the process stops.
pub async fn serve(addr: SocketAddr, catalogue: Arc<Catalogue>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "serving catalogue");
    axum::serve(listener, router(catalogue)).await
}

#[derive(Deserialize)]
struct SourceFilter {
    scope: Option<Scope>,
}

async fn list_sources(
    State(catalogue): State<Arc<Catalogue>>,
    Query(filter): Query<SourceFilter>,
) -> Json<Vec<DataProducer>> {
    let sources = match filter.scope {
        Some(scope) => catalogue
            .list_sources(scope)
            .into_iter()
            .cloned()
            .collect(),
        None => catalogue.sources().cloned().collect(),
    };
    Json(sources)
}

async fn list_topics(State(catalogue): State<Arc<Catalogue>>) -> Json<Vec<String>> {
    Json(catalogue.all_topic_names().iter().cloned().collect())
}
