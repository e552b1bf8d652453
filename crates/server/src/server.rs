use axum::{
    Router,
    routing::{get, patch, post},
};

use std::sync::Arc;

use crate::{events, expenses, export, groups, invites, members};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/groups", post(groups::create))
        .route("/groups/{id}", get(groups::get).delete(groups::delete))
        .route("/groups/{id}/settlement", get(groups::settlement))
        .route("/groups/{id}/export", get(export::csv))
        .route("/groups/{id}/events", get(events::subscribe))
        .route("/groups/{id}/members", post(members::add))
        .route("/groups/{id}/members/{member_id}", patch(members::update))
        .route(
            "/groups/{id}/members/{member_id}/removal",
            get(members::removal),
        )
        .route(
            "/groups/{id}/members/{member_id}/remove",
            post(members::remove),
        )
        .route("/groups/{id}/expenses", post(expenses::add))
        .route(
            "/groups/{id}/expenses/{expense_id}",
            patch(expenses::update).delete(expenses::delete),
        )
        .route("/groups/{id}/invite", patch(invites::update_policy))
        .route("/invite/{code}", get(invites::preview))
        .route("/invite/{code}/join", post(invites::join))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
