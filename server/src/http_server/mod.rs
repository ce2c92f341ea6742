use std::net::SocketAddr;

use axum::{response::Response, Router};
use color_eyre::eyre::WrapErr;
use tokio::net::TcpListener;
use tower_cookies::CookieManagerLayer;

use crate::AppState;
use errors::ServerError;

pub(crate) mod cmd;

pub(crate) mod pages {
    pub mod admin;
    pub mod categories;
    pub mod comments;
    pub mod home;
    pub mod login;
    pub mod planner;
    pub mod recipes;
}

pub(crate) mod cookies;
pub(crate) mod current_user;
pub mod errors;
pub(crate) mod flash;
pub(crate) mod forms;
pub(crate) mod routes;
pub(crate) mod session;
mod templates;
mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

type ResponseResult<T = Response> = Result<T, ServerError>;

pub(crate) fn build_app(app_state: AppState) -> Router {
    let tracer = trace::Tracer;
    let trace_layer = tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tracer)
        .on_response(tracer);

    routes::make_router()
        .with_state(app_state)
        .layer(trace_layer)
        .layer(CookieManagerLayer::new())
}

pub(crate) async fn run_server(app_state: AppState) -> color_eyre::Result<()> {
    let app = build_app(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let port: u16 = port.parse().wrap_err("PORT must be a number")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Starting server on port {}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err("Failed to open port")?;

    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to run server")
}
