pub mod codec;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod negotiate;
pub mod patch;
pub mod routes;
pub mod store;
pub mod view;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, store::Catalog};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Catalog,
}

pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_body_bytes;

    routes::router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
