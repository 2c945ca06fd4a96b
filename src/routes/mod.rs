pub mod category;
pub mod movie;

use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
    response::Response,
    routing::{get, post},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{AppState, error::AppError, negotiate::Negotiated, store::Search};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/category", get(category::list).post(category::create))
        .route(
            "/api/category/{id}",
            get(category::show).put(category::update).delete(category::remove),
        )
        .route("/api/category/{id}/movies", get(category::movies))
        .route("/api/movie", get(movie::list).post(movie::create))
        .route("/api/movie/{id}", get(movie::show).put(movie::update).delete(movie::remove))
        .route(
            "/api/movie/{id}/category/{category_id}",
            post(movie::attach_category).delete(movie::detach_category),
        )
        .fallback(not_found)
}

async fn not_found(neg: Negotiated) -> Response {
    neg.reject(AppError::NotFound)
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<u64>,
    size: Option<u64>,
    search: Option<String>,
}

/// Paging and search parameters of a list endpoint, already clamped.
#[derive(Debug)]
pub struct Listing(pub Search);

impl FromRequestParts<Arc<AppState>> for Listing {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Query(q) = Query::<ListQuery>::try_from_uri(&parts.uri).map_err(|err| {
            Negotiated::from_headers(&parts.headers).reject(AppError::MalformedQuery(err.body_text()))
        })?;

        let size = q.size.unwrap_or(state.config.default_page_size).min(state.config.max_page_size);
        Ok(Listing(Search::page(q.page.unwrap_or(1), size, q.search)))
    }
}

/// Path identifiers. A segment that is not a valid id cannot name an entity,
/// so it is answered like any other missing resource.
#[derive(Debug)]
pub struct Ids<T>(pub T);

impl<S, T> FromRequestParts<S> for Ids<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(ids)) => Ok(Ids(ids)),
            Err(err) => {
                debug!(path = %parts.uri.path(), error = %err, "unusable path id");
                Err(Negotiated::from_headers(&parts.headers).reject(AppError::NotFound))
            },
        }
    }
}
