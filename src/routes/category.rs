use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::Response};

use super::{Ids, Listing};
use crate::{
    AppState,
    codec::Reply,
    error::AppError,
    models::CategoryDraft,
    negotiate::Negotiated,
    patch::CategoryPatch,
    view::View,
};

pub async fn list(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Listing(search): Listing,
) -> Response {
    let result = async {
        let categories = state.catalog.search_categories(&search).await?;
        Ok::<_, AppError>(Reply::ok(View::Public.render_all(&categories)))
    }
    .await;

    neg.respond(result)
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Ids(id): Ids<i32>,
) -> Response {
    let result = async {
        let category = state.catalog.find_category(id).await?.ok_or(AppError::NotFound)?;
        Ok::<_, AppError>(Reply::ok(View::Public.render(&category)))
    }
    .await;

    neg.respond(result)
}

pub async fn create(State(state): State<Arc<AppState>>, neg: Negotiated, body: Bytes) -> Response {
    let result = async {
        let patch = CategoryPatch::from_payload(neg.decode(&body)?)?;
        let mut draft = CategoryDraft::default();
        patch.apply(&mut draft);

        let category = state.catalog.insert_category(draft.validate()?).await?;
        Ok::<_, AppError>(Reply::created(View::Public.render(&category)))
    }
    .await;

    neg.respond(result)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Ids(id): Ids<i32>,
    body: Bytes,
) -> Response {
    let result = async {
        let existing = state.catalog.find_category(id).await?.ok_or(AppError::NotFound)?;

        let patch = CategoryPatch::from_payload(neg.decode(&body)?)?;
        let mut draft = CategoryDraft::from(&existing);
        patch.apply(&mut draft);

        let category = state.catalog.update_category(id, draft.validate()?).await?;
        Ok::<_, AppError>(Reply::ok(View::Public.render(&category)))
    }
    .await;

    neg.respond(result)
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Ids(id): Ids<i32>,
) -> Response {
    let result = async {
        if !state.catalog.delete_category(id).await? {
            return Err(AppError::NotFound);
        }
        Ok::<_, AppError>(Reply::no_content())
    }
    .await;

    neg.respond(result)
}

/// Movies linked to a category, without their own category lists.
pub async fn movies(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Ids(id): Ids<i32>,
    Listing(search): Listing,
) -> Response {
    let result = async {
        let category = state.catalog.find_category(id).await?.ok_or(AppError::NotFound)?;
        let movies = state.catalog.movies_in_category(&category, &search).await?;
        Ok::<_, AppError>(Reply::ok(View::WithoutCategories.render_all(&movies)))
    }
    .await;

    neg.respond(result)
}
