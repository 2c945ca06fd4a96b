use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::Response};

use super::{Ids, Listing};
use crate::{
    AppState,
    codec::Reply,
    error::AppError,
    models::MovieDraft,
    negotiate::Negotiated,
    patch::MoviePatch,
    view::View,
};

pub async fn list(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Listing(search): Listing,
) -> Response {
    let result = async {
        let movies = state.catalog.search_movies(&search).await?;
        Ok::<_, AppError>(Reply::ok(View::Public.render_all(&movies)))
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
        let movie = state.catalog.find_movie(id).await?.ok_or(AppError::NotFound)?;
        Ok::<_, AppError>(Reply::ok(View::Public.render(&movie)))
    }
    .await;

    neg.respond(result)
}

pub async fn create(State(state): State<Arc<AppState>>, neg: Negotiated, body: Bytes) -> Response {
    let result = async {
        let patch = MoviePatch::from_payload(neg.decode(&body)?)?;
        let mut draft = MovieDraft::default();
        patch.apply(&mut draft);

        let movie = state.catalog.insert_movie(draft.validate()?).await?;
        Ok::<_, AppError>(Reply::created(View::Public.render(&movie)))
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
        let existing = state.catalog.find_movie(id).await?.ok_or(AppError::NotFound)?;

        let patch = MoviePatch::from_payload(neg.decode(&body)?)?;
        let mut draft = MovieDraft::from(&existing);
        patch.apply(&mut draft);

        let movie = state.catalog.update_movie(id, draft.validate()?).await?;
        Ok::<_, AppError>(Reply::ok(View::Public.render(&movie)))
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
        if !state.catalog.delete_movie(id).await? {
            return Err(AppError::NotFound);
        }
        Ok::<_, AppError>(Reply::no_content())
    }
    .await;

    neg.respond(result)
}

pub async fn attach_category(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Ids((id, category_id)): Ids<(i32, i32)>,
) -> Response {
    let result = async {
        state.catalog.find_movie(id).await?.ok_or(AppError::NotFound)?;
        state.catalog.find_category(category_id).await?.ok_or(AppError::NotFound)?;

        let movie = state.catalog.attach_category(id, category_id).await?;
        Ok::<_, AppError>(Reply::created(View::Public.render(&movie)))
    }
    .await;

    neg.respond(result)
}

pub async fn detach_category(
    State(state): State<Arc<AppState>>,
    neg: Negotiated,
    Ids((id, category_id)): Ids<(i32, i32)>,
) -> Response {
    let result = async {
        state.catalog.find_movie(id).await?.ok_or(AppError::NotFound)?;
        state.catalog.find_category(category_id).await?.ok_or(AppError::NotFound)?;

        let movie = state.catalog.detach_category(id, category_id).await?;
        Ok::<_, AppError>(Reply::ok(View::Public.render(&movie)))
    }
    .await;

    neg.respond(result)
}
