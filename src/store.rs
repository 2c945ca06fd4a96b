use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Unchanged},
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    sea_query::{Expr, IntoColumnRef, LikeExpr, OnConflict, SimpleExpr},
};
use tracing::debug;

use crate::{
    entities::{category, movie, movie_category},
    error::{AppError, AppResult},
    models::{Category, Movie, ValidCategory, ValidMovie},
};

/// One page of a listing, optionally narrowed by a search term.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Search {
    pub offset: u64,
    pub limit: u64,
    pub term: Option<String>,
}

/// SQLite binds LIMIT and OFFSET as signed 64-bit integers.
const MAX_ROWS: u64 = i64::MAX as u64;

impl Search {
    /// `page` is 1-based; page 0 is treated as page 1. Pages past the last
    /// representable offset are empty rather than an error.
    pub fn page(page: u64, size: u64, term: Option<String>) -> Self {
        let size = size.clamp(1, MAX_ROWS);
        let offset = size.checked_mul(page.max(1) - 1).map_or(MAX_ROWS, |o| o.min(MAX_ROWS));
        let term = term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        Self { offset, limit: size, term }
    }
}

const LIKE_ESCAPE: char = '\\';

/// `%term%` with the LIKE wildcards of `term` taken literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn contains(column: impl IntoColumnRef, pattern: &str) -> SimpleExpr {
    Expr::col(column).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn movie_matches(term: &str) -> Condition {
    let pattern = like_pattern(term);
    Condition::any()
        .add(contains((movie::Entity, movie::Column::Title), &pattern))
        .add(contains((movie::Entity, movie::Column::Description), &pattern))
        .add(contains((movie::Entity, movie::Column::ReleasedAt), &pattern))
}

fn category_matches(term: &str) -> Condition {
    Condition::any().add(contains((category::Entity, category::Column::Title), &like_pattern(term)))
}

#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_categories(&self, rows: Vec<movie::Model>) -> AppResult<Vec<Movie>> {
        let categories =
            rows.load_many_to_many(category::Entity, movie_category::Entity, &self.db).await?;
        rows.into_iter()
            .zip(categories)
            .map(|(row, categories)| Movie::from_model(row, categories))
            .collect()
    }

    async fn page_movies(&self, query: Select<movie::Entity>, search: &Search) -> AppResult<Vec<Movie>> {
        let mut query = query;
        if let Some(term) = &search.term {
            query = query.filter(movie_matches(term));
        }
        let rows = query
            .order_by_asc(movie::Column::Id)
            .offset(search.offset)
            .limit(search.limit)
            .all(&self.db)
            .await?;
        debug!(rows = rows.len(), offset = search.offset, "movies page loaded");
        self.with_categories(rows).await
    }

    pub async fn search_movies(&self, search: &Search) -> AppResult<Vec<Movie>> {
        self.page_movies(movie::Entity::find(), search).await
    }

    pub async fn movies_in_category(&self, category: &Category, search: &Search) -> AppResult<Vec<Movie>> {
        let model = category::Model { id: category.id, title: category.title.clone() };
        self.page_movies(model.find_related(movie::Entity), search).await
    }

    pub async fn find_movie(&self, id: i32) -> AppResult<Option<Movie>> {
        let Some(row) = movie::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.with_categories(vec![row]).await?.pop())
    }

    async fn require_movie(&self, id: i32) -> AppResult<Movie> {
        self.find_movie(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn insert_movie(&self, movie: ValidMovie) -> AppResult<Movie> {
        let txn = self.db.begin().await?;
        let row = movie::ActiveModel {
            id: NotSet,
            title: Set(movie.title),
            description: Set(movie.description),
            released_at: Set(movie.released_at.to_string()),
            rating: Set(movie.rating),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        debug!(id = row.id, "movie inserted");
        Movie::from_model(row, Vec::new())
    }

    pub async fn update_movie(&self, id: i32, movie: ValidMovie) -> AppResult<Movie> {
        let txn = self.db.begin().await?;
        let updated = movie::ActiveModel {
            id: Unchanged(id),
            title: Set(movie.title),
            description: Set(movie.description),
            released_at: Set(movie.released_at.to_string()),
            rating: Set(movie.rating),
        }
        .update(&txn)
        .await;

        match updated {
            Ok(_) => txn.commit().await?,
            Err(DbErr::RecordNotUpdated) => return Err(AppError::NotFound),
            Err(err) => return Err(err.into()),
        }

        debug!(id, "movie updated");
        self.require_movie(id).await
    }

    /// Removes the movie and its category links. Returns `false` when absent.
    pub async fn delete_movie(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        movie_category::Entity::delete_many()
            .filter(movie_category::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        let result = movie::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }
        txn.commit().await?;

        debug!(id, "movie deleted");
        Ok(true)
    }

    pub async fn attach_category(&self, movie_id: i32, category_id: i32) -> AppResult<Movie> {
        let txn = self.db.begin().await?;
        let inserted = movie_category::Entity::insert(movie_category::ActiveModel {
            movie_id: Set(movie_id),
            category_id: Set(category_id),
        })
        .on_conflict(
            OnConflict::columns([movie_category::Column::MovieId, movie_category::Column::CategoryId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;
        txn.commit().await?;

        debug!(movie_id, category_id, already_linked = inserted == 0, "category attached");
        self.require_movie(movie_id).await
    }

    pub async fn detach_category(&self, movie_id: i32, category_id: i32) -> AppResult<Movie> {
        let txn = self.db.begin().await?;
        let result = movie_category::Entity::delete_many()
            .filter(movie_category::Column::MovieId.eq(movie_id))
            .filter(movie_category::Column::CategoryId.eq(category_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        debug!(movie_id, category_id, removed = result.rows_affected, "category detached");
        self.require_movie(movie_id).await
    }

    pub async fn search_categories(&self, search: &Search) -> AppResult<Vec<Category>> {
        let mut query = category::Entity::find();
        if let Some(term) = &search.term {
            query = query.filter(category_matches(term));
        }
        let rows = query
            .order_by_asc(category::Column::Id)
            .offset(search.offset)
            .limit(search.limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn find_category(&self, id: i32) -> AppResult<Option<Category>> {
        Ok(category::Entity::find_by_id(id).one(&self.db).await?.map(Category::from))
    }

    pub async fn insert_category(&self, category: ValidCategory) -> AppResult<Category> {
        let txn = self.db.begin().await?;
        let row = category::ActiveModel { id: NotSet, title: Set(category.title) }.insert(&txn).await?;
        txn.commit().await?;

        debug!(id = row.id, "category inserted");
        Ok(row.into())
    }

    pub async fn update_category(&self, id: i32, category: ValidCategory) -> AppResult<Category> {
        let txn = self.db.begin().await?;
        let updated =
            category::ActiveModel { id: Unchanged(id), title: Set(category.title) }.update(&txn).await;

        let row = match updated {
            Ok(row) => row,
            Err(DbErr::RecordNotUpdated) => return Err(AppError::NotFound),
            Err(err) => return Err(err.into()),
        };
        txn.commit().await?;

        debug!(id, "category updated");
        Ok(row.into())
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;
        movie_category::Entity::delete_many()
            .filter(movie_category::Column::CategoryId.eq(id))
            .exec(&txn)
            .await?;
        let result = category::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Ok(false);
        }
        txn.commit().await?;

        debug!(id, "category deleted");
        Ok(true)
    }

    pub async fn is_empty(&self) -> AppResult<bool> {
        let movies = movie::Entity::find().count(&self.db).await?;
        let categories = category::Entity::find().count(&self.db).await?;
        Ok(movies == 0 && categories == 0)
    }
}
