use jiff::civil::DateTime;
use serde::Serialize;

use crate::{
    entities::{category, movie},
    error::{AppError, AppResult, Violation},
};

pub const TITLE_MAX_CHARS: usize = 128;
pub const DESCRIPTION_MAX_CHARS: usize = 2048;
pub const RATING_RANGE: std::ops::RangeInclusive<i64> = 0..=5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Category {
    pub id: i32,
    pub title: String,
}

impl From<category::Model> for Category {
    fn from(model: category::Model) -> Self {
        Self { id: model.id, title: model.title }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub released_at: DateTime,
    pub rating: Option<i32>,
    pub categories: Vec<Category>,
}

impl Movie {
    pub fn from_model(model: movie::Model, categories: Vec<category::Model>) -> AppResult<Self> {
        let released_at = model.released_at.parse::<DateTime>().map_err(|err| {
            anyhow::anyhow!("movie {} has unreadable release date {:?}: {err}", model.id, model.released_at)
        })?;

        let mut categories: Vec<Category> = categories.into_iter().map(Category::from).collect();
        categories.sort_by_key(|c| c.id);

        Ok(Self {
            id: model.id,
            title: model.title,
            description: model.description,
            released_at,
            rating: model.rating,
            categories,
        })
    }
}

/// Movie fields before they are known to be valid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieDraft {
    pub title: String,
    pub description: String,
    pub released_at: Option<DateTime>,
    pub rating: Option<i64>,
}

impl From<&Movie> for MovieDraft {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            description: movie.description.clone(),
            released_at: Some(movie.released_at),
            rating: movie.rating.map(i64::from),
        }
    }
}

impl MovieDraft {
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        check_text(&mut out, "title", "Title", &self.title, TITLE_MAX_CHARS);
        check_text(&mut out, "description", "Description", &self.description, DESCRIPTION_MAX_CHARS);

        if self.released_at.is_none() {
            out.push(Violation::new("releasedAt", "Released date cannot be empty."));
        }

        if let Some(rating) = self.rating {
            if !RATING_RANGE.contains(&rating) {
                out.push(Violation::new("rating", "Rating has to be between 0 and 5."));
            }
        }

        out
    }

    pub fn validate(self) -> AppResult<ValidMovie> {
        let violations = self.violations();
        match self.released_at {
            Some(released_at) if violations.is_empty() => Ok(ValidMovie {
                title: self.title,
                description: self.description,
                released_at,
                rating: self.rating.and_then(|r| i32::try_from(r).ok()),
            }),
            _ => Err(AppError::ValidationFailed(violations)),
        }
    }
}

/// A movie that passed validation and may be written.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidMovie {
    pub title: String,
    pub description: String,
    pub released_at: DateTime,
    pub rating: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryDraft {
    pub title: String,
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self { title: category.title.clone() }
    }
}

impl CategoryDraft {
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_text(&mut out, "title", "Title", &self.title, TITLE_MAX_CHARS);
        out
    }

    pub fn validate(self) -> AppResult<ValidCategory> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(AppError::ValidationFailed(violations));
        }
        Ok(ValidCategory { title: self.title })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidCategory {
    pub title: String,
}

fn check_text(out: &mut Vec<Violation>, field: &'static str, label: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        out.push(Violation::new(field, format!("{label} cannot be empty.")));
    } else if value.chars().count() > max {
        out.push(Violation::new(field, format!("{label} cannot have more than {max} characters.")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> MovieDraft {
        MovieDraft {
            title: "Alien".to_string(),
            description: "In space no one can hear you scream.".to_string(),
            released_at: Some("1979-05-25T00:00:00".parse().unwrap()),
            rating: Some(5),
        }
    }

    fn fields(violations: &[Violation]) -> Vec<&'static str> {
        violations.iter().map(|v| v.field).collect()
    }

    #[test]
    fn valid_draft_has_no_violations() {
        assert!(draft().violations().is_empty());
        let valid = draft().validate().unwrap();
        assert_eq!(valid.rating, Some(5));
    }

    #[test]
    fn blank_fields_are_reported_in_field_order() {
        let draft = MovieDraft { rating: Some(9), ..MovieDraft::default() };
        let violations = draft.violations();
        assert_eq!(fields(&violations), ["title", "description", "releasedAt", "rating"]);
        assert_eq!(violations[0].message, "Title cannot be empty.");
        assert_eq!(violations[3].message, "Rating has to be between 0 and 5.");
    }

    #[test]
    fn whitespace_title_counts_as_empty() {
        let draft = MovieDraft { title: "   ".to_string(), ..draft() };
        assert_eq!(fields(&draft.violations()), ["title"]);
    }

    #[test]
    fn length_is_counted_in_characters() {
        let at_limit = MovieDraft { title: "é".repeat(TITLE_MAX_CHARS), ..draft() };
        assert!(at_limit.violations().is_empty());

        let over = MovieDraft { title: "a".repeat(TITLE_MAX_CHARS + 1), ..draft() };
        let violations = over.violations();
        assert_eq!(violations[0].message, "Title cannot have more than 128 characters.");

        let long_description =
            MovieDraft { description: "d".repeat(DESCRIPTION_MAX_CHARS + 1), ..draft() };
        assert_eq!(fields(&long_description.violations()), ["description"]);
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for rating in [0, 5] {
            assert!(MovieDraft { rating: Some(rating), ..draft() }.violations().is_empty());
        }
        for rating in [-1, 6] {
            assert_eq!(fields(&MovieDraft { rating: Some(rating), ..draft() }.violations()), ["rating"]);
        }
        assert!(MovieDraft { rating: None, ..draft() }.violations().is_empty());
    }

    #[test]
    fn invalid_draft_fails_validation() {
        let err = CategoryDraft::default().validate().unwrap_err();
        match err {
            AppError::ValidationFailed(violations) => assert_eq!(fields(&violations), ["title"]),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn movie_is_built_from_stored_rows() {
        let row = movie::Model {
            id: 3,
            title: "Heat".to_string(),
            description: "LA crime saga".to_string(),
            released_at: "1995-12-15T00:00:00".to_string(),
            rating: None,
        };
        let categories = vec![
            category::Model { id: 9, title: "Thriller".to_string() },
            category::Model { id: 4, title: "Crime".to_string() },
        ];
        let movie = Movie::from_model(row, categories).unwrap();
        assert_eq!(movie.released_at.to_string(), "1995-12-15T00:00:00");
        assert_eq!(movie.categories.iter().map(|c| c.id).collect::<Vec<_>>(), [4, 9]);
    }
}
