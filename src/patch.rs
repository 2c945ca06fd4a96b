//! Typed field patches built from a decoded payload.
//!
//! A patch carries only the fields present in the payload; applying it to a
//! draft leaves every other field untouched. Unknown keys and values of the
//! wrong shape are rejected before anything is applied.

use jiff::{Timestamp, civil, tz::TimeZone};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    models::{CategoryDraft, MovieDraft},
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub released_at: Option<Option<civil::DateTime>>,
    pub rating: Option<Option<i64>>,
}

impl MoviePatch {
    pub fn from_payload(payload: Map<String, Value>) -> AppResult<Self> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "title" => patch.title = Some(text(&key, value)?),
                "description" => patch.description = Some(text(&key, value)?),
                "releasedAt" => patch.released_at = Some(date_time(&key, value)?),
                "rating" => patch.rating = Some(integer(&key, value)?),
                _ => return Err(AppError::UnknownField(key)),
            }
        }
        Ok(patch)
    }

    pub fn apply(self, draft: &mut MovieDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(released_at) = self.released_at {
            draft.released_at = released_at;
        }
        if let Some(rating) = self.rating {
            draft.rating = rating;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryPatch {
    pub title: Option<String>,
}

impl CategoryPatch {
    pub fn from_payload(payload: Map<String, Value>) -> AppResult<Self> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "title" => patch.title = Some(text(&key, value)?),
                _ => return Err(AppError::UnknownField(key)),
            }
        }
        Ok(patch)
    }

    pub fn apply(self, draft: &mut CategoryDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// null is kept as an empty string so it surfaces as a blank-field violation
fn text(field: &str, value: Value) -> AppResult<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Err(AppError::InvalidField(format!(
            "The \"{field}\" field must be a string, {} given.",
            kind(&other)
        ))),
    }
}

fn integer(field: &str, value: Value) -> AppResult<Option<i64>> {
    let invalid = || AppError::InvalidField(format!("Wrong format, {field} has to be a number."));
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(invalid),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn date_time(field: &str, value: Value) -> AppResult<Option<civil::DateTime>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_date_time(s.trim()).map(Some).ok_or_else(|| {
            AppError::InvalidField(format!(
                "The \"{field}\" field must be a valid date-time, \"{s}\" given."
            ))
        }),
        other => Err(AppError::InvalidField(format!(
            "The \"{field}\" field must be a date-time string, {} given.",
            kind(&other)
        ))),
    }
}

/// Accepts civil dates, civil date-times and RFC 3339 timestamps (taken as UTC).
pub fn parse_date_time(input: &str) -> Option<civil::DateTime> {
    // civil parsing would silently drop an offset, so timestamps go first
    if let Ok(ts) = input.parse::<Timestamp>() {
        return Some(ts.to_zoned(TimeZone::UTC).datetime());
    }
    if let Ok(dt) = input.parse::<civil::DateTime>() {
        return Some(dt);
    }
    input.parse::<civil::Date>().ok().map(|date| date.to_datetime(civil::Time::midnight()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn absent_fields_stay_untouched() {
        let mut draft = MovieDraft {
            title: "Old".to_string(),
            description: "Keep me".to_string(),
            released_at: parse_date_time("2001-01-01"),
            rating: Some(2),
        };
        MoviePatch::from_payload(payload(json!({ "title": "New" }))).unwrap().apply(&mut draft);

        assert_eq!(draft.title, "New");
        assert_eq!(draft.description, "Keep me");
        assert_eq!(draft.rating, Some(2));
        assert_eq!(draft.released_at, parse_date_time("2001-01-01"));
    }

    #[test]
    fn null_rating_clears_it() {
        let mut draft = MovieDraft { rating: Some(4), ..MovieDraft::default() };
        MoviePatch::from_payload(payload(json!({ "rating": null }))).unwrap().apply(&mut draft);
        assert_eq!(draft.rating, None);
    }

    #[test]
    fn numeric_strings_are_ratings() {
        let patch = MoviePatch::from_payload(payload(json!({ "rating": " 3 " }))).unwrap();
        assert_eq!(patch.rating, Some(Some(3)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = MoviePatch::from_payload(payload(json!({ "title": "x", "budget": 1 }))).unwrap_err();
        assert!(matches!(err, AppError::UnknownField(ref key) if key == "budget"));

        let err = CategoryPatch::from_payload(payload(json!({ "id": 4 }))).unwrap_err();
        assert!(matches!(err, AppError::UnknownField(ref key) if key == "id"));
    }

    #[test]
    fn type_mismatches_are_invalid_fields() {
        let err = MoviePatch::from_payload(payload(json!({ "title": 12 }))).unwrap_err();
        match err {
            AppError::InvalidField(message) => assert!(message.contains("\"title\"")),
            other => panic!("unexpected error {other:?}"),
        }

        for rating in [json!(2.5), json!("five"), json!(true)] {
            let err = MoviePatch::from_payload(payload(json!({ "rating": rating }))).unwrap_err();
            assert!(matches!(err, AppError::InvalidField(_)));
        }

        let err = MoviePatch::from_payload(payload(json!({ "releasedAt": "someday" }))).unwrap_err();
        assert!(matches!(err, AppError::InvalidField(_)));
    }

    #[test]
    fn null_title_becomes_blank() {
        let patch = CategoryPatch::from_payload(payload(json!({ "title": null }))).unwrap();
        assert_eq!(patch.title.as_deref(), Some(""));
    }

    #[test]
    fn date_time_formats() {
        let midnight = "2024-01-01T00:00:00";
        assert_eq!(parse_date_time("2024-01-01").unwrap().to_string(), midnight);
        assert_eq!(parse_date_time("2024-01-01T00:00:00").unwrap().to_string(), midnight);
        assert_eq!(parse_date_time("2024-01-01 13:45:00").unwrap().to_string(), "2024-01-01T13:45:00");
        assert_eq!(parse_date_time("2024-01-01T02:00:00+02:00").unwrap().to_string(), midnight);
        assert!(parse_date_time("01/01/2024").is_none());
    }
}
