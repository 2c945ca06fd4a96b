//! Named view profiles: which fields of an entity a response exposes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{Category, Movie};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resource {
    Movie,
    Category,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum View {
    #[default]
    Public,
    WithoutCategories,
}

/// An entity that can be rendered through a view.
pub trait Exposed: Serialize {
    const RESOURCE: Resource;
}

impl Exposed for Movie {
    const RESOURCE: Resource = Resource::Movie;
}

impl Exposed for Category {
    const RESOURCE: Resource = Resource::Category;
}

impl View {
    pub fn fields(self, resource: Resource) -> &'static [&'static str] {
        match (self, resource) {
            (View::Public, Resource::Movie) => {
                &["id", "title", "description", "releasedAt", "rating", "categories"]
            },
            (View::WithoutCategories, Resource::Movie) => {
                &["id", "title", "description", "releasedAt", "rating"]
            },
            (_, Resource::Category) => &["id", "title"],
        }
    }

    /// Nested fields and the resource their elements are rendered as.
    fn nested(resource: Resource) -> &'static [(&'static str, Resource)] {
        match resource {
            Resource::Movie => &[("categories", Resource::Category)],
            Resource::Category => &[],
        }
    }

    pub fn render<T: Exposed>(self, item: &T) -> Value {
        match serde_json::to_value(item) {
            Ok(value) => self.filter(T::RESOURCE, value),
            Err(err) => {
                tracing::error!(error = %err, "entity did not serialize");
                Value::Null
            },
        }
    }

    pub fn render_all<T: Exposed>(self, items: &[T]) -> Value {
        Value::Array(items.iter().map(|item| self.render(item)).collect())
    }

    fn filter(self, resource: Resource, value: Value) -> Value {
        let Value::Object(mut map) = value else {
            return value;
        };

        let allowed = self.fields(resource);
        let mut out = Map::new();
        for &field in allowed {
            let Some(child) = map.remove(field) else {
                continue;
            };
            let child = match Self::nested(resource).iter().find(|(name, _)| *name == field) {
                Some(&(_, inner)) => self.filter_each(inner, child),
                None => child,
            };
            out.insert(field.to_string(), child);
        }
        Value::Object(out)
    }

    fn filter_each(self, resource: Resource, value: Value) -> Value {
        match value {
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.filter(resource, item)).collect())
            },
            other => self.filter(resource, other),
        }
    }
}
