use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub count: i64,
    pub color: Option<String>,
    pub description: Option<String>,
    pub featured: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields an operator supplies when creating a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub slug: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Editable fields of an existing tag. `slug: None` re-derives it from `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagUpdate {
    pub name: String,
    pub slug: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl Tag {
    pub fn new(new: NewTag) -> Self {
        let now = Utc::now().to_rfc3339();
        let name = new.name.trim().to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            slug: resolve_slug(&name, new.slug.as_deref()),
            name,
            count: 0,
            color: non_empty(new.color),
            description: non_empty(new.description),
            featured: new.featured,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Apply `update` in place and bump `updated_at`.
    pub fn apply(&mut self, update: TagUpdate) {
        self.name = update.name.trim().to_string();
        self.slug = resolve_slug(&self.name, update.slug.as_deref());
        self.color = non_empty(update.color);
        self.description = non_empty(update.description);
        self.featured = update.featured;
        self.updated_at = Utc::now().to_rfc3339();
    }
}

/// Lowercase `text` and collapse every run of non-alphanumerics into one `-`.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// An explicit, non-blank override wins; otherwise the slug follows the name.
pub fn resolve_slug(name: &str, explicit: Option<&str>) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Field-level checks shared by the HTML forms, the JSON API and the store.
pub fn validate_tag_fields(
    name: &str,
    slug: Option<&str>,
    color: Option<&str>,
    max_name_len: usize,
) -> HashMap<String, String> {
    let mut errors = HashMap::new();
    let name = name.trim();

    if name.is_empty() {
        errors.insert("name".to_string(), "Name is required".to_string());
    } else if name.chars().count() > max_name_len {
        errors.insert(
            "name".to_string(),
            format!("Name must be at most {max_name_len} characters"),
        );
    } else if resolve_slug(name, slug).is_empty() {
        errors.insert(
            "slug".to_string(),
            "Slug must contain at least one letter or digit".to_string(),
        );
    }

    if let Some(color) = color.map(str::trim).filter(|c| !c.is_empty()) {
        if !is_hex_color(color) {
            errors.insert(
                "color".to_string(),
                "Color must be a hex value like #3b82f6".to_string(),
            );
        }
    }

    errors
}
