use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::AuthOperator;
use crate::error::AppError;
use crate::models::tag::validate_tag_fields;
use crate::models::{NewTag, Operator, Tag, TagUpdate};
use crate::suggest::suggest_similar_tags;
use crate::AppState;

struct TagCloudItem {
    id: String,
    name: String,
    count: i64,
    featured: bool,
    font_size: String,
    color: String,
}

#[derive(Template)]
#[template(path = "tags/list.html")]
struct TagListTemplate {
    tags: Vec<TagCloudItem>,
    query: String,
    static_hash: &'static str,
    operator: Option<Operator>,
}

/// Values echoed back into the form, so a rejected submission keeps its input.
#[derive(Default)]
struct TagFormValues {
    name: String,
    slug: String,
    color: String,
    description: String,
    featured: bool,
}

impl From<&Tag> for TagFormValues {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            color: tag.color.clone().unwrap_or_default(),
            description: tag.description.clone().unwrap_or_default(),
            featured: tag.featured,
        }
    }
}

#[derive(Template)]
#[template(path = "tags/form.html")]
struct TagFormTemplate {
    tag: Option<Tag>,
    values: TagFormValues,
    errors: HashMap<String, String>,
    max_name_len: usize,
    static_hash: &'static str,
    operator: Option<Operator>,
}

#[derive(Template)]
#[template(path = "tags/suggestions.html")]
struct SuggestionsTemplate {
    suggestions: Vec<Tag>,
}

#[derive(Template)]
#[template(path = "tags/show.html")]
struct TagShowTemplate {
    tag: Tag,
    similar: Vec<Tag>,
    static_hash: &'static str,
    operator: Option<Operator>,
}

#[derive(Template)]
#[template(path = "tags/merge.html")]
struct TagMergeTemplate {
    target: Tag,
    similar: Vec<Tag>,
    others: Vec<Tag>,
    error: Option<String>,
    static_hash: &'static str,
    operator: Option<Operator>,
}

#[derive(Deserialize)]
pub struct TagForm {
    name: String,
    slug: Option<String>,
    color: Option<String>,
    description: Option<String>,
    featured: Option<String>,
}

impl TagForm {
    fn values(&self) -> TagFormValues {
        TagFormValues {
            name: self.name.clone(),
            slug: self.slug.clone().unwrap_or_default(),
            color: self.color.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            featured: self.featured.is_some(),
        }
    }

    fn into_new_tag(self) -> NewTag {
        NewTag {
            featured: self.featured.is_some(),
            name: self.name,
            slug: self.slug,
            color: self.color,
            description: self.description,
        }
    }

    fn into_update(self) -> TagUpdate {
        TagUpdate {
            featured: self.featured.is_some(),
            name: self.name,
            slug: self.slug,
            color: self.color,
            description: self.description,
        }
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    name: String,
    exclude: Option<String>,
}

fn build_tag_cloud(tags: Vec<Tag>) -> Vec<TagCloudItem> {
    if tags.is_empty() {
        return vec![];
    }

    // ln(1 + count) so unused tags still get a finite weight
    let weight = |count: i64| (count.max(0) as f64).ln_1p();
    let max_weight = tags.iter().map(|t| weight(t.count)).fold(0.0, f64::max);
    let min_weight = tags.iter().map(|t| weight(t.count)).fold(f64::INFINITY, f64::min);

    // Size range: 0.75rem to 2.5rem
    let min_size: f64 = 0.75;
    let max_size: f64 = 2.5;

    // HSL: hue 180 (teal) -> 260 (indigo), saturation 40-60%, lightness 70% -> 35%
    let min_hue: f64 = 180.0;
    let max_hue: f64 = 260.0;
    let min_sat: f64 = 40.0;
    let max_sat: f64 = 60.0;
    let max_light: f64 = 70.0;
    let min_light: f64 = 35.0;

    tags.into_iter()
        .map(|tag| {
            let ratio = if max_weight == min_weight {
                0.5
            } else {
                (weight(tag.count) - min_weight) / (max_weight - min_weight)
            };

            let font_size = min_size + ratio * (max_size - min_size);
            let color = match tag.color {
                Some(color) => color,
                None => {
                    let hue = min_hue + ratio * (max_hue - min_hue);
                    let sat = min_sat + ratio * (max_sat - min_sat);
                    let light = max_light - ratio * (max_light - min_light);
                    format!("hsl({:.0}, {:.0}%, {:.0}%)", hue, sat, light)
                }
            };

            TagCloudItem {
                id: tag.id,
                name: tag.name,
                count: tag.count,
                featured: tag.featured,
                font_size: format!("{:.2}rem", font_size),
                color,
            }
        })
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/tags") }))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/new", get(new_tag_form))
        .route("/tags/suggest", get(suggest_fragment))
        .route("/tags/{id}", get(show_tag).post(update_tag).delete(delete_tag))
        .route("/tags/{id}/edit", get(edit_tag_form))
        .route("/tags/{id}/merge", get(merge_form).post(merge_tags))
}

async fn list_tags(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.unwrap_or_default();
    let tags = state.tags.list(Some(query.as_str())).await?;

    let template = TagListTemplate {
        tags: build_tag_cloud(tags),
        query,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?))
}

async fn new_tag_form(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
) -> Result<impl IntoResponse, AppError> {
    let template = TagFormTemplate {
        tag: None,
        values: TagFormValues::default(),
        errors: HashMap::new(),
        max_name_len: state.config.tag_name_max_len,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?))
}

async fn create_tag(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Form(form): Form<TagForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = validate_tag_fields(
        &form.name,
        form.slug.as_deref(),
        form.color.as_deref(),
        state.config.tag_name_max_len,
    );

    let values = form.values();
    if errors.is_empty() {
        match state.tags.add(form.into_new_tag()).await {
            Ok(tag) => return Ok(Redirect::to(&format!("/tags/{}", tag.id)).into_response()),
            Err(AppError::Conflict(msg)) => {
                errors.insert("slug".to_string(), msg);
            }
            Err(AppError::Validation(msg)) => {
                errors.insert("name".to_string(), msg);
            }
            Err(e) => return Err(e),
        }
    }

    let template = TagFormTemplate {
        tag: None,
        values,
        errors,
        max_name_len: state.config.tag_name_max_len,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?).into_response())
}

async fn suggest_fragment(
    State(state): State<AppState>,
    AuthOperator(_operator): AuthOperator,
    Query(params): Query<SuggestQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut snapshot = state.tags.list(None).await?;
    if let Some(exclude) = &params.exclude {
        snapshot.retain(|t| &t.id != exclude);
    }

    let template = SuggestionsTemplate {
        suggestions: suggest_similar_tags(&params.name, &snapshot, &state.config.suggest),
    };
    Ok(Html(template.render()?))
}

async fn show_tag(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(tag) = state.tags.get(&id).await? else {
        return Err(AppError::NotFound);
    };

    let similar = state.tags.suggest(&tag.name, &state.config.suggest).await?;

    let template = TagShowTemplate {
        tag,
        similar,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?))
}

async fn edit_tag_form(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(tag) = state.tags.get(&id).await? else {
        return Ok(Redirect::to("/tags").into_response());
    };

    let template = TagFormTemplate {
        values: TagFormValues::from(&tag),
        tag: Some(tag),
        errors: HashMap::new(),
        max_name_len: state.config.tag_name_max_len,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?).into_response())
}

async fn update_tag(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Path(id): Path<String>,
    Form(form): Form<TagForm>,
) -> Result<impl IntoResponse, AppError> {
    let Some(tag) = state.tags.get(&id).await? else {
        return Ok(Redirect::to("/tags").into_response());
    };

    let mut errors = validate_tag_fields(
        &form.name,
        form.slug.as_deref(),
        form.color.as_deref(),
        state.config.tag_name_max_len,
    );

    let values = form.values();
    if errors.is_empty() {
        match state.tags.update(&id, form.into_update()).await {
            Ok(tag) => return Ok(Redirect::to(&format!("/tags/{}", tag.id)).into_response()),
            Err(AppError::Conflict(msg)) => {
                errors.insert("slug".to_string(), msg);
            }
            Err(AppError::Validation(msg)) => {
                errors.insert("name".to_string(), msg);
            }
            Err(e) => return Err(e),
        }
    }

    let template = TagFormTemplate {
        tag: Some(tag),
        values,
        errors,
        max_name_len: state.config.tag_name_max_len,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?).into_response())
}

async fn delete_tag(
    State(state): State<AppState>,
    AuthOperator(_operator): AuthOperator,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.tags.delete(&id).await {
        Ok(()) | Err(AppError::NotFound) => {}
        Err(e) => return Err(e),
    }

    Ok(([("HX-Redirect", "/tags")], ""))
}

async fn render_merge_form(
    state: &AppState,
    operator: Operator,
    target: Tag,
    error: Option<String>,
) -> Result<axum::response::Response, AppError> {
    let mut others = state.tags.list(None).await?;
    others.retain(|t| t.id != target.id);
    let similar = suggest_similar_tags(&target.name, &others, &state.config.suggest);
    others.retain(|t| !similar.iter().any(|s| s.id == t.id));

    let template = TagMergeTemplate {
        target,
        similar,
        others,
        error,
        static_hash: crate::STATIC_HASH,
        operator: Some(operator),
    };
    Ok(Html(template.render()?).into_response())
}

async fn merge_form(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(target) = state.tags.get(&id).await? else {
        return Ok(Redirect::to("/tags").into_response());
    };

    render_merge_form(&state, operator, target, None).await
}

/// Checkbox form: one `source_ids` pair per selected tag.
async fn merge_tags(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let source_ids: Vec<String> = pairs
        .into_iter()
        .filter(|(key, _)| key == "source_ids")
        .map(|(_, value)| value)
        .collect();

    match state.tags.merge(&id, &source_ids).await {
        Ok(tag) => Ok(Redirect::to(&format!("/tags/{}", tag.id)).into_response()),
        Err(AppError::Validation(msg)) => {
            let Some(target) = state.tags.get(&id).await? else {
                return Ok(Redirect::to("/tags").into_response());
            };
            render_merge_form(&state, operator, target, Some(msg)).await
        }
        Err(AppError::NotFound) => Ok(Redirect::to("/tags").into_response()),
        Err(e) => Err(e),
    }
}
