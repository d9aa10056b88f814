use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthOperator;
use crate::error::AppError;
use crate::models::Tag;
use crate::suggest::{rank_similar_tags, Suggestion};
use crate::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
pub struct PopularQuery {
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    name: String,
    max_results: Option<i64>,
    max_edit_distance: Option<i64>,
}

#[derive(Serialize)]
struct SuggestionView {
    tag: Tag,
    distance: usize,
}

impl From<Suggestion<'_>> for SuggestionView {
    fn from(s: Suggestion<'_>) -> Self {
        Self {
            tag: s.tag.clone(),
            distance: s.distance,
        }
    }
}

#[derive(Serialize)]
struct SuggestResponse {
    candidate: String,
    suggestions: Vec<SuggestionView>,
}

#[derive(Deserialize)]
pub struct MergeRequest {
    target_id: String,
    source_ids: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tags", get(list_tags))
        .route("/api/tags/popular", get(popular_tags))
        .route("/api/tags/suggest", get(suggest_tags))
        .route("/api/tags/merge", post(merge_tags))
}

async fn list_tags(
    State(state): State<AppState>,
    AuthOperator(_operator): AuthOperator,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(state.tags.list(params.q.as_deref()).await?))
}

async fn popular_tags(
    State(state): State<AppState>,
    AuthOperator(_operator): AuthOperator,
    Query(params): Query<PopularQuery>,
) -> Result<Json<Vec<Tag>>, AppError> {
    Ok(Json(state.tags.popular(params.limit.unwrap_or(10)).await?))
}

async fn suggest_tags(
    State(state): State<AppState>,
    AuthOperator(_operator): AuthOperator,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    let options = state
        .config
        .suggest
        .with_raw(params.max_results, params.max_edit_distance);
    let snapshot = state.tags.list(None).await?;

    let suggestions = rank_similar_tags(&params.name, &snapshot, &options)
        .into_iter()
        .map(SuggestionView::from)
        .collect();

    Ok(Json(SuggestResponse {
        candidate: params.name,
        suggestions,
    }))
}

async fn merge_tags(
    State(state): State<AppState>,
    AuthOperator(_operator): AuthOperator,
    Json(req): Json<MergeRequest>,
) -> Result<Json<Tag>, AppError> {
    Ok(Json(state.tags.merge(&req.target_id, &req.source_ids).await?))
}
