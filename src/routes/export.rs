use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthOperator;
use crate::error::AppError;
use crate::models::Tag;
use crate::AppState;

/// On-disk format of `/export`, read back by `tagdesk import-tags`.
#[derive(Serialize, Deserialize)]
pub struct ExportData {
    pub exported_at: String,
    pub tags: Vec<Tag>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/export", get(export_data))
}

async fn export_data(
    State(state): State<AppState>,
    AuthOperator(operator): AuthOperator,
) -> Result<impl IntoResponse, AppError> {
    let tags = state.tags.list(None).await?;
    tracing::info!(operator_id = %operator.id, tags = tags.len(), "exporting tags");

    let export = ExportData {
        exported_at: chrono::Utc::now().to_rfc3339(),
        tags,
    };

    let filename = format!("tagdesk-export-{}.json", chrono::Local::now().format("%Y-%m-%d"));
    let content_disposition = format!("attachment; filename=\"{}\"", filename);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(value) = HeaderValue::from_str(&content_disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((headers, Json(export)))
}
