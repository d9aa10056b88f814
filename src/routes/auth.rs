use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::{login_operator, logout_operator};
use crate::error::AppError;
use crate::models::Operator;
use crate::AppState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,

    operator: Option<Operator>,
    static_hash: &'static str,
}

#[derive(Deserialize)]
pub struct LoginForm {
    access_code: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/login", post(login_submit))
        .route("/logout", post(logout))
}

async fn login_page() -> Result<impl IntoResponse, AppError> {
    let template = LoginTemplate {
        error: None,

        operator: None,
        static_hash: crate::STATIC_HASH,
    };
    Ok(Html(template.render()?))
}

async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let operator: Option<Operator> = sqlx::query_as(
        "SELECT * FROM operators WHERE access_code = ?"
    )
    .bind(form.access_code.trim())
    .fetch_optional(&state.db)
    .await?;

    match operator {
        Some(operator) => {
            tracing::info!(operator_id = %operator.id, "operator logged in");
            login_operator(&session, operator).await?;
            Ok(Redirect::to("/tags").into_response())
        }
        None => {
            tracing::warn!("rejected login with unknown access code");
            let template = LoginTemplate {
                error: Some("Invalid access code".to_string()),

                operator: None,
                static_hash: crate::STATIC_HASH,
            };
            Ok(Html(template.render()?).into_response())
        }
    }
}

async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    logout_operator(&session).await?;
    Ok(Redirect::to("/login"))
}
