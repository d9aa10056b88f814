use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::Operator;

const OPERATOR_KEY: &str = "operator";

/// Extractor for routes that need a logged-in operator.
pub struct AuthOperator(pub Operator);

impl<S> FromRequestParts<S> for AuthOperator
where
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRedirect)?;

        let operator: Option<Operator> = session.get(OPERATOR_KEY).await.ok().flatten();

        operator.map(AuthOperator).ok_or(AuthRedirect)
    }
}

pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

pub async fn login_operator(
    session: &Session,
    operator: Operator,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(OPERATOR_KEY, operator).await
}

pub async fn logout_operator(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
