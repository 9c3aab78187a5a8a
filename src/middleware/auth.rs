//! Authentication middleware
//!
//! Bearer access tokens for API routes

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::ops::Deref;

use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::jwt::TokenKind;
use crate::state::AppState;

/// Database connection wrapper for use in handlers via Extension
#[derive(Clone)]
pub struct DbConn(pub DatabaseConnection);

impl Deref for DbConn {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extension to store current user in request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
}

impl CurrentUser {
    /// Value recorded in `created_by` / `updated_by`
    pub fn actor_id(&self) -> String {
        self.id.to_string()
    }
}

/// Paths that don't require authentication
pub fn is_public_path(path: &str) -> bool {
    if !path.starts_with("/api") {
        return true;
    }
    matches!(
        path,
        "/api/health" | "/api/auth/register" | "/api/auth/login" | "/api/auth/refresh"
    )
}

async fn authenticate(state: &AppState, token: Option<&str>) -> AppResult<CurrentUser> {
    let token = token.ok_or(AppError::Unauthorized)?;
    let claims = state.jwt.verify(token, TokenKind::Access)?;

    let account = user::Entity::find_by_id(claims.sub)
        .one(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(CurrentUser {
        id: account.id,
        email: account.email,
    })
}

/// Authentication middleware
pub async fn auth_layer(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(DbConn(state.db.clone()));

    if is_public_path(request.uri().path()) {
        return next.run(request).await;
    }

    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());
    match authenticate(&state, token).await {
        Ok(current_user) => {
            request.extensions_mut().insert(current_user);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            e.into_response()
        }
    }
}
