//! Authentication handlers
//!
//! Implements register, login, token refresh and logout

use axum::{extract::State, Extension, Json};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entity::user::{self, UserResponse};
use crate::error::{AppError, AppResult};
use crate::jwt::{token_digest, TokenKind, TokenPair};
use crate::middleware::{CurrentUser, DbConn};
use crate::routes::ApiResponse;
use crate::state::AppState;

const BCRYPT_COST: u32 = 10;
const USERNAME_MIN: usize = 2;
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Register request body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "register_rules"))]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 2))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirm: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(alias = "refresh_token")]
    pub refresh_token: String,
}

/// Login response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: i64,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Trimmed username and password character classes
fn register_rules(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req.username.trim().chars().count() < USERNAME_MIN {
        return Err(ValidationError::new("username")
            .with_message(format!("username must be at least {} characters", USERNAME_MIN).into()));
    }
    let password = req.password.as_str();
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    let strong = password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && password.chars().next().is_some_and(allowed);
    if !strong {
        return Err(ValidationError::new("password").with_message(
            format!(
                "password needs a letter, a digit and one of {}",
                PASSWORD_SPECIALS
            )
            .into(),
        ));
    }
    Ok(())
}

/// Store the digest of `refresh_token` (or clear it) for a user
async fn store_refresh_token(
    db: &DbConn,
    user_id: i64,
    refresh_token: Option<&str>,
) -> AppResult<()> {
    user::Entity::update_many()
        .col_expr(
            user::Column::RefreshToken,
            Expr::value(refresh_token.map(token_digest)),
        )
        .col_expr(user::Column::UpdatedDtm, Expr::value(chrono::Utc::now()))
        .filter(user::Column::Id.eq(user_id))
        .exec(&**db)
        .await?;
    Ok(())
}

/// POST /api/auth/register
pub async fn register(
    Extension(db): Extension<DbConn>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    req.validate()?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::EmailExists(req.email));
    }

    let now = chrono::Utc::now();
    let account = user::ActiveModel {
        username: Set(req.username.trim().to_string()),
        password: Set(bcrypt::hash(&req.password, BCRYPT_COST)?),
        email: Set(req.email),
        refresh_token: Set(None),
        created_dtm: Set(now),
        updated_dtm: Set(now),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!("User registered: {} ({})", account.id, account.email);
    Ok(Json(ApiResponse::success(UserResponse::from(account))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".to_string()));
    }

    let account = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&*db)
        .await?;
    let Some(account) = account else {
        tracing::warn!("Login failed: unknown email {}", req.email);
        return Err(AppError::InvalidCredentials);
    };

    if !bcrypt::verify(&req.password, &account.password)? {
        tracing::warn!("Login failed: wrong password for {}", req.email);
        return Err(AppError::InvalidCredentials);
    }

    let tokens = state.jwt.issue_pair(account.id, &account.email)?;
    store_refresh_token(&db, account.id, Some(&tokens.refresh_token)).await?;

    tracing::info!("User logged in: {}", account.email);
    Ok(Json(ApiResponse::success(LoginResponse {
        id: account.id,
        tokens,
    })))
}

async fn rotate(state: &AppState, db: &DbConn, refresh_token: &str) -> AppResult<TokenPair> {
    let claims = state.jwt.verify(refresh_token, TokenKind::Refresh)?;
    let account = user::Entity::find_by_id(claims.sub)
        .one(&**db)
        .await?
        .ok_or(AppError::UserNotFound)?;

    if account.refresh_token.as_deref() != Some(token_digest(refresh_token).as_str()) {
        return Err(AppError::InvalidToken);
    }

    let tokens = state.jwt.issue_pair(account.id, &account.email)?;
    store_refresh_token(db, account.id, Some(&tokens.refresh_token)).await?;
    Ok(tokens)
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    match rotate(&state, &db, &req.refresh_token).await {
        Ok(tokens) => Ok(Json(ApiResponse::success(tokens))),
        Err(e) => {
            tracing::warn!("Refresh rejected: {}", e);
            Err(AppError::InvalidToken)
        }
    }
}

/// POST /api/auth/logout
pub async fn logout(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<()>>> {
    store_refresh_token(&db, user.id, None).await?;
    tracing::info!("User logged out: {}", user.email);
    Ok(Json(ApiResponse::success_msg("Logged out successfully")))
}
