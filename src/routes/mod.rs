use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CorsConfig;
use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: true,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: false,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn success_msg(message: impl Into<String>) -> Self {
        Self {
            code: true,
            message: message.into(),
            data: None,
        }
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        // User routes
        .route("/user/:id", get(handlers::user::get_user))
        // Board routes
        .route(
            "/board",
            get(handlers::board::list_boards).post(handlers::board::create_board),
        )
        .route(
            "/board/:id",
            get(handlers::board::get_board)
                .patch(handlers::board::update_board)
                .delete(handlers::board::delete_board),
        )
        // Menu routes
        .route(
            "/menus",
            get(handlers::menu::list_menus).post(handlers::menu::create_menu),
        )
        .route("/menus/page", get(handlers::menu::page_menus))
        .route("/menus/tree", get(handlers::menu::menu_tree))
        .route("/menus/user", get(handlers::menu::user_menus))
        .route("/menus/reorder", patch(handlers::menu::reorder_menus))
        .route("/menus/level/:level", get(handlers::menu::menus_by_level))
        .route(
            "/menus/:id",
            get(handlers::menu::get_menu)
                .patch(handlers::menu::update_menu)
                .delete(handlers::menu::delete_menu),
        )
        .route("/menus/:id/children", get(handlers::menu::menu_children))
        .route("/menus/:id/path", get(handlers::menu::menu_path));

    Router::new()
        .nest("/api", api_routes)
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Fallback handler for 404
pub async fn fallback() -> (StatusCode, Json<ApiResponse<()>>) {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("Not Found")))
}
