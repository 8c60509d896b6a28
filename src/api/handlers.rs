//! API Handlers
//!
//! HTTP request handlers for each user service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::lookup::LookupEngine;
use crate::models::{CreateUserRequest, HealthResponse, StatsResponse, User};
use crate::repository::UserRepository;

/// Header telling clients whether a user came from the cache.
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backing store for users
    pub users: UserRepository,
    /// Read-through cache in front of `users`
    pub user_cache: Arc<LookupEngine<User>>,
}

impl AppState {
    /// Creates a new AppState from a repository and a user cache.
    pub fn new(users: UserRepository, user_cache: LookupEngine<User>) -> Self {
        Self {
            users,
            user_cache: Arc::new(user_cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails if the cache configuration is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let user_cache = LookupEngine::new(&config.cache, "user")?;
        Ok(Self::new(UserRepository::new(), user_cache))
    }
}

/// Handler for GET /users/:id
///
/// Looks the user up through the cache, falling back to the repository.
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let users = state.users.clone();
    let found = state
        .user_cache
        .lookup(&id, |key| async move { users.find(&key).await })
        .await?;

    let cache_status = if found.source.is_hit() { "hit" } else { "miss" };
    Ok(([(CACHE_STATUS_HEADER, cache_status)], Json(found.record)))
}

/// Handler for GET /users
///
/// Lists all users straight from the repository.
pub async fn list_users_handler(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.users.list().await)
}

/// Handler for POST /users
///
/// Creates a user. The cache is not touched; the user is cached on its first
/// lookup.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> std::result::Result<(StatusCode, Json<User>), ApiError> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let user = state.users.insert(req.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Handler for GET /stats
///
/// Returns lookup and cache statistics for the user cache.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let engine = &state.user_cache;
    Json(StatsResponse::new(
        engine.label(),
        engine.stats(),
        engine.cache().stats(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
