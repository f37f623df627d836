//! HTTP surface of the forum policy.
//!
//! Maps policy decisions onto status codes and the JSON envelope
//! (`{success, data}` / `{success, error, code}`), provides guards for
//! content and admin endpoints, and routes the social-graph endpoints.
//!
//! Authentication is not handled here. An outer layer verifies the bearer
//! token and inserts the resulting [`authz::Principal`] as a request
//! extension; handlers treat a missing principal as 401.

use axum::{
    routing::{get, post},
    Router,
};
use social::{RelationshipStore, SocialService};
use std::sync::{Arc, Mutex, MutexGuard};
use utoipa::OpenApi;

pub mod error;
pub mod guards;
pub mod handlers;
pub mod models;

use error::{ApiError, ApiResult};

/// Application state shared across handlers
pub struct AppState<S> {
    social: Arc<Mutex<SocialService<S>>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            social: Arc::clone(&self.social),
        }
    }
}

impl<S: RelationshipStore> AppState<S> {
    pub fn new(service: SocialService<S>) -> Self {
        Self {
            social: Arc::new(Mutex::new(service)),
        }
    }

    /// Locks the social service for one request. The lock serializes the
    /// read-decide-write sequence of each operation.
    pub fn social(&self) -> ApiResult<MutexGuard<'_, SocialService<S>>> {
        self.social
            .lock()
            .map_err(|_| ApiError::InternalError("social service lock poisoned".to_string()))
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            models::SuccessResponse,
            models::RelationshipResponse,
            error::ApiErrorResponse,
        )
    ),
    tags(
        (name = "social", description = "Friend requests and follows"),
    ),
    info(
        title = "Forum Policy API",
        version = "1.0.0",
        description = "Social-graph endpoints and the error envelope shared by forum handlers",
    ),
)]
pub struct ApiDoc;

/// Create the social-graph router
pub fn create_router<S: RelationshipStore + 'static>(state: AppState<S>) -> Router {
    let social_routes = Router::new()
        .route("/friends", get(handlers::social::list_friends::<S>))
        .route(
            "/friends/:id",
            axum::routing::delete(handlers::social::remove_friend::<S>),
        )
        .route(
            "/friends/requests/:id",
            post(handlers::social::send_friend_request::<S>),
        )
        .route(
            "/friends/requests/:id/accept",
            post(handlers::social::accept_friend_request::<S>),
        )
        .route(
            "/friends/requests/:id/decline",
            post(handlers::social::decline_friend_request::<S>),
        )
        .route(
            "/follow/:id",
            post(handlers::social::follow_user::<S>)
                .delete(handlers::social::unfollow_user::<S>),
        )
        .route(
            "/relationship/:id",
            get(handlers::social::relationship::<S>),
        );

    Router::new()
        .nest("/api/social", social_routes)
        .with_state(state)
}
