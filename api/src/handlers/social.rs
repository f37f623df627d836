use axum::{
    extract::{Path, State},
    Extension,
};
use authz::Principal;
use social::{FriendRequest, RelationshipStore};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    guards::require_principal,
    models::{ApiResponse, RelationshipResponse, SuccessResponse},
    AppState,
};

fn caller(principal: &Option<Extension<Principal>>) -> ApiResult<&Principal> {
    require_principal(principal.as_ref().map(|Extension(p)| p))
}

/// Send a friend request to another user
///
/// POST /api/social/friends/requests/{user_id}
pub async fn send_friend_request<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<FriendRequest>> {
    let caller = caller(&principal)?;
    info!("Friend request: {} -> {}", caller.id, user_id);

    let request = state.social()?.send_request(&caller.id, &user_id)?;
    Ok(ApiResponse::ok(request))
}

/// Accept a pending friend request addressed to the caller
///
/// POST /api/social/friends/requests/{request_id}/accept
pub async fn accept_friend_request<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(request_id): Path<String>,
) -> ApiResult<ApiResponse<SuccessResponse>> {
    let caller = caller(&principal)?;
    state.social()?.accept_request(&caller.id, &request_id)?;
    Ok(ApiResponse::ok(SuccessResponse::new("Friend request accepted")))
}

/// Decline a pending friend request addressed to the caller
///
/// POST /api/social/friends/requests/{request_id}/decline
pub async fn decline_friend_request<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(request_id): Path<String>,
) -> ApiResult<ApiResponse<SuccessResponse>> {
    let caller = caller(&principal)?;
    state.social()?.decline_request(&caller.id, &request_id)?;
    Ok(ApiResponse::ok(SuccessResponse::new("Friend request declined")))
}

/// DELETE /api/social/friends/{user_id}
pub async fn remove_friend<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<SuccessResponse>> {
    let caller = caller(&principal)?;
    state.social()?.remove_friend(&caller.id, &user_id)?;
    Ok(ApiResponse::ok(SuccessResponse::new("Friend removed")))
}

/// GET /api/social/friends
pub async fn list_friends<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<ApiResponse<Vec<String>>> {
    let caller = caller(&principal)?;
    let friends = state.social()?.friends_of(&caller.id)?;
    Ok(ApiResponse::ok(friends))
}

/// POST /api/social/follow/{user_id}
pub async fn follow_user<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<SuccessResponse>> {
    let caller = caller(&principal)?;
    state.social()?.follow(&caller.id, &user_id)?;
    Ok(ApiResponse::ok(SuccessResponse::new("Followed user")))
}

/// DELETE /api/social/follow/{user_id}
pub async fn unfollow_user<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<SuccessResponse>> {
    let caller = caller(&principal)?;
    state.social()?.unfollow(&caller.id, &user_id)?;
    Ok(ApiResponse::ok(SuccessResponse::new("Unfollowed user")))
}

/// Relationship between the caller and another user
///
/// GET /api/social/relationship/{user_id}
pub async fn relationship<S: RelationshipStore + 'static>(
    State(state): State<AppState<S>>,
    principal: Option<Extension<Principal>>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<RelationshipResponse>> {
    let caller = caller(&principal)?;
    if caller.id == user_id {
        return Err(ApiError::ValidationError(
            "Cannot query a relationship with yourself".to_string(),
        ));
    }

    let social = state.social()?;
    let friendship = social.state_between(&caller.id, &user_id)?;
    let following = social.store().is_following(&caller.id, &user_id)?;
    Ok(ApiResponse::ok(RelationshipResponse::new(
        user_id, &friendship, following,
    )))
}
