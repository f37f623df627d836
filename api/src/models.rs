use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use social::FriendshipState;
use utoipa::ToSchema;

/// Success body: `{"success": true, "data": ...}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Generic success response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Friendship state between the caller and another user.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RelationshipResponse {
    pub user_id: String,
    /// One of NONE, PENDING_OUTBOUND, PENDING_INBOUND, FRIENDS, DECLINED
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_id: Option<String>,
    pub following: bool,
}

impl RelationshipResponse {
    pub fn new(user_id: impl Into<String>, state: &FriendshipState, following: bool) -> Self {
        let (state, requester_id) = match state {
            FriendshipState::None => ("NONE", None),
            FriendshipState::PendingOutbound { requester_id } => {
                ("PENDING_OUTBOUND", Some(requester_id.clone()))
            }
            FriendshipState::PendingInbound { requester_id } => {
                ("PENDING_INBOUND", Some(requester_id.clone()))
            }
            FriendshipState::Friends => ("FRIENDS", None),
            FriendshipState::Declined => ("DECLINED", None),
        };

        Self {
            user_id: user_id.into(),
            state: state.to_string(),
            requester_id,
            following,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_envelope() {
        let response = ApiResponse::ok(SuccessResponse::new("Followed")).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["message"], "Followed");
    }

    #[test]
    fn test_relationship_response() {
        let pending = FriendshipState::PendingInbound {
            requester_id: "bob".into(),
        };
        let response = RelationshipResponse::new("bob", &pending, true);
        assert_eq!(response.state, "PENDING_INBOUND");
        assert_eq!(response.requester_id.as_deref(), Some("bob"));
        assert!(response.following);

        let json = serde_json::to_value(RelationshipResponse::new(
            "carol",
            &FriendshipState::Friends,
            false,
        ))
        .unwrap();
        assert_eq!(json["state"], "FRIENDS");
        assert!(json.get("requester_id").is_none());
    }
}
