use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::AuthUser;
use crate::db::operations::profile::{self, Profile, ProfileUpdate};
use crate::response::AppError;
use crate::state::AppState;

#[derive(Serialize)]
struct ProfileResponse {
    success: bool,
    profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    goal_description: Option<String>,
    #[serde(default)]
    coding_level: Option<i32>,
    #[serde(default)]
    social_feeds: Option<serde_json::Value>,
}

pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    match profile::find_by_id(proxy.as_ref(), &user.id).await {
        Ok(Some(profile)) => Json(ProfileResponse {
            success: true,
            profile,
        })
        .into_response(),
        Ok(None) => AppError::not_found("Profile not found").into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, "profile lookup failed");
            AppError::internal("profile lookup failed").into_response()
        }
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return AppError::validation("Name cannot be empty").into_response();
        }
    }

    let update = ProfileUpdate {
        name: payload.name.as_deref().map(str::trim),
        goal_description: payload.goal_description.as_deref(),
        coding_level: payload.coding_level,
        social_feeds: payload.social_feeds.as_ref(),
    };

    if let Err(err) = profile::update_profile(proxy.as_ref(), &user.id, update).await {
        warn!(error = %err, user_id = %user.id, "profile update failed");
        return AppError::internal("profile update failed").into_response();
    }

    match profile::find_by_id(proxy.as_ref(), &user.id).await {
        Ok(Some(profile)) => Json(ProfileResponse {
            success: true,
            profile,
        })
        .into_response(),
        Ok(None) => AppError::not_found("Profile not found").into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, "profile reload failed");
            AppError::internal("profile reload failed").into_response()
        }
    }
}
