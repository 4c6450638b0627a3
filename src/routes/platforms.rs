use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::AuthUser;
use crate::db::operations::platforms::{self, PlatformRow, PlatformUpdate};
use crate::response::AppError;
use crate::state::AppState;

const KNOWN_PLATFORMS: &[&str] = &["codechef", "leetcode"];

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    platforms: Vec<PlatformRow>,
}

#[derive(Serialize)]
struct UpsertResponse {
    success: bool,
    platforms: Vec<PlatformRow>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    contest_rank: i32,
    #[serde(default)]
    star_rating: i32,
    #[serde(default)]
    current_division: String,
    #[serde(default)]
    goal: String,
}

pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    match platforms::list_for_user(proxy.as_ref(), &user.id).await {
        Ok(rows) => Json(ListResponse {
            success: true,
            platforms: rows,
        })
        .into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, "platform list failed");
            AppError::internal("platform list failed").into_response()
        }
    }
}

pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(platform): Path<String>,
    Json(payload): Json<UpsertRequest>,
) -> Response {
    let platform = platform.trim().to_lowercase();
    if !KNOWN_PLATFORMS.contains(&platform.as_str()) {
        return AppError::validation("Unknown platform").into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    let update = PlatformUpdate {
        username: payload.username,
        contest_rank: payload.contest_rank,
        star_rating: payload.star_rating,
        current_division: payload.current_division,
        goal: payload.goal,
    };

    if let Err(err) = platforms::upsert(proxy.as_ref(), &user.id, &platform, &update).await {
        warn!(error = %err, user_id = %user.id, platform, "platform upsert failed");
        return AppError::internal("platform upsert failed").into_response();
    }

    match platforms::list_for_user(proxy.as_ref(), &user.id).await {
        Ok(rows) => Json(UpsertResponse {
            success: true,
            platforms: rows,
        })
        .into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, "platform reload failed");
            AppError::internal("platform reload failed").into_response()
        }
    }
}
