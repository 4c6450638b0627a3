use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::warn;

use crate::auth::AuthUser;
use crate::db::operations::progress::{self, ConceptRow};
use crate::response::AppError;
use crate::state::AppState;

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    concepts: Vec<ConceptRow>,
}

#[derive(Serialize)]
struct CompleteResponse {
    success: bool,
    concept: ConceptRow,
    already_completed: bool,
}

pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    match progress::list_for_user(proxy.as_ref(), &user.id).await {
        Ok(concepts) => Json(ListResponse {
            success: true,
            concepts,
        })
        .into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, "progress list failed");
            AppError::internal("progress list failed").into_response()
        }
    }
}

/// Completed is terminal: marking an already-completed concept is a no-op
/// success, never an error.
pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(concept_id): Path<String>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    let updated = match progress::mark_completed(proxy.as_ref(), &user.id, &concept_id).await {
        Ok(updated) => updated,
        Err(err) => {
            warn!(error = %err, user_id = %user.id, concept_id, "mark completed failed");
            return AppError::internal("mark completed failed").into_response();
        }
    };

    match progress::find_by_id(proxy.as_ref(), &user.id, &concept_id).await {
        Ok(Some(concept)) => Json(CompleteResponse {
            success: true,
            concept,
            already_completed: !updated,
        })
        .into_response(),
        Ok(None) => AppError::not_found("Concept not found").into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, concept_id, "concept lookup failed");
            AppError::internal("concept lookup failed").into_response()
        }
    }
}
