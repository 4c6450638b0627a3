use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::AuthUser;
use crate::db::operations::profile;
use crate::response::AppError;
use crate::services::assessment::Category;
use crate::services::materializer::{self, BatchOutcome};
use crate::services::prompts::DEFAULT_LANGUAGE;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    generate_initial: bool,
    #[serde(default)]
    concept_name: Option<String>,
    /// Newer alias for concept_name.
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    language: Option<String>,
    /// Overrides the profile's stored level when supplied.
    #[serde(default)]
    skill_level: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_index: Option<i32>,
}

/// The stored classification gates generation; a skill_level hint refines
/// the template but never substitutes for taking the quiz.
fn resolve_category(stored: Option<Category>, requested: Option<Category>) -> Option<Category> {
    stored?;
    requested.or(stored)
}

/// Content generation is gated on classification: a profile without a
/// learning_level gets a 400 before anything is generated.
pub async fn generate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<GenerateRequest>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    let profile_level = match profile::get_learning_level(proxy.as_ref(), &user.id).await {
        Ok(level) => level,
        Err(err) => {
            warn!(error = %err, user_id = %user.id, "learning level lookup failed");
            return AppError::internal("profile lookup failed").into_response();
        }
    };

    let requested_level = payload.skill_level.as_deref().and_then(Category::parse);
    let Some(category) = resolve_category(profile_level, requested_level) else {
        return AppError::precondition("Please complete the quiz first").into_response();
    };

    let language = payload
        .language
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    let generation = state.generation();

    if payload.generate_initial {
        return match materializer::generate_initial(
            proxy.as_ref(),
            generation.as_ref(),
            &user.id,
            category,
            language,
        )
        .await
        {
            Ok(BatchOutcome::AlreadyGenerated) => Json(GenerateResponse {
                success: true,
                message: "Initial content already generated",
                description: None,
                order_index: None,
            })
            .into_response(),
            Ok(BatchOutcome::Generated { .. }) => Json(GenerateResponse {
                success: true,
                message: "Learning content generated",
                description: None,
                order_index: None,
            })
            .into_response(),
            Err(err) => {
                warn!(error = %err, user_id = %user.id, "initial content generation failed");
                AppError::internal("content generation failed").into_response()
            }
        };
    }

    let concept_name = payload
        .concept_name
        .as_deref()
        .or(payload.topic.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let Some(concept_name) = concept_name else {
        return AppError::bad_request("Invalid request").into_response();
    };

    match materializer::upsert_concept(
        proxy.as_ref(),
        generation.as_ref(),
        &user.id,
        concept_name,
        category,
        language,
    )
    .await
    {
        Ok(outcome) => Json(GenerateResponse {
            success: true,
            message: if outcome.created {
                "Concept added to learning path"
            } else {
                "Concept explanation updated"
            },
            description: Some(outcome.description),
            order_index: Some(outcome.order_index),
        })
        .into_response(),
        Err(err) => {
            warn!(error = %err, user_id = %user.id, concept = concept_name, "concept upsert failed");
            AppError::internal("content generation failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_generation_gated_until_quiz_taken() {
        assert_eq!(resolve_category(None, None), None);
        assert_eq!(resolve_category(None, Some(Category::Advanced)), None);
    }

    #[test]
    fn test_skill_level_hint_refines_stored_level() {
        assert_eq!(
            resolve_category(Some(Category::Structured), Some(Category::Advanced)),
            Some(Category::Advanced)
        );
        assert_eq!(
            resolve_category(Some(Category::Advanced), None),
            Some(Category::Advanced)
        );
    }

    #[test]
    fn test_quiz_gate_is_a_bad_request() {
        let response = AppError::precondition("Please complete the quiz first").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
