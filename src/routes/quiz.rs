use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;
use tracing::warn;

use crate::auth::AuthUser;
use crate::db::operations::{profile, quiz};
use crate::response::AppError;
use crate::services::assessment::{self, QuizAnswers};
use crate::services::generation;
use crate::services::prompts;
use crate::state::AppState;

#[derive(Serialize)]
struct AnalyzeResponse {
    success: bool,
    category: &'static str,
    total_score: f64,
    percent: f64,
    analysis: String,
    // Aliases kept for older clients.
    score: f64,
    skill_level: &'static str,
}

/// Quiz submission end to end: the shared pure scoring module produces the
/// authoritative classification, the generation service contributes the
/// analysis text when it can, and a deterministic local analysis fills in
/// when it cannot. The caller is never blocked by a degraded upstream.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(answers): Json<QuizAnswers>,
) -> Response {
    let Some(proxy) = state.db_proxy() else {
        return AppError::service_unavailable("Database unavailable").into_response();
    };

    let result = assessment::assess(&answers);

    let analysis = match analysis_text(&state, &answers, &result).await {
        Some(text) => text,
        None => assessment::fallback_analysis(&result),
    };

    if let Err(err) = quiz::insert_result(proxy.as_ref(), &user.id, &answers, &result).await {
        warn!(error = %err, user_id = %user.id, "quiz result insert failed");
        return AppError::internal("quiz result insert failed").into_response();
    }

    if let Err(err) = profile::set_learning_level(proxy.as_ref(), &user.id, result.category).await {
        warn!(error = %err, user_id = %user.id, "learning level update failed");
        return AppError::internal("profile update failed").into_response();
    }

    Json(AnalyzeResponse {
        success: true,
        category: result.category.as_str(),
        total_score: result.total_score,
        percent: result.percent,
        analysis,
        score: result.percent,
        skill_level: result.category.as_str(),
    })
    .into_response()
}

async fn analysis_text(
    state: &AppState,
    answers: &QuizAnswers,
    result: &assessment::Assessment,
) -> Option<String> {
    let provider = state.generation();
    if !provider.is_available() {
        return None;
    }

    let prompt = prompts::analysis_prompt(answers, result);
    match provider.generate(&prompt).await {
        Ok(text) => generation::usable(&text).map(|t| t.to_string()),
        Err(err) => {
            warn!(error = %err, "quiz analysis generation failed, using local analysis");
            None
        }
    }
}
