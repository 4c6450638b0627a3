use uuid::Uuid;

use crate::db::DatabaseProxy;
use crate::services::assessment::{Assessment, QuizAnswers};

/// Appends one immutable result row; historical submissions are never
/// overwritten, only the profile's current level is.
pub async fn insert_result(
    proxy: &DatabaseProxy,
    user_id: &str,
    answers: &QuizAnswers,
    assessment: &Assessment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO quiz_results (
            id, user_id, coding_level_score, coding_proficiency_score,
            decision_making_score, cgpa, real_life_application_score,
            total_score, category
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(answers.coding_level_score)
    .bind(answers.coding_proficiency_score)
    .bind(answers.decision_making_score)
    .bind(answers.cgpa)
    .bind(answers.real_life_application_score)
    .bind(assessment.total_score)
    .bind(assessment.category.as_str())
    .execute(proxy.pool())
    .await?;
    Ok(())
}
