use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::db::operations::to_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
pub struct ConceptRow {
    pub id: String,
    pub user_id: String,
    pub concept_name: String,
    pub concept_description: String,
    pub difficulty_level: String,
    pub is_completed: bool,
    pub order_index: i32,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewConcept {
    pub concept_name: String,
    pub concept_description: String,
    pub difficulty_level: &'static str,
    pub order_index: i32,
}

fn map_concept(row: &sqlx::postgres::PgRow) -> Result<ConceptRow, sqlx::Error> {
    let created_at: NaiveDateTime = row.try_get("created_at")?;
    let completed_at: Option<NaiveDateTime> = row.try_get("completed_at")?;

    Ok(ConceptRow {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        concept_name: row.try_get("concept_name")?,
        concept_description: row.try_get("concept_description")?,
        difficulty_level: row.try_get("difficulty_level")?,
        is_completed: row.try_get("is_completed")?,
        order_index: row.try_get("order_index")?,
        created_at: to_iso(created_at),
        completed_at: completed_at.map(to_iso),
    })
}

pub async fn count_for_user(proxy: &DatabaseProxy, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM learning_progress WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(proxy.pool())
        .await
}

pub async fn list_for_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<ConceptRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, concept_name, concept_description, difficulty_level,
               is_completed, order_index, created_at, completed_at
        FROM learning_progress
        WHERE user_id = $1
        ORDER BY order_index ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_concept).collect()
}

pub async fn find_by_name(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept_name: &str,
) -> Result<Option<ConceptRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, concept_name, concept_description, difficulty_level,
               is_completed, order_index, created_at, completed_at
        FROM learning_progress
        WHERE user_id = $1 AND concept_name = $2
        "#,
    )
    .bind(user_id)
    .bind(concept_name)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_concept).transpose()
}

pub async fn max_order_index(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT MAX(order_index) FROM learning_progress WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(proxy.pool())
        .await
}

/// One bulk insert: a failure partway leaves no rows behind.
pub async fn insert_batch(
    proxy: &DatabaseProxy,
    user_id: &str,
    concepts: &[NewConcept],
) -> Result<usize, sqlx::Error> {
    if concepts.is_empty() {
        return Ok(0);
    }

    let ids: Vec<String> = concepts
        .iter()
        .map(|_| Uuid::new_v4().to_string())
        .collect();
    let names: Vec<String> = concepts.iter().map(|c| c.concept_name.clone()).collect();
    let descriptions: Vec<String> = concepts
        .iter()
        .map(|c| c.concept_description.clone())
        .collect();
    let difficulties: Vec<String> = concepts
        .iter()
        .map(|c| c.difficulty_level.to_string())
        .collect();
    let order_indexes: Vec<i32> = concepts.iter().map(|c| c.order_index).collect();

    sqlx::query(
        r#"
        INSERT INTO learning_progress (
            id, user_id, concept_name, concept_description, difficulty_level,
            is_completed, order_index
        )
        SELECT id, $2, concept_name, concept_description, difficulty_level, FALSE, order_index
        FROM UNNEST($1::text[], $3::text[], $4::text[], $5::text[], $6::int4[])
            AS t (id, concept_name, concept_description, difficulty_level, order_index)
        "#,
    )
    .bind(&ids)
    .bind(user_id)
    .bind(&names)
    .bind(&descriptions)
    .bind(&difficulties)
    .bind(&order_indexes)
    .execute(proxy.pool())
    .await?;

    Ok(concepts.len())
}

pub async fn insert_one(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept: &NewConcept,
) -> Result<String, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO learning_progress (
            id, user_id, concept_name, concept_description, difficulty_level,
            is_completed, order_index
        )
        VALUES ($1, $2, $3, $4, $5, FALSE, $6)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&concept.concept_name)
    .bind(&concept.concept_description)
    .bind(concept.difficulty_level)
    .bind(concept.order_index)
    .execute(proxy.pool())
    .await?;
    Ok(id)
}

pub async fn update_description(
    proxy: &DatabaseProxy,
    concept_id: &str,
    description: &str,
    difficulty_level: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE learning_progress
        SET concept_description = $2, difficulty_level = $3
        WHERE id = $1
        "#,
    )
    .bind(concept_id)
    .bind(description)
    .bind(difficulty_level)
    .execute(proxy.pool())
    .await?;
    Ok(())
}

/// Completed is terminal: a second call matches no rows and reports false,
/// which the route treats as a no-op rather than an error.
pub async fn mark_completed(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE learning_progress
        SET is_completed = TRUE, completed_at = NOW()
        WHERE id = $1 AND user_id = $2 AND is_completed = FALSE
        "#,
    )
    .bind(concept_id)
    .bind(user_id)
    .execute(proxy.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn find_by_id(
    proxy: &DatabaseProxy,
    user_id: &str,
    concept_id: &str,
) -> Result<Option<ConceptRow>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, concept_name, concept_description, difficulty_level,
               is_completed, order_index, created_at, completed_at
        FROM learning_progress
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(concept_id)
    .bind(user_id)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_concept).transpose()
}
