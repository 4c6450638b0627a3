use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::db::operations::to_iso;
use crate::db::DatabaseProxy;

#[derive(Debug, Clone, Serialize)]
pub struct PlatformRow {
    pub id: String,
    pub user_id: String,
    pub platform: String,
    pub username: String,
    pub contest_rank: i32,
    pub star_rating: i32,
    pub current_division: String,
    pub goal: String,
    pub last_updated: String,
}

#[derive(Debug, Clone)]
pub struct PlatformUpdate {
    pub username: String,
    pub contest_rank: i32,
    pub star_rating: i32,
    pub current_division: String,
    pub goal: String,
}

fn map_platform(row: &sqlx::postgres::PgRow) -> Result<PlatformRow, sqlx::Error> {
    let last_updated: NaiveDateTime = row.try_get("last_updated")?;

    Ok(PlatformRow {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        platform: row.try_get("platform")?,
        username: row.try_get("username")?,
        contest_rank: row.try_get("contest_rank")?,
        star_rating: row.try_get("star_rating")?,
        current_division: row.try_get("current_division")?,
        goal: row.try_get("goal")?,
        last_updated: to_iso(last_updated),
    })
}

pub async fn list_for_user(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Vec<PlatformRow>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, platform, username, contest_rank, star_rating,
               current_division, goal, last_updated
        FROM coding_platforms
        WHERE user_id = $1
        ORDER BY platform ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_platform).collect()
}

pub async fn upsert(
    proxy: &DatabaseProxy,
    user_id: &str,
    platform: &str,
    update: &PlatformUpdate,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO coding_platforms (
            id, user_id, platform, username, contest_rank, star_rating,
            current_division, goal, last_updated
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        ON CONFLICT (user_id, platform) DO UPDATE SET
            username = EXCLUDED.username,
            contest_rank = EXCLUDED.contest_rank,
            star_rating = EXCLUDED.star_rating,
            current_division = EXCLUDED.current_division,
            goal = EXCLUDED.goal,
            last_updated = NOW()
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(platform)
    .bind(&update.username)
    .bind(update.contest_rank)
    .bind(update.star_rating)
    .bind(&update.current_division)
    .bind(&update.goal)
    .execute(proxy.pool())
    .await?;
    Ok(())
}
