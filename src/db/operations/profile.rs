use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::Row;

use crate::db::operations::to_iso;
use crate::db::DatabaseProxy;
use crate::services::assessment::Category;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub learning_level: Option<String>,
    pub coding_level: i32,
    pub goal_description: String,
    pub social_feeds: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct LoginRecord {
    pub id: String,
    pub password_hash: String,
}

fn map_profile(row: &sqlx::postgres::PgRow) -> Result<Profile, sqlx::Error> {
    let created_at: NaiveDateTime = row.try_get("created_at")?;
    let updated_at: NaiveDateTime = row.try_get("updated_at")?;

    Ok(Profile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        learning_level: row.try_get("learning_level")?,
        coding_level: row.try_get("coding_level")?,
        goal_description: row.try_get("goal_description")?,
        social_feeds: row.try_get("social_feeds")?,
        created_at: to_iso(created_at),
        updated_at: to_iso(updated_at),
    })
}

pub async fn find_by_id(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, email, name, learning_level, coding_level, goal_description,
               social_feeds, created_at, updated_at
        FROM profiles
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_profile).transpose()
}

pub async fn find_login_by_email(
    proxy: &DatabaseProxy,
    email: &str,
) -> Result<Option<LoginRecord>, sqlx::Error> {
    let row = sqlx::query("SELECT id, password_hash FROM profiles WHERE email = $1")
        .bind(email)
        .fetch_optional(proxy.pool())
        .await?;

    row.map(|r| {
        Ok(LoginRecord {
            id: r.try_get("id")?,
            password_hash: r.try_get("password_hash")?,
        })
    })
    .transpose()
}

pub async fn email_exists(proxy: &DatabaseProxy, email: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 AS one FROM profiles WHERE email = $1")
        .bind(email)
        .fetch_optional(proxy.pool())
        .await?;
    Ok(row.is_some())
}

pub async fn get_learning_level(
    proxy: &DatabaseProxy,
    user_id: &str,
) -> Result<Option<Category>, sqlx::Error> {
    let level: Option<Option<String>> =
        sqlx::query_scalar("SELECT learning_level FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(proxy.pool())
            .await?;

    Ok(level.flatten().as_deref().and_then(Category::parse))
}

/// Last-write-wins: later quiz submissions replace the stored level.
pub async fn set_learning_level(
    proxy: &DatabaseProxy,
    user_id: &str,
    category: Category,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET learning_level = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(category.as_str())
        .execute(proxy.pool())
        .await?;
    Ok(())
}

pub struct ProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub goal_description: Option<&'a str>,
    pub coding_level: Option<i32>,
    pub social_feeds: Option<&'a serde_json::Value>,
}

pub async fn update_profile(
    proxy: &DatabaseProxy,
    user_id: &str,
    update: ProfileUpdate<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE profiles
        SET name = COALESCE($2, name),
            goal_description = COALESCE($3, goal_description),
            coding_level = COALESCE($4, coding_level),
            social_feeds = COALESCE($5, social_feeds),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(update.name)
    .bind(update.goal_description)
    .bind(update.coding_level)
    .bind(update.social_feeds)
    .execute(proxy.pool())
    .await?;
    Ok(())
}
