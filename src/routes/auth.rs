use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::response::json_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    email: String,
    password: String,
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct AuthResponse {
    success: bool,
    user: AuthUser,
    token: String,
}

#[derive(Serialize)]
struct VerifyResponse {
    success: bool,
    user: AuthUser,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

fn is_valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    trimmed.len() >= 3 && trimmed.contains('@') && !trimmed.starts_with('@')
}

fn validate_password(password: &str) -> Option<&'static str> {
    if password.len() < 8 {
        return Some("Password must be at least 8 characters");
    }
    None
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    let email = payload.email.trim().to_lowercase();

    if !is_valid_email(&email) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Invalid email")
            .into_response();
    }

    if let Some(message) = validate_password(&payload.password) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message).into_response();
    }

    if payload.name.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Name is required")
            .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database unavailable",
        )
        .into_response();
    };

    match crate::db::operations::profile::email_exists(proxy.as_ref(), &email).await {
        Ok(true) => {
            return json_error(StatusCode::CONFLICT, "CONFLICT", "Email already registered")
                .into_response();
        }
        Ok(false) => {}
        Err(err) => {
            tracing::warn!(error = %err, "register email check failed");
            return internal_error();
        }
    }

    let password_hash = match bcrypt::hash(&payload.password, 10) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::warn!(error = %err, "password hash failed");
            return internal_error();
        }
    };

    let user_id = Uuid::new_v4().to_string();
    let (token, expires_at) = match crate::auth::sign_jwt_for_user(&user_id) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "jwt sign failed");
            return internal_error();
        }
    };

    let mut tx = match proxy.pool().begin().await {
        Ok(tx) => tx,
        Err(err) => {
            tracing::warn!(error = %err, "register tx begin failed");
            return internal_error();
        }
    };

    if let Err(err) = sqlx::query(
        "INSERT INTO profiles (id, email, password_hash, name) VALUES ($1, $2, $3, $4)",
    )
    .bind(&user_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(payload.name.trim())
    .execute(&mut *tx)
    .await
    {
        tracing::warn!(error = %err, "register profile insert failed");
        return internal_error();
    }

    if let Err(err) = sqlx::query(
        "INSERT INTO sessions (id, user_id, token, expires_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&user_id)
    .bind(crate::auth::hash_token(&token))
    .bind(expires_at)
    .execute(&mut *tx)
    .await
    {
        tracing::warn!(error = %err, "register session insert failed");
        return internal_error();
    }

    if let Err(err) = tx.commit().await {
        tracing::warn!(error = %err, "register tx commit failed");
        return internal_error();
    }

    (
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: AuthUser {
                id: user_id,
                email,
                name: payload.name.trim().to_string(),
            },
            token,
        }),
    )
        .into_response()
}

pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> Response {
    let email = payload.email.trim().to_lowercase();

    if !is_valid_email(&email) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Invalid email")
            .into_response();
    }

    if payload.password.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Password is required",
        )
        .into_response();
    }

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database unavailable",
        )
        .into_response();
    };

    let record =
        match crate::db::operations::profile::find_login_by_email(proxy.as_ref(), &email).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return json_error(
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Email not registered",
                )
                .into_response();
            }
            Err(err) => {
                tracing::warn!(error = %err, "login lookup failed");
                return internal_error();
            }
        };

    let password_ok = bcrypt::verify(&payload.password, &record.password_hash).unwrap_or(false);
    if !password_ok {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Incorrect password")
            .into_response();
    }

    let (token, expires_at) = match crate::auth::sign_jwt_for_user(&record.id) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "jwt sign failed");
            return internal_error();
        }
    };

    if let Err(err) =
        crate::auth::create_session(proxy.as_ref(), &record.id, &token, expires_at).await
    {
        tracing::warn!(error = %err, "login session insert failed");
        return internal_error();
    }

    let profile = match crate::db::operations::profile::find_by_id(proxy.as_ref(), &record.id).await
    {
        Ok(Some(profile)) => profile,
        _ => return internal_error(),
    };

    Json(AuthResponse {
        success: true,
        user: AuthUser {
            id: profile.id,
            email: profile.email,
            name: profile.name,
        },
        token,
    })
    .into_response()
}

pub async fn logout(State(state): State<AppState>, req: Request<Body>) -> Response {
    let token = crate::auth::extract_token(req.headers());
    let Some(token) = token else {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "No credential provided")
            .into_response();
    };

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database unavailable",
        )
        .into_response();
    };

    let token_hash = crate::auth::hash_token(&token);
    if let Err(err) = proxy.delete_session_by_token_hash(&token_hash).await {
        tracing::warn!(error = %err, "logout session delete failed");
        return internal_error();
    }

    Json(MessageResponse {
        success: true,
        message: "Signed out",
    })
    .into_response()
}

pub async fn verify(State(state): State<AppState>, req: Request<Body>) -> Response {
    let token = crate::auth::extract_token(req.headers());
    let Some(token) = token else {
        return json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "No credential provided")
            .into_response();
    };

    let Some(proxy) = state.db_proxy() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database unavailable",
        )
        .into_response();
    };

    match crate::auth::verify_request_token(proxy.as_ref(), &token).await {
        Ok(user) => Json(VerifyResponse {
            success: true,
            user,
        })
        .into_response(),
        Err(_) => json_error(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Session invalid or expired, please sign in again",
        )
        .into_response(),
    }
}

fn internal_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error",
    )
    .into_response()
}
