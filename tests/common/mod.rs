use axum::Router;

pub async fn create_test_app() -> Router {
    std::env::set_var("DATABASE_URL", "");
    std::env::set_var("GEMINI_API_KEY", "");
    std::env::set_var("JWT_SECRET", "test-secret");

    acharya_backend::create_app().await
}
