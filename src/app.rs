use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full HTTP surface of the service. CORS is layered on by the caller.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        // Phone OTP
        .route("/send-otp", post(auth::send_otp))
        .route("/validate-otp", post(auth::validate_otp))
        .route("/register", post(auth::register))
        // SSO
        .route("/login-with-sso", post(auth::login_with_sso))
        .route("/register-with-sso", post(auth::register_with_sso))
        // Password
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/user-details", get(auth::user_details))
        .route("/update-username", put(auth::update_username))
        .route("/update-email", put(auth::update_email))
        .route("/update-phone", put(auth::update_phone))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "User accounts API",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "otp": "/send-otp, /validate-otp, /register (public)",
            "sso": "/login-with-sso, /register-with-sso (public)",
            "password": "/signup, /login, /forgot-password, /reset-password (public)",
            "account": "/user-details, /update-username, /update-email, /update-phone (bearer token)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.users.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "message": "ok",
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "message": "database unavailable",
                    "status": "degraded",
                    "timestamp": now
                })),
            )
        }
    }
}
