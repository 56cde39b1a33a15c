use axum::{extract::State, Extension, Json};

use crate::database::UserProfile;
use crate::error::{ApiError, ApiResult};
use crate::handlers::types::UserResponse;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /user-details - Profile of the account named by the bearer token
///
/// Expected Output:
/// ```json
/// {
///   "message": "User details retrieved successfully",
///   "user": { "username": "al", "email": "a@x.com", "phone_number": "1", "dob": "", "location": "" }
/// }
/// ```
pub async fn user_details(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .find_by_username(&auth.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        message: "User details retrieved successfully".to_string(),
        user: UserProfile::from(&user),
    }))
}
