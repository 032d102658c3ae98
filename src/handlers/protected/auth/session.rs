use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, SessionUser};

/// GET /api/auth/me - The authenticated usuario as currently stored
pub async fn me(Extension(user): Extension<SessionUser>) -> ApiResult<SessionUser> {
    Ok(ApiResponse::success(user))
}
