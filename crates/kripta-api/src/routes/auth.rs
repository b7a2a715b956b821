//! 세션 endpoint.
//!
//! - `GET /api/v1/auth/me` - 현재 사용자 (없으면 `null`)
//! - `POST /api/v1/auth/logout` - 세션 쿠키 삭제

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use kripta_core::User;
use std::sync::Arc;

use super::SuccessResponse;
use crate::auth::MaybeCurrentUser;
use crate::state::AppState;

/// 현재 사용자 조회.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "현재 사용자 또는 null", body = User),
        (status = 503, description = "데이터베이스 없음", body = crate::error::ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn me(MaybeCurrentUser(user): MaybeCurrentUser) -> Json<Option<User>> {
    Json(user)
}

/// 세션 쿠키를 즉시 만료시키는 `Set-Cookie` 값.
pub fn clear_session_cookie(cookie_name: &str) -> String {
    format!("{cookie_name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// 로그아웃.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "세션 쿠키 삭제", body = SuccessResponse)),
    tag = "auth"
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&clear_session_cookie(&state.config.auth.cookie_name)) {
        headers.insert(SET_COOKIE, value);
    }

    (headers, Json(SuccessResponse::ok()))
}

/// 세션 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(me))
        .route("/logout", post(logout))
}
