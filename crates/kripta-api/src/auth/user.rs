//! 현재 사용자 추출기.
//!
//! 검증된 토큰의 `sub`(open id)로 사용자 행을 upsert하여
//! 핸들러에 [`User`]를 전달합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use kripta_core::{Role, User};

use super::jwt::Claims;
use super::middleware::{require_role, JwtAuth, JwtConfig};
use crate::error::api_error;
use crate::repository::{UserRepository, UserUpsert};
use crate::state::AppState;

/// 인증된 현재 사용자.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// 선택적 현재 사용자. 토큰이 없거나 유효하지 않으면 `None`.
#[derive(Debug, Clone)]
pub struct MaybeCurrentUser(pub Option<User>);

/// 관리자 역할을 가진 현재 사용자.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// 토큰 클레임으로 upsert 입력을 만듭니다.
fn upsert_from_claims(claims: &Claims, owner_open_id: Option<&str>) -> UserUpsert {
    UserUpsert {
        open_id: claims.sub.clone(),
        name: claims.name.clone(),
        email: claims.email.clone(),
        login_method: claims.login_method.clone(),
        promote_to_admin: owner_open_id.is_some_and(|owner| owner == claims.sub),
    }
}

/// 라우터에 JWT 설정이 주입되지 않았으면 상태의 설정을 사용합니다.
fn ensure_jwt_config(parts: &mut Parts, state: &AppState) {
    if parts.extensions.get::<JwtConfig>().is_none() {
        parts.extensions.insert(state.jwt_config());
    }
}

async fn resolve_user(state: &AppState, claims: &Claims) -> Result<User, Response> {
    let pool = state.require_db().map_err(IntoResponse::into_response)?;

    let user = UserRepository::upsert(pool, &upsert_from_claims(claims, state.owner_open_id()))
        .await
        .map_err(|e| api_error(e).into_response())?;

    tracing::debug!(user_id = user.id, role = %user.role, "Session user resolved");
    Ok(user)
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        ensure_jwt_config(parts, state);

        let JwtAuth(claims) = JwtAuth::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        resolve_user(state, &claims).await.map(CurrentUser)
    }
}

impl FromRequestParts<Arc<AppState>> for MaybeCurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        ensure_jwt_config(parts, state);

        match JwtAuth::from_request_parts(parts, state).await {
            Ok(JwtAuth(claims)) => resolve_user(state, &claims)
                .await
                .map(|user| MaybeCurrentUser(Some(user))),
            Err(_) => Ok(MaybeCurrentUser(None)),
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if let Err(e) = require_role(Role::Admin, user.role) {
            tracing::warn!(user_id = user.id, "Admin route denied");
            return Err(e.into_response());
        }

        Ok(AdminUser(user))
    }
}
