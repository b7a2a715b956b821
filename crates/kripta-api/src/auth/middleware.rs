//! Axum용 JWT 인증 추출기.
//!
//! 토큰은 `Authorization: Bearer <token>` 헤더를 우선으로 읽고,
//! 헤더가 없으면 세션 쿠키에서 읽습니다.

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use kripta_core::{AuthConfig, Role, DEV_JWT_SECRET};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;

use super::jwt::{decode_token, Claims, JwtError};

/// 기본 세션 쿠키 이름.
pub const DEFAULT_SESSION_COOKIE: &str = "kripta_session";

/// JWT 인증 추출기.
///
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(claims): JwtAuth,
/// ) -> impl IntoResponse {
///     format!("Authenticated subject: {}", claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("권한이 부족합니다")]
    InsufficientPermission,
}

impl JwtAuthError {
    /// 에러 코드와 HTTP 상태.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            JwtAuthError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            JwtAuthError::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "INVALID_AUTH_HEADER"),
            JwtAuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            JwtAuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            JwtAuthError::InsufficientPermission => {
                (StatusCode::FORBIDDEN, "INSUFFICIENT_PERMISSION")
            }
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(json!({
            "code": code,
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().timestamp(),
        }));

        (status, body).into_response()
    }
}

/// JWT 검증 설정.
///
/// 라우터에 `Extension`으로 주입되며, 없으면 `JWT_SECRET` 환경 변수
/// 또는 개발용 기본 시크릿을 사용합니다.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: SecretString,
    pub cookie_name: String,
}

impl JwtConfig {
    /// auth 설정에서 생성합니다.
    pub fn from_settings(settings: &AuthConfig) -> Self {
        Self {
            secret: settings.jwt_secret.clone(),
            cookie_name: settings.cookie_name.clone(),
        }
    }

    fn fallback() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());
        Self {
            secret: SecretString::new(secret.into()),
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
        }
    }
}

/// 요청 헤더에서 세션 토큰을 찾습니다.
///
/// Authorization 헤더가 있으면 Bearer 형식이어야 합니다.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, JwtAuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let header = value.to_str().map_err(|_| JwtAuthError::InvalidAuthHeader)?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(JwtAuthError::InvalidAuthHeader)?;
        return Ok(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
        .ok_or(JwtAuthError::MissingToken)
}

impl<S> FromRequestParts<S> for JwtAuth
where
    S: Send + Sync,
{
    type Rejection = JwtAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<JwtConfig>()
            .cloned()
            .unwrap_or_else(JwtConfig::fallback);

        let token = session_token(&parts.headers, &config.cookie_name)?;

        let token_data =
            decode_token(&token, config.secret.expose_secret()).map_err(|e| match e {
                JwtError::TokenExpired => JwtAuthError::TokenExpired,
                _ => JwtAuthError::InvalidToken,
            })?;

        Ok(JwtAuth(token_data.claims))
    }
}

/// 최소 역할을 요구합니다.
pub fn require_role(required_role: Role, role: Role) -> Result<(), JwtAuthError> {
    if role.level() >= required_role.level() {
        Ok(())
    } else {
        Err(JwtAuthError::InsufficientPermission)
    }
}

/// 선택적 JWT 인증 추출기.
///
/// 토큰이 없거나 유효하지 않으면 None을 반환합니다.
#[derive(Debug, Clone)]
pub struct OptionalJwtAuth(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalJwtAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match JwtAuth::from_request_parts(parts, state).await {
            Ok(JwtAuth(claims)) => Ok(OptionalJwtAuth(Some(claims))),
            Err(_) => Ok(OptionalJwtAuth(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_require_role() {
        assert!(require_role(Role::Admin, Role::Admin).is_ok());
        assert!(require_role(Role::User, Role::Admin).is_ok());
        assert!(require_role(Role::User, Role::User).is_ok());
        assert!(require_role(Role::Admin, Role::User).is_err());
    }

    #[test]
    fn test_session_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(session_token(&headers, "kripta_session").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_session_token_rejects_non_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            session_token(&headers, "kripta_session"),
            Err(JwtAuthError::InvalidAuthHeader)
        ));
    }

    #[test]
    fn test_session_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; kripta_session=tok123; lang=en"),
        );
        assert_eq!(session_token(&headers, "kripta_session").unwrap(), "tok123");
    }

    #[test]
    fn test_session_token_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(matches!(
            session_token(&headers, "kripta_session"),
            Err(JwtAuthError::MissingToken)
        ));
        assert!(matches!(
            session_token(&HeaderMap::new(), "kripta_session"),
            Err(JwtAuthError::MissingToken)
        ));
    }

    #[test]
    fn test_jwt_auth_error_responses() {
        let errors = vec![
            JwtAuthError::MissingToken,
            JwtAuthError::InvalidAuthHeader,
            JwtAuthError::TokenExpired,
            JwtAuthError::InvalidToken,
            JwtAuthError::InsufficientPermission,
        ];

        for error in errors {
            let response = error.into_response();
            let status = response.status();

            match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {}
                _ => panic!("Unexpected status code: {}", status),
            }
        }
    }
}
