//! JWT 토큰 처리.
//!
//! 세션 토큰 생성/검증 로직. 토큰은 HS256으로 서명됩니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use kripta_core::Role;
use serde::{Deserialize, Serialize};

/// 세션 JWT 페이로드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 인증 제공자의 open id
    pub sub: String,
    /// 표시 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 이메일 주소
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 로그인 방식 (예: "google", "email")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_method: Option<String>,
    /// 사용자 역할
    #[serde(default)]
    pub role: Role,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `open_id` - 인증 제공자의 사용자 식별자
    /// * `role` - 사용자 역할
    /// * `expires_in_minutes` - 만료 시간 (분)
    pub fn new(open_id: impl Into<String>, role: Role, expires_in_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: open_id.into(),
            name: None,
            email: None,
            login_method: None,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(expires_in_minutes)).timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// 표시 이름 설정.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 이메일 설정.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// 로그인 방식 설정.
    pub fn with_login_method(mut self, method: impl Into<String>) -> Self {
        self.login_method = Some(method.into());
        self
    }

    /// 토큰이 만료되었는지 확인.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("토큰 디코딩 실패")]
    DecodingError,
    #[error("토큰이 만료되었습니다")]
    TokenExpired,
    #[error("잘못된 토큰 형식")]
    InvalidToken,
}

/// 세션 토큰 생성.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::from)
}

/// 세션 토큰 디코딩 및 검증.
pub fn decode_token(token: &str, secret: &str) -> Result<TokenData<Claims>, JwtError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => JwtError::InvalidToken,
        _ => JwtError::DecodingError,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    #[test]
    fn test_create_and_decode_token() {
        let claims = Claims::new("oid-123", Role::User, 60)
            .with_name("Alice")
            .with_email("alice@example.com")
            .with_login_method("google");

        let token = create_token(&claims, TEST_SECRET).unwrap();
        let decoded = decode_token(&token, TEST_SECRET).unwrap();

        assert_eq!(decoded.claims.sub, "oid-123");
        assert_eq!(decoded.claims.name.as_deref(), Some("Alice"));
        assert_eq!(decoded.claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(decoded.claims.role, Role::User);
        assert!(decoded.claims.jti.is_some());
    }

    #[test]
    fn test_expired_token() {
        // 기본 leeway(60초)보다 충분히 과거
        let claims = Claims::new("oid-123", Role::User, -10);
        assert!(claims.is_expired());

        let token = create_token(&claims, TEST_SECRET).unwrap();
        assert!(matches!(
            decode_token(&token, TEST_SECRET),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        assert!(decode_token("invalid.token.here", TEST_SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let claims = Claims::new("oid-123", Role::Admin, 60);
        let token = create_token(&claims, TEST_SECRET).unwrap();

        let result = decode_token(&token, "wrong-secret-key-for-testing-minimum-32-chars");
        assert!(result.is_err());
    }

    #[test]
    fn test_role_defaults_to_user() {
        let claims: Claims = serde_json::from_value(serde_json::json!({
            "sub": "oid-1",
            "iat": 0,
            "exp": 1,
        }))
        .unwrap();
        assert_eq!(claims.role, Role::User);
    }
}
