//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use kripta_core::{AppConfig, ExchangeError};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::auth::JwtConfig;
use crate::error::{api_error, ApiResult};

#[cfg(feature = "notifications")]
use kripta_notification::EmailService;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (PostgreSQL). 없으면 데이터 엔드포인트가 503을 반환합니다.
    pub db_pool: Option<PgPool>,

    /// 애플리케이션 설정
    pub config: AppConfig,

    /// 이메일 알림 서비스
    #[cfg(feature = "notifications")]
    pub email_service: EmailService,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 설정으로 새 AppState를 생성합니다. DB 풀은 [`with_db_pool`](Self::with_db_pool)로 연결합니다.
    pub fn new(config: AppConfig) -> Self {
        #[cfg(feature = "notifications")]
        let email_service = EmailService::from_settings(&config.email);

        Self {
            db_pool: None,
            config,
            #[cfg(feature = "notifications")]
            email_service,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 풀 설정.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 이메일 서비스 교체.
    #[cfg(feature = "notifications")]
    pub fn with_email_service(mut self, service: EmailService) -> Self {
        self.email_service = service;
        self
    }

    /// 연결 풀을 반환하거나 `DB_UNAVAILABLE`(503)로 거부합니다.
    pub fn require_db(&self) -> ApiResult<&PgPool> {
        self.db_pool
            .as_ref()
            .ok_or_else(|| api_error(ExchangeError::DbUnavailable))
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 체결 수수료율.
    pub fn fee_rate(&self) -> Decimal {
        self.config.trading.fee_rate
    }

    /// 인증 추출기가 사용하는 JWT 설정.
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::from_settings(&self.config.auth)
    }

    /// 관리자로 승격할 소유자 open id.
    pub fn owner_open_id(&self) -> Option<&str> {
        self.config.auth.owner_open_id.as_deref()
    }
}

/// 테스트용 JWT 시크릿.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// DB 없이 동작하는 테스트용 AppState.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = secrecy::SecretString::new(TEST_JWT_SECRET.into());
    config.rate_limit.disabled = true;
    AppState::new(config)
}
