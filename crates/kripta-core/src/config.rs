//! 설정 관리.
//!
//! `config/default.toml`(선택)과 `KRIPTA__SECTION__KEY` 환경 변수에서
//! 애플리케이션 설정을 로드합니다.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

use crate::ledger::DEFAULT_TRADE_FEE_RATE;

/// 개발용 기본 JWT 시크릿. 운영 환경에서는 반드시 교체해야 합니다.
pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 이메일 설정
    pub email: EmailConfig,
    /// 거래 설정
    pub trading: TradingConfig,
    /// 분석 설정
    pub analytics: AnalyticsConfig,
    /// 요청 한도 설정
    pub rate_limit: RateLimitSettings,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 허용 CORS origin 목록 (비어 있으면 모든 origin 허용)
    pub cors_origins: Vec<String>,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL. 없으면 DB 기능이 비활성화됩니다.
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "kripta_api=info,tower_http=debug".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 세션 토큰 서명 키
    pub jwt_secret: SecretString,
    /// 관리자로 승격할 소유자 open id
    pub owner_open_id: Option<String>,
    /// 세션 쿠키 이름
    pub cookie_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(DEV_JWT_SECRET.into()),
            owner_open_id: None,
            cookie_name: "kripta_session".to_string(),
        }
    }
}

/// 이메일 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// 발송 활성화 여부
    pub enabled: bool,
    /// 메일 릴레이 HTTP API 주소
    pub api_url: Option<String>,
    /// 메일 릴레이 API 키
    pub api_key: Option<SecretString>,
    /// 발신 주소
    pub from_address: String,
    /// 발신자 표시 이름
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: None,
            api_key: None,
            from_address: "noreply@kripta.exchange".to_string(),
            from_name: "Kripta Asset Exchange".to_string(),
        }
    }
}

/// 거래 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// 체결 수수료율 (0.001 = 0.1%)
    pub fee_rate: Decimal,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_TRADE_FEE_RATE,
        }
    }
}

/// 분석 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// 포트폴리오 스냅샷 백그라운드 태스크 활성화
    pub snapshot_enabled: bool,
    /// 스냅샷 주기 (초)
    pub snapshot_interval_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            snapshot_enabled: true,
            snapshot_interval_secs: 60 * 60,
        }
    }
}

/// 요청 한도 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// IP당 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 비활성화 여부
    pub disabled: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: 1200,
            disabled: false,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일은 없어도 됩니다. 환경 변수 `KRIPTA__TRADING__FEE_RATE`처럼
    /// 섹션과 키를 `__`로 구분합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("trading.fee_rate", DEFAULT_TRADE_FEE_RATE.to_string())?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("KRIPTA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_legacy_env();
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// 접두사 없는 관례적 환경 변수를 반영합니다.
    ///
    /// `DATABASE_URL`, `JWT_SECRET`, `OWNER_OPEN_ID`, `EMAIL_FROM`,
    /// `CORS_ORIGINS`, `RATE_LIMIT_DISABLED`, `RATE_LIMIT_RPM`
    fn apply_legacy_env(&mut self) {
        if self.database.url.is_none() {
            self.database.url = std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if !secret.is_empty() {
                self.auth.jwt_secret = SecretString::new(secret.into());
            }
        }
        if self.auth.owner_open_id.is_none() {
            self.auth.owner_open_id = std::env::var("OWNER_OPEN_ID").ok().filter(|v| !v.is_empty());
        }
        if let Ok(from) = std::env::var("EMAIL_FROM") {
            if !from.is_empty() {
                self.email.from_address = from;
            }
        }
        if self.server.cors_origins.is_empty() {
            if let Ok(origins) = std::env::var("CORS_ORIGINS") {
                self.server.cors_origins = origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        }
        if let Ok(disabled) = std::env::var("RATE_LIMIT_DISABLED") {
            self.rate_limit.disabled = disabled == "true" || disabled == "1";
        }
        if let Some(rpm) = std::env::var("RATE_LIMIT_RPM")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.rate_limit.requests_per_minute = rpm;
        }
    }

    /// 소켓 주소 문자열 (`host:port`).
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.trading.fee_rate, dec!(0.001));
        assert_eq!(config.auth.cookie_name, "kripta_session");
        assert_eq!(config.email.from_address, "noreply@kripta.exchange");
        assert_eq!(config.auth.jwt_secret.expose_secret(), DEV_JWT_SECRET);
        assert_eq!(config.analytics.snapshot_interval_secs, 3600);
        assert_eq!(config.rate_limit.requests_per_minute, 1200);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.bind_address().split(':').count(), 2);
        assert!(config.trading.fee_rate > Decimal::ZERO);
    }
}
