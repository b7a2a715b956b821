//! Rate limiting middleware.
//!
//! 클라이언트 IP별 Token Bucket으로 요청 수를 제한합니다.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use kripta_core::RateLimitSettings;
use metrics::counter;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::ApiErrorResponse;

/// Rate Limiter 설정.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 버스트 허용량
    pub burst_size: u32,
    /// 유휴 버킷 정리 기준
    pub idle_timeout: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 1200,
            burst_size: 120,
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// 분당 요청 수로 생성합니다. 버스트는 10%.
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size: requests_per_minute / 10,
            ..Default::default()
        }
    }

    /// rate_limit 설정 섹션에서 생성합니다.
    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.requests_per_minute)
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    max_tokens: f64,
    /// 초당 리필 토큰 수
    refill_rate: f64,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let refill_rate = f64::from(config.requests_per_minute) / 60.0;
        let max_tokens = refill_rate + f64::from(config.burst_size);

        Self {
            tokens: max_tokens,
            last_refill: Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn retry_after_secs(&self) -> u64 {
        if self.tokens >= 1.0 || self.refill_rate <= 0.0 {
            1
        } else {
            ((1.0 - self.tokens) / self.refill_rate).ceil().max(1.0) as u64
        }
    }
}

/// IP별 Rate Limiter.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<HashMap<IpAddr, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 요청 허용 여부 확인.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        let mut buckets = self.buckets.write().await;
        let bucket = buckets
            .entry(ip)
            .or_insert_with(|| TokenBucket::new(&self.config));

        if bucket.try_acquire() {
            RateLimitResult::Allowed
        } else {
            RateLimitResult::Limited {
                retry_after: bucket.retry_after_secs(),
            }
        }
    }

    /// 유휴 버킷 정리.
    pub async fn cleanup(&self) {
        let threshold = Instant::now() - self.config.idle_timeout;
        self.buckets
            .write()
            .await
            .retain(|_, bucket| bucket.last_refill > threshold);
    }

    /// 추적 중인 IP 수.
    pub async fn tracked_ips(&self) -> usize {
        self.buckets.read().await.len()
    }
}

/// Rate Limit 확인 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Limited {
        /// 재시도까지 대기 시간 (초)
        retry_after: u64,
    },
}

/// Rate Limit 미들웨어 상태.
#[derive(Clone)]
pub struct RateLimitState {
    limiter: RateLimiter,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config),
        }
    }

    /// 유휴 버킷을 주기적으로 정리하는 작업을 시작합니다. 토큰이 취소되면 종료합니다.
    pub fn spawn_cleanup(&self, shutdown_token: CancellationToken) {
        let limiter = self.limiter.clone();
        let period = limiter.config.idle_timeout;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_token.cancelled() => break,
                    _ = ticker.tick() => limiter.cleanup().await,
                }
            }
        });
    }
}

/// Rate Limiting 미들웨어 함수.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    match state.limiter.check(ip).await {
        RateLimitResult::Allowed => {
            counter!("rate_limit_requests_total", "status" => "allowed").increment(1);
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            counter!("rate_limit_requests_total", "status" => "limited").increment(1);
            tracing::warn!(client_ip = %ip, retry_after, "Rate limit exceeded");

            let body = ApiErrorResponse::with_details(
                "RATE_LIMITED",
                "요청이 너무 많습니다. 잠시 후 다시 시도하세요",
                serde_json::json!({ "retryAfter": retry_after }),
            );
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
            response
        }
    }
}

/// 요청의 클라이언트 IP.
///
/// `X-Forwarded-For`의 첫 주소, `X-Real-IP`, 연결 정보 순으로 확인하고
/// 모두 없으면 루프백 주소를 사용합니다.
pub fn client_ip(request: &Request) -> IpAddr {
    let headers = request.headers();

    let forwarded: Option<IpAddr> = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());

    let real_ip = || -> Option<IpAddr> {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    };

    let peer = || -> Option<IpAddr> {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    };

    forwarded
        .or_else(real_ip)
        .or_else(peer)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn config(requests_per_minute: u32, burst_size: u32) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_minute,
            burst_size,
            idle_timeout: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn test_rate_limiter_limits_burst() {
        let limiter = RateLimiter::new(config(60, 5));
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        // 1 (초당) + 5 (버스트) = 6
        for i in 0..6 {
            assert_eq!(
                limiter.check(ip).await,
                RateLimitResult::Allowed,
                "request {i} should be allowed"
            );
        }

        assert!(matches!(
            limiter.check(ip).await,
            RateLimitResult::Limited { retry_after } if retry_after >= 1
        ));
    }

    #[tokio::test]
    async fn test_rate_limiter_separates_ips() {
        let limiter = RateLimiter::new(config(60, 0));
        let ip1: IpAddr = "10.0.0.1".parse().unwrap();
        let ip2: IpAddr = "10.0.0.2".parse().unwrap();

        assert_eq!(limiter.check(ip1).await, RateLimitResult::Allowed);
        assert!(matches!(limiter.check(ip1).await, RateLimitResult::Limited { .. }));
        assert_eq!(limiter.check(ip2).await, RateLimitResult::Allowed);
    }

    #[tokio::test]
    async fn test_rate_limiter_cleanup() {
        let limiter = RateLimiter::new(RateLimitConfig {
            idle_timeout: Duration::from_millis(10),
            ..config(60, 0)
        });
        let _ = limiter.check("10.0.0.1".parse().unwrap()).await;
        assert_eq!(limiter.tracked_ips().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_ips().await, 0);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = RateLimitSettings {
            requests_per_minute: 600,
            disabled: false,
        };
        let config = RateLimitConfig::from_settings(&settings);
        assert_eq!(config.requests_per_minute, 600);
        assert_eq!(config.burst_size, 60);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_client_ip_fallbacks() {
        let request = Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&request), "198.51.100.2".parse::<IpAddr>().unwrap());

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&request), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
