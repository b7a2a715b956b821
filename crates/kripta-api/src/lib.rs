//! Kripta 거래소 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 세션 인증 (Bearer 헤더 또는 세션 쿠키)
//! - 지갑/주문 변경을 위한 트랜잭션 서비스 계층
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 인증 및 현재 사용자 추출
//! - [`repository`]: PostgreSQL 행 매핑과 쿼리
//! - [`services`]: 잔고 변경 트랜잭션
//! - [`tasks`]: 백그라운드 작업 (포트폴리오 스냅샷)
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod tasks;

pub use auth::{Claims, CurrentUser, JwtAuth, JwtAuthError};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::*;
pub use state::AppState;
pub use tasks::start_snapshot_task;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
