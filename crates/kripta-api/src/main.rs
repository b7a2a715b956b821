//! Kripta 거래소 API 서버.
//!
//! 설정을 로드하고 Axum REST API 서버를 시작합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, middleware, routing::get, Extension, Router};
use kripta_core::{init_logging, AppConfig, LogConfig, ServerConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use kripta_api::metrics::setup_metrics_recorder;
use kripta_api::middleware::{
    metrics_layer, rate_limit_middleware, RateLimitConfig, RateLimitState,
};
use kripta_api::openapi::{openapi_spec, swagger_ui_router};
use kripta_api::routes::create_api_router;
use kripta_api::state::AppState;
use kripta_api::tasks::{start_snapshot_task, SnapshotTaskConfig};

/// 데이터베이스에 연결합니다.
///
/// URL이 없거나 연결에 실패하면 `None`을 반환하고, 데이터 엔드포인트는 503으로 응답합니다.
async fn connect_database(config: &AppConfig) -> Option<PgPool> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("DATABASE_URL not set, data endpoints will return DB_UNAVAILABLE");
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return None;
        }
    };

    // 연결 테스트
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => {
            info!("Connected to PostgreSQL successfully");
            Some(pool)
        }
        Err(e) => {
            error!(error = %e, "Failed to verify database connection");
            None
        }
    }
}

/// CORS 레이어 생성.
///
/// `server.cors_origins`가 비어 있으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer(settings: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let restricted = !origins.is_empty();
    let allow_origin = if restricted {
        info!("CORS configured with {} allowed origins", origins.len());
        AllowOrigin::list(origins)
    } else {
        warn!("CORS origins not set, allowing any origin (development mode)");
        AllowOrigin::any()
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        // 세션 쿠키는 origin이 지정된 경우에만 허용
        .allow_credentials(restricted)
        .max_age(Duration::from_secs(3600))
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    shutdown_token: &CancellationToken,
) -> Router {
    // 메트릭 라우터 (별도 상태, Rate Limit 제외)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let cors = cors_layer(&state.config.server);
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let jwt_config = state.jwt_config();
    let rate_limit = state.config.rate_limit.clone();

    let api_router = create_api_router()
        .with_state(state)
        .layer(Extension(jwt_config));

    // API 라우터 (Rate Limit 조건부 적용)
    let api_router = if rate_limit.disabled {
        info!("Rate limiting DISABLED");
        api_router
    } else {
        let config = RateLimitConfig::from_settings(&rate_limit);
        info!(
            requests_per_minute = config.requests_per_minute,
            "Rate limiting configured"
        );
        let rate_limit_state = RateLimitState::new(config);
        rate_limit_state.spawn_cleanup(shutdown_token.clone());
        api_router.layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        ))
    };

    Router::new()
        .merge(metrics_router)
        .merge(api_router)
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(cors)
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if !(export_flag || export_env) {
        return Ok(false);
    }

    let json = serde_json::to_string_pretty(&openapi_spec())?;
    println!("{}", json);
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    if handle_export_openapi()? {
        return Ok(());
    }

    let config_path =
        std::env::var("KRIPTA_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path}"))?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!("Starting Kripta API server...");

    let metrics_handle =
        setup_metrics_recorder().context("failed to install Prometheus recorder")?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = config.bind_address().parse().with_context(|| {
        format!(
            "invalid bind address {}, check server.host and server.port",
            config.bind_address()
        )
    })?;

    let db_pool = connect_database(&config).await;
    let snapshot_config = SnapshotTaskConfig::from_settings(&config.analytics);

    let mut state = AppState::new(config);
    if let Some(pool) = db_pool.clone() {
        state = state.with_db_pool(pool);
    }
    let state = Arc::new(state);

    info!(version = %state.version, has_db = state.db_pool.is_some(), "Application state initialized");

    // 전역 종료 토큰 (백그라운드 태스크에 종료 전파)
    let shutdown_token = CancellationToken::new();

    if let Some(pool) = db_pool {
        start_snapshot_task(pool, snapshot_config, shutdown_token.clone());
    }

    let app = create_router(state, metrics_handle, &shutdown_token);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
    .await?;

    shutdown_token.cancel();
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
