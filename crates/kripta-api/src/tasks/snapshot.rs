//! 포트폴리오 스냅샷 백그라운드 작업.
//!
//! 평가액 추이(`value-history`)는 이 작업이 남긴 스냅샷으로 계산됩니다.

use std::time::Duration;

use kripta_core::AnalyticsConfig;
use sqlx::PgPool;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::metrics::record_snapshots;
use crate::services::record_all_snapshots;

/// 서버 초기화 후 첫 실행까지 대기 시간.
const STARTUP_DELAY: Duration = Duration::from_secs(10);

/// 최소 실행 주기.
const MIN_INTERVAL: Duration = Duration::from_secs(60);

/// 스냅샷 작업 설정.
#[derive(Debug, Clone)]
pub struct SnapshotTaskConfig {
    /// 실행 주기 (기본: 1시간)
    pub interval: Duration,
    pub enabled: bool,
}

impl Default for SnapshotTaskConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            enabled: true,
        }
    }
}

impl SnapshotTaskConfig {
    /// analytics 설정 섹션에서 생성합니다. 주기는 최소 60초로 보정합니다.
    pub fn from_settings(settings: &AnalyticsConfig) -> Self {
        Self {
            interval: Duration::from_secs(settings.snapshot_interval_secs).max(MIN_INTERVAL),
            enabled: settings.snapshot_enabled,
        }
    }
}

/// 스냅샷 작업을 시작합니다. 비활성화되어 있으면 아무것도 하지 않습니다.
pub fn start_snapshot_task(
    pool: PgPool,
    config: SnapshotTaskConfig,
    shutdown_token: CancellationToken,
) {
    if !config.enabled {
        info!("Portfolio snapshot task disabled");
        return;
    }

    tokio::spawn(async move {
        info!(interval_secs = config.interval.as_secs(), "Portfolio snapshot task started");

        tokio::select! {
            _ = tokio::time::sleep(STARTUP_DELAY) => {}
            _ = shutdown_token.cancelled() => {
                info!("Snapshot task: shutdown received during startup");
                return;
            }
        }

        run_snapshot_batch(&pool).await;

        let mut ticker = interval(config.interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => run_snapshot_batch(&pool).await,
                _ = shutdown_token.cancelled() => {
                    info!("Snapshot task: shutdown received");
                    break;
                }
            }
        }

        info!("Portfolio snapshot task stopped");
    });
}

async fn run_snapshot_batch(pool: &PgPool) {
    match record_all_snapshots(pool).await {
        Ok(count) => {
            record_snapshots(count as u64);
            info!(count, "Portfolio snapshot batch completed");
        }
        Err(e) => error!(error = %e, "Portfolio snapshot batch failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings_clamps_interval() {
        let settings = AnalyticsConfig {
            snapshot_enabled: true,
            snapshot_interval_secs: 5,
        };
        let config = SnapshotTaskConfig::from_settings(&settings);
        assert_eq!(config.interval, MIN_INTERVAL);
        assert!(config.enabled);
    }

    #[test]
    fn test_default_is_hourly() {
        assert_eq!(SnapshotTaskConfig::default().interval, Duration::from_secs(3600));
    }
}
