//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 거래소 비즈니스 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 비즈니스 메트릭 헬퍼 함수
// ============================================================================

/// 주문 카운터 증가.
///
/// `kind`는 `"limit"`(대기 주문) 또는 `"market"`(즉시 체결)입니다.
pub fn record_order(side: &str, kind: &str) {
    counter!(
        "exchange_orders_total",
        "side" => side.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 주문 취소 카운터 증가.
pub fn record_order_cancelled(side: &str) {
    counter!("exchange_orders_cancelled_total", "side" => side.to_string()).increment(1);
}

/// 입금 카운터 증가.
pub fn record_deposit(crypto_id: i64) {
    counter!("exchange_deposits_total", "crypto_id" => crypto_id.to_string()).increment(1);
}

/// 출금 카운터 증가.
pub fn record_withdrawal(crypto_id: i64) {
    counter!("exchange_withdrawals_total", "crypto_id" => crypto_id.to_string()).increment(1);
}

/// 체결 카운터 증가.
pub fn record_trade(side: &str) {
    counter!("exchange_trades_total", "side" => side.to_string()).increment(1);
}

/// 이메일 발송 결과 카운터 증가.
pub fn record_email(kind: &str, delivered: bool) {
    let name = if delivered {
        "exchange_emails_sent_total"
    } else {
        "exchange_emails_failed_total"
    };
    counter!(name, "kind" => kind.to_string()).increment(1);
}

/// 포트폴리오 스냅샷 저장 카운터 증가.
pub fn record_snapshots(count: u64) {
    counter!("exchange_portfolio_snapshots_total").increment(count);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 예: `/api/v1/trading/orders/42` → `/api/v1/trading/orders/:id`
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let is_uuid = segment.len() == 36 && segment.chars().filter(|c| *c == '-').count() == 4;
            let is_numeric = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_uuid || is_numeric {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        assert_eq!(
            normalize_path("/api/v1/trading/orders/12345"),
            "/api/v1/trading/orders/:id"
        );
    }

    #[test]
    fn test_normalize_path_uuid() {
        assert_eq!(
            normalize_path("/api/v1/market/data/123e4567-e89b-12d3-a456-426614174000"),
            "/api/v1/market/data/:id"
        );
    }

    #[test]
    fn test_normalize_path_no_params() {
        assert_eq!(normalize_path("/api/v1/wallet/portfolio"), "/api/v1/wallet/portfolio");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_business_helpers_without_recorder() {
        // 레코더가 없어도 no-op으로 동작해야 함
        record_order("sell", "limit");
        record_email("deposit", false);
        record_snapshots(3);
    }
}
