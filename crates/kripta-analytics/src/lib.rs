//! 포트폴리오 및 거래 분석.
//!
//! 이미 조회된 행들에 대한 순수 집계 함수를 제공합니다.
//! 데이터베이스나 네트워크에 접근하지 않습니다.
//!
//! - [`portfolio`]: 포트폴리오 평가액, 투자 원금, 수익률, 자산 배분
//! - [`valuation`]: 보유 자산 평가 및 스냅샷용 보유 내역
//! - [`performance`]: 체결된 매수 주문 기준 승률, 프로핏 팩터
//! - [`statistics`]: 매수/매도 건수, 거래량, 평균 단가, 체결률
//! - [`history`]: 스냅샷의 일 단위 평가액 추이

pub mod history;
pub mod performance;
pub mod portfolio;
pub mod statistics;
pub mod valuation;

use std::collections::HashMap;

use rust_decimal::Decimal;

pub use history::{
    bucket_daily, clamp_days_back, window_start, ValueHistoryPoint, DEFAULT_DAYS_BACK, MAX_DAYS_BACK,
};
pub use performance::{calculate_trade_performance, TradePerformance};
pub use portfolio::{calculate_portfolio_metrics, AssetAllocation, PortfolioMetrics};
pub use statistics::{calculate_trading_statistics, TradingStatistics};
pub use valuation::{summarize_holdings, value_holdings, HoldingValue, PortfolioSummary};

/// crypto_id → 현재 USD 가격.
pub type PriceMap = HashMap<i64, Decimal>;
