//! 서비스 계층.
//!
//! 잔고를 변경하는 작업은 모두 하나의 데이터베이스 트랜잭션 안에서
//! 지갑 행을 `FOR UPDATE`로 잠근 뒤 잔고 갱신과 원장 기록을 수행합니다.

pub mod snapshot;
pub mod trading;
pub mod wallet;

use std::collections::HashMap;

use kripta_analytics::PriceMap;
use kripta_core::MarketData;

pub use snapshot::{record_snapshot, record_all_snapshots};
pub use trading::{cancel_order, execute_trade, place_order, OrderRequest, TradeExecution};
pub use wallet::{deposit, withdraw};

/// crypto_id → 시세 행 목록에서 USD 가격 맵을 만듭니다.
pub fn price_map(markets: &HashMap<i64, MarketData>) -> PriceMap {
    markets
        .iter()
        .map(|(crypto_id, market)| (*crypto_id, market.price_usd))
        .collect()
}

/// 시세 행을 crypto_id로 색인합니다.
pub fn index_markets(markets: Vec<MarketData>) -> HashMap<i64, MarketData> {
    markets
        .into_iter()
        .map(|market| (market.crypto_id, market))
        .collect()
}
