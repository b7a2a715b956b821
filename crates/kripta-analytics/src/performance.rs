//! 거래 성과 지표.
//!
//! 체결된 매수 주문을 현재 시세로 평가합니다:
//! - 손익: `(현재가 − 매수 단가) × 수량`
//! - 손익 > 0 이면 수익 거래, 그 외(0 포함)는 손실 거래
//! - 승률: 수익 거래 / 전체 × 100
//! - 프로핏 팩터: 총 수익 / 총 손실 (손실이 0이면 0)

use kripta_core::{DecimalExt, Order, OrderSide, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PriceMap;

/// 거래 성과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TradePerformance {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub win_rate: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub average_win: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub average_loss: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub profit_factor: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_profit: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_loss: Decimal,
}

/// 거래 성과를 계산합니다.
///
/// 현재 시세가 없는 암호화폐의 주문은 집계하지 않습니다.
pub fn calculate_trade_performance(orders: &[Order], prices: &PriceMap) -> TradePerformance {
    let mut perf = TradePerformance::default();

    for order in orders {
        if order.order_type != OrderSide::Buy || order.status != OrderStatus::Filled {
            continue;
        }
        let Some(&current) = prices.get(&order.crypto_id) else {
            continue;
        };

        let pnl = (current - order.price_per_unit) * order.quantity;
        if pnl > Decimal::ZERO {
            perf.winning_trades += 1;
            perf.total_profit += pnl;
        } else {
            perf.losing_trades += 1;
            perf.total_loss += pnl.abs();
        }
    }

    perf.total_trades = perf.winning_trades + perf.losing_trades;
    perf.win_rate = Decimal::from(perf.winning_trades).percentage_of(Decimal::from(perf.total_trades));
    perf.average_win = perf.total_profit.safe_div(Decimal::from(perf.winning_trades));
    perf.average_loss = perf.total_loss.safe_div(Decimal::from(perf.losing_trades));
    perf.profit_factor = perf.total_profit.safe_div(perf.total_loss);
    perf
}
