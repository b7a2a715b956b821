//! 거래 통계.

use kripta_core::{DecimalExt, Order, OrderSide, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주문 기반 거래 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TradingStatistics {
    pub total_orders: usize,
    pub total_buys: usize,
    pub total_sells: usize,
    /// 매수 수량 합계
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_buy_volume: Decimal,
    /// 매도 수량 합계
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_sell_volume: Decimal,
    /// 매수 주문 단가 평균
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub average_buy_price: Decimal,
    /// 매도 주문 단가 평균
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub average_sell_price: Decimal,
    /// 전체 주문 중 체결 완료 비율 (%)
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub success_rate: Decimal,
}

/// 주문 목록에서 거래 통계를 계산합니다.
pub fn calculate_trading_statistics(orders: &[Order]) -> TradingStatistics {
    let mut stats = TradingStatistics {
        total_orders: orders.len(),
        ..Default::default()
    };
    let mut buy_price_sum = Decimal::ZERO;
    let mut sell_price_sum = Decimal::ZERO;
    let mut filled = 0usize;

    for order in orders {
        match order.order_type {
            OrderSide::Buy => {
                stats.total_buys += 1;
                stats.total_buy_volume += order.quantity;
                buy_price_sum += order.price_per_unit;
            }
            OrderSide::Sell => {
                stats.total_sells += 1;
                stats.total_sell_volume += order.quantity;
                sell_price_sum += order.price_per_unit;
            }
        }
        if order.status == OrderStatus::Filled {
            filled += 1;
        }
    }

    stats.average_buy_price = buy_price_sum.safe_div(Decimal::from(stats.total_buys));
    stats.average_sell_price = sell_price_sum.safe_div(Decimal::from(stats.total_sells));
    stats.success_rate = Decimal::from(filled).percentage_of(Decimal::from(stats.total_orders));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(side: OrderSide, status: OrderStatus, qty: Decimal, price: Decimal) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            user_id: 1,
            crypto_id: 1,
            order_type: side,
            quantity: qty,
            price_per_unit: price,
            total_price: qty * price,
            status,
            filled_quantity: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_empty_orders() {
        let stats = calculate_trading_statistics(&[]);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.success_rate, Decimal::ZERO);
        assert_eq!(stats.average_buy_price, Decimal::ZERO);
    }

    #[test]
    fn test_mixed_orders() {
        let orders = vec![
            order(OrderSide::Buy, OrderStatus::Filled, dec!(1), dec!(100)),
            order(OrderSide::Buy, OrderStatus::Pending, dec!(3), dec!(200)),
            order(OrderSide::Sell, OrderStatus::Cancelled, dec!(0.5), dec!(300)),
            order(OrderSide::Sell, OrderStatus::Filled, dec!(1.5), dec!(500)),
        ];

        let stats = calculate_trading_statistics(&orders);
        assert_eq!(stats.total_buys, 2);
        assert_eq!(stats.total_sells, 2);
        assert_eq!(stats.total_buy_volume, dec!(4));
        assert_eq!(stats.total_sell_volume, dec!(2.0));
        assert_eq!(stats.average_buy_price, dec!(150));
        assert_eq!(stats.average_sell_price, dec!(400));
        assert_eq!(stats.success_rate, dec!(50));
    }
}
