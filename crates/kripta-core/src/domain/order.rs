//! 주문 타입.
//!
//! - `OrderSide` - 주문 방향 (매수/매도)
//! - `OrderStatus` - 주문 상태
//! - `Order` - 주문 엔티티

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderSide {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(ExchangeError::Data(format!("알 수 없는 주문 방향: {other}"))),
        }
    }
}

/// 주문 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// 접수됨 (미체결)
    Pending,
    /// 전량 체결
    Filled,
    /// 부분 체결
    Partial,
    /// 취소됨
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Filled => "filled",
            OrderStatus::Partial => "partial",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// 더 이상 상태가 바뀌지 않는 주문인지 확인합니다.
    pub fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "filled" => Ok(OrderStatus::Filled),
            "partial" => Ok(OrderStatus::Partial),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ExchangeError::Data(format!("알 수 없는 주문 상태: {other}"))),
        }
    }
}

/// 주문 엔티티.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub crypto_id: i64,
    pub order_type: OrderSide,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub quantity: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub price_per_unit: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_price: Decimal,
    pub status: OrderStatus,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub filled_quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    /// 아직 체결되지 않은 수량.
    pub fn unfilled_quantity(&self) -> Decimal {
        (self.quantity - self.filled_quantity).max(Decimal::ZERO)
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// `user_id`가 이 주문을 취소할 때 해제할 잠금 수량.
    ///
    /// 소유자가 아니면 `Forbidden`, 이미 체결/취소된 주문이면
    /// `OrderNotCancellable`. 매수 주문은 잠금이 없으므로 0입니다.
    pub fn cancellation_release(&self, user_id: i64) -> ExchangeResult<Decimal> {
        if !self.is_owned_by(user_id) {
            return Err(ExchangeError::Forbidden(format!("order {}", self.id)));
        }
        if self.status.is_closed() {
            return Err(ExchangeError::OrderNotCancellable {
                order_id: self.id,
                status: self.status.to_string(),
            });
        }
        Ok(match self.order_type {
            OrderSide::Sell => self.unfilled_quantity(),
            OrderSide::Buy => Decimal::ZERO,
        })
    }
}
