//! 주문 저장소.
//!
//! 주문 생성, 조회, 취소를 위한 데이터베이스 작업을 처리합니다.

use chrono::{DateTime, Utc};
use kripta_core::{
    ledger, parse_stored_decimal, ExchangeError, ExchangeResult, Order, OrderSide, OrderStatus,
};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgExecutor};

use super::convert_all;

/// orders 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub user_id: i64,
    pub crypto_id: i64,
    pub order_type: String,
    pub quantity: String,
    pub price_per_unit: String,
    pub total_price: String,
    pub status: String,
    pub filled_quantity: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = ExchangeError;

    fn try_from(r: OrderRecord) -> Result<Self, Self::Error> {
        Ok(Order {
            id: r.id,
            user_id: r.user_id,
            crypto_id: r.crypto_id,
            order_type: r.order_type.parse::<OrderSide>()?,
            quantity: parse_stored_decimal("orders.quantity", &r.quantity)?,
            price_per_unit: parse_stored_decimal("orders.price_per_unit", &r.price_per_unit)?,
            total_price: parse_stored_decimal("orders.total_price", &r.total_price)?,
            status: r.status.parse::<OrderStatus>()?,
            filled_quantity: parse_stored_decimal("orders.filled_quantity", &r.filled_quantity)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
            cancelled_at: r.cancelled_at,
        })
    }
}

/// 새 주문 입력.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub crypto_id: i64,
    pub order_type: OrderSide,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub status: OrderStatus,
    pub filled_quantity: Decimal,
}

impl NewOrder {
    /// 합계 금액 (`quantity × price_per_unit`). 범위를 넘으면 `InvalidInput`.
    pub fn total_price(&self) -> ExchangeResult<Decimal> {
        ledger::order_total(self.quantity, self.price_per_unit)
    }
}

const COLUMNS: &str = "id, user_id, crypto_id, order_type, quantity, price_per_unit, total_price, \
                       status, filled_quantity, created_at, updated_at, cancelled_at";

/// 주문 저장소.
pub struct OrderRepository;

impl OrderRepository {
    /// 주문 생성.
    pub async fn insert<'e>(executor: impl PgExecutor<'e>, input: &NewOrder) -> ExchangeResult<Order> {
        let total_price = input.total_price()?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            INSERT INTO orders (
                user_id, crypto_id, order_type, quantity, price_per_unit,
                total_price, status, filled_quantity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(input.user_id)
        .bind(input.crypto_id)
        .bind(input.order_type.as_str())
        .bind(input.quantity.to_string())
        .bind(input.price_per_unit.to_string())
        .bind(total_price.to_string())
        .bind(input.status.as_str())
        .bind(input.filled_quantity.to_string())
        .fetch_one(executor)
        .await?;

        Order::try_from(record)
    }

    /// 사용자의 최근 주문 (최신순).
    pub async fn list_recent<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
        limit: i64,
    ) -> ExchangeResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// 사용자의 전체 주문 (분석용).
    pub async fn list_by_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: i64,
    ) -> ExchangeResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await?;

        convert_all(records)
    }

    /// 주문 행을 `FOR UPDATE`로 잠그고 읽습니다.
    pub async fn lock_for_update<'e>(
        executor: impl PgExecutor<'e>,
        order_id: i64,
    ) -> ExchangeResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        record.map(Order::try_from).transpose()
    }

    /// 주문을 취소 상태로 표시합니다.
    pub async fn mark_cancelled<'e>(
        executor: impl PgExecutor<'e>,
        order_id: i64,
    ) -> ExchangeResult<Order> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            UPDATE orders
            SET status = 'cancelled', cancelled_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Order::try_from(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_conversion() {
        let now = Utc::now();
        let order = Order::try_from(OrderRecord {
            id: 7,
            user_id: 1,
            crypto_id: 2,
            order_type: "sell".to_string(),
            quantity: "0.75".to_string(),
            price_per_unit: "3000".to_string(),
            total_price: "2250".to_string(),
            status: "pending".to_string(),
            filled_quantity: "0".to_string(),
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        })
        .unwrap();

        assert_eq!(order.order_type, OrderSide::Sell);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.unfilled_quantity(), dec!(0.75));
    }

    #[test]
    fn test_new_order_total() {
        let input = NewOrder {
            user_id: 1,
            crypto_id: 1,
            order_type: OrderSide::Buy,
            quantity: dec!(0.5),
            price_per_unit: dec!(45000),
            status: OrderStatus::Pending,
            filled_quantity: Decimal::ZERO,
        };
        assert_eq!(input.total_price().unwrap(), dec!(22500));
    }
}
