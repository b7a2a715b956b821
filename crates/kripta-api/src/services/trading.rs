//! 주문 및 체결.
//!
//! 매도 주문은 주문 수량만큼 지갑을 잠그고, 취소 시 미체결 수량을 풀어줍니다.
//! 즉시 체결은 체결 완료 주문과 거래 내역을 함께 남깁니다.

use kripta_core::{
    exchange_span, ledger, ExchangeError, ExchangeResult, Order, OrderSide, OrderStatus,
    Transaction, TransactionStatus, TransactionType, Wallet,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn, Instrument};

use crate::repository::{
    CryptocurrencyRepository, NewOrder, NewTransaction, OrderRepository, TransactionRepository,
    WalletRepository,
};

/// 주문/체결 요청.
#[derive(Debug, Clone, Copy)]
pub struct OrderRequest {
    pub crypto_id: i64,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
}

impl OrderRequest {
    /// 합계 금액. `Decimal` 범위를 넘으면 `InvalidInput`.
    pub fn total_price(&self) -> ExchangeResult<Decimal> {
        ledger::order_total(self.quantity, self.price_per_unit)
    }

    fn into_new_order(self, user_id: i64, status: OrderStatus, filled: Decimal) -> NewOrder {
        NewOrder {
            user_id,
            crypto_id: self.crypto_id,
            order_type: self.side,
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            status,
            filled_quantity: filled,
        }
    }
}

/// 즉시 체결 결과.
#[derive(Debug, Clone)]
pub struct TradeExecution {
    pub total_price: Decimal,
    pub fee: Decimal,
    pub order: Order,
    pub transaction: Transaction,
    pub wallet: Wallet,
}

/// 대기 주문 생성.
///
/// 매도는 잔고 한도 내에서 수량을 잠급니다. 매수는 잔고를 건드리지 않습니다.
/// 등록되지 않은 암호화폐는 `CryptocurrencyNotFound`.
pub async fn place_order(
    pool: &PgPool,
    user_id: i64,
    request: OrderRequest,
) -> ExchangeResult<Order> {
    let crypto_id = request.crypto_id;

    async move {
        request.total_price()?;

        let mut tx = pool.begin().await?;

        CryptocurrencyRepository::require(&mut *tx, crypto_id).await?;

        if request.side == OrderSide::Sell {
            let wallet = WalletRepository::lock_for_update(&mut *tx, user_id, crypto_id)
                .await?
                .ok_or(ExchangeError::WalletNotFound { crypto_id })?;

            let locked = ledger::lock(wallet.balance, wallet.locked_balance, request.quantity)?;
            WalletRepository::update_balances(&mut *tx, wallet.id, wallet.balance, locked).await?;
        }

        let order = OrderRepository::insert(
            &mut *tx,
            &request.into_new_order(user_id, OrderStatus::Pending, Decimal::ZERO),
        )
        .await?;

        tx.commit().await?;

        info!(
            order_id = order.id,
            side = %order.order_type,
            quantity = %order.quantity,
            "Order placed"
        );
        Ok(order)
    }
    .instrument(exchange_span!("place_order", user_id, crypto_id))
    .await
}

/// 주문 취소.
///
/// 이미 체결되었거나 취소된 주문은 `OrderNotCancellable`을 반환하여
/// 잠금 잔고가 두 번 풀리지 않도록 합니다.
pub async fn cancel_order(pool: &PgPool, user_id: i64, order_id: i64) -> ExchangeResult<Order> {
    async move {
        let mut tx = pool.begin().await?;

        let order = OrderRepository::lock_for_update(&mut *tx, order_id)
            .await?
            .ok_or(ExchangeError::OrderNotFound(order_id))?;

        let release = order.cancellation_release(user_id).inspect_err(|e| {
            if matches!(e, ExchangeError::Forbidden(_)) {
                warn!(owner = order.user_id, "Cancel attempted on foreign order");
            }
        })?;

        let cancelled = OrderRepository::mark_cancelled(&mut *tx, order_id).await?;

        if order.order_type == OrderSide::Sell {
            match WalletRepository::lock_for_update(&mut *tx, user_id, order.crypto_id).await? {
                Some(wallet) => {
                    let locked = ledger::release(wallet.locked_balance, release);
                    WalletRepository::update_balances(&mut *tx, wallet.id, wallet.balance, locked)
                        .await?;
                }
                None => warn!(crypto_id = order.crypto_id, "Wallet missing for cancelled sell order"),
            }
        }

        tx.commit().await?;

        info!(side = %cancelled.order_type, "Order cancelled");
        Ok(cancelled)
    }
    .instrument(exchange_span!("cancel_order", user_id, order_id = order_id))
    .await
}

/// 즉시 체결.
///
/// 매수는 지갑을 만들거나 잔고를 늘리고, 매도는 잔고에서 차감합니다.
/// 체결 완료 주문과 수수료가 포함된 거래 내역을 같은 트랜잭션에서 기록합니다.
pub async fn execute_trade(
    pool: &PgPool,
    user_id: i64,
    request: OrderRequest,
    fee_rate: Decimal,
) -> ExchangeResult<TradeExecution> {
    let crypto_id = request.crypto_id;

    async move {
        let total_price = request.total_price()?;
        let fee = ledger::trade_fee(total_price, fee_rate)?;

        let mut tx = pool.begin().await?;

        CryptocurrencyRepository::require(&mut *tx, crypto_id).await?;

        if request.side == OrderSide::Buy {
            WalletRepository::ensure_exists(&mut *tx, user_id, crypto_id).await?;
        }

        let wallet = WalletRepository::lock_for_update(&mut *tx, user_id, crypto_id)
            .await?
            .ok_or(ExchangeError::WalletNotFound { crypto_id })?;

        let balance = match request.side {
            OrderSide::Buy => ledger::credit(wallet.balance, request.quantity)?,
            OrderSide::Sell => ledger::debit(wallet.balance, request.quantity)?,
        };
        let wallet =
            WalletRepository::update_balances(&mut *tx, wallet.id, balance, wallet.locked_balance)
                .await?;

        let order = OrderRepository::insert(
            &mut *tx,
            &request.into_new_order(user_id, OrderStatus::Filled, request.quantity),
        )
        .await?;

        let (from_crypto_id, to_crypto_id) = match request.side {
            OrderSide::Buy => (None, Some(crypto_id)),
            OrderSide::Sell => (Some(crypto_id), None),
        };

        let transaction = TransactionRepository::insert(
            &mut *tx,
            &NewTransaction {
                user_id,
                from_crypto_id,
                to_crypto_id,
                transaction_type: TransactionType::Trade,
                amount: request.quantity,
                fee,
                status: TransactionStatus::Completed,
                order_id: Some(order.id),
                price_usd: Some(request.price_per_unit),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            order_id = order.id,
            side = %request.side,
            quantity = %request.quantity,
            %total_price,
            %fee,
            "Trade executed"
        );

        Ok(TradeExecution {
            total_price,
            fee,
            order,
            transaction,
            wallet,
        })
    }
    .instrument(exchange_span!("execute_trade", user_id, crypto_id))
    .await
}
