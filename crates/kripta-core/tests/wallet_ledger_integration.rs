//! 지갑 잔고 흐름 통합 테스트.
//!
//! 서비스 계층이 행 잠금 아래에서 수행하는 순서 그대로
//! 입금 → 매도 주문 잠금 → 출금 → 주문 취소를 `ledger`로 재현합니다.

use chrono::Utc;
use kripta_core::ledger::{self, DEFAULT_TRADE_FEE_RATE};
use kripta_core::{ExchangeError, Order, OrderSide, OrderStatus, Wallet};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn empty_wallet() -> Wallet {
    let now = Utc::now();
    Wallet {
        id: 1,
        user_id: 42,
        crypto_id: 1,
        balance: Decimal::ZERO,
        locked_balance: Decimal::ZERO,
        created_at: now,
        updated_at: now,
    }
}

fn pending_sell(quantity: Decimal, price: Decimal) -> Order {
    let now = Utc::now();
    Order {
        id: 9,
        user_id: 42,
        crypto_id: 1,
        order_type: OrderSide::Sell,
        quantity,
        price_per_unit: price,
        total_price: quantity * price,
        status: OrderStatus::Pending,
        filled_quantity: Decimal::ZERO,
        created_at: now,
        updated_at: now,
        cancelled_at: None,
    }
}

#[test]
fn test_deposit_lock_withdraw_cancel_sequence() {
    let mut wallet = empty_wallet();

    // 입금 2회
    wallet.balance =
        ledger::credit(wallet.balance, ledger::parse_amount("1.25").unwrap()).unwrap();
    wallet.balance =
        ledger::credit(wallet.balance, ledger::parse_amount("0.75").unwrap()).unwrap();
    assert_eq!(wallet.balance, dec!(2));

    // 1.5 매도 주문 → 가용 0.5
    let order = pending_sell(dec!(1.5), dec!(40000));
    wallet.locked_balance =
        ledger::lock(wallet.balance, wallet.locked_balance, order.quantity).unwrap();
    assert_eq!(wallet.locked_balance, dec!(1.5));
    assert_eq!(wallet.available_balance(), dec!(0.5));

    // 매도 주문 검사는 잠금과 무관하게 전체 잔고 기준
    let second = ledger::lock(wallet.balance, wallet.locked_balance, dec!(2.1));
    assert!(matches!(
        second,
        Err(ExchangeError::InsufficientBalance { available, .. }) if available == dec!(2)
    ));

    // 출금도 전체 잔고 기준
    wallet.balance = ledger::debit(wallet.balance, dec!(1)).unwrap();
    assert_eq!(wallet.balance, dec!(1));
    assert!(ledger::debit(wallet.balance, dec!(1.01)).is_err());

    // 주문 취소 → 미체결 수량 해제
    let release = order.cancellation_release(order.user_id).unwrap();
    wallet.locked_balance = ledger::release(wallet.locked_balance, release);
    assert_eq!(wallet.locked_balance, Decimal::ZERO);
    assert_eq!(wallet.available_balance(), dec!(1));
}

#[test]
fn test_cancel_after_partial_fill_releases_remainder_only() {
    let mut wallet = empty_wallet();
    wallet.balance = dec!(10);

    let mut order = pending_sell(dec!(4), dec!(100));
    wallet.locked_balance = ledger::lock(wallet.balance, wallet.locked_balance, order.quantity).unwrap();

    order.status = OrderStatus::Partial;
    order.filled_quantity = dec!(1.5);
    let release = order.cancellation_release(order.user_id).unwrap();
    wallet.locked_balance = ledger::release(wallet.locked_balance, release);

    assert_eq!(wallet.locked_balance, dec!(1.5));
}

#[test]
fn test_trade_fee_on_executed_sell() {
    let total = ledger::order_total(dec!(0.5), dec!(60000)).unwrap();
    assert_eq!(ledger::trade_fee(total, DEFAULT_TRADE_FEE_RATE).unwrap(), dec!(30));
}
