//! 잔고 산술.
//!
//! 입금, 출금, 매도 주문 잠금, 체결 수수료 계산을 위한 순수 함수 모음.
//! 데이터베이스 접근 없이 `Decimal` 값만 다루며, 서비스 계층이
//! 행 잠금을 잡은 상태에서 호출합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{ExchangeError, ExchangeResult};

/// 기본 체결 수수료율 (0.1%).
pub const DEFAULT_TRADE_FEE_RATE: Decimal = dec!(0.001);

/// 한 번에 입력할 수 있는 금액/수량/단가의 상한.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// 사용자 입력 금액을 파싱합니다.
///
/// 숫자가 아니거나 0 이하이거나 `MAX_AMOUNT`를 넘는 값은 거부합니다.
pub fn parse_amount(text: &str) -> ExchangeResult<Decimal> {
    let trimmed = text.trim();
    let amount = trimmed
        .parse::<Decimal>()
        .map_err(|_| ExchangeError::InvalidInput(format!("잘못된 금액 형식: '{trimmed}'")))?;

    if amount <= Decimal::ZERO {
        return Err(ExchangeError::InvalidInput(format!(
            "금액은 0보다 커야 합니다: {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(ExchangeError::InvalidInput(format!(
            "금액은 {MAX_AMOUNT} 이하여야 합니다"
        )));
    }

    Ok(amount)
}

/// `Decimal` 표현 범위를 넘는 산술 결과.
fn overflow(op: &str) -> ExchangeError {
    ExchangeError::InvalidInput(format!("금액이 너무 큽니다 ({op} 범위 초과)"))
}

/// 잔고에 금액을 더합니다.
///
/// 합계가 `Decimal` 범위를 넘으면 `InvalidInput`.
pub fn credit(balance: Decimal, amount: Decimal) -> ExchangeResult<Decimal> {
    balance.checked_add(amount).ok_or_else(|| overflow("잔고"))
}

/// 잔고에서 금액을 뺍니다.
///
/// `amount > balance`이면 `InsufficientBalance`.
pub fn debit(balance: Decimal, amount: Decimal) -> ExchangeResult<Decimal> {
    if amount > balance {
        return Err(ExchangeError::InsufficientBalance {
            requested: amount,
            available: balance,
        });
    }
    Ok(balance - amount)
}

/// 매도 주문 수량을 잠급니다. 새 잠금 잔고를 반환합니다.
///
/// 출금과 같은 기준으로 `quantity > balance`이면 `InsufficientBalance`.
/// 이미 잠긴 수량은 검사에 포함되지 않습니다.
pub fn lock(balance: Decimal, locked: Decimal, quantity: Decimal) -> ExchangeResult<Decimal> {
    if quantity > balance {
        return Err(ExchangeError::InsufficientBalance {
            requested: quantity,
            available: balance,
        });
    }
    locked.checked_add(quantity).ok_or_else(|| overflow("잠금"))
}

/// 잠금 잔고를 해제합니다. 결과는 0 미만으로 내려가지 않습니다.
pub fn release(locked: Decimal, quantity: Decimal) -> Decimal {
    (locked - quantity).max(Decimal::ZERO)
}

/// 가용 잔고 (`balance - locked`, 최소 0).
pub fn available(balance: Decimal, locked: Decimal) -> Decimal {
    (balance - locked).max(Decimal::ZERO)
}

/// 체결 금액에 대한 수수료.
pub fn trade_fee(total: Decimal, rate: Decimal) -> ExchangeResult<Decimal> {
    total.checked_mul(rate).ok_or_else(|| overflow("수수료"))
}

/// 주문 총액 (`quantity * price_per_unit`).
pub fn order_total(quantity: Decimal, price_per_unit: Decimal) -> ExchangeResult<Decimal> {
    quantity
        .checked_mul(price_per_unit)
        .ok_or_else(|| overflow("주문 총액"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(parse_amount("1.5").unwrap(), dec!(1.5));
        assert_eq!(parse_amount(" 0.00000001 ").unwrap(), dec!(0.00000001));
    }

    #[test]
    fn test_parse_amount_rejects_invalid() {
        assert!(matches!(parse_amount("abc"), Err(ExchangeError::InvalidInput(_))));
        assert!(matches!(parse_amount(""), Err(ExchangeError::InvalidInput(_))));
        assert!(matches!(parse_amount("0"), Err(ExchangeError::InvalidInput(_))));
        assert!(matches!(parse_amount("-3"), Err(ExchangeError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_amount_rejects_oversized() {
        assert_eq!(parse_amount("1000000000000000").unwrap(), MAX_AMOUNT);
        assert!(matches!(
            parse_amount("1000000000000000.00000001"),
            Err(ExchangeError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_amount("79228162514264337593543950335"),
            Err(ExchangeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_debit_exact_balance() {
        assert_eq!(debit(dec!(2), dec!(2)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_debit_insufficient() {
        let err = debit(dec!(1), dec!(1.0001)).unwrap_err();
        match err {
            ExchangeError::InsufficientBalance {
                requested,
                available,
            } => {
                assert_eq!(requested, dec!(1.0001));
                assert_eq!(available, dec!(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lock_checks_against_balance() {
        // 잔고 10, 이미 5 잠김 → 7 매도 가능
        assert_eq!(lock(dec!(10), dec!(5), dec!(7)).unwrap(), dec!(12));
        match lock(dec!(10), dec!(5), dec!(10.5)) {
            Err(ExchangeError::InsufficientBalance {
                requested,
                available,
            }) => {
                assert_eq!(requested, dec!(10.5));
                assert_eq!(available, dec!(10));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_release_floors_at_zero() {
        assert_eq!(release(dec!(1), dec!(3)), Decimal::ZERO);
        assert_eq!(release(dec!(5), dec!(3)), dec!(2));
    }

    #[test]
    fn test_trade_fee_default_rate() {
        assert_eq!(trade_fee(dec!(50000), DEFAULT_TRADE_FEE_RATE).unwrap(), dec!(50));
    }

    #[test]
    fn test_credit_overflow_is_invalid_input() {
        // 상한 이하 입금이 누적되어 표현 범위 끝에 도달한 잔고
        let balance = Decimal::MAX - MAX_AMOUNT;
        assert_eq!(credit(balance, MAX_AMOUNT).unwrap(), Decimal::MAX);
        assert!(matches!(
            credit(Decimal::MAX, parse_amount("1").unwrap()),
            Err(ExchangeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_order_total_overflow_is_invalid_input() {
        let huge = dec!(100000000000000000000);
        assert!(matches!(order_total(huge, huge), Err(ExchangeError::InvalidInput(_))));
        assert_eq!(order_total(dec!(0.5), dec!(60000)).unwrap(), dec!(30000));
    }

    #[test]
    fn test_trade_fee_overflow_is_invalid_input() {
        assert!(matches!(
            trade_fee(Decimal::MAX, dec!(2)),
            Err(ExchangeError::InvalidInput(_))
        ));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        // 0.00000001 ~ 1,000,000 범위, 소수점 8자리
        (1i64..=100_000_000_000_000i64).prop_map(|units| Decimal::new(units, 8))
    }

    proptest! {
        #[test]
        fn prop_credit_adds_exactly(balance in amount_strategy(), amount in amount_strategy()) {
            prop_assert_eq!(credit(balance, amount).unwrap(), balance + amount);
        }

        #[test]
        fn prop_debit_fails_iff_amount_exceeds_balance(
            balance in amount_strategy(),
            amount in amount_strategy(),
        ) {
            match debit(balance, amount) {
                Ok(next) => {
                    prop_assert!(amount <= balance);
                    prop_assert_eq!(next, balance - amount);
                }
                Err(_) => prop_assert!(amount > balance),
            }
        }

        #[test]
        fn prop_lock_then_release_restores(
            balance in amount_strategy(),
            locked_frac in 0u32..=100,
            quantity in amount_strategy(),
        ) {
            let locked = balance * Decimal::from(locked_frac) / Decimal::ONE_HUNDRED;
            if let Ok(new_locked) = lock(balance, locked, quantity) {
                prop_assert_eq!(new_locked, locked + quantity);
                prop_assert_eq!(release(new_locked, quantity), locked);
            }
        }

        #[test]
        fn prop_release_never_negative(locked in amount_strategy(), quantity in amount_strategy()) {
            prop_assert!(release(locked, quantity) >= Decimal::ZERO);
        }
    }
}
