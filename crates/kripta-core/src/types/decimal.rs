//! 정밀한 금융 계산을 위한 Decimal 유틸리티.
//!
//! 잔고와 가격은 데이터베이스에 문자열로 저장되며, 여기서 `Decimal`로
//! 변환됩니다. 부동소수점 연산은 사용하지 않습니다.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ExchangeError, ExchangeResult};

/// 가격 타입 (USD).
pub type Price = Decimal;

/// 수량 타입.
pub type Quantity = Decimal;

/// 저장된 decimal 문자열을 파싱합니다.
///
/// 비어 있는 값은 컬럼 기본값과 같은 `0`으로 취급합니다.
/// 파싱할 수 없는 값은 `ExchangeError::Data`를 반환합니다.
pub fn parse_stored_decimal(column: &str, text: &str) -> ExchangeResult<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    trimmed
        .parse::<Decimal>()
        .map_err(|e| ExchangeError::Data(format!("{column}: '{trimmed}' ({e})")))
}

/// nullable decimal 컬럼을 파싱합니다.
pub fn parse_optional_decimal(column: &str, text: Option<&str>) -> ExchangeResult<Option<Decimal>> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_stored_decimal(column, value).map(Some),
    }
}

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// `self / whole × 100`. 분모가 0 이하이면 0.
    fn percentage_of(&self, whole: Decimal) -> Decimal;

    /// 분모가 0이면 0을 반환하는 나눗셈.
    fn safe_div(&self, divisor: Decimal) -> Decimal;

    /// 지정된 소수점 자릿수로 반올림합니다.
    fn round_money(&self, dp: u32) -> Decimal;

    /// `$1,234.57` 형식의 USD 문자열.
    fn to_usd_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn percentage_of(&self, whole: Decimal) -> Decimal {
        if whole > Decimal::ZERO {
            *self / whole * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    fn safe_div(&self, divisor: Decimal) -> Decimal {
        if divisor.is_zero() {
            Decimal::ZERO
        } else {
            *self / divisor
        }
    }

    fn round_money(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    fn to_usd_string(&self) -> String {
        let rounded = self.round_money(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if negative {
            format!("-${grouped}.{frac_part}")
        } else {
            format!("${grouped}.{frac_part}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_stored_decimal() {
        assert_eq!(parse_stored_decimal("balance", "1.25").unwrap(), dec!(1.25));
        assert_eq!(parse_stored_decimal("balance", "").unwrap(), Decimal::ZERO);
        assert_eq!(parse_stored_decimal("balance", "  3 ").unwrap(), dec!(3));
        assert!(matches!(
            parse_stored_decimal("balance", "abc"),
            Err(ExchangeError::Data(_))
        ));
    }

    #[test]
    fn test_parse_optional_decimal() {
        assert_eq!(parse_optional_decimal("price", None).unwrap(), None);
        assert_eq!(parse_optional_decimal("price", Some("")).unwrap(), None);
        assert_eq!(
            parse_optional_decimal("price", Some("42000.5")).unwrap(),
            Some(dec!(42000.5))
        );
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(dec!(25).percentage_of(dec!(200)), dec!(12.5));
        assert_eq!(dec!(25).percentage_of(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(dec!(10).safe_div(dec!(4)), dec!(2.5));
        assert_eq!(dec!(10).safe_div(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_usd_string() {
        assert_eq!(dec!(1234.567).to_usd_string(), "$1,234.57");
        assert_eq!(dec!(0.5).to_usd_string(), "$0.50");
        assert_eq!(dec!(1000000).to_usd_string(), "$1,000,000.00");
        assert_eq!(dec!(-42.1).to_usd_string(), "-$42.10");
    }
}
