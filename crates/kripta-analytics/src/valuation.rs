//! 보유 자산 평가.
//!
//! 지갑 잔고에 캐시된 시세를 곱해 평가액을 계산합니다.
//! 시세가 없는 지갑은 평가 대상에서 제외됩니다.

use std::collections::HashMap;

use kripta_core::{Cryptocurrency, MarketData, SnapshotHolding, Wallet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PriceMap;

/// 시세가 있는 지갑 한 건의 평가.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct HoldingValue {
    pub wallet: Wallet,
    pub market: MarketData,
    /// `balance × price_usd`
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub value: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub percent_change_24h: Option<Decimal>,
}

/// 포트폴리오 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_value_usd: Decimal,
    pub holdings: Vec<HoldingValue>,
    /// 시세가 있는 보유 자산 수
    pub holding_count: usize,
}

/// 지갑 목록을 캐시된 시세로 평가합니다.
pub fn summarize_holdings(
    wallets: &[Wallet],
    markets: &HashMap<i64, MarketData>,
) -> PortfolioSummary {
    let holdings: Vec<HoldingValue> = wallets
        .iter()
        .filter_map(|wallet| {
            let market = markets.get(&wallet.crypto_id)?;
            Some(HoldingValue {
                wallet: wallet.clone(),
                market: market.clone(),
                value: wallet.balance * market.price_usd,
                percent_change_24h: market.percent_change_24h,
            })
        })
        .collect();

    let total_value_usd = holdings.iter().map(|h| h.value).sum();
    let holding_count = holdings.len();

    PortfolioSummary {
        total_value_usd,
        holdings,
        holding_count,
    }
}

/// 스냅샷 저장용 보유 내역을 만듭니다.
///
/// 잔고가 0인 지갑과 시세가 없는 지갑은 제외합니다.
pub fn value_holdings(
    wallets: &[Wallet],
    cryptos: &HashMap<i64, Cryptocurrency>,
    prices: &PriceMap,
) -> Vec<SnapshotHolding> {
    wallets
        .iter()
        .filter(|wallet| wallet.balance > Decimal::ZERO)
        .filter_map(|wallet| {
            let price = *prices.get(&wallet.crypto_id)?;
            let symbol = cryptos
                .get(&wallet.crypto_id)
                .map(|c| c.symbol.clone())
                .unwrap_or_else(|| "UNKNOWN".to_string());
            Some(SnapshotHolding {
                crypto_id: wallet.crypto_id,
                symbol,
                balance: wallet.balance,
                price_usd: price,
                value_usd: wallet.balance * price,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn wallet(crypto_id: i64, balance: Decimal) -> Wallet {
        let now = Utc::now();
        Wallet {
            id: crypto_id,
            user_id: 1,
            crypto_id,
            balance,
            locked_balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    fn market(crypto_id: i64, price: Decimal) -> MarketData {
        MarketData {
            id: crypto_id,
            crypto_id,
            price_usd: price,
            price_eur: None,
            market_cap: None,
            volume_24h: None,
            percent_change_24h: Some(dec!(-1.5)),
            percent_change_7d: None,
            high_price_24h: None,
            low_price_24h: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_skips_unpriced_wallets() {
        let wallets = vec![wallet(1, dec!(0.5)), wallet(2, dec!(10))];
        let markets = HashMap::from([(1, market(1, dec!(40000)))]);

        let summary = summarize_holdings(&wallets, &markets);
        assert_eq!(summary.holding_count, 1);
        assert_eq!(summary.total_value_usd, dec!(20000));
        assert_eq!(summary.holdings[0].percent_change_24h, Some(dec!(-1.5)));
    }

    #[test]
    fn test_value_holdings_skips_empty_and_unpriced() {
        let wallets = vec![wallet(1, dec!(2)), wallet(2, Decimal::ZERO), wallet(3, dec!(1))];
        let prices = PriceMap::from([(1, dec!(100)), (2, dec!(5))]);

        let holdings = value_holdings(&wallets, &HashMap::new(), &prices);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].value_usd, dec!(200));
        assert_eq!(holdings[0].symbol, "UNKNOWN");
    }
}
