//! 포트폴리오 지표 계산.
//!
//! - 총 평가액: 시세가 있는 지갑의 `balance × price` 합계
//! - 투자 원금: 각 지갑 암호화폐의 완료된 입금 `amount × 입금 시점 단가` 합계.
//!   입금 시점 단가가 기록되지 않은 행은 현재 시세로 대체합니다.
//! - 수익률: `(평가액 − 원금) / 원금 × 100`, 원금이 0이면 0
//! - 자산 배분: 평가액 대비 비중 (합계 ≤ 100)

use std::collections::HashMap;

use kripta_core::{Cryptocurrency, DecimalExt, Transaction, Wallet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::PriceMap;

/// 자산 배분 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub symbol: String,
    pub name: String,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub balance: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub value_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub percentage_of_portfolio: Decimal,
}

/// 포트폴리오 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_value_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_invested_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_return_usd: Decimal,
    #[cfg_attr(feature = "utoipa-support", schema(value_type = String))]
    pub total_return_percentage: Decimal,
    /// 보유 지갑 수 (시세 유무와 무관)
    pub holding_count: usize,
    pub asset_allocation: Vec<AssetAllocation>,
}

/// 포트폴리오 지표를 계산합니다.
///
/// # 매개변수
///
/// * `wallets` - 사용자의 모든 지갑
/// * `cryptos` - crypto_id → 암호화폐
/// * `prices` - crypto_id → 현재 USD 가격
/// * `transactions` - 사용자의 거래 내역
pub fn calculate_portfolio_metrics(
    wallets: &[Wallet],
    cryptos: &HashMap<i64, Cryptocurrency>,
    prices: &PriceMap,
    transactions: &[Transaction],
) -> PortfolioMetrics {
    let mut total_value = Decimal::ZERO;
    let mut total_invested = Decimal::ZERO;
    let mut priced: Vec<(&Wallet, Decimal)> = Vec::new();

    for wallet in wallets {
        let Some(&price) = prices.get(&wallet.crypto_id) else {
            debug!(crypto_id = wallet.crypto_id, "No market data for wallet, skipping valuation");
            continue;
        };

        let value = wallet.balance * price;
        total_value += value;
        total_invested += invested_amount(wallet.crypto_id, price, transactions);
        priced.push((wallet, value));
    }

    let asset_allocation = priced
        .into_iter()
        .map(|(wallet, value)| {
            let (symbol, name) = cryptos
                .get(&wallet.crypto_id)
                .map(|c| (c.symbol.clone(), c.name.clone()))
                .unwrap_or_else(|| ("UNKNOWN".to_string(), "Unknown".to_string()));
            AssetAllocation {
                symbol,
                name,
                balance: wallet.balance,
                value_usd: value,
                percentage_of_portfolio: value.percentage_of(total_value),
            }
        })
        .collect();

    let total_return = total_value - total_invested;

    PortfolioMetrics {
        total_value_usd: total_value,
        total_invested_usd: total_invested,
        total_return_usd: total_return,
        total_return_percentage: total_return.percentage_of(total_invested),
        holding_count: wallets.len(),
        asset_allocation,
    }
}

/// 특정 암호화폐의 완료된 입금 원금 합계.
fn invested_amount(crypto_id: i64, current_price: Decimal, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|tx| tx.is_completed_deposit_of(crypto_id))
        .map(|tx| tx.amount * tx.price_usd.unwrap_or(current_price))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kripta_core::{TransactionStatus, TransactionType};
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

    fn deposit(crypto_id: i64, amount: Decimal, price: Option<Decimal>) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: 1,
            user_id: 1,
            from_crypto_id: None,
            to_crypto_id: Some(crypto_id),
            transaction_type: TransactionType::Deposit,
            amount,
            fee: Decimal::ZERO,
            status: TransactionStatus::Completed,
            order_id: None,
            tx_hash: None,
            price_usd: price,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_portfolio() {
        let metrics = calculate_portfolio_metrics(&[], &HashMap::new(), &PriceMap::new(), &[]);
        assert_eq!(metrics.total_value_usd, Decimal::ZERO);
        assert_eq!(metrics.total_return_percentage, Decimal::ZERO);
        assert_eq!(metrics.holding_count, 0);
        assert!(metrics.asset_allocation.is_empty());
    }

    #[test]
    fn test_invested_uses_recorded_price() {
        let wallets = vec![wallet(1, dec!(2))];
        let prices = PriceMap::from([(1, dec!(150))]);
        let txs = vec![deposit(1, dec!(2), Some(dec!(100)))];

        let metrics = calculate_portfolio_metrics(&wallets, &HashMap::new(), &prices, &txs);
        assert_eq!(metrics.total_value_usd, dec!(300));
        assert_eq!(metrics.total_invested_usd, dec!(200));
        assert_eq!(metrics.total_return_usd, dec!(100));
        assert_eq!(metrics.total_return_percentage, dec!(50));
    }

    #[test]
    fn test_invested_falls_back_to_current_price() {
        let wallets = vec![wallet(1, dec!(2))];
        let prices = PriceMap::from([(1, dec!(150))]);
        let txs = vec![deposit(1, dec!(2), None)];

        let metrics = calculate_portfolio_metrics(&wallets, &HashMap::new(), &prices, &txs);
        assert_eq!(metrics.total_invested_usd, dec!(300));
        assert_eq!(metrics.total_return_usd, Decimal::ZERO);
    }

    #[test]
    fn test_deposits_of_other_crypto_not_counted() {
        let wallets = vec![wallet(1, dec!(1))];
        let prices = PriceMap::from([(1, dec!(10))]);
        let txs = vec![deposit(2, dec!(100), Some(dec!(1)))];

        let metrics = calculate_portfolio_metrics(&wallets, &HashMap::new(), &prices, &txs);
        assert_eq!(metrics.total_invested_usd, Decimal::ZERO);
    }

    #[test]
    fn test_holding_count_includes_unpriced_wallets() {
        let wallets = vec![wallet(1, dec!(1)), wallet(2, dec!(1))];
        let prices = PriceMap::from([(1, dec!(10))]);

        let metrics = calculate_portfolio_metrics(&wallets, &HashMap::new(), &prices, &[]);
        assert_eq!(metrics.holding_count, 2);
        assert_eq!(metrics.asset_allocation.len(), 1);
        assert_eq!(metrics.asset_allocation[0].symbol, "UNKNOWN");
        assert_eq!(metrics.asset_allocation[0].percentage_of_portfolio, dec!(100));
    }
}
