//! 포트폴리오 스냅샷 기록.

use kripta_analytics::value_holdings;
use kripta_core::{exchange_span, ExchangeResult, PortfolioSnapshot, SnapshotHolding};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, Instrument};

use super::{index_markets, price_map};
use crate::repository::{
    CryptocurrencyRepository, MarketDataRepository, NewSnapshot, SnapshotRepository,
    UserRepository, WalletRepository,
};

/// EUR 평가액. 보유 자산 중 하나라도 EUR 시세가 없으면 `None`.
fn total_value_eur(
    holdings: &[SnapshotHolding],
    eur_prices: impl Fn(i64) -> Option<Decimal>,
) -> Option<Decimal> {
    holdings
        .iter()
        .map(|h| eur_prices(h.crypto_id).map(|price| h.balance * price))
        .sum()
}

/// 사용자의 현재 보유 자산을 평가하여 스냅샷으로 저장합니다.
pub async fn record_snapshot(pool: &PgPool, user_id: i64) -> ExchangeResult<PortfolioSnapshot> {
    async move {
        let wallets = WalletRepository::list_by_user(pool, user_id).await?;
        let cryptos = CryptocurrencyRepository::list_all(pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let markets = index_markets(MarketDataRepository::list_all(pool).await?);

        let holdings = value_holdings(&wallets, &cryptos, &price_map(&markets));
        let total_value_usd = holdings.iter().map(|h| h.value_usd).sum();
        let total_value_eur = total_value_eur(&holdings, |crypto_id| {
            markets.get(&crypto_id).and_then(|m| m.price_eur)
        });

        let snapshot = SnapshotRepository::insert(
            pool,
            &NewSnapshot {
                user_id,
                total_value_usd,
                total_value_eur,
                holdings,
            },
        )
        .await?;

        debug!(
            snapshot_id = snapshot.id,
            total_value_usd = %snapshot.total_value_usd,
            holdings = snapshot.holdings.len(),
            "Portfolio snapshot recorded"
        );
        Ok(snapshot)
    }
    .instrument(exchange_span!("record_snapshot", user_id))
    .await
}

/// 지갑을 보유한 모든 사용자의 스냅샷을 기록합니다.
///
/// 개별 사용자 실패는 로그만 남기고 계속합니다. 저장된 스냅샷 수를 반환합니다.
pub async fn record_all_snapshots(pool: &PgPool) -> ExchangeResult<usize> {
    let user_ids = UserRepository::list_ids_with_wallets(pool).await?;
    let mut recorded = 0;

    for user_id in user_ids {
        match record_snapshot(pool, user_id).await {
            Ok(_) => recorded += 1,
            Err(e) => error!(user_id, "Failed to record portfolio snapshot: {}", e),
        }
    }

    Ok(recorded)
}
