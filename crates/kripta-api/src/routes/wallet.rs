//! 지갑 endpoint.
//!
//! - `GET /api/v1/wallet` - 지갑 목록 (암호화폐, 시세 포함)
//! - `GET /api/v1/wallet/portfolio` - 포트폴리오 요약
//! - `POST /api/v1/wallet/deposit` - 입금
//! - `POST /api/v1/wallet/withdraw` - 출금

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use kripta_analytics::{summarize_holdings, PortfolioSummary};
use kripta_core::{ledger, Cryptocurrency, MarketData, Wallet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use super::validated;
use crate::auth::CurrentUser;
use crate::error::{api_error, ApiErrorResponse, ApiResult};
use crate::metrics::{record_deposit, record_withdrawal};
use crate::repository::{CryptocurrencyRepository, MarketDataRepository, WalletRepository};
use crate::services::{self, index_markets};
use crate::state::AppState;

/// 암호화폐와 시세가 붙은 지갑.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletView {
    #[serde(flatten)]
    pub wallet: Wallet,
    pub crypto: Option<Cryptocurrency>,
    pub market: Option<MarketData>,
}

/// 입금/출금 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceChangeRequest {
    #[validate(range(min = 1, message = "cryptoId는 양수여야 합니다"))]
    pub crypto_id: i64,
    /// 10진수 문자열 (예: "0.5")
    #[validate(length(min = 1, max = 64))]
    pub amount: String,
}

/// 입금/출금 결과.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletChangeResponse {
    pub success: bool,
    pub wallet: Wallet,
}

/// 내 지갑 목록.
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    responses(
        (status = 200, description = "지갑 목록", body = Vec<WalletView>),
        (status = 401, description = "인증 필요")
    ),
    tag = "wallet"
)]
pub async fn get_wallets(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<WalletView>>> {
    let pool = state.require_db()?;

    let wallets = WalletRepository::list_by_user(pool, user.id)
        .await
        .map_err(api_error)?;
    let mut cryptos: HashMap<i64, Cryptocurrency> = CryptocurrencyRepository::list_all(pool)
        .await
        .map_err(api_error)?
        .into_iter()
        .map(|crypto| (crypto.id, crypto))
        .collect();
    let mut markets = index_markets(MarketDataRepository::list_all(pool).await.map_err(api_error)?);

    let views = wallets
        .into_iter()
        .map(|wallet| WalletView {
            crypto: cryptos.remove(&wallet.crypto_id),
            market: markets.remove(&wallet.crypto_id),
            wallet,
        })
        .collect();

    Ok(Json(views))
}

/// 포트폴리오 요약.
#[utoipa::path(
    get,
    path = "/api/v1/wallet/portfolio",
    responses(
        (status = 200, description = "시세가 있는 보유 자산 평가", body = PortfolioSummary),
        (status = 401, description = "인증 필요")
    ),
    tag = "wallet"
)]
pub async fn get_portfolio_summary(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<PortfolioSummary>> {
    let pool = state.require_db()?;

    let wallets = WalletRepository::list_by_user(pool, user.id)
        .await
        .map_err(api_error)?;
    let markets = index_markets(MarketDataRepository::list_all(pool).await.map_err(api_error)?);

    Ok(Json(summarize_holdings(&wallets, &markets)))
}

/// 입금.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/deposit",
    request_body = BalanceChangeRequest,
    responses(
        (status = 200, description = "입금 완료", body = WalletChangeResponse),
        (status = 400, description = "잘못된 금액", body = ApiErrorResponse),
        (status = 404, description = "암호화폐 없음", body = ApiErrorResponse)
    ),
    tag = "wallet"
)]
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<BalanceChangeRequest>, JsonRejection>,
) -> ApiResult<Json<WalletChangeResponse>> {
    let request = validated(body)?;
    let amount = ledger::parse_amount(&request.amount).map_err(api_error)?;
    let pool = state.require_db()?;

    let wallet = services::deposit(pool, user.id, request.crypto_id, amount)
        .await
        .map_err(api_error)?;
    record_deposit(request.crypto_id);

    Ok(Json(WalletChangeResponse {
        success: true,
        wallet,
    }))
}

/// 출금.
#[utoipa::path(
    post,
    path = "/api/v1/wallet/withdraw",
    request_body = BalanceChangeRequest,
    responses(
        (status = 200, description = "출금 완료", body = WalletChangeResponse),
        (status = 400, description = "잔고 부족 또는 잘못된 금액", body = ApiErrorResponse),
        (status = 404, description = "지갑 없음", body = ApiErrorResponse)
    ),
    tag = "wallet"
)]
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<BalanceChangeRequest>, JsonRejection>,
) -> ApiResult<Json<WalletChangeResponse>> {
    let request = validated(body)?;
    let amount = ledger::parse_amount(&request.amount).map_err(api_error)?;
    let pool = state.require_db()?;

    let wallet = services::withdraw(pool, user.id, request.crypto_id, amount)
        .await
        .map_err(api_error)?;
    record_withdrawal(request.crypto_id);

    Ok(Json(WalletChangeResponse {
        success: true,
        wallet,
    }))
}

/// 지갑 라우터 생성.
pub fn wallet_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_wallets))
        .route("/portfolio", get(get_portfolio_summary))
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_change_request_camel_case() {
        let request: BalanceChangeRequest =
            serde_json::from_str(r#"{"cryptoId": 1, "amount": "0.25"}"#).unwrap();
        assert_eq!(request.crypto_id, 1);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_balance_change_request_rejects_bad_crypto_id() {
        let request = BalanceChangeRequest {
            crypto_id: 0,
            amount: "1".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
