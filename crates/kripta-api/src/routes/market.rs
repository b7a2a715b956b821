//! 시장 endpoint.
//!
//! 상장 암호화폐 목록과 캐시된 시세를 제공합니다. 시세 캐시는 외부 갱신 작업
//! 또는 관리자가 `PUT /data/{crypto_id}`로 채웁니다.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use kripta_core::{ledger, Cryptocurrency, ExchangeError, MarketData};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::{parse_decimal_field, validated};
use crate::auth::AdminUser;
use crate::error::{api_error, ApiErrorResponse, ApiResult};
use crate::repository::{
    CryptocurrencyRepository, MarketDataRepository, NewCryptocurrency, NewMarketData,
};
use crate::services::index_markets;
use crate::state::AppState;

/// 암호화폐와 시세 쌍.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarketOverviewItem {
    pub crypto: Cryptocurrency,
    pub market: Option<MarketData>,
}

/// 암호화폐 등록 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCryptocurrencyRequest {
    #[validate(length(min = 1, max = 10, message = "심볼은 1-10자여야 합니다"))]
    pub symbol: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub coin_gecko_id: String,
    #[validate(length(max = 500))]
    pub logo: Option<String>,
    pub description: Option<String>,
}

/// 시세 upsert 요청. 모든 값은 10진수 문자열입니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertMarketDataRequest {
    #[validate(length(min = 1))]
    pub price_usd: String,
    pub price_eur: Option<String>,
    pub market_cap: Option<String>,
    pub volume_24h: Option<String>,
    pub percent_change_24h: Option<String>,
    pub percent_change_7d: Option<String>,
    pub high_price_24h: Option<String>,
    pub low_price_24h: Option<String>,
}

impl UpsertMarketDataRequest {
    fn into_input(self) -> Result<NewMarketData, ExchangeError> {
        Ok(NewMarketData {
            price_usd: ledger::parse_amount(&self.price_usd)?,
            price_eur: parse_decimal_field("priceEur", self.price_eur.as_deref())?,
            market_cap: parse_decimal_field("marketCap", self.market_cap.as_deref())?,
            volume_24h: parse_decimal_field("volume24h", self.volume_24h.as_deref())?,
            percent_change_24h: parse_decimal_field(
                "percentChange24h",
                self.percent_change_24h.as_deref(),
            )?,
            percent_change_7d: parse_decimal_field(
                "percentChange7d",
                self.percent_change_7d.as_deref(),
            )?,
            high_price_24h: parse_decimal_field("highPrice24h", self.high_price_24h.as_deref())?,
            low_price_24h: parse_decimal_field("lowPrice24h", self.low_price_24h.as_deref())?,
        })
    }
}

/// 활성 암호화폐 목록.
#[utoipa::path(
    get,
    path = "/api/v1/market/cryptocurrencies",
    responses(
        (status = 200, description = "활성 암호화폐 (id 순)", body = Vec<Cryptocurrency>),
        (status = 503, description = "데이터베이스 없음", body = ApiErrorResponse)
    ),
    tag = "market"
)]
pub async fn get_cryptocurrencies(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Cryptocurrency>>> {
    let pool = state.require_db()?;
    let cryptos = CryptocurrencyRepository::list_active(pool)
        .await
        .map_err(api_error)?;
    Ok(Json(cryptos))
}

/// 암호화폐 등록 (관리자).
#[utoipa::path(
    post,
    path = "/api/v1/market/cryptocurrencies",
    request_body = CreateCryptocurrencyRequest,
    responses(
        (status = 201, description = "등록됨", body = Cryptocurrency),
        (status = 400, description = "잘못된 입력 또는 중복", body = ApiErrorResponse),
        (status = 403, description = "관리자 아님")
    ),
    tag = "market"
)]
pub async fn create_cryptocurrency(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    body: Result<Json<CreateCryptocurrencyRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Cryptocurrency>)> {
    let request = validated(body)?;
    let pool = state.require_db()?;

    let crypto = CryptocurrencyRepository::create(
        pool,
        &NewCryptocurrency {
            symbol: request.symbol,
            name: request.name,
            coin_gecko_id: request.coin_gecko_id,
            logo: request.logo,
            description: request.description,
        },
    )
    .await
    .map_err(api_error)?;

    info!(admin_id = admin.id, crypto_id = crypto.id, symbol = %crypto.symbol, "Cryptocurrency listed");
    Ok((StatusCode::CREATED, Json(crypto)))
}

/// 전체 시세 (활성 암호화폐마다 시세가 없으면 `null`).
#[utoipa::path(
    get,
    path = "/api/v1/market/data",
    responses(
        (status = 200, description = "암호화폐와 시세 목록", body = Vec<MarketOverviewItem>),
        (status = 503, description = "데이터베이스 없음", body = ApiErrorResponse)
    ),
    tag = "market"
)]
pub async fn get_all_market_data(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<MarketOverviewItem>>> {
    let pool = state.require_db()?;

    let cryptos = CryptocurrencyRepository::list_active(pool)
        .await
        .map_err(api_error)?;
    let mut markets = index_markets(MarketDataRepository::list_all(pool).await.map_err(api_error)?);

    let items = cryptos
        .into_iter()
        .map(|crypto| MarketOverviewItem {
            market: markets.remove(&crypto.id),
            crypto,
        })
        .collect();

    Ok(Json(items))
}

/// 암호화폐 하나의 시세.
#[utoipa::path(
    get,
    path = "/api/v1/market/data/{crypto_id}",
    params(("crypto_id" = i64, Path, description = "암호화폐 ID")),
    responses(
        (status = 200, description = "캐시된 시세", body = MarketData),
        (status = 404, description = "시세 없음", body = ApiErrorResponse)
    ),
    tag = "market"
)]
pub async fn get_market_data(
    State(state): State<Arc<AppState>>,
    Path(crypto_id): Path<i64>,
) -> ApiResult<Json<MarketData>> {
    let pool = state.require_db()?;
    let market = MarketDataRepository::find_by_crypto(pool, crypto_id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| api_error(ExchangeError::MarketDataNotFound(crypto_id)))?;
    Ok(Json(market))
}

/// 시세 캐시 갱신 (관리자).
#[utoipa::path(
    put,
    path = "/api/v1/market/data/{crypto_id}",
    params(("crypto_id" = i64, Path, description = "암호화폐 ID")),
    request_body = UpsertMarketDataRequest,
    responses(
        (status = 200, description = "저장된 시세", body = MarketData),
        (status = 400, description = "잘못된 입력", body = ApiErrorResponse),
        (status = 404, description = "암호화폐 없음", body = ApiErrorResponse)
    ),
    tag = "market"
)]
pub async fn upsert_market_data(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(crypto_id): Path<i64>,
    body: Result<Json<UpsertMarketDataRequest>, JsonRejection>,
) -> ApiResult<Json<MarketData>> {
    let input = validated(body)?.into_input().map_err(api_error)?;
    let pool = state.require_db()?;

    CryptocurrencyRepository::find_by_id(pool, crypto_id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| api_error(ExchangeError::CryptocurrencyNotFound(crypto_id)))?;

    let market = MarketDataRepository::upsert(pool, crypto_id, &input)
        .await
        .map_err(api_error)?;

    info!(admin_id = admin.id, crypto_id, price_usd = %market.price_usd, "Market data updated");
    Ok(Json(market))
}

/// 시장 라우터 생성.
pub fn market_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/cryptocurrencies",
            get(get_cryptocurrencies).post(create_cryptocurrency),
        )
        .route("/data", get(get_all_market_data))
        .route("/data/{crypto_id}", get(get_market_data).put(upsert_market_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn upsert(price_usd: &str) -> UpsertMarketDataRequest {
        UpsertMarketDataRequest {
            price_usd: price_usd.to_string(),
            price_eur: None,
            market_cap: None,
            volume_24h: None,
            percent_change_24h: Some("-3.2".to_string()),
            percent_change_7d: None,
            high_price_24h: None,
            low_price_24h: None,
        }
    }

    #[test]
    fn test_upsert_request_allows_negative_change() {
        let input = upsert("64000.5").into_input().unwrap();
        assert_eq!(input.price_usd, dec!(64000.5));
        assert_eq!(input.percent_change_24h, Some(dec!(-3.2)));
    }

    #[test]
    fn test_upsert_request_rejects_non_positive_price() {
        assert!(matches!(
            upsert("0").into_input(),
            Err(ExchangeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateCryptocurrencyRequest {
            symbol: "TOOLONGSYMBOL".to_string(),
            name: "Bitcoin".to_string(),
            coin_gecko_id: "bitcoin".to_string(),
            logo: None,
            description: None,
        };
        assert!(request.validate().is_err());
    }
}
