//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 모든 Repository는 static methods 패턴을 사용하며, 트랜잭션 안에서
//! 호출할 수 있도록 `PgExecutor`를 받습니다.
//!
//! decimal 컬럼은 TEXT로 저장되므로 각 레코드 타입은 `String` 필드를
//! 가지며, `TryFrom`으로 도메인 타입으로 변환할 때 파싱됩니다.

pub mod cryptocurrencies;
pub mod market_data;
pub mod orders;
pub mod snapshots;
pub mod transactions;
pub mod users;
pub mod wallets;

pub use cryptocurrencies::{CryptocurrencyRecord, CryptocurrencyRepository, NewCryptocurrency};
pub use market_data::{MarketDataRecord, MarketDataRepository, NewMarketData};
pub use orders::{NewOrder, OrderRecord, OrderRepository};
pub use snapshots::{NewSnapshot, SnapshotRecord, SnapshotRepository};
pub use transactions::{NewTransaction, TransactionRecord, TransactionRepository};
pub use users::{UserRecord, UserRepository, UserUpsert};
pub use wallets::{WalletRecord, WalletRepository};

use kripta_core::ExchangeResult;

/// 레코드 목록을 도메인 타입으로 변환합니다. 하나라도 실패하면 에러.
pub(crate) fn convert_all<R, T>(records: Vec<R>) -> ExchangeResult<Vec<T>>
where
    T: TryFrom<R, Error = kripta_core::ExchangeError>,
{
    records.into_iter().map(T::try_from).collect()
}
