//! 거래소 도메인 모델.
//!
//! 데이터베이스 행과 분리된 타입으로, 모든 금액은 `Decimal`입니다.

mod cryptocurrency;
mod market_data;
mod order;
mod snapshot;
mod transaction;
mod user;
mod wallet;

pub use cryptocurrency::*;
pub use market_data::*;
pub use order::*;
pub use snapshot::*;
pub use transaction::*;
pub use user::*;
pub use wallet::*;
