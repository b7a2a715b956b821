//! # Kripta Core
//!
//! 암호화폐 거래소 백엔드의 핵심 도메인 모델 및 공통 인프라.
//!
//! - 도메인 타입 (사용자, 암호화폐, 지갑, 시세, 주문, 거래 내역, 스냅샷)
//! - 잔고 산술 (`ledger`)
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
