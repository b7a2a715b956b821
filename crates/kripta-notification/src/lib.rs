//! # Kripta Notification
//!
//! 거래소 이메일 알림 서비스.
//!
//! 지원 템플릿:
//! - 주문 확인
//! - 입금 확인
//! - 출금 접수
//! - 가격 알림
//! - 보안 경고
//!
//! 실제 전달은 HTTP 메일 릴레이가 담당하며, 전송 실패는
//! [`EmailService`]에서 `false`로 변환되어 호출자에게 전파되지 않습니다.

pub mod http_mail;
pub mod service;
pub mod templates;
pub mod types;

pub use http_mail::*;
pub use service::*;
pub use templates::*;
pub use types::*;
