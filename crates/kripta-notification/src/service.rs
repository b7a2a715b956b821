//! 이메일 알림 서비스.
//!
//! 템플릿 렌더링과 전송을 묶습니다. 전송 실패는 로그로만 남기고
//! `false`로 반환하여 호출한 요청이 실패하지 않도록 합니다.

use std::sync::Arc;

use kripta_core::EmailConfig;
use tracing::{error, info, warn};

use crate::http_mail::{HttpMailConfig, HttpMailSender};
use crate::templates::{
    deposit_confirmation, order_confirmation, price_alert, security_alert, withdrawal_confirmation,
    DepositConfirmation, OrderConfirmation, PriceAlert, WithdrawalConfirmation,
};
use crate::types::{EmailContent, EmailMessage, EmailSender};

/// 템플릿 이메일 발송 서비스.
#[derive(Clone, Default)]
pub struct EmailService {
    sender: Option<Arc<dyn EmailSender>>,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("sender", &self.sender.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

impl EmailService {
    /// 주어진 전송기로 서비스를 생성합니다.
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// 전송기가 없는 서비스. 모든 발송이 `false`를 반환합니다.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// email 설정에서 HTTP 릴레이 기반 서비스를 생성합니다.
    pub fn from_settings(settings: &EmailConfig) -> Self {
        match HttpMailConfig::from_settings(settings) {
            Some(config) if config.enabled => {
                info!(relay = %config.api_url, "E-mail relay configured");
                Self::new(Arc::new(HttpMailSender::new(config)))
            }
            _ => {
                warn!("E-mail relay not configured, notifications will not be delivered");
                Self::disabled()
            }
        }
    }

    /// 전송기가 설정되어 있고 활성 상태인지 확인합니다.
    pub fn is_enabled(&self) -> bool {
        self.sender.as_ref().is_some_and(|s| s.is_enabled())
    }

    /// 렌더링된 메일을 발송합니다. 성공 여부만 반환합니다.
    pub async fn send(&self, to: &str, content: EmailContent) -> bool {
        let Some(sender) = &self.sender else {
            warn!("E-mail transport not initialized");
            return false;
        };

        let message = EmailMessage::new(to, content);
        match sender.send(&message).await {
            Ok(()) => {
                info!(sender = sender.name(), subject = %message.subject, "E-mail sent");
                true
            }
            Err(e) => {
                error!(sender = sender.name(), subject = %message.subject, "Failed to send e-mail: {}", e);
                false
            }
        }
    }

    /// 주문 확인 메일을 발송합니다.
    pub async fn send_order_confirmation(&self, to: &str, data: &OrderConfirmation) -> bool {
        self.send(to, order_confirmation(data)).await
    }

    /// 입금 확인 메일을 발송합니다.
    pub async fn send_deposit_confirmation(&self, to: &str, data: &DepositConfirmation) -> bool {
        self.send(to, deposit_confirmation(data)).await
    }

    /// 출금 접수 메일을 발송합니다.
    pub async fn send_withdrawal_confirmation(&self, to: &str, data: &WithdrawalConfirmation) -> bool {
        self.send(to, withdrawal_confirmation(data)).await
    }

    /// 가격 알림 메일을 발송합니다.
    pub async fn send_price_alert(&self, to: &str, data: &PriceAlert) -> bool {
        self.send(to, price_alert(data)).await
    }

    /// 보안 경고 메일을 발송합니다.
    pub async fn send_security_alert(&self, to: &str, message: &str) -> bool {
        self.send(to, security_alert(message)).await
    }
}
