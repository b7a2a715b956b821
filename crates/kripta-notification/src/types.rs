//! 이메일 메시지 타입 및 trait 정의.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 렌더링된 이메일 본문 (수신자 제외).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
    /// 제목
    pub subject: String,
    /// HTML 본문
    pub html: String,
    /// 일반 텍스트 대체 본문
    pub text: String,
}

/// 발송할 이메일 메시지.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// 수신자 주소
    pub to: String,
    /// 제목
    pub subject: String,
    /// HTML 본문
    pub html: String,
    /// 일반 텍스트 대체 본문
    pub text: String,
}

impl EmailMessage {
    /// 렌더링된 본문에 수신자를 붙여 메시지를 만듭니다.
    pub fn new(to: impl Into<String>, content: EmailContent) -> Self {
        Self {
            to: to.into(),
            subject: content.subject,
            html: content.html,
            text: content.text,
        }
    }
}

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 이메일 전송기 trait.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 메시지를 전송합니다.
    async fn send(&self, message: &EmailMessage) -> NotificationResult<()>;

    /// 전송기가 활성화되어 있는지 확인합니다.
    fn is_enabled(&self) -> bool;

    /// 전송기 이름을 반환합니다.
    fn name(&self) -> &str;
}
