//! HTTP 메일 릴레이 전송기.
//!
//! JSON 요청 한 번으로 메일을 전달하는 릴레이 API를 호출합니다.
//! 요청 본문은 `{from, to, subject, html, text}` 형식입니다.

use async_trait::async_trait;
use kripta_core::EmailConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, warn};

use crate::types::{EmailMessage, EmailSender, NotificationError, NotificationResult};

/// 릴레이가 재시도 시간을 알려주지 않을 때의 기본 대기 시간 (초).
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// HTTP 메일 릴레이 설정.
#[derive(Debug, Clone)]
pub struct HttpMailConfig {
    /// 릴레이 API 주소
    pub api_url: String,
    /// Bearer 인증 키
    pub api_key: Option<SecretString>,
    /// 발신 주소
    pub from_address: String,
    /// 발신자 표시 이름
    pub from_name: String,
    /// 전송 활성화 여부
    pub enabled: bool,
}

impl HttpMailConfig {
    /// 새 릴레이 설정을 생성합니다.
    pub fn new(api_url: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: None,
            from_address: from_address.into(),
            from_name: "Kripta Asset Exchange".to_string(),
            enabled: true,
        }
    }

    /// API 키를 설정합니다.
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// 애플리케이션 설정의 email 섹션에서 생성합니다.
    ///
    /// 릴레이 주소가 없으면 `None`.
    pub fn from_settings(settings: &EmailConfig) -> Option<Self> {
        let api_url = settings.api_url.clone().filter(|u| !u.is_empty())?;
        Some(Self {
            api_url,
            api_key: settings.api_key.clone(),
            from_address: settings.from_address.clone(),
            from_name: settings.from_name.clone(),
            enabled: settings.enabled,
        })
    }

    /// 환경 변수에서 설정을 생성합니다.
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("EMAIL_API_URL").ok()?;
        let from_address =
            std::env::var("EMAIL_FROM").unwrap_or_else(|_| "noreply@kripta.exchange".to_string());
        let enabled = std::env::var("EMAIL_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let mut config = Self::new(api_url, from_address);
        config.enabled = enabled;
        config.api_key = std::env::var("EMAIL_API_KEY")
            .ok()
            .map(|key| SecretString::new(key.into()));
        Some(config)
    }

    /// `"표시 이름" <주소>` 형식의 발신자 헤더.
    pub fn sender_header(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}

/// HTTP 메일 릴레이 전송기.
pub struct HttpMailSender {
    config: HttpMailConfig,
    client: reqwest::Client,
}

impl HttpMailSender {
    /// 새 전송기를 생성합니다.
    pub fn new(config: HttpMailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// 환경 변수에서 전송기를 생성합니다.
    pub fn from_env() -> Option<Self> {
        HttpMailConfig::from_env().map(Self::new)
    }

    async fn post_message(&self, message: &EmailMessage) -> NotificationResult<()> {
        let payload = serde_json::json!({
            "from": self.config.sender_header(),
            "to": message.to,
            "subject": message.subject,
            "html": message.html,
            "text": message.text,
        });

        debug!(subject = %message.subject, "Posting e-mail to relay");

        let mut request = self.client.post(&self.config.api_url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(NotificationError::NetworkError)?;

        if response.status().is_success() {
            let message_id = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("id").and_then(|v| v.as_str()).map(str::to_string))
                .unwrap_or_default();
            info!(message_id = %message_id, "E-mail accepted by relay");
            Ok(())
        } else {
            let status = response.status();

            if status.as_u16() == 429 {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                warn!(retry_after, "Mail relay rate limited");
                return Err(NotificationError::RateLimited(retry_after));
            }

            let body = response.text().await.unwrap_or_default();
            error!("Mail relay rejected message: {} - {}", status, body);
            Err(NotificationError::SendFailed(format!("HTTP {}: {}", status, body)))
        }
    }
}

#[async_trait]
impl EmailSender for HttpMailSender {
    async fn send(&self, message: &EmailMessage) -> NotificationResult<()> {
        if !self.is_enabled() {
            return Err(NotificationError::InvalidConfig(
                "mail relay is disabled".to_string(),
            ));
        }
        if message.to.trim().is_empty() {
            return Err(NotificationError::InvalidConfig(
                "recipient address is empty".to_string(),
            ));
        }
        self.post_message(message).await
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.api_url.is_empty()
    }

    fn name(&self) -> &str {
        "http-mail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmailContent;
    use mockito::Matcher;

    fn message() -> EmailMessage {
        EmailMessage::new(
            "alice@example.com",
            EmailContent {
                subject: "Deposit Confirmed - 1 BTC".to_string(),
                html: "<p>hi</p>".to_string(),
                text: "hi".to_string(),
            },
        )
    }

    #[test]
    fn test_sender_header() {
        let config = HttpMailConfig::new("http://relay", "noreply@kripta.exchange");
        assert_eq!(
            config.sender_header(),
            "\"Kripta Asset Exchange\" <noreply@kripta.exchange>"
        );
    }

    #[test]
    fn test_from_settings_requires_url() {
        let mut settings = EmailConfig::default();
        assert!(HttpMailConfig::from_settings(&settings).is_none());

        settings.api_url = Some("http://relay/send".to_string());
        settings.enabled = true;
        let config = HttpMailConfig::from_settings(&settings).unwrap();
        assert_eq!(config.from_address, "noreply@kripta.exchange");
        assert!(config.enabled);
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send")
            .match_header("authorization", "Bearer relay-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "to": "alice@example.com",
                "subject": "Deposit Confirmed - 1 BTC",
                "from": "\"Kripta Asset Exchange\" <noreply@kripta.exchange>",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"msg-1"}"#)
            .create_async()
            .await;

        let config = HttpMailConfig::new(format!("{}/send", server.url()), "noreply@kripta.exchange")
            .with_api_key(SecretString::new("relay-key".into()));
        let sender = HttpMailSender::new(config);

        sender.send(&message()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_maps_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send")
            .with_status(429)
            .with_header("retry-after", "15")
            .create_async()
            .await;

        let sender = HttpMailSender::new(HttpMailConfig::new(
            format!("{}/send", server.url()),
            "noreply@kripta.exchange",
        ));

        let err = sender.send(&message()).await.unwrap_err();
        assert!(matches!(err, NotificationError::RateLimited(15)));
    }

    #[tokio::test]
    async fn test_send_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/send")
            .with_status(500)
            .with_body("relay down")
            .create_async()
            .await;

        let sender = HttpMailSender::new(HttpMailConfig::new(
            format!("{}/send", server.url()),
            "noreply@kripta.exchange",
        ));

        match sender.send(&message()).await {
            Err(NotificationError::SendFailed(msg)) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("relay down"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_sender_does_not_call_relay() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/send").expect(0).create_async().await;

        let mut config = HttpMailConfig::new(format!("{}/send", server.url()), "noreply@kripta.exchange");
        config.enabled = false;
        let sender = HttpMailSender::new(config);

        assert!(!sender.is_enabled());
        assert!(sender.send(&message()).await.is_err());
        mock.assert_async().await;
    }
}
