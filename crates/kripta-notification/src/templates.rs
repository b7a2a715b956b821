//! 이메일 템플릿.
//!
//! 모든 템플릿은 HTML 본문과 일반 텍스트 대체 본문을 함께 생성합니다.
//! 사용자가 입력한 문자열은 HTML에 삽입되기 전에 항상 이스케이프됩니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use kripta_core::{DecimalExt, OrderSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::EmailContent;

/// 템플릿 공통 서명.
const SIGNATURE_HTML: &str = "<p>Best regards,<br/>Kripta Asset Exchange Team</p>";
const SIGNATURE_TEXT: &str = "Best regards,\nKripta Asset Exchange Team";

/// 주소 마스킹 기준 길이.
const MASK_THRESHOLD: usize = 20;
/// 마스킹 시 앞뒤로 남기는 글자 수.
const MASK_KEEP: usize = 10;

/// 참조 ID 접두사.
pub const ORDER_ID_PREFIX: &str = "ORD";
pub const DEPOSIT_ID_PREFIX: &str = "DEP";
pub const WITHDRAWAL_ID_PREFIX: &str = "WTH";

/// 가격 알림 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Above,
    Below,
}

impl PriceDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceDirection::Above => "above",
            PriceDirection::Below => "below",
        }
    }
}

impl fmt::Display for PriceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            _ => Err(format!("Unknown price direction: {}", s)),
        }
    }
}

/// 주문 확인 메일 데이터.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    pub user_name: String,
    pub order_side: OrderSide,
    pub cryptocurrency: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub total: Decimal,
    pub order_id: String,
    pub timestamp: DateTime<Utc>,
}

impl OrderConfirmation {
    /// 현재 시각 기준으로 주문 ID와 합계를 채워 생성합니다.
    pub fn new(
        user_name: impl Into<String>,
        order_side: OrderSide,
        cryptocurrency: impl Into<String>,
        amount: Decimal,
        price: Decimal,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            user_name: user_name.into(),
            order_side,
            cryptocurrency: cryptocurrency.into(),
            amount,
            price,
            total: amount.saturating_mul(price),
            order_id: reference_id(ORDER_ID_PREFIX, timestamp),
            timestamp,
        }
    }
}

/// 입금 확인 메일 데이터.
#[derive(Debug, Clone)]
pub struct DepositConfirmation {
    pub user_name: String,
    pub cryptocurrency: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
}

impl DepositConfirmation {
    pub fn new(user_name: impl Into<String>, cryptocurrency: impl Into<String>, amount: Decimal) -> Self {
        let timestamp = Utc::now();
        Self {
            user_name: user_name.into(),
            cryptocurrency: cryptocurrency.into(),
            amount,
            transaction_id: reference_id(DEPOSIT_ID_PREFIX, timestamp),
            timestamp,
        }
    }
}

/// 출금 접수 메일 데이터.
#[derive(Debug, Clone)]
pub struct WithdrawalConfirmation {
    pub user_name: String,
    pub cryptocurrency: String,
    pub amount: Decimal,
    pub address: String,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
}

impl WithdrawalConfirmation {
    pub fn new(
        user_name: impl Into<String>,
        cryptocurrency: impl Into<String>,
        amount: Decimal,
        address: impl Into<String>,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            user_name: user_name.into(),
            cryptocurrency: cryptocurrency.into(),
            amount,
            address: address.into(),
            transaction_id: reference_id(WITHDRAWAL_ID_PREFIX, timestamp),
            timestamp,
        }
    }
}

/// 가격 알림 메일 데이터.
#[derive(Debug, Clone)]
pub struct PriceAlert {
    pub user_name: String,
    pub cryptocurrency: String,
    pub current_price: Decimal,
    pub alert_price: Decimal,
    pub direction: PriceDirection,
}

/// `PREFIX-<unix millis>` 형식의 참조 ID.
pub fn reference_id(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, at.timestamp_millis())
}

/// HTML 특수 문자를 이스케이프합니다.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 긴 지갑 주소를 앞뒤 10자만 남기고 가립니다.
///
/// 20자 이하의 주소는 그대로 반환합니다.
pub fn mask_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= MASK_THRESHOLD {
        return address.to_string();
    }
    let head: String = chars[..MASK_KEEP].iter().collect();
    let tail: String = chars[chars.len() - MASK_KEEP..].iter().collect();
    format!("{head}...{tail}")
}

/// 수량 표시 (불필요한 0 제거).
fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// 공통 레이아웃으로 감쌉니다.
fn layout(heading: &str, heading_color: &str, body: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: {heading_color};\">{heading}</h2>\
         {body}\
         {SIGNATURE_HTML}\
         </div>"
    )
}

fn details_box(title: &str, lines: &[String]) -> String {
    let rows: String = lines.iter().map(|l| format!("<p>{l}</p>")).collect();
    format!(
        "<div style=\"background: #f3f4f6; padding: 20px; border-radius: 8px; margin: 20px 0;\">\
         <p><strong>{title}:</strong></p>{rows}</div>"
    )
}

/// 주문 확인 메일.
pub fn order_confirmation(data: &OrderConfirmation) -> EmailContent {
    let side = data.order_side.as_str().to_uppercase();
    let crypto = escape_html(&data.cryptocurrency);
    let name = escape_html(&data.user_name);
    let amount = format_amount(data.amount);
    let price = data.price.to_usd_string();
    let total = data.total.to_usd_string();
    let time = format_time(data.timestamp);

    let details = details_box(
        "Order Details",
        &[
            format!("Order ID: {}", data.order_id),
            format!("Type: {side}"),
            format!("Cryptocurrency: {crypto}"),
            format!("Amount: {amount} {crypto}"),
            format!("Price: {price}"),
            format!("<strong>Total: {total}</strong>"),
            format!("Time: {time}"),
        ],
    );
    let html = layout(
        "Order Confirmation",
        "#1f2937",
        &format!(
            "<p>Hi {name},</p><p>Your {side} order has been confirmed!</p>{details}\
             <p>Your order is now active on the Kripta Asset Exchange.</p>"
        ),
    );

    let text = format!(
        "Hi {},\n\nYour {side} order has been confirmed!\n\n\
         Order ID: {}\nType: {side}\nCryptocurrency: {}\nAmount: {amount} {}\n\
         Price: {price}\nTotal: {total}\nTime: {time}\n\n\
         Your order is now active on the Kripta Asset Exchange.\n\n{SIGNATURE_TEXT}",
        data.user_name, data.order_id, data.cryptocurrency, data.cryptocurrency
    );

    EmailContent {
        subject: format!("Order Confirmation - {side} {}", data.cryptocurrency),
        html,
        text,
    }
}

/// 입금 확인 메일.
pub fn deposit_confirmation(data: &DepositConfirmation) -> EmailContent {
    let crypto = escape_html(&data.cryptocurrency);
    let name = escape_html(&data.user_name);
    let amount = format_amount(data.amount);
    let time = format_time(data.timestamp);

    let details = details_box(
        "Deposit Details",
        &[
            format!("Transaction ID: {}", data.transaction_id),
            format!("Cryptocurrency: {crypto}"),
            format!("Amount: {amount} {crypto}"),
            format!("Date: {time}"),
        ],
    );
    let html = layout(
        "Deposit Confirmed",
        "#1f2937",
        &format!(
            "<p>Hi {name},</p><p>Your deposit has been successfully received!</p>{details}\
             <p>The funds are now available in your wallet.</p>"
        ),
    );

    let text = format!(
        "Hi {},\n\nYour deposit has been successfully received!\n\n\
         Transaction ID: {}\nCryptocurrency: {}\nAmount: {amount} {}\nDate: {time}\n\n\
         The funds are now available in your wallet.\n\n{SIGNATURE_TEXT}",
        data.user_name, data.transaction_id, data.cryptocurrency, data.cryptocurrency
    );

    EmailContent {
        subject: format!("Deposit Confirmed - {amount} {}", data.cryptocurrency),
        html,
        text,
    }
}

/// 출금 접수 메일.
pub fn withdrawal_confirmation(data: &WithdrawalConfirmation) -> EmailContent {
    let crypto = escape_html(&data.cryptocurrency);
    let name = escape_html(&data.user_name);
    let amount = format_amount(data.amount);
    let masked = mask_address(&data.address);
    let time = format_time(data.timestamp);

    let details = details_box(
        "Withdrawal Details",
        &[
            format!("Transaction ID: {}", data.transaction_id),
            format!("Cryptocurrency: {crypto}"),
            format!("Amount: {amount} {crypto}"),
            format!("Destination Address: {}", escape_html(&masked)),
            format!("Date: {time}"),
        ],
    );
    let html = layout(
        "Withdrawal Initiated",
        "#1f2937",
        &format!(
            "<p>Hi {name},</p><p>Your withdrawal has been initiated and is being processed.</p>{details}\
             <p>You will receive another email once the withdrawal is confirmed on the blockchain.</p>"
        ),
    );

    let text = format!(
        "Hi {},\n\nYour withdrawal has been initiated and is being processed.\n\n\
         Transaction ID: {}\nCryptocurrency: {}\nAmount: {amount} {}\n\
         Destination Address: {masked}\nDate: {time}\n\n\
         You will receive another email once the withdrawal is confirmed on the blockchain.\n\n\
         {SIGNATURE_TEXT}",
        data.user_name, data.transaction_id, data.cryptocurrency, data.cryptocurrency
    );

    EmailContent {
        subject: format!("Withdrawal Initiated - {amount} {}", data.cryptocurrency),
        html,
        text,
    }
}

/// 가격 알림 메일.
pub fn price_alert(data: &PriceAlert) -> EmailContent {
    let crypto = escape_html(&data.cryptocurrency);
    let name = escape_html(&data.user_name);
    let current = data.current_price.to_usd_string();
    let target = data.alert_price.to_usd_string();
    let direction = data.direction.as_str();

    let details = details_box(
        "Alert Details",
        &[
            format!("Cryptocurrency: {crypto}"),
            format!("Current Price: {current}"),
            format!("Alert Price: {target}"),
            format!("Direction: Price went {direction} your alert"),
        ],
    );
    let html = layout(
        &format!("Price Alert - {crypto}"),
        "#1f2937",
        &format!(
            "<p>Hi {name},</p><p>{crypto} has moved {direction} your alert price!</p>{details}\
             <p><a href=\"https://kripta.exchange/trading\" style=\"background: #3b82f6; color: white; \
             padding: 10px 20px; text-decoration: none; border-radius: 4px; display: inline-block;\">\
             Open Trading</a></p>"
        ),
    );

    let text = format!(
        "Hi {},\n\n{} has moved {direction} your alert price!\n\n\
         Cryptocurrency: {}\nCurrent Price: {current}\nAlert Price: {target}\n\
         Direction: Price went {direction} your alert\n\n\
         Open Trading: https://kripta.exchange/trading\n\n{SIGNATURE_TEXT}",
        data.user_name, data.cryptocurrency, data.cryptocurrency
    );

    EmailContent {
        subject: format!("Price Alert: {} is now {current}", data.cryptocurrency),
        html,
        text,
    }
}

/// 보안 경고 메일.
pub fn security_alert(message: &str) -> EmailContent {
    let escaped = escape_html(message);
    let html = layout(
        "Security Alert",
        "#dc2626",
        &format!(
            "<p>We detected unusual activity on your Kripta account.</p>\
             <div style=\"background: #fee2e2; padding: 20px; border-radius: 8px; margin: 20px 0; \
             border-left: 4px solid #dc2626;\"><p>{escaped}</p></div>\
             <p>If this wasn't you, please change your password immediately and enable two-factor authentication.</p>\
             <p><a href=\"https://kripta.exchange/settings/security\" style=\"background: #dc2626; color: white; \
             padding: 10px 20px; text-decoration: none; border-radius: 4px; display: inline-block;\">\
             Update Security Settings</a></p>"
        ),
    );

    let text = format!(
        "We detected unusual activity on your Kripta account.\n\n{message}\n\n\
         If this wasn't you, please change your password immediately and enable two-factor authentication.\n\
         Update Security Settings: https://kripta.exchange/settings/security\n\n{SIGNATURE_TEXT}"
    );

    EmailContent {
        subject: "Security Alert - Unusual Activity Detected".to_string(),
        html,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Bitcoin"), "Bitcoin");
    }

    #[test]
    fn test_mask_address() {
        assert_eq!(mask_address("short"), "short");
        assert_eq!(mask_address("12345678901234567890"), "12345678901234567890");
        assert_eq!(
            mask_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x12345678...ef12345678"
        );
    }

    #[test]
    fn test_reference_id() {
        let at = fixed_time();
        assert_eq!(
            reference_id(ORDER_ID_PREFIX, at),
            format!("ORD-{}", at.timestamp_millis())
        );
    }

    #[test]
    fn test_order_confirmation_content() {
        let data = OrderConfirmation {
            user_name: "Alice".to_string(),
            order_side: OrderSide::Buy,
            cryptocurrency: "BTC".to_string(),
            amount: dec!(0.50),
            price: dec!(45000),
            total: dec!(22500),
            order_id: "ORD-1".to_string(),
            timestamp: fixed_time(),
        };

        let email = order_confirmation(&data);
        assert_eq!(email.subject, "Order Confirmation - BUY BTC");
        assert!(email.html.contains("Price: $45,000.00"));
        assert!(email.html.contains("Total: $22,500.00"));
        assert!(email.html.contains("Amount: 0.5 BTC"));
        assert!(email.text.contains("Order ID: ORD-1"));
        assert!(email.text.contains("2024-03-15 12:30:00 UTC"));
    }

    #[test]
    fn test_order_confirmation_new_computes_total() {
        let data = OrderConfirmation::new("Bob", OrderSide::Sell, "ETH", dec!(2), dec!(3000.5));
        assert_eq!(data.total, dec!(6001.0));
        assert!(data.order_id.starts_with("ORD-"));
    }

    #[test]
    fn test_order_confirmation_total_saturates() {
        let huge = dec!(1000000000000000);
        let data = OrderConfirmation::new("Bob", OrderSide::Buy, "BTC", huge, huge);
        assert_eq!(data.total, Decimal::MAX);
    }

    #[test]
    fn test_user_strings_are_escaped() {
        let data = DepositConfirmation {
            user_name: "<b>Mallory</b>".to_string(),
            cryptocurrency: "<img src=x>".to_string(),
            amount: dec!(1),
            transaction_id: "DEP-1".to_string(),
            timestamp: fixed_time(),
        };

        let email = deposit_confirmation(&data);
        assert!(!email.html.contains("<b>Mallory</b>"));
        assert!(!email.html.contains("<img src=x>"));
        assert!(email.html.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
    }

    #[test]
    fn test_withdrawal_masks_address() {
        let data = WithdrawalConfirmation::new(
            "Carol",
            "ETH",
            dec!(1.25),
            "0x1234567890abcdef1234567890abcdef12345678",
        );

        let email = withdrawal_confirmation(&data);
        assert!(data.transaction_id.starts_with("WTH-"));
        assert!(email.html.contains("0x12345678...ef12345678"));
        assert!(!email.text.contains("0x1234567890abcdef1234567890abcdef12345678"));
        assert_eq!(email.subject, "Withdrawal Initiated - 1.25 ETH");
    }

    #[test]
    fn test_price_alert_content() {
        let email = price_alert(&PriceAlert {
            user_name: "Dave".to_string(),
            cryptocurrency: "SOL".to_string(),
            current_price: dec!(151.456),
            alert_price: dec!(150),
            direction: PriceDirection::Above,
        });

        assert_eq!(email.subject, "Price Alert: SOL is now $151.46");
        assert!(email.html.contains("moved above your alert price"));
        assert!(email.text.contains("Alert Price: $150.00"));
    }

    #[test]
    fn test_security_alert_escapes_message() {
        let email = security_alert("New login from <unknown> device");
        assert!(email.html.contains("New login from &lt;unknown&gt; device"));
        assert!(email.text.contains("New login from <unknown> device"));
        assert_eq!(email.subject, "Security Alert - Unusual Activity Detected");
    }

    #[test]
    fn test_price_direction_from_str() {
        assert_eq!("above".parse::<PriceDirection>().unwrap(), PriceDirection::Above);
        assert_eq!("BELOW".parse::<PriceDirection>().unwrap(), PriceDirection::Below);
        assert!("sideways".parse::<PriceDirection>().is_err());
    }
}
