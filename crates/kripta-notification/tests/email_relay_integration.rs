//! EmailService → HTTP 릴레이 통합 테스트.

use kripta_core::{EmailConfig, OrderSide};
use kripta_notification::{EmailService, OrderConfirmation, WithdrawalConfirmation};
use mockito::Matcher;
use rust_decimal_macros::dec;

fn settings_for(url: String) -> EmailConfig {
    EmailConfig {
        enabled: true,
        api_url: Some(url),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_order_confirmation_reaches_relay() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/send")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""subject":"Order Confirmation - SELL ETH""#.to_string()),
            Matcher::Regex(r"Total: \$6,000\.00".to_string()),
            Matcher::Regex(r"ORD-\d+".to_string()),
        ]))
        .with_status(202)
        .create_async()
        .await;

    let service = EmailService::from_settings(&settings_for(format!("{}/v1/send", server.url())));
    assert!(service.is_enabled());

    let data = OrderConfirmation::new("Erin", OrderSide::Sell, "ETH", dec!(2), dec!(3000));
    assert!(service.send_order_confirmation("erin@example.com", &data).await);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_relay_failure_reports_false() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/send")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let service = EmailService::from_settings(&settings_for(format!("{}/v1/send", server.url())));
    let data = WithdrawalConfirmation::new(
        "Frank",
        "BTC",
        dec!(0.01),
        "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh",
    );

    assert!(!service.send_withdrawal_confirmation("frank@example.com", &data).await);
    mock.assert_async().await;
}
