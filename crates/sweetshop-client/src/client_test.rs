use super::*;
use crate::auth::NoAuth;

fn test_client(base_url: &str) -> ShopClient {
    ShopClient::with_base_url(base_url, 30, "sweetshop-test/0.1", Arc::new(NoAuth))
        .expect("client construction should not fail")
}

#[test]
fn endpoint_appends_to_base_path() {
    let client = test_client("http://localhost:8080/api");
    let url = client.endpoint("sweets/7/purchase").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/sweets/7/purchase");
}

#[test]
fn endpoint_tolerates_trailing_slashes() {
    let client = test_client("http://localhost:8080/api///");
    let url = client.endpoint("sweets").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/api/sweets");
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = ShopClient::with_base_url("not a url", 30, "ua", Arc::new(NoAuth));
    assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
}

#[test]
fn extract_message_prefers_message_field() {
    let body = r#"{"timestamp":"2025-01-01","status":400,"error":"Bad Request","message":"Not enough stock"}"#;
    assert_eq!(
        extract_backend_message(body).as_deref(),
        Some("Not enough stock")
    );
}

#[test]
fn extract_message_falls_back_to_error_field() {
    let body = r#"{"error":"Email already registered"}"#;
    assert_eq!(
        extract_backend_message(body).as_deref(),
        Some("Email already registered")
    );
}

#[test]
fn extract_message_skips_blank_message_field() {
    let body = r#"{"message":"","error":"Internal Server Error"}"#;
    assert_eq!(
        extract_backend_message(body).as_deref(),
        Some("Internal Server Error")
    );
}

#[test]
fn extract_message_accepts_short_plain_text() {
    assert_eq!(
        extract_backend_message("  Sweet out of stock \n").as_deref(),
        Some("Sweet out of stock")
    );
}

#[test]
fn extract_message_ignores_html_and_empty_bodies() {
    assert_eq!(extract_backend_message("<html><body>502</body></html>"), None);
    assert_eq!(extract_backend_message("   "), None);
    assert_eq!(extract_backend_message(r#"{"status":500}"#), None);
}

#[test]
fn sweet_form_rejects_invalid_draft_before_sending() {
    let draft = SweetDraft {
        name: String::new(),
        category: "candy".to_string(),
        price: rust_decimal::Decimal::ONE,
        quantity: 1,
        description: None,
        image_url: None,
    };
    let result = sweet_form(draft, None);
    assert!(matches!(
        result,
        Err(ClientError::InvalidInput(CoreError::EmptyName))
    ));
}
