//! Integration tests for `ShopClient` using wiremock HTTP mocks.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use sweetshop_client::{ClientError, LocalLogin, NoAuth, ShopClient, StaticToken, TokenProvider};
use sweetshop_core::{CoreError, PurchaseRequest, Role, SweetDraft};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str, tokens: Arc<dyn TokenProvider>) -> ShopClient {
    ShopClient::with_base_url(base_url, 5, "sweetshop-test/0.1", tokens)
        .expect("client construction should not fail")
}

fn api_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

fn choco_json(quantity: u32) -> serde_json::Value {
    json!({
        "id": 1,
        "name": "Choco Bar",
        "category": "chocolate",
        "price": 5.00,
        "quantity": quantity,
        "description": "Milk chocolate",
        "imageUrl": null
    })
}

fn draft() -> SweetDraft {
    SweetDraft {
        name: "Choco Bar".to_string(),
        category: "chocolate".to_string(),
        price: Decimal::new(500, 2),
        quantity: 3,
        description: None,
        image_url: None,
    }
}

#[tokio::test]
async fn list_sweets_returns_parsed_products() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            choco_json(3),
            {"id": 2, "name": "Sour Worms", "category": "sour", "price": 2.5, "quantity": 0}
        ])))
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let sweets = client.list_sweets().await.expect("should parse sweets");

    assert_eq!(sweets.len(), 2);
    assert_eq!(sweets[0].name, "Choco Bar");
    assert_eq!(sweets[0].price, Decimal::new(500, 2));
    assert_eq!(sweets[1].quantity, 0);
    assert!(sweets[1].description.is_none());
}

#[tokio::test]
async fn bearer_token_is_attached_to_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/purchases/my"))
        .and(header("authorization", "Bearer tok_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(StaticToken::new("tok_abc")));
    let purchases = client.my_purchases().await.expect("authorized request");
    assert!(purchases.is_empty());
}

#[tokio::test]
async fn purchase_posts_raw_quantity_and_returns_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/1/purchase"))
        .and(body_json(json!(2)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 41,
            "sweetId": 1,
            "sweetName": "Choco Bar",
            "quantity": 2,
            "pricePerUnit": 5.00,
            "totalPrice": 10.00,
            "customerEmail": "ann@sweets.test",
            "createdDate": "2025-11-02T14:05:09"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(StaticToken::new("tok")));
    let record = client
        .purchase_sweet(PurchaseRequest {
            product_id: 1,
            quantity: 2,
        })
        .await
        .expect("purchase should succeed");

    assert_eq!(record.id, 41);
    assert_eq!(format!("{:.2}", record.total_price), "10.00");
}

#[tokio::test]
async fn rejected_purchase_carries_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/1/purchase"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": 400,
            "error": "Bad Request",
            "message": "Insufficient stock"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let err = client
        .purchase_sweet(PurchaseRequest {
            product_id: 1,
            quantity: 9,
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, ClientError::Api { status: 400, ref message } if message.as_deref() == Some("Insufficient stock")),
        "unexpected error: {err:?}"
    );
    assert_eq!(err.user_message("Purchase failed"), "Insufficient stock");
}

#[tokio::test]
async fn rejection_without_body_uses_generic_message() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/sweets/5"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let err = client.delete_sweet(5).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.user_message("Failed to delete sweet"), "Failed to delete sweet");
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/sweets/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    client.delete_sweet(5).await.expect("delete should succeed");
}

#[tokio::test]
async fn restock_posts_quantity_and_returns_product() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sweets/1/restock"))
        .and(body_json(json!(20)))
        .respond_with(ResponseTemplate::new(200).set_body_json(choco_json(23)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let product = client.restock_sweet(1, 20).await.expect("restock should succeed");
    assert_eq!(product.quantity, 23);
}

#[tokio::test]
async fn restock_of_zero_is_rejected_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let err = client.restock_sweet(1, 0).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::InvalidInput(CoreError::InvalidRestockQuantity(_))
    ));
    assert!(!err.to_string().contains("sweet"));
}

#[tokio::test]
async fn create_sends_multipart_sweet_part() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sweets"))
        .and(header_exists_multipart())
        .and(body_string_contains("name=\"sweet\""))
        .and(body_string_contains("\"name\":\"Choco Bar\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(choco_json(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let product = client
        .create_sweet(draft(), None)
        .await
        .expect("create should succeed");
    assert_eq!(product.id, 1);
}

fn header_exists_multipart() -> impl wiremock::Match {
    struct IsMultipart;
    impl wiremock::Match for IsMultipart {
        fn matches(&self, request: &wiremock::Request) -> bool {
            request
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("multipart/form-data"))
        }
    }
    IsMultipart
}

#[tokio::test]
async fn update_attaches_image_part() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/sweets/1"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"choco.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(choco_json(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let image = sweetshop_client::ImageUpload {
        file_name: "choco.png".to_string(),
        mime: "image/png",
        bytes: b"fake-png-bytes".to_vec(),
    };
    client
        .update_sweet(1, draft(), Some(image))
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let err = client.list_sweets().await.unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }));
}

#[tokio::test]
async fn search_images_sends_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/images/search"))
        .and(query_param("query", "dark chocolate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["https://img.example/1.jpg", "https://img.example/2.jpg"])),
        )
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let urls = client
        .search_images("dark chocolate")
        .await
        .expect("should parse urls");
    assert_eq!(urls.len(), 2);
}

#[tokio::test]
async fn register_posts_credentials_and_role() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "email": "new@sweets.test",
            "password": "pw",
            "role": "USER"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "email": "new@sweets.test",
            "role": "USER",
            "password": "$2a$10$hash"
        })))
        .mount(&server)
        .await;

    let client = test_client(&api_url(&server), Arc::new(NoAuth));
    let user = client
        .register("new@sweets.test", "pw", Role::User)
        .await
        .expect("registration should succeed");
    assert_eq!(user.id, 9);
    assert_eq!(user.role.as_deref(), Some("USER"));
}

#[tokio::test]
async fn local_login_token_is_cached_and_attached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ann@sweets.test", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt_local"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/purchases/my"))
        .and(header("authorization", "Bearer jwt_local"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let login = LocalLogin::new(&api_url(&server), 5, "ann@sweets.test", "pw")
        .expect("login provider should build");
    let client = test_client(&api_url(&server), Arc::new(login));
    client.my_purchases().await.expect("first call logs in");
    client.my_purchases().await.expect("second call reuses token");
}

#[tokio::test]
async fn failed_local_login_sends_request_without_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid credentials"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/sweets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let login = LocalLogin::new(&api_url(&server), 5, "ann@sweets.test", "wrong")
        .expect("login provider should build");
    let err = login.token().await.unwrap_err();
    assert_eq!(err.user_message("login failed"), "Invalid credentials");

    let client = test_client(&api_url(&server), Arc::new(login));
    let sweets = client.list_sweets().await.expect("catalog is public");
    assert!(sweets.is_empty());
}
