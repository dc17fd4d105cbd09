use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use paygate::{
    ClientConfig, CreateOrderRequest, Currency, ErrorKind, HttpRequest, HttpResponse,
    HttpTransport, OrderData, OrderQuery, OrderStatus, ParamSet, PayGateClient, PayGateError,
    PaymentMethod, TransportError, sign_md5,
};
use reqwest::Method;
use serde_json::json;

type Reply = Result<HttpResponse, TransportError>;

/// Replays canned replies and records every request it sees.
struct StubTransport {
    replies: Mutex<VecDeque<Reply>>,
    seen: Arc<Mutex<Vec<HttpRequest>>>,
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub ran out of replies")
    }
}

fn stub_client(replies: Vec<Reply>) -> (PayGateClient, Arc<Mutex<Vec<HttpRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let transport = StubTransport {
        replies: Mutex::new(replies.into()),
        seen: Arc::clone(&seen),
    };
    let config = ClientConfig::builder()
        .base_url("https://pay.example.com/")
        .app_id("app-1")
        .api_key("key123")
        .client_ip("203.0.113.7")
        .build()
        .unwrap();
    (PayGateClient::with_transport(config, transport), seen)
}

fn ok(body: serde_json::Value) -> Reply {
    Ok(HttpResponse::new(200, body.to_string()))
}

fn alipay_order(amount: f64) -> CreateOrderRequest {
    CreateOrderRequest::new(amount, Currency::Cny, PaymentMethod::Alipay)
}

#[tokio::test]
async fn create_order_returns_data_on_success() {
    let (client, seen) = stub_client(vec![ok(json!({
        "code": 1,
        "message": "success",
        "data": {"orderId": "X", "qrImageUrl": "https://pay.example.com/qr/X.png", "status": 0}
    }))]);

    let resp = client.create_order(&alipay_order(100.0)).await.unwrap();
    assert_eq!(resp.data.order_id, "X");
    assert_eq!(resp.message, "success");
    assert_eq!(resp.data.status.and_then(OrderStatus::from_code), Some(OrderStatus::Pending));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let req = &seen[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.url, "https://pay.example.com/api/createorder");
    assert!(req.query.is_empty());

    let body = req.body.as_ref().unwrap();
    assert_eq!(body["appid"], json!("app-1"));
    assert_eq!(body["clientip"], json!("203.0.113.7"));
    assert_eq!(body["amount"], json!(100));
    assert_eq!(body["sign_type"], json!("MD5"));

    // The server recomputes the signature from the body it receives.
    let received: ParamSet = body
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    assert_eq!(body["sign"], json!(sign_md5(&received, "key123")));
}

#[tokio::test]
async fn create_order_domain_failure_carries_server_message() {
    let (client, _) = stub_client(vec![ok(json!({"code": 0, "message": "dup"}))]);

    let err = client.create_order(&alipay_order(100.0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert_eq!(err.to_string(), "dup");
}

#[tokio::test]
async fn create_order_domain_failure_without_message_uses_fallback() {
    let (client, _) = stub_client(vec![ok(json!({"code": 0}))]);

    let err = client.create_order(&alipay_order(5.0)).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to create order");
}

#[tokio::test]
async fn create_order_validation_happens_before_network() {
    let (client, seen) = stub_client(vec![]);

    for amount in [0.0, -5.0] {
        let err = client.create_order(&alipay_order(amount)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    let mut req = alipay_order(10.0);
    req.currency = "EUR".into();
    assert!(matches!(
        client.create_order(&req).await,
        Err(PayGateError::Validation(_))
    ));

    let mut req = alipay_order(10.0);
    req.payment_method = "unknown".into();
    assert!(matches!(
        client.create_order(&req).await,
        Err(PayGateError::Validation(_))
    ));

    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn http_error_body_becomes_domain_error() {
    let (client, _) = stub_client(vec![Ok(HttpResponse::new(400, r#"{"message":"bad sign"}"#))]);

    let err = client.create_order(&alipay_order(1.0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert_eq!(err.to_string(), "bad sign");
    assert!(matches!(err, PayGateError::Api { status: Some(400), code: None, .. }));
}

#[tokio::test]
async fn timeout_becomes_connectivity_error() {
    let (client, _) = stub_client(vec![Err(TransportError::NoResponse(
        "operation timed out".into(),
    ))]);

    let err = client.create_order(&alipay_order(1.0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "Network error: No response from server");
}

#[tokio::test]
async fn other_transport_failure_is_unexpected() {
    let (client, _) = stub_client(vec![Err(TransportError::Other("tls handshake".into()))]);

    let err = client.get_exchange_rate().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn query_order_caps_limit_and_signs_query() {
    let (client, seen) = stub_client(vec![ok(json!({
        "code": 1,
        "message": "ok",
        "data": [
            {"orderId": "A", "amount": 10, "currency": "CNY", "status": 2, "status_str": "paid"},
            {"orderId": "B", "amount": 5.5, "currency": "USD", "status": 0, "status_str": "pending"}
        ]
    }))]);

    let resp = client.query_order(&OrderQuery::page(2, 1000)).await.unwrap();
    let records = resp.data.into_vec();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].order_status(), Some(OrderStatus::Paid));

    let seen = seen.lock().unwrap();
    let req = &seen[0];
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.url, "https://pay.example.com/api/order");
    assert!(req.body.is_none());
    assert_eq!(req.query_param("limit"), Some("50"));
    assert_eq!(req.query_param("page"), Some("2"));
    assert_eq!(req.query_param("action"), Some("orders"));
    assert_eq!(req.query_param("sign_type"), Some("MD5"));
    assert_eq!(req.query_param("orderId"), None);

    let received: ParamSet = req.query.iter().cloned().collect();
    let expected = sign_md5(&received, "key123");
    assert_eq!(req.query_param("sign"), Some(expected.as_str()));
}

#[tokio::test]
async fn query_single_order() {
    let (client, seen) = stub_client(vec![ok(json!({
        "code": 1,
        "message": "ok",
        "data": {"orderId": "ORD-1", "status": 4, "status_str": "cancelled", "completedTime": null}
    }))]);

    let resp = client.query_order(&OrderQuery::by_id("ORD-1")).await.unwrap();
    match resp.data {
        OrderData::Single(record) => {
            assert_eq!(record.order_id, "ORD-1");
            assert!(record.order_status().unwrap().is_terminal());
        }
        OrderData::List(_) => panic!("expected a single record"),
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].query_param("action"), Some("order"));
    assert_eq!(seen[0].query_param("orderId"), Some("ORD-1"));
}

#[tokio::test]
async fn query_order_failure_uses_fallback() {
    let (client, _) = stub_client(vec![Ok(HttpResponse::new(500, ""))]);

    let err = client.query_order(&OrderQuery::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to query order");
}

#[tokio::test]
async fn check_order_status_is_public_and_unwrapped() {
    let (client, seen) = stub_client(vec![ok(json!({
        "status": "paid",
        "statusCode": 2,
        "orderId": "A/1"
    }))]);

    let resp = client.check_order_status("A/1").await.unwrap();
    assert_eq!(resp.status, "paid");
    assert_eq!(resp.order_status(), Some(OrderStatus::Paid));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].url, "https://pay.example.com/api/order/status/A%2F1");
    assert!(seen[0].query.is_empty());
}

#[tokio::test]
async fn check_order_status_failures() {
    let (client, seen) = stub_client(vec![
        Ok(HttpResponse::new(404, r#"{"error":"Order not found"}"#)),
        Err(TransportError::NoResponse("connection reset".into())),
    ]);

    let err = client.check_order_status("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);
    assert_eq!(err.to_string(), "Order not found");

    let err = client.check_order_status("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);

    let err = client.check_order_status("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn exchange_rate_unsigned_get() {
    let (client, seen) = stub_client(vec![
        ok(json!({"code": 1, "message": "ok", "data": {"exchangeRate": 7.12}})),
        ok(json!({"code": 0})),
    ]);

    let resp = client.get_exchange_rate().await.unwrap();
    assert!((resp.data.exchange_rate - 7.12).abs() < f64::EPSILON);

    let err = client.get_exchange_rate().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to get exchange rate");

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].url, "https://pay.example.com/api/config/exchange-rate");
    assert!(seen[0].query.is_empty());
    assert!(seen[0].body.is_none());
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let replies = (0..4)
        .map(|_| ok(json!({"code": 1, "message": "ok", "data": {"exchangeRate": 7.0}})))
        .collect();
    let (client, seen) = stub_client(replies);
    let client = Arc::new(client);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.get_exchange_rate().await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(seen.lock().unwrap().len(), 4);
}
