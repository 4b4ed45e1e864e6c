mod common;

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::*;
use dnscheck::{
    dns::{constants::DNSRcode, enums::DNSResourceType},
    http_server::router,
};
use serde_json::Value;
use tower::ServiceExt;

fn healthy_transport() -> ScriptedTransport {
    let mut transport = delegated("example.com", "com");
    transport.answer("example.com", DNSResourceType::AAAA, vec![aaaa("2001:db8::1")]);
    transport
}

async fn send(transport: ScriptedTransport, request: Request<Body>) -> (StatusCode, Value) {
    let app = router(Arc::new(checker(Arc::new(transport))));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(ScriptedTransport::new(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_get_domain_returns_report() {
    let request = Request::get("/v1/domain/www.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(healthy_transport(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["domain"], "www.example.com");
    assert_eq!(body["question"]["status"], "OK");
    assert_eq!(body["answer"]["domain"], "example.com");
    assert_eq!(body["answer"]["registry"]["tld"], "com");
    assert_eq!(body["answer"]["AAAA"][0], "2001:db8::1");
    assert_eq!(body["answer"]["delegation"]["levels"].as_array().unwrap().len(), 3);
    assert_eq!(body["findings"][0]["checkCode"], "DNS-ICANN-001");
}

#[tokio::test]
async fn test_failed_check_still_answers_200() {
    let mut transport = healthy_transport();
    transport.respond(
        "example.com",
        DNSResourceType::SOA,
        rcode_response(DNSRcode::SERVFAIL),
    );
    let request = Request::get("/v1/domain/example.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(transport, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["status"], "Failed");
    assert!(
        body["question"]["message"]
            .as_str()
            .unwrap()
            .ends_with("(SERVFAIL)")
    );
    assert_eq!(body["findings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_post_form_with_nameserver() {
    let request = Request::post("/v1/domain")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("domain=example.com&nameserver=203.0.113.9"))
        .unwrap();
    let (status, body) = send(healthy_transport(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["domain"], "example.com");
    // The scripted delegation answers any server; the report must still be complete
    assert_eq!(body["question"]["status"], "OK");
}

#[tokio::test]
async fn test_get_with_unresolvable_nameserver_fails() {
    let request = Request::get("/v1/domain/example.com?nameserver=ns.unknown.invalid")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(healthy_transport(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["status"], "Failed");
    assert_eq!(body["question"]["message"], "DNS server could not be reached");
}

#[tokio::test]
async fn test_invalid_domain_reports_failure() {
    let request = Request::get("/v1/domain/com").body(Body::empty()).unwrap();
    let (status, body) = send(ScriptedTransport::new(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["status"], "Failed");
    assert_eq!(
        body["question"]["message"],
        "Domain not OK: com is not a registrable domain"
    );
}

#[tokio::test]
async fn test_post_without_domain_reports_failure() {
    let transport = ScriptedTransport::new();
    let request = Request::post("/v1/domain")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("nameserver=203.0.113.9"))
        .unwrap();
    let (status, body) = send(transport, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["domain"], "");
    assert_eq!(body["question"]["status"], "Failed");
    assert!(body["question"]["message"].as_str().unwrap().starts_with("Domain not OK"));
}
