//! HTTP contract tests against a spawned execution service

use crate::common::{has_interpreter, setup_test_logging, spawn_server};
use polyrun_common::RunResponse;
use polyrun_server::ServerConfig;
use serde_json::json;
use std::net::SocketAddr;

fn python_only_config() -> ServerConfig {
    ServerConfig {
        languages: vec!["python".to_string()],
        ..ServerConfig::default()
    }
}

async fn python_server() -> Option<SocketAddr> {
    if !has_interpreter("python3") {
        eprintln!("skipping: python3 not installed");
        return None;
    }
    Some(
        spawn_server(python_only_config())
            .await
            .expect("failed to spawn test server"),
    )
}

async fn post_execute(addr: SocketAddr, body: serde_json::Value) -> RunResponse {
    reqwest::Client::new()
        .post(format!("http://{addr}/execute"))
        .json(&body)
        .send()
        .await
        .expect("request failed")
        .json()
        .await
        .expect("invalid response body")
}

#[tokio::test]
async fn test_execute_success_contract() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let response = post_execute(
        addr,
        json!({ "language": "python", "code": "print(1+1)" }),
    )
    .await;
    assert!(response.success);
    assert_eq!(response.output.as_deref(), Some("2\n"));
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_execute_failure_carries_diagnostic() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let response = post_execute(addr, json!({ "language": "python", "code": "1/0" })).await;
    assert!(!response.success);
    assert!(response.error.unwrap().contains("ZeroDivisionError"));
}

#[tokio::test]
async fn test_unknown_language_is_rejected_uniformly() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let response = post_execute(addr, json!({ "language": "ruby", "code": "puts 1" })).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("unsupported language"));
}

#[tokio::test]
async fn test_empty_code_is_rejected_before_dispatch() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let response = post_execute(addr, json!({ "language": "python", "code": "  " })).await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("code must not be empty"));
}

#[tokio::test]
async fn test_timeout_message_at_the_boundary() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let response = post_execute(
        addr,
        json!({
            "language": "python",
            "code": "while True:\n    pass",
            "timeout_ms": 1000,
        }),
    )
    .await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("execution timed out"));
}

#[tokio::test]
async fn test_inputs_pass_through_the_wire() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let response = post_execute(
        addr,
        json!({
            "language": "python",
            "code": "print(input())",
            "inputs": ["over the wire"],
        }),
    )
    .await;
    assert!(response.success);
    assert_eq!(response.output.as_deref(), Some("over the wire\n"));
}

#[tokio::test]
async fn test_health_endpoint() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_languages_endpoint_lists_registry() {
    setup_test_logging();
    let Some(addr) = python_server().await else {
        return;
    };
    let body: Vec<String> = reqwest::get(format!("http://{addr}/languages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, vec!["python".to_string()]);
}
