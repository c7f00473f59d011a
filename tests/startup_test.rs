//! Fatal startup conditions.

use std::collections::HashMap;

use pubsub_bridge::config::load_with;
use pubsub_bridge::lifecycle;
use pubsub_bridge::BridgeError;

mod common;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_each_required_variable_is_fatal() {
    let all = [
        ("PROJECT_ID", "p1"),
        ("GOOGLE_APPLICATION_CREDENTIALS", "/c"),
        ("TOPIC", "t1"),
    ];

    for skip in 0..all.len() {
        let vars: Vec<_> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, kv)| *kv)
            .collect();

        let err = load_with(None, env(&vars)).unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().contains(all[skip].0));
    }

    assert!(load_with(None, env(&all)).is_ok());
}

#[test]
fn test_binary_reports_missing_variable_and_exits() {
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_pubsub-bridge"))
        .env_clear()
        .env("PROJECT_ID", "p1")
        .env("GOOGLE_APPLICATION_CREDENTIALS", "/c")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("TOPIC must be set and non-empty"),
        "stderr: {}",
        stderr
    );
    assert!(!stderr.contains("Missing("));
}

#[tokio::test]
async fn test_unreadable_credentials_stop_before_binding() {
    // Reserve a port, then release it for the bridge to (not) use.
    let probe = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = probe.local_addr().unwrap();
    drop(probe);

    let mut config = common::bridge_config(None);
    config.pubsub.credentials = "/nonexistent/service-account.json".into();
    config.listener.bind_address = addr.to_string();

    let err = lifecycle::run(config).await.unwrap_err();
    assert!(matches!(err, BridgeError::ClientConstruction { .. }));
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_bind_failure_is_listener_error() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = common::start_mock_pubsub(common::MockBehavior::Accept).await;

    let mut config = common::bridge_config(Some(mock.addr));
    config.listener.bind_address = taken.local_addr().unwrap().to_string();

    let err = lifecycle::run(config).await.unwrap_err();
    assert!(matches!(err, BridgeError::Listener(_)));
}
