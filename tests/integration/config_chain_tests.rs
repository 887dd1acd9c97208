//! End-to-end tests for interceptor chains assembled from configuration files

use assert_matches::assert_matches;
use rpc_core::{intercept, ConfigError, Metadata, RpcError, StatusCode};
use rpc_interceptors::{InterceptorChainConfig, InterceptorConfig};
use rpc_tests::{
    dispatch, load_chain_config, setup_test_logging, write_config, EchoService, RecordingCall,
    ECHO_SAY, ECHO_WATCH,
};
use std::sync::Arc;
use std::time::Duration;

const GATEWAY_CHAIN: &str = r#"
[[interceptors]]
type = "logging"
log_headers = false

[[interceptors]]
type = "auth"
header = "x-api-key"
tokens = ["alpha", "beta"]
exempt_methods = ["echo.Echo/Watch"]

[[interceptors]]
type = "rate_limit"
max_calls = 2
window = "500ms"

[[interceptors]]
type = "metadata"

[[interceptors.rules]]
name = "server-tag"
method_pattern = "*"
target = "trailers"
operation = { type = "set", key = "x-served-by", value = "gateway" }

[[interceptors.rules]]
name = "default-cache"
method_pattern = "echo.Echo/Say"
target = "headers"
operation = { type = "add_if_missing", key = "cache-control", value = "no-store" }
"#;

fn api_key(token: &str) -> Metadata {
    let mut headers = Metadata::new();
    headers.insert("x-api-key", format!("Bearer {}", token));
    headers
}

fn call_say(
    service: &rpc_core::ServerServiceDefinition,
    headers: Metadata,
) -> Arc<RecordingCall> {
    let call = Arc::new(RecordingCall::default());
    dispatch(service, ECHO_SAY, call.clone(), headers).unwrap();
    call
}

#[test]
fn test_chain_from_toml_file() {
    setup_test_logging();
    let config = load_chain_config(GATEWAY_CHAIN).unwrap();
    let echo = EchoService::new().unwrap();
    let service = intercept(echo.definition.clone(), config.build().unwrap()).unwrap();

    let call = call_say(&service, api_key("beta"));
    let headers = call.headers().unwrap();
    assert_eq!(headers.get("x-handler"), Some("echo"));
    assert_eq!(headers.get("cache-control"), Some("no-store"));
    let (status, trailers) = call.closed_with().unwrap();
    assert!(status.is_ok());
    assert_eq!(trailers.get("x-served-by"), Some("gateway"));

    let rejected = call_say(&service, api_key("gamma"));
    let (status, trailers) = rejected.closed_with().unwrap();
    assert_eq!(status.code(), StatusCode::Unauthenticated);
    // rejected before the metadata interceptor wrapped the call
    assert!(trailers.get("x-served-by").is_none());

    assert_eq!(echo.invocations(), 1);
}

#[test]
fn test_exempt_method_skips_authentication() {
    let config = load_chain_config(GATEWAY_CHAIN).unwrap();
    let echo = EchoService::new().unwrap();
    let service = intercept(echo.definition.clone(), config.build().unwrap()).unwrap();

    let call = Arc::new(RecordingCall::default());
    dispatch(&service, ECHO_WATCH, call.clone(), Metadata::new()).unwrap();

    assert_eq!(call.payloads().len(), 3);
    // header rule only targets Say
    assert!(call.headers().unwrap().get("cache-control").is_none());
    assert!(call.closed_with().unwrap().0.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_window_from_config() {
    let config = load_chain_config(GATEWAY_CHAIN).unwrap();
    let echo = EchoService::new().unwrap();
    let service = intercept(echo.definition.clone(), config.build().unwrap()).unwrap();

    let codes = |service: &rpc_core::ServerServiceDefinition| -> Vec<StatusCode> {
        (0..3)
            .map(|_| call_say(service, api_key("alpha")).closed_with().unwrap().0.code())
            .collect()
    };

    assert_eq!(
        codes(service.as_ref()),
        vec![StatusCode::Ok, StatusCode::Ok, StatusCode::ResourceExhausted]
    );

    tokio::time::advance(Duration::from_millis(600)).await;

    assert_eq!(
        codes(service.as_ref()),
        vec![StatusCode::Ok, StatusCode::Ok, StatusCode::ResourceExhausted]
    );
    assert_eq!(echo.invocations(), 4);
}

#[test]
fn test_saved_config_rebuilds_the_same_chain() {
    let config = load_chain_config(GATEWAY_CHAIN).unwrap();
    let dir = tempfile::tempdir().unwrap();

    for file in ["gateway.json", "gateway.yml"] {
        let path = dir.path().join(file);
        config.to_file(&path).unwrap();
        let reloaded = InterceptorChainConfig::from_file(&path).unwrap();
        assert_eq!(reloaded, config);

        let names: Vec<String> = reloaded
            .build()
            .unwrap()
            .iter()
            .map(|interceptor| interceptor.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "LoggingInterceptor",
                "AuthInterceptor",
                "RateLimitInterceptor",
                "MetadataInterceptor",
            ]
        );
    }
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let (_dir, path) = write_config(
        "chain.json",
        r#"{ "interceptors": [ { "type": "rate_limit", "max_calls": 5, "window": "0s" } ] }"#,
    )
    .unwrap();

    assert_matches!(
        InterceptorChainConfig::from_file(&path),
        Err(RpcError::Config(ConfigError::InvalidValue { parameter, .. })) if parameter == "rate_limit.window"
    );
}

#[test]
fn test_malformed_config_file_is_invalid_format() {
    let (_dir, path) = write_config("chain.yaml", "interceptors: [ { type: auth, tokens: \"oops\" } ]").unwrap();

    assert_matches!(
        InterceptorChainConfig::from_file(&path),
        Err(RpcError::Config(ConfigError::InvalidFormat { .. }))
    );
}

#[test]
fn test_empty_chain_keeps_the_service_definition() {
    let config = load_chain_config("interceptors = []").unwrap();
    assert!(config.interceptors.is_empty());

    let echo = EchoService::new().unwrap();
    let service = intercept(echo.definition.clone(), config.build().unwrap()).unwrap();
    assert!(Arc::ptr_eq(&service, &echo.definition));
}

#[test]
fn test_programmatic_config_matches_file() {
    let from_file = load_chain_config(
        "[[interceptors]]\ntype = \"rate_limit\"\nmax_calls = 3\nwindow = \"2s\"\n",
    )
    .unwrap();
    let built = InterceptorChainConfig {
        interceptors: vec![InterceptorConfig::RateLimit(
            rpc_interceptors::config::RateLimitConfig {
                max_calls: 3,
                window: Duration::from_secs(2),
            },
        )],
    };
    assert_eq!(from_file, built);
}
