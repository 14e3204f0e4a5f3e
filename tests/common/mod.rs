//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;

use request_correlation::config::AppConfig;
use request_correlation::http::CorrelationSnapshot;
use request_correlation::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A server running on an ephemeral port; stops when dropped.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the server with the two toggles set as given.
pub async fn start_server(filter_enabled: bool, span_interceptor_enabled: bool) -> TestServer {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.header.filter.enabled = filter_enabled;
    config.header.span_interceptor.enabled = span_interceptor_enabled;
    start_with_config(config).await
}

#[allow(dead_code)]
pub async fn start_with_config(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer { addr, shutdown }
}

/// Send a request to `GET /correlation` with the given headers and decode the response.
pub async fn send_request(
    client: &reqwest::Client,
    addr: SocketAddr,
    headers: HashMap<&str, &str>,
) -> CorrelationSnapshot {
    let mut request = client.get(format!("http://{}/correlation", addr));
    for (name, value) in headers {
        request = request.header(name, value);
    }
    let response = request.send().await.expect("server unreachable");
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
