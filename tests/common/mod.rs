//! Shared utilities for integration and load testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use fanout_gateway::config::GatewayConfig;
use fanout_gateway::http::GatewayServer;
use fanout_gateway::lifecycle::Shutdown;

/// A programmable upstream on an ephemeral port.
///
/// `f` receives the zero-based index of the call (by accept order) and
/// returns the status and body to answer with; it may sleep first.
#[allow(dead_code)]
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, Arc<AtomicUsize>)
where
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let f = Arc::new(f);

    let counter = calls.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let index = counter.fetch_add(1, Ordering::SeqCst);
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let (status, body) = f(index).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, calls)
}

/// Answer every call after `delay` with `body`.
#[allow(dead_code)]
pub async fn start_fixed_upstream(delay: Duration, body: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    start_programmable_upstream(move |_| async move {
        tokio::time::sleep(delay).await;
        (200, body.to_string())
    })
    .await
}

/// A running gateway pointed at `upstream`.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a gateway on an ephemeral port against `upstream`.
pub async fn start_gateway(upstream: SocketAddr) -> TestGateway {
    let mut config = GatewayConfig::default();
    config.upstream.url = format!("http://{}/api/work", upstream);
    config.upstream.use_env_proxy = false;
    config.listener.host = "127.0.0.1".to_string();

    let server = GatewayServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestGateway {
        addr,
        shutdown,
        handle,
    }
}

/// reqwest client that never routes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
