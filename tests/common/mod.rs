//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gateway_lab::config::LabConfig;
use gateway_lab::http::{AppState, HttpServer};
use gateway_lab::lifecycle::Shutdown;
use gateway_lab::tutor::TutorClient;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Defaults with every simulated delay removed.
#[allow(dead_code)]
pub fn fast_config() -> LabConfig {
    let mut config = LabConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.simulation.route_latency_ms = 0;
    config.simulation.auth_latency_ms = 0;
    config.simulation.cache_miss_ms = 0;
    config.simulation.cache_hit_ms = 0;
    config.simulation.order_step_ms = 0;
    config
}

/// A running lab server.
#[allow(dead_code)]
pub struct TestLab {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub client: reqwest::Client,
}

#[allow(dead_code)]
impl TestLab {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a session and return its id.
    pub async fn new_session(&self) -> String {
        let res = self.client.post(self.url("/sessions")).send().await.unwrap();
        assert_eq!(res.status(), 201);
        let body: serde_json::Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    pub fn session_url(&self, id: &str, tail: &str) -> String {
        self.url(&format!("/sessions/{}{}", id, tail))
    }
}

/// Start the lab on an ephemeral port with the given tutor client.
#[allow(dead_code)]
pub async fn start_lab_with_tutor(config: LabConfig, tutor: TutorClient) -> TestLab {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(AppState::with_tutor(config, tutor));
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestLab {
        addr,
        shutdown,
        client,
    }
}

/// Start the lab with a tutor that has no API key.
#[allow(dead_code)]
pub async fn start_lab(config: LabConfig) -> TestLab {
    let tutor = TutorClient::new(&config.tutor, None).unwrap();
    start_lab_with_tutor(config, tutor).await
}

/// Read one HTTP/1.1 request (headers plus Content-Length body).
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Start a programmable mock upstream on an ephemeral port.
///
/// Every raw request is forwarded on the returned channel.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(
    f: F,
) -> (SocketAddr, mpsc::UnboundedReceiver<String>)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let _ = tx.send(request);

                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            429 => "429 Too Many Requests",
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
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
