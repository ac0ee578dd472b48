//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::process::{Child, Command};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use proxy_healthz::config::HealthzConfig;
use proxy_healthz::fs::{Filesystem, MemoryFilesystem};
use proxy_healthz::health::HealthzCheck;
use proxy_healthz::{HttpServer, Shutdown};

pub const PID_FILE: &str = "/run/nginx.pid";

/// Start a status responder that always answers `200 ok`.
pub async fn start_status_endpoint() -> SocketAddr {
    start_programmable_endpoint(|| async { (200, "ok".to_string()) }).await
}

/// Start a status responder whose answer is computed per connection.
#[allow(dead_code)]
pub async fn start_programmable_endpoint<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a responder that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_silent_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// A loopback port with nothing listening on it.
#[allow(dead_code)]
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Create or overwrite the pid file the way the worker does.
pub fn write_pid(fs: &MemoryFilesystem, content: &str) {
    fs.create_dir_all(Path::new("/run")).unwrap();
    let mut file = fs.create(Path::new(PID_FILE)).unwrap();
    file.write(content.as_bytes()).unwrap();
    file.close().unwrap();
}

/// Config pointing at `status_port` with the test pid file.
pub fn config_for(status_port: u16) -> HealthzConfig {
    HealthzConfig {
        status_port,
        pid_file: Some(PID_FILE.into()),
        probe_timeout_ms: 1000,
        ..HealthzConfig::default()
    }
}

/// A real OS process that stays alive until dropped.
pub struct Sleeper {
    child: Child,
}

impl Sleeper {
    pub fn spawn() -> Self {
        let child = Command::new("sleep").arg("3600").spawn().unwrap();
        Self { child }
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

impl Drop for Sleeper {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Run the health server on an ephemeral port; returns its base URL.
pub async fn start_server(
    config: &HealthzConfig,
    checks: Vec<Arc<dyn HealthzCheck>>,
    shutdown: &Shutdown,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config.listener, checks);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    format!("http://{addr}")
}

/// Client that never reuses connections or consults proxy env vars.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// GET `url`, returning status and body.
pub async fn get(client: &reqwest::Client, url: &str) -> (u16, String) {
    let res = client.get(url).send().await.expect("health server unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}
