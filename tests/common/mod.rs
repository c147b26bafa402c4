//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use syscheck::{Daemon, SyscheckConfig};

/// Start a mock target that answers every request with `status`.
pub async fn start_mock_target(status: u16) -> SocketAddr {
    start_programmable_target(move || async move { status }).await
}

/// Start a mock target whose status is decided per request.
pub async fn start_programmable_target<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = u16> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 2048];
                let _ = socket.read(&mut buf).await;

                let status = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    204 => "204 No Content",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let body = if status == 204 { "" } else { "ok" };
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

/// A port with nothing listening on it.
pub async fn unused_addr() -> SocketAddr {
    TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap()
}

/// A daemon running in the background on an ephemeral port.
pub struct RunningDaemon {
    pub addr: SocketAddr,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), syscheck::lifecycle::DaemonError>>,
}

impl RunningDaemon {
    pub async fn start(mut config: SyscheckConfig) -> Self {
        config.listener.bind_address = "127.0.0.1:0".to_string();
        let daemon = Daemon::new(config).unwrap();
        let listener = daemon.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(daemon.run(listener, async move {
            let _ = stopped.await;
            Ok::<(), io::Error>(())
        }));

        Self { addr, stop, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Signal shutdown and wait for the daemon to exit.
    pub async fn stop(self) -> Result<(), syscheck::lifecycle::DaemonError> {
        let _ = self.stop.send(());
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("daemon did not stop in time")
            .unwrap()
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Poll `/health` until `done` accepts the body or `limit` passes.
pub async fn wait_for_health<P>(daemon: &RunningDaemon, limit: Duration, done: P) -> serde_json::Value
where
    P: Fn(&serde_json::Value) -> bool,
{
    let client = client();
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        let body: serde_json::Value = client
            .get(daemon.url("/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if done(&body) || tokio::time::Instant::now() >= deadline {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
