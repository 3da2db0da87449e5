//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use css_lifecycles::{CssLifecycles, CssOptions, HeadDocument};

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` receives the request path and returns the status code and body.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        let path = request
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
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

    addr
}

/// Start a mock backend serving fixed bodies by path; unknown paths get 404.
#[allow(dead_code)]
pub async fn start_static_backend(routes: &[(&str, &str)]) -> SocketAddr {
    let routes: Arc<Vec<(String, String)>> = Arc::new(
        routes
            .iter()
            .map(|(path, body)| (path.to_string(), body.to_string()))
            .collect(),
    );

    start_programmable_backend(move |path| {
        let routes = routes.clone();
        async move {
            match routes.iter().find(|(p, _)| *p == path) {
                Some((_, body)) => (200, body.clone()),
                None => (404, "not found".to_string()),
            }
        }
    })
    .await
}

/// A fresh head and a controller over it.
#[allow(dead_code)]
pub fn lifecycles(options: CssOptions) -> (Arc<HeadDocument>, CssLifecycles) {
    let doc = Arc::new(HeadDocument::new());
    let lifecycles = CssLifecycles::new(doc.clone(), options).unwrap();
    (doc, lifecycles)
}
