// src/http/client.rs
//
// reqwest-backed archive source

use anyhow::Context;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::ClientBuilder;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::{MnistError, Result};
use crate::fetcher::{ArchiveSource, ByteStream};

/// HTTP client configuration for archive downloads
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
    /// Save the body whatever the status code.
    /// Off by default: a non-success status becomes `MnistError::Network`.
    pub lenient_status: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            lenient_status: false,
        }
    }
}

impl HttpClientConfig {
    /// Accept any response as success, deferring bad bodies to the
    /// decompression stage.
    pub fn lenient() -> Self {
        Self { lenient_status: true, ..Self::default() }
    }
}

/// Fetches archives over plain HTTP(S) GET.
#[derive(Debug, Clone)]
pub struct HttpArchiveSource {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpArchiveSource {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    /// Get configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl ArchiveSource for HttpArchiveSource {
    async fn fetch(&self, url: &str) -> Result<ByteStream> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MnistError::network(url, e))?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        let response = if self.config.lenient_status {
            if !status.is_success() {
                warn!("GET {} returned {}, saving body anyway", url, status);
            }
            response
        } else {
            response
                .error_for_status()
                .map_err(|e| MnistError::network(url, e))?
        };

        let owned_url = url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| MnistError::network(owned_url.clone(), e)));
        Ok(Box::pin(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned response per connection on a loopback port and
    /// returns the archive URL to request.
    async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let mut req = Vec::new();
                let mut buf = [0u8; 1024];
                while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => req.extend_from_slice(&buf[..n]),
                    }
                }
                let reply = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        format!("http://{addr}/train-labels-idx1-ubyte.gz")
    }

    async fn collect(mut body: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = body.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn strict_status_turns_404_into_network_error() {
        let url = serve("404 Not Found", "not found").await;
        let src = HttpArchiveSource::new(HttpClientConfig::default()).unwrap();
        match src.fetch(&url).await {
            Err(MnistError::Network { url: failed, .. }) => assert_eq!(failed, url),
            Err(other) => panic!("expected Network, got {other:?}"),
            Ok(_) => panic!("404 must not be treated as success"),
        }
    }

    #[tokio::test]
    async fn lenient_status_passes_404_body_through() {
        let url = serve("404 Not Found", "not found").await;
        let src = HttpArchiveSource::new(HttpClientConfig::lenient()).unwrap();
        let body = src.fetch(&url).await.unwrap();
        assert_eq!(collect(body).await, b"not found");
    }

    #[tokio::test]
    async fn success_body_streams_in_both_modes() {
        let url = serve("200 OK", "archive-bytes").await;
        for cfg in [HttpClientConfig::default(), HttpClientConfig::lenient()] {
            let src = HttpArchiveSource::new(cfg).unwrap();
            let body = src.fetch(&url).await.unwrap();
            assert_eq!(collect(body).await, b"archive-bytes");
        }
    }

    #[test]
    fn builds_with_defaults() {
        let src = HttpArchiveSource::new(HttpClientConfig::default()).unwrap();
        assert!(!src.config().lenient_status);
    }

    #[test]
    fn lenient_keeps_timeouts() {
        let cfg = HttpClientConfig::lenient();
        assert!(cfg.lenient_status);
        assert_eq!(cfg.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }
}
