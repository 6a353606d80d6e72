//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use tracing::trace;
use url::Url;

use crate::error::Result;
use crate::protocol::Method;

use super::{HttpRequest, HttpResponse, Transport};

// ============================================================================
// Constants
// ============================================================================

/// Connect timeout for the underlying TCP connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// HttpTransport
// ============================================================================

/// Transport that talks to `scheme://host:port` over HTTP.
///
/// Redirects are not followed: session creation may answer with a
/// `Location` header that the dispatcher reads itself.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    origin: Url,
}

impl HttpTransport {
    /// Creates a transport for the given origin.
    pub fn new(origin: Url) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client, origin })
    }

    /// Returns the origin requests are sent to.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.origin.join(&request.path)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        trace!(status, body_len = body.len(), "HTTP response received");

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::Value;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::driver::{CONTENT_TYPE, Driver};

    /// One request as the stub server received it.
    #[derive(Debug, Clone)]
    struct Received {
        head: String,
        body: Vec<u8>,
    }

    impl Received {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Vec<&str> {
            self.head
                .lines()
                .skip(1)
                .filter_map(|line| line.split_once(':'))
                .filter(|(key, _)| key.trim().eq_ignore_ascii_case(name))
                .map(|(_, value)| value.trim())
                .collect()
        }
    }

    async fn read_request(stream: &mut TcpStream) -> Received {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed inside the request head");
            buf.extend_from_slice(&chunk[..n]);
        };

        let mut received = Received {
            head: String::from_utf8_lossy(&buf[..head_end]).into_owned(),
            body: buf[head_end..].to_vec(),
        };
        let length: usize = received
            .header("content-length")
            .first()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        while received.body.len() < length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed inside the request body");
            received.body.extend_from_slice(&chunk[..n]);
        }
        received
    }

    /// Serves a remote end that creates session `abc123` through a 303
    /// `Location` and answers every other request with a title.
    async fn spawn_remote_end() -> (u16, Arc<Mutex<Vec<Received>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let request = read_request(&mut stream).await;
                let response = if request.request_line().starts_with("POST /wd/hub/session ") {
                    format!(
                        "HTTP/1.1 303 See Other\r\n\
                         Location: http://127.0.0.1:{port}/wd/hub/session/abc123\r\n\
                         Content-Length: 0\r\n\
                         Connection: close\r\n\r\n"
                    )
                } else {
                    let body = r#"{"status":0,"value":"Stub page"}"#;
                    format!(
                        "HTTP/1.1 200 OK\r\n\
                         Content-Type: application/json\r\n\
                         Content-Length: {}\r\n\
                         Connection: close\r\n\r\n{body}",
                        body.len()
                    )
                };
                log.lock().push(request);
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });

        (port, received)
    }

    #[tokio::test]
    async fn test_session_location_survives_real_socket() {
        let (port, received) = spawn_remote_end().await;
        let driver = Driver::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .unwrap();

        let id = driver.init().await.unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert_eq!(driver.title().await.unwrap(), "Stub page");

        let received = received.lock().clone();
        // The 303 is not followed: exactly session creation, then the title.
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].request_line(), "POST /wd/hub/session HTTP/1.1");
        assert_eq!(
            received[1].request_line(),
            "GET /wd/hub/session/abc123/title HTTP/1.1"
        );

        let create = &received[0];
        let length = create.body.len().to_string();
        assert_eq!(create.header("content-length"), vec![length.as_str()]);
        assert_eq!(create.header("content-type"), vec![CONTENT_TYPE]);
        let payload: Value = serde_json::from_slice(&create.body).unwrap();
        assert!(payload["desiredCapabilities"].is_object());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let driver = Driver::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .unwrap();
        let err = driver.status().await.unwrap_err();
        assert!(err.is_transport_error(), "{err}");
    }

    #[test]
    fn test_origin_join_keeps_prefix_path() {
        let transport = HttpTransport::new(Url::parse("http://127.0.0.1:4444/").unwrap()).unwrap();
        let url = transport.origin().join("/wd/hub/session/abc/url").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4444/wd/hub/session/abc/url");
    }
}
