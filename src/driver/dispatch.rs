//! Command dispatch: descriptor in, unwrapped reply out.
//!
//! One call is one HTTP round trip. The dispatcher never retries:
//!
//! 1. serialize the payload and compute its length
//! 2. send it under the session base path
//! 3. parse the envelope (NUL bytes stripped)
//! 4. map a non-zero status to its typed error
//! 5. apply the result-unwrapping rule, or hand back the raw envelope

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::{Command, Envelope, Payload, Reply, unwrap_payload};
use crate::transport::HttpRequest;

use super::Driver;

// ============================================================================
// Constants
// ============================================================================

/// Content type of every request.
pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

// ============================================================================
// Driver - Dispatch
// ============================================================================

impl Driver {
    /// Dispatches a session-scoped command.
    pub(crate) async fn dispatch(&self, command: Command) -> Result<Reply> {
        let base = self.inner.session.read().base_path()?;
        self.send(&base, command).await
    }

    /// Dispatches a command relative to the protocol prefix.
    pub(crate) async fn dispatch_root(&self, command: Command) -> Result<Reply> {
        let prefix = self.inner.options.path_prefix.clone();
        self.send(&prefix, command).await
    }

    /// Dispatches a session-scoped command and deserializes its value.
    pub(crate) async fn dispatch_typed<T: DeserializeOwned>(&self, command: Command) -> Result<T> {
        self.dispatch(command).await?.into_typed()
    }

    pub(crate) async fn send(&self, base: &str, command: Command) -> Result<Reply> {
        let path = format!("{base}{}", command.path());
        let body = command.body()?;

        let request = HttpRequest {
            method: command.method(),
            path: path.clone(),
            headers: vec![
                ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
                ("Content-Length".to_string(), body.len().to_string()),
            ],
            body,
        };

        trace!(method = command.method().as_str(), path = %path, "Dispatching command");

        let response = self.inner.transport.send(request).await?;

        if response.status >= 400 && response.body.iter().all(|b| b.is_ascii_whitespace() || *b == 0) {
            return Err(Error::protocol(
                &path,
                "",
                format!("empty body with HTTP status {}", response.status),
            ));
        }

        let envelope = Envelope::parse(&path, &response.body, response.location)?;

        if !envelope.is_success() {
            trace!(path = %path, status = envelope.status, "Command failed");
            return Err(envelope.into_error());
        }

        if command.wants_raw() {
            return Ok(Reply::Raw(envelope));
        }

        Ok(unwrap_payload(Payload::classify(envelope.value)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};

    use crate::error::{ErrorKind, Status};
    use crate::transport::HttpResponse;
    use crate::transport::mock::{self, MockTransport};

    use crate::driver::testing::{active_driver, default_route, driver_with};

    #[tokio::test]
    async fn test_headers_and_body() {
        let (driver, mock) = active_driver(default_route).await;
        driver
            .dispatch(Command::navigate("http://example.com/"))
            .await
            .unwrap();

        let request = mock.requests().pop().unwrap();
        assert_eq!(request.header("content-type"), Some(CONTENT_TYPE));
        assert_eq!(
            request.header("Content-Length"),
            Some(request.body.len().to_string().as_str())
        );
        assert_eq!(mock::json_body(&request), json!({"url": "http://example.com/"}));
    }

    #[tokio::test]
    async fn test_unwrap_rule_through_stub_transport() {
        let cases = [
            (json!({"status": 0}), Reply::Unit),
            (json!({"status": 0, "value": null}), Reply::Unit),
            (json!({"status": 0, "value": {}}), Reply::Unit),
            (
                json!({"status": 0, "value": {"x": 1}}),
                Reply::Value(json!({"x": 1})),
            ),
            (json!({"status": 0, "value": []}), Reply::Value(json!([]))),
            (json!({"status": 0, "value": "s"}), Reply::Value(json!("s"))),
        ];

        for (body, expected) in cases {
            let reply = body.clone();
            let (driver, _mock) = active_driver(move |_| Ok(mock::body(reply.clone()))).await;
            assert_eq!(
                driver.dispatch(Command::title()).await.unwrap(),
                expected,
                "body: {body}"
            );
        }
    }

    #[tokio::test]
    async fn test_every_status_maps_to_its_kind() {
        for status in Status::ALL {
            let code = status.code();
            let (driver, _mock) = active_driver(move |_| mock::status(code, "boom")).await;
            let err = driver.dispatch(Command::title()).await.unwrap_err();
            assert_eq!(err.status_kind(), Some(status));
            assert!(err.context().is_empty());
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_protocol_error() {
        let (driver, _mock) = active_driver(|_| {
            Ok(HttpResponse {
                status: 500,
                location: None,
                body: b"\0Internal Server Error".to_vec(),
            })
        })
        .await;

        let err = driver.dispatch(Command::source()).await.unwrap_err();
        match err.kind() {
            ErrorKind::Protocol { path, body, .. } => {
                assert_eq!(path, "/wd/hub/session/abc123/source");
                assert_eq!(body, "Internal Server Error");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_error_response_is_protocol_error() {
        let (driver, _mock) = active_driver(|_| {
            Ok(HttpResponse {
                status: 404,
                location: None,
                body: Vec::new(),
            })
        })
        .await;
        let err = driver.dispatch(Command::title()).await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let mock = MockTransport::new(|_| Err(Error::connection("refused")));
        let driver = driver_with(&mock);
        let err = driver.status().await.unwrap_err();
        assert!(err.is_transport_error());
        assert!(matches!(err.kind(), ErrorKind::Connection { message } if message == "refused"));
    }

    #[tokio::test]
    async fn test_typed_dispatch() {
        let (driver, _mock) = active_driver(|_| mock::ok(json!(["a", "b"]))).await;
        let handles: Vec<String> = driver.dispatch_typed(Command::window_handles()).await.unwrap();
        assert_eq!(handles, vec!["a", "b"]);

        let (driver, _mock) = active_driver(|_| mock::ok(Value::Null)).await;
        let nothing: Option<String> = driver.dispatch_typed(Command::alert_text()).await.unwrap();
        assert_eq!(nothing, None);
    }
}
