//! Scripted in-memory transport for tests.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::error::Result;
use crate::protocol::Method;

use super::{HttpRequest, HttpResponse, Transport};

type Route = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

/// Records every request and answers from a routing closure.
#[derive(Clone)]
pub(crate) struct MockTransport {
    route: Arc<Route>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.requests.lock().len())
            .finish_non_exhaustive()
    }
}

impl MockTransport {
    pub(crate) fn new<F>(route: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            route: Arc::new(Box::new(route)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Everything sent so far.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// `(method, path)` of everything sent so far.
    pub(crate) fn calls(&self) -> Vec<(Method, String)> {
        self.requests
            .lock()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }

    /// Decoded JSON body of the last request to `path`.
    pub(crate) fn last_body(&self, path: &str) -> Option<Value> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.path == path)
            .and_then(|r| serde_json::from_slice(&r.body).ok())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request.clone());
        (self.route)(&request)
    }
}

/// `{"status": 0, "value": value}`.
pub(crate) fn ok(value: Value) -> Result<HttpResponse> {
    Ok(body(json!({ "status": 0, "value": value })))
}

/// `{"status": code, "value": {"message": ...}}`.
pub(crate) fn status(code: u64, message: &str) -> Result<HttpResponse> {
    Ok(body(json!({ "status": code, "value": { "message": message } })))
}

/// Response with a JSON body.
pub(crate) fn body(value: Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        location: None,
        body: serde_json::to_vec(&value).unwrap_or_default(),
    }
}

/// Decoded JSON body of a request.
pub(crate) fn json_body(request: &HttpRequest) -> Value {
    serde_json::from_slice(&request.body).unwrap_or(Value::Null)
}
