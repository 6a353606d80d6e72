//! Shared fixtures for driver tests.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::transport::mock::{self, MockTransport};
use crate::transport::{HttpRequest, HttpResponse};

use super::Driver;

/// Location returned by the stub session endpoint.
pub(crate) const SESSION_LOCATION: &str = "http://127.0.0.1:4444/wd/hub/session/abc123";

/// Routes `tracing` output to the test harness, filtered by `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Log lines captured by [`capture_logs`].
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Collects `debug` and above on this thread until the guard drops.
pub(crate) fn capture_logs() -> (DefaultGuard, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}

/// Driver over `mock` with default options.
pub(crate) fn driver_with(mock: &MockTransport) -> Driver {
    init_tracing();
    Driver::builder()
        .transport(mock.clone())
        .build()
        .unwrap_or_else(|e| panic!("driver: {e}"))
}

/// Initialized driver whose session is `abc123`; `route` answers the rest.
pub(crate) async fn active_driver<F>(route: F) -> (Driver, MockTransport)
where
    F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
{
    let route = Arc::new(route);
    let mock = MockTransport::new(move |req| {
        if req.path == "/wd/hub/session" {
            return Ok(HttpResponse {
                status: 303,
                location: Some(SESSION_LOCATION.to_string()),
                body: Vec::new(),
            });
        }
        route(req)
    });
    let driver = driver_with(&mock);
    driver
        .init()
        .await
        .unwrap_or_else(|e| panic!("init: {e}"));
    (driver, mock)
}

/// Finds answer with element `0`, everything else with `null`.
pub(crate) fn default_route(req: &HttpRequest) -> Result<HttpResponse> {
    if req.path.ends_with("/elements") {
        mock::ok(json!([{ "ELEMENT": "0" }]))
    } else if req.path.ends_with("/element") {
        mock::ok(json!({ "ELEMENT": "0" }))
    } else {
        mock::ok(Value::Null)
    }
}
