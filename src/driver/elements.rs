//! Selector resolution.
//!
//! | Method | Result when nothing matches |
//! |--------|-----------------------------|
//! | [`Driver::resolve`] / [`Driver::get`] | "no such element" error, or `None` with [`Query::no_error`] |
//! | [`Driver::resolve_all`] / [`Driver::get_list`] | empty list |
//!
//! Every error leaving this module carries `element` (the selector) and
//! `using` (the strategy name) context.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::browser::selector::rewrite_css;
use crate::browser::{Element, Query, Strategy};
use crate::error::{Error, Result};
use crate::identifiers::{ElementId, SessionId};
use crate::protocol::Command;

use super::Driver;
use super::strategy::SelectionRequest;

// ============================================================================
// Driver - Element Resolution
// ============================================================================

impl Driver {
    /// Resolves a selector to the first matching element id.
    pub async fn resolve(&self, selector: &str, query: &Query) -> Result<Option<ElementId>> {
        let strategy = self.strategy_for(query);
        self.logged("resolve", selector, async {
            let result = match self.lookup(selector, query, &strategy, false).await {
                Ok(mut ids) if !ids.is_empty() => Ok(Some(ids.swap_remove(0))),
                Ok(_) => self.not_found(query),
                Err(e) if e.is_no_such_element() => self.not_found(query),
                Err(e) => Err(e),
            };
            result.map_err(|e| tag(e, selector, &strategy))
        })
        .await
    }

    /// Resolves a selector to every matching element id.
    pub async fn resolve_all(&self, selector: &str, query: &Query) -> Result<Vec<ElementId>> {
        let strategy = self.strategy_for(query);
        self.logged("resolve_all", selector, async {
            let result = match self.lookup(selector, query, &strategy, true).await {
                Err(e) if e.is_no_such_element() => Ok(Vec::new()),
                other => other,
            };
            result.map_err(|e| tag(e, selector, &strategy))
        })
        .await
    }

    /// Resolves a selector to an element handle.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dialog = driver.get("//dialog", &Query::new().using(Strategy::XPath).no_error()).await?;
    /// if let Some(dialog) = dialog {
    ///     dialog.get("button.close", &Query::new()).await?.unwrap().click().await?;
    /// }
    /// ```
    pub async fn get(&self, selector: &str, query: &Query) -> Result<Option<Element>> {
        Ok(self
            .resolve(selector, query)
            .await?
            .map(|id| self.handle(id)))
    }

    /// Resolves a selector to element handles.
    pub async fn get_list(&self, selector: &str, query: &Query) -> Result<Vec<Element>> {
        Ok(self
            .resolve_all(selector, query)
            .await?
            .into_iter()
            .map(|id| self.handle(id))
            .collect())
    }

    /// Resolves a selector with the default query, failing when nothing matches.
    pub async fn element(&self, selector: &str) -> Result<Element> {
        let strategy = self.strategy_for(&Query::new());
        self.get(selector, &Query::new())
            .await?
            .ok_or_else(|| tag(Error::no_such_element(), selector, &strategy))
    }

    /// Resolves a selector with the default query.
    pub async fn elements(&self, selector: &str) -> Result<Vec<Element>> {
        self.get_list(selector, &Query::new()).await
    }
}

// ============================================================================
// Driver - Internal
// ============================================================================

impl Driver {
    fn strategy_for(&self, query: &Query) -> Strategy {
        query
            .strategy()
            .cloned()
            .unwrap_or_else(|| self.inner.options.default_strategy.clone())
    }

    fn not_found<T>(&self, query: &Query) -> Result<Option<T>> {
        if query.is_no_error() {
            Ok(None)
        } else {
            Err(Error::no_such_element())
        }
    }

    /// Builds a handle bound to this driver's session.
    pub(crate) fn handle(&self, id: ElementId) -> Element {
        let session = self.session_id().unwrap_or_else(|| SessionId::new(""));
        Element::new(id, session, Arc::downgrade(&self.inner))
    }

    /// Reduces the query's parent to an id owned by this session.
    fn parent_id<'q>(&self, query: &'q Query) -> Result<Option<&'q ElementId>> {
        let Some(parent) = &query.parent else {
            return Ok(None);
        };
        if !parent.belongs_to(self) {
            return Err(Error::invalid_parent(format!(
                "element {} belongs to another session",
                parent.id()
            )));
        }
        Ok(Some(parent.id()))
    }

    async fn lookup(
        &self,
        selector: &str,
        query: &Query,
        strategy: &Strategy,
        multiple: bool,
    ) -> Result<Vec<ElementId>> {
        let parent = self.parent_id(query)?;

        if let Some(custom) = self.inner.strategies.get(strategy.as_str()) {
            debug!(strategy = %strategy, selector, "Resolving with custom strategy");
            let request = SelectionRequest {
                selector,
                parent,
                chain: query.steps(),
            };
            return custom.select(self, request).await;
        }

        let value = match strategy {
            Strategy::Css => rewrite_css(selector),
            _ => selector.into(),
        };

        if multiple {
            let reply = self
                .dispatch(Command::find_elements(strategy.as_str(), &value, parent))
                .await?;
            super::strategy::element_ids(reply.into_value())
        } else {
            let reply = self
                .dispatch(Command::find_element(strategy.as_str(), &value, parent))
                .await?;
            match reply.into_value() {
                Value::Null => Ok(Vec::new()),
                reference => ElementId::from_reference(&reference)
                    .map(|id| vec![id])
                    .ok_or_else(|| {
                        Error::invalid_response(format!(
                            "expected an element reference, got {reference}"
                        ))
                    }),
            }
        }
    }
}

/// Attaches selector context to an error.
fn tag(error: Error, selector: &str, strategy: &Strategy) -> Error {
    error.parametrize([("element", selector), ("using", strategy.as_str())])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::browser::ChainStep;
    use crate::error::{ErrorKind, Status};
    use crate::transport::mock;

    use crate::driver::testing::{active_driver, default_route};

    fn nothing_matches(req: &crate::transport::HttpRequest) -> Result<crate::transport::HttpResponse> {
        if req.path.ends_with("/elements") {
            mock::ok(json!([]))
        } else {
            mock::status(7, "Unable to locate element")
        }
    }

    #[tokio::test]
    async fn test_single_without_match_errors_with_context() {
        let (driver, _mock) = active_driver(nothing_matches).await;
        let err = driver.get("#missing", &Query::new()).await.unwrap_err();
        assert!(err.is_no_such_element());
        assert_eq!(err.context().get("element"), Some("#missing"));
        assert_eq!(err.context().get("using"), Some("css selector"));
    }

    #[tokio::test]
    async fn test_single_without_match_and_no_error_is_none() {
        let (driver, _mock) = active_driver(nothing_matches).await;
        let found = driver.get("#missing", &Query::new().no_error()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_multiple_without_match_is_empty() {
        let (driver, _mock) = active_driver(nothing_matches).await;
        assert!(driver.get_list("#missing", &Query::new()).await.unwrap().is_empty());
        assert!(
            driver
                .get_list("#missing", &Query::new().no_error())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_multiple_maps_references() {
        let (driver, _mock) = active_driver(|_| {
            mock::ok(json!([{"ELEMENT": "1"}, {"element-6066-11e4-a52e-4f735466cecf": "2"}, 3]))
        })
        .await;
        let ids = driver.resolve_all("li", &Query::new()).await.unwrap();
        assert_eq!(
            ids,
            vec![ElementId::new("1"), ElementId::new("2"), ElementId::new("3")]
        );
    }

    #[tokio::test]
    async fn test_css_dialect_is_rewritten() {
        let (driver, mock) = active_driver(default_route).await;
        driver.get("li:visible", &Query::new()).await.unwrap();
        let body = mock.last_body("/wd/hub/session/abc123/element").unwrap();
        assert_eq!(body["using"], "css selector");
        assert_eq!(
            body["value"],
            r#"li:not([style*="display: none"]):not([style*="display:none"])"#
        );
    }

    #[tokio::test]
    async fn test_xpath_is_not_rewritten() {
        let (driver, mock) = active_driver(default_route).await;
        driver
            .get("//a[@class=':visible']", &Query::new().using(Strategy::XPath))
            .await
            .unwrap();
        let body = mock.last_body("/wd/hub/session/abc123/element").unwrap();
        assert_eq!(body["using"], "xpath");
        assert_eq!(body["value"], "//a[@class=':visible']");
    }

    #[tokio::test]
    async fn test_parent_scopes_the_path() {
        let (driver, mock) = active_driver(default_route).await;
        let form = driver.element("form").await.unwrap();
        form.get_list("input", &Query::new()).await.unwrap();
        assert_eq!(
            mock.calls().last().unwrap().1,
            "/wd/hub/session/abc123/element/0/elements"
        );
    }

    #[tokio::test]
    async fn test_foreign_parent_is_rejected_locally() {
        let (driver, mock) = active_driver(default_route).await;
        let (other, _other_mock) = active_driver(default_route).await;
        let foreign = other.element("form").await.unwrap();
        let before = mock.calls().len();

        let err = driver
            .get("input", &Query::new().parent(foreign))
            .await
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidParent { .. }));
        assert_eq!(err.context().get("element"), Some("input"));
        assert_eq!(mock.calls().len(), before);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_suppressed() {
        let (driver, _mock) = active_driver(|_| mock::status(32, "bad selector")).await;
        let err = driver
            .get("[[", &Query::new().no_error())
            .await
            .unwrap_err();
        assert_eq!(err.status_kind(), Some(Status::InvalidSelector));
        assert_eq!(err.context().get("element"), Some("[["));
    }

    #[tokio::test]
    async fn test_script_strategy_empty_result() {
        let (driver, _mock) = active_driver(|_| mock::ok(json!([]))).await;
        let query = Query::new().using(Strategy::script());

        let err = driver.get("li", &query).await.unwrap_err();
        assert!(err.is_no_such_element());
        assert_eq!(err.context().get("using"), Some("script"));

        assert!(driver.get("li", &query.clone().no_error()).await.unwrap().is_none());
        assert!(driver.get_list("li", &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_chain_operation_surfaces() {
        let (driver, _mock) = active_driver(|_| mock::ok(json!([{"ELEMENT": "1"}]))).await;
        let query = Query::new()
            .using(Strategy::script())
            .no_error()
            .chain(ChainStep::new("sideways", Value::Null));

        for result in [
            driver.get("li", &query).await.map(|_| ()),
            driver.get_list("li", &query).await.map(|_| ()),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(
                err.kind(),
                ErrorKind::UnknownChainOperation { name } if name == "sideways"
            ));
            assert_eq!(err.context().get("using"), Some("script"));
        }
    }

    #[tokio::test]
    async fn test_in_page_chain_failure_surfaces() {
        let (driver, _mock) = active_driver(|_| mock::status(17, "unknown chain operation")).await;
        let err = driver
            .get_list("li", &Query::new().using(Strategy::script()).chain(ChainStep::first()))
            .await
            .unwrap_err();
        assert_eq!(err.status_kind(), Some(Status::JavaScriptError));
    }

    #[tokio::test]
    async fn test_default_strategy_from_builder() {
        let mock = crate::transport::mock::MockTransport::new(|req| {
            if req.path == "/wd/hub/session" {
                Ok(mock::body(json!({"sessionId": "x", "status": 0})))
            } else {
                default_route(req)
            }
        });
        let driver = Driver::builder()
            .transport(mock.clone())
            .default_strategy(Strategy::XPath)
            .build()
            .unwrap();
        driver.init().await.unwrap();
        driver.element("//h1").await.unwrap();
        assert_eq!(
            mock.last_body("/wd/hub/session/x/element").unwrap()["using"],
            "xpath"
        );
    }
}
