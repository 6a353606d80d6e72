//! Element locator strategies and selector queries.
//!
//! A selector is resolved under a [`Strategy`]. Native strategies map to
//! the protocol's find-element command; any other name is looked up among
//! the driver's registered selection strategies (initially the in-page
//! [`Strategy::SCRIPT`] strategy).
//!
//! # Example
//!
//! ```ignore
//! use wire_webdriver::{ChainStep, Query, Strategy};
//!
//! // CSS selector (default), `:visible` is rewritten before sending
//! let btn = driver.get("button.primary:visible", &Query::new()).await?;
//!
//! // XPath, null instead of an error when nothing matches
//! let maybe = driver.get("//dialog", &Query::new().using(Strategy::XPath).no_error()).await?;
//!
//! // Script strategy with chained traversal
//! let items = driver
//!     .get_list(
//!         "ul.menu",
//!         &Query::new()
//!             .using(Strategy::script())
//!             .chain(ChainStep::children("li"))
//!             .chain(ChainStep::first()),
//!     )
//!     .await?;
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

use super::Element;

// ============================================================================
// Strategy
// ============================================================================

/// Element locator strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// CSS selector, with the `:visible` / `:hidden` dialect extension.
    Css,
    /// XPath expression.
    XPath,
    /// `id` attribute.
    Id,
    /// `name` attribute.
    Name,
    /// Single class name.
    ClassName,
    /// Tag name.
    TagName,
    /// Exact link text.
    LinkText,
    /// Partial link text.
    PartialLinkText,
    /// A registered selection strategy.
    Custom(String),
}

impl Strategy {
    /// Name of the built-in script-injection strategy.
    pub const SCRIPT: &'static str = "script";

    /// The built-in script-injection strategy.
    #[inline]
    #[must_use]
    pub fn script() -> Self {
        Self::Custom(Self::SCRIPT.to_string())
    }

    /// Returns the strategy name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css => "css selector",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Name => "name",
            Self::ClassName => "class name",
            Self::TagName => "tag name",
            Self::LinkText => "link text",
            Self::PartialLinkText => "partial link text",
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` for strategies the remote end implements itself.
    #[inline]
    #[must_use]
    pub fn is_native(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Css
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Parses a wire name; unknown names become [`Strategy::Custom`].
    fn from_str(name: &str) -> Result<Self> {
        Ok(match name {
            "css selector" | "css" => Self::Css,
            "xpath" => Self::XPath,
            "id" => Self::Id,
            "name" => Self::Name,
            "class name" => Self::ClassName,
            "tag name" => Self::TagName,
            "link text" => Self::LinkText,
            "partial link text" => Self::PartialLinkText,
            "" => return Err(Error::config("strategy name must not be empty")),
            other => Self::Custom(other.to_string()),
        })
    }
}

// ============================================================================
// CSS Dialect
// ============================================================================

/// Quoted strings, or a dialect pseudo plus any identifier tail.
///
/// Quoted matches and pseudos with a tail (`:visible-x`, `:hiddenish`)
/// are written back unchanged.
static PSEUDO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""[^"]*"|'[^']*'|:(visible|hidden)([\w-]*)"#)
        .unwrap_or_else(|_| unreachable!("static pattern"))
});

/// Predicate replacing `:visible`.
const VISIBLE: &str = r#":not([style*="display: none"]):not([style*="display:none"])"#;

/// Predicate replacing `:hidden`.
const HIDDEN: &str = r#":is([style*="display: none"], [style*="display:none"], [style*="opacity: 0;"], [style*="opacity:0;"], [style$="opacity: 0"], [style$="opacity:0"])"#;

/// Rewrites the `:visible` and `:hidden` pseudo-selectors into attribute
/// predicates the remote end understands.
///
/// ```
/// use wire_webdriver::browser::selector::rewrite_css;
///
/// assert_eq!(rewrite_css("div.item"), "div.item");
/// assert!(rewrite_css("li:visible").starts_with("li:not("));
/// ```
#[must_use]
pub fn rewrite_css(selector: &str) -> Cow<'_, str> {
    PSEUDO.replace_all(selector, |caps: &regex::Captures<'_>| {
        match (caps.get(1), caps.get(2)) {
            (Some(name), Some(tail)) if tail.is_empty() => {
                let predicate = if name.as_str() == "visible" { VISIBLE } else { HIDDEN };
                predicate.to_string()
            }
            _ => caps[0].to_string(),
        }
    })
}

// ============================================================================
// ChainStep
// ============================================================================

/// One post-processing step applied by script-based strategies.
///
/// Serialized as a single-key object: `{"children": "li"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStep {
    operation: String,
    argument: Value,
}

impl ChainStep {
    /// Operations understood by the built-in script strategy.
    pub const OPERATIONS: &'static [&'static str] = &[
        "find", "filter", "not", "has", "parent", "parents", "closest", "children", "siblings",
        "next", "prev", "first", "last", "eq",
    ];

    /// Creates a step from an operation name and argument.
    #[must_use]
    pub fn new(operation: impl Into<String>, argument: impl Into<Value>) -> Self {
        Self {
            operation: operation.into(),
            argument: argument.into(),
        }
    }

    /// Descendants of the current set matching `selector`.
    #[must_use]
    pub fn find(selector: &str) -> Self {
        Self::new("find", selector)
    }

    /// Keeps members matching `selector`.
    #[must_use]
    pub fn filter(selector: &str) -> Self {
        Self::new("filter", selector)
    }

    /// Drops members matching `selector`.
    #[must_use]
    pub fn not(selector: &str) -> Self {
        Self::new("not", selector)
    }

    /// Keeps members with a descendant matching `selector`.
    #[must_use]
    pub fn has(selector: &str) -> Self {
        Self::new("has", selector)
    }

    /// Direct parents.
    #[must_use]
    pub fn parent() -> Self {
        Self::new("parent", Value::Null)
    }

    /// Nearest ancestor (self included) matching `selector`.
    #[must_use]
    pub fn closest(selector: &str) -> Self {
        Self::new("closest", selector)
    }

    /// Children matching `selector`.
    #[must_use]
    pub fn children(selector: &str) -> Self {
        Self::new("children", selector)
    }

    /// First member.
    #[must_use]
    pub fn first() -> Self {
        Self::new("first", Value::Null)
    }

    /// Last member.
    #[must_use]
    pub fn last() -> Self {
        Self::new("last", Value::Null)
    }

    /// Member at `index`; negative counts from the end.
    #[must_use]
    pub fn eq(index: i64) -> Self {
        Self::new("eq", index)
    }

    /// Returns the operation name.
    #[inline]
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the argument.
    #[inline]
    #[must_use]
    pub fn argument(&self) -> &Value {
        &self.argument
    }

    /// Fails unless the built-in script strategy knows this operation.
    pub fn validate(&self) -> Result<()> {
        if Self::OPERATIONS.contains(&self.operation.as_str()) {
            Ok(())
        } else {
            Err(Error::unknown_chain_operation(&self.operation))
        }
    }
}

impl TryFrom<Value> for ChainStep {
    type Error = Error;

    /// Accepts a single-key object such as `{"closest": "form"}`.
    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) if map.len() == 1 => {
                let (operation, argument) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::config("empty chain step"))?;
                Ok(Self {
                    operation,
                    argument,
                })
            }
            other => Err(Error::config(format!(
                "chain step must be a single-key object, got {other}"
            ))),
        }
    }
}

impl Serialize for ChainStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.operation, &self.argument)?;
        map.end()
    }
}

// ============================================================================
// Query
// ============================================================================

/// Options controlling how a selector is resolved.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) using: Option<Strategy>,
    pub(crate) no_error: bool,
    pub(crate) chain: Vec<ChainStep>,
    pub(crate) parent: Option<Element>,
}

impl Query {
    /// Creates a query with the driver's default strategy.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the strategy.
    #[inline]
    #[must_use]
    pub fn using(mut self, strategy: Strategy) -> Self {
        self.using = Some(strategy);
        self
    }

    /// Returns `None` instead of a "no such element" error.
    #[inline]
    #[must_use]
    pub fn no_error(mut self) -> Self {
        self.no_error = true;
        self
    }

    /// Appends a traversal step.
    #[inline]
    #[must_use]
    pub fn chain(mut self, step: ChainStep) -> Self {
        self.chain.push(step);
        self
    }

    /// Restricts resolution to descendants of `parent`.
    #[inline]
    #[must_use]
    pub fn parent(mut self, parent: Element) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the explicit strategy, if any.
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Option<&Strategy> {
        self.using.as_ref()
    }

    /// Returns `true` if "no such element" is suppressed.
    #[inline]
    #[must_use]
    pub fn is_no_error(&self) -> bool {
        self.no_error
    }

    /// Returns the traversal chain.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[ChainStep] {
        &self.chain
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use super::Strategy;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_strategy_wire_names() {
        assert_eq!(Strategy::Css.as_str(), "css selector");
        assert_eq!(Strategy::PartialLinkText.as_str(), "partial link text");
        assert_eq!(Strategy::script().as_str(), "script");
        assert!(Strategy::XPath.is_native());
        assert!(!Strategy::script().is_native());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("css".parse::<Strategy>().unwrap(), Strategy::Css);
        assert_eq!("xpath".parse::<Strategy>().unwrap(), Strategy::XPath);
        assert_eq!(
            "script".parse::<Strategy>().unwrap(),
            Strategy::Custom("script".into())
        );
        assert!("".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_rewrite_visible() {
        assert_eq!(
            rewrite_css("li:visible"),
            r#"li:not([style*="display: none"]):not([style*="display:none"])"#
        );
    }

    #[test]
    fn test_rewrite_hidden() {
        let rewritten = rewrite_css("div.panel:hidden > a");
        assert!(rewritten.starts_with("div.panel:is("));
        assert!(rewritten.contains(r#"[style*="display: none"]"#));
        assert!(rewritten.contains("opacity"));
        assert!(rewritten.ends_with(") > a"));
    }

    #[test]
    fn test_rewrite_leaves_lookalikes() {
        assert_eq!(rewrite_css("input:visited"), "input:visited");
        assert_eq!(rewrite_css(".hiddenish"), ".hiddenish");
        assert_eq!(rewrite_css("a:visible-x"), "a:visible-x");
        assert_eq!(rewrite_css("a:hiddenish"), "a:hiddenish");
        assert!(matches!(rewrite_css("a > b"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_rewrite_skips_quoted_values() {
        assert_eq!(rewrite_css(r#"[title=":hidden"]"#), r#"[title=":hidden"]"#);
        assert_eq!(rewrite_css("[data-x=':visible']"), "[data-x=':visible']");

        let rewritten = rewrite_css(r#"a[title=":visible"] b:hidden"#);
        assert!(rewritten.starts_with(r#"a[title=":visible"] b:is("#), "{rewritten}");
    }

    #[test]
    fn test_chain_step_serializes_as_single_key() {
        let chain = vec![ChainStep::children("li"), ChainStep::first(), ChainStep::eq(-1)];
        assert_eq!(
            serde_json::to_value(&chain).unwrap(),
            json!([{"children": "li"}, {"first": null}, {"eq": -1}])
        );
    }

    #[test]
    fn test_chain_step_validation() {
        assert!(ChainStep::closest("form").validate().is_ok());
        let err = ChainStep::new("explode", 1).validate().unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::UnknownChainOperation { name } if name == "explode"
        ));
    }

    #[test]
    fn test_chain_step_from_value() {
        let step = ChainStep::try_from(json!({"closest": "form"})).unwrap();
        assert_eq!(step.operation(), "closest");
        assert!(ChainStep::try_from(json!({"a": 1, "b": 2})).is_err());
        assert!(ChainStep::try_from(json!("first")).is_err());
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new().using(Strategy::XPath).no_error().chain(ChainStep::first());
        assert_eq!(query.strategy(), Some(&Strategy::XPath));
        assert!(query.is_no_error());
        assert_eq!(query.steps().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_rewrite_removes_dialect_pseudos(base in "[a-z]{1,6}", visible in any::<bool>()) {
            let pseudo = if visible { ":visible" } else { ":hidden" };
            let input = format!("{base}{pseudo}");
            let rewritten = rewrite_css(&input);
            prop_assert!(!rewritten.contains(":visible"));
            prop_assert!(!rewritten.contains(":hidden"));
            prop_assert!(rewritten.starts_with(base.as_str()));
        }

        #[test]
        fn prop_plain_selectors_untouched(sel in "[a-z#. >]{0,20}") {
            prop_assert_eq!(rewrite_css(&sel), sel.as_str());
        }
    }
}
