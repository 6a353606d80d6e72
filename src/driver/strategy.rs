//! Pluggable selection strategies and the script bootstrap.
//!
//! A [`SelectionStrategy`] resolves a selector without the protocol's
//! native find command. The built-in [`ScriptStrategy`] runs a selection
//! function inside the page. That function and the helper library it uses
//! may not be installed yet, so every run goes through a bounded
//! bootstrap:
//!
//! ```text
//!           missing helper             missing selector
//! Bare ─────────────────────► Helper ─────────────────────► HelperAndSelector
//!   │                                                              ▲
//!   └──────────────────── missing selector ────────────────────────┘
//! ```
//!
//! A sentinel reported in `HelperAndSelector` is a hard error, so a body
//! executes at most three times.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tracing::debug;

use crate::browser::{ChainStep, Strategy};
use crate::error::{Error, Result};
use crate::identifiers::ElementId;
use crate::protocol::Command;

use super::Driver;
use super::assets;

// ============================================================================
// SelectionStrategy
// ============================================================================

/// Everything a strategy needs to resolve one selector.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Selector text.
    pub selector: &'a str,
    /// Restricts results to descendants of this element.
    pub parent: Option<&'a ElementId>,
    /// Traversal applied to the initial match set.
    pub chain: &'a [ChainStep],
}

/// Custom element selection.
#[async_trait]
pub trait SelectionStrategy: Send + Sync + fmt::Debug {
    /// Returns every matching element, in document order.
    ///
    /// An empty list means nothing matched; the caller applies the
    /// not-found policy.
    async fn select(&self, driver: &Driver, request: SelectionRequest<'_>)
    -> Result<Vec<ElementId>>;
}

// ============================================================================
// StrategyRegistry
// ============================================================================

/// Custom strategies by name.
#[derive(Debug, Default)]
pub(crate) struct StrategyRegistry(RwLock<FxHashMap<String, Arc<dyn SelectionStrategy>>>);

impl StrategyRegistry {
    /// Registry holding only the script strategy.
    pub(crate) fn with_builtin() -> Self {
        let registry = Self::default();
        registry.insert(Strategy::SCRIPT, Arc::new(ScriptStrategy));
        registry
    }

    pub(crate) fn insert(&self, name: &str, strategy: Arc<dyn SelectionStrategy>) {
        self.0.write().insert(name.to_string(), strategy);
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<dyn SelectionStrategy>> {
        self.0.read().get(name).cloned()
    }
}

impl Driver {
    /// Registers a custom strategy under `name`.
    ///
    /// Queries using [`Strategy::Custom`] with that name are routed to it.
    /// Registering a native strategy name is rejected.
    pub fn add_strategy(
        &self,
        name: impl Into<String>,
        strategy: impl SelectionStrategy + 'static,
    ) -> Result<()> {
        let name = name.into();
        if name.parse::<Strategy>()?.is_native() {
            return Err(Error::config(format!(
                "cannot override native strategy '{name}'"
            )));
        }
        debug!(strategy = %name, "Registered selection strategy");
        self.inner.strategies.insert(&name, Arc::new(strategy));
        Ok(())
    }
}

// ============================================================================
// Bootstrap State Machine
// ============================================================================

/// Globals installed by the prelude of the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Installed {
    /// Nothing prepended.
    Bare,
    /// Helper library prepended.
    Helper,
    /// Helper library and selection function prepended.
    HelperAndSelector,
}

/// Global reported missing by the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Missing {
    Helper,
    Selector,
}

impl Missing {
    /// Recognizes a sentinel result.
    pub(crate) fn from_result(value: &Value) -> Option<Self> {
        match value.as_str()? {
            assets::MISSING_HELPER => Some(Self::Helper),
            assets::MISSING_SELECTOR => Some(Self::Selector),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Helper => "helper library",
            Self::Selector => "selection function",
        }
    }
}

impl Installed {
    /// Next state after the probe reported `missing`.
    pub(crate) fn next(self, missing: Missing) -> Result<Self> {
        match (self, missing) {
            (Self::Bare, Missing::Helper) => Ok(Self::Helper),
            (Self::Bare, Missing::Selector) | (Self::Helper, _) => Ok(Self::HelperAndSelector),
            (Self::HelperAndSelector, missing) => Err(Error::bootstrap(missing.as_str())),
        }
    }

    /// Sources to prepend in this state.
    fn prelude(self, helper: &str) -> String {
        match self {
            Self::Bare => String::new(),
            Self::Helper => helper.to_string(),
            Self::HelperAndSelector => format!("{helper}{}", assets::SELECTOR_SOURCE),
        }
    }
}

/// How a bootstrapped script is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScriptMode {
    Sync,
    Async,
}

impl Driver {
    /// Executes `body` behind the bootstrap probe, installing missing globals.
    pub(crate) async fn execute_bootstrapped(
        &self,
        body: &str,
        args: Vec<Value>,
        mode: ScriptMode,
    ) -> Result<Value> {
        let probe = match mode {
            ScriptMode::Sync => assets::PROBE_SYNC,
            ScriptMode::Async => assets::PROBE_ASYNC,
        };
        let mut installed = Installed::Bare;

        loop {
            let script = format!(
                "{}{probe}{body}",
                installed.prelude(&self.inner.options.helper_library)
            );
            let command = match mode {
                ScriptMode::Sync => Command::execute(&script, args.clone()),
                ScriptMode::Async => Command::execute_async(&script, args.clone()),
            };
            let value = self.dispatch(command).await?.into_value();

            match Missing::from_result(&value) {
                Some(missing) => {
                    installed = installed.next(missing)?;
                    debug!(?missing, ?installed, "Installing script globals");
                }
                None => return Ok(value),
            }
        }
    }
}

// ============================================================================
// ScriptStrategy
// ============================================================================

/// Selection through the injected selection function.
///
/// The selector is a CSS selector evaluated with `querySelectorAll`; the
/// chain is applied left to right by the page. Unknown chain operations
/// are rejected before anything is sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptStrategy;

#[async_trait]
impl SelectionStrategy for ScriptStrategy {
    async fn select(
        &self,
        driver: &Driver,
        request: SelectionRequest<'_>,
    ) -> Result<Vec<ElementId>> {
        for step in request.chain {
            step.validate()?;
        }

        let args = vec![
            json!(request.selector),
            request
                .parent
                .map_or(Value::Null, ElementId::to_reference),
            serde_json::to_value(request.chain)?,
        ];

        let value = driver
            .execute_bootstrapped(assets::SELECT_BODY, args, ScriptMode::Sync)
            .await?;

        element_ids(value)
    }
}

/// Reads element references from a script result.
pub(crate) fn element_ids(value: Value) -> Result<Vec<ElementId>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                ElementId::from_reference(item).ok_or_else(|| {
                    Error::invalid_response(format!("expected an element reference, got {item}"))
                })
            })
            .collect(),
        single => ElementId::from_reference(&single)
            .map(|id| vec![id])
            .ok_or_else(|| {
                Error::invalid_response(format!("expected element references, got {single}"))
            }),
    }
}

// ============================================================================
// Tests
// ============================================================================
