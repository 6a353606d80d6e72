//! In-page script sources used by script-based strategies.
//!
//! Scripts run inside the remote end's `execute` wrapper, so a prelude
//! (installing globals) can be prepended to a body that uses them.
//!
//! # Bootstrap
//!
//! Every bootstrapped body starts with a probe. When a global is missing
//! the probe reports a sentinel instead of running the body:
//!
//! | Sentinel | Missing global |
//! |----------|----------------|
//! | [`MISSING_HELPER`] | `window.__wdHelper` |
//! | [`MISSING_SELECTOR`] | `window.__wdSelect` |

// ============================================================================
// Sentinels
// ============================================================================

/// Reported when the helper library is not installed.
pub const MISSING_HELPER: &str = "wd:missing-helper";

/// Reported when the selection function is not installed.
pub const MISSING_SELECTOR: &str = "wd:missing-selector";

// ============================================================================
// Library Sources
// ============================================================================

/// Helper library: DOM querying, chain traversal and document readiness.
pub const HELPER_LIBRARY: &str = r#"
window.__wdHelper = window.__wdHelper || (function () {
  function unique(list) {
    var out = [];
    for (var i = 0; i < list.length; i++) {
      if (list[i] && out.indexOf(list[i]) < 0) { out.push(list[i]); }
    }
    return out;
  }
  function matches(el, selector) {
    return el.nodeType === 1 && (selector == null || el.matches(selector));
  }
  function query(root, selector) {
    return Array.prototype.slice.call((root || document).querySelectorAll(selector));
  }
  function flat(set, fn) {
    var out = [];
    set.forEach(function (el) { out = out.concat(fn(el)); });
    return unique(out);
  }
  function siblings(el) {
    return el.parentNode
      ? Array.prototype.filter.call(el.parentNode.children, function (s) { return s !== el; })
      : [];
  }
  var ops = {
    find: function (set, sel) { return flat(set, function (el) { return query(el, sel); }); },
    filter: function (set, sel) { return set.filter(function (el) { return matches(el, sel); }); },
    not: function (set, sel) { return set.filter(function (el) { return !matches(el, sel); }); },
    has: function (set, sel) { return set.filter(function (el) { return query(el, sel).length > 0; }); },
    parent: function (set, sel) {
      return flat(set, function (el) {
        var p = el.parentElement;
        return p && matches(p, sel) ? [p] : [];
      });
    },
    parents: function (set, sel) {
      return flat(set, function (el) {
        var out = [];
        for (var p = el.parentElement; p; p = p.parentElement) { if (matches(p, sel)) { out.push(p); } }
        return out;
      });
    },
    closest: function (set, sel) {
      return flat(set, function (el) { var c = el.closest(sel); return c ? [c] : []; });
    },
    children: function (set, sel) {
      return flat(set, function (el) {
        return Array.prototype.filter.call(el.children, function (c) { return matches(c, sel); });
      });
    },
    siblings: function (set, sel) {
      return flat(set, function (el) { return siblings(el).filter(function (s) { return matches(s, sel); }); });
    },
    next: function (set, sel) {
      return flat(set, function (el) {
        var n = el.nextElementSibling;
        return n && matches(n, sel) ? [n] : [];
      });
    },
    prev: function (set, sel) {
      return flat(set, function (el) {
        var n = el.previousElementSibling;
        return n && matches(n, sel) ? [n] : [];
      });
    },
    first: function (set) { return set.slice(0, 1); },
    last: function (set) { return set.slice(-1); },
    eq: function (set, index) {
      var i = index < 0 ? set.length + index : index;
      return set[i] ? [set[i]] : [];
    }
  };
  function traverse(set, chain) {
    (chain || []).forEach(function (step) {
      var names = Object.keys(step);
      if (names.length !== 1 || !ops.hasOwnProperty(names[0])) {
        throw new Error("unknown chain operation: " + names.join(","));
      }
      set = ops[names[0]](set, step[names[0]]);
    });
    return set;
  }
  function ready(callback) {
    if (document.readyState === "complete") { callback(); return; }
    window.addEventListener("load", function () { callback(); });
  }
  return { query: query, traverse: traverse, ready: ready, ops: ops };
})();
"#;

/// Selection function: selector, optional parent, chain of traversal steps.
pub const SELECTOR_SOURCE: &str = r#"
window.__wdSelect = window.__wdSelect || function (selector, parent, chain) {
  var root = parent || document;
  var set = window.__wdHelper.query(root, selector);
  return window.__wdHelper.traverse(set, chain);
};
"#;

// ============================================================================
// Probes
// ============================================================================

/// Probe for synchronous scripts; returns a sentinel when a global is missing.
pub const PROBE_SYNC: &str = r#"
if (!window.__wdHelper) { return "wd:missing-helper"; }
if (!window.__wdSelect) { return "wd:missing-selector"; }
"#;

/// Probe for asynchronous scripts; reports the sentinel through the callback.
pub const PROBE_ASYNC: &str = r#"
if (!window.__wdHelper) { arguments[arguments.length - 1]("wd:missing-helper"); return; }
if (!window.__wdSelect) { arguments[arguments.length - 1]("wd:missing-selector"); return; }
"#;

// ============================================================================
// Bodies
// ============================================================================

/// Runs the selection function on `arguments[0..3]`.
pub const SELECT_BODY: &str = "return window.__wdSelect(arguments[0], arguments[1], arguments[2]);";

/// Races document readiness against `arguments[0]` milliseconds.
///
/// Reports `true` when ready and `false` when the local timer wins.
pub const DOCUMENT_READY: &str = r#"
var done = arguments[arguments.length - 1];
var settled = false;
function settle(result) { if (!settled) { settled = true; done(result); } }
setTimeout(function () { settle(false); }, arguments[0]);
window.__wdHelper.ready(function () { settle(true); });
"#;

/// Returns `outerHTML` of `arguments[0]`.
pub const OUTER_HTML: &str = "return arguments[0].outerHTML;";

/// Scrolls `arguments[0]` into view.
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::browser::ChainStep;

    #[test]
    fn test_probes_report_the_sentinels() {
        for probe in [PROBE_SYNC, PROBE_ASYNC] {
            assert!(probe.contains(MISSING_HELPER));
            assert!(probe.contains(MISSING_SELECTOR));
        }
    }

    #[test]
    fn test_helper_knows_every_chain_operation() {
        for op in ChainStep::OPERATIONS {
            assert!(
                HELPER_LIBRARY.contains(&format!("    {op}: function")),
                "helper lacks {op}"
            );
        }
    }
}
