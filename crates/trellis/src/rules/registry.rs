//! Per-context rule registration and lookup.
//!
//! The registry is an explicit object with its own lifecycle: the hosting
//! application constructs one and passes it by reference to whatever needs
//! to resolve rules. There is no process-wide singleton, so tests (and
//! embedders running several editors) construct isolated registries.

use indexmap::IndexMap;
use log::debug;

use super::ConnectorRule;

/// Maps context ids to their connector rules.
///
/// A context with no registered rule has no contextual restriction; only
/// intrinsic validation applies there.
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: IndexMap<String, ConnectorRule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        RuleRegistry::default()
    }

    /// Registers (or replaces) the rule for a context.
    pub fn register(&mut self, context: &str, rule: ConnectorRule) {
        debug!(context; "rule registered");
        self.rules.insert(context.to_string(), rule);
    }

    /// The rule registered for a context, if any.
    pub fn get(&self, context: &str) -> Option<&ConnectorRule> {
        self.rules.get(context)
    }

    /// Removes and returns the rule for a context.
    pub fn remove(&mut self, context: &str) -> Option<ConnectorRule> {
        let removed = self.rules.shift_remove(context);
        if removed.is_some() {
            debug!(context; "rule removed");
        }
        removed
    }

    pub fn contains(&self, context: &str) -> bool {
        self.rules.contains_key(context)
    }

    /// A copy of every registered entry, in registration order.
    pub fn rules(&self) -> IndexMap<String, ConnectorRule> {
        self.rules.clone()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
