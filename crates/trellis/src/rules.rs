//! Context-scoped connector validation.
//!
//! Validation is two-phase. Intrinsic checks come from the entity model
//! (distinct non-empty endpoints, label position in range, positive
//! bounding box). Contextual checks run only when a [`ConnectorRule`] is
//! registered for the connector's context, in a fixed order: allowed
//! source kind, allowed destination kind, forbidden pair, fan-out, fan-in,
//! bidirectionality, then the custom predicate last. The first failing
//! check short-circuits; the predicate is never consulted after a
//! structural failure.
//!
//! This module is the only place with whole-graph visibility: the caller
//! hands it the already-accepted connectors of the context, and preset
//! predicates ([`presets`]) use them for cycle detection ([`cycle`]).

pub mod cycle;
pub mod presets;
mod registry;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use trellis_core::component::{Component, ComponentKind, ConnectorFields, Violation};

use crate::store::join_violations;

pub use registry::RuleRegistry;

/// Why a candidate connector was turned away.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("component is not a connector")]
    NotAConnector,
    #[error("connector is structurally invalid: {}", join_violations(.0))]
    Invalid(Vec<Violation>),
    #[error("kind {0} is not allowed as a source in this context")]
    SourceKindNotAllowed(ComponentKind),
    #[error("kind {0} is not allowed as a destination in this context")]
    DestinationKindNotAllowed(ComponentKind),
    #[error("connections from {from} to {to} are forbidden in this context")]
    ForbiddenPair {
        from: ComponentKind,
        to: ComponentKind,
    },
    #[error("source already has the maximum of {limit} outgoing connections")]
    FanOutExceeded { limit: usize },
    #[error("destination already has the maximum of {limit} incoming connections")]
    FanInExceeded { limit: usize },
    #[error("connections must be bidirectional in this context")]
    BidirectionalRequired,
    #[error("accepting this connector would create a cycle")]
    CycleDetected,
    #[error("{0}")]
    Custom(String),
}

/// A rejected connector, carrying the reason for the verdict.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("connector rejected: {reason}")]
pub struct ConnectorRejected {
    pub reason: RejectReason,
}

impl From<RejectReason> for ConnectorRejected {
    fn from(reason: RejectReason) -> Self {
        ConnectorRejected { reason }
    }
}

/// Everything a custom predicate can see: the candidate connector, its
/// resolved endpoints, and the already-accepted connectors of the context.
pub struct Candidate<'a> {
    pub connector: &'a Component,
    pub fields: &'a ConnectorFields,
    pub from: &'a Component,
    pub to: &'a Component,
    pub existing: &'a [&'a Component],
}

/// The custom-check hook of a rule; evaluated last, after every
/// structural check has passed.
pub type RulePredicate = Arc<dyn Fn(&Candidate<'_>) -> Result<(), RejectReason> + Send + Sync>;

/// Per-context constraints on which connectors are acceptable.
///
/// An empty rule (the default) imposes no contextual restriction; intrinsic
/// validation still applies. Built with `with_*` combinators:
///
/// ```
/// use trellis::rules::ConnectorRule;
/// use trellis::component::ComponentKind;
///
/// let rule = ConnectorRule::new()
///     .with_allowed_from([ComponentKind::Decision, ComponentKind::StartEnd])
///     .with_max_from(2)
///     .with_forbidden_pair(ComponentKind::Process, ComponentKind::Decision);
/// ```
#[derive(Default, Clone)]
pub struct ConnectorRule {
    pub allowed_from: Option<Vec<ComponentKind>>,
    pub allowed_to: Option<Vec<ComponentKind>>,
    pub max_from: Option<usize>,
    pub max_to: Option<usize>,
    pub forbidden_pairs: Vec<(ComponentKind, ComponentKind)>,
    pub requires_bidirectional: bool,
    pub predicate: Option<RulePredicate>,
}

impl fmt::Debug for ConnectorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorRule")
            .field("allowed_from", &self.allowed_from)
            .field("allowed_to", &self.allowed_to)
            .field("max_from", &self.max_from)
            .field("max_to", &self.max_to)
            .field("forbidden_pairs", &self.forbidden_pairs)
            .field("requires_bidirectional", &self.requires_bidirectional)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

impl ConnectorRule {
    /// An unrestricted rule.
    pub fn new() -> Self {
        ConnectorRule::default()
    }

    /// Restricts which kinds may act as a source.
    pub fn with_allowed_from(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.allowed_from = Some(kinds.into_iter().collect());
        self
    }

    /// Restricts which kinds may act as a destination.
    pub fn with_allowed_to(mut self, kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        self.allowed_to = Some(kinds.into_iter().collect());
        self
    }

    /// Caps outgoing connections per source in the context.
    pub fn with_max_from(mut self, limit: usize) -> Self {
        self.max_from = Some(limit);
        self
    }

    /// Caps incoming connections per destination in the context.
    pub fn with_max_to(mut self, limit: usize) -> Self {
        self.max_to = Some(limit);
        self
    }

    /// Forbids one (source kind, destination kind) pair.
    pub fn with_forbidden_pair(mut self, from: ComponentKind, to: ComponentKind) -> Self {
        self.forbidden_pairs.push((from, to));
        self
    }

    /// Requires candidates to be flagged bidirectional.
    pub fn with_bidirectional_required(mut self) -> Self {
        self.requires_bidirectional = true;
        self
    }

    /// Installs the custom predicate, evaluated after every structural
    /// check has passed.
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&Candidate<'_>) -> Result<(), RejectReason> + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }
}

/// Two-phase validation of a candidate connector.
///
/// `existing` is the set of already-accepted connectors in the candidate's
/// context; when counting fan-in/fan-out, an entry with the candidate's own
/// id is excluded so re-validating a committed connector does not count
/// itself. `rule` is the context's registered rule, or `None` for "no
/// contextual restriction".
pub fn validate_connector(
    connector: &Component,
    from: &Component,
    to: &Component,
    existing: &[&Component],
    rule: Option<&ConnectorRule>,
) -> Result<(), ConnectorRejected> {
    let fields = connector
        .connector()
        .ok_or(RejectReason::NotAConnector)?;

    // Phase 1: intrinsic, context-free validation.
    let violations = connector.violations();
    if !violations.is_empty() {
        return Err(RejectReason::Invalid(violations).into());
    }

    // Phase 2: contextual validation, only under a registered rule.
    let Some(rule) = rule else {
        return Ok(());
    };

    if let Some(allowed) = &rule.allowed_from {
        if !allowed.contains(&from.kind()) {
            return Err(RejectReason::SourceKindNotAllowed(from.kind()).into());
        }
    }
    if let Some(allowed) = &rule.allowed_to {
        if !allowed.contains(&to.kind()) {
            return Err(RejectReason::DestinationKindNotAllowed(to.kind()).into());
        }
    }
    if rule
        .forbidden_pairs
        .iter()
        .any(|&(f, t)| f == from.kind() && t == to.kind())
    {
        return Err(RejectReason::ForbiddenPair {
            from: from.kind(),
            to: to.kind(),
        }
        .into());
    }

    if let Some(limit) = rule.max_from {
        let outgoing = existing
            .iter()
            .filter(|c| c.id() != connector.id())
            .filter_map(|c| c.connector())
            .filter(|f| f.from_id == fields.from_id)
            .count();
        if outgoing >= limit {
            return Err(RejectReason::FanOutExceeded { limit }.into());
        }
    }
    if let Some(limit) = rule.max_to {
        let incoming = existing
            .iter()
            .filter(|c| c.id() != connector.id())
            .filter_map(|c| c.connector())
            .filter(|f| f.to_id == fields.to_id)
            .count();
        if incoming >= limit {
            return Err(RejectReason::FanInExceeded { limit }.into());
        }
    }

    if rule.requires_bidirectional && !fields.bidirectional {
        return Err(RejectReason::BidirectionalRequired.into());
    }

    if let Some(predicate) = &rule.predicate {
        let candidate = Candidate {
            connector,
            fields,
            from,
            to,
            existing,
        };
        predicate(&candidate).map_err(ConnectorRejected::from)?;
    }

    Ok(())
}
