//! The single authorized constructor for every component kind.
//!
//! The factory centralizes which kind gets which defaults: shape, palette,
//! and payload. Construction merges a partial [`ComponentInit`] over those
//! defaults, populating `id` and the timestamps when absent. It is also
//! the re-entry point for persisted data ([`from_portable`]) and for
//! duplication ([`clone_component`]), so a reconstructed or cloned entity
//! always passes through the same kind-specific path.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::component::{
    Component, ComponentKind, ConnectorFields, Payload, ShapeKind, StartEndFields, Violation,
};
use crate::component::ComponentParts;
use crate::content::Content;
use crate::geometry::Position;
use crate::portable::PortableComponent;
use crate::style::{BorderStyle, Style};

/// Errors raised while constructing components.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The portable record carried a discriminator no kind answers to.
    #[error("unknown component kind `{0}`")]
    UnknownKind(String),

    /// The init carried a payload of a different kind than requested.
    #[error("payload of kind {payload} does not match requested kind {requested}")]
    PayloadMismatch {
        requested: ComponentKind,
        payload: ComponentKind,
    },

    /// Kind-specific fields in a portable record had the wrong shape.
    #[error("malformed {kind} fields: {source}")]
    MalformedFields {
        kind: ComponentKind,
        #[source]
        source: serde_json::Error,
    },

    /// A portable timestamp was not valid RFC 3339.
    #[error("invalid `{field}` timestamp: {source}")]
    InvalidTimestamp {
        field: &'static str,
        #[source]
        source: chrono::ParseError,
    },
}

/// Partial input for [`create`]; absent fields take kind-specific defaults.
#[derive(Debug, Default, Clone)]
pub struct ComponentInit {
    pub id: Option<String>,
    pub shape: Option<ShapeKind>,
    pub position: Option<Position>,
    pub style: Option<Style>,
    pub content: Option<Content>,
    pub contexts: Vec<String>,
    pub extensions: Map<String, Value>,
    /// Pre-built payload; when present, its kind must match the requested
    /// kind.
    pub payload: Option<Payload>,
}

impl ComponentInit {
    /// An init that only places the component in one context.
    pub fn in_context(context: &str) -> Self {
        ComponentInit {
            contexts: vec![context.to_string()],
            ..ComponentInit::default()
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// The default outline for each kind.
pub fn default_shape(kind: ComponentKind) -> ShapeKind {
    match kind {
        ComponentKind::Decision => ShapeKind::Diamond,
        ComponentKind::StartEnd => ShapeKind::RoundedRectangle,
        ComponentKind::Process
        | ComponentKind::Data
        | ComponentKind::Custom
        | ComponentKind::Connector => ShapeKind::Rectangle,
    }
}

/// The default palette for each kind.
pub fn default_style(kind: ComponentKind) -> Style {
    match kind {
        ComponentKind::Decision => Style::with_palette("#f39c12", "#d68910"),
        ComponentKind::StartEnd => Style {
            border_style: BorderStyle::Double,
            ..Style::with_palette("#27ae60", "#1e8449")
        },
        ComponentKind::Data => Style::with_palette("#9b59b6", "#7d3c98"),
        // Connectors are lines; nothing to fill.
        ComponentKind::Connector => Style {
            fill_color: "none".to_string(),
            ..Style::default()
        },
        ComponentKind::Process | ComponentKind::Custom => Style::default(),
    }
}

/// Creates a fully-defaulted component of the given kind.
///
/// `id`, `created_at`, and `updated_at` are populated when absent from the
/// init. Fails only when the init carries a payload of the wrong kind.
pub fn create(kind: ComponentKind, init: ComponentInit) -> Result<Component, FactoryError> {
    let payload = match init.payload {
        Some(payload) if payload.kind() == kind => payload,
        Some(payload) => {
            return Err(FactoryError::PayloadMismatch {
                requested: kind,
                payload: payload.kind(),
            });
        }
        None => Payload::default_for(kind),
    };

    let now = Utc::now();
    Ok(Component::from_parts(ComponentParts {
        id: init.id.unwrap_or_else(new_id),
        shape: init.shape.unwrap_or_else(|| default_shape(kind)),
        position: init.position.unwrap_or_default(),
        style: init.style.unwrap_or_else(|| default_style(kind)),
        content: init.content.unwrap_or_default(),
        contexts: init.contexts,
        extensions: init.extensions,
        created_at: now,
        updated_at: now,
        payload,
    }))
}

fn parse_timestamp(
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, FactoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| FactoryError::InvalidTimestamp { field, source })
}

/// Reconstructs a component from its portable (persisted) form.
///
/// The kind implied by the record's discriminator is restored exactly; an
/// unrecognized discriminator is [`FactoryError::UnknownKind`], never a
/// fallback to some default kind.
pub fn from_portable(record: &PortableComponent) -> Result<Component, FactoryError> {
    let kind: ComponentKind = record
        .kind
        .parse()
        .map_err(|_| FactoryError::UnknownKind(record.kind.clone()))?;
    let payload = Payload::from_fields(kind, &record.fields)
        .map_err(|source| FactoryError::MalformedFields { kind, source })?;

    Ok(Component::from_parts(ComponentParts {
        id: record.id.clone(),
        shape: record.shape,
        position: record.position,
        style: record.style.clone(),
        content: record.content.clone(),
        contexts: record.contexts.clone(),
        extensions: record.extensions.clone(),
        created_at: parse_timestamp("createdAt", &record.created_at)?,
        updated_at: parse_timestamp("updatedAt", &record.updated_at)?,
        payload,
    }))
}

/// Duplicates a component under a fresh identity and fresh timestamps.
///
/// The copy is re-derived through [`create`], so it went through the same
/// kind-specific defaulting as the original and satisfies the same
/// per-kind invariants.
pub fn clone_component(component: &Component) -> Component {
    let init = ComponentInit {
        id: None,
        shape: Some(component.shape()),
        position: Some(*component.position()),
        style: Some(component.style().clone()),
        content: Some(component.content().clone()),
        contexts: component.contexts().to_vec(),
        extensions: component.extensions().clone(),
        payload: Some(component.payload().clone()),
    };
    // The payload kind always matches its own kind.
    create(component.kind(), init).unwrap_or_else(|_| unreachable!())
}

/// Validates a whole collection, returning the violated invariants of
/// every failing entity keyed by id. Never short-circuits.
pub fn validate_all<'a>(
    components: impl IntoIterator<Item = &'a Component>,
) -> BTreeMap<String, Vec<Violation>> {
    let mut failures = BTreeMap::new();
    for component in components {
        let violations = component.violations();
        if !violations.is_empty() {
            failures.insert(component.id().to_string(), violations);
        }
    }
    failures
}

// =============================================================================
// Convenience constructors
// =============================================================================

/// A fresh process component with defaults.
pub fn process() -> Component {
    create(ComponentKind::Process, ComponentInit::default())
        .unwrap_or_else(|_| unreachable!())
}

/// A fresh decision component with defaults.
pub fn decision() -> Component {
    create(ComponentKind::Decision, ComponentInit::default())
        .unwrap_or_else(|_| unreachable!())
}

/// A fresh start terminator.
pub fn start() -> Component {
    create(ComponentKind::StartEnd, ComponentInit::default())
        .unwrap_or_else(|_| unreachable!())
}

/// A fresh end terminator.
pub fn end() -> Component {
    let init = ComponentInit {
        payload: Some(Payload::StartEnd(StartEndFields { is_start: false })),
        ..ComponentInit::default()
    };
    create(ComponentKind::StartEnd, init).unwrap_or_else(|_| unreachable!())
}

/// A fresh data component with defaults.
pub fn data() -> Component {
    create(ComponentKind::Data, ComponentInit::default()).unwrap_or_else(|_| unreachable!())
}

/// A fresh custom component with defaults.
pub fn custom() -> Component {
    create(ComponentKind::Custom, ComponentInit::default()).unwrap_or_else(|_| unreachable!())
}

/// A fresh connector between the two endpoints.
pub fn connector(from_id: &str, to_id: &str) -> Component {
    let init = ComponentInit {
        payload: Some(Payload::Connector(ConnectorFields::between(from_id, to_id))),
        ..ComponentInit::default()
    };
    create(ComponentKind::Connector, init).unwrap_or_else(|_| unreachable!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_create_is_valid_for_every_node_kind() {
        for kind in ComponentKind::ALL {
            if kind == ComponentKind::Connector {
                // A connector needs endpoints to be valid.
                continue;
            }
            let component = create(kind, ComponentInit::default()).unwrap();
            assert!(component.validate(), "{kind} should be valid by default");
            assert_eq!(component.kind(), kind);
            assert!(!component.id().is_empty());
        }
    }

    #[test]
    fn connector_with_endpoints_is_valid() {
        assert!(connector("a", "b").validate());
    }

    #[test]
    fn kind_specific_defaults_are_applied() {
        assert_eq!(decision().shape(), ShapeKind::Diamond);
        assert_eq!(start().shape(), ShapeKind::RoundedRectangle);
        assert_eq!(start().style().border_style, BorderStyle::Double);
        assert_eq!(connector("a", "b").style().fill_color, "none");
    }

    #[test]
    fn payload_kind_mismatch_is_rejected() {
        let init = ComponentInit {
            payload: Some(Payload::default_for(ComponentKind::Decision)),
            ..ComponentInit::default()
        };
        let err = create(ComponentKind::Process, init).unwrap_err();
        assert!(matches!(err, FactoryError::PayloadMismatch { .. }));
    }

    #[test]
    fn unknown_kind_discriminator_is_rejected() {
        let mut record = process().to_portable();
        record.kind = "widget".to_string();
        assert!(matches!(
            from_portable(&record),
            Err(FactoryError::UnknownKind(kind)) if kind == "widget"
        ));
    }

    #[test]
    fn clone_gets_fresh_identity_but_identical_fields() {
        let mut original = decision();
        original.set_question("Deploy?").unwrap();
        original.add_to_context("step-2");

        let copy = clone_component(&original);
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.payload(), original.payload());
        assert_eq!(copy.contexts(), original.contexts());
        assert_eq!(copy.style(), original.style());
        assert!(copy.validate());
    }

    #[test]
    fn validate_all_reports_every_failing_entity() {
        let mut bad_process = process();
        bad_process.set_process_name("").unwrap();
        let mut bad_decision = decision();
        bad_decision.set_question("").unwrap();
        let good = start();

        let failures = validate_all([&bad_process, &bad_decision, &good]);
        assert_eq!(failures.len(), 2);
        assert_eq!(
            failures[bad_process.id()],
            vec![Violation::MissingProcessName]
        );
        assert_eq!(failures[bad_decision.id()], vec![Violation::MissingQuestion]);
    }
}
