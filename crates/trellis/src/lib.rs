//! Trellis - the domain layer of a visual diagram editor.
//!
//! Typed diagram components, an identity-keyed store with a portable
//! serialization form, and a context-scoped connector rule engine with
//! cycle detection. Rendering, interaction, and concrete storage media
//! are the hosting application's concern; this crate owns the entities
//! and the invariants.
//!
//! # Examples
//!
//! ```
//! use trellis::{ComponentStore, ConnectorDraft, RuleRegistry};
//! use trellis::rules::presets;
//! use trellis::factory;
//!
//! let mut store = ComponentStore::new();
//! let mut start = factory::start();
//! start.add_to_context("step-1");
//! let mut process = factory::process();
//! process.add_to_context("step-1");
//! let (start_id, process_id) = (start.id().to_string(), process.id().to_string());
//! store.add(start).unwrap();
//! store.add(process).unwrap();
//!
//! // Keep step-1 acyclic.
//! let mut registry = RuleRegistry::new();
//! registry.register("step-1", presets::dag());
//!
//! let mut draft = ConnectorDraft::new("step-1");
//! draft.select_source(&start_id);
//! let connector_id = draft.propose(&mut store, &registry, &process_id).unwrap();
//! assert!(store.has(&connector_id));
//!
//! // The reverse edge would close a two-node cycle.
//! draft.select_source(&process_id);
//! assert!(draft.propose(&mut store, &registry, &start_id).is_err());
//! ```

pub mod draft;
mod error;
pub mod rules;
pub mod store;

pub use trellis_core::{component, content, factory, geometry, portable, style};

pub use draft::{ConnectorDraft, DraftError, DraftState};
pub use error::TrellisError;
pub use rules::{
    Candidate, ConnectorRejected, ConnectorRule, RejectReason, RuleRegistry, validate_connector,
};
pub use store::{ComponentStore, Filter, LoadReport, SkippedRecord, StoreError, StoreStats};
