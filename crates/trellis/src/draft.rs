//! The connector-creation state machine.
//!
//! `Idle → SourceSelected(sourceId) → { accepted | rejected } → Idle`.
//! Only the accept/reject decision is owned here; highlighting and
//! preview lines belong to the UI. A proposal resolves both endpoints
//! and the context's committed connectors from the store, validates the
//! candidate under the registry's rule, and commits it on acceptance.

use log::debug;
use thiserror::Error;

use trellis_core::component::{ArrowDirection, ComponentKind, ConnectorFields, Payload};
use trellis_core::factory::{self, ComponentInit, FactoryError};

use crate::rules::{ConnectorRejected, RuleRegistry, validate_connector};
use crate::store::{ComponentStore, StoreError};

/// Where a draft currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    Idle,
    SourceSelected(String),
}

/// Errors raised while proposing a connection.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("no source selected")]
    NoSourceSelected,
    #[error("no component with id `{0}`")]
    UnknownComponent(String),
    #[error(transparent)]
    Rejected(#[from] ConnectorRejected),
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An in-flight connector creation scoped to one context.
#[derive(Debug)]
pub struct ConnectorDraft {
    context: String,
    state: DraftState,
}

impl ConnectorDraft {
    pub fn new(context: &str) -> Self {
        ConnectorDraft {
            context: context.to_string(),
            state: DraftState::Idle,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    /// Picks (or re-picks) the source endpoint.
    pub fn select_source(&mut self, source_id: &str) {
        self.state = DraftState::SourceSelected(source_id.to_string());
    }

    /// Abandons the draft.
    pub fn cancel(&mut self) {
        self.state = DraftState::Idle;
    }

    /// Proposes the selected source connect to `to_id`.
    ///
    /// Whatever the verdict, the draft returns to `Idle`. On acceptance
    /// the connector is committed to the store and its id returned.
    pub fn propose(
        &mut self,
        store: &mut ComponentStore,
        registry: &RuleRegistry,
        to_id: &str,
    ) -> Result<String, DraftError> {
        let state = std::mem::replace(&mut self.state, DraftState::Idle);
        let DraftState::SourceSelected(from_id) = state else {
            return Err(DraftError::NoSourceSelected);
        };

        let from = store
            .get(&from_id)
            .ok_or_else(|| DraftError::UnknownComponent(from_id.clone()))?;
        let to = store
            .get(to_id)
            .ok_or_else(|| DraftError::UnknownComponent(to_id.to_string()))?;

        let mut fields = ConnectorFields::between(&from_id, to_id);
        fields.direction = ArrowDirection::between(from.position(), to.position());
        let candidate = factory::create(
            ComponentKind::Connector,
            ComponentInit {
                payload: Some(Payload::Connector(fields)),
                ..ComponentInit::in_context(&self.context)
            },
        )?;

        let existing = store.connectors_in_context(&self.context);
        validate_connector(&candidate, from, to, &existing, registry.get(&self.context))?;

        let id = candidate.id().to_string();
        store.add(candidate)?;
        debug!(id, from_id, to_id; "connector accepted");
        Ok(id)
    }
}
