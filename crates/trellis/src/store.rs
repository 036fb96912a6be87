//! Identity-keyed component store.
//!
//! The store exclusively owns the authoritative copy of each component.
//! Nothing invalid is ever observable through it: `add` validates before
//! committing, and `update` validates a working copy and rolls back on
//! failure. Bulk loading tolerates malformed individual records, skipping
//! and reporting them instead of aborting the batch.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use trellis_core::component::{Component, ComponentKind, Violation};
use trellis_core::factory::{self, ComponentInit, FactoryError};
use trellis_core::portable::PortableComponent;

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The candidate failed validation at the point the store would have
    /// made it observable.
    #[error("invalid component `{id}`: {}", join_violations(violations))]
    InvalidEntity {
        id: String,
        violations: Vec<Violation>,
    },

    /// A mutation left the entity invalid; the pre-mutation state was
    /// kept.
    #[error("component `{id}` is invalid after update, rolled back: {}", join_violations(violations))]
    PostUpdateInvalid {
        id: String,
        violations: Vec<Violation>,
    },

    #[error("no component with id `{0}`")]
    NotFound(String),

    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub(crate) fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Composable filter criteria; present criteria compose as a logical AND.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    kind: Option<ComponentKind>,
    context: Option<String>,
    search: Option<String>,
}

impl Filter {
    pub fn new() -> Self {
        Filter::default()
    }

    /// Matches only components of the given kind.
    pub fn kind(mut self, kind: ComponentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Matches only components that are members of the given context.
    pub fn in_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    /// Case-insensitive substring match over display text and equation.
    pub fn search(mut self, needle: &str) -> Self {
        self.search = Some(needle.to_string());
        self
    }

    fn matches(&self, component: &Component) -> bool {
        if self.kind.is_some_and(|kind| component.kind() != kind) {
            return false;
        }
        if let Some(context) = &self.context {
            if !component.in_context(context) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let content = component.content();
            let in_text = content.text.to_lowercase().contains(&needle);
            let in_equation = content
                .equation
                .as_ref()
                .is_some_and(|eq| eq.to_lowercase().contains(&needle));
            if !in_text && !in_equation {
                return false;
            }
        }
        true
    }
}

/// Per-kind counts, computed fresh on every [`ComponentStore::stats`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub total: usize,
    pub by_kind: BTreeMap<ComponentKind, usize>,
}

/// One record skipped during bulk loading.
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    /// The record's id, when it could be determined.
    pub id: Option<String>,
    pub reason: String,
}

/// Aggregate outcome of a bulk load; skips are reported, not fatal.
#[derive(Debug, Default, Clone)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
}

/// The identity-keyed component collection.
#[derive(Debug, Default)]
pub struct ComponentStore {
    components: IndexMap<String, Component>,
}

impl ComponentStore {
    pub fn new() -> Self {
        ComponentStore::default()
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Adds a component, replacing any previous entity under the same id.
    ///
    /// An invalid candidate is rejected before it becomes observable.
    pub fn add(&mut self, component: Component) -> Result<(), StoreError> {
        let violations = component.violations();
        if !violations.is_empty() {
            return Err(StoreError::InvalidEntity {
                id: component.id().to_string(),
                violations,
            });
        }
        let id = component.id().to_string();
        self.components.insert(id.clone(), component);
        debug!(id; "component added");
        Ok(())
    }

    /// Creates a component through the factory and commits it.
    pub fn create_and_add(
        &mut self,
        kind: ComponentKind,
        init: ComponentInit,
    ) -> Result<&Component, StoreError> {
        let component = factory::create(kind, init)?;
        let id = component.id().to_string();
        self.add(component)?;
        // Just inserted under this id.
        Ok(&self.components[&id])
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Removes and returns the component. Connectors referencing it as an
    /// endpoint are left in place; cascading is the caller's decision.
    pub fn remove(&mut self, id: &str) -> Option<Component> {
        let removed = self.components.shift_remove(id);
        if removed.is_some() {
            debug!(id; "component removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn clear(&mut self) {
        self.components.clear();
    }

    /// Applies `mutator` to a working copy of the entity, re-validates,
    /// and commits only when the result is valid.
    ///
    /// On failure the store keeps the pre-mutation state, so an invalid
    /// entity can never be observed through [`get`](Self::get).
    pub fn update(
        &mut self,
        id: &str,
        mutator: impl FnOnce(&mut Component),
    ) -> Result<&Component, StoreError> {
        let current = self
            .components
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut working = current.clone();
        mutator(&mut working);

        let violations = working.violations();
        if !violations.is_empty() {
            warn!(id; "update rejected, entity rolled back");
            return Err(StoreError::PostUpdateInvalid {
                id: id.to_string(),
                violations,
            });
        }

        self.components.insert(id.to_string(), working);
        Ok(&self.components[id])
    }

    /// Duplicates an entity through the factory's clone path and commits
    /// the copy, returning a reference to it.
    pub fn clone_component(&mut self, id: &str) -> Result<&Component, StoreError> {
        let original = self
            .components
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let copy = factory::clone_component(original);
        let copy_id = copy.id().to_string();
        self.add(copy)?;
        Ok(&self.components[&copy_id])
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Iterates over all components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn get_all(&self) -> Vec<&Component> {
        self.components.values().collect()
    }

    /// Returns the components matching every present criterion.
    pub fn filter(&self, filter: &Filter) -> Vec<&Component> {
        self.components
            .values()
            .filter(|c| filter.matches(c))
            .collect()
    }

    pub fn by_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.filter(&Filter::new().kind(kind))
    }

    pub fn by_context(&self, context: &str) -> Vec<&Component> {
        self.filter(&Filter::new().in_context(context))
    }

    /// The connectors belonging to a context; the edge set the rule
    /// engine evaluates against.
    pub fn connectors_in_context(&self, context: &str) -> Vec<&Component> {
        self.filter(
            &Filter::new()
                .kind(ComponentKind::Connector)
                .in_context(context),
        )
    }

    /// Fresh per-kind counts plus a total; nothing is cached.
    pub fn stats(&self) -> StoreStats {
        let mut by_kind: BTreeMap<ComponentKind, usize> =
            ComponentKind::ALL.iter().map(|kind| (*kind, 0)).collect();
        for component in self.components.values() {
            *by_kind.entry(component.kind()).or_insert(0) += 1;
        }
        StoreStats {
            total: self.components.len(),
            by_kind,
        }
    }

    // ------------------------------------------------------------------
    // Portable form
    // ------------------------------------------------------------------

    /// Renders the whole collection into its portable form, in insertion
    /// order.
    pub fn to_portable(&self) -> Vec<PortableComponent> {
        self.components.values().map(|c| c.to_portable()).collect()
    }

    /// Replaces the collection with the given records.
    ///
    /// A malformed record (unknown kind, bad payload fields, bad
    /// timestamps, or an entity failing validation) is skipped and
    /// reported; it never aborts the rest of the batch.
    pub fn from_portable(&mut self, records: &[PortableComponent]) -> LoadReport {
        self.clear();
        let mut report = LoadReport::default();
        for record in records {
            match self.load_record(record) {
                Ok(()) => report.loaded += 1,
                Err(reason) => {
                    let id = record.id.clone();
                    warn!(id, reason; "skipping malformed record");
                    report.skipped.push(SkippedRecord {
                        id: Some(id),
                        reason,
                    });
                }
            }
        }
        report
    }

    fn load_record(&mut self, record: &PortableComponent) -> Result<(), String> {
        let component = factory::from_portable(record).map_err(|e| e.to_string())?;
        self.add(component).map_err(|e| e.to_string())
    }

    /// Serializes the portable form to JSON text.
    pub fn export_text(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.to_portable())?)
    }

    /// Loads the collection from JSON text produced by
    /// [`export_text`](Self::export_text).
    ///
    /// A malformed outer document is an error and leaves the store
    /// untouched; malformed individual records follow the skip rule.
    pub fn import_text(&mut self, text: &str) -> Result<LoadReport, StoreError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(text)?;
        self.clear();
        let mut report = LoadReport::default();
        for value in values {
            let id = value
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let outcome = serde_json::from_value::<PortableComponent>(value)
                .map_err(|e| e.to_string())
                .and_then(|record| self.load_record(&record));
            match outcome {
                Ok(()) => report.loaded += 1,
                Err(reason) => {
                    warn!(id:?, reason; "skipping malformed record");
                    report.skipped.push(SkippedRecord { id, reason });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::content::ContentPatch;
    use trellis_core::geometry::PositionPatch;

    fn store_with_process() -> (ComponentStore, String) {
        let mut store = ComponentStore::new();
        let id = store
            .create_and_add(ComponentKind::Process, ComponentInit::default())
            .unwrap()
            .id()
            .to_string();
        (store, id)
    }

    #[test]
    fn add_rejects_invalid_entities() {
        let mut store = ComponentStore::new();
        let mut bad = factory::process();
        bad.update_position(&PositionPatch::resized(0.0, 10.0));

        let err = store.add(bad).unwrap_err();
        assert!(matches!(err, StoreError::InvalidEntity { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_update_rolls_back_to_previous_state() {
        let (mut store, id) = store_with_process();
        store
            .update(&id, |c| c.set_process_name("Build").unwrap())
            .unwrap();

        let err = store
            .update(&id, |c| c.set_process_name("").unwrap())
            .unwrap_err();
        assert!(matches!(err, StoreError::PostUpdateInvalid { .. }));

        // The invalid state never leaks through get.
        let current = store.get(&id).unwrap();
        assert!(current.validate());
        match current.payload() {
            trellis_core::component::Payload::Process(fields) => {
                assert_eq!(fields.process_name, "Build");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = ComponentStore::new();
        assert!(matches!(
            store.update("ghost", |_| {}),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn filter_criteria_compose_as_and() {
        let mut store = ComponentStore::new();
        let mut in_step = factory::process();
        in_step.add_to_context("step-1");
        in_step.update_content(&ContentPatch::text("Compile sources"));
        let mut other_step = factory::process();
        other_step.add_to_context("step-2");
        other_step.update_content(&ContentPatch::text("Compile docs"));
        let mut decision = factory::decision();
        decision.add_to_context("step-1");

        store.add(in_step).unwrap();
        store.add(other_step).unwrap();
        store.add(decision).unwrap();

        let hits = store.filter(
            &Filter::new()
                .kind(ComponentKind::Process)
                .in_context("step-1")
                .search("COMPILE"),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content().text, "Compile sources");
    }

    #[test]
    fn search_also_matches_equations() {
        let mut store = ComponentStore::new();
        let mut component = factory::data();
        component.update_content(&ContentPatch {
            equation: Some(r"\sum_{i=0}^n x_i".to_string()),
            ..ContentPatch::default()
        });
        store.add(component).unwrap();

        assert_eq!(store.filter(&Filter::new().search("sum")).len(), 1);
        assert!(store.filter(&Filter::new().search("prod")).is_empty());
    }

    #[test]
    fn clone_commits_a_fresh_identity() {
        let (mut store, id) = store_with_process();
        let copy_id = store.clone_component(&id).unwrap().id().to_string();

        assert_ne!(copy_id, id);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(&copy_id).unwrap().payload(),
            store.get(&id).unwrap().payload()
        );
    }

    #[test]
    fn stats_are_computed_fresh() {
        let (mut store, id) = store_with_process();
        store.add(factory::decision()).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_kind[&ComponentKind::Process], 1);
        assert_eq!(stats.by_kind[&ComponentKind::Connector], 0);

        store.remove(&id);
        assert_eq!(store.stats().total, 1);
        assert_eq!(store.stats().by_kind[&ComponentKind::Process], 0);
    }

    #[test]
    fn removing_an_endpoint_does_not_cascade_to_connectors() {
        let (mut store, id) = store_with_process();
        let target = store
            .create_and_add(ComponentKind::Decision, ComponentInit::default())
            .unwrap()
            .id()
            .to_string();
        store.add(factory::connector(&id, &target)).unwrap();

        store.remove(&id);
        assert_eq!(store.by_kind(ComponentKind::Connector).len(), 1);
    }
}
