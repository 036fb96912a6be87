//! The component entity model.
//!
//! Every diagram entity shares one envelope ([`Component`]): identity,
//! placement, styling, display content, context memberships, an open
//! extension bag, and timestamps. Kind-specific data lives in the closed
//! [`Payload`] union so dispatch stays exhaustive.
//!
//! Construction goes through the factory ([`crate::factory`]); this module
//! owns mutation and validation. Mutators apply merge-patches atomically
//! and advance `updated_at`; [`Component::violations`] collects every
//! violated invariant without short-circuiting.

pub mod connector;
pub mod payload;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::content::{Content, ContentPatch};
use crate::geometry::{Point, Position, PositionPatch};
use crate::style::{Style, StylePatch};

pub use connector::{ArrowDirection, CapStyle, ConnectorFields, LineStyle};
pub use payload::{
    CustomFields, DataFields, DecisionFields, FieldDef, Payload, ProcessFields, StartEndFields,
};

// =============================================================================
// Discriminators
// =============================================================================

/// The component kind discriminator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Process,
    Decision,
    StartEnd,
    Data,
    Custom,
    Connector,
}

impl ComponentKind {
    /// All kinds, in portable-form order.
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Process,
        ComponentKind::Decision,
        ComponentKind::StartEnd,
        ComponentKind::Data,
        ComponentKind::Custom,
        ComponentKind::Connector,
    ];

    /// Returns the discriminator string used in the portable form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Decision => "decision",
            Self::StartEnd => "start-end",
            Self::Data => "data",
            Self::Custom => "custom",
            Self::Connector => "connector",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "decision" => Ok(Self::Decision),
            "start-end" => Ok(Self::StartEnd),
            "data" => Ok(Self::Data),
            "custom" => Ok(Self::Custom),
            "connector" => Ok(Self::Connector),
            _ => Err(format!(
                "invalid component kind `{s}`, valid values: process, decision, start-end, \
                 data, custom, connector"
            )),
        }
    }
}

/// Rendering hint for the component outline; semantically inert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Diamond,
    Circle,
    RoundedRectangle,
}

impl ShapeKind {
    /// Returns the discriminator string used in the portable form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Circle => "circle",
            Self::RoundedRectangle => "rounded-rectangle",
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// A single violated invariant reported by [`Component::violations`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("id is empty")]
    MissingId,
    #[error("dimensions must be positive, got {width}x{height}")]
    NonPositiveDimensions { width: f64, height: f64 },
    #[error("process name is empty")]
    MissingProcessName,
    #[error("decision question is empty")]
    MissingQuestion,
    #[error("decision has no conditions")]
    EmptyConditions,
    #[error("connector has no source component")]
    MissingSource,
    #[error("connector has no destination component")]
    MissingDestination,
    #[error("connector may not connect a component to itself")]
    SelfLoop,
    #[error("label position {0} is outside [0, 1]")]
    LabelPositionOutOfRange(f64),
}

/// Error returned by kind-specific mutators applied to the wrong kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation requires a {expected} component, found {actual}")]
pub struct KindMismatch {
    pub expected: ComponentKind,
    pub actual: ComponentKind,
}

// =============================================================================
// Component envelope
// =============================================================================

/// Raw pieces of a component, used by the factory and the portable form
/// to assemble an envelope without re-deriving defaults.
#[derive(Debug, Clone)]
pub(crate) struct ComponentParts {
    pub id: String,
    pub shape: ShapeKind,
    pub position: Position,
    pub style: Style,
    pub content: Content,
    pub contexts: Vec<String>,
    pub extensions: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payload: Payload,
}

/// A typed diagram entity.
///
/// Fields are private; reads go through accessors and every mutation goes
/// through a defined operation that advances `updated_at`. The borrow
/// checker guarantees callers can never hold a live mutable view into an
/// entity owned by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    id: String,
    shape: ShapeKind,
    position: Position,
    style: Style,
    content: Content,
    contexts: Vec<String>,
    extensions: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    payload: Payload,
}

impl Component {
    pub(crate) fn from_parts(parts: ComponentParts) -> Self {
        let mut contexts = Vec::new();
        for context in parts.contexts {
            if !contexts.contains(&context) {
                contexts.push(context);
            }
        }
        Component {
            id: parts.id,
            shape: parts.shape,
            position: parts.position,
            style: parts.style,
            content: parts.content,
            contexts,
            extensions: parts.extensions,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            payload: parts.payload,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Opaque unique identifier, immutable after creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The kind discriminator, derived from the payload.
    pub fn kind(&self) -> ComponentKind {
        self.payload.kind()
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Context ids the component participates in, insertion-ordered and
    /// duplicate-free.
    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// Whether the component participates in the given context.
    pub fn in_context(&self, context: &str) -> bool {
        self.contexts.iter().any(|c| c == context)
    }

    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Advances on every mutation.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The connector payload, if this component is a connector.
    pub fn connector(&self) -> Option<&ConnectorFields> {
        match &self.payload {
            Payload::Connector(fields) => Some(fields),
            _ => None,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn kind_mismatch(&self, expected: ComponentKind) -> KindMismatch {
        KindMismatch {
            expected,
            actual: self.kind(),
        }
    }

    // ------------------------------------------------------------------
    // Envelope mutators
    // ------------------------------------------------------------------

    /// Merge-patches the position and advances `updated_at`.
    pub fn update_position(&mut self, patch: &PositionPatch) {
        patch.apply(&mut self.position);
        self.touch();
    }

    /// Merge-patches the style and advances `updated_at`.
    pub fn update_style(&mut self, patch: &StylePatch) {
        patch.apply(&mut self.style);
        self.touch();
    }

    /// Merge-patches the content and advances `updated_at`.
    pub fn update_content(&mut self, patch: &ContentPatch) {
        patch.apply(&mut self.content);
        self.touch();
    }

    /// Adds the component to a context. Duplicates are suppressed; a no-op
    /// does not advance `updated_at`. Returns whether membership changed.
    pub fn add_to_context(&mut self, context: &str) -> bool {
        if self.in_context(context) {
            return false;
        }
        self.contexts.push(context.to_string());
        self.touch();
        true
    }

    /// Removes the component from a context. Returns whether membership
    /// changed.
    pub fn remove_from_context(&mut self, context: &str) -> bool {
        let before = self.contexts.len();
        self.contexts.retain(|c| c != context);
        if self.contexts.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Sets a caller-defined extension value.
    pub fn set_extension(&mut self, key: &str, value: Value) {
        self.extensions.insert(key.to_string(), value);
        self.touch();
    }

    /// Removes a caller-defined extension value, returning it if present.
    pub fn remove_extension(&mut self, key: &str) -> Option<Value> {
        let removed = self.extensions.remove(key);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    // ------------------------------------------------------------------
    // Kind-specific mutators
    // ------------------------------------------------------------------

    /// Sets the process name. Fails on non-process components.
    pub fn set_process_name(&mut self, name: &str) -> Result<(), KindMismatch> {
        let Payload::Process(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Process));
        };
        fields.process_name = name.to_string();
        self.touch();
        Ok(())
    }

    /// Sets the process description. Fails on non-process components.
    pub fn set_description(&mut self, description: &str) -> Result<(), KindMismatch> {
        let Payload::Process(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Process));
        };
        fields.description = description.to_string();
        self.touch();
        Ok(())
    }

    /// Sets the decision question. Fails on non-decision components.
    pub fn set_question(&mut self, question: &str) -> Result<(), KindMismatch> {
        let Payload::Decision(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Decision));
        };
        fields.question = question.to_string();
        self.touch();
        Ok(())
    }

    /// Appends an outcome label to a decision.
    pub fn add_condition(&mut self, condition: &str) -> Result<(), KindMismatch> {
        let Payload::Decision(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Decision));
        };
        fields.conditions.push(condition.to_string());
        self.touch();
        Ok(())
    }

    /// Removes every occurrence of an outcome label from a decision.
    pub fn remove_condition(&mut self, condition: &str) -> Result<(), KindMismatch> {
        let Payload::Decision(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Decision));
        };
        let before = fields.conditions.len();
        fields.conditions.retain(|c| c != condition);
        if fields.conditions.len() != before {
            self.touch();
        }
        Ok(())
    }

    /// Flips a terminator between start and end.
    ///
    /// Fills in the default label ("Start"/"End") only when the display
    /// text is still empty, and swaps the terminator palette.
    pub fn set_is_start(&mut self, is_start: bool) -> Result<(), KindMismatch> {
        let Payload::StartEnd(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::StartEnd));
        };
        fields.is_start = is_start;
        if self.content.text.is_empty() {
            self.content.text = if is_start { "Start" } else { "End" }.to_string();
        }
        let (fill, stroke) = if is_start {
            ("#27ae60", "#1e8449")
        } else {
            ("#e74c3c", "#c0392b")
        };
        self.style.fill_color = fill.to_string();
        self.style.stroke_color = stroke.to_string();
        self.touch();
        Ok(())
    }

    /// Sets the nominal type of a data component.
    pub fn set_data_type(&mut self, data_type: &str) -> Result<(), KindMismatch> {
        let Payload::Data(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Data));
        };
        fields.data_type = data_type.to_string();
        self.touch();
        Ok(())
    }

    /// Appends a named field to a data component.
    pub fn add_field(&mut self, name: &str, ty: &str) -> Result<(), KindMismatch> {
        let Payload::Data(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Data));
        };
        fields.fields.push(FieldDef {
            name: name.to_string(),
            ty: ty.to_string(),
        });
        self.touch();
        Ok(())
    }

    /// Removes every field with the given name from a data component.
    pub fn remove_field(&mut self, name: &str) -> Result<(), KindMismatch> {
        let Payload::Data(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Data));
        };
        let before = fields.fields.len();
        fields.fields.retain(|f| f.name != name);
        if fields.fields.len() != before {
            self.touch();
        }
        Ok(())
    }

    /// Sets a property on a custom component.
    pub fn set_custom_property(&mut self, key: &str, value: Value) -> Result<(), KindMismatch> {
        let Payload::Custom(fields) = &mut self.payload else {
            return Err(self.kind_mismatch(ComponentKind::Custom));
        };
        fields.custom_properties.insert(key.to_string(), value);
        self.touch();
        Ok(())
    }

    /// Reads a property off a custom component.
    pub fn custom_property(&self, key: &str) -> Option<&Value> {
        match &self.payload {
            Payload::Custom(fields) => fields.custom_properties.get(key),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Connector mutators
    // ------------------------------------------------------------------

    fn connector_mut(&mut self) -> Result<&mut ConnectorFields, KindMismatch> {
        match &mut self.payload {
            Payload::Connector(fields) => Ok(fields),
            other => Err(KindMismatch {
                expected: ComponentKind::Connector,
                actual: other.kind(),
            }),
        }
    }

    /// Re-targets the connector endpoints.
    pub fn set_endpoints(&mut self, from_id: &str, to_id: &str) -> Result<(), KindMismatch> {
        let fields = self.connector_mut()?;
        fields.from_id = from_id.to_string();
        fields.to_id = to_id.to_string();
        self.touch();
        Ok(())
    }

    /// Sets the rendering direction of the arrow.
    pub fn set_direction(&mut self, direction: ArrowDirection) -> Result<(), KindMismatch> {
        self.connector_mut()?.direction = direction;
        self.touch();
        Ok(())
    }

    /// Derives the arrow direction from the endpoint positions.
    pub fn auto_direction(&mut self, from: &Position, to: &Position) -> Result<(), KindMismatch> {
        self.set_direction(ArrowDirection::between(from, to))
    }

    /// Sets the line pattern of the connector body.
    pub fn set_line_style(&mut self, line_style: LineStyle) -> Result<(), KindMismatch> {
        self.connector_mut()?.line_style = line_style;
        self.touch();
        Ok(())
    }

    /// Sets both terminator glyphs at once.
    pub fn set_caps(&mut self, start: CapStyle, end: CapStyle) -> Result<(), KindMismatch> {
        let fields = self.connector_mut()?;
        fields.start_cap = start;
        fields.end_cap = end;
        self.touch();
        Ok(())
    }

    /// Replaces the control points used for curved rendering.
    pub fn set_control_points(&mut self, points: Vec<Point>) -> Result<(), KindMismatch> {
        self.connector_mut()?.control_points = points;
        self.touch();
        Ok(())
    }

    /// Sets the connector label and its position along the edge.
    pub fn set_label(&mut self, label: &str, position: f64) -> Result<(), KindMismatch> {
        let fields = self.connector_mut()?;
        fields.label = Some(label.to_string());
        fields.label_position = position;
        self.touch();
        Ok(())
    }

    /// Marks the connector as bidirectional (or not).
    pub fn set_bidirectional(&mut self, bidirectional: bool) -> Result<(), KindMismatch> {
        self.connector_mut()?.bidirectional = bidirectional;
        self.touch();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Collects every violated invariant, base and kind-specific, without
    /// short-circuiting on the first failure.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if self.id.is_empty() {
            violations.push(Violation::MissingId);
        }
        if self.position.width <= 0.0 || self.position.height <= 0.0 {
            violations.push(Violation::NonPositiveDimensions {
                width: self.position.width,
                height: self.position.height,
            });
        }

        match &self.payload {
            Payload::Process(fields) => {
                if fields.process_name.is_empty() {
                    violations.push(Violation::MissingProcessName);
                }
            }
            Payload::Decision(fields) => {
                if fields.question.is_empty() {
                    violations.push(Violation::MissingQuestion);
                }
                if fields.conditions.is_empty() {
                    violations.push(Violation::EmptyConditions);
                }
            }
            Payload::Connector(fields) => {
                if fields.from_id.is_empty() {
                    violations.push(Violation::MissingSource);
                }
                if fields.to_id.is_empty() {
                    violations.push(Violation::MissingDestination);
                }
                if !fields.from_id.is_empty() && fields.from_id == fields.to_id {
                    violations.push(Violation::SelfLoop);
                }
                if !(0.0..=1.0).contains(&fields.label_position) {
                    violations.push(Violation::LabelPositionOutOfRange(fields.label_position));
                }
            }
            Payload::StartEnd(_) | Payload::Data(_) | Payload::Custom(_) => {}
        }

        violations
    }

    /// Whether the component currently satisfies every invariant.
    pub fn validate(&self) -> bool {
        self.violations().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory;

    #[test]
    fn kind_parses_every_discriminator() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.as_str().parse::<ComponentKind>(), Ok(kind));
        }
        assert!("widget".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn mutation_advances_updated_at() {
        let mut component = factory::process();
        let before = component.updated_at();
        component.update_content(&ContentPatch::text("Compile"));
        assert!(component.updated_at() >= before);
        assert_eq!(component.content().text, "Compile");
    }

    #[test]
    fn context_membership_suppresses_duplicates() {
        let mut component = factory::process();
        assert!(component.add_to_context("step-1"));
        assert!(!component.add_to_context("step-1"));
        assert_eq!(component.contexts(), ["step-1".to_string()]);

        assert!(component.remove_from_context("step-1"));
        assert!(!component.remove_from_context("step-1"));
        assert!(component.contexts().is_empty());
    }

    #[test]
    fn kind_specific_setter_rejects_wrong_kind() {
        let mut component = factory::process();
        let err = component.set_question("Really?").unwrap_err();
        assert_eq!(err.expected, ComponentKind::Decision);
        assert_eq!(err.actual, ComponentKind::Process);
    }

    #[test]
    fn decision_requires_question_and_conditions() {
        let mut component = factory::decision();
        assert!(component.validate());

        component.set_question("").unwrap();
        component.remove_condition("Yes").unwrap();
        component.remove_condition("No").unwrap();

        let violations = component.violations();
        assert!(violations.contains(&Violation::MissingQuestion));
        assert!(violations.contains(&Violation::EmptyConditions));
    }

    #[test]
    fn start_end_flip_swaps_palette_and_default_label() {
        let mut component = factory::start();
        component.set_is_start(false).unwrap();

        assert_eq!(component.content().text, "End");
        assert_eq!(component.style().fill_color, "#e74c3c");
        assert_eq!(component.style().stroke_color, "#c0392b");
    }

    #[test]
    fn start_end_flip_preserves_custom_label() {
        let mut component = factory::start();
        component.update_content(&ContentPatch::text("Kickoff"));
        component.set_is_start(false).unwrap();
        assert_eq!(component.content().text, "Kickoff");
    }

    #[test]
    fn connector_self_loop_is_a_violation() {
        let mut connector = factory::connector("a", "b");
        assert!(connector.validate());

        connector.set_endpoints("a", "a").unwrap();
        assert!(connector.violations().contains(&Violation::SelfLoop));
    }

    #[test]
    fn connector_label_position_must_be_in_unit_range() {
        let mut connector = factory::connector("a", "b");
        connector.set_label("yes", 1.5).unwrap();
        assert!(
            connector
                .violations()
                .contains(&Violation::LabelPositionOutOfRange(1.5))
        );

        connector.set_label("yes", 1.0).unwrap();
        assert!(connector.validate());
    }

    #[test]
    fn non_positive_dimensions_are_collected_with_other_violations() {
        let mut component = factory::process();
        component.update_position(&PositionPatch::resized(0.0, -5.0));
        component.set_process_name("").unwrap();

        let violations = component.violations();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&Violation::MissingProcessName));
    }
}
