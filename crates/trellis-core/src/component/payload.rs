//! Kind-specific payloads carried by the component envelope.
//!
//! Each component kind owns one payload variant; the closed [`Payload`]
//! union keeps kind dispatch exhaustive. Field structs derive serde with
//! `#[serde(default)]` so partially persisted records still load.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ComponentKind;
use super::connector::ConnectorFields;

/// Kind-specific fields of a process (action) component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessFields {
    /// Display name of the action; required non-empty for validity.
    pub process_name: String,
    pub description: String,
}

impl Default for ProcessFields {
    fn default() -> Self {
        ProcessFields {
            process_name: "New process".to_string(),
            description: String::new(),
        }
    }
}

/// Kind-specific fields of a decision (branch) component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecisionFields {
    /// The question posed at the branch; required non-empty for validity.
    pub question: String,
    /// Ordered outcome labels; must stay non-empty.
    pub conditions: Vec<String>,
}

impl Default for DecisionFields {
    fn default() -> Self {
        DecisionFields {
            question: "Condition?".to_string(),
            conditions: vec!["Yes".to_string(), "No".to_string()],
        }
    }
}

/// Kind-specific fields of a start/end terminator component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StartEndFields {
    pub is_start: bool,
}

impl Default for StartEndFields {
    fn default() -> Self {
        StartEndFields { is_start: true }
    }
}

/// A named, typed field of a data component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Kind-specific fields of a data (storage) component.
///
/// Field names need not be unique; deduplication is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataFields {
    pub data_type: String,
    pub fields: Vec<FieldDef>,
}

impl Default for DataFields {
    fn default() -> Self {
        DataFields {
            data_type: "generic".to_string(),
            fields: Vec::new(),
        }
    }
}

/// Free-form payload for caller-defined component kinds.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomFields {
    pub custom_properties: Map<String, Value>,
}

/// The closed union of kind-specific payloads.
///
/// The discriminator is not serialized here; the portable form carries the
/// kind tag on the flat record and the factory re-dispatches on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Process(ProcessFields),
    Decision(DecisionFields),
    StartEnd(StartEndFields),
    Data(DataFields),
    Custom(CustomFields),
    Connector(ConnectorFields),
}

impl Payload {
    /// Returns the kind discriminator for this payload.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Payload::Process(_) => ComponentKind::Process,
            Payload::Decision(_) => ComponentKind::Decision,
            Payload::StartEnd(_) => ComponentKind::StartEnd,
            Payload::Data(_) => ComponentKind::Data,
            Payload::Custom(_) => ComponentKind::Custom,
            Payload::Connector(_) => ComponentKind::Connector,
        }
    }

    /// Kind-specific defaults, the single source of truth for what a bare
    /// `create(kind, ..)` produces.
    pub fn default_for(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Process => Payload::Process(ProcessFields::default()),
            ComponentKind::Decision => Payload::Decision(DecisionFields::default()),
            ComponentKind::StartEnd => Payload::StartEnd(StartEndFields::default()),
            ComponentKind::Data => Payload::Data(DataFields::default()),
            ComponentKind::Custom => Payload::Custom(CustomFields::default()),
            ComponentKind::Connector => Payload::Connector(ConnectorFields::default()),
        }
    }

    /// Serializes the payload fields into a flat JSON object for the
    /// portable form.
    pub fn to_fields(&self) -> Map<String, Value> {
        let value = match self {
            Payload::Process(fields) => serde_json::to_value(fields),
            Payload::Decision(fields) => serde_json::to_value(fields),
            Payload::StartEnd(fields) => serde_json::to_value(fields),
            Payload::Data(fields) => serde_json::to_value(fields),
            Payload::Custom(fields) => serde_json::to_value(fields),
            Payload::Connector(fields) => serde_json::to_value(fields),
        };
        match value {
            Ok(Value::Object(map)) => map,
            // Payload structs always serialize to objects.
            _ => Map::new(),
        }
    }

    /// Reconstructs a payload of the given kind from flat portable fields.
    ///
    /// Missing fields fall back to the kind's defaults; fields of the wrong
    /// shape are an error.
    pub fn from_fields(
        kind: ComponentKind,
        fields: &Map<String, Value>,
    ) -> Result<Self, serde_json::Error> {
        let value = Value::Object(fields.clone());
        Ok(match kind {
            ComponentKind::Process => Payload::Process(serde_json::from_value(value)?),
            ComponentKind::Decision => Payload::Decision(serde_json::from_value(value)?),
            ComponentKind::StartEnd => Payload::StartEnd(serde_json::from_value(value)?),
            ComponentKind::Data => Payload::Data(serde_json::from_value(value)?),
            ComponentKind::Custom => Payload::Custom(serde_json::from_value(value)?),
            ComponentKind::Connector => Payload::Connector(serde_json::from_value(value)?),
        })
    }
}
