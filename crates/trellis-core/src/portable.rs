//! The portable (serialized) form of a component.
//!
//! A [`PortableComponent`] is one flat record per entity: the shared
//! envelope fields, RFC 3339 timestamp strings, a kind discriminator
//! string, and the kind-specific fields flattened alongside. An ordered
//! list of such records is the portable form of a whole store.
//!
//! Round-trip law: `factory::from_portable(&c.to_portable())` reconstructs
//! an entity equal to `c` in every observable field, with the id preserved
//! rather than regenerated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::component::Component;
use crate::component::ShapeKind;
use crate::content::Content;
use crate::geometry::Position;
use crate::style::Style;

/// Flat, serde-friendly record for one component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableComponent {
    pub id: String,
    /// Kind discriminator string; the factory dispatches on it.
    pub kind: String,
    pub shape: ShapeKind,
    pub position: Position,
    pub style: Style,
    pub content: Content,
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 last-mutation timestamp.
    pub updated_at: String,
    /// Kind-specific fields, flattened into the record.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Component {
    /// Renders the component into its portable form.
    pub fn to_portable(&self) -> PortableComponent {
        PortableComponent {
            id: self.id().to_string(),
            kind: self.kind().as_str().to_string(),
            shape: self.shape(),
            position: *self.position(),
            style: self.style().clone(),
            content: self.content().clone(),
            contexts: self.contexts().to_vec(),
            extensions: self.extensions().clone(),
            created_at: self.created_at().to_rfc3339(),
            updated_at: self.updated_at().to_rfc3339(),
            fields: self.payload().to_fields(),
        }
    }
}
