//! Connector-specific payload: endpoints, arrow styling, and label.
//!
//! A connector is a directed edge between two components, itself modeled
//! as a component variant. Everything here except the endpoints and the
//! label position is a rendering hint; the rule engine only ever reads
//! `from_id`, `to_id`, and `bidirectional`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Position};

/// Compass direction of the arrow, used for rendering only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowDirection {
    #[default]
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Up,
    UpRight,
}

impl ArrowDirection {
    /// Derives the compass direction from two component positions by
    /// splitting the angle between their centers into eight octants.
    pub fn between(from: &Position, to: &Position) -> Self {
        let from = from.center();
        let to = to.center();
        let angle = (to.y - from.y).atan2(to.x - from.x).to_degrees();

        match angle {
            a if (-22.5..22.5).contains(&a) => Self::Right,
            a if (22.5..67.5).contains(&a) => Self::DownRight,
            a if (67.5..112.5).contains(&a) => Self::Down,
            a if (112.5..157.5).contains(&a) => Self::DownLeft,
            a if (-67.5..-22.5).contains(&a) => Self::UpRight,
            a if (-112.5..-67.5).contains(&a) => Self::Up,
            a if (-157.5..-112.5).contains(&a) => Self::UpLeft,
            _ => Self::Left,
        }
    }
}

/// Line pattern of the connector body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

impl FromStr for LineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "double" => Ok(Self::Double),
            _ => Err(format!(
                "invalid line style `{s}`, valid values: solid, dashed, dotted, double"
            )),
        }
    }
}

/// Terminator glyph drawn at a connector end.
///
/// Each end is independently settable; the default connector has a bare
/// start and an arrow head at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapStyle {
    Arrow,
    Triangle,
    Circle,
    Diamond,
    None,
}

/// Kind-specific fields of a connector component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorFields {
    /// Id of the source component. Required, must differ from `to_id`.
    pub from_id: String,
    /// Id of the destination component. Required, must differ from `from_id`.
    pub to_id: String,
    pub direction: ArrowDirection,
    pub line_style: LineStyle,
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    /// Control points for curved rendering; validation-inert.
    pub control_points: Vec<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fraction along the connector where the label sits, in `[0, 1]`.
    pub label_position: f64,
    pub bidirectional: bool,
}

impl Default for ConnectorFields {
    fn default() -> Self {
        ConnectorFields {
            from_id: String::new(),
            to_id: String::new(),
            direction: ArrowDirection::Right,
            line_style: LineStyle::Solid,
            start_cap: CapStyle::None,
            end_cap: CapStyle::Arrow,
            control_points: Vec::new(),
            label: None,
            label_position: 0.5,
            bidirectional: false,
        }
    }
}

impl ConnectorFields {
    /// Builds default connector fields between the two endpoints.
    pub fn between(from_id: &str, to_id: &str) -> Self {
        ConnectorFields {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            ..ConnectorFields::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> Position {
        Position {
            x,
            y,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
        }
    }

    #[test]
    fn direction_covers_all_octants() {
        let origin = at(0.0, 0.0);
        // Canvas y grows downward, matching the editor's coordinate space.
        let cases = [
            (at(100.0, 0.0), ArrowDirection::Right),
            (at(100.0, 100.0), ArrowDirection::DownRight),
            (at(0.0, 100.0), ArrowDirection::Down),
            (at(-100.0, 100.0), ArrowDirection::DownLeft),
            (at(-100.0, 0.0), ArrowDirection::Left),
            (at(-100.0, -100.0), ArrowDirection::UpLeft),
            (at(0.0, -100.0), ArrowDirection::Up),
            (at(100.0, -100.0), ArrowDirection::UpRight),
        ];

        for (to, expected) in cases {
            assert_eq!(ArrowDirection::between(&origin, &to), expected);
        }
    }

    #[test]
    fn default_caps_are_bare_start_arrow_end() {
        let fields = ConnectorFields::default();
        assert_eq!(fields.start_cap, CapStyle::None);
        assert_eq!(fields.end_cap, CapStyle::Arrow);
        assert_eq!(fields.label_position, 0.5);
    }
}
