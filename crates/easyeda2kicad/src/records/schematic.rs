//! Schematic sheet records: wiring, labels, flags, texts and placed symbols.

use super::symbol::SymbolText;
use super::{pairs, Fields, Lib, RecordError};
use crate::transform::Point;

/// Wires, buses and drawn polylines share this layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroked {
    pub points: Vec<Point>,
    pub color: String,
    pub width: f64,
    /// `0` solid, `1` dashed, `2` dotted.
    pub style: String,
    pub id: String,
}

impl Stroked {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            points: pairs(&f.numbers(0, "points")?),
            color: f.string(1),
            width: f.number_or_zero(2, "strokeWidth")?,
            style: f.string(3),
            id: f.string(5),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusEntry {
    pub start: Point,
    pub end: Point,
    pub id: String,
}

impl BusEntry {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            start: Point::new(f.number(1, "startX")?, f.number(2, "startY")?),
            end: Point::new(f.number(3, "endX")?, f.number(4, "endY")?),
            id: f.string(5),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub position: Point,
    pub radius: f64,
    pub color: String,
    pub id: String,
}

impl Junction {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            position: Point::new(f.number(0, "x")?, f.number(1, "y")?),
            radius: f.number(2, "radius")?,
            color: f.string(3),
            id: f.string(4),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetLabel {
    pub position: Point,
    /// Raw rotation field; labels turn by half a revolution on conversion.
    pub rotation: String,
    pub name: String,
    pub id: String,
    pub anchor: String,
}

impl NetLabel {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            position: Point::new(f.number(0, "x")?, f.number(1, "y")?),
            rotation: f.string(2),
            name: f.string(4),
            id: f.string(5),
            anchor: f.string(6),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoConnect {
    pub position: Point,
    pub id: String,
}

impl NoConnect {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            position: Point::new(f.number(0, "x")?, f.number(1, "y")?),
            id: f.string(2),
        })
    }
}

/// Net flag: a ground or supply symbol, or a net port.
#[derive(Debug, Clone, PartialEq)]
pub struct NetFlag {
    /// Library part, e.g. `part_netLabel_gnD`.
    pub part: String,
    pub rotation: String,
    pub id: String,
    pub dot: Point,
    pub net: String,
    /// Position of the net name.
    pub label: Point,
    pub label_rotation: String,
    pub anchor: String,
    pub visible: String,
}

impl NetFlag {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let segments: Vec<&str> = body.split("^^").collect();
        let segment = |index: usize| Fields::new("F", segments.get(index).copied().unwrap_or(""));
        let head = segment(0);
        let dot = segment(1);
        let label = segment(2);
        Ok(Self {
            part: head.string(0),
            rotation: head.string(3),
            id: head.string(4),
            dot: Point::new(dot.number(0, "dotX")?, dot.number(1, "dotY")?),
            net: label.string(0),
            label: Point::new(
                label.number_or_zero(2, "labelX")?,
                label.number_or_zero(3, "labelY")?,
            ),
            label_rotation: label.string(4),
            anchor: label.string(5),
            visible: label.string(6),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchematicShape {
    Wire(Stroked),
    Bus(Stroked),
    Polyline(Stroked),
    BusEntry(BusEntry),
    Junction(Junction),
    NetLabel(NetLabel),
    NoConnect(NoConnect),
    Text(SymbolText),
    NetFlag(NetFlag),
    Lib(Lib),
}

impl SchematicShape {
    pub fn parse(record: &str) -> Result<SchematicShape, RecordError> {
        let (kind, body) = record.split_once('~').unwrap_or((record, ""));
        let shape = match kind {
            "W" => SchematicShape::Wire(Stroked::parse(&Fields::new("W", body))?),
            "B" => SchematicShape::Bus(Stroked::parse(&Fields::new("B", body))?),
            "PL" => SchematicShape::Polyline(Stroked::parse(&Fields::new("PL", body))?),
            "BE" => SchematicShape::BusEntry(BusEntry::parse(&Fields::new("BE", body))?),
            "J" => SchematicShape::Junction(Junction::parse(&Fields::new("J", body))?),
            "N" => SchematicShape::NetLabel(NetLabel::parse(&Fields::new("N", body))?),
            "O" => SchematicShape::NoConnect(NoConnect::parse(&Fields::new("O", body))?),
            "T" => SchematicShape::Text(SymbolText::parse(&Fields::new("T", body))?),
            "F" => SchematicShape::NetFlag(NetFlag::parse(body)?),
            "LIB" => SchematicShape::Lib(Lib::parse(body)?),
            other => return Err(RecordError::Unsupported(other.to_string())),
        };
        Ok(shape)
    }
}

/// Drawing kinds a schematic sheet may hold that have no sheet form.
pub fn unsupported_kind_name(kind: &str) -> Option<&'static str> {
    match kind {
        "A" => Some("arc"),
        "AR" => Some("arrow"),
        "C" => Some("circle"),
        "E" => Some("ellipse"),
        "I" => Some("image"),
        "PI" => Some("pie"),
        "PG" => Some("polygon"),
        "PT" => Some("path"),
        "R" => Some("rectangle"),
        _ => None,
    }
}
