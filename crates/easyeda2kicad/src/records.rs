//! Typed views of EasyEDA shape strings.
//!
//! A shape is a `~`-separated record whose first field names its kind.
//! Missing trailing fields read as empty. `LIB` records carry their member
//! shapes after `#@$` separators.

pub mod schematic;
pub mod symbol;

use std::collections::HashMap;

use thiserror::Error;

use crate::transform::Point;
use crate::units::parse_angle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("invalid number {value:?} for {field} in {kind}")]
    InvalidNumber {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("invalid {field} {value:?} in {kind}")]
    InvalidValue {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("unsupported shape {0}")]
    Unsupported(String),
}

struct Fields<'a> {
    kind: &'static str,
    items: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(kind: &'static str, body: &'a str) -> Self {
        Self {
            kind,
            items: body.split('~').collect(),
        }
    }

    fn text(&self, index: usize) -> &'a str {
        self.items.get(index).copied().unwrap_or("")
    }

    fn string(&self, index: usize) -> String {
        self.text(index).to_string()
    }

    fn flag(&self, index: usize) -> bool {
        self.text(index) == "1"
    }

    fn invalid(&self, field: &'static str, value: &str) -> RecordError {
        RecordError::InvalidNumber {
            kind: self.kind,
            field,
            value: value.to_string(),
        }
    }

    fn number(&self, index: usize, field: &'static str) -> Result<f64, RecordError> {
        let raw = self.text(index);
        parse_number(raw).ok_or_else(|| self.invalid(field, raw))
    }

    /// Like [`Fields::number`], but an empty field reads as zero.
    fn number_or_zero(&self, index: usize, field: &'static str) -> Result<f64, RecordError> {
        if self.text(index).trim().is_empty() {
            Ok(0.0)
        } else {
            self.number(index, field)
        }
    }

    fn optional(&self, index: usize) -> Option<f64> {
        parse_number(self.text(index))
    }

    /// Rotation field folded into (-180, 180]; empty reads as `None`.
    fn angle(&self, index: usize) -> Option<f64> {
        parse_angle(self.text(index), 0.0)
    }

    /// Whitespace separated list of numbers.
    fn numbers(&self, index: usize, field: &'static str) -> Result<Vec<f64>, RecordError> {
        self.text(index)
            .split_whitespace()
            .map(|raw| parse_number(raw).ok_or_else(|| self.invalid(field, raw)))
            .collect()
    }
}

/// Largest coordinate or size magnitude accepted, in canvas units (about
/// 254 km). Anything beyond is a corrupt field.
pub const MAX_MAGNITUDE: f64 = 1e9;

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.abs() <= MAX_MAGNITUDE)
}

fn pairs(values: &[f64]) -> Vec<Point> {
    values
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect()
}

/// Vertices of an `M x y L x y ... Z` outline. Paths containing arcs have
/// no polygon form and yield `None`.
pub fn polygon_points(path: &str) -> Option<Vec<Point>> {
    if path.contains('A') {
        return None;
    }
    let values: Vec<f64> = path
        .split(|c: char| matches!(c, ' ' | ',' | 'M' | 'L' | 'Z'))
        .filter_map(parse_number)
        .collect();
    Some(pairs(&values))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub width: f64,
    pub layer: String,
    pub net: String,
    pub points: Vec<Point>,
    pub id: String,
    pub locked: bool,
}

impl Track {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            width: f.number(0, "width")?,
            layer: f.string(1),
            net: f.string(2),
            points: pairs(&f.numbers(3, "points")?),
            id: f.string(4),
            locked: f.flag(5),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Via {
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    pub net: String,
    /// Hole radius.
    pub drill: f64,
    pub id: String,
    pub locked: bool,
}

impl Via {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            x: f.number(0, "x")?,
            y: f.number(1, "y")?,
            diameter: f.number_or_zero(2, "diameter")?,
            net: f.string(3),
            drill: f.number_or_zero(4, "drill")?,
            id: f.string(5),
            locked: f.flag(6),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// `P`: the designator.
    Reference,
    /// `N`: the value.
    Value,
    Label,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub kind: TextKind,
    pub x: f64,
    pub y: f64,
    pub stroke_width: f64,
    pub angle: Option<f64>,
    pub layer: String,
    pub font_size: f64,
    pub text: String,
    pub hidden: bool,
    pub id: String,
    pub font: String,
}

impl Text {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        let kind = match f.text(0) {
            "P" => TextKind::Reference,
            "N" => TextKind::Value,
            _ => TextKind::Label,
        };
        Ok(Self {
            kind,
            x: f.number(1, "x")?,
            y: f.number(2, "y")?,
            stroke_width: f.number_or_zero(3, "lineWidth")?,
            angle: f.angle(4),
            layer: f.string(6),
            font_size: f.number_or_zero(8, "fontSize")?,
            text: f.string(9),
            hidden: f.text(11) == "none",
            id: f.string(12),
            font: f.string(13),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub width: f64,
    pub layer: String,
    pub net: String,
    pub path: String,
    pub id: String,
    pub locked: bool,
}

impl Arc {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            width: f.number_or_zero(0, "width")?,
            layer: f.string(1),
            net: f.string(2),
            path: f.string(3),
            id: f.string(5),
            locked: f.flag(6),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    Ellipse,
    Rect,
    Oval,
    Polygon,
}

impl PadShape {
    pub fn kicad_name(self) -> &'static str {
        match self {
            PadShape::Ellipse => "circle",
            PadShape::Rect => "rect",
            PadShape::Oval => "oval",
            PadShape::Polygon => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    pub shape: PadShape,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub layer: String,
    pub net: String,
    pub number: String,
    pub hole_radius: f64,
    /// Flat x, y list of the polygon outline.
    pub points: Vec<f64>,
    pub rotation: Option<f64>,
    pub id: String,
    pub hole_length: f64,
    pub plated: bool,
    pub locked: bool,
    pub hole_center: Option<Point>,
}

impl Pad {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        let shape = match f.text(0) {
            "ELLIPSE" => PadShape::Ellipse,
            "RECT" => PadShape::Rect,
            "OVAL" => PadShape::Oval,
            "POLYGON" => PadShape::Polygon,
            other => {
                return Err(RecordError::InvalidValue {
                    kind: "PAD",
                    field: "shape",
                    value: other.to_string(),
                })
            }
        };
        let hole_center = f
            .text(18)
            .split_once(',')
            .and_then(|(x, y)| Some(Point::new(parse_number(x)?, parse_number(y)?)));
        Ok(Self {
            shape,
            x: f.number(1, "x")?,
            y: f.number(2, "y")?,
            width: f.number_or_zero(3, "width")?,
            height: f.number_or_zero(4, "height")?,
            layer: f.string(5),
            net: f.string(6),
            number: f.string(7),
            hole_radius: f.number_or_zero(8, "holeRadius")?,
            points: f.numbers(9, "points")?,
            rotation: f.angle(10),
            id: f.string(11),
            hole_length: f.number_or_zero(12, "holeLength")?,
            plated: f.text(14) == "Y",
            locked: f.flag(15),
            hole_center,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub stroke_width: f64,
    pub layer: String,
    pub id: String,
    pub locked: bool,
    pub net: String,
}

impl Circle {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            x: f.number(0, "x")?,
            y: f.number(1, "y")?,
            radius: f.number(2, "radius")?,
            stroke_width: f.number_or_zero(3, "strokeWidth")?,
            layer: f.string(4),
            id: f.string(5),
            locked: f.flag(6),
            net: f.string(7),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub layer: String,
    pub id: String,
    pub locked: bool,
    pub net: String,
}

impl Rect {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            x: f.number(0, "x")?,
            y: f.number(1, "y")?,
            width: f.number(2, "width")?,
            height: f.number(3, "height")?,
            layer: f.string(4),
            id: f.string(5),
            locked: f.flag(6),
            net: f.string(10),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolidRegion {
    pub layer: String,
    pub net: String,
    pub path: String,
    /// `solid`, `cutout` or `npth`.
    pub fill: String,
    pub id: String,
}

impl SolidRegion {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            layer: f.string(0),
            net: f.string(1),
            path: f.string(2),
            fill: f.string(3),
            id: f.string(4),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopperArea {
    pub layer: String,
    pub net: String,
    pub path: String,
    pub clearance: f64,
    /// `solid`, `grid`, or `none` for an unfilled area.
    pub fill: String,
    pub id: String,
    pub thermal: String,
    pub keep_islands: bool,
    pub name: String,
    pub grid_line_width: f64,
    pub grid_line_spacing: f64,
    pub spoke_width: Option<f64>,
}

impl CopperArea {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            layer: f.string(1),
            net: f.string(2),
            path: f.string(3),
            clearance: f.number_or_zero(4, "clearanceWidth")?,
            fill: f.string(5),
            id: f.string(6),
            thermal: f.string(7),
            keep_islands: f.text(8) == "yes",
            name: f.string(11),
            grid_line_width: f.number_or_zero(13, "gridLineWidth")?,
            grid_line_spacing: f.number_or_zero(14, "gridLineSpacing")?,
            spoke_width: f.optional(17),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub id: String,
    pub locked: bool,
}

impl Hole {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            x: f.number(0, "x")?,
            y: f.number(1, "y")?,
            radius: f.number(2, "radius")?,
            id: f.string(3),
            locked: f.flag(4),
        })
    }
}

/// A placed footprint with its member shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Lib {
    pub x: f64,
    pub y: f64,
    pub attributes: HashMap<String, String>,
    pub rotation: Option<f64>,
    pub id: String,
    pub locked: bool,
    /// Member shape records, unparsed.
    pub shapes: Vec<String>,
}

impl Lib {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let mut parts = body.split("#@$");
        let head = Fields::new("LIB", parts.next().unwrap_or(""));
        let mut attributes = HashMap::new();
        let mut attr_items = head.text(2).split('`');
        while let Some(key) = attr_items.next() {
            let value = attr_items.next().unwrap_or("");
            if !key.is_empty() {
                attributes.insert(key.to_string(), value.to_string());
            }
        }
        Ok(Self {
            x: head.number(0, "x")?,
            y: head.number(1, "y")?,
            attributes,
            rotation: head.angle(3),
            id: head.string(5),
            locked: head.flag(9),
            shapes: parts.map(str::to_string).collect(),
        })
    }

    pub fn package(&self) -> Option<&str> {
        self.attributes.get("package").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Track(Track),
    Via(Via),
    Text(Text),
    Arc(Arc),
    Pad(Pad),
    Circle(Circle),
    Rect(Rect),
    SolidRegion(SolidRegion),
    CopperArea(CopperArea),
    Hole(Hole),
    Lib(Lib),
    /// Rendered artwork; carries nothing to convert.
    SvgNode,
}

impl Shape {
    pub fn parse(record: &str) -> Result<Shape, RecordError> {
        let (kind, body) = record.split_once('~').unwrap_or((record, ""));
        let shape = match kind {
            "TRACK" => Shape::Track(Track::parse(&Fields::new("TRACK", body))?),
            "VIA" => Shape::Via(Via::parse(&Fields::new("VIA", body))?),
            "TEXT" => Shape::Text(Text::parse(&Fields::new("TEXT", body))?),
            "ARC" => Shape::Arc(Arc::parse(&Fields::new("ARC", body))?),
            "PAD" => Shape::Pad(Pad::parse(&Fields::new("PAD", body))?),
            "CIRCLE" => Shape::Circle(Circle::parse(&Fields::new("CIRCLE", body))?),
            "RECT" => Shape::Rect(Rect::parse(&Fields::new("RECT", body))?),
            "SOLIDREGION" => {
                Shape::SolidRegion(SolidRegion::parse(&Fields::new("SOLIDREGION", body))?)
            }
            "COPPERAREA" => Shape::CopperArea(CopperArea::parse(&Fields::new("COPPERAREA", body))?),
            "HOLE" => Shape::Hole(Hole::parse(&Fields::new("HOLE", body))?),
            "LIB" => Shape::Lib(Lib::parse(body)?),
            "SVGNODE" => Shape::SvgNode,
            other => return Err(RecordError::Unsupported(other.to_string())),
        };
        Ok(shape)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Track(_) => "TRACK",
            Shape::Via(_) => "VIA",
            Shape::Text(_) => "TEXT",
            Shape::Arc(_) => "ARC",
            Shape::Pad(_) => "PAD",
            Shape::Circle(_) => "CIRCLE",
            Shape::Rect(_) => "RECT",
            Shape::SolidRegion(_) => "SOLIDREGION",
            Shape::CopperArea(_) => "COPPERAREA",
            Shape::Hole(_) => "HOLE",
            Shape::Lib(_) => "LIB",
            Shape::SvgNode => "SVGNODE",
        }
    }
}
