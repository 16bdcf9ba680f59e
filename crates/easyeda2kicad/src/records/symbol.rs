//! Symbol drawing records: pins, graphics and texts of a library symbol.
//!
//! A pin packs its parts into `^^`-separated segments, each of them a
//! `~`-separated field list of its own.

use super::{pairs, Fields, RecordError};
use crate::transform::Point;
use crate::units::parse_angle;

/// Fill of a closed symbol graphic, derived from its stroke and fill colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    None,
    Outline,
    Background,
}

impl Fill {
    pub fn from_colors(stroke: &str, fill: &str) -> Self {
        if fill.is_empty() || fill.eq_ignore_ascii_case("none") {
            Fill::None
        } else if stroke == fill {
            Fill::Outline
        } else {
            Fill::Background
        }
    }

    pub fn kicad_name(self) -> &'static str {
        match self {
            Fill::None => "none",
            Fill::Outline => "outline",
            Fill::Background => "background",
        }
    }
}

/// Name or number label of a pin.
#[derive(Debug, Clone, PartialEq)]
pub struct PinLabel {
    pub visible: bool,
    pub text: String,
}

impl PinLabel {
    fn parse(f: &Fields) -> Self {
        Self {
            visible: f.flag(0),
            text: f.string(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Electrical type code, `0` to `4`.
    pub electric: String,
    pub position: Point,
    pub id: String,
    /// Connection point.
    pub dot: Point,
    /// `M x y h length` or `M x y v length`.
    pub path: String,
    pub name: PinLabel,
    pub number: PinLabel,
    pub inverted: bool,
    pub clock: bool,
}

impl Pin {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let segments: Vec<&str> = body.split("^^").collect();
        let segment = |index: usize| Fields::new("P", segments.get(index).copied().unwrap_or(""));
        let head = segment(0);
        let dot = segment(1);
        Ok(Self {
            electric: head.string(1),
            position: Point::new(head.number(3, "x")?, head.number(4, "y")?),
            id: head.string(6),
            dot: Point::new(dot.number(0, "dotX")?, dot.number(1, "dotY")?),
            path: segment(2).string(0),
            name: PinLabel::parse(&segment(3)),
            number: PinLabel::parse(&segment(4)),
            inverted: segment(5).flag(0),
            clock: segment(6).flag(0),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolText {
    /// `L` for plain text, `P` for the reference and `N` for the value.
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub rotation: Option<f64>,
    pub font_size: String,
    pub bold: bool,
    pub italic: bool,
    pub text: String,
    pub visible: bool,
    /// `start`, `middle` or `end`.
    pub anchor: String,
    pub id: String,
}

impl SymbolText {
    pub(super) fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            kind: f.string(0),
            x: f.number(1, "x")?,
            y: f.number(2, "y")?,
            rotation: parse_angle(f.text(3), 0.0),
            font_size: f.string(6),
            bold: f.text(7) == "bold",
            italic: f.text(8) == "italic",
            text: f.string(11),
            visible: f.flag(12),
            anchor: f.string(13),
            id: f.string(14),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Fill,
    pub id: String,
}

impl SymbolRect {
    fn parse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            x: f.number(0, "x")?,
            y: f.number(1, "y")?,
            width: f.number(4, "width")?,
            height: f.number(5, "height")?,
            fill: Fill::from_colors(f.text(6), f.text(9)),
            id: f.string(10),
        })
    }
}

/// `C` circles, and `E` ellipses which only convert when both radii agree.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEllipse {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    pub fill: Fill,
    pub id: String,
}

impl SymbolEllipse {
    fn parse_circle(f: &Fields) -> Result<Self, RecordError> {
        let radius = f.number(2, "radius")?;
        Ok(Self {
            cx: f.number(0, "cx")?,
            cy: f.number(1, "cy")?,
            rx: radius,
            ry: radius,
            fill: Fill::from_colors(f.text(3), f.text(6)),
            id: f.string(7),
        })
    }

    fn parse_ellipse(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            cx: f.number(0, "cx")?,
            cy: f.number(1, "cy")?,
            rx: f.number(2, "rx")?,
            ry: f.number(3, "ry")?,
            fill: Fill::from_colors(f.text(4), f.text(7)),
            id: f.string(8),
        })
    }

    pub fn is_circle(&self) -> bool {
        self.rx == self.ry
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolArc {
    pub path: String,
    pub fill: Fill,
    pub id: String,
}

impl SymbolArc {
    fn parse(f: &Fields) -> Self {
        Self {
            path: f.string(0),
            fill: Fill::from_colors(f.text(2), f.text(5)),
            id: f.string(6),
        }
    }
}

/// `L` lines (drawn closed), `PL` polylines and `PG` polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPolyline {
    pub points: Vec<Point>,
    pub closed: bool,
    pub fill: Fill,
    pub id: String,
}

impl SymbolPolyline {
    fn parse_line(f: &Fields) -> Result<Self, RecordError> {
        Ok(Self {
            points: vec![
                Point::new(f.number(0, "startX")?, f.number(1, "startY")?),
                Point::new(f.number(2, "endX")?, f.number(3, "endY")?),
            ],
            closed: true,
            fill: Fill::from_colors(f.text(4), f.text(7)),
            id: f.string(8),
        })
    }

    fn parse_points(f: &Fields, closed: bool) -> Result<Self, RecordError> {
        Ok(Self {
            points: pairs(&f.numbers(0, "points")?),
            closed,
            fill: Fill::from_colors(f.text(1), f.text(4)),
            id: f.string(5),
        })
    }
}

/// `PT`: an SVG path. Only straight segments have a symbol form.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolPath {
    pub path: String,
    pub fill: Fill,
    pub id: String,
}

impl SymbolPath {
    fn parse(f: &Fields) -> Self {
        Self {
            path: f.string(0),
            fill: Fill::from_colors(f.text(1), f.text(4)),
            id: f.string(5),
        }
    }

    /// Whether the path holds curve commands.
    pub fn has_curves(&self) -> bool {
        self.path
            .chars()
            .any(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'H' | 'Q' | 'S' | 'V'))
    }

    pub fn is_closed(&self) -> bool {
        self.path.contains(['Z', 'z'])
    }

    /// Vertices of the path; anything that is not a number is skipped.
    pub fn points(&self) -> Vec<Point> {
        let values: Vec<f64> = self
            .path
            .split(|c: char| matches!(c, ' ' | ',' | 'L' | 'M' | 'Z'))
            .filter_map(super::parse_number)
            .collect();
        pairs(&values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolShape {
    Pin(Pin),
    Text(SymbolText),
    Rect(SymbolRect),
    Ellipse(SymbolEllipse),
    Arc(SymbolArc),
    Polyline(SymbolPolyline),
    Path(SymbolPath),
}

impl SymbolShape {
    pub fn parse(record: &str) -> Result<SymbolShape, RecordError> {
        let (kind, body) = record.split_once('~').unwrap_or((record, ""));
        let shape = match kind {
            "P" => SymbolShape::Pin(Pin::parse(body)?),
            "T" => SymbolShape::Text(SymbolText::parse(&Fields::new("T", body))?),
            "R" => SymbolShape::Rect(SymbolRect::parse(&Fields::new("R", body))?),
            "C" => SymbolShape::Ellipse(SymbolEllipse::parse_circle(&Fields::new("C", body))?),
            "E" => SymbolShape::Ellipse(SymbolEllipse::parse_ellipse(&Fields::new("E", body))?),
            "A" => SymbolShape::Arc(SymbolArc::parse(&Fields::new("A", body))),
            "L" => SymbolShape::Polyline(SymbolPolyline::parse_line(&Fields::new("L", body))?),
            "PL" => SymbolShape::Polyline(SymbolPolyline::parse_points(
                &Fields::new("PL", body),
                false,
            )?),
            "PG" => SymbolShape::Polyline(SymbolPolyline::parse_points(
                &Fields::new("PG", body),
                true,
            )?),
            "PT" => SymbolShape::Path(SymbolPath::parse(&Fields::new("PT", body))),
            other => return Err(RecordError::Unsupported(other.to_string())),
        };
        Ok(shape)
    }
}

/// Drawing kinds EasyEDA has and KiCad symbols lack.
pub fn unsupported_kind_name(kind: &str) -> Option<&'static str> {
    match kind {
        "AR" => Some("arrow"),
        "I" => Some("image"),
        "PI" => Some("pie"),
        _ => None,
    }
}
