//! Library symbols: stand-alone `.kicad_sym` files and the symbols drawn
//! by `LIB` shapes on a schematic sheet.
//!
//! Symbol coordinates are relative to the symbol origin with the y axis
//! pointing up, so every source point is mirrored on its way in.

use log::{debug, warn};

use super::footprint::sanitize_name;
use crate::arc::EndpointArc;
use crate::context::ConversionContext;
use crate::list;
use crate::options::ConvertOptions;
use crate::records::symbol::{
    unsupported_kind_name, Fill, Pin, SymbolArc, SymbolEllipse, SymbolPath, SymbolPolyline,
    SymbolRect, SymbolShape, SymbolText,
};
use crate::records::RecordError;
use crate::sexpr::{encode, Hint, Node, BR1, BR2, BR3};
use crate::transform::Point;
use crate::types::{DocumentHead, Scalar, SymbolDocument};
use crate::units::mm;

/// Line break four levels in, between the parts of a pin.
const BR4: Node = Node::Hint(Hint::Break(4));

/// Where the shapes of one symbol are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct SymbolFrame<'a> {
    pub origin: Point,
    /// Id of the placed `LIB` shape; `None` for a library file.
    pub owner: Option<&'a str>,
}

impl<'a> SymbolFrame<'a> {
    pub fn new(origin: Point, owner: Option<&'a str>) -> Self {
        Self { origin, owner }
    }

    /// Canvas point to symbol units, y up.
    pub fn local(&self, p: Point) -> Point {
        Point::new(p.x - self.origin.x, self.origin.y - p.y)
    }

    fn xy(&self, p: Point) -> (f64, f64) {
        let p = self.local(p);
        (mm(p.x), mm(p.y))
    }

    fn of_owner(&self) -> String {
        self.owner.map(|id| format!(" of {id}")).unwrap_or_default()
    }
}

/// Shown and hidden label counts; KiCad only hides pin labels per symbol.
#[derive(Debug, Default, Clone, Copy)]
struct Visibility {
    shown: usize,
    hidden: usize,
}

impl Visibility {
    fn count(&mut self, visible: bool) {
        if visible {
            self.shown += 1;
        } else {
            self.hidden += 1;
        }
    }

    fn hide(self) -> bool {
        self.shown < self.hidden
    }
}

/// Converted symbol graphics, grouped by the unit they end up in.
#[derive(Debug, Default)]
pub struct SymbolBody {
    texts: Vec<Node>,
    arcs: Vec<Node>,
    circles: Vec<Node>,
    rects: Vec<Node>,
    polys: Vec<Node>,
    pins: Vec<Node>,
    /// Reference (`P`) and value (`N`) texts; they become properties.
    pub annotations: Vec<SymbolText>,
    pin_names: Visibility,
    pin_numbers: Visibility,
}

fn font_effects() -> Node {
    list!["effects", list!["font", list!["size", 1.27, 1.27]]]
}

pub(super) fn justify(anchor: &str) -> Option<Node> {
    match anchor {
        "start" => Some(list!["justify", "left"]),
        "end" => Some(list!["justify", "right"]),
        _ => None,
    }
}

fn text_effects(text: &SymbolText) -> Node {
    list![
        "effects",
        list!["font", list!["size", 1.27, 1.27]],
        text.italic.then(|| Node::from("italic")),
        text.bold.then(|| Node::from("bold")),
        justify(&text.anchor),
        (!text.visible).then(|| Node::from("hide")),
    ]
}

fn stroke_and_fill(fill: Fill) -> [Node; 2] {
    [
        list!["stroke", list!["width", 0]],
        list!["fill", list!["type", fill.kicad_name()]],
    ]
}

fn pin_electric(code: &str) -> &'static str {
    match code {
        // passive rather than unspecified keeps ERC quiet on plain parts
        "0" => "passive",
        "1" => "input",
        "2" => "output",
        "3" => "bidirectional",
        "4" => "power_in",
        _ => "unspecified",
    }
}

fn pin_style(inverted: bool, clock: bool) -> &'static str {
    match (inverted, clock) {
        (false, false) => "line",
        (false, true) => "clock",
        (true, false) => "inverted",
        (true, true) => "inverted_clock",
    }
}

/// `M x y h length` or `M x y v length`; commas count as spaces.
fn parse_pin_path(path: &str) -> Option<(Point, char, f64)> {
    let normalized = path.replace(',', " ");
    let rest = normalized.trim().strip_prefix('M')?;
    let split = rest.find(['h', 'v'])?;
    let orientation = rest[split..].chars().next()?;
    let start = rest[..split]
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let &[x, y] = start.as_slice() else {
        return None;
    };
    let length = rest[split + 1..].trim().parse::<f64>().ok()?;
    Some((Point::new(x, y), orientation, length))
}

fn polyline_node(points: &[Point], closed: bool, fill: Fill, frame: &SymbolFrame) -> Node {
    let mut pts = vec![Node::from("pts")];
    let closing = closed.then(|| points.first()).flatten();
    for p in points.iter().chain(closing) {
        let (x, y) = frame.xy(*p);
        pts.push(list!["xy", x, y]);
    }
    let [stroke, fill] = stroke_and_fill(fill);
    list!["polyline", Node::List(pts), stroke, fill]
}

impl SymbolBody {
    pub fn add(&mut self, ctx: &mut ConversionContext, record: &str, frame: &SymbolFrame) {
        let shape = match SymbolShape::parse(record) {
            Ok(shape) => shape,
            Err(RecordError::Unsupported(kind)) => {
                let msg = match (unsupported_kind_name(&kind), frame.owner) {
                    (Some(name), Some(id)) => {
                        format!("Warning: {name} ({kind}) shape found in library {id}; not supported by Kicad")
                    }
                    (Some(name), None) => {
                        format!("Warning: {name} ({kind}) shape found in library; not supported by Kicad")
                    }
                    (None, Some(id)) => format!("Warning: unknown shape {kind} found with id {id}; ignored"),
                    (None, None) => format!("Warning: unknown shape {kind} found; ignored"),
                };
                ctx.report(msg, 1);
                return;
            }
            Err(e) => {
                ctx.report(format!("Error: {e}{}; shape ignored", frame.of_owner()), 1);
                return;
            }
        };
        match &shape {
            SymbolShape::Pin(pin) => {
                if let Some(node) = self.pin(ctx, pin, frame) {
                    self.pins.extend([BR3, node]);
                }
            }
            SymbolShape::Text(text) => match text.kind.as_str() {
                "L" => self.texts.extend([BR3, Self::text(text, frame)]),
                "P" | "N" => self.annotations.push(text.clone()),
                other => debug!("symbol text of kind {other:?} skipped"),
            },
            SymbolShape::Rect(rect) => self.rects.extend([BR3, Self::rect(rect, frame)]),
            SymbolShape::Ellipse(ellipse) => {
                if let Some(node) = Self::circle(ctx, ellipse, frame) {
                    self.circles.extend([BR3, node]);
                }
            }
            SymbolShape::Arc(arc) => {
                if let Some(node) = Self::arc(ctx, arc, frame) {
                    self.arcs.extend([BR3, node]);
                }
            }
            SymbolShape::Polyline(poly) => self.polys.extend([BR3, Self::polyline(poly, frame)]),
            SymbolShape::Path(path) => {
                if let Some(node) = Self::path(ctx, path, frame) {
                    self.polys.extend([BR3, node]);
                }
            }
        }
    }

    fn pin(&mut self, ctx: &mut ConversionContext, pin: &Pin, frame: &SymbolFrame) -> Option<Node> {
        let owner = frame.of_owner();
        let Some((start, orientation, length)) = parse_pin_path(&pin.path) else {
            ctx.report(
                format!("Warning: pin ({}){owner}: could not determine pin location; pin ignored", pin.id),
                1,
            );
            return None;
        };
        // zero length pins are invisible in EasyEDA but not in KiCad
        if length == 0.0 {
            ctx.report(
                format!("Warning: pin ({}){owner} with length = 0 found in symbol; pin ignored", pin.id),
                1,
            );
            return None;
        }
        if pin.electric == "4" {
            ctx.report(
                format!(
                    "Warning: pinElectric = power; power_in is assumed for pin {} ({}){owner}\n\
                     Adjust symbol electric properties when needed based on ERC check.",
                    pin.name.text, pin.id
                ),
                2,
            );
        }
        // the inversion bubble is drawn outside the EasyEDA pin length
        let length = match (pin.inverted, length > 0.0) {
            (true, true) => length + 6.0,
            (true, false) => length - 6.0,
            (false, _) => length,
        };
        let towards_start = length < 0.0;
        let rotation = if orientation == 'h' {
            if (start.x == pin.position.x) == towards_start {
                180
            } else {
                0
            }
        } else if (start.y == pin.position.y) == towards_start {
            90
        } else {
            270
        };
        self.pin_names.count(pin.name.visible);
        self.pin_numbers.count(pin.number.visible);

        let (x, y) = frame.xy(pin.dot);
        let name = if pin.name.text.is_empty() {
            "~"
        } else {
            pin.name.text.as_str()
        };
        Some(list![
            "pin",
            pin_electric(&pin.electric),
            pin_style(pin.inverted, pin.clock),
            list!["at", x, y, rotation],
            list!["length", mm(length).abs()],
            BR4,
            list!["name", name, font_effects()],
            BR4,
            list!["number", &pin.number.text, font_effects()],
        ])
    }

    fn text(text: &SymbolText, frame: &SymbolFrame) -> Node {
        let (x, y) = frame.xy(Point::new(text.x, text.y));
        // KiCad symbol texts store a vertical angle in tenths of a degree
        let angle = if text.rotation == Some(90.0) { 900 } else { 0 };
        list!["text", &text.text, list!["at", x, y, angle], text_effects(text)]
    }

    fn rect(rect: &SymbolRect, frame: &SymbolFrame) -> Node {
        let start = frame.local(Point::new(rect.x, rect.y));
        let end = Point::new(start.x + rect.width, start.y - rect.height);
        let [stroke, fill] = stroke_and_fill(rect.fill);
        list![
            "rectangle",
            list!["start", mm(start.x), mm(start.y)],
            list!["end", mm(end.x), mm(end.y)],
            stroke,
            fill,
        ]
    }

    fn circle(ctx: &mut ConversionContext, ellipse: &SymbolEllipse, frame: &SymbolFrame) -> Option<Node> {
        if !ellipse.is_circle() {
            ctx.report(
                format!(
                    "Warning: shape E (ellips) with unequal radiuses ({}){} in symbol; not supported by Kicad",
                    ellipse.id,
                    frame.of_owner()
                ),
                1,
            );
            return None;
        }
        let (x, y) = frame.xy(Point::new(ellipse.cx, ellipse.cy));
        let [stroke, fill] = stroke_and_fill(ellipse.fill);
        Some(list![
            "circle",
            list!["center", x, y],
            list!["radius", mm(ellipse.rx)],
            stroke,
            fill,
        ])
    }

    fn arc(ctx: &mut ConversionContext, arc: &SymbolArc, frame: &SymbolFrame) -> Option<Node> {
        let resolved = EndpointArc::parse(&arc.path)
            .map(|endpoints| endpoints.mirrored(|p| frame.local(p)))
            .and_then(|local| local.resolve().map(|center| (local, center)));
        let (local, center) = match resolved {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!("symbol arc {}: {e}", arc.id);
                ctx.report(
                    format!(
                        "Warning: arc ({}){}: could not determine arc shape; arc ignored",
                        arc.id,
                        frame.of_owner()
                    ),
                    1,
                );
                return None;
            }
        };
        let [stroke, fill] = stroke_and_fill(arc.fill);
        Some(list![
            "arc",
            list!["start", mm(local.start.x), mm(local.start.y)],
            list!["end", mm(local.end.x), mm(local.end.y)],
            list![
                "radius",
                list!["at", mm(center.center.x), mm(center.center.y)],
                list!["length", mm(center.rx)],
            ],
            stroke,
            fill,
        ])
    }

    fn polyline(poly: &SymbolPolyline, frame: &SymbolFrame) -> Node {
        polyline_node(&poly.points, poly.closed, poly.fill, frame)
    }

    fn path(ctx: &mut ConversionContext, path: &SymbolPath, frame: &SymbolFrame) -> Option<Node> {
        if path.has_curves() {
            ctx.report(
                format!(
                    "Warning: PT (path) with arcs/circles ({}){} in symbol; not supported by Kicad",
                    path.id,
                    frame.of_owner()
                ),
                1,
            );
            return None;
        }
        Some(polyline_node(&path.points(), path.is_closed(), path.fill, frame))
    }

    /// Encoded graphics; equal for symbols that draw the same.
    pub fn fingerprint(&self) -> String {
        let shapes = [
            &self.texts,
            &self.arcs,
            &self.circles,
            &self.rects,
            &self.polys,
            &self.pins,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect::<Vec<_>>();
        encode(&Node::List(shapes))
    }
}

/// `(property key value (id n) (at 0 0 0) ...)` inside a library symbol.
pub fn symbol_property(key: &str, value: &str, id: u32, hide: bool) -> Node {
    list![
        "property",
        key,
        value,
        list!["id", id],
        list!["at", 0, 0, 0],
        list![
            "effects",
            list!["font", list!["size", 1.27, 1.27]],
            hide.then(|| Node::from("hide")),
        ],
    ]
}

/// Symbol properties taken from `head.c_para`; absent parameters are left out.
fn head_properties(head: &DocumentHead) -> Vec<Node> {
    let mut props = Vec::new();
    let table = [
        ("Reference", "pre", 0, false),
        ("Value", "name", 1, false),
        ("Footprint", "package", 2, true),
        ("ki_keywords", "name", 4, true),
        ("ki_description", "BOM_Manufacturer", 5, true),
    ];
    for (key, param, id, hide) in table {
        let Some(value) = head.param(param) else {
            continue;
        };
        let value = match key {
            "Reference" => value.split('?').next().unwrap_or_default().to_string(),
            "ki_keywords" => value.split('(').next().unwrap_or_default().to_string(),
            "ki_description" => format!("part manufactured by: {value}"),
            _ => value,
        };
        props.extend([BR2, symbol_property(key, &value, id, hide)]);
    }
    props
}

/// Assemble a `(symbol "EasyEDA:<name>" ...)` with its three units: texts
/// and remarks, graphics, and pins.
pub fn library_symbol(name: &str, body: SymbolBody, properties: Vec<Node>, remarks: Vec<Node>) -> Node {
    let mut items = vec![
        Node::from("symbol"),
        Node::from(format!("EasyEDA:{name}")),
        body.pin_numbers
            .hide()
            .then(|| list!["pin_numbers", "hide"])
            .into(),
        list![
            "pin_names",
            list!["offset", 2],
            body.pin_names.hide().then(|| Node::from("hide")),
        ],
        list!["in_bom", "yes"],
        list!["on_board", "yes"],
    ];
    items.extend(properties);

    let unit = |suffix: &str, parts: Vec<Vec<Node>>| {
        let mut unit = vec![Node::from("symbol"), Node::from(format!("{name}_{suffix}"))];
        unit.extend(parts.into_iter().flatten());
        Node::List(unit)
    };
    items.extend([
        BR2,
        unit("0_0", vec![body.texts, remarks]),
        BR2,
        unit("0_1", vec![body.arcs, body.circles, body.rects, body.polys]),
        BR2,
        unit("1_1", vec![body.pins]),
    ]);
    Node::List(items)
}

/// A converted symbol library file.
#[derive(Debug, Clone)]
pub struct ConvertedSymbol {
    pub name: String,
    pub tree: Node,
    pub messages: usize,
}

impl ConvertedSymbol {
    pub fn file_name(&self) -> String {
        format!("{}.kicad_sym", self.name)
    }
}

/// Convert a symbol document into a `.kicad_sym` tree holding one symbol.
/// Remarks are placed as texts in the symbol's first unit.
pub fn convert_symbol_library(doc: &SymbolDocument, options: ConvertOptions) -> ConvertedSymbol {
    let mut ctx = ConversionContext::for_symbol(options);
    let head = &doc.head;
    let number = |value: &Option<Scalar>| value.as_ref().and_then(Scalar::as_f64).unwrap_or(0.0);
    let origin = Point::new(number(&head.x), number(&head.y));
    let frame = SymbolFrame::new(origin, None);
    let name = head
        .param("name")
        .map(|name| sanitize_name(&name))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let mut body = SymbolBody::default();
    for record in &doc.shape {
        body.add(&mut ctx, record, &frame);
    }
    if !body.annotations.is_empty() {
        debug!("{} reference/value texts left to the properties", body.annotations.len());
    }
    let symbol = library_symbol(&name, body, head_properties(head), ctx.diagnostics.nodes());
    let tree = list![
        "kicad_symbol_lib",
        list!["version", 20210126],
        list!["generator", "kicad_symbol_editor"],
        BR1,
        symbol,
    ];

    let messages = ctx.diagnostics.count();
    if messages > 0 {
        warn!(
            "In total {messages} messages were created during the conversion. \
             Check the texts of symbol unit {name}_0_0 for more details."
        );
    }
    ConvertedSymbol {
        name,
        tree,
        messages,
    }
}
