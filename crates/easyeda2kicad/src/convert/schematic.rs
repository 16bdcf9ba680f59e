//! Schematic sheet assembly: wiring, labels, power flags and placed symbols.
//!
//! Sheet coordinates keep the source orientation; only placed symbols are
//! mirrored into their own y-up frame.

use std::collections::{HashMap, HashSet};

use log::{debug, info, warn};
use uuid::Uuid;

use super::symbol::{justify, library_symbol, symbol_property, SymbolBody, SymbolFrame};
use crate::context::ConversionContext;
use crate::error::ConvertError;
use crate::list;
use crate::options::ConvertOptions;
use crate::records::schematic::{
    unsupported_kind_name, BusEntry, Junction, NetFlag, NetLabel, NoConnect, SchematicShape, Stroked,
};
use crate::records::symbol::SymbolText;
use crate::records::{Lib, RecordError};
use crate::sexpr::{Hint, Node, BR, BR1, BR2, BR3};
use crate::transform::Point;
use crate::types::{SchematicDocument, SchematicSheet};
use crate::units::{mm, parse_angle};

const BR4: Node = Node::Hint(Hint::Break(4));

/// `LIB` id of the drawing frame around a sheet.
const SHEET_FRAME_ID: &str = "frame_lib_1";

/// Pick sheet `sheet` (counted from 1) out of a schematic document.
pub fn select_sheet(doc: SchematicDocument, sheet: usize) -> Result<SchematicSheet, ConvertError> {
    let mut sheets = doc.into_sheets();
    let available = sheets.len();
    if sheet == 0 || sheet > available {
        return Err(ConvertError::SheetOutOfRange {
            requested: sheet,
            available,
        });
    }
    if available > 1 {
        warn!("Multi-sheet schematics: sheet {sheet} is used as input of the {available} available sheets.");
    }
    Ok(sheets.swap_remove(sheet - 1))
}

/// Angle on the sheet in [0, 360); a missing angle reads as 0.
fn sheet_angle(rotation: Option<f64>, offset: f64) -> f64 {
    rotation.map_or(0.0, |angle| (angle + offset).rem_euclid(360.0))
}

/// Labels and texts point the other way round than in EasyEDA.
fn label_angle(raw: &str) -> f64 {
    sheet_angle(parse_angle(raw, 0.0), 180.0)
}

fn at(p: Point) -> Node {
    list!["at", mm(p.x), mm(p.y)]
}

fn at_angle(p: Point, angle: f64) -> Node {
    list!["at", mm(p.x), mm(p.y), angle]
}

/// Text effects on a sheet. Fonts up to 7pt stay at the 1.27 mm library
/// size; larger ones scale with the point size.
fn sheet_effects(font_size: &str, visible: bool, anchor: &str, bold: bool, italic: bool) -> Node {
    let points = font_size.replace("pt", "").trim().parse::<f64>().ok();
    let (size, thickness) = match points {
        Some(points) if points > 7.0 => (points * 0.2, Some(points * 0.05)),
        _ => (1.27, None),
    };
    list![
        "effects",
        list![
            "font",
            list!["size", size, size],
            thickness.map(|t| list!["thickness", t]),
            italic.then(|| Node::from("italic")),
            bold.then(|| Node::from("bold")),
        ],
        justify(anchor),
        (!visible).then(|| Node::from("hide")),
    ]
}

fn plain_effects() -> Node {
    sheet_effects("", true, "", false, false)
}

fn hidden_effects() -> Node {
    sheet_effects("", false, "", false, false)
}

/// `(color r g b a)`; anything but `#rrggbb` becomes the transparent default.
fn color(hex: &str) -> Node {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let channel = |i: usize| digits.get(i..i + 2).and_then(|c| u8::from_str_radix(c, 16).ok());
    match (digits.len(), channel(0), channel(2), channel(4)) {
        (6, Some(r), Some(g), Some(b)) => list!["color", u32::from(r), u32::from(g), u32::from(b), 1],
        _ => list!["color", 0, 0, 0, 0],
    }
}

fn line_style(style: &str) -> &'static str {
    match style {
        "1" => "dash",
        "2" => "dot",
        _ => "solid",
    }
}

/// Widths up to one unit map to KiCad's default line width.
fn line_width(width: f64) -> f64 {
    let width = width.trunc();
    if width > 1.0 {
        width * 0.152
    } else {
        0.0
    }
}

fn stroke(line: &Stroked) -> Node {
    list![
        "stroke",
        list!["width", line_width(line.width)],
        list!["type", line_style(&line.style)],
        color(&line.color),
    ]
}

fn pts<'a>(points: impl IntoIterator<Item = &'a Point>) -> Node {
    let mut items = vec![Node::from("pts")];
    items.extend(points.into_iter().map(|p| list!["xy", mm(p.x), mm(p.y)]));
    Node::List(items)
}

/// Polyline through `coords`, taken pairwise as x and y in millimetres.
fn power_polyline(coords: &[f64], fill: Option<Node>) -> Node {
    let mut pts = vec![Node::from("pts")];
    pts.extend(coords.chunks_exact(2).map(|xy| list!["xy", xy[0], xy[1]]));
    list!["polyline", Node::List(pts), fill]
}

fn power_polylines(lines: &[&[f64]]) -> Vec<Node> {
    lines
        .iter()
        .flat_map(|coords| [BR3, power_polyline(coords, None)])
        .collect()
}

/// Power symbol drawn for a ground or supply net flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PowerKind {
    Ground,
    SignalGround,
    ChassisGround,
    Positive,
    Negative,
}

impl PowerKind {
    fn of(flag: &NetFlag) -> Option<PowerKind> {
        match flag.part.as_str() {
            "part_netLabel_gnD" => Some(PowerKind::Ground),
            "part_netLabel_GNd" => Some(PowerKind::SignalGround),
            "part_netLabel_gNd" => Some(PowerKind::ChassisGround),
            "part_netLabel_VCC" | "part_netLabel_+5V" if flag.net.starts_with('-') => {
                Some(PowerKind::Negative)
            }
            "part_netLabel_VCC" | "part_netLabel_+5V" => Some(PowerKind::Positive),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PowerKind::Ground => "$GND",
            PowerKind::SignalGround => "$GND1",
            PowerKind::ChassisGround => "$GND2",
            PowerKind::Positive => "$Vplus",
            PowerKind::Negative => "$Vminus",
        }
    }

    fn shows_value(self, flag: &NetFlag) -> bool {
        match self {
            PowerKind::Ground | PowerKind::SignalGround | PowerKind::ChassisGround => false,
            PowerKind::Positive => true,
            PowerKind::Negative => flag.visible == "1",
        }
    }

    /// Graphics in millimetres, pin at the origin.
    fn shapes(self) -> Vec<Node> {
        match self {
            PowerKind::Ground => power_polylines(&[&[
                0.0, 0.0, 0.0, -1.27, 1.27, -1.27, 0.0, -2.54, -1.27, -1.27, 0.0, -1.27,
            ]]),
            PowerKind::SignalGround => power_polylines(&[
                &[-0.635, -1.905, 0.635, -1.905],
                &[-0.127, -2.54, 0.127, -2.54],
                &[0.0, -1.27, 0.0, 0.0],
                &[1.27, -1.27, -1.27, -1.27],
            ]),
            PowerKind::ChassisGround => vec![
                BR3,
                list![
                    "rectangle",
                    list!["start", -1.27, -1.524],
                    list!["end", 1.27, -2.032],
                    list!["stroke", list!["width", 0.254]],
                    list!["fill", list!["type", "outline"]],
                ],
                BR3,
                power_polyline(&[0.0, 0.0, 0.0, -1.524], None),
            ],
            PowerKind::Positive => power_polylines(&[
                &[-0.762, 1.27, 0.0, 2.54],
                &[0.0, 0.0, 0.0, 2.54],
                &[0.0, 2.54, 0.762, 1.27],
            ]),
            PowerKind::Negative => vec![
                BR3,
                power_polyline(
                    &[0.0, 0.0, 0.0, 1.27, -0.762, 1.27, 0.0, 2.54, 0.762, 1.27, 0.0, 1.27],
                    Some(list!["fill", list!["type", "outline"]]),
                ),
            ],
        }
    }

    fn library_symbol(self, net: &str) -> Node {
        let name = self.name();
        let lib_id = format!("Autogenerated:Powerflag_{name}");
        let mut shapes = vec![Node::from("symbol"), Node::from(format!("Powerflag_{name}_0_1"))];
        shapes.extend(self.shapes());
        list![
            "symbol",
            &lib_id,
            list!["power"],
            list!["pin_names", list!["offset", 0]],
            list!["in_bom", "no"],
            list!["on_board", "yes"],
            BR2,
            list!["property", "Reference", "#PWR", list!["id", 0], list!["at", 0, 0, 0], hidden_effects()],
            BR2,
            list!["property", "Value", &lib_id, list!["id", 1], list!["at", 0, 0, 0], plain_effects()],
            BR2,
            Node::List(shapes),
            BR2,
            list![
                "symbol",
                format!("Powerflag_{name}_1_1"),
                BR3,
                list![
                    "pin",
                    "power_in",
                    "line",
                    list!["at", 0, 0, 0],
                    list!["length", 0],
                    "hide",
                    BR4,
                    list!["name", net, plain_effects()],
                    BR4,
                    list!["number", "1", plain_effects()],
                ],
            ],
        ]
    }
}

fn instance(uuid: &str, reference: &str, value: &str, footprint: &str) -> Node {
    list![
        "path",
        format!("/{uuid}"),
        list!["reference", reference],
        list!["unit", 1],
        list!["value", value],
        list!["footprint", footprint],
    ]
}

/// Converted sheet items, grouped in output order.
#[derive(Debug, Default)]
struct Sheet {
    lib_symbols: Vec<Node>,
    power_symbols: Vec<Node>,
    instances: Vec<Node>,
    power_instances: Vec<Node>,
    components: Vec<Node>,
    netflags: Vec<Node>,
    labels: Vec<Node>,
    netports: Vec<Node>,
    wires: Vec<Node>,
    junctions: Vec<Node>,
    noconnects: Vec<Node>,
    polylines: Vec<Node>,
    buses: Vec<Node>,
    busentries: Vec<Node>,
    texts: Vec<Node>,
    /// Symbol fingerprint digest to library symbol name.
    symbol_names: HashMap<String, String>,
    power_kinds: HashSet<PowerKind>,
}

impl Sheet {
    fn add(&mut self, ctx: &mut ConversionContext, record: &str) {
        let shape = match SchematicShape::parse(record) {
            Ok(shape) => shape,
            Err(RecordError::Unsupported(kind)) => {
                let msg = match unsupported_kind_name(&kind) {
                    Some(name) => format!("Warning: {name} shape found in schematics, but not supported by Kicad"),
                    None => format!("Warning: unknown shape {kind} in schematics"),
                };
                ctx.report(msg, 1);
                return;
            }
            Err(e) => {
                ctx.report(format!("Error: {e}; shape ignored"), 1);
                return;
            }
        };
        match &shape {
            SchematicShape::Wire(wire) => self.wires.extend(Self::wire(wire)),
            SchematicShape::Bus(bus) => self.buses.extend(Self::bus(bus)),
            SchematicShape::Polyline(line) => self.polylines.extend([BR, Self::polyline(line)]),
            SchematicShape::BusEntry(entry) => self.busentries.extend([BR, Self::bus_entry(entry)]),
            SchematicShape::Junction(junction) => self.junctions.extend([BR, Self::junction(junction)]),
            SchematicShape::NetLabel(label) => self.labels.extend([BR, Self::net_label(label)]),
            SchematicShape::NoConnect(mark) => self.noconnects.extend([BR, Self::no_connect(mark)]),
            SchematicShape::Text(text) => {
                if text.kind == "L" {
                    self.texts.extend([BR, Self::text(text)]);
                } else {
                    debug!("sheet text of kind {:?} skipped", text.kind);
                }
            }
            SchematicShape::NetFlag(flag) => self.net_flag(ctx, flag),
            SchematicShape::Lib(lib) => self.placed_symbol(ctx, lib),
        }
    }

    /// One wire per segment of the source polyline.
    fn wire(wire: &Stroked) -> Vec<Node> {
        wire.points
            .windows(2)
            .flat_map(|segment| [BR, list!["wire", pts(segment), stroke(wire)]])
            .collect()
    }

    fn bus(bus: &Stroked) -> Vec<Node> {
        bus.points
            .windows(2)
            .flat_map(|segment| [BR, list!["bus", pts(segment)]])
            .collect()
    }

    fn polyline(line: &Stroked) -> Node {
        list!["polyline", pts(&line.points), stroke(line)]
    }

    fn bus_entry(entry: &BusEntry) -> Node {
        let size = entry.end - entry.start;
        list!["bus_entry", at(entry.start), list!["size", mm(size.x), mm(size.y)]]
    }

    fn junction(junction: &Junction) -> Node {
        // EasyEDA's default dot maps onto KiCad's default diameter
        let diameter = if junction.radius == 2.5 {
            1.016
        } else {
            junction.radius * 0.4064
        };
        list![
            "junction",
            at(junction.position),
            list!["diameter", diameter],
            color(&junction.color),
        ]
    }

    fn net_label(label: &NetLabel) -> Node {
        list![
            "label",
            &label.name,
            at_angle(label.position, label_angle(&label.rotation)),
            sheet_effects("", true, &label.anchor, false, false),
        ]
    }

    fn no_connect(mark: &NoConnect) -> Node {
        list!["no_connect", at(mark.position)]
    }

    fn text(text: &SymbolText) -> Node {
        list![
            "text",
            &text.text,
            at_angle(Point::new(text.x, text.y), sheet_angle(text.rotation, 180.0)),
            sheet_effects(&text.font_size, text.visible, &text.anchor, text.bold, text.italic),
        ]
    }

    /// Ground and supply flags become power symbols; net ports become
    /// global labels.
    fn net_flag(&mut self, ctx: &mut ConversionContext, flag: &NetFlag) {
        if flag.part == "part_netLabel_netPort" {
            self.netports.extend([
                BR,
                list![
                    "global_label",
                    &flag.net,
                    list!["shape", "bidirectional"],
                    at_angle(flag.dot, label_angle(&flag.rotation)),
                    sheet_effects("", true, &flag.anchor, false, false),
                ],
            ]);
            return;
        }
        let Some(kind) = PowerKind::of(flag) else {
            ctx.report(
                format!("Warning: unsupported netflag partId: {} with id = {}", flag.part, flag.id),
                1,
            );
            return;
        };
        if self.power_kinds.insert(kind) {
            self.power_symbols.extend([BR1, kind.library_symbol(&flag.net)]);
        }
        let uuid = Uuid::new_v4().to_string();
        let lib_id = format!("Autogenerated:Powerflag_{}", kind.name());
        self.netflags.extend([
            BR,
            BR,
            list![
                "symbol",
                list!["lib_id", lib_id],
                at_angle(flag.dot, sheet_angle(parse_angle(&flag.rotation, 0.0), 0.0)),
                list!["unit", 1],
                list!["in_bom", "yes"],
                list!["on_board", "yes"],
                list!["uuid", &uuid],
                BR1,
                list!["property", "Reference", "#PWR?", list!["id", 0], list!["at", 0, 0, 0], hidden_effects()],
                BR1,
                list![
                    "property",
                    "Value",
                    &flag.net,
                    list!["id", 1],
                    at_angle(flag.label, sheet_angle(parse_angle(&flag.label_rotation, 0.0), 0.0)),
                    sheet_effects("", kind.shows_value(flag), "", false, false),
                ],
            ],
        ]);
        self.power_instances
            .extend([BR1, instance(&uuid, "#PWR?", &flag.net, "")]);
    }

    /// A `LIB` shape: a component instance of a library symbol that is
    /// shared by all components drawn alike.
    fn placed_symbol(&mut self, ctx: &mut ConversionContext, lib: &Lib) {
        if lib.id == SHEET_FRAME_ID {
            return;
        }
        let origin = Point::new(lib.x, lib.y);
        let frame = SymbolFrame::new(origin, Some(lib.id.as_str()));
        let mut body = SymbolBody::default();
        for record in &lib.shapes {
            body.add(ctx, record, &frame);
        }

        let mut reference = String::new();
        let mut prefix = String::new();
        let mut value = String::new();
        let mut lib_props = Vec::new();
        let mut component_props = vec![
            BR1,
            list![
                "property",
                "EDA_id",
                &lib.id,
                list!["id", 4],
                at_angle(origin, 0.0),
                hidden_effects(),
            ],
        ];
        for text in std::mem::take(&mut body.annotations) {
            let (key, id, lib_value) = if text.kind == "P" {
                if text.text.find('.').is_some_and(|i| i > 0) {
                    ctx.report(
                        format!(
                            "Warning: multipart shape {} found on schematics; not yet supported.\n\
                             Drawn parts cannot share one footprint. Current solution: \n\
                             Create new multi-unit symbol and paste existing symbols into the units\n\
                             Change symbols in schematics with the new units of the multi-part symbol.",
                            text.text
                        ),
                        4,
                    );
                }
                prefix = text
                    .text
                    .chars()
                    .filter(|c| !c.is_ascii_digit() && *c != '.')
                    .collect();
                reference = text.text.clone();
                ("Reference", 0, prefix.clone())
            } else {
                value = text.text.clone();
                ("Value", 1, String::new())
            };
            lib_props.extend([BR2, symbol_property(key, &lib_value, id, !text.visible)]);
            component_props.extend([
                BR1,
                list![
                    "property",
                    key,
                    &text.text,
                    list!["id", id],
                    at_angle(Point::new(text.x, text.y), 0.0),
                    sheet_effects(&text.font_size, text.visible, "start", false, false),
                ],
            ]);
        }

        let rotation = lib.rotation.unwrap_or(0.0);
        let digest = format!("{:x}", md5::compute(body.fingerprint()));
        let name = if let Some(name) = self.symbol_names.get(&digest).cloned() {
            info!("symbol for {reference} (rotation:{rotation}) exists as {name}");
            name
        } else {
            let name = format!("{prefix}_{}", digest[..8].to_uppercase());
            info!("symbol for {reference} (rotation:{rotation}) is new as {name}");
            self.symbol_names.insert(digest, name.clone());
            self.lib_symbols
                .extend([BR1, library_symbol(&name, body, lib_props, Vec::new())]);
            name
        };

        let uuid = Uuid::new_v4().to_string();
        let mut component = vec![
            Node::from("symbol"),
            list!["lib_id", format!("EasyEDA:{name}")],
            at_angle(origin, 0.0),
            list!["unit", 1],
            list!["in_bom", "yes"],
            list!["on_board", "yes"],
            list!["uuid", &uuid],
        ];
        component.extend(component_props);
        self.components.extend([BR, BR, Node::List(component)]);
        self.instances.extend([
            BR1,
            instance(&uuid, &reference, &value, lib.package().unwrap_or_default()),
        ]);
    }
}

/// A converted schematic sheet.
#[derive(Debug, Clone)]
pub struct ConvertedSchematic {
    pub tree: Node,
    pub messages: usize,
}

/// Convert one schematic sheet into a `.kicad_sch` tree. Remarks are
/// placed as sheet texts.
pub fn convert_schematic(sheet: &SchematicSheet, options: ConvertOptions) -> ConvertedSchematic {
    let mut ctx = ConversionContext::for_sheet(options);
    let mut items = Sheet::default();
    for record in &sheet.shape {
        items.add(&mut ctx, record);
    }

    let mut lib_symbols = vec![Node::from("lib_symbols")];
    lib_symbols.extend(items.lib_symbols);
    lib_symbols.extend(items.power_symbols);
    let mut symbol_instances = vec![Node::from("symbol_instances")];
    symbol_instances.extend(items.instances);
    symbol_instances.extend(items.power_instances);

    let mut tree = vec![
        Node::from("kicad_sch"),
        list!["version", 20210126],
        list!["generator", "eeschema"],
        list!["paper", "A1"],
        BR,
        Node::List(lib_symbols),
        BR,
    ];
    tree.extend(
        [
            items.components,
            items.netflags,
            items.labels,
            items.netports,
            items.wires,
            items.junctions,
            items.noconnects,
            items.polylines,
            items.buses,
            items.busentries,
            items.texts,
            ctx.diagnostics.nodes(),
        ]
        .into_iter()
        .flatten(),
    );
    tree.extend([
        BR,
        BR,
        list!["sheet_instances", list!["path", "/", list!["page", "1"]]],
        BR,
        BR,
        Node::List(symbol_instances),
    ]);

    let messages = ctx.diagnostics.count();
    if messages > 0 {
        warn!(
            "In total {messages} messages were created during the conversion. \
             Check the texts left of the sheet origin for more details."
        );
    }
    ConvertedSchematic {
        tree: Node::List(tree),
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::encode;

    fn convert_shapes(shapes: &[&str]) -> (String, usize) {
        let sheet = SchematicSheet {
            shape: shapes.iter().map(|s| s.to_string()).collect(),
            ..SchematicSheet::default()
        };
        let converted = convert_schematic(&sheet, ConvertOptions::default());
        (encode(&converted.tree), converted.messages)
    }

    #[test]
    fn test_wiring() {
        let (text, messages) = convert_shapes(&[
            "B~435 -295 770 -295~#008800~2~0~none~gge277~0",
            "BE~270~435~-295~445~-285~gge298~0",
            "W~335 -515 335 -545 470 -545~#00FF88~1~0~none~gge934~0",
            "J~315~-475~3~#CC0000~gge932~0",
            "O~270~-495~gge467~M 266 -499 L 274 -491 M 274 -499 L 266 -491~#33cc33~0",
        ]);
        assert_eq!(messages, 0);
        assert_eq!(
            text,
            "(kicad_sch (version 20210126) (generator eeschema) (paper \"A1\") (lib_symbols) \
             (wire (pts (xy 85.09 -130.81) (xy 85.09 -138.43)) (stroke (width 0) (type solid) (color 0 255 136 1))) \
             (wire (pts (xy 85.09 -138.43) (xy 119.38 -138.43)) (stroke (width 0) (type solid) (color 0 255 136 1))) \
             (junction (at 80.01 -120.65) (diameter 1.219) (color 204 0 0 1)) \
             (no_connect (at 68.58 -125.73)) \
             (bus (pts (xy 110.49 -74.93) (xy 195.58 -74.93))) \
             (bus_entry (at 110.49 -74.93) (size 2.54 2.54)) \
             (sheet_instances (path \"/\" (page \"1\"))) (symbol_instances))"
        );
    }

    #[test]
    fn test_labels_and_texts() {
        let (text, _) = convert_shapes(&[
            "N~250~-530~0~#0000ff~CLK~gge471~start~252~-532.5~Times New Roman~7pt~0",
            "PL~100 -100 200 -100~#000000~3~1~none~gge5~0",
            "T~L~100~-200~0~#0000FF~Arial~9pt~bold~~~comment~Note~1~start~gge9~0",
            "F~part_netLabel_netPort~300~-200~0~gge7~~0^^300~-200^^IN1~#000000~290~-200~0~end~1~Arial~7pt",
        ]);
        assert!(text.contains(
            "(label \"CLK\" (at 63.5 -134.62 180) (effects (font (size 1.27 1.27)) (justify left)))"
        ));
        assert!(text.contains(
            "(polyline (pts (xy 25.4 -25.4) (xy 50.8 -25.4)) (stroke (width 0.456) (type dash) (color 0 0 0 1)))"
        ));
        assert!(text.contains(
            "(text \"Note\" (at 25.4 -50.8 180) (effects (font (size 1.8 1.8) (thickness 0.45) bold) (justify left)))"
        ));
        assert!(text.contains(
            "(global_label \"IN1\" (shape bidirectional) (at 76.2 -50.8 180) \
             (effects (font (size 1.27 1.27)) (justify right)))"
        ));
    }

    const GND: &str = "F~part_netLabel_gnD~420~-230~180~gge99~~0^^420~-240^^GND~#000000~420~-216~0~middle~1~Times New Roman~9pt~flag_gge6^^PL~420 -240 420 -230~#000000~1~0~transparent~gge101~0";

    #[test]
    fn test_power_flags() {
        let (text, messages) = convert_shapes(&[GND, GND]);
        assert_eq!(messages, 0);
        assert_eq!(text.matches("(symbol \"Powerflag_$GND_0_1\"").count(), 1);
        assert_eq!(text.matches("(lib_id \"Autogenerated:Powerflag_$GND\")").count(), 2);
        assert!(text.contains(
            "(lib_symbols (symbol \"Autogenerated:Powerflag_$GND\" (power) (pin_names (offset 0)) (in_bom no) (on_board yes) \
             (property \"Reference\" \"#PWR\" (id 0) (at 0 0 0) (effects (font (size 1.27 1.27)) hide)) \
             (property \"Value\" \"Autogenerated:Powerflag_$GND\" (id 1) (at 0 0 0) (effects (font (size 1.27 1.27)))) \
             (symbol \"Powerflag_$GND_0_1\" (polyline (pts (xy 0 0) (xy 0 -1.27) (xy 1.27 -1.27) (xy 0 -2.54) (xy -1.27 -1.27) (xy 0 -1.27)))) \
             (symbol \"Powerflag_$GND_1_1\" (pin power_in line (at 0 0 0) (length 0) hide \
             (name \"GND\" (effects (font (size 1.27 1.27)))) (number \"1\" (effects (font (size 1.27 1.27))))))))"
        ));
        assert!(text.contains(
            "(at 106.68 -60.96 180) (unit 1) (in_bom yes) (on_board yes) (uuid "
        ));
        assert!(text.contains(
            "(property \"Value\" \"GND\" (id 1) (at 106.68 -54.864 0) (effects (font (size 1.27 1.27)) hide))"
        ));
        assert_eq!(text.matches("(reference \"#PWR?\") (unit 1) (value \"GND\") (footprint \"\")").count(), 2);
    }

    #[test]
    fn test_supply_flag_polarity() {
        let flag = |net: &str| {
            format!("F~part_netLabel_VCC~0~0~0~gge1~~0^^0~0^^{net}~#000000~0~10~0~start~0~Arial~7pt")
        };
        let (text, _) = convert_shapes(&[flag("+5V").as_str(), flag("-5V").as_str()]);
        assert!(text.contains("(symbol \"Autogenerated:Powerflag_$Vplus\""));
        assert!(text.contains("(symbol \"Autogenerated:Powerflag_$Vminus\""));
        assert!(text.contains(
            "(polyline (pts (xy 0 0) (xy 0 1.27) (xy -0.762 1.27) (xy 0 2.54) (xy 0.762 1.27) (xy 0 1.27)) (fill (type outline)))"
        ));
        // supply values show, negative ones follow the flag
        assert!(text.contains("(property \"Value\" \"+5V\" (id 1) (at 0 2.54 0) (effects (font (size 1.27 1.27))))"));
        assert!(text.contains("(property \"Value\" \"-5V\" (id 1) (at 0 2.54 0) (effects (font (size 1.27 1.27)) hide))"));
    }

    fn resistor(x: f64, reference: &str) -> String {
        format!(
            "LIB~{x}~-310~package`0603`~~0~gge{x}~0\
             #@$T~P~{tx}~-320~0~#000080~Arial~~~~~comment~{reference}~1~start~gge11~0~pinpart\
             #@$T~N~{tx}~-300~0~#000080~Arial~~~~~comment~10k~1~start~gge12~0\
             #@$R~{rx}~-315~~~20~10~#880000~1~0~none~gge13~0",
            tx = x - 5.0,
            rx = x - 10.0,
        )
    }

    #[test]
    fn test_placed_symbols_share_library_symbol() {
        let (text, messages) = convert_shapes(&[
            resistor(380.0, "R1").as_str(),
            resistor(480.0, "R2").as_str(),
            "LIB~0~0~~~0~frame_lib_1~0",
        ]);
        assert_eq!(messages, 0);
        assert_eq!(text.matches("(symbol \"EasyEDA:R_").count(), 1);
        assert_eq!(text.matches("(lib_id \"EasyEDA:R_").count(), 2);
        assert!(text.contains(
            "(in_bom yes) (on_board yes) (property \"Reference\" \"R\" (id 0) (at 0 0 0) (effects (font (size 1.27 1.27)))) \
             (property \"Value\" \"\" (id 1) (at 0 0 0) (effects (font (size 1.27 1.27))))"
        ));
        assert!(text.contains(
            "(rectangle (start -2.54 1.27) (end 2.54 -1.27) (stroke (width 0)) (fill (type none)))"
        ));
        assert!(text.contains("(at 96.52 -78.74 0) (unit 1) (in_bom yes) (on_board yes) (uuid "));
        assert!(text.contains(
            "(property \"EDA_id\" gge380 (id 4) (at 96.52 -78.74 0) (effects (font (size 1.27 1.27)) hide)) \
             (property \"Reference\" \"R1\" (id 0) (at 95.25 -81.28 0) (effects (font (size 1.27 1.27)) (justify left))) \
             (property \"Value\" \"10k\" (id 1) (at 95.25 -76.2 0) (effects (font (size 1.27 1.27)) (justify left)))"
        ));
        assert!(text.contains("(reference \"R1\") (unit 1) (value \"10k\") (footprint \"0603\")"));
        assert!(text.contains("(reference \"R2\") (unit 1) (value \"10k\") (footprint \"0603\")"));
        assert!(!text.contains("frame_lib_1"));
    }

    #[test]
    fn test_multipart_reference() {
        let (text, messages) = convert_shapes(&[resistor(380.0, "U1.1").as_str()]);
        assert_eq!(messages, 1);
        assert!(text.contains("(property \"Reference\" \"U\" (id 0) (at 0 0 0)"));
        assert!(text.contains(
            "(text \"#1: Warning: multipart shape U1.1 found on schematics; not yet supported.\\nDrawn parts"
        ));
    }

    #[test]
    fn test_sheet_remarks() {
        let (text, messages) = convert_shapes(&[
            "R~1~2~3~4~5",
            "ZZ~1",
            "F~part_netLabel_odd~0~0~0~gge3~~0^^0~0^^X",
            "J~1e300~0~3~#000000~gge4~0",
        ]);
        assert_eq!(messages, 4);
        assert!(text.contains(
            "(text \"#1: Warning: rectangle shape found in schematics, but not supported by Kicad\" (at 0 -5.08 0)"
        ));
        assert!(text.contains("\"#2: Warning: unknown shape ZZ in schematics\""));
        assert!(text.contains("\"#3: Warning: unsupported netflag partId: part_netLabel_odd with id = gge3\""));
        assert!(text.contains("\"#4: Error: invalid number \\\"1e300\\\" for x in J; shape ignored\""));
    }

    #[test]
    fn test_select_sheet() {
        let doc: SchematicDocument = serde_json::from_str(
            r#"{"schematics": [
                {"dataStr": {"shape": ["J~315~-475~3~#CC0000~gge5~0"]}},
                {"dataStr": {"shape": []}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(select_sheet(doc.clone(), 1).unwrap().shape.len(), 1);
        assert!(select_sheet(doc.clone(), 2).unwrap().shape.is_empty());
        assert!(matches!(
            select_sheet(doc.clone(), 3),
            Err(ConvertError::SheetOutOfRange {
                requested: 3,
                available: 2
            })
        ));
        assert!(matches!(
            select_sheet(doc, 0),
            Err(ConvertError::SheetOutOfRange { requested: 0, .. })
        ));
    }
}
