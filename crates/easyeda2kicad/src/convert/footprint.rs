//! Footprint assembly: `LIB` shapes placed on a board, and stand-alone
//! footprint documents.

use log::{debug, warn};

use super::shapes::{self, Scope};
use crate::context::ConversionContext;
use crate::list;
use crate::options::ConvertOptions;
use crate::records::{Lib, RecordError, Shape};
use crate::sexpr::{Node, BR, BR1};
use crate::transform::{at, Frame, DOCUMENT_ORIGIN};
use crate::types::{FootprintDocument, Scalar};

/// Id used in remarks about shapes of a stand-alone footprint.
const FOOTPRINT_FILE_ID: &str = "this fp";

/// Converted member shapes, grouped in output order.
#[derive(Debug, Default)]
struct Groups {
    texts: Vec<Node>,
    lines: Vec<Node>,
    rects: Vec<Node>,
    circles: Vec<Node>,
    arcs: Vec<Node>,
    polys: Vec<Node>,
    holes: Vec<Node>,
    pads: Vec<Node>,
    /// Vias moved out of the footprint onto the board.
    board_vias: Vec<Node>,
}

impl Groups {
    fn add(&mut self, ctx: &mut ConversionContext, record: &str, scope: &Scope, standalone: bool) {
        let id = scope.footprint.unwrap_or_default();
        let shape = match Shape::parse(record) {
            Ok(shape) => shape,
            Err(RecordError::Unsupported(kind)) => {
                report_unsupported(ctx, &kind, id, standalone);
                return;
            }
            Err(e) => {
                ctx.report(format!("Error: {e} of {id}; shape ignored"), 1);
                return;
            }
        };
        debug!("footprint {id}: converting {}", shape.kind());
        match &shape {
            Shape::Track(track) => self.lines.extend(shapes::track(ctx, track, scope)),
            Shape::Text(text) => self.texts.extend(shapes::text(ctx, text, scope)),
            Shape::Arc(arc) => self.arcs.extend(shapes::arc(ctx, arc, scope)),
            Shape::Hole(hole) => self.holes.extend(shapes::footprint_hole(hole, scope)),
            Shape::Pad(pad) => self.pads.extend(shapes::pad(ctx, pad, scope, false)),
            Shape::Circle(circle) => self.circles.extend(shapes::circle(ctx, circle, scope)),
            Shape::Rect(rect) => self.rects.extend(shapes::rect(ctx, rect, scope)),
            Shape::SolidRegion(region) => {
                self.polys
                    .extend(shapes::footprint_polygon(ctx, region, scope))
            }
            Shape::Via(via) => {
                let converted = shapes::footprint_via(ctx, via, scope, standalone);
                self.holes.extend(converted.hole);
                self.board_vias.extend(converted.board_via);
            }
            Shape::SvgNode => {}
            Shape::CopperArea(_) | Shape::Lib(_) => {
                report_unsupported(ctx, shape.kind(), id, standalone)
            }
        }
    }

    /// `(attr smd)` when any pad is surface mounted.
    fn attr(&self) -> Option<Node> {
        self.pads
            .iter()
            .any(|pad| pad.tag() == Some("pad") && pad.str_at(1) == Some("smd"))
            .then(|| list!["attr", "smd"])
    }

    fn into_body(self) -> impl Iterator<Item = Node> {
        [
            self.texts,
            self.lines,
            self.rects,
            self.circles,
            self.arcs,
            self.polys,
            self.holes,
            self.pads,
        ]
        .into_iter()
        .flatten()
    }
}

fn report_unsupported(ctx: &mut ConversionContext, kind: &str, id: &str, standalone: bool) {
    let msg = if standalone {
        format!("Warning: unsupported shape {kind} found in footprint")
    } else {
        format!("Warning: unsupported shape {kind} found in footprint {id} on pcb")
    };
    ctx.report(msg, 1);
}

/// Replace characters KiCad does not accept in footprint names.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric()
                || c.is_whitespace()
                || matches!(c, '_' | '.' | '(' | ')' | '-')
            {
                c
            } else {
                'x'
            }
        })
        .collect()
}

/// A `LIB` shape on a board: an `EasyEDA:<package>` footprint, followed by
/// any vias that had to move onto the board.
pub fn board_footprint(ctx: &mut ConversionContext, lib: &Lib) -> Vec<Node> {
    let angle = lib.rotation;
    let scope = Scope::footprint(
        Frame::placed_at(lib.x, lib.y, angle.unwrap_or(0.0)),
        &lib.id,
    );
    let mut groups = Groups::default();
    for record in &lib.shapes {
        groups.add(ctx, record, &scope, false);
    }
    groups.texts.extend([
        BR1,
        list![
            "fp_text",
            "user",
            &lib.id,
            list!["at", 0, 0],
            list!["layer", "Cmts.User"],
            list!["effects", list!["font", list!["size", 1, 1], list!["thickness", 0.15]]],
        ],
    ]);

    let name = format!("EasyEDA:{}", sanitize_name(lib.package().unwrap_or("unknown")));
    let attr = groups.attr();
    let board_vias = std::mem::take(&mut groups.board_vias);
    let mut items = vec![
        Node::from("footprint"),
        Node::from(name),
        lib.locked.then(|| Node::from("locked")).into(),
        list!["layer", "F.Cu"],
        at(lib.x, lib.y, angle, &Frame::ROOT),
        attr.into(),
    ];
    items.extend(groups.into_body());

    let mut out = vec![BR, Node::List(items)];
    out.extend(board_vias);
    out
}

/// A converted stand-alone footprint.
#[derive(Debug, Clone)]
pub struct ConvertedFootprint {
    /// Footprint name, derived from the package.
    pub value: String,
    pub tree: Node,
    pub messages: usize,
}

impl ConvertedFootprint {
    pub fn file_name(&self) -> String {
        format!("{}.kicad_mod", self.value)
    }
}

fn head_number(value: &Option<Scalar>) -> Option<f64> {
    value.as_ref().and_then(Scalar::as_f64)
}

/// Properties from `head.c_para`: reference, value, tags and description.
fn properties(doc: &FootprintDocument) -> Vec<Node> {
    let text_effects = || list!["effects", list!["font", list!["size", 1.27, 1.27]]];
    let mut props = vec![
        BR1,
        list![
            "fp_text",
            "reference",
            "REF**",
            list!["at", 0, 0],
            list!["layer", "F.SilkS"],
            text_effects(),
        ],
    ];
    if let Some(package) = doc.head.param("package") {
        let family = package.split('_').next().unwrap_or_default();
        props.extend([
            BR1,
            list![
                "fp_text",
                "value",
                &package,
                list!["at", 0, 0],
                list!["layer", "F.Fab"],
                text_effects(),
            ],
            BR1,
            list!["tags", format!("{family}, EasyEDA conversion")],
        ]);
    }
    if let Some(link) = doc.head.param("link") {
        props.extend([BR1, list!["descr", format!("EasyEDA footprint: {link}")]]);
    }
    props
}

/// Convert a footprint document into a `.kicad_mod` tree. Remarks are
/// placed inside the footprint on `Cmts.User`.
pub fn convert_footprint(doc: &FootprintDocument, options: ConvertOptions) -> ConvertedFootprint {
    let mut ctx = ConversionContext::for_footprint(options);
    let head = &doc.head;
    let frame = Frame::placed_at(
        head_number(&head.x).unwrap_or(DOCUMENT_ORIGIN.x),
        head_number(&head.y).unwrap_or(DOCUMENT_ORIGIN.y),
        head_number(&head.rotation).unwrap_or(0.0),
    );
    let scope = Scope::footprint(frame, FOOTPRINT_FILE_ID);
    let value = head
        .param("package")
        .map(|package| sanitize_name(&package))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let mut groups = Groups::default();
    for record in &doc.shape {
        groups.add(&mut ctx, record, &scope, true);
    }

    let mut items = vec![
        Node::from("footprint"),
        Node::from(value.as_str()),
        list!["version", 20210220],
        list!["generator", "pcbnew"],
        list!["layer", "F.Cu"],
    ];
    items.extend(properties(doc));
    items.push(groups.attr().into());
    items.extend(groups.into_body());
    items.extend(ctx.diagnostics.nodes());
    items.push(BR1);
    items.push(list![
        "model",
        format!("${{KICAD6_3DMODEL_DIR}}/EasyEDA.3dshapes/{value}.wrl"),
        list!["offset", list!["xyz", 0, 0, 0]],
        list!["scale", list!["xyz", 1, 1, 1]],
        list!["rotate", list!["xyz", 0, 0, 0]],
    ]);

    let messages = ctx.diagnostics.count();
    if messages > 0 {
        warn!(
            "In total {messages} messages were created during the conversion. \
             Check messages on fp layer User.Cmts for more details."
        );
    }
    ConvertedFootprint {
        value,
        tree: Node::List(items),
        messages,
    }
}
