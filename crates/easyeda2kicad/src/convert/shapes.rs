//! One converter per shape kind.
//!
//! Converters return a fragment of output nodes, each item preceded by a
//! line break hint. A shape that cannot be converted contributes an empty
//! fragment and a diagnostic instead.

use crate::arc::EndpointArc;
use crate::context::ConversionContext;
use crate::list;
use crate::records::{
    polygon_points, Arc, Circle, CopperArea, Hole, Pad, PadShape, Rect, SolidRegion, Text,
    TextKind, Track, Via,
};
use crate::sexpr::{Node, BR, BR1};
use crate::transform::{at, to_local_coords, Frame, Point};
use crate::units::{mm, to_mm};

/// Where the shapes being converted are placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scope<'a> {
    pub frame: Frame,
    /// Id of the enclosing footprint; `None` on the board.
    pub footprint: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub const BOARD: Scope<'static> = Scope {
        frame: Frame::ROOT,
        footprint: None,
    };

    pub fn footprint(frame: Frame, id: &'a str) -> Self {
        Self {
            frame,
            footprint: Some(id),
        }
    }

    pub fn in_footprint(&self) -> bool {
        self.footprint.is_some()
    }

    fn br(&self) -> Node {
        if self.in_footprint() {
            BR1
        } else {
            BR
        }
    }

    /// Diagnostic suffix naming the enclosing footprint.
    fn owner(&self) -> String {
        self.footprint
            .map(|id| format!(" of {id}"))
            .unwrap_or_default()
    }

    fn point(&self, x: f64, y: f64) -> Point {
        to_local_coords(x, y, &self.frame)
    }

    fn name(&self, board: &'static str, footprint: &'static str) -> &'static str {
        if self.in_footprint() {
            footprint
        } else {
            board
        }
    }
}

fn polygon(points: &[Point], frame: &Frame) -> Node {
    let mut items = vec![Node::from("pts")];
    items.extend(points.iter().map(|p| {
        let local = to_local_coords(p.x, p.y, frame);
        list!["xy", mm(local.x), mm(local.y)]
    }));
    Node::List(items)
}

fn zone_name(id: &str) -> Option<Node> {
    (!id.is_empty()).then(|| list!["name", id])
}

pub fn track(ctx: &mut ConversionContext, track: &Track, scope: &Scope) -> Vec<Node> {
    let net = ctx.net_id(&track.net);
    let layer = match ctx.layer(&track.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!(
                "Error: {e} found in TRACK ({}){}; track ignored",
                track.id,
                scope.owner()
            );
            return ctx.report(msg, 1);
        }
    };
    let round = ctx.rounds(layer);
    let object = match (scope.in_footprint(), layer.is_copper()) {
        (true, _) => "fp_line",
        (false, true) => "segment",
        (false, false) => "gr_line",
    };
    let net = net.filter(|_| object == "segment");

    let mut out = Vec::new();
    for pair in track.points.windows(2) {
        let start = scope.point(pair[0].x, pair[0].y);
        let end = scope.point(pair[1].x, pair[1].y);
        out.push(scope.br());
        out.push(list![
            object,
            list!["start", to_mm(start.x, round), to_mm(start.y, round)],
            list!["end", to_mm(end.x, round), to_mm(end.y, round)],
            list!["width", mm(track.width)],
            list!["layer", layer],
            net.map(|id| list!["net", id]),
            track.locked.then(|| list!["status", 40000]),
        ]);
    }
    out
}

pub fn via(ctx: &mut ConversionContext, via: &Via) -> Vec<Node> {
    let net = ctx.net_id(&via.net);
    vec![
        BR,
        list![
            "via",
            at(via.x, via.y, None, &Frame::ROOT),
            list!["size", mm(via.diameter)],
            list!["drill", mm(via.drill) * 2.0],
            list!["layers", "F.Cu", "B.Cu"],
            net.is_none().then(|| list!["free"]),
            list!["net", net.unwrap_or(0)],
        ],
    ]
}

/// Glyph proportions relative to the nominal font size.
struct FontScale {
    width: f64,
    height: f64,
    thickness: f64,
}

fn font_scale(font: &str) -> FontScale {
    let (width, height, thickness) = match font {
        "NotoSerifCJKsc-Medium" => (0.8, 0.8, 0.3),
        "NotoSansCJKjp-DemiLight" => (0.6, 0.6, 0.5),
        _ => (0.75, 0.9, 0.8),
    };
    FontScale {
        width,
        height,
        thickness,
    }
}

pub fn text(ctx: &mut ConversionContext, text: &Text, scope: &Scope) -> Vec<Node> {
    let layer = match ctx.layer(&text.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!(
                "Error: {e} found in TEXT ({}){}; text ignored",
                text.id,
                scope.owner()
            );
            return ctx.report(msg, 1);
        }
    };
    let layer = if scope.in_footprint() && text.kind == TextKind::Value {
        layer.silk_to_fab()
    } else {
        layer
    };
    let role = scope.in_footprint().then(|| match text.kind {
        TextKind::Reference => "reference",
        TextKind::Value => "value",
        TextKind::Label => "user",
    });
    let scale = font_scale(&text.font);
    let size = mm(text.font_size);
    vec![
        scope.br(),
        list![
            scope.name("gr_text", "fp_text"),
            role.map(Node::from),
            &text.text,
            at(text.x, text.y, text.angle, &scope.frame),
            list!["layer", layer],
            text.hidden.then(|| Node::from("hide")),
            list![
                "effects",
                list![
                    "font",
                    list!["size", size * scale.height, size * scale.width],
                    list!["thickness", mm(text.stroke_width) * scale.thickness],
                ],
                list!["justify", "left", layer.is_back().then(|| Node::from("mirror"))],
            ],
        ],
    ]
}

pub fn arc(ctx: &mut ConversionContext, arc: &Arc, scope: &Scope) -> Vec<Node> {
    let layer = match ctx.layer(&arc.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!(
                "Error: {e} found in ARC ({}){}; arc ignored",
                arc.id,
                scope.owner()
            );
            return ctx.report(msg, 1);
        }
    };
    if layer.is_copper() && ctx.net_id(&arc.net).is_some() {
        let msg = format!(
            "Warning: Found arc ({}){} on {layer} with netname {}: arc is kept; unsupported netname omitted.\n\
             Note: manual checks are needed; arc is not part of ratsnest and this will isolate the arc.",
            arc.id,
            scope.owner(),
            arc.net
        );
        ctx.report(msg, 2);
    }
    let Ok(path) = EndpointArc::parse(&arc.path) else {
        let msg = format!(
            "Error: invalid arc\npath: {}\nfound in ARC ({}){} on layer {layer}; arc ignored",
            arc.path,
            arc.id,
            scope.owner()
        );
        return ctx.report(msg, 3);
    };
    let frame = scope.frame;
    let local = path.in_frame(&frame, |p| to_local_coords(p.x, p.y, &frame));
    let resolved = match local.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            let msg = format!(
                "Error: {e} for ARC ({}){} on layer {layer}; arc ignored",
                arc.id,
                scope.owner()
            );
            return ctx.report(msg, 1);
        }
    };
    let round = ctx.rounds(layer);
    let end = if local.sweep { local.start } else { local.end };
    let angle = ctx.arc_angle(layer, resolved.extent.abs());
    vec![
        scope.br(),
        list![
            scope.name("gr_arc", "fp_arc"),
            // KiCad 6 arcs start at their center
            list![
                "start",
                to_mm(resolved.center.x, round),
                to_mm(resolved.center.y, round)
            ],
            list!["end", to_mm(end.x, round), to_mm(end.y, round)],
            list!["angle", angle],
            list!["width", mm(arc.width)],
            list!["layer", layer],
        ],
    ]
}

pub fn circle(ctx: &mut ConversionContext, circle: &Circle, scope: &Scope) -> Vec<Node> {
    let layer = match ctx.layer(&circle.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!(
                "Error: {e} found in CIRCLE ({}){}; circle ignored",
                circle.id,
                scope.owner()
            );
            return ctx.report(msg, 1);
        }
    };
    if layer.is_copper() && ctx.net_id(&circle.net).is_some() {
        let msg = format!(
            "Warning: Found circle ({}){} on {layer} with netname {}: circle is kept; unsupported netname omitted.\n\
             Note: manual checks are needed; circle is not part of ratsnest and this will isolate the circle.",
            circle.id,
            scope.owner(),
            circle.net
        );
        ctx.report(msg, 2);
    }
    let center = scope.point(circle.x, circle.y);
    vec![
        scope.br(),
        list![
            scope.name("gr_circle", "fp_circle"),
            list!["center", mm(center.x), mm(center.y)],
            list!["end", mm(center.x) + mm(circle.radius), mm(center.y)],
            list!["layer", layer],
            list!["width", mm(circle.stroke_width)],
        ],
    ]
}

pub fn rect(ctx: &mut ConversionContext, rect: &Rect, scope: &Scope) -> Vec<Node> {
    let layer = match ctx.layer(&rect.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!(
                "Error: {e} found in RECT ({}){}; rect ignored",
                rect.id,
                scope.owner()
            );
            return ctx.report(msg, 1);
        }
    };
    let corners = [
        Point::new(rect.x, rect.y),
        Point::new(rect.x, rect.y + rect.height),
        Point::new(rect.x + rect.width, rect.y + rect.height),
        Point::new(rect.x + rect.width, rect.y),
    ];
    let net = ctx.net_id(&rect.net);
    if let Some(net_id) = net.filter(|_| layer.is_copper()) {
        let mut outline = corners.to_vec();
        outline.push(corners[0]);
        ctx.cu_zone_count += 1;
        return vec![
            scope.br(),
            list![
                "zone",
                list!["net", net_id],
                list!["net_name", &rect.net],
                list!["layer", layer],
                zone_name(&rect.id),
                list!["hatch", "edge", 0.508],
                list!["priority", 1],
                list!["connect_pads", "yes", list!["clearance", 0]],
                BR1,
                list![
                    "fill",
                    "yes",
                    list!["thermal_gap", 0],
                    list!["thermal_bridge_width", 0.254],
                ],
                BR1,
                list!["polygon", polygon(&outline, &scope.frame)],
            ],
        ];
    }
    // an axis-aligned rectangle stays one only under quarter turns
    if !is_quarter_turn(scope.frame.angle) {
        return vec![
            scope.br(),
            list![
                scope.name("gr_poly", "fp_poly"),
                polygon(&corners, &scope.frame),
                list!["layer", layer],
                list!["width", 0.1],
                list!["fill", "solid"],
            ],
        ];
    }
    let start = scope.point(corners[0].x, corners[0].y);
    let end = scope.point(corners[2].x, corners[2].y);
    vec![
        scope.br(),
        list![
            scope.name("gr_rect", "fp_rect"),
            list!["start", mm(start.x), mm(start.y)],
            list!["end", mm(end.x), mm(end.y)],
            list!["layer", layer],
            list!["width", 0.1],
            list!["fill", "solid"],
        ],
    ]
}

fn is_quarter_turn(degrees: f64) -> bool {
    let turns = degrees / 90.0;
    (turns - turns.round()).abs() < 1e-9
}

/// Board-level solid region: keep-out zone, copper zone, filled polygon or
/// board cutout depending on its fill type.
pub fn solid_region(ctx: &mut ConversionContext, region: &SolidRegion) -> Vec<Node> {
    let id = &region.id;
    let layer = match ctx.layer(&region.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!("Error: {e} found in SOLIDREGION ({id}); solidregion ignored");
            return ctx.report(msg, 1);
        }
    };
    if region.fill.is_empty() {
        let msg = format!(
            "Warning: No type supplied of SOLIDREGION ({id}) on layer {layer}; solidregion ignored"
        );
        return ctx.report(msg, 1);
    }
    let net = ctx.net_id(&region.net);
    let Some(points) = polygon_points(&region.path) else {
        let msg = format!(
            "Warning: Unsupported path with arcs found in SOLIDREGION ({id}) on layer {layer}; solidregion ignored"
        );
        return ctx.report(msg, 1);
    };
    let outline = polygon(&points, &Frame::ROOT);

    let region_node = match region.fill.as_str() {
        "cutout" => {
            ctx.keepout_zone_count += 1;
            list![
                "zone",
                list!["net", 0],
                list!["net_name", ""],
                list!["hatch", "edge", 0.508],
                list!["layer", layer],
                zone_name(id),
                BR1,
                list![
                    "keepout",
                    list!["tracks", "allowed"],
                    list!["vias", "allowed"],
                    list!["pads", "allowed"],
                    list!["copperpour", "not_allowed"],
                    list!["footprints", "allowed"],
                ],
                BR1,
                list!["polygon", outline],
            ]
        }
        "solid" => match net.filter(|_| layer.is_copper()) {
            Some(net_id) => {
                ctx.cu_zone_count += 1;
                list![
                    "zone",
                    list!["net", net_id],
                    list!["net_name", &region.net],
                    list!["layer", layer],
                    list!["hatch", "edge", 0.508],
                    list!["priority", 1],
                    list!["connect_pads", "yes", list!["clearance", 0]],
                    BR1,
                    list![
                        "fill",
                        "yes",
                        list!["thermal_gap", 0],
                        list!["thermal_bridge_width", 0.254],
                    ],
                    BR1,
                    list!["polygon", outline],
                ]
            }
            None => list![
                "gr_poly",
                outline,
                list!["layer", layer],
                list!["width", 0],
                list!["fill", "solid"],
            ],
        },
        "npth" => list!["gr_poly", outline, list!["layer", layer], list!["width", 0.254]],
        other => {
            let msg = format!(
                "Warning: unsupported type {other} found in SOLIDREGION {id} on layer {layer}; solidregion ignored"
            );
            return ctx.report(msg, 1);
        }
    };
    vec![BR, region_node]
}

/// Solid region inside a footprint: a filled `fp_poly`.
pub fn footprint_polygon(
    ctx: &mut ConversionContext,
    region: &SolidRegion,
    scope: &Scope,
) -> Vec<Node> {
    let (id, owner) = (&region.id, scope.owner());
    let layer = match ctx.layer(&region.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!("Error: {e} found in SOLIDREGION ({id}){owner}; solidregion ignored");
            return ctx.report(msg, 1);
        }
    };
    if region.fill != "solid" {
        let msg = format!(
            "Warning: unsupported type {} found in SOLIDREGION {id}{owner} on layer {layer}; solidregion ignored",
            region.fill
        );
        return ctx.report(msg, 1);
    }
    let points = match polygon_points(&region.path) {
        Some(points) if !points.is_empty() => points,
        Some(_) => {
            let msg = format!(
                "Error: No points defined for polygon in SOLIDREGION ({id}){owner} on layer {layer}; solidregion ignored"
            );
            return ctx.report(msg, 1);
        }
        None => {
            let msg = format!(
                "Warning: Unsupported path with arcs found in SOLIDREGION ({id}){owner} on layer {layer}; solidregion ignored"
            );
            return ctx.report(msg, 1);
        }
    };
    vec![
        BR1,
        list![
            "fp_poly",
            polygon(&points, &scope.frame),
            list!["layer", layer],
            list!["width", 0],
        ],
    ]
}

pub fn copper_area(ctx: &mut ConversionContext, area: &CopperArea) -> Vec<Node> {
    let id = &area.id;
    let net = ctx.net_id(&area.net);
    let layer = match ctx.layer(&area.layer) {
        Ok(layer) => layer,
        Err(e) => {
            let msg = format!("Error: {e} found in COPPERAREA ({id}); copperarea ignored");
            return ctx.report(msg, 1);
        }
    };
    if area.fill.is_empty() || area.fill == "none" {
        let msg = format!(
            "Warning: Unsupported type \"No Solid\" of COPPERAREA ({id}) on layer {layer}; copperarea ignored"
        );
        return ctx.report(msg, 1);
    }
    let Some(points) = polygon_points(&area.path) else {
        let msg = format!(
            "Warning: Unsupported path with arcs found in COPPERAREA ({id}) on layer {layer}; copperarea ignored"
        );
        return ctx.report(msg, 1);
    };
    ctx.cu_zone_count += 1;

    let hatched = area.fill == "grid";
    let islands = area.keep_islands;
    let clearance = mm(area.clearance);
    let spoke = area
        .spoke_width
        .map(mm)
        .filter(|width| *width >= 0.254)
        .unwrap_or(0.254);
    vec![
        BR,
        list![
            "zone",
            list!["net", net.unwrap_or(0)],
            list!["net_name", &area.net],
            list!["layer", layer],
            zone_name(&area.name),
            list!["hatch", "edge", 0.508],
            list!["priority", if area.net == "GND" { 0 } else { 1 }],
            list![
                "connect_pads",
                (area.thermal == "direct").then(|| Node::from("yes")),
                list!["clearance", clearance],
            ],
            BR1,
            list![
                "fill",
                "yes",
                hatched.then(|| list!["mode", "hatch"]),
                list!["thermal_gap", clearance],
                list!["thermal_bridge_width", spoke],
                islands.then(|| list!["island_removal_mode", 1]),
                islands.then(|| list!["island_area_min", 0]),
                hatched.then(|| list!["hatch_thickness", mm(area.grid_line_width)]),
                hatched.then(|| list!["hatch_gap", mm(area.grid_line_spacing)]),
                hatched.then(|| list!["hatch_orientation", 0]),
            ],
            BR1,
            list!["polygon", polygon(&points, &Frame::ROOT)],
        ],
    ]
}

fn hole_pad(at_node: Node, size: f64) -> Node {
    list![
        "pad",
        "",
        "np_thru_hole",
        "circle",
        at_node,
        list!["size", size, size],
        list!["drill", size],
        list!["layers", "*.Cu", "*.Mask"],
    ]
}

/// Board-level hole: a mounting-hole footprint.
pub fn hole(hole: &Hole) -> Vec<Node> {
    let size = mm(hole.radius) * 2.0;
    vec![
        BR,
        list![
            "footprint",
            format!("AutoGenerated:MountingHole_{size:.2}mm"),
            hole.locked.then(|| Node::from("locked")),
            list!["layer", "F.Cu"],
            at(hole.x, hole.y, None, &Frame::ROOT),
            list!["attr", "virtual"],
            BR1,
            list!["fp_text", "reference", "", list!["at", 0, 0], list!["layer", "F.SilkS"]],
            BR1,
            list!["fp_text", "value", "", list!["at", 0, 0], list!["layer", "F.SilkS"]],
            BR1,
            hole_pad(list!["at", 0, 0], size),
        ],
    ]
}

/// Hole inside a footprint: a non-plated pad.
pub fn footprint_hole(hole: &Hole, scope: &Scope) -> Vec<Node> {
    let size = mm(hole.radius) * 2.0;
    vec![BR1, hole_pad(at(hole.x, hole.y, None, &scope.frame), size)]
}

/// Result of a via found inside a footprint.
#[derive(Debug, Default)]
pub struct FootprintVia {
    /// Pad replacing a netless via.
    pub hole: Vec<Node>,
    /// Board via replacing a via with a net.
    pub board_via: Vec<Node>,
}

/// Vias have no footprint equivalent. Netless vias become holes; vias
/// with a net move to the board, or are dropped in stand-alone footprints.
pub fn footprint_via(
    ctx: &mut ConversionContext,
    via: &Via,
    scope: &Scope,
    standalone: bool,
) -> FootprintVia {
    if via.net.is_empty() || via.net == "0" {
        let size = mm(via.drill) * 2.0;
        return FootprintVia {
            hole: vec![BR1, hole_pad(at(via.x, via.y, None, &scope.frame), size)],
            board_via: Vec::new(),
        };
    }
    if standalone {
        ctx.report(
            format!("Warning: unsupported VIA found ({}); via ignored", via.id),
            1,
        );
        return FootprintVia::default();
    }
    let msg = format!(
        "Warning: unsupported VIA found ({}){} on net {}; converted in pcb via",
        via.id,
        scope.owner(),
        via.net
    );
    ctx.report(msg, 1);
    let net = ctx.net_id(&via.net).unwrap_or(0);
    FootprintVia {
        hole: Vec::new(),
        board_via: vec![
            BR,
            list![
                "via",
                at(via.x, via.y, None, &Frame::ROOT),
                list!["size", mm(via.diameter)],
                list!["drill", mm(via.drill) * 2.0],
                list!["layers", "F.Cu", "B.Cu"],
                list!["net", net],
            ],
        ],
    }
}

// ─── Pads ────────────────────────────────────────────────────────────

/// Four corners on an axis-aligned rectangle, in either winding.
fn is_rectangle(points: &[f64]) -> bool {
    let [x1, y1, x2, y2, x3, y3, x4, y4] = match points {
        [a, b, c, d, e, f, g, h] => [*a, *b, *c, *d, *e, *f, *g, *h],
        _ => return false,
    };
    let eq = |a: f64, b: f64| (a - b).abs() < 0.01;
    (eq(x1, x2) && eq(y2, y3) && eq(x3, x4) && eq(y4, y1))
        || (eq(y1, y2) && eq(x2, x3) && eq(y3, y4) && eq(x4, x1))
}

/// Width and height of a rectangular outline, swapped for pads turned a
/// quarter.
fn rectangle_size(points: &[f64], rotation: f64) -> (f64, f64) {
    fn span(values: impl Iterator<Item = f64>) -> f64 {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        max - min
    }
    let width = span(points.iter().step_by(2).copied());
    let height = span(points.iter().skip(1).step_by(2).copied());
    if (rotation.abs().round() as i64) % 180 == 90 {
        (height, width)
    } else {
        (width, height)
    }
}

/// Drill of a pad; oval when a hole length is given.
fn drill(radius: f64, length: f64, width: f64, height: f64) -> Option<Node> {
    match (radius != 0.0, length != 0.0) {
        (true, true) if length > radius && height > width => {
            Some(list!["drill", "oval", radius * 2.0, length])
        }
        (true, true) => Some(list!["drill", "oval", length, radius * 2.0]),
        (true, false) => Some(list!["drill", radius * 2.0]),
        _ => None,
    }
}

const FRONT_PAD_LAYERS: [&str; 3] = ["F.Cu", "F.Paste", "F.Mask"];
const BACK_PAD_LAYERS: [&str; 3] = ["B.Cu", "B.Paste", "B.Mask"];
const THROUGH_PAD_LAYERS: [&str; 3] = ["*.Cu", "*.Paste", "*.Mask"];
const NPTH_PAD_LAYERS: [&str; 2] = ["F&B.Cu", "*.Mask"];

/// Maximum distance between pad and hole centers before the hole counts as
/// offset.
const HOLE_OFFSET_TOLERANCE: f64 = 0.025;

/// Pad inside a footprint. `on_board` pads are numbered 1 and wrapped by
/// [`board_pad`].
pub fn pad(ctx: &mut ConversionContext, pad: &Pad, scope: &Scope, on_board: bool) -> Vec<Node> {
    let id = &pad.id;
    let owner = scope.owner();
    let rotation = pad.rotation.unwrap_or(0.0);
    let as_rect = pad.shape == PadShape::Polygon && is_rectangle(&pad.points);
    let shape = if as_rect { PadShape::Rect } else { pad.shape };
    let custom = shape == PadShape::Polygon;
    if custom && pad.points.len() < 2 {
        let msg = format!("Error: No points defined for polygon in PAD ({id}){owner}; pad ignored");
        return ctx.report(msg, 1);
    }
    let (width, height) = if as_rect {
        rectangle_size(&pad.points, rotation)
    } else {
        (pad.width, pad.height)
    };
    let number = if on_board { "1" } else { pad.number.as_str() };

    let (kind, layers, net, radius): (_, &[&str], _, _) = if pad.layer == "11" {
        let (kind, layers, net) = if pad.plated {
            ("thru_hole", &THROUGH_PAD_LAYERS[..], ctx.net_id(&pad.net))
        } else {
            if !pad.net.is_empty() {
                let msg = format!(
                    "Error: netid not supported for PAD {number} ({id}){owner}; netid ignored"
                );
                ctx.report(msg, 1);
            }
            ("np_thru_hole", &NPTH_PAD_LAYERS[..], None)
        };
        if let Some(hole) = pad.hole_center {
            if (pad.x - hole.x).abs() > HOLE_OFFSET_TOLERANCE
                || (pad.y - hole.y).abs() > HOLE_OFFSET_TOLERANCE
            {
                let msg =
                    format!("Warning: hole in pad may be misplaced for PAD {number} ({id}){owner}");
                ctx.report(msg, 1);
            }
        }
        (kind, layers, net, pad.hole_radius)
    } else {
        let layers = match pad.layer.as_str() {
            "1" => &FRONT_PAD_LAYERS[..],
            "2" => &BACK_PAD_LAYERS[..],
            other => {
                let msg = format!(
                    "Error: unsupported layer id {other} found in PAD {number} ({id}){owner}; pad ignored"
                );
                return ctx.report(msg, 1);
            }
        };
        ("smd", layers, ctx.net_id(&pad.net), 0.0)
    };

    let size = if custom {
        // KiCad sizes the anchor of a custom pad; keep it just above the hole
        let anchor = mm(radius * 2.0 + 0.1);
        list!["size", anchor, anchor]
    } else {
        list!["size", mm(width).max(0.01), mm(height).max(0.01)]
    };
    let primitives = custom.then(|| {
        let pad_frame = Frame::placed_at(pad.x, pad.y, rotation);
        let points: Vec<Point> = pad
            .points
            .chunks_exact(2)
            .map(|c| Point::new(c[0], c[1]))
            .collect();
        list![
            "primitives",
            list!["gr_poly", polygon(&points, &pad_frame), list!["width", 0.1]],
        ]
    });
    let number_node = number
        .parse::<u32>()
        .map(Node::from)
        .unwrap_or_else(|_| Node::from(number));
    let mut layer_items = vec![Node::from("layers")];
    layer_items.extend(layers.iter().copied().map(Node::from));

    vec![
        BR1,
        list![
            "pad",
            number_node,
            kind,
            shape.kicad_name(),
            at(pad.x, pad.y, pad.rotation, &scope.frame),
            size,
            Node::List(layer_items),
            drill(mm(radius), mm(pad.hole_length), mm(width), mm(height)),
            net.map(|net_id| list!["net", net_id, &pad.net]),
            primitives,
        ],
    ]
}

/// Board-level pad, wrapped in a single-pad footprint.
pub fn board_pad(ctx: &mut ConversionContext, pad_record: &Pad) -> Vec<Node> {
    let id = &pad_record.id;
    let hole = format!("hole_{:.2}_mm", mm(pad_record.hole_radius) * 2.0);
    let (name, attr, value) = match (pad_record.layer.as_str(), pad_record.plated) {
        ("11", true) => (format!("AutoGenerated:TH_pad_{id}"), Some("through_hole"), hole),
        ("11", false) => (format!("AutoGenerated:NPTH_pad_{id}"), None, hole),
        _ => (format!("AutoGenerated:SMD_pad_{id}"), Some("smd"), String::new()),
    };
    let scope = Scope {
        frame: Frame::placed_at(pad_record.x, pad_record.y, 0.0),
        footprint: None,
    };
    let mut items = vec![
        Node::from("footprint"),
        Node::from(name),
        pad_record.locked.then(|| Node::from("locked")).into(),
        list!["layer", "F.Cu"],
        at(pad_record.x, pad_record.y, None, &Frame::ROOT),
        list![
            "attr",
            attr.map(Node::from),
            "board_only",
            "exclude_from_pos_files",
            "exclude_from_bom",
        ],
        BR1,
        list![
            "fp_text",
            "reference",
            id,
            list!["at", 0, 0],
            list!["layer", "F.SilkS"],
            "hide",
        ],
        BR1,
        list![
            "fp_text",
            "value",
            value,
            list!["at", 0, 0],
            list!["layer", "F.SilkS"],
            "hide",
        ],
    ];
    items.extend(pad(ctx, pad_record, &scope, true));
    vec![BR, Node::List(items)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConvertOptions;
    use crate::records::Shape;
    use crate::registry::NetRegistry;
    use crate::sexpr::{decode, encode};

    macro_rules! record {
        ($variant:ident, $text:expr) => {
            match Shape::parse($text) {
                Ok(Shape::$variant(record)) => record,
                other => panic!("unexpected record {other:?}"),
            }
        };
    }

    fn board_ctx(nets: &[&str]) -> ConversionContext {
        ConversionContext::for_board(
            NetRegistry::from_names(nets.iter().copied()),
            ConvertOptions::default(),
        )
    }

    fn render(nodes: &[Node]) -> Vec<String> {
        nodes.iter().filter(|n| n.is_content()).map(encode).collect()
    }

    #[test]
    fn test_copper_track() {
        let mut ctx = board_ctx(&["GND"]);
        let track_record = record!(Track, "TRACK~0.63~1~GND~4000 3000 4000 3030~gge606~0");
        assert_eq!(
            render(&track(&mut ctx, &track_record, &Scope::BOARD)),
            ["(segment (start 0 0) (end 0 7.62) (width 0.16) (layer \"F.Cu\") (net 1))"]
        );
    }

    #[test]
    fn test_track_registers_new_net() {
        let mut ctx = board_ctx(&["GND"]);
        let track_record = record!(Track, "TRACK~0.63~1~5V~4000 3000 4000 3030~gge606~1");
        assert_eq!(
            render(&track(&mut ctx, &track_record, &Scope::BOARD)),
            ["(segment (start 0 0) (end 0 7.62) (width 0.16) (layer \"F.Cu\") (net 2) (status 40000))"]
        );
        assert_eq!(ctx.nets.names(), &["", "GND", "5V"]);
    }

    #[test]
    fn test_graphic_and_outline_tracks() {
        let mut ctx = board_ctx(&[]);
        let silk = record!(Track, "TRACK~0.63~3~GND~4000 3000 4000 3030 4010 3030~gge606~0");
        assert_eq!(
            render(&track(&mut ctx, &silk, &Scope::BOARD)),
            [
                "(gr_line (start 0 0) (end 0 7.62) (width 0.16) (layer \"F.SilkS\"))",
                "(gr_line (start 0 7.62) (end 2.54 7.62) (width 0.16) (layer \"F.SilkS\"))",
            ]
        );
        let edge = record!(Track, "TRACK~0.63~10~GND~4150 3073 4000 3030~gge606~0");
        assert_eq!(
            render(&track(&mut ctx, &edge, &Scope::BOARD)),
            ["(gr_line (start 38.1 18.5) (end 0 7.6) (width 0.16) (layer \"Edge.Cuts\"))"]
        );
    }

    #[test]
    fn test_inner_layer_track() {
        let mut ctx = board_ctx(&["GND"]);
        let inner = record!(Track, "TRACK~0.63~21~GND~4000 3000 4000 3030~gge606~0");
        assert_eq!(
            render(&track(&mut ctx, &inner, &Scope::BOARD)),
            ["(segment (start 0 0) (end 0 7.62) (width 0.16) (layer \"In1.Cu\") (net 1))"]
        );
        assert_eq!(ctx.layers.max_inner(), 1);
    }

    #[test]
    fn test_unknown_layer_reports() {
        let mut ctx = board_ctx(&["GND"]);
        let bad = record!(Track, "TRACK~0.63~999~GND~4000 3000 4000 3030~gge606~0");
        assert!(track(&mut ctx, &bad, &Scope::BOARD).is_empty());
        assert_eq!(ctx.diagnostics.count(), 1);
        assert_eq!(
            ctx.diagnostics.messages()[0].text,
            "Error: unknown layer id: 999 found in TRACK (gge606); track ignored"
        );
    }

    #[test]
    fn test_via() {
        let mut ctx = board_ctx(&["GND"]);
        let with_net = record!(Via, "VIA~4000~3000~2.4~GND~1.2~gge5~0");
        assert_eq!(
            render(&via(&mut ctx, &with_net)),
            ["(via (at 0 0) (size 0.61) (drill 0.61) (layers \"F.Cu\" \"B.Cu\") (net 1))"]
        );
        let netless = record!(Via, "VIA~4000~3000~2.4~~1.2~gge6~0");
        assert_eq!(
            render(&via(&mut ctx, &netless)),
            ["(via (at 0 0) (size 0.61) (drill 0.61) (layers \"F.Cu\" \"B.Cu\") (free) (net 0))"]
        );
    }

    #[test]
    fn test_board_text() {
        let mut ctx = board_ctx(&[]);
        let front = record!(Text, "TEXT~L~4000~3000~1~0~~3~~10~Hello~~~gge1~~0~");
        assert_eq!(
            render(&text(&mut ctx, &front, &Scope::BOARD)),
            ["(gr_text \"Hello\" (at 0 0 0) (layer \"F.SilkS\") \
              (effects (font (size 2.286 1.905) (thickness 0.203)) (justify left)))"]
        );
        let back = record!(
            Text,
            "TEXT~L~4000~3000~1~~~4~~10~Hello~~none~gge2~NotoSerifCJKsc-Medium~0~"
        );
        assert_eq!(
            render(&text(&mut ctx, &back, &Scope::BOARD)),
            ["(gr_text \"Hello\" (at 0 0) (layer \"B.SilkS\") hide \
              (effects (font (size 2.032 2.032) (thickness 0.076)) (justify left mirror)))"]
        );
    }

    #[test]
    fn test_arcs() {
        let cases = [
            (
                "ARC~1~3~~M4050,3060 A10,10 0 0 1 4060,3050~~gge276~0",
                "(gr_arc (start 15.24 15.24) (end 12.7 15.24) (angle 90) (width 0.254) (layer \"F.SilkS\"))",
            ),
            (
                "ARC~1~10~~M4050,3060 A10,10 0 0 1 4060,3050~~gge276~0",
                "(gr_arc (start 15.2 15.2) (end 12.7 15.2) (angle 90) (width 0.254) (layer \"Edge.Cuts\"))",
            ),
            (
                "ARC~1~2~~M4000 3000A10 10 0 0 1 4050 3050~~gge170~0",
                "(gr_arc (start 6.35 6.35) (end 0 0) (angle 180) (width 0.254) (layer \"B.Cu\"))",
            ),
        ];
        for (input, expected) in cases {
            let mut ctx = board_ctx(&[]);
            let arc_record = record!(Arc, input);
            assert_eq!(render(&arc(&mut ctx, &arc_record, &Scope::BOARD)), [expected]);
            assert_eq!(ctx.diagnostics.count(), 0);
        }
    }

    #[test]
    fn test_outline_arc_angle_snaps() {
        // the chord is a little short of a quarter circle: about 89.4 degrees
        let input = "ARC~1~10~~M4050,3060 A10,10 0 0 1 4059.95,3050.05~~gge277~0";
        let (_, _, angle) = arc_values(input);
        assert_eq!(angle, 90.0);
        let silk = input.replace("~10~", "~3~");
        let (_, _, angle) = arc_values(&silk);
        assert!((angle - 89.428).abs() < 0.01, "{angle}");
    }

    fn arc_values(input: &str) -> (Vec<f64>, Vec<f64>, f64) {
        let mut ctx = board_ctx(&[]);
        let arc_record = record!(Arc, input);
        let nodes = arc(&mut ctx, &arc_record, &Scope::BOARD);
        let node = decode(&render(&nodes)[0]).unwrap();
        let pair = |tag: &str| {
            let child = node.find(tag).unwrap();
            vec![child.f64_at(0).unwrap(), child.f64_at(1).unwrap()]
        };
        let angle = node.find("angle").and_then(|a| a.f64_at(0)).unwrap();
        (pair("start"), pair("end"), angle)
    }

    #[test]
    fn test_arc_negative_rotation() {
        let (center, end, angle) = arc_values(
            "ARC~0.6~4~~M 3977.3789 3026.2151 A 28.4253 28.4253 -150 1 1 3977.6376 3026.643~~gge66~0",
        );
        approx::assert_abs_diff_eq!(center[0], 0.465, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(center[1], 2.978, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(end[0], -5.746, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(end[1], 6.659, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(angle, 358.992, epsilon = 2e-3);
    }

    #[test]
    fn test_arc_counter_clockwise_end_point() {
        let (center, end, angle) = arc_values(
            "ARC~1~3~~M4262.5,3279.5 A33.5596,33.5596 0 0 0 4245.5921,3315.5816~~gge8~0",
        );
        approx::assert_abs_diff_eq!(center[0], 70.739, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(center[1], 78.486, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(end[0], 62.38, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(end[1], 80.158, epsilon = 2e-3);
        approx::assert_abs_diff_eq!(angle, 72.836, epsilon = 2e-3);
    }

    #[test]
    fn test_copper_arc_with_net_is_kept() {
        let mut ctx = board_ctx(&[]);
        let arc_record = record!(Arc, "ARC~1~1~S$9~M4050,3060 A10,10 0 0 1 4060,3050~~gge8~0");
        let nodes = arc(&mut ctx, &arc_record, &Scope::BOARD);
        assert_eq!(render(&nodes).len(), 1);
        assert_eq!(ctx.diagnostics.count(), 1);
        assert!(ctx.diagnostics.messages()[0].text.starts_with("Warning: Found arc (gge8)"));
    }

    #[test]
    fn test_invalid_arc_path() {
        let mut ctx = board_ctx(&[]);
        let arc_record = record!(Arc, "ARC~1~3~~M4050,3060 L10,10~~gge9~0");
        assert!(arc(&mut ctx, &arc_record, &Scope::BOARD).is_empty());
        let message = &ctx.diagnostics.messages()[0];
        assert!(message.text.starts_with("Error: invalid arc\npath: M4050,3060 L10,10\n"));
    }

    #[test]
    fn test_circle_and_rect() {
        let mut ctx = board_ctx(&[]);
        let circle_record = record!(Circle, "CIRCLE~4000~3000~12.4~1~3~gge635~0~");
        assert_eq!(
            render(&circle(&mut ctx, &circle_record, &Scope::BOARD)),
            ["(gr_circle (center 0 0) (end 3.15 0) (layer \"F.SilkS\") (width 0.254))"]
        );
        let rect_record = record!(Rect, "RECT~4000~3000~50~10~3~gge535~0~");
        assert_eq!(
            render(&rect(&mut ctx, &rect_record, &Scope::BOARD)),
            ["(gr_rect (start 0 0) (end 12.7 2.54) (layer \"F.SilkS\") (width 0.1) (fill solid))"]
        );
    }

    #[test]
    fn test_rect_in_rotated_footprint() {
        let mut ctx = board_ctx(&[]);
        let rect_record = record!(Rect, "RECT~4010~3000~20~10~3~gge9~0~");
        let quarter = Scope::footprint(Frame::placed_at(4000.0, 3000.0, 90.0), "gge12");
        // both corners turn with the footprint
        assert_eq!(
            render(&rect(&mut ctx, &rect_record, &quarter)),
            ["(fp_rect (start 0 2.54) (end -2.54 7.62) (layer \"F.SilkS\") (width 0.1) (fill solid))"]
        );
        let slanted = Scope::footprint(Frame::placed_at(4000.0, 3000.0, 45.0), "gge12");
        assert_eq!(
            render(&rect(&mut ctx, &rect_record, &slanted)),
            ["(fp_poly (pts (xy 1.796 1.796) (xy 0 3.592) (xy 3.592 7.184) (xy 5.388 5.388)) \
              (layer \"F.SilkS\") (width 0.1) (fill solid))"]
        );
        assert_eq!(ctx.diagnostics.count(), 0);
    }

    #[test]
    fn test_copper_rect_with_net_becomes_zone() {
        let mut ctx = board_ctx(&["GND"]);
        let rect_record = record!(Rect, "RECT~4072.953~3480.854~5.709~7.087~2~gge5971~0~0~~~Q4_8");
        assert_eq!(
            render(&rect(&mut ctx, &rect_record, &Scope::BOARD)),
            ["(zone (net 2) (net_name \"Q4_8\") (layer \"B.Cu\") (name gge5971) (hatch edge 0.508) \
              (priority 1) (connect_pads yes (clearance 0)) (fill yes (thermal_gap 0) (thermal_bridge_width 0.254)) \
              (polygon (pts (xy 18.53 122.137) (xy 18.53 123.937) (xy 19.98 123.937) (xy 19.98 122.137) (xy 18.53 122.137))))"]
        );
        assert_eq!(ctx.cu_zone_count, 1);
    }

    const OUTLINE: &str = "M 4050 3050 L 4164 3050 L 4160 3120 L4050,3100 Z";
    const OUTLINE_PTS: &str =
        "(pts (xy 12.7 12.7) (xy 41.656 12.7) (xy 40.64 30.48) (xy 12.7 25.4))";

    #[test]
    fn test_copper_area() {
        let mut ctx = board_ctx(&["GND"]);
        let area = record!(
            CopperArea,
            &format!("COPPERAREA~1~2~GND~{OUTLINE}~1~solid~gge221~spoke~none~~0~~2~1~1~0~yes")
        );
        assert_eq!(
            render(&copper_area(&mut ctx, &area)),
            [format!(
                "(zone (net 1) (net_name \"GND\") (layer \"B.Cu\") (hatch edge 0.508) (priority 0) \
                 (connect_pads (clearance 0.254)) (fill yes (thermal_gap 0.254) (thermal_bridge_width 0.254)) \
                 (polygon {OUTLINE_PTS}))"
            )]
        );
        assert_eq!(ctx.cu_zone_count, 1);
    }

    #[test]
    fn test_hatched_copper_area() {
        let mut ctx = board_ctx(&["GND"]);
        let area = record!(
            CopperArea,
            &format!("COPPERAREA~1~2~V+~{OUTLINE}~1~grid~gge222~spoke~none~~0~power+~1~1~2~0~yes")
        );
        assert_eq!(
            render(&copper_area(&mut ctx, &area)),
            [format!(
                "(zone (net 2) (net_name \"V+\") (layer \"B.Cu\") (name \"power+\") (hatch edge 0.508) (priority 1) \
                 (connect_pads (clearance 0.254)) (fill yes (mode hatch) (thermal_gap 0.254) (thermal_bridge_width 0.254) \
                 (hatch_thickness 0.254) (hatch_gap 0.508) (hatch_orientation 0)) (polygon {OUTLINE_PTS}))"
            )]
        );
    }

    #[test]
    fn test_unfilled_copper_area_reports() {
        let mut ctx = board_ctx(&["GND"]);
        let area = record!(
            CopperArea,
            &format!("COPPERAREA~1~2~GND~{OUTLINE}~1~none~gge223~spoke~none")
        );
        assert!(copper_area(&mut ctx, &area).is_empty());
        assert_eq!(ctx.cu_zone_count, 0);
        assert_eq!(ctx.diagnostics.count(), 1);
    }

    #[test]
    fn test_solid_regions() {
        let cases = [
            (
                "1~~{OUTLINE}~cutout~gge1953",
                format!(
                    "(zone (net 0) (net_name \"\") (hatch edge 0.508) (layer \"F.Cu\") (name gge1953) \
                     (keepout (tracks allowed) (vias allowed) (pads allowed) (copperpour not_allowed) (footprints allowed)) \
                     (polygon {OUTLINE_PTS}))"
                ),
            ),
            (
                "2~GND~{OUTLINE}~solid~gge1953",
                format!(
                    "(zone (net 1) (net_name \"GND\") (layer \"B.Cu\") (hatch edge 0.508) (priority 1) \
                     (connect_pads yes (clearance 0)) (fill yes (thermal_gap 0) (thermal_bridge_width 0.254)) \
                     (polygon {OUTLINE_PTS}))"
                ),
            ),
            (
                "2~~{OUTLINE}~solid~gge1953",
                format!("(gr_poly {OUTLINE_PTS} (layer \"B.Cu\") (width 0) (fill solid))"),
            ),
            (
                "11~~{OUTLINE}~npth~gge1953",
                format!("(gr_poly {OUTLINE_PTS} (layer \"Edge.Cuts\") (width 0.254))"),
            ),
        ];
        for (fields, expected) in cases {
            let mut ctx = board_ctx(&["GND"]);
            let input = format!("SOLIDREGION~{}~~~~0", fields.replace("{OUTLINE}", OUTLINE));
            let region = record!(SolidRegion, &input);
            assert_eq!(render(&solid_region(&mut ctx, &region)), [expected]);
            assert_eq!(ctx.diagnostics.count(), 0);
        }
    }

    #[test]
    fn test_solid_region_rejections() {
        let mut ctx = board_ctx(&[]);
        for input in [
            "SOLIDREGION~1~~M 4367 3248 A 33.8 33.8 0 1 0 4366.99 3248 Z ~cutout~gge1953~~~~0",
            "SOLIDREGION~1~~M 4050 3050 L 4164 3050 L 4160 3120 Z~none~gge1953~~~~0",
            "SOLIDREGION~1~~M 4050 3050 L 4164 3050 L 4160 3120 Z~~gge1953~~~~0",
        ] {
            let region = record!(SolidRegion, input);
            assert!(solid_region(&mut ctx, &region).is_empty());
        }
        assert_eq!(ctx.diagnostics.count(), 3);
        assert_eq!(ctx.keepout_zone_count, 0);
    }

    #[test]
    fn test_mounting_hole() {
        let hole_record = record!(Hole, "HOLE~4475.5~3170.5~2.9528~gge1205~1");
        assert_eq!(
            render(&hole(&hole_record)),
            ["(footprint \"AutoGenerated:MountingHole_1.50mm\" locked (layer \"F.Cu\") (at 120.777 43.307) \
              (attr virtual) (fp_text reference \"\" (at 0 0) (layer \"F.SilkS\")) \
              (fp_text value \"\" (at 0 0) (layer \"F.SilkS\")) \
              (pad \"\" np_thru_hole circle (at 0 0) (size 1.5 1.5) (drill 1.5) (layers \"*.Cu\" \"*.Mask\")))"]
        );
    }

    #[test]
    fn test_plated_board_pad() {
        let mut ctx = board_ctx(&["VCC"]);
        let pad_record = record!(
            Pad,
            "PAD~ELLIPSE~4150~3071.5~6~6~11~VCC~1~1.8~~0~gge196~0~~Y~0~~~4150,3071.5"
        );
        assert_eq!(
            render(&board_pad(&mut ctx, &pad_record)),
            ["(footprint \"AutoGenerated:TH_pad_gge196\" (layer \"F.Cu\") (at 38.1 18.161) \
              (attr through_hole board_only exclude_from_pos_files exclude_from_bom) \
              (fp_text reference gge196 (at 0 0) (layer \"F.SilkS\") hide) \
              (fp_text value \"hole_0.91_mm\" (at 0 0) (layer \"F.SilkS\") hide) \
              (pad 1 thru_hole circle (at 0 0 0) (size 1.524 1.524) (layers \"*.Cu\" \"*.Paste\" \"*.Mask\") \
              (drill 0.914) (net 1 \"VCC\")))"]
        );
        assert_eq!(ctx.diagnostics.count(), 0);
    }

    #[test]
    fn test_unplated_and_smd_board_pads() {
        let mut ctx = board_ctx(&["VCC"]);
        let npth = record!(
            Pad,
            "PAD~ELLIPSE~4150~3071.5~6~6~11~~1~1.8~~0~gge196~0~~N~0~~~4150,3071.5"
        );
        let text = render(&board_pad(&mut ctx, &npth)).join("");
        assert!(text.starts_with("(footprint \"AutoGenerated:NPTH_pad_gge196\""));
        assert!(text.contains("(attr board_only exclude_from_pos_files exclude_from_bom)"));
        assert!(text.contains(
            "(pad 1 np_thru_hole circle (at 0 0 0) (size 1.524 1.524) (layers \"F&B.Cu\" \"*.Mask\") (drill 0.914))"
        ));

        let smd = record!(
            Pad,
            "PAD~RECT~4150~3071.5~6~6~1~VCC~1~1.8~~0~gge196~0~~Y~0~~~4150,3071.5"
        );
        let text = render(&board_pad(&mut ctx, &smd)).join("");
        assert!(text.contains("(attr smd board_only exclude_from_pos_files exclude_from_bom)"));
        assert!(text.contains("(fp_text value \"\" (at 0 0) (layer \"F.SilkS\") hide)"));
        assert!(text.contains(
            "(pad 1 smd rect (at 0 0 0) (size 1.524 1.524) (layers \"F.Cu\" \"F.Paste\" \"F.Mask\") (net 1 \"VCC\"))"
        ));
        assert_eq!(ctx.diagnostics.count(), 0);
    }

    #[test]
    fn test_pad_in_rotated_footprint() {
        let mut ctx = board_ctx(&[]);
        let scope = Scope::footprint(Frame::placed_at(4228.0, 3187.5, -90.0), "gge12");
        let pad_record = record!(
            Pad,
            "PAD~ELLIPSE~4010~3029~4~4~11~~4~1.5~~270~gge181~0~~Y~0~0~0.4~4010.05,3029.95"
        );
        assert_eq!(
            render(&pad(&mut ctx, &pad_record, &scope, false)),
            ["(pad 4 thru_hole circle (at -40.259 55.372 -90) (size 1.016 1.016) \
              (layers \"*.Cu\" \"*.Paste\" \"*.Mask\") (drill 0.762))"]
        );
        // the hole sits 0.95 units off the pad center
        assert_eq!(
            ctx.diagnostics.messages()[0].text,
            "Warning: hole in pad may be misplaced for PAD 4 (gge181) of gge12"
        );
    }

    #[test]
    fn test_polygon_pad() {
        let mut ctx = board_ctx(&["GND"]);
        let scope = Scope::footprint(Frame::placed_at(612.25, 388.7, 0.0), "rep30");
        let pad_record = record!(
            Pad,
            "PAD~POLYGON~613.999~396.939~3.9399~3.14~1~GND~1~0~612.03 398.51 612.03 395.37 615.97 398.51~90~rep28~0~~Y~0~0~0.4~613.999,396.939"
        );
        assert_eq!(
            render(&pad(&mut ctx, &pad_record, &scope, false)),
            ["(pad 1 smd custom (at 0.444 2.093 90) (size 0.025 0.025) (layers \"F.Cu\" \"F.Paste\" \"F.Mask\") \
              (net 1 \"GND\") (primitives (gr_poly (pts (xy -0.399 -0.5) (xy 0.399 -0.5) (xy -0.399 0.501)) (width 0.1))))"]
        );
    }

    #[test]
    fn test_rectangular_polygon_pad() {
        let mut ctx = board_ctx(&["SYNC-OUT"]);
        let scope = Scope::footprint(Frame::placed_at(585.7, 338.9, 90.0), "gge35720");
        let pad_record = record!(
            Pad,
            "PAD~POLYGON~593.939~338.901~0~0~1~SYNC-OUT~1~0~595.51 340.87 592.37 340.87 592.37 336.93 595.51 336.93~180~gge35721~0~~Y~0~0~0.4~593.939,338.901"
        );
        assert_eq!(
            render(&pad(&mut ctx, &pad_record, &scope, false)),
            ["(pad 1 smd rect (at 0 2.093 180) (size 0.798 1.001) (layers \"F.Cu\" \"F.Paste\" \"F.Mask\") (net 1 \"SYNC-OUT\"))"]
        );
    }

    #[test]
    fn test_drill_shapes() {
        assert_eq!(drill(0.0, 0.0, 1.0, 1.0), None);
        assert_eq!(drill(0.5, 0.0, 1.0, 1.0), Some(list!["drill", 1.0]));
        assert_eq!(
            drill(0.5, 2.0, 1.0, 3.0),
            Some(list!["drill", "oval", 1.0, 2.0])
        );
        assert_eq!(
            drill(0.5, 2.0, 3.0, 1.0),
            Some(list!["drill", "oval", 2.0, 1.0])
        );
    }

    #[test]
    fn test_rectangle_detection() {
        assert!(is_rectangle(&[0.0, 0.0, 0.0, 2.0, 3.0, 2.0, 3.0, 0.0]));
        assert!(is_rectangle(&[0.0, 0.0, 3.0, 0.0, 3.0, 2.0, 0.0, 2.0]));
        assert!(!is_rectangle(&[0.0, 0.0, 3.0, 0.0, 2.0, 2.0, 0.0, 2.0]));
        assert!(!is_rectangle(&[0.0, 0.0, 3.0, 0.0, 3.0, 2.0]));
        assert_eq!(rectangle_size(&[0.0, 0.0, 3.0, 0.0, 3.0, 2.0, 0.0, 2.0], 0.0), (3.0, 2.0));
        assert_eq!(rectangle_size(&[0.0, 0.0, 3.0, 0.0, 3.0, 2.0, 0.0, 2.0], 270.0), (2.0, 3.0));
    }

    #[test]
    fn test_footprint_vias() {
        let mut ctx = board_ctx(&["GND"]);
        let scope = Scope::footprint(Frame::placed_at(585.7, 338.9, 90.0), "gge35720");
        let netless = record!(Via, "VIA~4826.69~2924.02~5.9055~~2.55905~gge3995~");
        let result = footprint_via(&mut ctx, &netless, &scope, false);
        assert_eq!(
            render(&result.hole),
            ["(pad \"\" np_thru_hole circle (at -656.62 1077.211) (size 1.3 1.3) (drill 1.3) (layers \"*.Cu\" \"*.Mask\"))"]
        );
        assert!(result.board_via.is_empty());

        let with_net = record!(Via, "VIA~4826.69~2924.02~5.9055~GND~2.55905~gge3995~");
        let result = footprint_via(&mut ctx, &with_net, &scope, false);
        assert!(result.hole.is_empty());
        assert_eq!(
            render(&result.board_via),
            ["(via (at 209.979 -19.299) (size 1.5) (drill 1.3) (layers \"F.Cu\" \"B.Cu\") (net 1))"]
        );
        assert_eq!(ctx.diagnostics.count(), 1);

        let dropped = footprint_via(&mut ctx, &with_net, &scope, true);
        assert!(dropped.hole.is_empty() && dropped.board_via.is_empty());
        assert_eq!(ctx.diagnostics.count(), 2);
    }

    #[test]
    fn test_footprint_polygon() {
        let mut ctx = board_ctx(&[]);
        let scope = Scope::footprint(Frame::placed_at(4401.0, 3164.0, 0.0), "gge846");
        let region = record!(
            SolidRegion,
            "SOLIDREGION~3~~M 4400.3 3160.5 L 4401.8 3160.5 L 4399.1 3165.8 Z ~solid~gge849~~~~0"
        );
        assert_eq!(
            render(&footprint_polygon(&mut ctx, &region, &scope)),
            ["(fp_poly (pts (xy -0.178 -0.889) (xy 0.203 -0.889) (xy -0.483 0.457)) (layer \"F.SilkS\") (width 0))"]
        );
        let with_arc = record!(
            SolidRegion,
            "SOLIDREGION~3~~M 4513.5 3294 A 12.125 12.125 0 0 1 4495.5 3294 Z ~solid~gge636~~~~0"
        );
        assert!(footprint_polygon(&mut ctx, &with_arc, &scope).is_empty());
        assert_eq!(ctx.diagnostics.count(), 1);
    }
}
