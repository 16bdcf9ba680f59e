//! Board assembly.

use log::{debug, warn};

use super::footprint::board_footprint;
use super::shapes::{self, Scope};
use crate::context::ConversionContext;
use crate::list;
use crate::options::ConvertOptions;
use crate::records::{RecordError, Shape};
use crate::registry::NetRegistry;
use crate::sexpr::{Node, BR};
use crate::types::BoardDocument;

const REMARKS_INFO: &str = "Info: below are the conversion remarks. The conversion may contain errors.\n\
    Please read the remarks carefully and run the DRC check to solve issues.\n\
    To find a component mentioned in the remarks go to:\n\
    Kicad menu Edit > Find and enter the EDA_id (gge....); search for other text items.\n\
    Only the id of the footprint can be found; the id of the shape is in the input json.\n\
    You can export the footprints to a library by Kicad menu File > Export > Export Fps to (new) Library";

/// Converted board shapes, grouped in output order.
#[derive(Debug, Default)]
struct Groups {
    footprints: Vec<Node>,
    tracks: Vec<Node>,
    copper_areas: Vec<Node>,
    solid_regions: Vec<Node>,
    arcs: Vec<Node>,
    rects: Vec<Node>,
    circles: Vec<Node>,
    holes: Vec<Node>,
    vias: Vec<Node>,
    pads: Vec<Node>,
    texts: Vec<Node>,
}

impl Groups {
    fn add(&mut self, ctx: &mut ConversionContext, record: &str) {
        let shape = match Shape::parse(record) {
            Ok(shape) => shape,
            Err(RecordError::Unsupported(kind)) => {
                let msg = format!("Warning: unsupported shape {kind} found on pcb board; ignored");
                ctx.report(msg, 1);
                return;
            }
            Err(e) => {
                ctx.report(format!("Error: {e}; shape ignored"), 1);
                return;
            }
        };
        debug!("converting {}", shape.kind());
        let board = Scope::BOARD;
        match &shape {
            Shape::Via(via) => self.vias.extend(shapes::via(ctx, via)),
            Shape::Track(track) => self.tracks.extend(shapes::track(ctx, track, &board)),
            Shape::Text(text) => self.texts.extend(shapes::text(ctx, text, &board)),
            Shape::Arc(arc) => self.arcs.extend(shapes::arc(ctx, arc, &board)),
            Shape::CopperArea(area) => self.copper_areas.extend(shapes::copper_area(ctx, area)),
            Shape::SolidRegion(region) => {
                self.solid_regions
                    .extend(shapes::solid_region(ctx, region))
            }
            Shape::Circle(circle) => self.circles.extend(shapes::circle(ctx, circle, &board)),
            Shape::Hole(hole) => self.holes.extend(shapes::hole(hole)),
            Shape::Lib(lib) => self.footprints.extend(board_footprint(ctx, lib)),
            Shape::Pad(pad) => self.pads.extend(shapes::board_pad(ctx, pad)),
            Shape::Rect(rect) => self.rects.extend(shapes::rect(ctx, rect, &board)),
            Shape::SvgNode => {}
        }
    }

    fn into_body(self) -> impl Iterator<Item = Node> {
        [
            self.footprints,
            self.tracks,
            self.copper_areas,
            self.solid_regions,
            self.arcs,
            self.rects,
            self.circles,
            self.holes,
            self.vias,
            self.pads,
            self.texts,
        ]
        .into_iter()
        .flatten()
    }
}

/// Convert a board document into a `kicad_pcb` tree.
///
/// Shapes that cannot be converted never fail the conversion; they are
/// reported as numbered remarks on `Cmts.User` at the end of the document.
pub fn convert_board(doc: &BoardDocument, options: ConvertOptions) -> Node {
    let nets = NetRegistry::from_names(doc.nets().iter().map(String::as_str));
    let mut ctx = ConversionContext::for_board(nets, options);
    ctx.report(REMARKS_INFO, 8);

    let mut groups = Groups::default();
    for record in &doc.shape {
        groups.add(&mut ctx, record);
    }

    if ctx.cu_zone_count > 0 {
        let msg = format!(
            "Info: total of {} Cu zones were created. Run DRC to check for overlap of zones.\n\
             Adjust zone priority to solve this. Adjust other parameters as needed.\n\
             Note: merge zones if possible (right click selected 2 zones > Zones > Merge zones).",
            ctx.cu_zone_count
        );
        ctx.report(msg, 3);
    }
    if ctx.keepout_zone_count > 0 {
        let msg = format!(
            "Info: total of {} keep-out zones were create. Run DRC to check for zone settings.\n\
             Adjust zone keep-out checkboxes as needed.",
            ctx.keepout_zone_count
        );
        ctx.report(msg, 2);
    }
    let count = ctx.diagnostics.count();
    if count > 1 {
        warn!(
            "In total {count} messages were created during the conversion. \
             Check messages on pcb layer User.Cmts for more details."
        );
    }

    let mut items = vec![
        Node::from("kicad_pcb"),
        list!["version", 20210220],
        list!["generator", "pcbnew"],
        list!["general", list!["thickness", 1.6]],
        list!["paper", "A4"],
        BR,
        ctx.layers.declarations(),
        BR,
    ];
    items.extend(ctx.nets.declarations());
    items.extend(groups.into_body());
    items.extend(ctx.diagnostics.nodes());
    Node::List(items)
}
