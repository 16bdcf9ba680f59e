use crate::diagnostics::{Diagnostics, Placement};
use crate::options::ConvertOptions;
use crate::registry::{Layer, LayerError, LayerTable, NetRegistry};
use crate::sexpr::Node;

/// Mutable state of one conversion run.
///
/// Every document conversion builds its own context; nothing is shared
/// between runs.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    pub nets: NetRegistry,
    pub layers: LayerTable,
    pub diagnostics: Diagnostics,
    pub options: ConvertOptions,
    pub cu_zone_count: usize,
    pub keepout_zone_count: usize,
}

impl ConversionContext {
    pub fn for_board(nets: NetRegistry, options: ConvertOptions) -> Self {
        Self::new(nets, Placement::Board, options)
    }

    pub fn for_footprint(options: ConvertOptions) -> Self {
        Self::new(NetRegistry::new(), Placement::Footprint, options)
    }

    pub fn for_symbol(options: ConvertOptions) -> Self {
        Self::new(NetRegistry::new(), Placement::Symbol, options)
    }

    pub fn for_sheet(options: ConvertOptions) -> Self {
        Self::new(NetRegistry::new(), Placement::Sheet, options)
    }

    fn new(nets: NetRegistry, placement: Placement, options: ConvertOptions) -> Self {
        Self {
            nets,
            layers: LayerTable::new(),
            diagnostics: Diagnostics::new(placement),
            options,
            cu_zone_count: 0,
            keepout_zone_count: 0,
        }
    }

    pub fn report(&mut self, text: impl Into<String>, lines: u32) -> Vec<Node> {
        self.diagnostics.report(text, lines)
    }

    pub fn net_id(&mut self, name: &str) -> Option<usize> {
        self.nets.net_id(name)
    }

    pub fn layer(&mut self, id: &str) -> Result<Layer, LayerError> {
        self.layers.resolve(id)
    }

    /// Whether coordinates on `layer` are rounded to 0.1 mm.
    pub fn rounds(&self, layer: Layer) -> bool {
        self.options.round_edge_cuts && layer.is_edge()
    }

    /// Outline arcs get their angle snapped; other layers keep it.
    pub fn arc_angle(&self, layer: Layer, angle: f64) -> f64 {
        if layer.is_edge() {
            self.options.arc_snap.snap(angle)
        } else {
            angle
        }
    }
}
