use serde::{Deserialize, Serialize};

/// Snapping of board-outline arc angles.
///
/// Outline arcs whose angle lies strictly within `window` degrees of one of
/// the `targets` are written with the exact target angle, so that KiCad can
/// close the outline loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSnapPolicy {
    pub targets: Vec<f64>,
    pub window: f64,
}

impl Default for ArcSnapPolicy {
    fn default() -> Self {
        Self {
            targets: vec![45.0, 90.0],
            window: 1.0,
        }
    }
}

impl ArcSnapPolicy {
    pub fn disabled() -> Self {
        Self {
            targets: Vec::new(),
            window: 0.0,
        }
    }

    pub fn snap(&self, angle: f64) -> f64 {
        self.targets
            .iter()
            .copied()
            .find(|target| (angle - target).abs() < self.window)
            .unwrap_or(angle)
    }
}

/// Tunables of a conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Round `Edge.Cuts` geometry to 0.1 mm.
    pub round_edge_cuts: bool,
    pub arc_snap: ArcSnapPolicy,
    /// Sheet of a schematic document to convert, counted from 1.
    pub sheet: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            round_edge_cuts: true,
            arc_snap: ArcSnapPolicy::default(),
            sheet: 1,
        }
    }
}
