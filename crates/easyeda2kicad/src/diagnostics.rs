//! Conversion remarks embedded in the output as numbered text items.
//!
//! Board documents stack the remarks on `Cmts.User` left of the design;
//! footprint files place them below the footprint origin with tighter
//! spacing. Symbols and schematic sheets get plain text items stacked
//! from the origin away from the drawing.

use log::warn;

use crate::list;
use crate::sexpr::{Node, BR, BR1, BR3};

/// Line pitch of symbol and sheet remarks, one grid step.
const SYMBOL_PITCH: f64 = 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Board,
    Footprint,
    /// Inside the text unit of a library symbol.
    Symbol,
    /// On a schematic sheet.
    Sheet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub number: usize,
    pub text: String,
    /// Vertical position of the text item in millimetres.
    pub y: f64,
}

impl Diagnostic {
    fn label(&self) -> String {
        format!("#{}: {}", self.number, self.text)
    }

    pub fn to_node(&self, placement: Placement) -> Node {
        match placement {
            Placement::Board => list![
                "gr_text",
                self.label(),
                list!["at", -200, self.y, 0],
                list!["layer", "Cmts.User"],
                list![
                    "effects",
                    list!["font", list!["size", 2, 2], list!["thickness", 0.4]],
                    list!["justify", "left"],
                ],
            ],
            Placement::Footprint => list![
                "fp_text",
                "user",
                self.label(),
                list!["at", 0, self.y, 0],
                list!["layer", "Cmts.User"],
                list![
                    "effects",
                    list!["font", list!["size", 0.8, 0.8], list!["thickness", 0.2]],
                ],
            ],
            Placement::Symbol | Placement::Sheet => list![
                "text",
                self.label(),
                list!["at", 0, self.y, 0],
                list![
                    "effects",
                    list!["font", list!["size", 1.27, 1.27]],
                    list!["justify", "left"],
                ],
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    placement: Placement,
    cursor: f64,
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            cursor: 0.0,
            messages: Vec::new(),
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Record a remark spanning `lines` text lines.
    ///
    /// Always returns an empty fragment so converters can hand the result
    /// back in place of the geometry they could not produce.
    pub fn report(&mut self, text: impl Into<String>, lines: u32) -> Vec<Node> {
        let lines = f64::from(lines.max(1));
        let y = match self.placement {
            Placement::Board => {
                let y = self.cursor + lines * 1.8 + 1.8;
                self.cursor = y + (lines - 1.0) * 1.8;
                y
            }
            Placement::Footprint => {
                let y = self.cursor + lines + 1.0;
                self.cursor = y + (lines - 1.0);
                y
            }
            // stacked downwards in the symbol's y-up frame, upwards on a sheet
            Placement::Symbol | Placement::Sheet => {
                let y = self.cursor + (lines + 1.0) * SYMBOL_PITCH;
                self.cursor = y + (lines - 1.0) * SYMBOL_PITCH;
                -y
            }
        };
        let diagnostic = Diagnostic {
            number: self.messages.len() + 1,
            text: text.into(),
            y,
        };
        warn!("{}", diagnostic.label());
        self.messages.push(diagnostic);
        Vec::new()
    }

    pub fn count(&self) -> usize {
        self.messages.len()
    }

    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// All remarks as text items, each preceded by a line break.
    pub fn nodes(&self) -> Vec<Node> {
        let br = match self.placement {
            Placement::Board | Placement::Sheet => BR,
            Placement::Footprint => BR1,
            Placement::Symbol => BR3,
        };
        self.messages
            .iter()
            .flat_map(|m| [br.clone(), m.to_node(self.placement)])
            .collect()
    }
}
