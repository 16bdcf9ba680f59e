use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::list;
use crate::sexpr::{Node, BR, BR1};

/// Net names in output order. Index 0 is always the empty net.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetRegistry {
    names: Vec<String>,
}

impl Default for NetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NetRegistry {
    pub fn new() -> Self {
        Self {
            names: vec![String::new()],
        }
    }

    /// Seed from the net list of a board document. Empty names and repeats
    /// are skipped so the first occurrence keeps its index.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            let name = name.into();
            if !name.is_empty() && !registry.names.contains(&name) {
                registry.names.push(name);
            }
        }
        registry
    }

    /// Index of `name`, registering it when unseen. The empty name means
    /// "no net" and returns `None` without touching the registry.
    pub fn net_id(&mut self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        if let Some(index) = self.names.iter().position(|n| n == name) {
            return Some(index);
        }
        self.names.push(name.to_string());
        Some(self.names.len() - 1)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(net <index> <name>)` for every registered net.
    pub fn declarations(&self) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(self.names.len() * 2);
        for (index, name) in self.names.iter().enumerate() {
            nodes.push(list!["net", index, name]);
            nodes.push(BR);
        }
        nodes
    }
}

// ─── Layers ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("no layer id")]
    Missing,

    #[error("unsupported layer id: {0}")]
    Unsupported(i64),

    #[error("unknown layer id: {0}")]
    Unknown(String),
}

/// An output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Named(&'static str),
    /// Inner copper layer, numbered from 1.
    Inner(u8),
}

pub const EDGE_CUTS: &str = "Edge.Cuts";

impl Layer {
    pub fn name(&self) -> Cow<'static, str> {
        match self {
            Layer::Named(name) => Cow::Borrowed(name),
            Layer::Inner(n) => Cow::Owned(format!("In{n}.Cu")),
        }
    }

    pub fn is_copper(&self) -> bool {
        match self {
            Layer::Named(name) => name.ends_with(".Cu"),
            Layer::Inner(_) => true,
        }
    }

    /// The board outline layer.
    pub fn is_edge(&self) -> bool {
        *self == Layer::Named(EDGE_CUTS)
    }

    pub fn is_back(&self) -> bool {
        matches!(self, Layer::Named(name) if name.starts_with('B'))
    }

    /// Silkscreen layers map to the fabrication layer of the same side.
    pub fn silk_to_fab(self) -> Layer {
        match self {
            Layer::Named("F.SilkS") => Layer::Named("F.Fab"),
            Layer::Named("B.SilkS") => Layer::Named("B.Fab"),
            other => other,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<Layer> for Node {
    fn from(layer: Layer) -> Self {
        Node::Str(layer.name().into_owned())
    }
}

/// Source layer ids resolved so far, tracking the deepest inner layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerTable {
    max_inner: u8,
}

/// User layers declared after the copper stack: (ordinal, name, hidden).
const USER_LAYERS: [(u32, &str, bool); 18] = [
    (32, "B.Adhes", false),
    (33, "F.Adhes", false),
    (34, "B.Paste", false),
    (35, "F.Paste", false),
    (36, "B.SilkS", false),
    (37, "F.SilkS", false),
    (38, "B.Mask", false),
    (39, "F.Mask", false),
    (40, "Dwgs.User", false),
    (41, "Cmts.User", false),
    (42, "Eco1.User", false),
    (43, "Eco2.User", false),
    (44, "Edge.Cuts", false),
    (45, "Margin", false),
    (46, "B.CrtYd", false),
    (47, "F.CrtYd", false),
    (48, "B.Fab", true),
    (49, "F.Fab", true),
];

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_inner(&self) -> u8 {
        self.max_inner
    }

    /// Map a source layer id to its output layer.
    pub fn resolve(&mut self, id: &str) -> Result<Layer, LayerError> {
        let id = id.trim();
        let name = match id {
            "" | "0" => return Err(LayerError::Missing),
            "1" => "F.Cu",
            "2" => "B.Cu",
            "3" => "F.SilkS",
            "4" => "B.SilkS",
            "5" => "F.Paste",
            "6" => "B.Paste",
            "7" => "F.Mask",
            "8" => "B.Mask",
            // 11 is the multi-layer; solid regions on it are board cutouts
            "10" | "11" => EDGE_CUTS,
            "12" => "Cmts.User",
            "13" => "F.Fab",
            "14" => "B.Fab",
            "15" => "Dwgs.User",
            _ => {
                let number: i64 = id
                    .parse()
                    .map_err(|_| LayerError::Unknown(id.to_string()))?;
                return match number {
                    21..=50 => {
                        let inner = (number - 20) as u8;
                        self.max_inner = self.max_inner.max(inner);
                        Ok(Layer::Inner(inner))
                    }
                    99..=199 => Err(LayerError::Unsupported(number)),
                    _ => Err(LayerError::Unknown(id.to_string())),
                };
            }
        };
        Ok(Layer::Named(name))
    }

    /// The `(layers ...)` block: front copper, the inner layers seen, back
    /// copper and the fixed user layers.
    pub fn declarations(&self) -> Node {
        let mut items = vec![Node::from("layers"), BR1, list![0, "F.Cu", "signal"]];
        for n in 1..=u32::from(self.max_inner) {
            items.push(BR1);
            items.push(list![n, format!("In{n}.Cu"), "signal"]);
        }
        items.push(BR1);
        items.push(list![31, "B.Cu", "signal"]);
        for (ordinal, name, hidden) in USER_LAYERS {
            items.push(BR1);
            items.push(list![ordinal, name, "user", hidden.then_some(Node::from("hide"))]);
        }
        Node::List(items)
    }
}
