//! Input documents as exported by the EasyEDA editor.
//!
//! Only the fields the converter reads are modelled; anything else in the
//! JSON is ignored.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A head field. Older editor versions write numbers, newer ones strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Num(f64),
    Str(String),
    Bool(bool),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Num(v) => Some(*v),
            Scalar::Str(s) => s.trim().parse::<f64>().ok(),
            Scalar::Bool(_) => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn to_text(&self) -> String {
        match self {
            Scalar::Num(v) => format!("{v}"),
            Scalar::Str(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

// ─── Documents ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentHead {
    #[serde(rename = "docType")]
    pub doc_type: Option<Scalar>,
    pub x: Option<Scalar>,
    pub y: Option<Scalar>,
    pub rotation: Option<Scalar>,
    /// Document properties such as `package` and `link`.
    pub c_para: BTreeMap<String, Scalar>,
}

impl DocumentHead {
    pub fn param(&self, key: &str) -> Option<String> {
        self.c_para.get(key).map(Scalar::to_text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouterRule {
    pub nets: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoardDocument {
    pub head: DocumentHead,
    pub canvas: String,
    pub shape: Vec<String>,
    #[serde(rename = "routerRule")]
    pub router_rule: Option<RouterRule>,
}

impl BoardDocument {
    /// Net names declared by the router rules, in declaration order.
    pub fn nets(&self) -> &[String] {
        self.router_rule
            .as_ref()
            .map(|rule| rule.nets.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FootprintDocument {
    pub head: DocumentHead,
    pub shape: Vec<String>,
}

/// Symbol library document (`docType` 2): one symbol drawn around the
/// head position.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SymbolDocument {
    pub head: DocumentHead,
    pub shape: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchematicSheet {
    pub head: DocumentHead,
    pub shape: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchematicEntry {
    pub title: String,
    #[serde(rename = "dataStr")]
    pub data_str: SchematicSheet,
}

/// Schematic document (`docType` 1). Exports from the editor wrap their
/// sheets in `schematics`; a bare sheet is its own single sheet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchematicDocument {
    pub head: DocumentHead,
    pub shape: Vec<String>,
    pub schematics: Vec<SchematicEntry>,
}

impl SchematicDocument {
    pub fn into_sheets(self) -> Vec<SchematicSheet> {
        if self.schematics.is_empty() {
            vec![SchematicSheet {
                head: self.head,
                shape: self.shape,
            }]
        } else {
            self.schematics.into_iter().map(|entry| entry.data_str).collect()
        }
    }
}
