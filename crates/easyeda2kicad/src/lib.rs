pub mod arc;
pub mod context;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod options;
pub mod records;
pub mod registry;
pub mod sexpr;
pub mod transform;
pub mod types;
pub mod units;

use error::ConvertError;
use options::ConvertOptions;
use serde_json::Value;
use sexpr::{encode, encode_pretty, Node};
use std::path::Path;
use std::str::FromStr;
use types::{BoardDocument, FootprintDocument, SchematicDocument, SymbolDocument};

pub use convert::{
    convert_board, convert_footprint, convert_schematic, convert_symbol_library, ConvertedFootprint,
    ConvertedSchematic, ConvertedSymbol,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Board,
    Footprint,
    SymbolLibrary,
    Schematic,
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "board" | "pcb" => Ok(DocumentKind::Board),
            "footprint" | "fp" => Ok(DocumentKind::Footprint),
            "symbol" | "sym" => Ok(DocumentKind::SymbolLibrary),
            "schematic" | "sch" => Ok(DocumentKind::Schematic),
            _ => Err(format!(
                "Unknown document kind: {s}. Use: board, footprint, symbol, schematic"
            )),
        }
    }
}

/// Detect the document kind from `head.docType`, falling back to the
/// sections only one of the kinds carries.
pub fn detect_kind(json: &Value) -> Result<DocumentKind, ConvertError> {
    let head = json.get("head");
    let doc_type = head.and_then(|h| h.get("docType")).map(|t| match t {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    });
    match doc_type.as_deref() {
        Some("1") => return Ok(DocumentKind::Schematic),
        Some("2") => return Ok(DocumentKind::SymbolLibrary),
        Some("3") => return Ok(DocumentKind::Board),
        Some("4") => return Ok(DocumentKind::Footprint),
        _ => {}
    }
    if json.get("schematics").is_some() {
        return Ok(DocumentKind::Schematic);
    }
    if json.get("routerRule").is_some() || json.get("canvas").is_some() {
        return Ok(DocumentKind::Board);
    }
    if head.and_then(|h| h.get("c_para")).is_some() {
        // symbols are the documents drawing pins
        let has_pins = json
            .get("shape")
            .and_then(Value::as_array)
            .is_some_and(|shapes| shapes.iter().filter_map(Value::as_str).any(|s| s.starts_with("P~")));
        let has_package = head
            .and_then(|h| h.get("c_para"))
            .and_then(|c| c.get("package"))
            .is_some();
        if has_pins {
            return Ok(DocumentKind::SymbolLibrary);
        }
        if has_package {
            return Ok(DocumentKind::Footprint);
        }
    }
    Err(ConvertError::UnsupportedDocument(match doc_type {
        Some(t) => format!("docType {t}"),
        None => "no docType in document head".to_string(),
    }))
}

/// Result of a conversion.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    pub kind: DocumentKind,
    /// Suggested output file name; set for footprints and symbol libraries.
    pub name: Option<String>,
    pub tree: Node,
}

impl ConvertedDocument {
    pub fn to_text(&self, pretty: bool) -> String {
        if pretty {
            encode_pretty(&self.tree)
        } else {
            encode(&self.tree)
        }
    }
}

/// Read and convert a document file.
pub fn convert(path: &Path, opts: &ConvertOptions) -> Result<ConvertedDocument, ConvertError> {
    let data = std::fs::read(path)?;
    convert_bytes(&data, None, opts)
}

/// Convert an EasyEDA JSON document. The kind is detected when not given.
pub fn convert_bytes(
    data: &[u8],
    kind: Option<DocumentKind>,
    opts: &ConvertOptions,
) -> Result<ConvertedDocument, ConvertError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| ConvertError::ParseError(format!("invalid UTF-8: {e}")))?;
    let json: Value = serde_json::from_str(text)?;
    let kind = match kind {
        Some(kind) => kind,
        None => detect_kind(&json)?,
    };
    match kind {
        DocumentKind::Board => {
            let doc: BoardDocument = serde_json::from_value(json)?;
            Ok(ConvertedDocument {
                kind,
                name: None,
                tree: convert_board(&doc, opts.clone()),
            })
        }
        DocumentKind::Footprint => {
            let doc: FootprintDocument = serde_json::from_value(json)?;
            let footprint = convert_footprint(&doc, opts.clone());
            Ok(ConvertedDocument {
                kind,
                name: Some(footprint.file_name()),
                tree: footprint.tree,
            })
        }
        DocumentKind::SymbolLibrary => {
            let doc: SymbolDocument = serde_json::from_value(json)?;
            let symbol = convert_symbol_library(&doc, opts.clone());
            Ok(ConvertedDocument {
                kind,
                name: Some(symbol.file_name()),
                tree: symbol.tree,
            })
        }
        DocumentKind::Schematic => {
            let doc: SchematicDocument = serde_json::from_value(json)?;
            let sheet = convert::select_sheet(doc, opts.sheet)?;
            Ok(ConvertedDocument {
                kind,
                name: None,
                tree: convert_schematic(&sheet, opts.clone()).tree,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_kind() {
        let kind = |v: Value| detect_kind(&v).ok();
        assert_eq!(kind(json!({"head": {"docType": "3"}})), Some(DocumentKind::Board));
        assert_eq!(kind(json!({"head": {"docType": 4}})), Some(DocumentKind::Footprint));
        assert_eq!(kind(json!({"routerRule": {"nets": []}})), Some(DocumentKind::Board));
        assert_eq!(
            kind(json!({"head": {"c_para": {"package": "0603"}}})),
            Some(DocumentKind::Footprint)
        );
        assert_eq!(kind(json!({"head": {"docType": "1"}})), Some(DocumentKind::Schematic));
        assert_eq!(kind(json!({"head": {"docType": 2}})), Some(DocumentKind::SymbolLibrary));
        assert_eq!(kind(json!({"schematics": []})), Some(DocumentKind::Schematic));
        assert_eq!(
            kind(json!({"head": {"c_para": {"name": "LM358"}}, "shape": ["P~show~0~1~0~0~~gge1~0"]})),
            Some(DocumentKind::SymbolLibrary)
        );
        assert!(matches!(
            detect_kind(&json!({"head": {"docType": "7"}})),
            Err(ConvertError::UnsupportedDocument(_))
        ));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Board".parse::<DocumentKind>(), Ok(DocumentKind::Board));
        assert_eq!("footprint".parse::<DocumentKind>(), Ok(DocumentKind::Footprint));
        assert_eq!("sym".parse::<DocumentKind>(), Ok(DocumentKind::SymbolLibrary));
        assert_eq!("Schematic".parse::<DocumentKind>(), Ok(DocumentKind::Schematic));
        assert!("netlist".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_convert_footprint_bytes() {
        let data = br#"{"head": {"docType": "4", "x": 4000, "y": 3000, "c_para": {"package": "R/0603"}},
                        "shape": ["TRACK~1~3~~3990 3000 4010 3000~gge1~0"]}"#;
        let doc = convert_bytes(data, None, &ConvertOptions::default()).unwrap();
        assert_eq!(doc.kind, DocumentKind::Footprint);
        assert_eq!(doc.name.as_deref(), Some("Rx0603.kicad_mod"));
        assert!(doc.to_text(false).starts_with("(footprint \"Rx0603\" (version 20210220)"));
    }

    #[test]
    fn test_convert_schematic_bytes() {
        let data = br#"{"head": {"docType": "1"}, "schematics": [
                        {"title": "main", "dataStr": {"shape": ["O~270~-495~gge467~M 266 -499 L 274 -491~#33cc33~0"]}}]}"#;
        let mut opts = ConvertOptions::default();
        let doc = convert_bytes(data, None, &opts).unwrap();
        assert_eq!(doc.kind, DocumentKind::Schematic);
        assert_eq!(doc.name, None);
        assert!(doc.to_text(false).contains("(no_connect (at 68.58 -125.73))"));

        opts.sheet = 2;
        assert!(matches!(
            convert_bytes(data, None, &opts),
            Err(ConvertError::SheetOutOfRange {
                requested: 2,
                available: 1
            })
        ));
    }

    #[test]
    fn test_invalid_input() {
        let opts = ConvertOptions::default();
        assert!(matches!(
            convert_bytes(b"\xff\xfe", None, &opts),
            Err(ConvertError::ParseError(_))
        ));
        assert!(matches!(
            convert_bytes(b"{not json", None, &opts),
            Err(ConvertError::Json(_))
        ));
        assert!(matches!(
            convert_bytes(br#"{"shape": []}"#, None, &opts),
            Err(ConvertError::UnsupportedDocument(_))
        ));
    }
}
