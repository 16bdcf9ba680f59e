use clap::Parser;
use easyeda2kicad::error::ConvertError;
use easyeda2kicad::options::{ArcSnapPolicy, ConvertOptions};
use easyeda2kicad::{convert_bytes, DocumentKind};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "easyeda2kicad",
    about = "Convert EasyEDA boards, footprints, symbols and schematics to KiCad 6"
)]
struct Cli {
    /// Input EasyEDA JSON file
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override auto-detected document kind (board, footprint, symbol, schematic)
    #[arg(short, long)]
    kind: Option<String>,

    /// Write the single-line form instead of the indented one
    #[arg(long)]
    compact: bool,

    /// JSON file with conversion options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep board outline coordinates unrounded
    #[arg(long)]
    no_edge_rounding: bool,

    /// Keep board outline arc angles as computed
    #[arg(long)]
    no_arc_snap: bool,

    /// Sheet of a multi-sheet schematic to convert, counted from 1
    #[arg(long, value_name = "N")]
    sheet: Option<usize>,
}

fn load_options(path: &Path) -> Result<ConvertOptions, ConvertError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut opts = match &cli.config {
        Some(path) => match load_options(path) {
            Ok(opts) => opts,
            Err(e) => {
                eprintln!("Error reading config {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => ConvertOptions::default(),
    };
    if cli.no_edge_rounding {
        opts.round_edge_cuts = false;
    }
    if cli.no_arc_snap {
        opts.arc_snap = ArcSnapPolicy::disabled();
    }
    if let Some(sheet) = cli.sheet {
        opts.sheet = sheet;
    }

    let kind = match cli.kind.as_deref().map(str::parse::<DocumentKind>) {
        Some(Ok(kind)) => Some(kind),
        Some(Err(e)) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        None => None,
    };
    let data = match std::fs::read(&cli.input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading file: {e}");
            std::process::exit(1);
        }
    };

    match convert_bytes(&data, kind, &opts) {
        Ok(doc) => {
            let text = doc.to_text(!cli.compact);
            if let Some(output_path) = cli.output {
                if let Err(e) = std::fs::write(&output_path, &text) {
                    eprintln!("Error writing {}: {e}", output_path.display());
                    std::process::exit(1);
                }
                eprintln!("Written to {}", output_path.display());
            } else {
                println!("{text}");
            }
            if let Some(name) = &doc.name {
                eprintln!("Suggested file name: {name}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
