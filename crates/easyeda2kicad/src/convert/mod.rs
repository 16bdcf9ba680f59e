//! Shape dispatch and document assembly.

pub mod board;
pub mod footprint;
pub mod schematic;
pub mod shapes;
pub mod symbol;

pub use board::convert_board;
pub use footprint::{convert_footprint, ConvertedFootprint};
pub use schematic::{convert_schematic, select_sheet, ConvertedSchematic};
pub use shapes::Scope;
pub use symbol::{convert_symbol_library, ConvertedSymbol};
