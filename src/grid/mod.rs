pub mod hex;
mod layout;

pub use hex::{HexLayout, OffsetCoord, OffsetParity, PointF};
pub use layout::{GridCell, GridExtent, GridLayout, note_name};
