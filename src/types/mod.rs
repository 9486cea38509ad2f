//! Core chess types.
//!
//! - `Piece` and `Color` - chess piece types and colors
//! - `Square` - board square as (rank, file), indexed a1=0 .. h8=63

mod piece;
mod square;

pub use piece::{Color, Piece};
pub use square::Square;
