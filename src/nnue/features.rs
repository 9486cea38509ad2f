//! Input encoding.
//!
//! Twelve planes of 64 squares, relative to the side to move:
//! planes 0-5 hold the mover's pawn..king, planes 6-11 the opponent's.
//! Squares run a1=0 .. h8=63 within each plane.

use std::fmt;

use super::INPUT_SIZE;
use crate::position::Position;
use crate::types::{Color, Piece, Square};

/// Number of planes per side
const PLANES_PER_SIDE: usize = 6;

/// Binary network input, one entry per (plane, square).
#[derive(Clone, PartialEq, Eq)]
pub struct FeatureVector([u8; INPUT_SIZE]);

impl FeatureVector {
    /// All-zero vector
    #[must_use]
    pub const fn new() -> Self {
        FeatureVector([0; INPUT_SIZE])
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u8 {
        self.0[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        self.0[index] = 1;
    }

    pub fn clear(&mut self) {
        self.0 = [0; INPUT_SIZE];
    }

    /// Number of set entries
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.0.iter().filter(|&&v| v != 0).count()
    }

    /// Indices of set entries in ascending order
    pub fn active_features(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (v != 0).then_some(i))
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8; INPUT_SIZE] {
        &self.0
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.active_features()).finish()
    }
}

/// Feature index for `piece` of `color` on `square` when `side_to_move` is to play.
#[inline]
#[must_use]
pub fn feature_index(piece: Piece, color: Color, square: Square, side_to_move: Color) -> usize {
    let plane = if color == side_to_move {
        piece.index()
    } else {
        PLANES_PER_SIDE + piece.index()
    };
    plane * 64 + square.index()
}

/// Encode a position into a fresh feature vector.
#[must_use]
pub fn encode<P: Position>(position: &P) -> FeatureVector {
    let mut features = FeatureVector::new();
    encode_into(position, &mut features);
    features
}

/// Encode a position into an existing buffer, overwriting its contents.
pub fn encode_into<P: Position>(position: &P, features: &mut FeatureVector) {
    features.clear();
    let stm = position.side_to_move();
    for sq in Square::ALL {
        if let Some((color, piece)) = position.piece_at(sq) {
            features.set(feature_index(piece, color, sq, stm));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Board;

    fn board(fen: &str) -> Board {
        fen.parse().expect("valid fen")
    }

    #[test]
    fn test_empty_board_encodes_to_zero() {
        let features = encode(&Board::empty());
        assert_eq!(features.count_ones(), 0);
        assert_eq!(features, FeatureVector::default());
    }

    #[test]
    fn test_start_position_bit_count() {
        let features = encode(&Board::new());
        assert_eq!(features.as_slice().len(), INPUT_SIZE);
        assert_eq!(features.count_ones(), 32);
    }

    #[test]
    fn test_mover_pieces_use_first_six_planes() {
        // White to move: white pawn on e2 lands on plane 0
        let white = encode(&board("8/8/8/8/8/8/4P3/8 w - - 0 1"));
        assert_eq!(white.active_features().collect::<Vec<_>>(), vec![12]);

        // Black to move: same white pawn is now the opponent's, plane 6
        let black = encode(&board("8/8/8/8/8/8/4P3/8 b - - 0 1"));
        assert_eq!(black.active_features().collect::<Vec<_>>(), vec![6 * 64 + 12]);
    }

    #[test]
    fn test_piece_planes_follow_fixed_order() {
        let e4: Square = "e4".parse().unwrap();
        for piece in Piece::ALL {
            assert_eq!(
                feature_index(piece, Color::Black, e4, Color::Black),
                piece.index() * 64 + 28
            );
            assert_eq!(
                feature_index(piece, Color::Black, e4, Color::White),
                (6 + piece.index()) * 64 + 28
            );
        }
    }

    #[test]
    fn test_kings_on_corners() {
        let features = encode(&board("7k/8/8/8/8/8/8/K7 w - - 0 1"));
        let active: Vec<usize> = features.active_features().collect();
        // White king a1 on plane 5, black king h8 on plane 11
        assert_eq!(active, vec![5 * 64, 11 * 64 + 63]);
    }

    #[test]
    fn test_encode_into_overwrites_previous_contents() {
        let mut buf = encode(&Board::new());
        encode_into(&board("8/8/8/8/8/8/8/K6k w - - 0 1"), &mut buf);
        assert_eq!(buf.count_ones(), 2);
    }

    #[test]
    fn test_colour_flip_swaps_plane_halves() {
        // Same placement, other side to move: every bit moves by 6 planes
        let w = encode(&board(crate::position::START_FEN));
        let b = encode(&board(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1",
        ));
        for idx in w.active_features() {
            let swapped = if idx < 384 { idx + 384 } else { idx - 384 };
            assert_eq!(b.get(swapped), 1, "index {idx}");
        }
        assert_eq!(w.count_ones(), b.count_ones());
    }
}
