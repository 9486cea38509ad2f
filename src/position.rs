//! Position abstraction consumed by the encoder.
//!
//! The evaluator only needs to know what stands on each square and whose
//! turn it is. [`Position`] captures exactly that, so any rules engine can
//! be plugged in. [`Board`] is a plain mailbox implementation used by the
//! console, the tests and the benches.

use std::fmt;
use std::str::FromStr;

use crate::error::FenError;
use crate::types::{Color, Piece, Square};

/// FEN of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Read-only view of a chess position.
pub trait Position {
    /// Piece on `square`, if any.
    fn piece_at(&self, square: Square) -> Option<(Color, Piece)>;

    /// The side whose turn it is.
    fn side_to_move(&self) -> Color;

    /// All occupied squares in index order (a1 first).
    fn occupied(&self) -> impl Iterator<Item = (Square, Color, Piece)> + '_
    where
        Self: Sized,
    {
        Square::ALL
            .into_iter()
            .filter_map(move |sq| self.piece_at(sq).map(|(color, piece)| (sq, color, piece)))
    }
}

impl<P: Position> Position for &P {
    fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        (**self).piece_at(square)
    }

    fn side_to_move(&self) -> Color {
        (**self).side_to_move()
    }
}

/// Mailbox board: one optional piece per square plus the side to move.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<(Color, Piece)>; 64],
    side_to_move: Color,
}

impl Board {
    /// Empty board, white to move
    #[must_use]
    pub fn empty() -> Self {
        Board {
            squares: [None; 64],
            side_to_move: Color::White,
        }
    }

    /// Standard starting position
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in BACK_RANK.into_iter().enumerate() {
            board.set_piece(Square(0, file), Color::White, piece);
            board.set_piece(Square(1, file), Color::White, Piece::Pawn);
            board.set_piece(Square(6, file), Color::Black, Piece::Pawn);
            board.set_piece(Square(7, file), Color::Black, piece);
        }
        board
    }

    /// Place a piece, replacing whatever was on the square.
    pub fn set_piece(&mut self, square: Square, color: Color, piece: Piece) {
        self.squares[square.index()] = Some((color, piece));
    }

    /// Clear a square, returning its previous occupant.
    pub fn remove_piece(&mut self, square: Square) -> Option<(Color, Piece)> {
        self.squares[square.index()].take()
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    /// Number of pieces on the board
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.squares.iter().filter(|s| s.is_some()).count()
    }

    /// Parse a board position from FEN notation.
    ///
    /// Only piece placement and side to move are kept. Castling and en
    /// passant fields are validated when present; move counters are ignored.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 2 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // Parse piece placement
        let mut ranks = 0;
        for (rank_idx, rank_str) in parts[0].split('/').enumerate() {
            if rank_idx >= 8 {
                return Err(FenError::InvalidRank { rank: rank_idx });
            }
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file,
                        });
                    }
                } else {
                    let color = if c.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file + 1,
                        });
                    }
                    board.set_piece(Square(7 - rank_idx, file), color, piece);
                    file += 1;
                }
            }
            if file < 8 {
                return Err(FenError::TooFewFiles {
                    rank: rank_idx,
                    files: file,
                });
            }
            ranks += 1;
        }
        if ranks != 8 {
            return Err(FenError::TooFewRanks { found: ranks });
        }

        // Parse side to move
        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        if let Some(castling) = parts.get(2) {
            if let Some(c) = castling.chars().find(|c| !"KQkq-".contains(*c)) {
                return Err(FenError::InvalidCastling { char: c });
            }
        }

        if let Some(&ep) = parts.get(3) {
            if ep != "-" && ep.parse::<Square>().is_err() {
                return Err(FenError::InvalidEnPassant {
                    found: ep.to_string(),
                });
            }
        }

        Ok(board)
    }

    /// Convert the board position to FEN notation.
    ///
    /// Castling, en passant and move counters are not tracked and are
    /// written as `- - 0 1`.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                if let Some((color, piece)) = self.piece_at(Square(rank, file)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        format!("{} {active} - - 0 1", rows.join("/"))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Position for Board {
    #[inline]
    fn piece_at(&self, square: Square) -> Option<(Color, Piece)> {
        self.squares[square.index()]
    }

    #[inline]
    fn side_to_move(&self) -> Color {
        self.side_to_move
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = self
                    .piece_at(Square(rank, file))
                    .map_or('.', |(color, piece)| piece.to_fen_char(color));
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{} to move", self.side_to_move)
    }
}
