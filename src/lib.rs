//! Quantized neural network evaluation for chess positions.
//!
//! Load a `.sense` weight file once, then score positions:
//!
//! ```no_run
//! use sensenet::{evaluate_position, Board, WeightStore};
//!
//! let store = WeightStore::load("nn/nn-1.sense")?;
//! let score = evaluate_position(&Board::new(), &store);
//! println!("{score}");
//! # Ok::<(), sensenet::WeightError>(())
//! ```

pub mod error;
pub mod logging;
pub mod nnue;
pub mod position;
pub mod types;
pub mod uci;

pub use error::{FenError, SquareError, WeightError};
pub use nnue::{
    encode, evaluate, evaluate_cp, evaluate_position, FeatureVector, LoadReport, LoadWarning,
    Section, SharedWeights, WeightStore,
};
pub use position::{Board, Position, START_FEN};
pub use types::{Color, Piece, Square};
