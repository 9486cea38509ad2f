//! Quantized value network evaluation.
//!
//! Architecture: 768 -> 16 (linear) -> 1
//!
//! - [`features`] turns a position into the 768-entry binary input
//! - [`weights`] loads the quantized parameters from the text format
//! - [`network`] runs the integer forward pass and rescales the output
//! - [`shared`] lets a long-running process swap in new weights safely

pub mod features;
pub mod network;
pub mod shared;
pub mod weights;

pub use features::{encode, encode_into, feature_index, FeatureVector};
pub use network::{evaluate, evaluate_cp, evaluate_position, hidden_layer, output_accumulator};
pub use shared::SharedWeights;
pub use weights::{LoadReport, LoadWarning, Section, WeightStore};

/// Input feature size: 12 planes x 64 squares
pub const INPUT_SIZE: usize = 768;

/// Hidden layer size (must match trained network)
pub const HIDDEN_SIZE: usize = 16;

/// Output layer size
pub const OUTPUT_SIZE: usize = 1;

/// Weight quantization factor
pub const Q: i32 = 255;

/// Evaluation scale factor
pub const EVAL_SCALE: i32 = 400;

/// Default location of the weight file
pub const DEFAULT_EVAL_FILE: &str = "nn/nn-1.sense";
