//! Forward pass.
//!
//! Implements a 768 -> 16 -> 1 network with:
//! - Sparse input layer (only set features are summed)
//! - Linear hidden layer, no activation
//! - Integer accumulation, one float rescale at the very end

use super::{FeatureVector, WeightStore, EVAL_SCALE, HIDDEN_SIZE, Q};
use crate::position::Position;

/// Hidden layer pre-activations: bias plus the weight rows of every set feature.
#[must_use]
pub fn hidden_layer(features: &FeatureVector, store: &WeightStore) -> [i64; HIDDEN_SIZE] {
    let mut hidden = store.hidden_bias().map(i64::from);
    let weights = store.hidden_weights();
    for feat in features.active_features() {
        for (h, &w) in hidden.iter_mut().zip(&weights[feat]) {
            *h += i64::from(w);
        }
    }
    hidden
}

/// Output neuron before rescaling.
///
/// Hidden values fit in 42 bits and weights in 32, so sixteen products
/// plus the bias always fit in an `i128`.
#[must_use]
pub fn output_accumulator(hidden: &[i64; HIDDEN_SIZE], store: &WeightStore) -> i128 {
    let sum: i128 = hidden
        .iter()
        .zip(store.output_weights())
        .map(|(&h, w)| i128::from(h) * i128::from(w[0]))
        .sum();
    sum + i128::from(store.output_bias()[0])
}

/// Evaluate an encoded position.
///
/// Returns `acc / Q / Q * EVAL_SCALE`, in the unit of the training labels
/// (roughly centipawns), from the side to move's point of view.
#[inline]
#[must_use]
pub fn evaluate(features: &FeatureVector, store: &WeightStore) -> f32 {
    let acc = output_accumulator(&hidden_layer(features, store), store);
    (acc as f64 / f64::from(Q) / f64::from(Q) * f64::from(EVAL_SCALE)) as f32
}

/// Encode and evaluate a position.
#[must_use]
pub fn evaluate_position<P: Position>(position: &P, store: &WeightStore) -> f32 {
    evaluate(&super::encode(position), store)
}

/// [`evaluate_position`] rounded to an integer score for search.
#[must_use]
pub fn evaluate_cp<P: Position>(position: &P, store: &WeightStore) -> i32 {
    evaluate_position(position, store).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnue::{encode, Section, INPUT_SIZE};
    use crate::position::{Board, START_FEN};

    /// Hidden weights 1, biases 0, output weights 1
    fn unit_store() -> WeightStore {
        WeightStore::from_fn(|section, _| match section {
            Section::HiddenWeights | Section::OutputWeights => 1,
            Section::HiddenBias | Section::OutputBias => 0,
        })
    }

    fn features_with(indices: &[usize]) -> FeatureVector {
        let mut f = FeatureVector::new();
        for &i in indices {
            f.set(i);
        }
        f
    }

    #[test]
    fn test_zero_store_gives_zero() {
        let store = WeightStore::zeroed();
        assert_eq!(evaluate(&encode(&Board::new()), &store), 0.0);
    }

    #[test]
    fn test_zero_weights_depend_only_on_output_bias() {
        let store = WeightStore::from_fn(|section, _| match section {
            Section::OutputBias => 65025,
            _ => 0,
        });
        let expected = (65025f64 / 255.0 / 255.0 * 400.0) as f32;
        assert_eq!(evaluate(&FeatureVector::new(), &store), expected);
        assert_eq!(evaluate(&encode(&Board::new()), &store), expected);
        assert_eq!(expected, 400.0);
    }

    #[test]
    fn test_unit_weights_count_set_bits() {
        let store = unit_store();
        for k in [0usize, 1, 2, 17, 32] {
            let indices: Vec<usize> = (0..k).map(|i| i * 23 % INPUT_SIZE).collect();
            let features = features_with(&indices);
            assert_eq!(features.count_ones(), k);

            let hidden = hidden_layer(&features, &store);
            assert!(hidden.iter().all(|&h| h == k as i64));

            let expected = ((16 * k) as f64 / 255.0 / 255.0 * 400.0) as f32;
            assert_eq!(evaluate(&features, &store), expected);
        }
    }

    #[test]
    fn test_start_position_unit_weights() {
        let store = unit_store();
        let board: Board = START_FEN.parse().unwrap();
        let expected = ((16 * 32) as f64 / 255.0 / 255.0 * 400.0) as f32;
        assert_eq!(evaluate_position(&board, &store), expected);
        assert_eq!(evaluate_cp(&board, &store), expected.round() as i32);
    }

    #[test]
    fn test_hidden_bias_and_output_weights() {
        let store = WeightStore::from_fn(|section, i| match section {
            Section::HiddenWeights => (i % HIDDEN_SIZE) as i32,
            Section::HiddenBias => 10,
            Section::OutputWeights => if i == 2 { 3 } else { 0 },
            Section::OutputBias => -7,
        });
        let features = features_with(&[0, 100, 767]);
        let hidden = hidden_layer(&features, &store);
        assert_eq!(hidden[0], 10);
        assert_eq!(hidden[2], 10 + 3 * 2);
        assert_eq!(hidden[15], 10 + 3 * 15);
        assert_eq!(output_accumulator(&hidden, &store), 3 * 16 - 7);
    }

    #[test]
    fn test_only_set_features_contribute() {
        let store = WeightStore::from_fn(|section, i| match section {
            Section::HiddenWeights if i / HIDDEN_SIZE == 5 => 1000,
            Section::OutputWeights => 1,
            _ => 0,
        });
        assert_eq!(evaluate(&features_with(&[4, 6]), &store), 0.0);
        let acc = output_accumulator(&hidden_layer(&features_with(&[5]), &store), &store);
        assert_eq!(acc, 16_000);
    }

    #[test]
    fn test_large_weights_do_not_overflow() {
        let store = WeightStore::from_fn(|section, _| match section {
            Section::HiddenWeights => i32::MAX,
            Section::OutputWeights => 1,
            _ => 0,
        });
        let features = encode(&Board::new());
        let hidden = hidden_layer(&features, &store);
        assert_eq!(hidden[0], 32 * i64::from(i32::MAX));
        assert_eq!(output_accumulator(&hidden, &store), 16 * i128::from(hidden[0]));
        assert!(evaluate(&features, &store).is_finite());
    }

    #[test]
    fn test_extreme_output_weights_from_clean_file() {
        let extreme = WeightStore::from_fn(|section, _| match section {
            Section::HiddenWeights | Section::OutputWeights | Section::OutputBias => i32::MAX,
            Section::HiddenBias => i32::MIN,
        });
        let (store, report) = WeightStore::parse_str(&extreme.to_string());
        assert!(report.is_clean());

        let features = encode(&Board::new());
        let hidden = hidden_layer(&features, &store);
        let h = 32 * i64::from(i32::MAX) + i64::from(i32::MIN);
        assert!(hidden.iter().all(|&v| v == h));

        let expected = 16 * i128::from(h) * i128::from(i32::MAX) + i128::from(i32::MAX);
        assert_eq!(output_accumulator(&hidden, &store), expected);
        assert!(expected > i128::from(i64::MAX));

        let score = evaluate(&features, &store);
        assert!(score.is_finite() && score > 0.0);
    }

    #[test]
    fn test_large_accumulator_keeps_integer_precision() {
        // 2^24 + 1 is the first integer f32 cannot hold exactly
        let store = WeightStore::from_fn(|section, _| match section {
            Section::OutputBias => (1 << 24) + 1,
            _ => 0,
        });
        let expected = (f64::from((1 << 24) + 1) / 255.0 / 255.0 * 400.0) as f32;
        assert_eq!(evaluate(&FeatureVector::new(), &store), expected);
        assert_eq!(output_accumulator(&[0; HIDDEN_SIZE], &store), (1 << 24) + 1);
    }
}
