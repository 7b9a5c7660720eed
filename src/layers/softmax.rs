//! Softmax and softmax cross-entropy loss

use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Softmax applied row-wise in place.
///
/// Converts logits to probabilities for each row. Uses the max-subtraction
/// trick for numerical stability to avoid overflow with large values.
///
/// # Arguments
/// * `outputs` - Flat array containing row-major matrix data
/// * `rows` - Number of rows in the matrix
/// * `cols` - Number of columns in the matrix
pub fn softmax_rows<T: Scalar>(outputs: &mut [T], rows: usize, cols: usize) {
    if cols == 0 {
        return;
    }
    assert_eq!(outputs.len(), rows * cols, "outputs length mismatch in softmax_rows");

    for row in outputs.chunks_exact_mut(cols).take(rows) {
        let max_value = row.iter().copied().fold(row[0], T::max);

        let mut sum = T::zero();
        for value in row.iter_mut() {
            *value = (*value - max_value).exp();
            sum = sum + *value;
        }

        let inv_sum = T::one() / sum;
        for value in row.iter_mut() {
            *value = *value * inv_sum;
        }
    }
}

/// Mean cross-entropy of `(N, C)` scores against labels `y`, plus the
/// gradient with respect to the scores.
///
/// The loss uses log-sum-exp so large logits neither overflow nor produce
/// `ln(0)`. The gradient is `(softmax_rows(scores) - onehot) / N`.
///
/// # Panics
///
/// Panics if `scores` is not 2-D, `y.len() != N`, or a label is `>= C`.
pub fn softmax_loss<T: Scalar>(scores: &Tensor<T>, y: &[usize]) -> (T, Tensor<T>) {
    assert_eq!(scores.ndim(), 2, "softmax_loss expects (N, C) scores");
    let (n, c) = (scores.dim(0), scores.dim(1));
    assert_eq!(y.len(), n, "softmax_loss label count mismatch");
    assert!(n > 0 && c > 0, "softmax_loss needs a non-empty batch");

    let inv_n = T::one() / T::of_f64(n as f64);
    let mut loss = T::zero();

    for (row, &label) in scores.data().chunks_exact(c).zip(y.iter()) {
        assert!(label < c, "softmax_loss label out of range");

        let max_value = row.iter().copied().fold(row[0], T::max);
        let sum_exp: T = row.iter().map(|&v| (v - max_value).exp()).sum();
        loss = loss - (row[label] - max_value - sum_exp.ln());
    }

    let mut dscores = scores.clone();
    softmax_rows(dscores.data_mut(), n, c);
    for (row, &label) in dscores.data_mut().chunks_exact_mut(c).zip(y.iter()) {
        row[label] = row[label] - T::one();
        for value in row.iter_mut() {
            *value = *value * inv_n;
        }
    }

    (loss * inv_n, dscores)
}
