//! Loss terms of the combined policy/value objective.
//!
//! Evaluators are retrained on
//!
//! ```text
//! loss = cross_entropy(π, p) + (z - v)²
//! ```
//!
//! where `π` is the search policy target, `p` the predicted policy, `z` the game outcome
//! from the mover's perspective and `v` the predicted value. Both terms are summed and
//! minimized jointly, one optimizer step per mini-batch.

use serde::{Deserialize, Serialize};

/// Probabilities below this are clamped before taking the logarithm.
const MIN_PROB: f32 = 1e-7;

/// Mean loss of one optimizer step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepLoss {
    pub policy: f32,
    pub value: f32,
}

impl StepLoss {
    /// The combined objective.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.policy + self.value
    }

    /// Averages step losses with equal weight.
    ///
    /// Returns the zero loss for an empty iterator.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean<I>(losses: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut sum = Self::default();
        let mut count = 0_usize;
        for loss in losses {
            sum.policy += loss.policy;
            sum.value += loss.value;
            count += 1;
        }
        if count == 0 {
            return sum;
        }
        Self {
            policy: sum.policy / count as f32,
            value: sum.value / count as f32,
        }
    }
}

/// Cross-entropy `-Σ πᵢ ln pᵢ` between a target and a predicted distribution.
///
/// ```
/// use nanozero_evaluator::loss::cross_entropy;
///
/// let exact = cross_entropy(&[0.0, 1.0], &[0.0, 1.0]);
/// assert!(exact.abs() < 1e-6);
/// assert!(cross_entropy(&[0.0, 1.0], &[0.5, 0.5]) > exact);
/// ```
#[must_use]
pub fn cross_entropy(target: &[f32], predicted: &[f32]) -> f32 {
    assert_eq!(target.len(), predicted.len());
    -target
        .iter()
        .zip(predicted)
        .filter(|(t, _)| **t > 0.0)
        .map(|(t, p)| t * p.max(MIN_PROB).ln())
        .sum::<f32>()
}

/// Squared error between a predicted and a target scalar.
#[must_use]
pub fn squared_error(predicted: f32, target: f32) -> f32 {
    (predicted - target).powi(2)
}

/// Numerically stable softmax.
///
/// ```
/// use nanozero_evaluator::loss::softmax;
///
/// let probs = softmax(&[0.0, 0.0]);
/// assert_eq!(probs, vec![0.5, 0.5]);
/// ```
#[must_use]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = logits.iter().map(|l| (l - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f32>();
    exps.into_iter().map(|e| e / sum).collect()
}
