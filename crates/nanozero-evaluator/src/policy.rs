//! Policy targets: validated probability distributions over an action space.

use nanozero_game::Action;
use serde::{Deserialize, Serialize};

/// Allowed deviation of a policy's total mass from 1.
pub const MASS_TOLERANCE: f32 = 1e-3;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InvalidPolicyError {
    #[display("policy is empty")]
    Empty,
    #[display("policy entry {index} is {value}, expected a finite non-negative probability")]
    BadEntry { index: usize, value: f32 },
    #[display("policy mass sums to {sum}, expected 1")]
    BadMass { sum: f32 },
}

/// Probability mass over every action slot of a game, legal or not.
///
/// Entries are finite and non-negative and sum to 1 within [`MASS_TOLERANCE`]. A target
/// never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct PolicyTarget(Vec<f32>);

impl PolicyTarget {
    /// Validates `probs` as a distribution.
    ///
    /// ```
    /// use nanozero_evaluator::PolicyTarget;
    ///
    /// assert!(PolicyTarget::new(vec![0.25, 0.75]).is_ok());
    /// assert!(PolicyTarget::new(vec![0.5, 0.6]).is_err());
    /// assert!(PolicyTarget::new(vec![-0.5, 1.5]).is_err());
    /// ```
    pub fn new(probs: Vec<f32>) -> Result<Self, InvalidPolicyError> {
        if probs.is_empty() {
            return Err(InvalidPolicyError::Empty);
        }
        if let Some((index, &value)) = probs
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(InvalidPolicyError::BadEntry { index, value });
        }
        let sum = probs.iter().sum::<f32>();
        if (sum - 1.0).abs() > MASS_TOLERANCE {
            return Err(InvalidPolicyError::BadMass { sum });
        }
        Ok(Self(probs))
    }

    /// Uniform distribution over `legal`, zero elsewhere.
    ///
    /// # Panics
    ///
    /// Panics if `legal` is empty or contains an action outside `0..size`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn uniform(legal: &[Action], size: usize) -> Self {
        assert!(!legal.is_empty(), "uniform policy needs a legal action");
        let mut probs = vec![0.0; size];
        let p = 1.0 / legal.len() as f32;
        for &action in legal {
            probs[action] = p;
        }
        Self(probs)
    }

    #[must_use]
    pub fn probs(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[f32]> for PolicyTarget {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl TryFrom<Vec<f32>> for PolicyTarget {
    type Error = InvalidPolicyError;

    fn try_from(probs: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(probs)
    }
}

impl From<PolicyTarget> for Vec<f32> {
    fn from(policy: PolicyTarget) -> Self {
        policy.0
    }
}

/// Renormalizes `probs` over `legal`, zeroing every other slot.
///
/// Falls back to a uniform distribution over `legal` when the legal mass is zero or not
/// finite. Returns an all-zero vector if `legal` is empty.
#[must_use]
pub fn mask_to_legal(probs: &[f32], legal: &[Action]) -> Vec<f32> {
    let mut masked = vec![0.0; probs.len()];
    let mass = legal.iter().map(|&a| probs[a].max(0.0)).sum::<f32>();
    if mass > 0.0 && mass.is_finite() {
        for &action in legal {
            masked[action] = probs[action].max(0.0) / mass;
        }
    } else if !legal.is_empty() {
        masked = PolicyTarget::uniform(legal, probs.len()).into();
    }
    masked
}
