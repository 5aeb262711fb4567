use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::loader::ImageVector;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised by the latent model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Input length does not match the layer it is fed to.
    DimensionMismatch {
        /// Length the layer expects.
        expected: usize,
        /// Length that was provided.
        got: usize,
    },
    /// Configuration values are out of range.
    InvalidConfig(String),
    /// A weights snapshot is inconsistent with its configuration.
    InvalidWeights(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected {}, got {}", expected, got)
            }
            Self::InvalidConfig(msg) => write!(f, "invalid model config: {}", msg),
            Self::InvalidWeights(msg) => write!(f, "invalid model weights: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Diagonal Gaussian posterior produced by the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentDistribution {
    pub mu: DVector<f32>,
    pub logvar: DVector<f32>,
}

impl LatentDistribution {
    pub fn latent_dim(&self) -> usize {
        self.mu.len()
    }

    /// Draw `mu + exp(0.5 * logvar) * eps` with fresh `eps ~ N(0, I)` from `rng`.
    ///
    /// `mu` and `logvar` must have the same length.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<LatentSample, ModelError> {
        if self.mu.len() != self.logvar.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.mu.len(),
                got: self.logvar.len(),
            });
        }
        let z = DVector::from_fn(self.mu.len(), |i, _| {
            let eps: f32 = rng.sample(StandardNormal);
            self.mu[i] + (0.5 * self.logvar[i]).exp() * eps
        });
        Ok(LatentSample { z })
    }
}

/// One draw from a [`LatentDistribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentSample {
    pub z: DVector<f32>,
}

impl LatentSample {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

/// Result of [`AdversarialVae::forward`](super::AdversarialVae::forward).
#[derive(Debug, Clone, PartialEq)]
pub struct VaeOutput {
    /// Decoder output, every element in `[0, 1]`.
    pub reconstruction: ImageVector,
    pub mu: DVector<f32>,
    pub logvar: DVector<f32>,
}

/// Batched forward result; one column per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct VaeBatchOutput {
    pub reconstruction: DMatrix<f32>,
    pub mu: DMatrix<f32>,
    pub logvar: DMatrix<f32>,
}
