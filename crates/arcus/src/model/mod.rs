//! Adversarial VAE for outlier screening of image feature vectors.
//!
//! Three independent heads share no parameters:
//!
//! - **encoder**: `input → hidden (ReLU) → 2·latent`, split into `mu` / `logvar`
//! - **decoder**: `latent → hidden (ReLU) → input (sigmoid)`
//! - **discriminator**: `input → hidden (leaky ReLU) → 1 (sigmoid)`
//!
//! [`AdversarialVae::forward`] runs encode → reparameterize → decode only.
//! The discriminator is a separate scoring head and is never called from the
//! forward path. There is no training loop and no anomaly threshold; callers
//! decide what a reconstruction error or realism score means.

mod config;
mod layers;
mod loss;
mod types;

use std::path::Path;

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::loader::ImageVector;

pub use config::{VaeConfig, LATENT_DIM};
pub use layers::{Activation, Linear, TwoLayer};
pub use loss::{kl_divergence, mse_loss, vae_loss, VaeLoss};
pub use types::{LatentDistribution, LatentSample, ModelError, VaeBatchOutput, VaeOutput};

const WEIGHTS_SCHEMA_V1: &str = "arcus.vae_weights.v1";

/// Encoder/decoder VAE with an unconnected discriminator head.
#[derive(Debug, Clone, PartialEq)]
pub struct AdversarialVae {
    config: VaeConfig,
    encoder: TwoLayer,
    decoder: TwoLayer,
    discriminator: TwoLayer,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct VaeSnapshotV1 {
    schema: String,
    config: VaeConfig,
    encoder: TwoLayer,
    decoder: TwoLayer,
    discriminator: TwoLayer,
}

impl AdversarialVae {
    /// Build a freshly initialized model seeded from `config.init_seed`.
    pub fn new(config: VaeConfig) -> Result<Self, ModelError> {
        let mut rng = StdRng::seed_from_u64(config.init_seed);
        Self::with_rng(config, &mut rng)
    }

    /// Build a freshly initialized model drawing weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: VaeConfig, rng: &mut R) -> Result<Self, ModelError> {
        config.validate()?;
        let VaeConfig {
            input_dim,
            latent_dim,
            hidden_dim,
            leaky_slope,
            ..
        } = config;

        let encoder = TwoLayer::init(
            input_dim,
            hidden_dim,
            2 * latent_dim,
            Activation::Relu,
            Activation::Identity,
            rng,
        );
        let decoder = TwoLayer::init(
            latent_dim,
            hidden_dim,
            input_dim,
            Activation::Relu,
            Activation::Sigmoid,
            rng,
        );
        let discriminator = TwoLayer::init(
            input_dim,
            hidden_dim,
            1,
            Activation::LeakyRelu { slope: leaky_slope },
            Activation::Sigmoid,
            rng,
        );

        tracing::debug!(
            "Initialized VAE: input={} hidden={} latent={}",
            input_dim,
            hidden_dim,
            latent_dim
        );

        Ok(Self {
            config,
            encoder,
            decoder,
            discriminator,
        })
    }

    pub fn config(&self) -> &VaeConfig {
        &self.config
    }

    pub fn input_dim(&self) -> usize {
        self.config.input_dim
    }

    pub fn latent_dim(&self) -> usize {
        self.config.latent_dim
    }

    /// Map an image vector to its latent posterior.
    pub fn encode(&self, x: &ImageVector) -> Result<LatentDistribution, ModelError> {
        let stats = self.encoder.forward(x.as_dvector())?;
        let k = self.config.latent_dim;
        Ok(LatentDistribution {
            mu: stats.rows(0, k).into_owned(),
            logvar: stats.rows(k, k).into_owned(),
        })
    }

    /// Sample `z = mu + exp(0.5 * logvar) * eps` with fresh noise from `rng`.
    ///
    /// Seeded generators make the draw reproducible; every call consumes new
    /// noise, so repeated calls on one distribution give different samples.
    /// Fails if `mu` and `logvar` differ in length.
    pub fn reparameterize<R: Rng + ?Sized>(
        &self,
        dist: &LatentDistribution,
        rng: &mut R,
    ) -> Result<LatentSample, ModelError> {
        dist.sample(rng)
    }

    /// Map a latent sample back to input space; every element is in `[0, 1]`.
    pub fn decode(&self, z: &LatentSample) -> Result<ImageVector, ModelError> {
        let out = self.decoder.forward(&z.z)?;
        Ok(ImageVector::from_dvector(out))
    }

    /// Realism score in `[0, 1]` for a real or reconstructed vector.
    ///
    /// Only finite inputs are covered by that range: a NaN element yields a
    /// NaN score.
    pub fn discriminate(&self, x: &ImageVector) -> Result<f32, ModelError> {
        let out = self.discriminator.forward(x.as_dvector())?;
        Ok(out[0])
    }

    /// encode → reparameterize → decode. The discriminator is not invoked.
    pub fn forward<R: Rng + ?Sized>(
        &self,
        x: &ImageVector,
        rng: &mut R,
    ) -> Result<VaeOutput, ModelError> {
        let dist = self.encode(x)?;
        let z = self.reparameterize(&dist, rng)?;
        let reconstruction = self.decode(&z)?;
        Ok(VaeOutput {
            reconstruction,
            mu: dist.mu,
            logvar: dist.logvar,
        })
    }

    // ── Batched variants (one column per sample) ───────────────────────────

    /// Returns `(mu, logvar)`, each `latent_dim x batch`.
    pub fn encode_batch(
        &self,
        x: &DMatrix<f32>,
    ) -> Result<(DMatrix<f32>, DMatrix<f32>), ModelError> {
        let stats = self.encoder.forward_batch(x)?;
        let k = self.config.latent_dim;
        Ok((stats.rows(0, k).into_owned(), stats.rows(k, k).into_owned()))
    }

    pub fn reparameterize_batch<R: Rng + ?Sized>(
        &self,
        mu: &DMatrix<f32>,
        logvar: &DMatrix<f32>,
        rng: &mut R,
    ) -> Result<DMatrix<f32>, ModelError> {
        if mu.shape() != logvar.shape() {
            return Err(ModelError::DimensionMismatch {
                expected: mu.len(),
                got: logvar.len(),
            });
        }
        Ok(DMatrix::from_fn(mu.nrows(), mu.ncols(), |i, j| {
            let eps: f32 = rng.sample(StandardNormal);
            mu[(i, j)] + (0.5 * logvar[(i, j)]).exp() * eps
        }))
    }

    pub fn decode_batch(&self, z: &DMatrix<f32>) -> Result<DMatrix<f32>, ModelError> {
        self.decoder.forward_batch(z)
    }

    /// One realism score per column.
    pub fn discriminate_batch(&self, x: &DMatrix<f32>) -> Result<Vec<f32>, ModelError> {
        let out = self.discriminator.forward_batch(x)?;
        Ok(out.row(0).iter().copied().collect())
    }

    pub fn forward_batch<R: Rng + ?Sized>(
        &self,
        x: &DMatrix<f32>,
        rng: &mut R,
    ) -> Result<VaeBatchOutput, ModelError> {
        let (mu, logvar) = self.encode_batch(x)?;
        let z = self.reparameterize_batch(&mu, &logvar, rng)?;
        let reconstruction = self.decode_batch(&z)?;
        Ok(VaeBatchOutput {
            reconstruction,
            mu,
            logvar,
        })
    }

    // ── Persistence ────────────────────────────────────────────────────────

    /// Serialize config and weights to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let snapshot = VaeSnapshotV1 {
            schema: WEIGHTS_SCHEMA_V1.to_string(),
            config: self.config.clone(),
            encoder: self.encoder.clone(),
            decoder: self.decoder.clone(),
            discriminator: self.discriminator.clone(),
        };
        serde_json::to_string(&snapshot)
    }

    /// Parse a snapshot produced by [`to_json`](Self::to_json).
    pub fn from_json(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let snapshot: VaeSnapshotV1 = serde_json::from_str(data)?;
        Ok(Self::from_snapshot(snapshot)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("VAE weights written to {}", path.display());
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let model = Self::from_json(&data)?;
        tracing::info!("VAE weights loaded from {}", path.display());
        Ok(model)
    }

    fn from_snapshot(s: VaeSnapshotV1) -> Result<Self, ModelError> {
        if s.schema != WEIGHTS_SCHEMA_V1 {
            return Err(ModelError::InvalidWeights(format!(
                "unsupported weights schema '{}' (expected '{}')",
                s.schema, WEIGHTS_SCHEMA_V1
            )));
        }
        s.config.validate()?;

        let c = &s.config;
        let heads = [
            ("encoder", &s.encoder, c.input_dim, 2 * c.latent_dim),
            ("decoder", &s.decoder, c.latent_dim, c.input_dim),
            ("discriminator", &s.discriminator, c.input_dim, 1),
        ];
        for (name, head, in_dim, out_dim) in heads {
            if !head.is_consistent() || head.in_dim() != in_dim || head.out_dim() != out_dim {
                return Err(ModelError::InvalidWeights(format!(
                    "{} shape {}x{}x{} does not match config ({} -> {})",
                    name,
                    head.in_dim(),
                    head.hidden_dim(),
                    head.out_dim(),
                    in_dim,
                    out_dim
                )));
            }
        }

        Ok(Self {
            config: s.config,
            encoder: s.encoder,
            decoder: s.decoder,
            discriminator: s.discriminator,
        })
    }
}

/// Reconstruction MSE of a single image against its reconstruction.
pub fn reconstruction_error(input: &ImageVector, output: &VaeOutput) -> Result<f32, ModelError> {
    mse_loss(output.reconstruction.as_slice(), input.as_slice())
}

impl VaeOutput {
    /// Training objective for this forward pass against its input.
    pub fn loss(&self, input: &ImageVector) -> Result<VaeLoss, ModelError> {
        vae_loss(
            self.reconstruction.as_slice(),
            input.as_slice(),
            self.mu.as_slice(),
            self.logvar.as_slice(),
        )
    }
}

impl VaeBatchOutput {
    /// Training objective averaged over every element of the batch.
    pub fn loss(&self, input: &DMatrix<f32>) -> Result<VaeLoss, ModelError> {
        vae_loss(
            self.reconstruction.as_slice(),
            input.as_slice(),
            self.mu.as_slice(),
            self.logvar.as_slice(),
        )
    }
}

impl From<DVector<f32>> for LatentSample {
    fn from(z: DVector<f32>) -> Self {
        Self { z }
    }
}
