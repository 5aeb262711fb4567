use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::loader::INPUT_DIM;

use super::ModelError;

/// Default latent dimensionality.
pub const LATENT_DIM: usize = 32;

/// Architecture and initialization parameters for [`AdversarialVae`](super::AdversarialVae).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaeConfig {
    /// Length of the image feature vector.
    pub input_dim: usize,
    /// Latent space dimensionality.
    pub latent_dim: usize,
    /// Width of the single hidden layer in each head.
    pub hidden_dim: usize,
    /// Negative slope of the discriminator's leaky ReLU.
    pub leaky_slope: f32,
    /// Seed for weight initialization.
    pub init_seed: u64,
}

impl Default for VaeConfig {
    fn default() -> Self {
        Self {
            input_dim: INPUT_DIM,
            latent_dim: LATENT_DIM,
            hidden_dim: 64,
            leaky_slope: 0.2,
            init_seed: 0,
        }
    }
}

impl VaeConfig {
    /// Default config with explicit input/latent sizes.
    pub fn with_dims(input_dim: usize, latent_dim: usize) -> Self {
        Self {
            input_dim,
            latent_dim,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.input_dim == 0 {
            return Err(ModelError::InvalidConfig("input_dim must be >= 1".to_string()));
        }
        if self.latent_dim == 0 {
            return Err(ModelError::InvalidConfig("latent_dim must be >= 1".to_string()));
        }
        if self.hidden_dim == 0 {
            return Err(ModelError::InvalidConfig("hidden_dim must be >= 1".to_string()));
        }
        if !self.leaky_slope.is_finite() || self.leaky_slope < 0.0 {
            return Err(ModelError::InvalidConfig(
                "leaky_slope must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a config from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }
}
