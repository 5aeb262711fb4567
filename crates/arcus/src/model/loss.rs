//! Training objective. Not used by inference paths.

use super::ModelError;

/// Components of the VAE objective.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VaeLoss {
    /// Mean squared reconstruction error.
    pub reconstruction: f32,
    /// KL divergence to `N(0, I)`, averaged over every latent element.
    pub kl_divergence: f32,
    /// `reconstruction + kl_divergence`.
    pub total: f32,
}

/// Mean squared error over all elements.
pub fn mse_loss(reconstruction: &[f32], input: &[f32]) -> Result<f32, ModelError> {
    if reconstruction.len() != input.len() {
        return Err(ModelError::DimensionMismatch {
            expected: input.len(),
            got: reconstruction.len(),
        });
    }
    if input.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = reconstruction
        .iter()
        .zip(input)
        .map(|(&r, &x)| {
            let d = (r - x) as f64;
            d * d
        })
        .sum();
    Ok((sum / input.len() as f64) as f32)
}

/// `-0.5 * mean(1 + logvar - mu^2 - exp(logvar))` over all elements.
pub fn kl_divergence(mu: &[f32], logvar: &[f32]) -> Result<f32, ModelError> {
    if mu.len() != logvar.len() {
        return Err(ModelError::DimensionMismatch {
            expected: mu.len(),
            got: logvar.len(),
        });
    }
    if mu.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = mu
        .iter()
        .zip(logvar)
        .map(|(&m, &lv)| {
            let (m, lv) = (m as f64, lv as f64);
            1.0 + lv - m * m - lv.exp()
        })
        .sum();
    Ok((-0.5 * sum / mu.len() as f64) as f32)
}

/// Reconstruction MSE plus KL divergence.
///
/// Slices may hold a single sample or a column-major batch; both terms are
/// means over every element they contain.
pub fn vae_loss(
    reconstruction: &[f32],
    input: &[f32],
    mu: &[f32],
    logvar: &[f32],
) -> Result<VaeLoss, ModelError> {
    let reconstruction = mse_loss(reconstruction, input)?;
    let kl_divergence = kl_divergence(mu, logvar)?;
    Ok(VaeLoss {
        reconstruction,
        kl_divergence,
        total: reconstruction + kl_divergence,
    })
}
