//! arcus — harmonization and anomaly screening of multi-site medical images.
//!
//! Prototype building blocks feeding a federated-learning pipeline:
//!
//! 1. **Sites** – structural validation of per-site acquisition profiles.
//! 2. **Loader** – DICOM / NIfTI pixel extraction into fixed-length vectors.
//! 3. **Harmonize** – per-image intensity normalization (stub).
//! 4. **Model** – adversarial VAE: encode, reparameterize, decode, and an
//!    independent discriminator realism score.
//! 5. **Pipeline** – site gate → load → optional harmonize → model.
//!
//! Randomness is always injected (`&mut impl Rng`). Logging goes through
//! `tracing`; installing a subscriber is left to the application.

mod harmonize;
mod loader;
mod model;
mod pipeline;
mod site_profile;

#[cfg(test)]
mod test_utils;

pub use harmonize::{Harmonizer, HARMONIZE_EPSILON};
pub use loader::{
    load_and_preprocess_image, DataFormatError, ImageFormat, ImageLoader, ImageVector, INPUT_DIM,
};
pub use model::{
    kl_divergence, mse_loss, reconstruction_error, vae_loss, Activation, AdversarialVae,
    LatentDistribution, LatentSample, Linear, ModelError, TwoLayer, VaeBatchOutput, VaeConfig,
    VaeLoss, VaeOutput, LATENT_DIM,
};
pub use pipeline::{
    PipelineConfig, PipelineError, ScreeningOutcome, ScreeningPipeline, ScreeningReport,
};
pub use site_profile::{
    validate_site_profiles, ConfigValidationError, MissingFields, SiteProfile, SiteProfileSet,
    REQUIRED_FIELDS,
};
