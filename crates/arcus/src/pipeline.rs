//! End-to-end screening: site gate → load → (optional) harmonize → VAE.

use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::harmonize::Harmonizer;
use crate::loader::{DataFormatError, ImageLoader, ImageVector};
use crate::model::{reconstruction_error, AdversarialVae, ModelError, VaeConfig};
use crate::site_profile::{validate_site_profiles, ConfigValidationError, SiteProfileSet};

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Z-score each image before it reaches the model.
    pub harmonize: bool,
    /// Model architecture; `model.input_dim` also sets the loader length.
    pub model: VaeConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            harmonize: false,
            model: VaeConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a pipeline config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.model.validate()?;
        Ok(config)
    }
}

/// Errors from a screening run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    DataFormat(DataFormatError),
    ConfigValidation(ConfigValidationError),
    Model(ModelError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataFormat(e) => write!(f, "{}", e),
            Self::ConfigValidation(e) => write!(f, "{}", e),
            Self::Model(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataFormat(e) => Some(e),
            Self::ConfigValidation(e) => Some(e),
            Self::Model(e) => Some(e),
        }
    }
}

impl From<DataFormatError> for PipelineError {
    fn from(e: DataFormatError) -> Self {
        Self::DataFormat(e)
    }
}

impl From<ConfigValidationError> for PipelineError {
    fn from(e: ConfigValidationError) -> Self {
        Self::ConfigValidation(e)
    }
}

impl From<ModelError> for PipelineError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

/// Model readings for one image.
///
/// `realism_score` is the discriminator's reading of `model_input`. It is
/// reported alongside the reconstruction and never combined with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    /// Source file, when screened from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Whether `model_input` was harmonized.
    pub harmonized: bool,
    /// Vector fed to the model.
    pub model_input: Vec<f32>,
    /// Decoder output, every element in `[0, 1]`.
    pub reconstruction: Vec<f32>,
    pub mu: Vec<f32>,
    pub logvar: Vec<f32>,
    /// MSE between `model_input` and `reconstruction`.
    pub reconstruction_error: f32,
    /// Discriminator score of `model_input` in `[0, 1]`.
    pub realism_score: f32,
}

/// Per-file result of [`ScreeningPipeline::run`].
#[derive(Debug)]
pub struct ScreeningOutcome {
    pub path: PathBuf,
    pub result: Result<ScreeningReport, PipelineError>,
}

/// Loader, harmonizer and model wired in processing order.
///
/// Create once, screen many images.
#[derive(Debug, Clone)]
pub struct ScreeningPipeline {
    harmonize: bool,
    loader: ImageLoader,
    harmonizer: Harmonizer,
    model: AdversarialVae,
}

impl ScreeningPipeline {
    /// Build a pipeline with a freshly initialized model.
    pub fn new(config: PipelineConfig) -> Result<Self, ModelError> {
        let model = AdversarialVae::new(config.model)?;
        Ok(Self::with_model(model, config.harmonize))
    }

    /// Build a pipeline around an existing (e.g. loaded) model.
    pub fn with_model(model: AdversarialVae, harmonize: bool) -> Self {
        Self {
            harmonize,
            loader: ImageLoader::new(model.input_dim()),
            harmonizer: Harmonizer::new(),
            model,
        }
    }

    pub fn model(&self) -> &AdversarialVae {
        &self.model
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    pub fn harmonizes(&self) -> bool {
        self.harmonize
    }

    /// Site gate; must pass before any per-site processing.
    pub fn validate_sites(&self, profiles: &SiteProfileSet) -> Result<(), ConfigValidationError> {
        validate_site_profiles(profiles)
    }

    /// Load one file and screen it.
    pub fn screen_path<R: Rng + ?Sized>(
        &self,
        path: &Path,
        rng: &mut R,
    ) -> Result<ScreeningReport, PipelineError> {
        tracing::info!("Loading image: {}", path.display());
        let image = self.loader.load(path)?;
        let mut report = self.screen_vector(&image, rng)?;
        report.path = Some(path.to_path_buf());
        Ok(report)
    }

    /// Screen an already loaded vector.
    pub fn screen_vector<R: Rng + ?Sized>(
        &self,
        image: &ImageVector,
        rng: &mut R,
    ) -> Result<ScreeningReport, ModelError> {
        let input = if self.harmonize {
            self.harmonizer.harmonize_image(image)
        } else {
            image.clone()
        };

        let out = self.model.forward(&input, rng)?;
        let err = reconstruction_error(&input, &out)?;
        let realism = self.model.discriminate(&input)?;

        tracing::debug!(
            "Screened vector: recon_mse={:.5} realism={:.3}",
            err,
            realism
        );

        Ok(ScreeningReport {
            path: None,
            harmonized: self.harmonize,
            model_input: input.to_vec(),
            reconstruction: out.reconstruction.to_vec(),
            mu: out.mu.as_slice().to_vec(),
            logvar: out.logvar.as_slice().to_vec(),
            reconstruction_error: err,
            realism_score: realism,
        })
    }

    /// Validate `profiles`, then screen every path.
    ///
    /// A site validation failure aborts before any file is read. A bad file
    /// only fails its own outcome.
    pub fn run<R: Rng + ?Sized>(
        &self,
        profiles: &SiteProfileSet,
        paths: &[PathBuf],
        rng: &mut R,
    ) -> Result<Vec<ScreeningOutcome>, ConfigValidationError> {
        self.validate_sites(profiles)?;
        tracing::info!(
            "{} site(s) validated; screening {} image(s)",
            profiles.len(),
            paths.len()
        );

        let outcomes: Vec<ScreeningOutcome> = paths
            .iter()
            .map(|path| {
                let result = self.screen_path(path, &mut *rng);
                if let Err(ref e) = result {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                }
                ScreeningOutcome {
                    path: path.clone(),
                    result,
                }
            })
            .collect();

        let n_ok = outcomes.iter().filter(|o| o.result.is_ok()).count();
        tracing::info!("Screened {}/{} image(s)", n_ok, outcomes.len());
        Ok(outcomes)
    }
}
