//! Medical image loading and fixed-length feature extraction.
//!
//! Files are dispatched by extension: `.dcm` goes through the DICOM reader,
//! every other suffix is handed to the NIfTI reader without pre-validation.
//! Pixel data is cast to `f32`, flattened row-major and fitted to the
//! loader's `input_dim` (truncate or zero-pad at the tail).

mod dicom_reader;
mod nifti_reader;
mod types;

use std::path::Path;

pub use types::{DataFormatError, ImageVector};

/// Default length of an [`ImageVector`].
pub const INPUT_DIM: usize = 128;

/// Reader selected for an image path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Dicom,
    Nifti,
}

impl ImageFormat {
    /// `.dcm` (case-sensitive) selects DICOM; anything else is NIfTI.
    pub fn from_path(path: &Path) -> Self {
        if path.to_string_lossy().ends_with(".dcm") {
            Self::Dicom
        } else {
            Self::Nifti
        }
    }
}

/// Loads image files into fixed-length [`ImageVector`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ImageLoader {
    /// Output vector length.
    pub input_dim: usize,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self {
            input_dim: INPUT_DIM,
        }
    }
}

impl ImageLoader {
    pub fn new(input_dim: usize) -> Self {
        Self { input_dim }
    }

    /// Read `path`, flatten its pixel data and fit it to `input_dim`.
    pub fn load(&self, path: &Path) -> Result<ImageVector, DataFormatError> {
        let format = ImageFormat::from_path(path);
        let flat = match format {
            ImageFormat::Dicom => dicom_reader::read_dicom_pixels(path)?,
            ImageFormat::Nifti => nifti_reader::read_nifti_voxels(path)?,
        };

        let n = flat.len();
        if n > self.input_dim {
            tracing::debug!(
                "{}: truncating {} values to {}",
                path.display(),
                n,
                self.input_dim
            );
        } else if n < self.input_dim {
            tracing::debug!(
                "{}: zero-padding {} values to {}",
                path.display(),
                n,
                self.input_dim
            );
        }

        Ok(ImageVector::from_flat(flat, self.input_dim))
    }
}

/// Load an image with the default [`INPUT_DIM`] length.
pub fn load_and_preprocess_image(path: impl AsRef<Path>) -> Result<ImageVector, DataFormatError> {
    ImageLoader::default().load(path.as_ref())
}
