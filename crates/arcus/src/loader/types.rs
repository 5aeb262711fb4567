use std::path::{Path, PathBuf};

use nalgebra::DVector;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors raised while reading pixel data from a medical image file.
#[derive(Debug, Clone, PartialEq)]
pub enum DataFormatError {
    /// The DICOM reader could not open the file or decode its pixel data.
    Dicom {
        /// File that failed to load.
        path: PathBuf,
        /// Reader diagnostic.
        message: String,
    },
    /// The NIfTI reader could not open the file or convert its volume.
    Nifti {
        /// File that failed to load.
        path: PathBuf,
        /// Reader diagnostic.
        message: String,
    },
}

impl DataFormatError {
    pub(crate) fn dicom(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Dicom {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn nifti(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Nifti {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Path of the file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            Self::Dicom { path, .. } | Self::Nifti { path, .. } => path,
        }
    }
}

impl std::fmt::Display for DataFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dicom { path, message } => {
                write!(f, "failed to read DICOM file {}: {}", path.display(), message)
            }
            Self::Nifti { path, message } => {
                write!(f, "failed to read NIfTI file {}: {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for DataFormatError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Fixed-length intensity feature vector extracted from one image.
///
/// Produced by the loader with exactly the loader's `input_dim` elements:
/// longer pixel streams are truncated to their leading elements, shorter
/// ones are zero-padded at the tail.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVector {
    values: DVector<f32>,
}

impl ImageVector {
    /// Fit a flattened pixel stream to `input_dim` elements.
    pub fn from_flat(mut values: Vec<f32>, input_dim: usize) -> Self {
        let n = values.len();
        if n > input_dim {
            values.truncate(input_dim);
        } else if n < input_dim {
            values.resize(input_dim, 0.0);
        }
        Self {
            values: DVector::from_vec(values),
        }
    }

    /// Wrap an existing vector as-is (its length becomes the vector length).
    pub fn from_dvector(values: DVector<f32>) -> Self {
        Self { values }
    }

    /// All-zero vector of the given length.
    pub fn zeros(input_dim: usize) -> Self {
        Self {
            values: DVector::zeros(input_dim),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        self.values.as_slice()
    }

    pub fn as_dvector(&self) -> &DVector<f32> {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values.as_slice().to_vec()
    }
}

impl From<ImageVector> for DVector<f32> {
    fn from(v: ImageVector) -> Self {
        v.values
    }
}
