//! NIfTI volume extraction.

use std::path::Path;

use ::nifti::{IntoNdArray, NiftiObject, ReaderOptions};

use super::DataFormatError;

/// Read a NIfTI volume as `f32`, flattened in row-major order over the
/// volume axes. Header scaling (`scl_slope`/`scl_inter`) is applied.
pub(crate) fn read_nifti_voxels(path: &Path) -> Result<Vec<f32>, DataFormatError> {
    let obj = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| DataFormatError::nifti(path, e))?;

    let dim = obj.header().dim;
    tracing::debug!("NIfTI {}: dim={:?}", path.display(), dim);

    let volume = obj
        .into_volume()
        .into_ndarray::<f32>()
        .map_err(|e| DataFormatError::nifti(path, e))?;

    Ok(volume.iter().copied().collect())
}
