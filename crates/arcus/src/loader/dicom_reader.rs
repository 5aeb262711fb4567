//! DICOM pixel-array extraction.

use std::path::Path;

use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};

use super::DataFormatError;

/// Read every frame of the stored pixel data as `f32`, flattened in
/// frame → row → column → sample order.
///
/// Stored values are returned without the modality rescale.
pub(crate) fn read_dicom_pixels(path: &Path) -> Result<Vec<f32>, DataFormatError> {
    let obj = dicom_object::open_file(path).map_err(|e| DataFormatError::dicom(path, e))?;
    let decoded = obj
        .decode_pixel_data()
        .map_err(|e| DataFormatError::dicom(path, e))?;

    tracing::debug!(
        "DICOM {}: {} frame(s), {}x{}, {} sample(s)/px",
        path.display(),
        decoded.number_of_frames(),
        decoded.rows(),
        decoded.columns(),
        decoded.samples_per_pixel(),
    );

    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    decoded
        .to_vec_with_options::<f32>(&options)
        .map_err(|e| DataFormatError::dicom(path, e))
}
