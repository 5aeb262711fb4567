//! Shared fixtures for file-based unit tests.

use std::io::Write;
use std::path::Path;

use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_dictionary_std::{tags, uids};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};

/// Write an uncompressed single-file NIfTI-1 volume of `f32` voxels.
///
/// `shape` is `[nx, ny, nz]`; `voxels` are given in file (x-fastest) order.
pub(crate) fn write_nifti_f32(path: &Path, shape: [u16; 3], voxels: &[f32]) {
    assert_eq!(
        voxels.len(),
        shape.iter().map(|&d| d as usize).product::<usize>()
    );
    let mut hdr = vec![0u8; 352];
    hdr[0..4].copy_from_slice(&348i32.to_le_bytes());
    let dim: [i16; 8] = [
        3,
        shape[0] as i16,
        shape[1] as i16,
        shape[2] as i16,
        1,
        1,
        1,
        1,
    ];
    for (i, d) in dim.iter().enumerate() {
        hdr[40 + 2 * i..42 + 2 * i].copy_from_slice(&d.to_le_bytes());
    }
    // datatype FLOAT32, 32 bits per voxel
    hdr[70..72].copy_from_slice(&16i16.to_le_bytes());
    hdr[72..74].copy_from_slice(&32i16.to_le_bytes());
    for i in 0..8 {
        hdr[76 + 4 * i..80 + 4 * i].copy_from_slice(&1.0f32.to_le_bytes());
    }
    // vox_offset, scl_slope
    hdr[108..112].copy_from_slice(&352.0f32.to_le_bytes());
    hdr[112..116].copy_from_slice(&1.0f32.to_le_bytes());
    hdr[344..348].copy_from_slice(b"n+1\0");

    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(&hdr).unwrap();
    for v in voxels {
        f.write_all(&v.to_le_bytes()).unwrap();
    }
}

/// Flatten a file-order (x-fastest) volume into logical row-major order:
/// x outermost, z innermost.
pub(crate) fn c_order(shape: [u16; 3], voxels: &[f32]) -> Vec<f32> {
    let [nx, ny, nz] = shape.map(usize::from);
    let mut out = Vec::with_capacity(voxels.len());
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                out.push(voxels[x + nx * y + nx * ny * z]);
            }
        }
    }
    out
}

/// Write a single-frame, native explicit-VR little-endian DICOM file with
/// unsigned 16-bit monochrome pixels in row-major order.
///
/// A non-identity modality rescale (slope 2, intercept -100) is recorded so
/// tests can tell stored values from rescaled ones.
pub(crate) fn write_dicom_u16(path: &Path, rows: u16, cols: u16, pixels: &[u16]) {
    assert_eq!(pixels.len(), rows as usize * cols as usize);
    let sop_instance = "2.25.302917834761093248712";

    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(uids::SECONDARY_CAPTURE_IMAGE_STORAGE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(sop_instance),
    ));
    obj.put(DataElement::new(tags::SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1u16)));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(rows)));
    obj.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(cols)));
    obj.put(DataElement::new(tags::BITS_ALLOCATED, VR::US, PrimitiveValue::from(16u16)));
    obj.put(DataElement::new(tags::BITS_STORED, VR::US, PrimitiveValue::from(16u16)));
    obj.put(DataElement::new(tags::HIGH_BIT, VR::US, PrimitiveValue::from(15u16)));
    obj.put(DataElement::new(tags::PIXEL_REPRESENTATION, VR::US, PrimitiveValue::from(0u16)));
    obj.put(DataElement::new(tags::RESCALE_SLOPE, VR::DS, PrimitiveValue::from("2")));
    obj.put(DataElement::new(tags::RESCALE_INTERCEPT, VR::DS, PrimitiveValue::from("-100")));
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(pixels.iter().copied().collect()),
    ));

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                .media_storage_sop_class_uid(uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
                .media_storage_sop_instance_uid(sop_instance),
        )
        .unwrap();
    file.write_to_file(path).unwrap();
}

/// Deterministic ramp in `[0, 1)` of the given length.
pub(crate) fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32 / n as f32).collect()
}
