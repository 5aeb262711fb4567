//! Cross-site intensity harmonization.
//!
//! Stub: a per-image z-score normalization standing in for a learned
//! cross-site style-transfer model. It removes per-image offset and gain but
//! does not map one site's intensity distribution onto another's.

use nalgebra::DVector;

use crate::loader::ImageVector;

/// Added to the standard deviation so constant images map to zeros.
pub const HARMONIZE_EPSILON: f32 = 1e-8;

/// Stateless intensity harmonizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Harmonizer;

impl Harmonizer {
    pub fn new() -> Self {
        Self
    }

    /// Return `(x - mean) / (std + eps)` element-wise.
    ///
    /// `std` is the population standard deviation over all elements.
    /// Idempotence is not guaranteed; a second pass only approximates the
    /// first within floating-point rounding.
    pub fn harmonize_image(&self, image: &ImageVector) -> ImageVector {
        let x = image.as_dvector();
        if x.is_empty() {
            return image.clone();
        }

        let (mean, std) = mean_std(x);
        let denom = std + HARMONIZE_EPSILON;
        ImageVector::from_dvector(x.map(|v| (v - mean) / denom))
    }
}

/// Population mean and standard deviation, accumulated in `f64`.
fn mean_std(x: &DVector<f32>) -> (f32, f32) {
    let n = x.len() as f64;
    let mean = x.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = x
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    (mean as f32, var.sqrt() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn output_has_zero_mean_unit_std() {
        let img = ImageVector::from_flat(crate::test_utils::ramp(128), 128);
        let out = Harmonizer::new().harmonize_image(&img);
        let (mean, std) = mean_std(out.as_dvector());
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn constant_image_maps_to_zeros() {
        let img = ImageVector::from_flat(vec![42.0; 128], 128);
        let out = Harmonizer::new().harmonize_image(&img);
        assert_eq!(out.len(), 128);
        assert!(out.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn known_values() {
        let img = ImageVector::from_flat(vec![1.0, 3.0], 2);
        let out = Harmonizer::new().harmonize_image(&img);
        assert_abs_diff_eq!(out.as_slice()[0], -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.as_slice()[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn deterministic() {
        let img = ImageVector::from_flat(vec![5.0, -2.0, 0.5, 9.0], 8);
        let h = Harmonizer::new();
        assert_eq!(h.harmonize_image(&img), h.harmonize_image(&img));
    }

    #[test]
    fn second_pass_only_approximates_first() {
        // Large-scale input: once is far from the input, twice stays close
        // to once but is not assumed to equal it.
        let img = ImageVector::from_flat((0..128).map(|i| 100.0 + 3.0 * i as f32).collect(), 128);
        let h = Harmonizer::new();
        let once = h.harmonize_image(&img);
        let twice = h.harmonize_image(&once);
        assert_ne!(img, once);
        for (a, b) in once.as_slice().iter().zip(twice.as_slice()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn empty_image_passes_through() {
        let img = ImageVector::zeros(0);
        assert!(Harmonizer::new().harmonize_image(&img).is_empty());
    }
}
