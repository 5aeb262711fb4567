//! Dense layers and the two-layer blocks the model heads are built from.

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Element-wise activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Identity,
    Relu,
    LeakyRelu { slope: f32 },
    Sigmoid,
}

impl Activation {
    #[inline]
    pub fn eval(self, v: f32) -> f32 {
        match self {
            Self::Identity => v,
            Self::Relu => v.max(0.0),
            Self::LeakyRelu { slope } => {
                if v >= 0.0 {
                    v
                } else {
                    slope * v
                }
            }
            Self::Sigmoid => 1.0 / (1.0 + (-v).exp()),
        }
    }
}

/// Fully connected layer `y = W x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    weight: DMatrix<f32>,
    bias: DVector<f32>,
}

impl Linear {
    /// Initialize weights and biases from `U(-1/sqrt(in), 1/sqrt(in))`.
    pub fn init<R: Rng + ?Sized>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_dim as f32).sqrt();
        let weight = DMatrix::from_fn(out_dim, in_dim, |_, _| rng.gen_range(-bound..bound));
        let bias = DVector::from_fn(out_dim, |_, _| rng.gen_range(-bound..bound));
        Self { weight, bias }
    }

    pub fn in_dim(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_dim(&self) -> usize {
        self.weight.nrows()
    }

    pub fn forward(&self, x: &DVector<f32>) -> DVector<f32> {
        &self.weight * x + &self.bias
    }

    /// Apply to every column of `x`.
    pub fn forward_batch(&self, x: &DMatrix<f32>) -> DMatrix<f32> {
        let mut y = &self.weight * x;
        for j in 0..y.ncols() {
            let mut col = y.column_mut(j);
            col += &self.bias;
        }
        y
    }
}

/// `out_act(second(hidden_act(first(x))))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoLayer {
    first: Linear,
    hidden_act: Activation,
    second: Linear,
    out_act: Activation,
}

impl TwoLayer {
    pub fn init<R: Rng + ?Sized>(
        in_dim: usize,
        hidden_dim: usize,
        out_dim: usize,
        hidden_act: Activation,
        out_act: Activation,
        rng: &mut R,
    ) -> Self {
        let first = Linear::init(in_dim, hidden_dim, rng);
        let second = Linear::init(hidden_dim, out_dim, rng);
        Self {
            first,
            hidden_act,
            second,
            out_act,
        }
    }

    pub fn in_dim(&self) -> usize {
        self.first.in_dim()
    }

    pub fn hidden_dim(&self) -> usize {
        self.first.out_dim()
    }

    pub fn out_dim(&self) -> usize {
        self.second.out_dim()
    }

    /// Layer shapes chain: `first.out == second.in`.
    pub(crate) fn is_consistent(&self) -> bool {
        self.first.out_dim() == self.second.in_dim()
            && self.first.weight.nrows() == self.first.bias.len()
            && self.second.weight.nrows() == self.second.bias.len()
    }

    pub fn forward(&self, x: &DVector<f32>) -> Result<DVector<f32>, ModelError> {
        check_len(self.in_dim(), x.len())?;
        let h = self.first.forward(x).map(|v| self.hidden_act.eval(v));
        Ok(self.second.forward(&h).map(|v| self.out_act.eval(v)))
    }

    pub fn forward_batch(&self, x: &DMatrix<f32>) -> Result<DMatrix<f32>, ModelError> {
        check_len(self.in_dim(), x.nrows())?;
        let h = self.first.forward_batch(x).map(|v| self.hidden_act.eval(v));
        Ok(self.second.forward_batch(&h).map(|v| self.out_act.eval(v)))
    }
}

fn check_len(expected: usize, got: usize) -> Result<(), ModelError> {
    if expected == got {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch { expected, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn activations() {
        assert_eq!(Activation::Relu.eval(-2.0), 0.0);
        assert_eq!(Activation::Relu.eval(3.0), 3.0);
        assert_abs_diff_eq!(Activation::LeakyRelu { slope: 0.2 }.eval(-2.0), -0.4);
        assert_eq!(Activation::LeakyRelu { slope: 0.2 }.eval(1.5), 1.5);
        assert_abs_diff_eq!(Activation::Sigmoid.eval(0.0), 0.5);
        assert_eq!(Activation::Sigmoid.eval(-1.0e4), 0.0);
        assert_eq!(Activation::Sigmoid.eval(1.0e4), 1.0);
        assert_eq!(Activation::Identity.eval(-7.0), -7.0);
    }

    #[test]
    fn init_respects_fan_in_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let layer = Linear::init(16, 8, &mut rng);
        let bound = 0.25;
        assert!(layer.weight.iter().all(|w| w.abs() <= bound));
        assert!(layer.bias.iter().all(|b| b.abs() <= bound));
        assert_eq!((layer.in_dim(), layer.out_dim()), (16, 8));
    }

    #[test]
    fn linear_known_values() {
        let w = DMatrix::from_row_slice(2, 3, &[1.0, 0.0, -1.0, 0.5, 0.5, 0.5]);
        let b = DVector::from_vec(vec![0.1, -0.1]);
        let layer = Linear { weight: w, bias: b };
        let y = layer.forward(&DVector::from_vec(vec![1.0, 2.0, 3.0]));
        assert_abs_diff_eq!(y[0], -1.9, epsilon = 1e-6);
        assert_abs_diff_eq!(y[1], 2.9, epsilon = 1e-6);
    }

    #[test]
    fn batch_matches_per_column() {
        let mut rng = StdRng::seed_from_u64(9);
        let block = TwoLayer::init(6, 5, 4, Activation::Relu, Activation::Sigmoid, &mut rng);
        let x = DMatrix::from_fn(6, 3, |i, j| (i as f32 - j as f32) * 0.3);
        let batch = block.forward_batch(&x).unwrap();
        for j in 0..3 {
            let col = block.forward(&x.column(j).into_owned()).unwrap();
            for i in 0..4 {
                assert_abs_diff_eq!(batch[(i, j)], col[i], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn wrong_input_length_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let block = TwoLayer::init(4, 3, 2, Activation::Relu, Activation::Identity, &mut rng);
        let err = block.forward(&DVector::zeros(5)).unwrap_err();
        assert_eq!(err, ModelError::DimensionMismatch { expected: 4, got: 5 });
    }
}
