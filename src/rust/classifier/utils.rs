use ndarray::Array1;

/// A sparse feature vector with strictly increasing indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Builds a vector from `(index, value)` pairs sorted by index.
    pub(crate) fn from_sorted(pairs: Vec<(usize, f64)>) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    pub fn dot(&self, dense: &Array1<f64>) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }

    /// Scales the vector to unit L2 norm; the zero vector stays zero.
    pub(crate) fn l2_normalize(&mut self) {
        let norm = self.squared_norm().sqrt();
        if norm > 1e-10 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }
}

/// Numerically stable logistic function.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_is_symmetric_and_bounded() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(3.0) + sigmoid(-3.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
    }

    #[test]
    fn test_normalize_and_dot() {
        let mut v = SparseVector::from_sorted(vec![(0, 3.0), (2, 4.0)]);
        v.l2_normalize();
        assert!((v.squared_norm() - 1.0).abs() < 1e-12);
        let dense = Array1::from(vec![1.0, 10.0, 1.0]);
        assert!((v.dot(&dense) - 1.4).abs() < 1e-12);

        let mut zero = SparseVector::default();
        zero.l2_normalize();
        assert!(zero.is_empty());
    }
}
