use ndarray::Array1;
use serde::{Deserialize, Serialize};
use log::{debug, info, warn};

use super::error::ClassifierError;
use super::utils::{sigmoid, SparseVector};
use super::Label;
use crate::config::LogisticConfig;

/// Binary L2-regularised logistic regression over sparse features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    intercept: f64,
}

/// Diagnostics from a fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    pub iterations: usize,
    pub converged: bool,
    pub gradient_norm: f64,
}

impl LogisticRegression {
    pub fn from_parts(weights: Array1<f64>, intercept: f64) -> Self {
        Self { weights, intercept }
    }

    /// Fits the model by Nesterov-accelerated full-batch gradient descent.
    ///
    /// Minimises `(1/n) Σ logloss + ‖w‖² / (2·C·n)` with an unpenalised
    /// intercept. The step size is the inverse of the gradient's Lipschitz
    /// bound, so the run is deterministic for fixed inputs. A training set
    /// containing a single class is accepted.
    ///
    /// # Errors
    /// - `EmptyTrainingSet` if `x` is empty
    /// - `LengthMismatch` if `x` and `y` differ in length
    /// - `InvalidParameter` for non-positive `C` or `tolerance`
    /// - `Diverged` if the weights become non-finite
    pub fn fit(
        x: &[SparseVector],
        y: &[Label],
        n_features: usize,
        config: &LogisticConfig,
    ) -> Result<(Self, FitSummary), ClassifierError> {
        if x.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(ClassifierError::LengthMismatch { texts: x.len(), labels: y.len() });
        }
        if !(config.c > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!("C must be positive, got {}", config.c)));
        }
        if !(config.tolerance > 0.0) {
            return Err(ClassifierError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                config.tolerance
            )));
        }
        if let Some((i, bad)) = x.iter().enumerate().find_map(|(i, row)| {
            row.iter().find(|&(idx, _)| idx >= n_features).map(|(idx, _)| (i, idx))
        }) {
            return Err(ClassifierError::InvalidParameter(format!(
                "row {} has feature index {} but only {} features exist",
                i, bad, n_features
            )));
        }

        let n = x.len() as f64;
        let targets: Vec<f64> = y.iter().map(Label::target).collect();
        let penalty = 1.0 / (config.c * n);
        let max_sq_norm = x.iter().map(SparseVector::squared_norm).fold(0.0, f64::max);
        let lipschitz = 0.25 * (max_sq_norm + 1.0) + penalty;
        let step = 1.0 / lipschitz;

        let mut w = Array1::<f64>::zeros(n_features);
        let mut b = 0.0;
        let mut w_prev = w.clone();
        let mut b_prev = b;

        let mut summary = FitSummary {
            iterations: 0,
            converged: false,
            gradient_norm: f64::INFINITY,
        };

        for iter in 1..=config.max_iter {
            let momentum = (iter as f64 - 1.0) / (iter as f64 + 2.0);
            let look_w = &w + &((&w - &w_prev) * momentum);
            let look_b = b + momentum * (b - b_prev);

            let (grad_w, grad_b) = Self::gradient(x, &targets, &look_w, look_b, penalty);
            let grad_norm = grad_w.iter().fold(grad_b.abs(), |acc, g| acc.max(g.abs()));

            summary.iterations = iter;
            summary.gradient_norm = grad_norm;
            if grad_norm < config.tolerance {
                w = look_w;
                b = look_b;
                summary.converged = true;
                break;
            }

            w_prev = std::mem::replace(&mut w, &look_w - &(grad_w * step));
            b_prev = std::mem::replace(&mut b, look_b - step * grad_b);

            if !b.is_finite() || w.iter().any(|v| !v.is_finite()) {
                return Err(ClassifierError::Diverged(iter));
            }
            if iter % 100 == 0 {
                debug!("iteration {}: gradient max-norm {:.3e}", iter, grad_norm);
            }
        }

        if summary.converged {
            info!("Logistic regression converged after {} iterations", summary.iterations);
        } else {
            warn!(
                "Logistic regression stopped after {} iterations without converging (gradient {:.3e})",
                summary.iterations, summary.gradient_norm
            );
        }

        Ok((Self { weights: w, intercept: b }, summary))
    }

    fn gradient(
        x: &[SparseVector],
        targets: &[f64],
        w: &Array1<f64>,
        b: f64,
        penalty: f64,
    ) -> (Array1<f64>, f64) {
        let n = x.len() as f64;
        let mut grad_w = Array1::<f64>::zeros(w.len());
        let mut grad_b = 0.0;
        for (row, &target) in x.iter().zip(targets) {
            let residual = sigmoid(row.dot(w) + b) - target;
            for (idx, value) in row.iter() {
                grad_w[idx] += residual * value;
            }
            grad_b += residual;
        }
        grad_w /= n;
        grad_w.scaled_add(penalty, w);
        (grad_w, grad_b / n)
    }

    pub fn decision_function(&self, x: &SparseVector) -> f64 {
        x.dot(&self.weights) + self.intercept
    }

    /// Probability of the spam class.
    pub fn predict_proba(&self, x: &SparseVector) -> f64 {
        sigmoid(self.decision_function(x))
    }

    pub fn predict(&self, x: &SparseVector) -> Label {
        Label::from_score(self.predict_proba(x))
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}
