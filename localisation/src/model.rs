//! The model collaborator seen by the metric engine.
//!
//! Metrics never call a classifier directly. They go through
//! [`ModelInterface`], which adds an evaluation/training mode flag, optional
//! device placement and optional softmax on top of raw logits.

use core::marker::PhantomData;

use burn::{prelude::*, tensor::activation::softmax};
use classifiers::Classifier;

use crate::error::{LocalisationError, LocalisationResult};

/// A classifier as seen by metrics and explainers.
pub trait ModelInterface<B: Backend, const D: usize> {
    /// Class scores with shape `[batch, num_classes]`.
    ///
    /// # Errors
    ///
    /// Returns `Err(LocalisationError::InvalidModelState)` if the model is in
    /// training mode.
    fn predict(
        &self,
        inputs: Tensor<B, D>,
        softmax: bool,
        device: Option<&B::Device>,
    ) -> LocalisationResult<Tensor<B, 2>>;

    /// Whether the model is in training mode.
    fn is_training(&self) -> bool;
}

/// Adapts any [`Classifier`] to [`ModelInterface`].
///
/// A freshly wrapped model is in evaluation mode.
#[derive(Debug, Clone)]
pub struct ModelWrapper<B: Backend, M> {
    model: M,
    training: bool,
    _backend: PhantomData<B>,
}

impl<B: Backend, M> ModelWrapper<B, M> {
    pub const fn new(model: M) -> Self {
        Self {
            model,
            training: false,
            _backend: PhantomData,
        }
    }

    /// Switches to evaluation mode.
    #[must_use]
    pub fn eval(mut self) -> Self {
        self.training = false;
        self
    }

    /// Switches to training mode. Metrics refuse a model in this mode.
    #[must_use]
    pub fn train(mut self) -> Self {
        self.training = true;
        self
    }

    pub const fn inner(&self) -> &M {
        &self.model
    }
}

impl<B, M, const D: usize> ModelInterface<B, D> for ModelWrapper<B, M>
where
    B: Backend,
    M: Classifier<B, D>,
{
    fn predict(
        &self,
        inputs: Tensor<B, D>,
        apply_softmax: bool,
        device: Option<&B::Device>,
    ) -> LocalisationResult<Tensor<B, 2>> {
        if self.training {
            return Err(LocalisationError::InvalidModelState {
                reason: "model is in training mode, call eval() before predicting".to_owned(),
            });
        }

        let inputs = match device {
            Some(device) => inputs.to_device(device),
            None => inputs,
        };
        let logits = self.model.logits(inputs);

        Ok(if apply_softmax {
            softmax(logits, 1)
        } else {
            logits
        })
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestBackend;
    use approx::assert_relative_eq;
    use classifiers::SignalNetConfig;

    #[test]
    fn wrapped_model_starts_in_evaluation_mode() {
        let device = Default::default();
        let model = ModelWrapper::<TestBackend, _>::new(SignalNetConfig::new().init::<TestBackend>(&device));
        assert!(!ModelInterface::<TestBackend, 3>::is_training(&model));

        let model = model.train();
        assert!(ModelInterface::<TestBackend, 3>::is_training(&model));
        let model = model.eval();
        assert!(!ModelInterface::<TestBackend, 3>::is_training(&model));
    }

    #[test]
    fn predict_returns_one_row_per_sample() {
        let device = Default::default();
        let model = ModelWrapper::<TestBackend, _>::new(SignalNetConfig::new().init::<TestBackend>(&device));
        let inputs = Tensor::<TestBackend, 3>::ones([4, 1, 64], &device);

        let scores = model.predict(inputs, true, Some(&device)).unwrap();
        assert_eq!(scores.dims(), [4, 10]);

        let rows = scores.sum_dim(1).into_data().to_vec::<f32>().unwrap();
        for row in rows {
            assert_relative_eq!(row, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn predict_refuses_training_mode() {
        let device = Default::default();
        let model = ModelWrapper::<TestBackend, _>::new(SignalNetConfig::new().init::<TestBackend>(&device)).train();
        let inputs = Tensor::<TestBackend, 3>::ones([2, 1, 64], &device);

        match model.predict(inputs, false, None) {
            Err(LocalisationError::InvalidModelState { reason }) => {
                assert!(reason.contains("training"));
            }
            _ => panic!("Expected InvalidModelState error"),
        }
    }
}
