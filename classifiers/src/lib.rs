//! Classifiers for localisation-metric evaluation.
//!
//! This crate provides small channel-first classifiers whose only job is to be
//! explained: an adaptive-pooling LeNet for images and a 1-D convolutional
//! network for signals. Both expose their logits through [`Classifier`] so the
//! metric engine can wrap either one behind the same model interface.

use burn::prelude::*;

mod lenet;
mod signal;

pub use lenet::{LeNet, LeNetConfig};
pub use signal::{SignalNet, SignalNetConfig};

/// A classifier over channel-first batches of rank `D` (batch axis included).
pub trait Classifier<B: Backend, const D: usize> {
    /// Raw class scores with shape `[batch, num_classes]`.
    fn logits(&self, input: Tensor<B, D>) -> Tensor<B, 2>;

    /// Number of classes the classifier scores.
    fn num_classes(&self) -> usize;
}
