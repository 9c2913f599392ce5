//! 1-D convolutional classifier for channel-first signals.

use burn::nn::{
    conv::{Conv1d, Conv1dConfig},
    pool::{AdaptiveAvgPool1d, AdaptiveAvgPool1dConfig, MaxPool1d, MaxPool1dConfig},
    Linear, LinearConfig, Relu,
};
use burn::prelude::*;

use crate::Classifier;

const POOLED_LENGTH: usize = 8;
const FEATURES: usize = 16;

/// Signal classifier configuration.
#[derive(Config, Debug)]
pub struct SignalNetConfig {
    /// Number of input channels.
    #[config(default = 1)]
    pub channels: usize,
    /// Number of output classes.
    #[config(default = 10)]
    pub num_classes: usize,
    /// Kernel size of both convolutions.
    #[config(default = 5)]
    pub kernel_size: usize,
}

impl SignalNetConfig {
    /// Initialize a signal classifier with freshly sampled weights.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> SignalNet<B> {
        SignalNet {
            conv_1: Conv1dConfig::new(self.channels, 8, self.kernel_size).init(device),
            conv_2: Conv1dConfig::new(8, FEATURES, self.kernel_size).init(device),
            pool: MaxPool1dConfig::new(2).with_stride(2).init(),
            adaptive_pool: AdaptiveAvgPool1dConfig::new(POOLED_LENGTH).init(),
            fc_1: LinearConfig::new(FEATURES * POOLED_LENGTH, 64).init(device),
            fc_2: LinearConfig::new(64, self.num_classes).init(device),
            relu: Relu::new(),
        }
    }
}

/// Signal classifier over `[batch, channels, length]`.
#[derive(Module, Debug)]
pub struct SignalNet<B: Backend> {
    conv_1: Conv1d<B>,
    conv_2: Conv1d<B>,
    pool: MaxPool1d,
    adaptive_pool: AdaptiveAvgPool1d,
    fc_1: Linear<B>,
    fc_2: Linear<B>,
    relu: Relu,
}

impl<B: Backend> SignalNet<B> {
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let x = self.pool.forward(self.relu.forward(self.conv_1.forward(input)));
        let x = self.relu.forward(self.conv_2.forward(x));
        let x = self.adaptive_pool.forward(x);
        let x: Tensor<B, 2> = x.flatten(1, 2);
        let x = self.relu.forward(self.fc_1.forward(x));
        self.fc_2.forward(x)
    }
}

impl<B: Backend> Classifier<B, 3> for SignalNet<B> {
    fn logits(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        self.forward(input)
    }

    fn num_classes(&self) -> usize {
        self.fc_2.weight.val().dims()[1]
    }
}
