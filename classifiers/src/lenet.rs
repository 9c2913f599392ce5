//! LeNet with adaptive pooling.
//!
//! The adaptive pooling stage fixes the feature size ahead of the dense
//! layers, so the same network scores 28×28 digits and 56×56 mosaics of them.

use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
    Linear, LinearConfig, Relu,
};
use burn::prelude::*;

use crate::Classifier;

const POOLED_SIZE: usize = 4;
const FEATURES: usize = 16;

/// LeNet configuration.
#[derive(Config, Debug)]
pub struct LeNetConfig {
    /// Number of input channels (1 for MNIST, 3 for CIFAR-10).
    #[config(default = 1)]
    pub channels: usize,
    /// Number of output classes.
    #[config(default = 10)]
    pub num_classes: usize,
}

impl LeNetConfig {
    /// Initialize a LeNet with freshly sampled weights.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LeNet<B> {
        let flattened = FEATURES * POOLED_SIZE * POOLED_SIZE;

        LeNet {
            conv_1: Conv2dConfig::new([self.channels, 6], [5, 5]).init(device),
            conv_2: Conv2dConfig::new([6, FEATURES], [5, 5]).init(device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            adaptive_pool: AdaptiveAvgPool2dConfig::new([POOLED_SIZE, POOLED_SIZE]).init(),
            fc_1: LinearConfig::new(flattened, 120).init(device),
            fc_2: LinearConfig::new(120, 84).init(device),
            fc_3: LinearConfig::new(84, self.num_classes).init(device),
            relu: Relu::new(),
        }
    }
}

/// LeNet image classifier over `[batch, channels, height, width]`.
#[derive(Module, Debug)]
pub struct LeNet<B: Backend> {
    conv_1: Conv2d<B>,
    conv_2: Conv2d<B>,
    pool: MaxPool2d,
    adaptive_pool: AdaptiveAvgPool2d,
    fc_1: Linear<B>,
    fc_2: Linear<B>,
    fc_3: Linear<B>,
    relu: Relu,
}

impl<B: Backend> LeNet<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.pool.forward(self.relu.forward(self.conv_1.forward(input)));
        let x = self.pool.forward(self.relu.forward(self.conv_2.forward(x)));
        let x = self.adaptive_pool.forward(x);
        let x: Tensor<B, 2> = x.flatten(1, 3);
        let x = self.relu.forward(self.fc_1.forward(x));
        let x = self.relu.forward(self.fc_2.forward(x));
        self.fc_3.forward(x)
    }
}

impl<B: Backend> Classifier<B, 4> for LeNet<B> {
    fn logits(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        self.forward(input)
    }

    fn num_classes(&self) -> usize {
        self.fc_3.weight.val().dims()[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn scores_digits_and_mosaics() {
        let device = Default::default();
        let model = LeNetConfig::new().init::<TestBackend>(&device);

        let digits = Tensor::<TestBackend, 4>::zeros([2, 1, 28, 28], &device);
        assert_eq!(model.logits(digits).dims(), [2, 10]);

        let mosaics = Tensor::<TestBackend, 4>::zeros([3, 1, 56, 56], &device);
        assert_eq!(model.logits(mosaics).dims(), [3, 10]);
        assert_eq!(model.num_classes(), 10);
    }

    #[test]
    fn accepts_colour_images() {
        let device = Default::default();
        let model = LeNetConfig::new()
            .with_channels(3)
            .with_num_classes(4)
            .init::<TestBackend>(&device);

        let images = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        assert_eq!(model.forward(images).dims(), [1, 4]);
    }
}
