//! Compute backend of the demo binaries, fixed at compile time.
//!
//! `cuda` takes precedence over `wgpu`; with neither enabled the demos run on
//! the `ndarray` CPU backend, which is the default feature. Metric scoring
//! itself happens on host vectors, so only the explainer and model calls
//! run on the selected device.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "cuda")] {
        use burn::backend::cuda::{Cuda, CudaDevice};

        pub type SelectedBackend = Cuda;
        pub type SelectedDevice = CudaDevice;

        /// First CUDA device.
        pub fn create_device() -> SelectedDevice {
            CudaDevice::default()
        }

        pub const fn get_backend_name() -> &'static str {
            "cuda"
        }
    } else if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        pub type SelectedBackend = Wgpu;
        pub type SelectedDevice = WgpuDevice;

        /// Best adapter wgpu finds.
        pub fn create_device() -> SelectedDevice {
            WgpuDevice::default()
        }

        pub const fn get_backend_name() -> &'static str {
            "wgpu"
        }
    } else {
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        pub type SelectedBackend = NdArray<f32>;
        pub type SelectedDevice = NdArrayDevice;

        pub fn create_device() -> SelectedDevice {
            NdArrayDevice::Cpu
        }

        pub const fn get_backend_name() -> &'static str {
            "ndarray (cpu)"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_device_builds_tensors() {
        let device = create_device();
        let tensor = burn::tensor::Tensor::<SelectedBackend, 1>::ones([3], &device);
        assert_eq!(tensor.dims(), [3]);
        assert!(!get_backend_name().is_empty());
    }
}
