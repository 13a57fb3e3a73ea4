// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Burn code is generic over `B: Backend`; the concrete backend
// is picked once at the top of a command. A closure can't be
// generic over a type parameter, so work that needs a backend is
// expressed as a BackendTask and handed to dispatch().
//
//   Wgpu: GPU through wgpu (Vulkan / Metal / DX12)
//   Cpu:  burn-ndarray, always available

use anyhow::Result;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

pub type GpuBackend = burn::backend::Wgpu;
pub type CpuBackend = burn::backend::NdArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComputeBackend {
    #[default]
    Wgpu,
    Cpu,
}

/// A unit of work that runs on whichever backend was selected.
pub trait BackendTask {
    type Output;

    fn run<B: Backend>(self, device: B::Device) -> Result<Self::Output>;
}

pub fn dispatch<T: BackendTask>(backend: ComputeBackend, task: T) -> Result<T::Output> {
    match backend {
        ComputeBackend::Wgpu => {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            task.run::<GpuBackend>(device)
        }
        ComputeBackend::Cpu => {
            let device = burn::backend::ndarray::NdArrayDevice::default();
            tracing::info!("Using CPU (ndarray) backend");
            task.run::<CpuBackend>(device)
        }
    }
}
