//! Device acquisition without a window

use std::sync::Arc;

/// Device and queue shared by the pipeline stages
#[derive(Clone)]
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self { device, queue }
    }

    /// Request any adapter with default limits, or `None` if there is no GPU
    pub async fn headless() -> Option<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("[GpuContext] Using adapter '{}' ({:?})", info.name, info.backend);

        let (device, queue) = match adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Spur Engine Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                log::warn!("[GpuContext] Device request failed: {}", e);
                return None;
            }
        };

        Some(Self::new(Arc::new(device), Arc::new(queue)))
    }

    /// Blocking variant of [`GpuContext::headless`]
    pub fn headless_blocking() -> Option<Self> {
        pollster::block_on(Self::headless())
    }
}
