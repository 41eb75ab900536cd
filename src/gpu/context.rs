//! Owner of the per-session GPU handles: instance, surface, device, queue.

use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

/// One `GpuContext` exists per viewing surface, created when the window
/// appears and dropped with the session. All other GPU objects borrow the
/// device and queue from here, so no process-wide GPU state exists and
/// independent viewer instances do not share anything.
pub struct GpuContext {
    _instance: wgpu::Instance,
    _adapter: wgpu::Adapter,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Bring up adapter, device, and a configured surface for `window`.
    ///
    /// # Errors
    /// Returns an error if no compatible adapter exists, the device request
    /// fails, or the surface cannot be created. The caller reports this
    /// through the error sink and keeps running without a surface.
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window)
            .context("creating rendering surface")?;

        pollster::block_on(async move {
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .context("no compatible GPU adapter found")?;

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("viewer device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                })
                .await
                .context("requesting GPU device")?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(wgpu::TextureFormat::is_srgb)
                .unwrap_or(caps.formats[0]);
            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width.max(1),
                height: size.height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                alpha_mode: caps.alpha_modes[0],
                view_formats: vec![],
                desired_maximum_frame_latency: 1,
            };
            surface.configure(&device, &config);

            Ok(Self {
                _instance: instance,
                _adapter: adapter,
                surface,
                device,
                queue,
                config,
            })
        })
    }

    /// Reconfigure the surface for a new window size. Zero dimensions are
    /// ignored (minimized window).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-apply the current configuration after a lost/outdated surface.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Acquire the next swapchain frame.
    ///
    /// # Errors
    /// Propagates [`wgpu::SurfaceError`]; the caller decides whether to
    /// reconfigure or skip the frame.
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    #[must_use]
    pub const fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[must_use]
    pub const fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    #[must_use]
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Current surface size in physical pixels.
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
