use std::sync::Arc;

use anyhow::Context;

use crate::{
    frame::{FramePlan, Render, RenderState},
    gpu::{adapter, device, ContextRequest},
    SetupError, WndSize,
};

/// The window's surface and device plus the state rendered into it.
///
/// Fields drop in declaration order, so GPU resources go before the device
/// and the surface before its window.
#[derive(Debug)]
pub struct View {
    state: RenderState,
    queue: wgpu::Queue,
    device: wgpu::Device,
    config: wgpu::SurfaceConfiguration,
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    window: Arc<winit::window::Window>,
}
impl View {
    pub async fn new(
        window: Arc<winit::window::Window>,
        instance: &wgpu::Instance,
        request: &ContextRequest,
    ) -> Result<Self, SetupError> {
        let surface = instance.create_surface(window.clone())?;
        let adapter = adapter(instance, Some(&surface), request).await?;
        let (device, queue) = device(&adapter, request).await?;
        let size = WndSize::from(window.inner_size());
        let config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(SetupError::UnsupportedSurface)?;
        surface.configure(&device, &config);
        tracing::info!(
            width = config.width,
            height = config.height,
            format = ?config.format,
            "surface configured"
        );
        let state = RenderState::new(&device, config.format).await?;
        Ok(Self {
            state,
            queue,
            device,
            config,
            surface,
            adapter,
            window,
        })
    }

    pub fn window(&self) -> &winit::window::Window {
        &self.window
    }

    pub fn resize(&mut self, size: WndSize) {
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        tracing::debug!(?size, "surface resized");
    }

    fn reconfigure(&mut self) {
        let size = WndSize::from(self.window.inner_size());
        let Some(config) = self
            .surface
            .get_default_config(&self.adapter, size.width.max(1), size.height.max(1))
        else {
            return;
        };
        self.config = config;
        self.surface.configure(&self.device, &self.config);
    }
}
impl Render for View {
    fn plan(&self) -> FramePlan {
        self.state.plan()
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e).context("acquire frame"),
        };
        let desc = wgpu::TextureViewDescriptor::default();
        let view = frame.texture.create_view(&desc);
        let desc = wgpu::CommandEncoderDescriptor {
            label: Some("frame"),
        };
        let mut command = self.device.create_command_encoder(&desc);
        self.state.encode(&mut command, &view);
        self.queue.submit([command.finish()]);
        self.window.pre_present_notify();
        frame.present();
        Ok(())
    }
}
