use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    frame::FrameLoop,
    gpu::{instance, ContextRequest},
    view::View,
    SetupError, WndSize,
};

#[derive(Debug, Clone)]
pub struct WndConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}
impl Default for WndConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Window".into(),
        }
    }
}
impl WndConfig {
    pub fn attributes(&self) -> winit::window::WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.width, self.height))
    }
}

/// Opens the window, sets up rendering and runs the frame loop until the
/// window is closed.
pub fn run(config: WndConfig, request: ContextRequest) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(SetupError::from)?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut wnd = Wnd::new(config, request);
    event_loop.run_app(&mut wnd)?;
    match wnd.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[derive(Debug)]
pub struct Wnd {
    config: WndConfig,
    request: ContextRequest,
    instance: wgpu::Instance,
    view: Option<View>,
    frame_loop: FrameLoop,
    error: Option<anyhow::Error>,
}
impl Wnd {
    pub fn new(config: WndConfig, request: ContextRequest) -> Self {
        Self {
            config,
            request,
            instance: instance(),
            view: None,
            frame_loop: FrameLoop::new(),
            error: None,
        }
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        // release the surface and window before leaving the loop
        self.view = None;
        event_loop.exit();
    }

    fn setup(&self, event_loop: &ActiveEventLoop) -> Result<View, SetupError> {
        let window = event_loop.create_window(self.config.attributes())?;
        let window = Arc::new(window);
        tracing::info!(
            title = %self.config.title,
            size = ?WndSize::from(window.inner_size()),
            "window created"
        );
        pollster::block_on(View::new(window, &self.instance, &self.request))
    }
}
impl ApplicationHandler for Wnd {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        tracing::info!("resumed");
        if self.view.is_some() {
            return;
        }
        match self.setup(event_loop) {
            Ok(view) => self.view = Some(view),
            Err(e) => self.fail(event_loop, e.into()),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.frame_loop.request_close();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(view) = self.view.as_mut() {
                    view.resize(size.into());
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(view) = self.view.as_mut() else {
                    return;
                };
                match self.frame_loop.step(view) {
                    Ok(true) => (),
                    Ok(false) => event_loop.exit(),
                    Err(e) => self.fail(event_loop, e),
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.frame_loop.should_close() {
            return;
        }
        if let Some(view) = &self.view {
            view.window().request_redraw();
        }
    }
}
