pub mod frame;
pub mod geometry;
pub mod gpu;
pub mod shader;
pub mod view;
pub mod wnd;

/// Failures that stop the program before the first frame.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to initialize the event loop")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create the window")]
    CreateWindow(#[from] winit::error::OsError),
    #[error("failed to create the surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no adapter compatible with the surface")]
    NoAdapter,
    #[error("failed to request a device")]
    RequestDevice(#[source] wgpu::RequestDeviceError),
    #[error("surface does not support the adapter")]
    UnsupportedSurface,
    #[error(transparent)]
    ShaderBuild(#[from] shader::BuildFailure),
}

/// Size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WndSize {
    pub width: u32,
    pub height: u32,
}
impl WndSize {
    /// Framebuffer size for a window of `width`×`height` logical pixels.
    pub fn from_logical(width: u32, height: u32, scale_factor: f64) -> Self {
        let size = winit::dpi::LogicalSize::new(width, height);
        let size: winit::dpi::PhysicalSize<u32> = size.to_physical(scale_factor);
        size.into()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
impl From<winit::dpi::PhysicalSize<u32>> for WndSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framebuffer_keeps_aspect() {
        let dims = [(800, 600), (1, 1), (1920, 1080), (640, 480), (37, 1013)];
        let scales = [1., 1.25, 1.5, 2., 3.];
        for (width, height) in dims {
            for scale in scales {
                let size = WndSize::from_logical(width, height, scale);
                assert!(!size.is_empty());
                // rounding moves each side by at most one pixel
                let lhs = size.width as f64 * height as f64;
                let rhs = size.height as f64 * width as f64;
                let tolerance = (width + height) as f64;
                assert!(
                    (lhs - rhs).abs() <= tolerance,
                    "{width}x{height} @ {scale} -> {size:?}"
                );
            }
        }
    }

    #[test]
    fn test_default_window_size() {
        let size = WndSize::from_logical(800, 600, 1.);
        assert_eq!(
            size,
            WndSize {
                width: 800,
                height: 600
            }
        );
    }
}
