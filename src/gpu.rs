use crate::SetupError;

/// What the program asks of the graphics driver.
///
/// The downlevel limits match the GL 3.3 core class of hardware.
#[derive(Debug, Clone)]
pub struct ContextRequest {
    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
}
impl Default for ContextRequest {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::default(),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}

pub fn instance() -> wgpu::Instance {
    wgpu::Instance::default()
}
/// handle to graphics card
pub async fn adapter(
    instance: &wgpu::Instance,
    surface: Option<&wgpu::Surface<'_>>,
    request: &ContextRequest,
) -> Result<wgpu::Adapter, SetupError> {
    let options = wgpu::RequestAdapterOptions {
        power_preference: request.power_preference,
        compatible_surface: surface,
        force_fallback_adapter: false,
    };
    let adapter = instance
        .request_adapter(&options)
        .await
        .ok_or(SetupError::NoAdapter)?;
    let info = adapter.get_info();
    tracing::info!(adapter = %info.name, backend = ?info.backend, "adapter selected");
    Ok(adapter)
}
pub async fn device(
    adapter: &wgpu::Adapter,
    request: &ContextRequest,
) -> Result<(wgpu::Device, wgpu::Queue), SetupError> {
    let trace_path = None;
    let desc = wgpu::DeviceDescriptor {
        label: Some("device"),
        required_features: request.required_features,
        required_limits: request.required_limits.clone(),
        memory_hints: wgpu::MemoryHints::Performance,
    };
    let device = adapter
        .request_device(&desc, trace_path)
        .await
        .map_err(SetupError::RequestDevice)?;
    Ok(device)
}

/// Device without a surface, for tests. `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) async fn headless() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = instance();
    let request = ContextRequest::default();
    let adapter = match adapter(&instance, None, &request).await {
        Ok(adapter) => adapter,
        Err(_) => {
            let options = wgpu::RequestAdapterOptions {
                force_fallback_adapter: true,
                ..Default::default()
            };
            instance.request_adapter(&options).await?
        }
    };
    device(&adapter, &request).await.ok()
}
