use first_triangle::{
    gpu::ContextRequest,
    wnd::{self, WndConfig},
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    wnd::run(WndConfig::default(), ContextRequest::default())?;
    tracing::info!("window closed");
    Ok(())
}
