use anyhow::Result;
use stacklink_device::config::StopKind;
use stacklink_device::{DeviceConfig, DeviceState, SharedDevice};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Protocol port of the physical device.
const DEFAULT_PORT: u16 = 7000;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let port = match std::env::var("STACKLINK_PORT") {
        Ok(raw) => raw.parse()?,
        Err(_) => DEFAULT_PORT,
    };

    let config = DeviceConfig::default_layout();
    let stacks = config
        .stops
        .iter()
        .filter(|s| matches!(s.kind, StopKind::Stack { .. }))
        .count();
    info!(
        "Virtual StackLink starting: {} stops, {} stacks",
        config.stop_count(),
        stacks
    );

    let device = SharedDevice::new(DeviceState::new(config));
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;

    stacklink_server::listener::serve(listener, device).await
}
