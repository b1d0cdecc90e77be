//! TCP listener for the StackLink protocol

use std::sync::Arc;

use anyhow::Result;
use stacklink_device::{Engine, SharedDevice};
use tokio::net::TcpListener;
use tracing::info;

use crate::session;

/// Accept connections forever, spawning one session task per client.
///
/// A session ending - peer close or write failure - never affects the
/// listener, the other sessions, or the shared device state.
pub async fn serve(listener: TcpListener, device: SharedDevice) -> Result<()> {
    let engine = Arc::new(Engine::new());
    info!("TCP server listening on {}", listener.local_addr()?);

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("accepted connection from {}", addr);

        let device = device.clone();
        let engine = engine.clone();
        tokio::spawn(async move {
            session::run(socket, addr, device, engine).await;
            info!("connection closed from {}", addr);
        });
    }
}
