//! Per-connection session loop

use std::net::SocketAddr;
use std::sync::Arc;

use stacklink_device::{Engine, SharedDevice};
use stacklink_shared::codec::{encode_reply, LineDecoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Drive one connection until the peer closes or a write fails.
///
/// Each complete line is executed to completion - simulated delay included -
/// before the next buffered line is taken, and every response goes out as a
/// single write. The device lock is only held inside [`Engine::execute`],
/// never while waiting for bytes.
pub async fn run(
    mut socket: TcpStream,
    addr: SocketAddr,
    device: SharedDevice,
    engine: Arc<Engine>,
) {
    let mut decoder = LineDecoder::new();
    let mut buf = vec![0u8; 1024];

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) => return,
            Ok(n) => n,
            Err(e) => {
                warn!("read error from {}: {}", addr, e);
                return;
            }
        };
        decoder.extend(&buf[..n]);

        while let Some(line) = decoder.next_line() {
            if line.is_empty() {
                continue;
            }
            let echo = line.trim().to_string();
            let reply = engine.execute(&device, &line).await;
            debug!("{} '{}' -> {}", addr, echo, reply.code);

            let response = encode_reply(&echo, &reply);
            if let Err(e) = socket.write_all(&response).await {
                warn!("client {} disconnected during response: {}", addr, e);
                return;
            }
        }
    }
}
