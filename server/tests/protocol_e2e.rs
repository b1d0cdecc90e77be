//! End-to-end protocol tests over a real TCP connection

use std::collections::BTreeMap;
use std::net::SocketAddr;

use stacklink_device::config::Timings;
use stacklink_device::{DeviceConfig, DeviceState, SharedDevice};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{
    tcp::{OwnedReadHalf, OwnedWriteHalf},
    TcpListener, TcpStream,
};

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read),
            writer,
        }
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end_matches(['\r', '\n']).to_string()
    }

    /// Send a command and read back the echo and status line. List bodies
    /// are drained through their `End of List` terminator.
    async fn send(&mut self, command: &str) -> (String, Vec<String>) {
        self.send_raw(format!("{command}\r\n").as_bytes()).await;

        let echo = self.read_line().await;
        assert_eq!(echo, command, "response must echo the command");
        let status = self.read_line().await;

        let mut body = Vec::new();
        if has_body(&status) {
            loop {
                let line = self.read_line().await;
                if line == "End of List" {
                    break;
                }
                body.push(line);
            }
        }
        (status, body)
    }
}

/// Only list replies carry a body in this test suite.
fn has_body(status: &str) -> bool {
    status.starts_with("0000 Command list") || status.starts_with("0000 Track 1 has")
}

async fn start_server() -> (SocketAddr, SharedDevice) {
    let mut config = DeviceConfig::default_layout();
    config.timings = Timings::instant();
    let device = SharedDevice::new(DeviceState::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serve_device = device.clone();
    tokio::spawn(async move {
        let _ = stacklink_server::listener::serve(listener, serve_device).await;
    });
    (addr, device)
}

#[tokio::test]
async fn test_version_and_echo_framing() {
    let (addr, _device) = start_server().await;
    let mut client = Client::connect(addr).await;

    let (status, _) = client.send("VERSION").await;
    assert_eq!(status, "0000 StackLink Virtual 1.1.0 (configurable)");
}

#[tokio::test]
async fn test_unknown_command_keeps_connection_usable() {
    let (addr, _device) = start_server().await;
    let mut client = Client::connect(addr).await;

    let (status, _) = client.send("FOOBAR").await;
    assert_eq!(status, "0001 Unrecognized command");

    let (status, _) = client.send("GETNUMTRACKS").await;
    assert_eq!(status, "0000 1");
}

#[tokio::test]
async fn test_stub_command_response() {
    let (addr, _device) = start_server().await;
    let mut client = Client::connect(addr).await;

    let (status, _) = client.send("HOME").await;
    assert_eq!(status, "9999 No mock implementation for this command");
}

#[tokio::test]
async fn test_plate_transfer_sequence() {
    let (addr, device) = start_server().await;
    let mut client = Client::connect(addr).await;

    // The basic transfer flow: dispense at lift 1, carry to a camera stop,
    // carry to lift 2, return into the output stack.
    let (status, _) = client.send("DISPENSE 1,1").await;
    assert_eq!(status, "0000 Success");

    let (status, _) = client.send("MOVEPLATE 1,3,5").await;
    assert!(status.starts_with("0000 "));
    assert!(status.contains("5:Object"));

    let (status, _) = client.send("MOVEPLATE 1,5,4").await;
    assert!(status.starts_with("0000 "));

    let (status, _) = client.send("RETURN 1,2").await;
    assert_eq!(status, "0000 Success");

    let snap = device.snapshot().await;
    assert_eq!(snap.stacks[0].count, 19);
    assert_eq!(snap.stacks[1].count, 1);
    assert!(snap.stops.iter().all(|s| !s.has_plate));
}

#[tokio::test]
async fn test_fault_injection_changes_response() {
    let (addr, device) = start_server().await;
    let mut client = Client::connect(addr).await;

    assert!(device.set_error_flag("dispense_failure_1", true).await);
    let (status, _) = client.send("DISPENSE 1,1").await;
    assert_eq!(status, "2000 No object was dispensed");

    assert!(device.set_error_flag("dispense_failure_1", false).await);
    let (status, _) = client.send("DISPENSE 1,1").await;
    assert_eq!(status, "0000 Success");
}

#[tokio::test]
async fn test_list_commands_body_and_terminator() {
    let (addr, _device) = start_server().await;
    let mut client = Client::connect(addr).await;

    let (status, body) = client.send("LISTCOMMANDS ignore").await;
    assert_eq!(status, "0000 Command list (5 commands)");
    assert_eq!(
        body,
        vec![
            "GetIgnoreStop",
            "GetIgnoreStops",
            "IgnoreAllStops",
            "IgnoreStop",
            "IgnoreStopRange",
        ]
    );
}

#[tokio::test]
async fn test_list_stops_body() {
    let (addr, _device) = start_server().await;
    let mut client = Client::connect(addr).await;

    let (status, body) = client.send("LISTSTOPS 1").await;
    assert_eq!(status, "0000 Track 1 has 8 stops:");
    assert_eq!(body.len(), 8);
    assert_eq!(body[2], "3, C, Lift1, Lift");
}

#[tokio::test]
async fn test_split_writes_are_reassembled() {
    let (addr, _device) = start_server().await;
    let mut client = Client::connect(addr).await;

    client.send_raw(b"HASP").await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    client.send_raw(b"LATE 1,3\r\n").await;

    assert_eq!(client.read_line().await, "HASPLATE 1,3");
    assert_eq!(client.read_line().await, "0000 Empty");
}

#[tokio::test]
async fn test_concurrent_connections_share_state() {
    let (addr, device) = start_server().await;
    let mut first = Client::connect(addr).await;
    let mut second = Client::connect(addr).await;

    let (status, _) = first.send("DISPENSE 1,1").await;
    assert_eq!(status, "0000 Success");

    // The second connection observes the plate the first one dispensed.
    let (status, _) = second.send("HASPLATE 1,3").await;
    assert_eq!(status, "0000 Object");

    let mut counts = BTreeMap::new();
    counts.insert(1u32, 5u32);
    counts.insert(2u32, 0u32);
    device.reset_state(Some(&counts)).await;

    let (status, _) = first.send("HASPLATE 1,3").await;
    assert_eq!(status, "0000 Empty");
    let (status, _) = second.send("GETSTOPSENSORS 1").await;
    assert!(status.ends_with("8:Empty"));
}
