//! Blocking TCP transport for both tiers.
//!
//! Thread-per-connection servers in the two service styles the pipeline
//! needs, plus the one-shot uplink client:
//!
//! - **Packet stream** (fog ingress): every successful read hands the bytes to
//!   a callback and answers the producer with an acknowledgment literal. An
//!   idle timeout flushes buffered bytes to the callback and closes.
//! - **Framed request/response** (cloud ingress): the handler thread reads the
//!   request to EOF, produces exactly one reply, and closes.
//! - **Exchange** (fog egress): connect, write the frame, half-close the write
//!   side, read the reply to EOF.
//!
//! Transport errors never abort the process: they are logged with the peer
//! address and the affected connection is closed. There are no retries.

use anyhow::Context;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Acknowledgment sent to a producer after each accepted read.
pub const PACKET_ACK: &[u8] = b"Received data successfully";

/// Read chunk size for the packet-stream service.
const READ_CHUNK_SIZE: usize = 4096;

/// A bound TCP listener with thread-per-connection service loops.
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    /// Bind a listener on the given address.
    pub fn bind(addr: &str) -> anyhow::Result<Self> {
        let listener =
            TcpListener::bind(addr).with_context(|| format!("Failed to bind TCP server on {addr}"))?;
        log::info!("TCP server listening on {}", listener.local_addr()?);
        Ok(TcpServer { listener })
    }

    /// The locally bound address (useful when binding port 0).
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Serve producer connections: one ingest thread per connection, one
    /// callback invocation plus one acknowledgment per successful read.
    ///
    /// On an idle timeout the buffered bytes (if any) are flushed to the
    /// callback once and the connection closes. Never returns except on
    /// accept-loop teardown.
    pub fn serve_packet_stream<F>(self, idle_timeout: Duration, on_packet: F) -> anyhow::Result<()>
    where
        F: Fn(&[u8], SocketAddr) + Send + Sync + 'static,
    {
        let on_packet = Arc::new(on_packet);
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log::error!("Error accepting connection: {err}");
                    continue;
                }
            };
            let peer = match stream.peer_addr() {
                Ok(addr) => addr,
                Err(err) => {
                    log::error!("Error reading peer address: {err}");
                    continue;
                }
            };
            log::info!("Accepted producer connection from {peer}");
            let on_packet = Arc::clone(&on_packet);
            let spawned = thread::Builder::new()
                .name(format!("ingest-{peer}"))
                .spawn(move || packet_stream_connection(stream, peer, idle_timeout, &*on_packet));
            if let Err(err) = spawned {
                log::error!("Failed to spawn ingest thread for {peer}: {err}");
            }
        }
        Ok(())
    }

    /// Serve framed request/response connections: one short-lived handler
    /// thread per connection. The handler receives the full request (read to
    /// EOF) and its return value is written back before the connection closes.
    pub fn serve_framed<F>(self, on_request: F) -> anyhow::Result<()>
    where
        F: Fn(&[u8], SocketAddr) -> Vec<u8> + Send + Sync + 'static,
    {
        let on_request = Arc::new(on_request);
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    log::error!("Error accepting connection: {err}");
                    continue;
                }
            };
            let peer = match stream.peer_addr() {
                Ok(addr) => addr,
                Err(err) => {
                    log::error!("Error reading peer address: {err}");
                    continue;
                }
            };
            log::debug!("Accepted uplink connection from {peer}");
            let on_request = Arc::clone(&on_request);
            let spawned = thread::Builder::new()
                .name(format!("handler-{peer}"))
                .spawn(move || framed_connection(stream, peer, &*on_request));
            if let Err(err) = spawned {
                log::error!("Failed to spawn handler thread for {peer}: {err}");
            }
        }
        Ok(())
    }
}

/// Ingest loop for one producer connection.
fn packet_stream_connection<F>(mut stream: TcpStream, peer: SocketAddr, idle_timeout: Duration, on_packet: &F)
where
    F: Fn(&[u8], SocketAddr),
{
    if let Err(err) = stream.set_read_timeout(Some(idle_timeout)) {
        log::error!("Failed to set read timeout for {peer}: {err}");
        return;
    }

    let mut buffer: Vec<u8> = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) => {
                log::info!("Producer {peer} closed the connection");
                break;
            }
            Ok(n) => {
                buffer.extend_from_slice(&chunk[..n]);
                on_packet(&buffer, peer);
                buffer.clear();
                if let Err(err) = stream.write_all(PACKET_ACK) {
                    log::error!("Failed to acknowledge {peer}: {err}");
                    break;
                }
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut => {
                log::warn!("Producer {peer} idle timeout");
                if !buffer.is_empty() {
                    on_packet(&buffer, peer);
                    buffer.clear();
                }
                break;
            }
            Err(err) => {
                log::error!("Error reading from {peer}: {err}");
                break;
            }
        }
    }
    log::info!("Connection with {peer} closed");
}

/// Single request/response for one uplink connection.
fn framed_connection<F>(mut stream: TcpStream, peer: SocketAddr, on_request: &F)
where
    F: Fn(&[u8], SocketAddr) -> Vec<u8>,
{
    let mut request = Vec::new();
    if let Err(err) = stream.read_to_end(&mut request) {
        log::error!("Error reading request from {peer}: {err}");
        return;
    }
    if request.is_empty() {
        log::warn!("Received empty request from {peer}");
        return;
    }
    log::info!("Received {} bytes from {peer}", request.len());
    let reply = on_request(&request, peer);
    if let Err(err) = stream.write_all(&reply) {
        log::error!("Error replying to {peer}: {err}");
    }
}

/// One-shot framed exchange: connect, send, half-close, read the reply to EOF.
///
/// The timeout bounds both the connect and the receive phases.
pub fn exchange(addr: &str, frame: &[u8], timeout: Duration) -> anyhow::Result<Vec<u8>> {
    let remote = addr
        .to_socket_addrs()
        .with_context(|| format!("Failed to resolve {addr}"))?
        .next()
        .with_context(|| format!("No address found for {addr}"))?;
    let mut stream = TcpStream::connect_timeout(&remote, timeout)
        .with_context(|| format!("Failed to connect to {addr}"))?;
    stream
        .set_read_timeout(Some(timeout))
        .context("Failed to set read timeout")?;

    stream
        .write_all(frame)
        .with_context(|| format!("Failed to send {} bytes to {addr}", frame.len()))?;
    // Signal end-of-request so the peer's read-to-EOF completes.
    stream
        .shutdown(Shutdown::Write)
        .context("Failed to half-close the uplink connection")?;
    log::info!("Sent {} bytes to {addr}", frame.len());

    let mut reply = Vec::new();
    stream
        .read_to_end(&mut reply)
        .with_context(|| format!("Failed to read reply from {addr}"))?;
    log::info!("Received {} byte reply from {addr}", reply.len());
    Ok(reply)
}
