//! # TCP Transport
//!
//! Blocking TCP transport with explicit lifecycle and timeout control.
//!
//! One [`TcpTransport`] owns one socket: either a listening socket waiting
//! for a peer, or a connected stream. All waits are bounded by
//! caller-specified timeouts at the OS call boundary; there is no event
//! loop. The exact-length receive guarantee provided here is the
//! precondition every higher layer depends on.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::{ChannelError, Result};

/// Chunk size for sends and buffered receives.
pub const CHUNK_SIZE: usize = 8192;

/// Poll interval while waiting for an incoming connection.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Result of one bounded accept wait.
///
/// An idle period is a normal outcome, not an error, so accept loops can
/// retry without special-casing.
#[derive(Debug)]
pub enum AcceptOutcome {
    /// A peer connected.
    Connected(SocketAddr),
    /// The wait elapsed with no incoming connection.
    TimedOut,
}

/// Socket lifecycle flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Listening,
    Connected,
    Closed,
}

/// One TCP socket with bounded blocking I/O.
pub struct TcpTransport {
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
    peer_addr: Option<SocketAddr>,
    recv_chunk: Vec<u8>,
    state: Lifecycle,
}

impl TcpTransport {
    /// Creates a listening transport bound to `addr`.
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr)?;
        // Non-blocking accept plus a poll loop gives the bounded wait;
        // accepted streams are switched back to blocking mode.
        listener.set_nonblocking(true)?;
        debug!(addr = %listener.local_addr()?, "listening");

        Ok(Self {
            listener: Some(listener),
            stream: None,
            peer_addr: None,
            recv_chunk: vec![0u8; CHUNK_SIZE],
            state: Lifecycle::Listening,
        })
    }

    /// Connects to a remote listener.
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        debug!(peer = %peer, "connected");

        Ok(Self {
            listener: None,
            stream: Some(stream),
            peer_addr: Some(peer),
            recv_chunk: vec![0u8; CHUNK_SIZE],
            state: Lifecycle::Connected,
        })
    }

    /// Address this transport is listening on or bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }
        if let Some(stream) = &self.stream {
            return Ok(stream.local_addr()?);
        }
        Err(not_connected("socket closed"))
    }

    /// Peer address of the active connection, if any.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    pub fn is_connected(&self) -> bool {
        self.state == Lifecycle::Connected && self.stream.is_some()
    }

    /// Waits up to `timeout` for an incoming connection.
    ///
    /// A previously accepted connection is closed and replaced: at most one
    /// active peer per transport.
    pub fn accept(&mut self, timeout: Duration) -> Result<AcceptOutcome> {
        let deadline = Instant::now() + timeout;

        loop {
            let listener = self
                .listener
                .as_ref()
                .ok_or_else(|| not_connected("not a listening socket"))?;

            match listener.accept() {
                Ok((stream, peer)) => {
                    if let Some(old) = self.stream.take() {
                        let _ = old.shutdown(Shutdown::Both);
                    }
                    stream.set_nonblocking(false)?;
                    stream.set_nodelay(true)?;
                    self.stream = Some(stream);
                    self.peer_addr = Some(peer);
                    debug!(peer = %peer, "accepted connection");
                    return Ok(AcceptOutcome::Connected(peer));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        trace!("accept wait elapsed");
                        return Ok(AcceptOutcome::TimedOut);
                    }
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Moves the accepted connection out as an independent connected
    /// transport, leaving this one listening.
    ///
    /// Each connection gets exactly one owner; the handler thread that
    /// receives the returned transport is responsible for closing it.
    pub fn take_accepted(&mut self) -> Option<TcpTransport> {
        let stream = self.stream.take()?;
        let peer_addr = self.peer_addr.take();
        Some(TcpTransport {
            listener: None,
            stream: Some(stream),
            peer_addr,
            recv_chunk: vec![0u8; CHUNK_SIZE],
            state: Lifecycle::Connected,
        })
    }

    /// Reads exactly `buf.len()` bytes, accumulating partial reads.
    ///
    /// Returns `ConnectionClosed` if the peer closes first and `Timeout` if
    /// the OS receive timeout fires; a short read is never surfaced.
    pub fn receive_exact(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("no active connection"))?;
        stream.set_read_timeout(timeout)?;

        let mut received = 0;
        while received < buf.len() {
            match stream.read(&mut buf[received..]) {
                Ok(0) => return Err(ChannelError::ConnectionClosed),
                Ok(n) => received += n,
                Err(e) if is_timeout(&e) => return Err(ChannelError::Timeout),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Accumulates one burst of data: reads fixed-size chunks until a short
    /// read signals the sender is done.
    ///
    /// A timeout before the first byte is a `Timeout`; a timeout mid-burst
    /// ends the burst with what arrived, and the framing layer decides
    /// whether that is a whole message.
    pub fn receive_until_idle(&mut self, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("no active connection"))?;
        stream.set_read_timeout(timeout)?;

        let mut collected = Vec::new();
        loop {
            match stream.read(&mut self.recv_chunk) {
                Ok(0) => {
                    if collected.is_empty() {
                        return Err(ChannelError::ConnectionClosed);
                    }
                    break;
                }
                Ok(n) => {
                    collected.extend_from_slice(&self.recv_chunk[..n]);
                    if n < self.recv_chunk.len() {
                        break;
                    }
                }
                Err(e) if is_timeout(&e) => {
                    if collected.is_empty() {
                        return Err(ChannelError::Timeout);
                    }
                    break;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        trace!(bytes = collected.len(), "buffered receive complete");
        Ok(collected)
    }

    /// Writes the whole buffer, looping over partial writes in fixed-size
    /// chunks. Either every byte is written or an error is reported and the
    /// connection is unusable; chunk boundaries are never visible to the
    /// caller.
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let result = self.write_chunks(bytes);
        if result.is_err() {
            self.close();
        }
        result
    }

    fn write_chunks(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| not_connected("no active connection"))?;

        for chunk in bytes.chunks(CHUNK_SIZE) {
            stream.write_all(chunk)?;
        }
        stream.flush()?;
        trace!(bytes = bytes.len(), "send complete");
        Ok(())
    }

    /// Releases the socket and buffer. Safe to call repeatedly and from any
    /// cleanup path.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.listener = None;
        self.peer_addr = None;
        self.recv_chunk = Vec::new();
        self.state = Lifecycle::Closed;
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn not_connected(msg: &str) -> ChannelError {
    ChannelError::Transport(std::io::Error::new(ErrorKind::NotConnected, msg.to_string()))
}

/// Read timeouts surface as WouldBlock on Unix and TimedOut on Windows.
fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
