//! # Secure Channel
//!
//! The structured send/receive API used by request handlers. A channel
//! composes one connected transport, one cipher keyed by the pre-shared
//! key, and one frame source; mode and payload format are fixed at
//! construction and never negotiated on the wire.

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::ChannelOptions;
use crate::core::frame::Frame;
use crate::core::serialization::WireFormat;
use crate::core::source::FrameSource;
use crate::error::{ChannelError, Result};
use crate::protocol::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::transport::tcp::TcpTransport;
use crate::utils::crypto::{MessageCipher, SymmetricKey};

pub struct SecureChannel {
    transport: TcpTransport,
    cipher: MessageCipher,
    source: Box<dyn FrameSource>,
    format: WireFormat,
    recv_timeout: Duration,
    max_ciphertext_len: usize,
}

impl SecureChannel {
    /// Wraps an already-connected transport.
    pub fn over(transport: TcpTransport, key: &SymmetricKey, options: &ChannelOptions) -> Self {
        Self {
            transport,
            cipher: MessageCipher::new(key),
            source: options.mode.into_source(options.max_ciphertext_len),
            format: options.format,
            recv_timeout: options.recv_timeout,
            max_ciphertext_len: options.max_ciphertext_len,
        }
    }

    /// Connects to a remote listener and wraps the connection.
    pub fn connect(addr: SocketAddr, key: &SymmetricKey, options: &ChannelOptions) -> Result<Self> {
        let transport = TcpTransport::connect(addr, options.connect_timeout)?;
        Ok(Self::over(transport, key, options))
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.transport.peer_addr()
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Seals and sends one already-serialized payload as a single frame.
    ///
    /// Partial transmission is not a state the caller handles: on any
    /// failure the connection is closed and a single error comes back.
    #[instrument(skip(self, payload), level = "debug")]
    pub fn send_bytes(&mut self, payload: &[u8]) -> Result<()> {
        let result = self.seal_and_send(payload);
        if result.is_err() {
            self.transport.close();
        }
        result
    }

    fn seal_and_send(&mut self, payload: &[u8]) -> Result<()> {
        // GCM ciphertext length equals plaintext length, so the bound can
        // be enforced before any cipher work.
        if payload.len() > self.max_ciphertext_len {
            return Err(ChannelError::OversizedFrame {
                length: payload.len(),
                max: self.max_ciphertext_len,
            });
        }

        let sealed = self.cipher.seal(payload)?;
        let frame = Frame::new(sealed.nonce, sealed.tag, sealed.ciphertext);
        debug!(bytes = frame.encoded_len(), "sending frame");
        self.transport.send(&frame.to_bytes())
    }

    /// Receives one frame, verifies it, and returns the plaintext payload.
    ///
    /// Framing and authentication failures propagate as distinct errors so
    /// callers can tell malformed data from tampered data; both are fatal
    /// to the connection.
    #[instrument(skip(self), level = "debug")]
    pub fn recv_bytes(&mut self) -> Result<Vec<u8>> {
        let result = self.read_and_open();
        if result.is_err() {
            self.transport.close();
        }
        result
    }

    fn read_and_open(&mut self) -> Result<Vec<u8>> {
        let frame = self
            .source
            .read_frame(&mut self.transport, Some(self.recv_timeout))?;
        debug!(bytes = frame.encoded_len(), "frame received");
        self.cipher
            .open(&frame.nonce, &frame.tag, &frame.ciphertext)
    }

    pub fn send_request(&mut self, request: &RequestEnvelope) -> Result<()> {
        let payload = self.format.encode(request)?;
        self.send_bytes(&payload)
    }

    pub fn recv_request(&mut self) -> Result<RequestEnvelope> {
        let payload = self.recv_bytes()?;
        self.format.decode(&payload)
    }

    pub fn send_response(&mut self, response: &ResponseEnvelope) -> Result<()> {
        let payload = self.format.encode(response)?;
        self.send_bytes(&payload)
    }

    pub fn recv_response(&mut self) -> Result<ResponseEnvelope> {
        let payload = self.recv_bytes()?;
        self.format.decode(&payload)
    }

    /// Closes the underlying transport. Idempotent.
    pub fn close(&mut self) {
        self.transport.close();
    }
}
