//! # Frame Sources
//!
//! Two equivalent strategies for pulling one frame off the transport,
//! modeled as implementations of one capability and selected once at
//! channel construction. Given identical wire bytes both strategies must
//! produce identical frames; neither silently pads truncated input.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::frame::{Frame, LENGTH_LEN};
use crate::error::{ChannelError, Result};
use crate::transport::tcp::TcpTransport;
use crate::utils::crypto::{NONCE_LEN, TAG_LEN};

/// Which parsing strategy a channel uses. Fixed at construction and agreed
/// out of band; never negotiated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiveMode {
    /// Field-by-field exact reads as bytes arrive.
    #[default]
    Streamed,
    /// One buffered burst read, then sliced.
    Buffered,
}

impl ReceiveMode {
    pub fn into_source(self, max_ciphertext_len: usize) -> Box<dyn FrameSource> {
        match self {
            ReceiveMode::Streamed => Box::new(StreamedSource { max_ciphertext_len }),
            ReceiveMode::Buffered => Box::new(BufferedSource { max_ciphertext_len }),
        }
    }
}

/// Capability of reading exactly one frame from a transport.
pub trait FrameSource: Send {
    fn read_frame(&mut self, transport: &mut TcpTransport, timeout: Option<Duration>)
        -> Result<Frame>;
}

/// Reads nonce, tag, and length as three exact reads, then the ciphertext
/// of the now-known length as a fourth.
pub struct StreamedSource {
    max_ciphertext_len: usize,
}

impl StreamedSource {
    pub fn new(max_ciphertext_len: usize) -> Self {
        Self { max_ciphertext_len }
    }
}

impl FrameSource for StreamedSource {
    fn read_frame(
        &mut self,
        transport: &mut TcpTransport,
        timeout: Option<Duration>,
    ) -> Result<Frame> {
        let mut nonce = [0u8; NONCE_LEN];
        transport.receive_exact(&mut nonce, timeout)?;

        let mut tag = [0u8; TAG_LEN];
        transport.receive_exact(&mut tag, timeout)?;

        let mut length_bytes = [0u8; LENGTH_LEN];
        transport.receive_exact(&mut length_bytes, timeout)?;
        let length = u32::from_be_bytes(length_bytes) as usize;

        // Bound check before the ciphertext buffer exists.
        if length > self.max_ciphertext_len {
            return Err(ChannelError::OversizedFrame {
                length,
                max: self.max_ciphertext_len,
            });
        }

        let mut ciphertext = vec![0u8; length];
        transport.receive_exact(&mut ciphertext, timeout)?;

        Ok(Frame::new(nonce, tag, ciphertext))
    }
}

/// Accumulates one whole burst from the transport, then slices the four
/// fields out of the buffer.
pub struct BufferedSource {
    max_ciphertext_len: usize,
}

impl BufferedSource {
    pub fn new(max_ciphertext_len: usize) -> Self {
        Self { max_ciphertext_len }
    }
}

impl FrameSource for BufferedSource {
    fn read_frame(
        &mut self,
        transport: &mut TcpTransport,
        timeout: Option<Duration>,
    ) -> Result<Frame> {
        let buffered = transport.receive_until_idle(timeout)?;
        Frame::from_slice(&buffered, self.max_ciphertext_len)
    }
}
