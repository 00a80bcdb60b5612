//! # Error Types
//!
//! Error handling for the encrypted transport.
//!
//! One tagged error type crosses every layer boundary: socket failures,
//! framing violations, cipher rejections, and payload decoding problems all
//! arrive as distinct [`ChannelError`] variants so callers can react to
//! malformed data differently than to tampered data.
//!
//! ## Error Categories
//! - **Transport**: socket creation/bind/accept/connect/send/receive failures
//! - **Framing**: truncated frames and hostile length fields
//! - **Cryptographic**: authentication-tag rejection, seal-side failures
//! - **Serialization**: payloads that do not parse as the agreed format
//! - **Timeout**: receive-side waits that expired

use std::io;
use thiserror::Error;

/// Primary error type for all transport, framing, and channel operations.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// OS-level socket failure. Not retried; the connection is unusable.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The peer closed the stream before the expected bytes arrived.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A receive-side wait expired before any data arrived.
    #[error("operation timed out")]
    Timeout,

    /// Truncated or malformed frame. Fatal to the connection: the wire
    /// format carries no resync marker.
    #[error("framing error: {0}")]
    Framing(String),

    /// A frame declared a ciphertext length above the configured bound.
    /// Raised before any allocation proportional to the claimed length.
    #[error("frame length {length} exceeds maximum {max}")]
    OversizedFrame { length: usize, max: usize },

    /// Authentication tag did not verify: data corruption or a mismatched
    /// key. No plaintext is ever released on this path.
    #[error("authentication failed: ciphertext rejected")]
    Authentication,

    /// Seal-side primitive or nonce-generation failure.
    #[error("encryption failed")]
    Encryption,

    /// Payload did not decode in the agreed wire format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Type alias for Results using ChannelError
pub type Result<T> = std::result::Result<T, ChannelError>;
