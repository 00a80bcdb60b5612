//! # Secure Transport
//!
//! Encrypted point-to-point transport: a blocking TCP layer combined with
//! an authenticated-encryption framing layer that turns byte payloads into
//! self-describing, tamper-evident wire messages and back.
//!
//! ## Components
//! - [`transport::TcpTransport`]: bounded blocking socket I/O with an
//!   exact-length read guarantee
//! - [`core::frame::Frame`] and [`core::source::FrameSource`]: the wire
//!   format and its two equivalent parsing strategies
//! - [`utils::crypto::MessageCipher`]: AES-256-GCM sealing under a
//!   pre-shared key
//! - [`service::SecureChannel`]: the structured send/receive API
//! - [`service::Server`] and [`protocol::handler::ConnectionHandler`]: the
//!   accept loop and per-connection request/response exchange
//!
//! ## Wire Format
//! ```text
//! [Nonce(12)] [Tag(16)] [Length(4, BE)] [Ciphertext(N)]
//! ```
//!
//! ## Concurrency
//! One OS thread per accepted connection; all waits are blocking with
//! explicit timeouts. There is no event loop.

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use config::{ChannelOptions, NetworkConfig, ServerConfig};
pub use core::serialization::WireFormat;
pub use core::source::ReceiveMode;
pub use error::{ChannelError, Result};
pub use protocol::dispatcher::Dispatcher;
pub use protocol::envelope::{RequestEnvelope, ResponseEnvelope};
pub use service::{SecureChannel, Server};
pub use utils::crypto::SymmetricKey;
