//! # Transport Layer
//!
//! Reliable byte-stream transport with explicit lifecycle and timeout
//! control. The protocol, framing, and crypto layers above never touch
//! platform socket details; everything they need is the exact-read,
//! full-write contract exposed here.

pub mod tcp;

pub use tcp::{AcceptOutcome, TcpTransport};
