//! # Core Protocol Components
//!
//! Wire framing and payload serialization.
//!
//! ## Components
//! - **Frame**: the self-describing encrypted wire unit
//! - **Sources**: the two frame-parsing strategies behind one interface
//! - **Serialization**: pluggable payload encodings
//!
//! ## Wire Format
//! ```text
//! [Nonce(12)] [Tag(16)] [Length(4, BE)] [Ciphertext(N)]
//! ```
//!
//! ## Security
//! - Length validated against a configured maximum before allocation
//! - Truncated input is rejected, never zero-padded

pub mod frame;
pub mod serialization;
pub mod source;
