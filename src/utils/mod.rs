//! # Utility Modules
//!
//! Supporting utilities for cryptography and logging.
//!
//! ## Components
//! - **Crypto**: AES-256-GCM AEAD sealing with detached tags
//! - **Logging**: structured logging configuration
//!
//! ## Security
//! - Cryptographically secure RNG (getrandom)
//! - Memory zeroing for key material and rejected plaintext (zeroize crate)

pub mod crypto;
pub mod logging;
