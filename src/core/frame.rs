//! # Message Framing
//!
//! Wire layout for one sealed message:
//!
//! ```text
//! +--------+--------+----------+------------+
//! | Nonce  | Tag    | Length   | Ciphertext |
//! | 12 B   | 16 B   | u32 BE   | variable   |
//! +--------+--------+----------+------------+
//! ```
//!
//! The length field counts ciphertext bytes only. A receiver must validate
//! it against a configured maximum before allocating, so a hostile or
//! corrupted length field cannot drive memory use.

use bytes::{BufMut, BytesMut};

use crate::error::{ChannelError, Result};
use crate::utils::crypto::{NONCE_LEN, TAG_LEN};

/// Length-field size in bytes.
pub const LENGTH_LEN: usize = 4;

/// Fixed prefix before the ciphertext: nonce + tag + length.
pub const HEADER_LEN: usize = NONCE_LEN + TAG_LEN + LENGTH_LEN;

/// Default ciphertext-length bound (16 MiB).
pub const DEFAULT_MAX_CIPHERTEXT_LEN: usize = 16 * 1024 * 1024;

/// One self-contained unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl Frame {
    pub fn new(nonce: [u8; NONCE_LEN], tag: [u8; TAG_LEN], ciphertext: Vec<u8>) -> Self {
        Self {
            nonce,
            tag,
            ciphertext,
        }
    }

    /// Total encoded size of this frame.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.ciphertext.len()
    }

    /// Serializes the frame as one logical unit:
    /// nonce, tag, big-endian length, ciphertext.
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(&self.nonce);
        buf.put_slice(&self.tag);
        buf.put_u32(self.ciphertext.len() as u32);
        buf.put_slice(&self.ciphertext);
        buf
    }

    /// Parses a frame out of a fully buffered receive.
    ///
    /// The buffer must hold exactly one frame: shorter than the declared
    /// length is a truncation, longer means bytes from a second message
    /// leaked into the buffer. Both are framing violations and there is no
    /// resync marker to recover with.
    pub fn from_slice(data: &[u8], max_ciphertext_len: usize) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(ChannelError::Framing(format!(
                "buffer shorter than frame header: {} < {HEADER_LEN}",
                data.len()
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[..NONCE_LEN]);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&data[NONCE_LEN..NONCE_LEN + TAG_LEN]);

        let mut length_bytes = [0u8; LENGTH_LEN];
        length_bytes.copy_from_slice(&data[NONCE_LEN + TAG_LEN..HEADER_LEN]);
        let length = u32::from_be_bytes(length_bytes) as usize;

        if length > max_ciphertext_len {
            return Err(ChannelError::OversizedFrame {
                length,
                max: max_ciphertext_len,
            });
        }
        if data.len() < HEADER_LEN + length {
            return Err(ChannelError::Framing(format!(
                "truncated frame: declared {length} ciphertext bytes, {} available",
                data.len() - HEADER_LEN
            )));
        }
        if data.len() > HEADER_LEN + length {
            return Err(ChannelError::Framing(format!(
                "{} trailing bytes after frame",
                data.len() - HEADER_LEN - length
            )));
        }

        Ok(Self {
            nonce,
            tag,
            ciphertext: data[HEADER_LEN..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(payload_len: usize) -> Frame {
        Frame::new([0x11; NONCE_LEN], [0x22; TAG_LEN], vec![0xAB; payload_len])
    }

    #[test]
    fn encode_layout() {
        let frame = sample_frame(3);
        let bytes = frame.to_bytes();

        assert_eq!(bytes.len(), HEADER_LEN + 3);
        assert_eq!(&bytes[..NONCE_LEN], &[0x11; NONCE_LEN]);
        assert_eq!(&bytes[NONCE_LEN..NONCE_LEN + TAG_LEN], &[0x22; TAG_LEN]);
        assert_eq!(&bytes[NONCE_LEN + TAG_LEN..HEADER_LEN], &[0, 0, 0, 3]);
        assert_eq!(&bytes[HEADER_LEN..], &[0xAB; 3]);
    }

    #[test]
    fn roundtrip() {
        for len in [0, 1, 1024] {
            let frame = sample_frame(len);
            let bytes = frame.to_bytes();
            let parsed = Frame::from_slice(&bytes, DEFAULT_MAX_CIPHERTEXT_LEN).unwrap();
            assert_eq!(parsed, frame);
        }
    }

    #[test]
    fn truncated_header_rejected() {
        let bytes = sample_frame(8).to_bytes();
        let result = Frame::from_slice(&bytes[..HEADER_LEN - 1], DEFAULT_MAX_CIPHERTEXT_LEN);
        assert!(matches!(result, Err(ChannelError::Framing(_))));
    }

    #[test]
    fn truncated_ciphertext_rejected() {
        let bytes = sample_frame(8).to_bytes();
        let result = Frame::from_slice(&bytes[..bytes.len() - 2], DEFAULT_MAX_CIPHERTEXT_LEN);
        assert!(matches!(result, Err(ChannelError::Framing(_))));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = sample_frame(8).to_bytes().to_vec();
        bytes.push(0xFF);
        let result = Frame::from_slice(&bytes, DEFAULT_MAX_CIPHERTEXT_LEN);
        assert!(matches!(result, Err(ChannelError::Framing(_))));
    }

    #[test]
    fn hostile_length_rejected_before_allocation() {
        // Header claiming ~4 GiB of ciphertext with no body behind it.
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&[0x11; NONCE_LEN]);
        bytes.extend_from_slice(&[0x22; TAG_LEN]);
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());

        let result = Frame::from_slice(&bytes, DEFAULT_MAX_CIPHERTEXT_LEN);
        assert!(matches!(
            result,
            Err(ChannelError::OversizedFrame { length, max })
                if length == u32::MAX as usize && max == DEFAULT_MAX_CIPHERTEXT_LEN
        ));
    }

    #[test]
    fn empty_ciphertext_is_valid() {
        let frame = sample_frame(0);
        let parsed = Frame::from_slice(&frame.to_bytes(), DEFAULT_MAX_CIPHERTEXT_LEN).unwrap();
        assert!(parsed.ciphertext.is_empty());
    }
}
