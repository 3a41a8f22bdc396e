//! Inbound message size gate and fragment reassembly.
//!
//! tungstenite joins continuation frames before the dispatch loop sees a
//! message, so the loop pushes every message as a lone final fragment and
//! the buffer acts as the size limit. Fragment accumulation serves callers
//! that read raw frames.

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// MessageBuffer
// ============================================================================

/// Accumulates fragments of one logical message.
///
/// Non-final fragments are buffered; the final fragment completes the
/// message and clears the buffer. A message larger than the size limit is
/// discarded up to and including its final fragment.
#[derive(Debug)]
pub struct MessageBuffer {
    parts: Vec<Vec<u8>>,
    size: usize,
    max_size: usize,
    overflowed: bool,
}

impl MessageBuffer {
    /// Creates a buffer that accepts messages up to `max_size` bytes.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            parts: Vec::new(),
            size: 0,
            max_size,
            overflowed: false,
        }
    }

    /// Adds a fragment.
    ///
    /// Returns the complete message when `is_final` is set.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedInput`] when the final fragment completes a
    ///   message over the size limit or one that is not valid UTF-8
    pub fn push(&mut self, fragment: &[u8], is_final: bool) -> Result<Option<String>> {
        self.size += fragment.len();
        if self.size > self.max_size {
            self.overflowed = true;
            self.parts.clear();
        } else if !self.overflowed {
            self.parts.push(fragment.to_vec());
        }

        if !is_final {
            return Ok(None);
        }

        let size = std::mem::take(&mut self.size);
        if std::mem::take(&mut self.overflowed) {
            return Err(Error::malformed(format!(
                "message of {size} bytes exceeds limit of {} bytes",
                self.max_size
            )));
        }

        let bytes = if self.parts.len() == 1 {
            self.parts.pop().unwrap_or_default()
        } else {
            let joined = self.parts.concat();
            self.parts.clear();
            joined
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| Error::malformed(format!("message is not UTF-8: {e}")))
    }

    /// Returns `true` if fragments are waiting for a final fragment.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.size > 0
    }

    /// Drops any buffered fragments.
    pub fn clear(&mut self) {
        self.parts.clear();
        self.size = 0;
        self.overflowed = false;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    #[test]
    fn test_fragments_joined() {
        let mut buffer = MessageBuffer::new(LIMIT);
        assert_eq!(buffer.push(b"abc", false).expect("push"), None);
        assert!(buffer.is_pending());
        assert_eq!(
            buffer.push(b"def", true).expect("push"),
            Some("abcdef".to_string())
        );
        assert!(!buffer.is_pending());
    }

    #[test]
    fn test_lone_final_fragment() {
        let mut buffer = MessageBuffer::new(LIMIT);
        assert_eq!(
            buffer.push(b"{\"id\":0}", true).expect("push"),
            Some("{\"id\":0}".to_string())
        );
    }

    #[test]
    fn test_buffer_reused_after_completion() {
        let mut buffer = MessageBuffer::new(LIMIT);
        buffer.push(b"a", false).expect("push");
        buffer.push(b"b", true).expect("push");
        assert_eq!(buffer.push(b"c", true).expect("push"), Some("c".to_string()));
    }

    #[test]
    fn test_empty_final_fragment() {
        let mut buffer = MessageBuffer::new(LIMIT);
        buffer.push(b"xy", false).expect("push");
        assert_eq!(buffer.push(b"", true).expect("push"), Some("xy".to_string()));
    }

    #[test]
    fn test_oversized_message_discarded() {
        let mut buffer = MessageBuffer::new(4);
        assert_eq!(buffer.push(b"abc", false).expect("push"), None);
        assert_eq!(buffer.push(b"def", false).expect("push"), None);
        assert!(buffer.push(b"g", true).is_err());
        assert_eq!(buffer.push(b"ok", true).expect("push"), Some("ok".to_string()));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut buffer = MessageBuffer::new(LIMIT);
        assert!(buffer.push(&[0xff, 0xfe], true).is_err());
        assert!(!buffer.is_pending());
    }

    #[test]
    fn test_clear() {
        let mut buffer = MessageBuffer::new(LIMIT);
        buffer.push(b"partial", false).expect("push");
        buffer.clear();
        assert_eq!(buffer.push(b"next", true).expect("push"), Some("next".to_string()));
    }
}
