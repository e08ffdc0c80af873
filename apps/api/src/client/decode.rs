//! Incremental UTF-8 decoding for chunked network streams.
//!
//! A multi-byte scalar may be split across two network chunks; the decoder
//! carries the incomplete tail until the remaining bytes arrive.

/// Streaming UTF-8 decoder with a carry buffer.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    carry: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much of `chunk` (plus any carried bytes) as possible.
    /// An incomplete trailing sequence is held back for the next call;
    /// genuinely invalid bytes are replaced with U+FFFD.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.carry.extend_from_slice(chunk);
        match std::str::from_utf8(&self.carry) {
            Ok(text) => {
                let out = text.to_string();
                self.carry.clear();
                out
            }
            Err(e) => {
                let valid = e.valid_up_to();
                if e.error_len().is_none() {
                    // Incomplete trailing sequence — keep it for the next chunk.
                    let out = std::str::from_utf8(&self.carry[..valid])
                        .expect("validated prefix")
                        .to_string();
                    self.carry.drain(..valid);
                    out
                } else {
                    // Invalid bytes mid-buffer: decode lossily and reset.
                    let out = String::from_utf8_lossy(&self.carry).into_owned();
                    self.carry.clear();
                    out
                }
            }
        }
    }

    /// Flushes any carried bytes at end of stream, lossily.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        let out = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"Hello, "), "Hello, ");
        assert_eq!(decoder.decode(b"world!"), "world!");
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_scalar_split_across_chunks_is_reassembled() {
        // "é" is 0xC3 0xA9.
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[b'h', 0xC3]), "h");
        assert_eq!(decoder.decode(&[0xA9, b'!']), "é!");
    }

    #[test]
    fn test_four_byte_scalar_split_three_ways() {
        // "🦀" is 0xF0 0x9F 0xA6 0x80.
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[0xF0]), "");
        assert_eq!(decoder.decode(&[0x9F, 0xA6]), "");
        assert_eq!(decoder.decode(&[0x80]), "🦀");
    }

    #[test]
    fn test_invalid_byte_becomes_replacement_char() {
        let mut decoder = Utf8Decoder::new();
        let out = decoder.decode(&[b'a', 0xFF, b'b']);
        assert_eq!(out, "a\u{FFFD}b");
    }

    #[test]
    fn test_finish_flushes_dangling_bytes_lossily() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&[0xC3]), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }
}
