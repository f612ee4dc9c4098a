//! Incremental UTF-8 decoding of controller reads.
//!
//! A fixed-size read can end in the middle of a multi-byte character. The
//! incomplete tail is held back and completed by the next chunk instead of
//! being turned into two replacement characters.

#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `bytes`, keeping an incomplete trailing sequence for later.
    /// Invalid sequences become U+FFFD.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::with_capacity(self.pending.len());
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is held back, lossily.
    pub fn finish(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        out
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(b"Welcome\n"), "Welcome\n");
        assert!(!d.has_pending());
    }

    #[test]
    fn split_multibyte_is_joined() {
        let bytes = "数据".as_bytes();
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(&bytes[..2]), "");
        assert!(d.has_pending());
        assert_eq!(d.decode(&bytes[2..4]), "数");
        assert_eq!(d.decode(&bytes[4..]), "据");
        assert!(!d.has_pending());
    }

    #[test]
    fn invalid_byte_is_replaced() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(b"a\xffb"), "a\u{FFFD}b");
    }

    #[test]
    fn finish_flushes_incomplete_tail() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.decode(&[b'x', 0xE6, 0x95]), "x");
        assert_eq!(d.finish(), "\u{FFFD}");
        assert!(!d.has_pending());
    }
}
