//! Split a raw device byte stream into text lines.
//!
//! Device reads return arbitrary chunks; a line can straddle two reads. The
//! splitter keeps the unterminated tail until its newline arrives.

/// Default cap for an unterminated line before it is thrown away.
pub const DEFAULT_MAX_LINE_LEN: usize = 256;

#[derive(Debug, Clone)]
pub struct LineSplitter {
    pending: Vec<u8>,
    max_line_len: usize,
    overflowed: bool,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineSplitter {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_len: max_line_len.max(1),
            overflowed: false,
        }
    }

    /// Append `bytes` and return every line completed by them, without the
    /// trailing `\n` / `\r\n`. Blank lines are skipped. Invalid UTF-8 is
    /// replaced lossily; such lines fail to decode later and get dropped there.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        for &b in bytes {
            if b == b'\n' {
                if self.overflowed {
                    // Tail of an oversized line: discard through this newline.
                    self.overflowed = false;
                    self.pending.clear();
                    continue;
                }
                let line = String::from_utf8_lossy(&self.pending);
                let line = line.trim_end_matches('\r');
                if !line.trim().is_empty() {
                    out.push(line.to_string());
                }
                self.pending.clear();
                continue;
            }
            if self.overflowed {
                continue;
            }
            self.pending.push(b);
            if self.pending.len() > self.max_line_len {
                tracing::warn!(
                    max_line_len = self.max_line_len,
                    "device line exceeds maximum length; discarding"
                );
                self.pending.clear();
                self.overflowed = true;
            }
        }
        out
    }

    /// Bytes buffered for the current unterminated line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
