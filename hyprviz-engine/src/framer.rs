use log::warn;

/// Splits a byte stream into newline-terminated records.
///
/// Bytes after the last newline are kept until the next [`feed`](Self::feed).
/// If that unterminated tail grows past `cap` it is thrown away, so a
/// producer that never sends a newline cannot grow the buffer without bound.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    cap: usize,
    overflows: u64,
}

impl LineFramer {
    pub fn new(cap: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(cap),
            cap,
            overflows: 0,
        }
    }

    /// Append `chunk` and return every record it completed, oldest first.
    ///
    /// The newline itself is not part of the record. Invalid UTF-8 is
    /// replaced with U+FFFD rather than rejected here.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut records = Vec::new();
        if chunk.is_empty() {
            return records;
        }

        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            records.push(String::from_utf8_lossy(&self.buffer[start..end]).into_owned());
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > self.cap {
            warn!(
                "Discarding {} bytes of unterminated input (cap is {})",
                self.buffer.len(),
                self.cap
            );
            self.buffer.clear();
            self.overflows += 1;
        }

        records
    }

    /// Like [`feed`](Self::feed) but only returns the newest record.
    pub fn latest(&mut self, chunk: &[u8]) -> Option<String> {
        self.feed(chunk).pop()
    }

    /// Drop any partial record.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Bytes received after the last newline.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of times the tail was discarded for exceeding the cap.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}
