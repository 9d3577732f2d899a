// This module implements FormatBuffer, the bounded text buffer the formatter
// renders into, together with the low-level put primitives: single bytes,
// string and byte runs, recursive most-significant-digit-first decimal for
// unsigned and signed integers, and the quoted escape form used by the `q`
// directive. The buffer is a caller-owned value of 256 fixed bytes with a
// write cursor; overflowing it is a fatal assertion, never a truncation. The
// cursor is reset by each top-level format pass, not by flushing, so a flush
// can be retried on a different descriptor.

//! Bounded output buffer and put primitives.

/// Fixed size of the format output buffer.
pub const BUFFER_LEN: usize = 256;

/// Caller-owned bounded output buffer.
pub struct FormatBuffer {
    buf: [u8; BUFFER_LEN],
    cursor: usize,
}

impl Default for FormatBuffer {
    fn default() -> Self {
        FormatBuffer::new()
    }
}

impl FormatBuffer {
    pub fn new() -> FormatBuffer {
        FormatBuffer {
            buf: [0; BUFFER_LEN],
            cursor: 0,
        }
    }

    /// Rewind the write cursor to the start.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// The pending output bytes.
    pub fn pending(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    /// Mutable view of the pending bytes, for in-place line-convention
    /// translation on the flush path.
    pub fn pending_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.cursor]
    }

    /// Append one byte. Fatal when the buffer is full.
    pub fn put_byte(&mut self, byte: u8) {
        self.buf[self.cursor] = byte;
        self.cursor += 1;
        assert!(self.cursor < BUFFER_LEN, "format buffer overflow");
    }

    /// Append a string verbatim.
    pub fn put_str(&mut self, s: &str) {
        self.put_bytes(s.as_bytes());
    }

    /// Append a byte run verbatim.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.put_byte(byte);
        }
    }

    /// Append an unsigned value in decimal, most significant digit first:
    /// divide by ten on the way down, emit each remainder on the unwind.
    pub fn put_uint(&mut self, value: u64) {
        if value > 9 {
            self.put_uint(value / 10);
        }
        self.put_byte(b'0' + (value % 10) as u8);
    }

    /// Append a signed value in decimal: a minus sign and the negated
    /// magnitude via the unsigned routine.
    pub fn put_int(&mut self, value: i64) {
        if value < 0 {
            self.put_byte(b'-');
            self.put_uint(value.unsigned_abs());
        } else {
            self.put_uint(value as u64);
        }
    }

    /// Append the quoted form used by the `q` directive: the run wrapped in
    /// `"`, printable ASCII copied verbatim except for `" ' \ { }`, which,
    /// like every non-printable byte, are escaped as the decimal byte value
    /// in braces.
    pub fn put_quoted(&mut self, bytes: &[u8]) {
        self.put_byte(b'"');
        for &byte in bytes {
            if (32..=127).contains(&byte) {
                match byte {
                    b'"' | b'\'' | b'\\' | b'{' | b'}' => self.put_escaped(byte),
                    _ => self.put_byte(byte),
                }
            } else {
                self.put_escaped(byte);
            }
        }
        self.put_byte(b'"');
    }

    fn put_escaped(&mut self, byte: u8) {
        self.put_byte(b'{');
        self.put_uint(byte as u64);
        self.put_byte(b'}');
    }
}
