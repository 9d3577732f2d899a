// This module implements the directive scanner at the heart of the tagged-value
// formatter. A format pass walks the format bytes left to right: NUL terminates
// output, ordinary bytes are copied verbatim, and each `%` consumes the next
// format byte as the directive character plus one argument from the list. With
// the arguments exhausted the literal text "<end>" is emitted and scanning
// continues; the formatter itself never dies on exhaustion or on an
// unrecognized tag (the fatal path is reserved for buffer overflow). Dispatch
// is by the argument's tag: strings and byte-slices honor the `q` quoting
// directive, bools render as words, the numeric kinds go through the recursive
// decimal routines, pointers get a "(*)" prefix, and the Other fallback dumps
// the directive character, the tag text, the value address and its first two
// machine words. `%T` short-circuits all of that and emits the tag string
// itself. The rendered bytes can be materialized into a fresh container or
// flushed through the OS collaborator.

//! Directive scanning and dispatch.

use crate::container::Container;
use crate::heap::Arena;
use crate::os::{Fd, Os, OsError};

use super::buffer::FormatBuffer;
use super::value::TaggedValue;

/// The tagged-value formatter: a directive scanner over an owned
/// [`FormatBuffer`].
#[derive(Default)]
pub struct Formatter {
    buffer: FormatBuffer,
}

impl Formatter {
    pub fn new() -> Formatter {
        Formatter {
            buffer: FormatBuffer::new(),
        }
    }

    /// The output buffer.
    pub fn buffer(&self) -> &FormatBuffer {
        &self.buffer
    }

    /// The rendered bytes of the most recent format pass.
    pub fn bytes(&self) -> &[u8] {
        self.buffer.pending()
    }

    /// Render `fmt` with `args`, positionally consuming one argument per
    /// `%`-directive. Resets the buffer first and returns the byte count
    /// produced.
    pub fn format(&mut self, arena: &Arena, fmt: &[u8], args: &[TaggedValue]) -> usize {
        self.buffer.reset();
        let mut next_arg = 0usize;
        let mut i = 0usize;
        while i < fmt.len() {
            let byte = fmt[i];
            if byte == 0 {
                break;
            }
            if byte != b'%' {
                self.buffer.put_byte(byte);
                i += 1;
                continue;
            }
            i += 1;
            let directive = if i < fmt.len() { fmt[i] } else { 0 };
            if next_arg >= args.len() {
                self.buffer.put_str("<end>");
            } else {
                if directive == 0 {
                    break;
                }
                self.dispatch(arena, directive, &args[next_arg]);
            }
            next_arg += 1;
            i += 1;
        }
        self.buffer.len()
    }

    fn dispatch(&mut self, arena: &Arena, directive: u8, arg: &TaggedValue) {
        if directive == b'T' {
            self.buffer.put_str(arg.type_code());
            return;
        }
        match *arg {
            TaggedValue::Str(c) | TaggedValue::Bytes(c) => {
                if directive == b'q' {
                    self.buffer.put_quoted(c.bytes(arena));
                } else {
                    self.buffer.put_bytes(c.bytes(arena));
                }
            }
            TaggedValue::Bool(v) => {
                self.buffer.put_str(if v { "true" } else { "false" });
            }
            TaggedValue::Byte(v) => self.buffer.put_uint(v as u64),
            TaggedValue::Int(v) => self.buffer.put_int(v as i64),
            TaggedValue::Uint(v) => self.buffer.put_uint(v as u64),
            TaggedValue::Ptr(v) => {
                self.buffer.put_str("(*)");
                self.buffer.put_uint(v as u64);
            }
            TaggedValue::Other { code, addr, words } => {
                // Debug fallback, never a user-facing format.
                self.buffer.put_str("(percent ");
                self.buffer.put_uint(directive as u64);
                self.buffer.put_str(" typecode ");
                self.buffer.put_str(code);
                self.buffer.put_str(" pointer ");
                self.buffer.put_uint(addr as u64);
                self.buffer.put_str(" * ");
                self.buffer.put_uint(words[0] as u64);
                self.buffer.put_str(" * ");
                self.buffer.put_uint(words[1] as u64);
                self.buffer.put_str(")");
            }
        }
    }

    /// Materialize the rendered bytes into a freshly allocated container.
    pub fn to_container(&self, arena: &mut Arena) -> Container {
        Container::from_bytes(arena, self.buffer.pending())
    }

    /// Hand the rendered bytes to the OS collaborator's buffer-flush path.
    /// The cursor is not rewound; the next format pass does that.
    pub fn flush<O: Os>(&mut self, os: &mut O, fd: Fd) -> Result<usize, OsError> {
        os.flush_buffer(fd, &mut self.buffer)
    }
}
