// This module is the hub for the tagged-value formatter: the TaggedValue
// variant set, the bounded FormatBuffer with its put primitives, the Formatter
// directive scanner, and the println convenience entry point that generated
// code calls for its variadic print builtin. println auto-builds a format
// string with one placeholder per argument, space-separated, plus a trailing
// newline, renders it, and flushes to standard output through the OS
// collaborator; a write failure terminates the process with the platform
// error code, which is the contract the generated code relies on.

//! Tagged-value formatting into a bounded buffer.
//!
//! Formatting is positional: each `%`-directive consumes the next argument,
//! dispatching on the argument's runtime tag rather than the directive
//! character (the directive only selects quoting via `q` or type
//! introspection via `T`).

pub mod buffer;
pub mod format;
pub mod value;

pub use buffer::{FormatBuffer, BUFFER_LEN};
pub use format::Formatter;
pub use value::TaggedValue;

use crate::heap::Arena;
use crate::os::{Os, STDOUT};

/// Build the auto-format string for `println`: one `%v` per argument,
/// space-separated, trailing newline.
fn auto_format(arg_count: usize) -> Vec<u8> {
    let mut fmt = Vec::with_capacity(arg_count * 3 + 1);
    for i in 0..arg_count {
        if i > 0 {
            fmt.push(b' ');
        }
        fmt.extend_from_slice(b"%v");
    }
    fmt.push(b'\n');
    fmt
}

/// Render `args` space-separated with a trailing newline and write the
/// result to standard output.
///
/// Terminates the process with the platform error code if the write fails.
pub fn println<O: Os>(arena: &Arena, os: &mut O, args: &[TaggedValue]) {
    let fmt = auto_format(args.len());
    let mut formatter = Formatter::new();
    formatter.format(arena, &fmt, args);
    if let Err(err) = formatter.flush(os, STDOUT) {
        log::error!("println: write to stdout failed: {err}");
        std::process::exit(err.code());
    }
}
