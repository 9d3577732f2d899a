// This crate is picort, the low-level runtime support layer for a small
// compiled language whose generated code needs dynamic byte buffers, growable
// sequences, and heterogeneous-argument formatting, but has no native
// generics, garbage collector, or exception mechanism of its own. It runs
// unmodified on a conventional host (the platform allocator backs every block)
// and on a resource-constrained single-tasking target (a small fixed arena).
// The three core pieces are tightly coupled: the guarded block allocator backs
// the growable container model, and the tagged-value formatter consumes
// containers and runtime type tags. Fatal violations (bounds, overflow,
// oversized allocations) panic with a diagnostic; OS-collaborator calls
// return explicit Results; guard-byte corruption is detected only when
// validate is invoked.

//! picort - runtime support for a small compiled language.
//!
//! # Architecture
//!
//! - [`heap`] - guarded block allocator with corruption-detecting headers
//! - [`container`] - the `{base, offset, len}` growable container model
//! - [`fmt`] - tagged-value formatting into a bounded buffer
//! - [`os`] - the OS collaborator interface and its two platforms
//!
//! # Usage
//!
//! ```
//! use picort::{Arena, Container, Formatter, GrowthPolicy, TaggedValue};
//!
//! let mut arena = Arena::host(GrowthPolicy::Capped);
//! let who = Container::from_str(&mut arena, "World");
//!
//! let mut formatter = Formatter::new();
//! formatter.format(
//!     &arena,
//!     b"Hello %s, you have %i apples.\n",
//!     &[TaggedValue::Str(who), TaggedValue::Int(3)],
//! );
//! assert_eq!(formatter.bytes(), b"Hello World, you have 3 apples.\n");
//! ```

pub mod container;
pub mod fmt;
pub mod heap;
pub mod os;

pub use container::{Container, INITIAL_CAP, MAX_CAP};
pub use fmt::{println, FormatBuffer, Formatter, TaggedValue, BUFFER_LEN};
pub use heap::{Arena, Class, GrowthPolicy, Handle, MarkFn, ShapeRegistry, LEN_INF};
pub use os::{EmbeddedOs, Fd, HostOs, Os, OsError, RawSys};
