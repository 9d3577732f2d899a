// This module serves as the hub for the guarded block allocator, the foundation
// everything else in the runtime is built on. It exports the Arena (which backs
// blocks with the platform allocator on a conventional host and with a fixed
// byte region on the constrained target), the opaque Handle type identifying a
// block's payload, the Class tag discriminating block kinds, the GrowthPolicy
// configuration that selects between the 8-bit-compatible capped behavior and
// unbounded geometric growth, and the ShapeRegistry extension point reserved
// for a future tracing collector. Block validity is structural: a live handle
// is non-null, even, and has intact guard sentinels. There is no reference
// counting and no reclamation at this layer.

//! Guarded block allocator.
//!
//! Blocks carry corruption-detecting guard bytes around a small header
//! (quantized capacity plus a class tag). A [`Handle`] is the opaque address
//! of a payload; validity is checked lazily via [`Arena::validate`], never
//! tracked. `free` is a deliberate no-op pending a tracing collector, for
//! which [`ShapeRegistry`] and the mark hook are the registered extension
//! points.

pub mod arena;
pub mod shape;

pub use arena::{Arena, GrowthPolicy, Handle};
pub use shape::{MarkFn, ShapeRegistry};

/// Block class tags, one per semantic kind of allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Class {
    Free = 0,
    Bytes = 1,
    Array = 2,
    String = 3,
    Slice = 4,
    Map = 5,
}

impl Class {
    /// Decode a class tag byte read back from a block header.
    pub fn from_u8(tag: u8) -> Option<Class> {
        match tag {
            0 => Some(Class::Free),
            1 => Some(Class::Bytes),
            2 => Some(Class::Array),
            3 => Some(Class::String),
            4 => Some(Class::Slice),
            5 => Some(Class::Map),
            _ => None,
        }
    }
}

/// Reserved "infinity" sentinel: a requested length of 255 or more is never a
/// valid allocation in capped mode.
pub const LEN_INF: usize = 255;

/// Guard sentinel preceding the header fields.
pub const GUARD_HEAD: u8 = 0xAA;

/// Guard sentinel following the header fields.
pub const GUARD_TAIL: u8 = 0xBB;
