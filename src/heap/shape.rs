// This module holds the extension points reserved for a future tracing
// collector: the MarkFn hook type registered with an Arena at initialization,
// and the ShapeRegistry mapping each block class to the ordered byte offsets
// of nested handles inside blocks of that class. A mark phase would walk live
// roots (stack frames and globals), invoke the hook per reachable block, and
// use the registered shape to recurse into nested handles. None of that exists
// yet; this layer only stores the registrations so the allocator's design is
// ready for it.

//! Mark-and-shape collector extension point.
//!
//! A shape is the ordered list of payload byte offsets at which blocks of a
//! given class store nested [`Handle`]s. The mark phase that would consume
//! these registrations is intentionally unimplemented.
//!
//! [`Handle`]: super::Handle

use hashbrown::HashMap;

use super::{Class, Handle};

/// Hook a future tracing collector registers to mark a reachable block.
pub type MarkFn = fn(Handle);

/// Registrable mapping from block class to nested-handle field offsets.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    shapes: HashMap<Class, Vec<u16>>,
}

impl ShapeRegistry {
    pub fn new() -> ShapeRegistry {
        ShapeRegistry {
            shapes: HashMap::new(),
        }
    }

    /// Register the nested-handle offsets for `class`, replacing any earlier
    /// registration.
    pub fn register(&mut self, class: Class, offsets: &[u16]) {
        log::debug!("heap: shape for {class:?} is {offsets:?}");
        self.shapes.insert(class, offsets.to_vec());
    }

    /// The registered offsets for `class`, if any.
    pub fn shape_of(&self, class: Class) -> Option<&[u16]> {
        self.shapes.get(&class).map(Vec::as_slice)
    }
}
