// This module implements the guarded block allocator itself. An Arena hands out
// fixed-class blocks whose six-byte header carries a guard sentinel, a quantized
// even capacity, a class tag, and a closing guard sentinel, followed by the
// zero-filled payload and a fixed trailing guard margin. Two backings conform to
// the same API: on a conventional host every block is an individual allocation
// out of a bumpalo Bump, while the constrained target carves blocks from one
// fixed byte region with a bump cursor and dies when it is exhausted. A Handle
// is the raw payload address; validity is purely structural (non-null, even,
// guards intact) and is only ever checked when validate or the header accessors
// are invoked. Nothing is reclaimed: free is a documented no-op and container
// growth abandons old blocks, pending the future tracing collector whose mark
// hook is registered here but never called.

//! Arena allocation with corruption-detecting block headers.
//!
//! Capacity quantization: `cap = (len + 1) & !1`, an even value at least as
//! large as the request. Payload addresses are therefore always even, which
//! is what lets [`Arena::validate`] reject odd handles outright.

use std::alloc::Layout;
use std::cmp::Ordering;
use std::ptr;
use std::slice;

use bumpalo::Bump;

use super::shape::{MarkFn, ShapeRegistry};
use super::{Class, GUARD_HEAD, GUARD_TAIL, LEN_INF};

/// Header bytes preceding every payload: guard, capacity (u16 LE), class,
/// guard, pad.
const HEADER_LEN: usize = 6;

/// Trailing scratch margin allocated past every payload.
const GUARD_MARGIN: usize = 8;

/// Opaque address of a block's payload, one past the header.
///
/// `Handle::NIL` is the null handle. A live handle is always non-null and
/// even; there is no live-set tracking of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

impl Handle {
    /// The null handle.
    pub const NIL: Handle = Handle(0);

    /// Reconstitute a handle from a raw payload address, e.g. at the ABI
    /// boundary with generated code.
    ///
    /// # Safety
    ///
    /// `addr` must be nil, odd, smaller than a block header, or a payload
    /// address previously returned by [`Arena::alloc`] on an arena that is
    /// still alive. The first three are rejected by [`Arena::validate`]
    /// without touching memory; only the last is ever read through.
    pub unsafe fn from_addr(addr: usize) -> Handle {
        Handle(addr)
    }

    /// The raw payload address.
    pub fn addr(self) -> usize {
        self.0
    }

    /// Whether this is the null handle.
    pub fn is_nil(self) -> bool {
        self.0 == 0
    }
}

/// Growth behavior selected at arena construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Compatibility with the 8-bit length representation: requested lengths
    /// stop below the 255 sentinel, containers grow once to 254 bytes and a
    /// second growth is fatal.
    Capped,
    /// Containers double when they outgrow their block; lengths are bounded
    /// only by the u16 capacity field. Mixed element sizes in one container
    /// are rejected at append time.
    Geometric,
}

enum Backing {
    /// The host allocator backs every block individually.
    Host(Bump),
    /// A fixed region on the constrained target; exhaustion is fatal.
    Fixed { buf: Box<[u8]>, cursor: usize },
}

/// The guarded block allocator.
///
/// A caller-owned value rather than process-wide state; everything allocated
/// from it lives exactly as long as it does.
pub struct Arena {
    backing: Backing,
    policy: GrowthPolicy,
    marker: Option<MarkFn>,
    shapes: ShapeRegistry,
}

impl Arena {
    /// Conventional-host arena: the platform allocator backs every block.
    pub fn host(policy: GrowthPolicy) -> Arena {
        Arena {
            backing: Backing::Host(Bump::new()),
            policy,
            marker: None,
            shapes: ShapeRegistry::new(),
        }
    }

    /// Constrained-target arena over a fixed region of `size` bytes.
    pub fn fixed(size: usize, policy: GrowthPolicy) -> Arena {
        log::debug!("heap: fixed arena of {size} bytes");
        Arena {
            backing: Backing::Fixed {
                buf: vec![0u8; size].into_boxed_slice(),
                cursor: 0,
            },
            policy,
            marker: None,
            shapes: ShapeRegistry::new(),
        }
    }

    /// The growth policy this arena was constructed with.
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Register the hook a future tracing collector will use to mark live
    /// blocks. Stored but never invoked by this layer.
    pub fn set_marker(&mut self, marker: MarkFn) {
        log::debug!("heap: mark hook registered");
        self.marker = Some(marker);
    }

    /// The registered mark hook, if any.
    pub fn marker(&self) -> Option<MarkFn> {
        self.marker
    }

    /// Register the nested-handle offsets for a block class. See
    /// [`ShapeRegistry`].
    pub fn register_shape(&mut self, class: Class, offsets: &[u16]) {
        self.shapes.register(class, offsets);
    }

    /// The registered shape for a block class, if any.
    pub fn shape_of(&self, class: Class) -> Option<&[u16]> {
        self.shapes.shape_of(class)
    }

    /// Allocate a block of at least `len` payload bytes tagged with `class`.
    ///
    /// Fatal if the request reaches the reserved 255 sentinel (capped mode)
    /// or overflows the capacity field (geometric mode). The payload is
    /// zero-filled and the returned handle validates immediately.
    pub fn alloc(&mut self, len: usize, class: Class) -> Handle {
        match self.policy {
            GrowthPolicy::Capped => assert!(
                len < LEN_INF,
                "heap: requested length {len} reaches the reserved sentinel {LEN_INF}"
            ),
            GrowthPolicy::Geometric => assert!(
                len < u16::MAX as usize,
                "heap: requested length {len} overflows the capacity field"
            ),
        }
        let cap = (len + 1) & !1;
        let total = HEADER_LEN + cap + GUARD_MARGIN;
        let block = self.carve(total);
        // SAFETY: `carve` returned an even-aligned region of `total` bytes
        // owned by this arena.
        unsafe {
            ptr::write_bytes(block, 0, total);
            *block = GUARD_HEAD;
            *block.add(1) = (cap & 0xFF) as u8;
            *block.add(2) = (cap >> 8) as u8;
            *block.add(3) = class as u8;
            *block.add(4) = GUARD_TAIL;
        }
        let handle = Handle(block as usize + HEADER_LEN);
        log::trace!(
            "heap: alloc len {len} cap {cap} class {class:?} -> {:#x}",
            handle.addr()
        );
        handle
    }

    fn carve(&mut self, total: usize) -> *mut u8 {
        match &mut self.backing {
            Backing::Host(bump) => {
                let layout = match Layout::from_size_align(total, 2) {
                    Ok(layout) => layout,
                    Err(_) => panic!("heap: invalid block layout of {total} bytes"),
                };
                bump.alloc_layout(layout).as_ptr()
            }
            Backing::Fixed { buf, cursor } => {
                // Keep payload addresses even within the region.
                if (buf.as_ptr() as usize + *cursor) & 1 != 0 {
                    *cursor += 1;
                }
                assert!(
                    *cursor + total <= buf.len(),
                    "heap: fixed arena exhausted ({total} bytes requested, {} free)",
                    buf.len() - *cursor
                );
                // SAFETY: the range `cursor..cursor + total` is in bounds.
                let block = unsafe { buf.as_mut_ptr().add(*cursor) };
                *cursor += total;
                block
            }
        }
    }

    /// Structural validity check: false for the null handle, for odd
    /// addresses, and for blocks whose guard sentinels have been overwritten.
    ///
    /// This is the only corruption check in the system and it runs only when
    /// explicitly invoked; a clobbered block that is never queried goes
    /// undetected.
    pub fn validate(&self, handle: Handle) -> bool {
        if handle.is_nil() || handle.addr() & 1 != 0 || handle.addr() < HEADER_LEN {
            return false;
        }
        let block = (handle.addr() - HEADER_LEN) as *const u8;
        // SAFETY: handles that survive the structural checks above are
        // produced by `alloc` (whose blocks live as long as this arena) or
        // by `Handle::from_addr`, whose contract restricts them to the same.
        unsafe { *block == GUARD_HEAD && *block.add(4) == GUARD_TAIL }
    }

    /// Quantized payload capacity of a block. Fatal if the handle would not
    /// validate.
    pub fn capacity(&self, handle: Handle) -> usize {
        assert!(
            self.validate(handle),
            "heap: invalid handle {:#x}",
            handle.addr()
        );
        let block = (handle.addr() - HEADER_LEN) as *const u8;
        // SAFETY: validated above.
        unsafe { *block.add(1) as usize | (*block.add(2) as usize) << 8 }
    }

    /// Class tag of a block. Fatal if the handle would not validate.
    pub fn class(&self, handle: Handle) -> Class {
        assert!(
            self.validate(handle),
            "heap: invalid handle {:#x}",
            handle.addr()
        );
        let block = (handle.addr() - HEADER_LEN) as *const u8;
        // SAFETY: validated above.
        let tag = unsafe { *block.add(3) };
        match Class::from_u8(tag) {
            Some(class) => class,
            None => panic!(
                "heap: unknown class tag {tag} in block {:#x}",
                handle.addr()
            ),
        }
    }

    /// Release a block. Unsafe to rely on: currently a no-op, with no reuse
    /// and no reference counting, pending the tracing collector.
    pub fn free(&mut self, handle: Handle) {
        log::trace!("heap: free {:#x} (no-op)", handle.addr());
    }

    /// Borrow `len` payload bytes starting at `offset`.
    pub fn bytes(&self, handle: Handle, offset: usize, len: usize) -> &[u8] {
        let cap = self.capacity(handle);
        assert!(
            offset + len <= cap,
            "heap: payload range {offset}..{} exceeds capacity {cap}",
            offset + len
        );
        // SAFETY: in bounds of a validated block owned by this arena, and the
        // shared borrow of `self` keeps mutation away for the duration.
        unsafe { slice::from_raw_parts((handle.addr() + offset) as *const u8, len) }
    }

    /// Mutably borrow `len` payload bytes starting at `offset`.
    pub fn bytes_mut(&mut self, handle: Handle, offset: usize, len: usize) -> &mut [u8] {
        let cap = self.capacity(handle);
        assert!(
            offset + len <= cap,
            "heap: payload range {offset}..{} exceeds capacity {cap}",
            offset + len
        );
        // SAFETY: as in `bytes`, with the exclusive borrow of `self`
        // guaranteeing uniqueness.
        unsafe { slice::from_raw_parts_mut((handle.addr() + offset) as *mut u8, len) }
    }

    /// Zero `len` payload bytes starting at `offset`.
    pub fn zero(&mut self, handle: Handle, offset: usize, len: usize) {
        self.bytes_mut(handle, offset, len).fill(0);
    }

    /// Copy `n` bytes between payloads. Source and destination may be the
    /// same block; overlapping ranges are handled.
    pub fn copy(
        &mut self,
        dst: Handle,
        dst_offset: usize,
        src: Handle,
        src_offset: usize,
        n: usize,
    ) {
        let dst_cap = self.capacity(dst);
        let src_cap = self.capacity(src);
        assert!(
            dst_offset + n <= dst_cap,
            "heap: copy destination {dst_offset}..{} exceeds capacity {dst_cap}",
            dst_offset + n
        );
        assert!(
            src_offset + n <= src_cap,
            "heap: copy source {src_offset}..{} exceeds capacity {src_cap}",
            src_offset + n
        );
        // SAFETY: both ranges are in bounds of validated blocks.
        unsafe {
            ptr::copy(
                (src.addr() + src_offset) as *const u8,
                (dst.addr() + dst_offset) as *mut u8,
                n,
            );
        }
    }

    /// Lexicographic comparison of two payload regions, shorter-is-less on a
    /// common prefix.
    pub fn compare(&self, a: Handle, len_a: usize, b: Handle, len_b: usize) -> Ordering {
        self.bytes(a, 0, len_a).cmp(self.bytes(b, 0, len_b))
    }

    #[cfg(test)]
    pub(crate) fn clobber_head_guard(&mut self, handle: Handle) {
        // SAFETY: test-only corruption of a known live block.
        unsafe { *((handle.addr() - HEADER_LEN) as *mut u8) = 0 }
    }

    #[cfg(test)]
    pub(crate) fn clobber_tail_guard(&mut self, handle: Handle) {
        // SAFETY: test-only corruption of a known live block.
        unsafe { *((handle.addr() - HEADER_LEN + 4) as *mut u8) = 0 }
    }
}
