// This module implements the growable container model, the shared physical
// representation behind both byte-strings and generic slices. A Container is a
// plain {base, offset, len} descriptor over an allocator block: a Copy value
// type, so assigning one never copies the underlying bytes, and a nil base is
// the canonical empty container. Appending returns an updated descriptor by
// value and may replace the base with a bigger block, copying the live bytes
// and abandoning the old block (an intentional leak while there is no
// collector). Under the capped policy the capacities a container ever sees are
// exactly {0, 100, 254} and outgrowing 254 bytes is fatal, reflecting the
// 8-bit length field of the constrained target; under the geometric policy
// blocks double instead and mixed element sizes are rejected at append time.
// Every nullness or bounds violation in this layer is fatal with a diagnostic;
// there is no recoverable-error channel here.

//! Growable containers over the guarded allocator.
//!
//! The descriptor shape is shared by byte-strings and element slices; the
//! interpretation (byte length vs element count) is supplied per call via an
//! element size, the way generated code without generics passes it.

use crate::heap::{Arena, Class, GrowthPolicy, Handle};

/// Capacity of the first block an empty container allocates on append.
pub const INITIAL_CAP: usize = 100;

/// Growth ceiling under [`GrowthPolicy::Capped`]: one growth step to exactly
/// this capacity is all that is supported.
pub const MAX_CAP: usize = 254;

/// The `{base, offset, len}` descriptor shared by byte-strings and slices.
///
/// `len` counts bytes, not elements. If `base` is non-nil then
/// `offset + len <= capacity(base)`; if `base` is nil the container is
/// canonically empty with `offset == len == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    base: Handle,
    offset: u32,
    len: u32,
}

impl Container {
    /// The canonical empty container.
    pub const NIL: Container = Container {
        base: Handle::NIL,
        offset: 0,
        len: 0,
    };

    /// Whether the container has no backing block.
    pub fn is_nil(&self) -> bool {
        self.base.is_nil()
    }

    /// The backing block handle (nil for an empty container).
    pub fn base(&self) -> Handle {
        self.base
    }

    /// Live byte length.
    pub fn byte_len(&self) -> usize {
        self.len as usize
    }

    /// One-shot, non-growable conversion: a block sized exactly to `src`
    /// with the bytes copied in.
    pub fn from_bytes(arena: &mut Arena, src: &[u8]) -> Container {
        let base = arena.alloc(src.len(), Class::Bytes);
        arena.bytes_mut(base, 0, src.len()).copy_from_slice(src);
        Container {
            base,
            offset: 0,
            len: src.len() as u32,
        }
    }

    /// String-flavored conversion: allocates one extra byte and leaves it
    /// zero, so the payload doubles as a NUL-terminated C string. The
    /// container length excludes the terminator.
    pub fn from_str(arena: &mut Arena, s: &str) -> Container {
        let base = arena.alloc(s.len() + 1, Class::Bytes);
        arena.bytes_mut(base, 0, s.len()).copy_from_slice(s.as_bytes());
        Container {
            base,
            offset: 0,
            len: s.len() as u32,
        }
    }

    /// Append one element's bytes, returning the updated descriptor by
    /// value. The input descriptor is not mutated; callers must retain the
    /// return value.
    ///
    /// A nil container first gets a fresh block of [`INITIAL_CAP`] bytes.
    /// When the element does not fit, capped mode grows once to exactly
    /// [`MAX_CAP`] bytes (a second growth is fatal) while geometric mode
    /// doubles as needed.
    pub fn append(self, arena: &mut Arena, elem: &[u8]) -> Container {
        let mut c = self;
        if c.base.is_nil() {
            c.base = arena.alloc(INITIAL_CAP, Class::Bytes);
            c.offset = 0;
            c.len = 0;
        }
        if arena.policy() == GrowthPolicy::Geometric && !elem.is_empty() {
            assert!(
                c.len as usize % elem.len() == 0,
                "container: element size {} does not divide live length {}",
                elem.len(),
                c.len
            );
        }
        let cap = arena.capacity(c.base);
        let needed = c.offset as usize + c.len as usize + elem.len();
        if needed > cap {
            let new_cap = match arena.policy() {
                GrowthPolicy::Capped => {
                    assert!(
                        cap < MAX_CAP,
                        "container: exceeds the {MAX_CAP}-byte growth ceiling"
                    );
                    MAX_CAP
                }
                GrowthPolicy::Geometric => needed.max(cap * 2),
            };
            let grown = arena.alloc(new_cap, Class::Bytes);
            arena.copy(grown, 0, c.base, 0, cap);
            log::debug!(
                "container: grew {:#x} (cap {cap}) -> {:#x} (cap {new_cap})",
                c.base.addr(),
                grown.addr()
            );
            c.base = grown;
            assert!(
                needed <= arena.capacity(c.base),
                "container: element of {} bytes does not fit after growth",
                elem.len()
            );
        }
        arena
            .bytes_mut(c.base, c.offset as usize + c.len as usize, elem.len())
            .copy_from_slice(elem);
        c.len += elem.len() as u32;
        c
    }

    /// Copy element `index` (of `size` bytes) out into `out`. Fatal on a nil
    /// container, a negative index, or an out-of-bounds index.
    pub fn index_get(&self, arena: &Arena, size: usize, index: i32, out: &mut [u8]) {
        self.check_index("get", size, index);
        assert_eq!(out.len(), size, "container: get buffer size mismatch");
        let at = self.offset as usize + index as usize * size;
        out.copy_from_slice(arena.bytes(self.base, at, size));
    }

    /// Copy `value` (of `size` bytes) in over element `index`. Fatal on a
    /// nil container, a negative index, or an out-of-bounds index.
    pub fn index_put(&self, arena: &mut Arena, size: usize, index: i32, value: &[u8]) {
        self.check_index("put", size, index);
        assert_eq!(value.len(), size, "container: put value size mismatch");
        let at = self.offset as usize + index as usize * size;
        arena.bytes_mut(self.base, at, size).copy_from_slice(value);
    }

    /// Single-byte get, the string indexing primitive.
    pub fn byte_at(&self, arena: &Arena, index: i32) -> u8 {
        self.check_index("get", 1, index);
        arena.bytes(self.base, self.offset as usize + index as usize, 1)[0]
    }

    fn check_index(&self, what: &str, size: usize, index: i32) {
        assert!(!self.base.is_nil(), "container: {what} on nil container");
        assert!(index >= 0, "container: {what} index {index} is negative");
        assert!(
            index as usize * size < self.len as usize,
            "container: {what} index {index} out of bounds (size {size}, len {})",
            self.len
        );
    }

    /// Element count for a given element size: 0 when nil, else the byte
    /// length divided by `size`. Integer division; under the capped
    /// compatibility policy a remainder is truncated silently.
    pub fn count(&self, size: usize) -> usize {
        assert!(size > 0, "container: zero element size");
        if self.base.is_nil() {
            return 0;
        }
        self.len as usize / size
    }

    /// Concatenate two containers into a block of exactly `len_a + len_b`
    /// live bytes plus a zero terminator byte for C-string compatibility.
    pub fn concat(arena: &mut Arena, a: Container, b: Container) -> Container {
        let n = a.len as usize + b.len as usize;
        let base = arena.alloc(n + 1, Class::Bytes);
        if !a.base.is_nil() {
            arena.copy(base, 0, a.base, a.offset as usize, a.len as usize);
        }
        if !b.base.is_nil() {
            arena.copy(base, a.len as usize, b.base, b.offset as usize, b.len as usize);
        }
        Container {
            base,
            offset: 0,
            len: n as u32,
        }
    }

    /// Borrow the live bytes. Empty slice for a nil container.
    pub fn bytes<'a>(&self, arena: &'a Arena) -> &'a [u8] {
        if self.base.is_nil() {
            return &[];
        }
        arena.bytes(self.base, self.offset as usize, self.len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capped() -> Arena {
        Arena::host(GrowthPolicy::Capped)
    }

    #[test]
    fn test_nil_container_is_empty() {
        let c = Container::NIL;
        assert!(c.is_nil());
        assert_eq!(c.byte_len(), 0);
        assert_eq!(c.count(4), 0);
        let arena = capped();
        assert_eq!(c.bytes(&arena), b"");
    }

    #[test]
    fn test_append_on_nil_yields_one_element() {
        let mut arena = capped();
        let c = Container::NIL.append(&mut arena, &7i32.to_le_bytes());
        assert_eq!(c.byte_len(), 4);
        assert_eq!(c.count(4), 1);
        assert_eq!(arena.capacity(c.base()), INITIAL_CAP);
    }

    #[test]
    fn test_capacities_come_only_from_the_fixed_set() {
        let mut arena = capped();
        let mut c = Container::NIL;
        let mut seen = vec![c.count(1)]; // 0 for the nil container
        for i in 0..60u32 {
            c = c.append(&mut arena, &i.to_le_bytes());
            seen.push(arena.capacity(c.base()));
        }
        assert!(seen.iter().all(|cap| [0, INITIAL_CAP, MAX_CAP].contains(cap)));
        assert_eq!(c.count(4), 60);
        assert_eq!(c.byte_len(), 240);
    }

    #[test]
    fn test_growth_preserves_contents() {
        let mut arena = capped();
        let mut c = Container::NIL;
        for i in 0..40u32 {
            c = c.append(&mut arena, &i.to_le_bytes());
        }
        assert_eq!(arena.capacity(c.base()), MAX_CAP);
        for i in 0..40i32 {
            let mut out = [0u8; 4];
            c.index_get(&arena, 4, i, &mut out);
            assert_eq!(u32::from_le_bytes(out), i as u32);
        }
    }

    #[test]
    #[should_panic(expected = "growth ceiling")]
    fn test_second_growth_is_fatal() {
        let mut arena = capped();
        let mut c = Container::NIL;
        for i in 0..70u32 {
            c = c.append(&mut arena, &i.to_le_bytes());
        }
    }

    #[test]
    fn test_geometric_growth_is_unbounded() {
        let mut arena = Arena::host(GrowthPolicy::Geometric);
        let mut c = Container::NIL;
        for i in 0..300u32 {
            c = c.append(&mut arena, &i.to_le_bytes());
        }
        assert_eq!(c.byte_len(), 1200);
        assert_eq!(c.count(4), 300);
        let mut out = [0u8; 4];
        c.index_get(&arena, 4, 299, &mut out);
        assert_eq!(u32::from_le_bytes(out), 299);
    }

    #[test]
    #[should_panic(expected = "does not divide")]
    fn test_geometric_mode_rejects_mixed_element_sizes() {
        let mut arena = Arena::host(GrowthPolicy::Geometric);
        let c = Container::NIL.append(&mut arena, b"abc");
        c.append(&mut arena, &1u16.to_le_bytes());
    }

    #[test]
    fn test_capped_count_truncates_silently() {
        let mut arena = capped();
        let c = Container::NIL.append(&mut arena, b"abc");
        assert_eq!(c.count(2), 1);
    }

    #[test]
    #[should_panic(expected = "zero element size")]
    fn test_count_with_zero_element_size_is_fatal() {
        let mut arena = capped();
        let c = Container::from_bytes(&mut arena, b"abc");
        c.count(0);
    }

    #[test]
    fn test_put_get_round_trip_every_index() {
        let mut arena = capped();
        let mut c = Container::NIL;
        for _ in 0..10 {
            c = c.append(&mut arena, &[0u8; 2]);
        }
        for i in 0..10i32 {
            let value = [i as u8, 0x40 + i as u8];
            c.index_put(&mut arena, 2, i, &value);
            let mut out = [0u8; 2];
            c.index_get(&arena, 2, i, &mut out);
            assert_eq!(out, value);
        }
    }

    #[test]
    #[should_panic(expected = "nil container")]
    fn test_get_on_nil_is_fatal() {
        let arena = capped();
        let mut out = [0u8; 1];
        Container::NIL.index_get(&arena, 1, 0, &mut out);
    }

    #[test]
    #[should_panic(expected = "is negative")]
    fn test_negative_index_is_fatal() {
        let mut arena = capped();
        let c = Container::from_bytes(&mut arena, b"xy");
        let mut out = [0u8; 1];
        c.index_get(&arena, 1, -1, &mut out);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_out_of_bounds_index_is_fatal() {
        let mut arena = capped();
        let c = Container::from_bytes(&mut arena, b"xy");
        let mut out = [0u8; 1];
        c.index_get(&arena, 1, 2, &mut out);
    }

    #[test]
    fn test_from_bytes_is_exact() {
        let mut arena = capped();
        let c = Container::from_bytes(&mut arena, b"hello");
        assert_eq!(c.bytes(&arena), b"hello");
        assert_eq!(c.byte_len(), 5);
        // Exact-size conversion: quantization only, no spare capacity.
        assert_eq!(arena.capacity(c.base()), 6);
    }

    #[test]
    fn test_from_str_is_nul_terminated() {
        let mut arena = capped();
        let c = Container::from_str(&mut arena, "abc");
        assert_eq!(c.bytes(&arena), b"abc");
        assert_eq!(c.byte_len(), 3);
        assert_eq!(arena.bytes(c.base(), 3, 1), b"\0");
    }

    #[test]
    fn test_byte_at() {
        let mut arena = capped();
        let c = Container::from_str(&mut arena, "abc");
        assert_eq!(c.byte_at(&arena, 0), b'a');
        assert_eq!(c.byte_at(&arena, 2), b'c');
    }

    #[test]
    fn test_concat() {
        let mut arena = capped();
        let a = Container::from_str(&mut arena, "Hello ");
        let b = Container::from_str(&mut arena, "World");
        let joined = Container::concat(&mut arena, a, b);
        assert_eq!(joined.bytes(&arena), b"Hello World");
        assert_eq!(joined.byte_len(), 11);
        // Terminator byte after the live bytes.
        assert_eq!(arena.bytes(joined.base(), 11, 1), b"\0");
    }

    #[test]
    fn test_concat_with_nil_halves() {
        let mut arena = capped();
        let a = Container::from_str(&mut arena, "solo");
        let left = Container::concat(&mut arena, Container::NIL, a);
        let right = Container::concat(&mut arena, a, Container::NIL);
        assert_eq!(left.bytes(&arena), b"solo");
        assert_eq!(right.bytes(&arena), b"solo");
    }

    #[test]
    fn test_descriptor_copies_share_bytes() {
        let mut arena = capped();
        let c = Container::from_bytes(&mut arena, &[0u8, 0]);
        let d = c; // value copy of the descriptor only
        c.index_put(&mut arena, 1, 0, &[0xEE]);
        assert_eq!(d.byte_at(&arena, 0), 0xEE);
    }
}
