// This module defines TaggedValue, the closed variant set used to pass
// heterogeneous, variadic-like argument lists to the formatter without
// language-level generics. Each variant corresponds to one runtime type code:
// "s" string, "S" byte-slice, "z" bool, "b" byte, "i" signed int, "u" unsigned
// int, "p" pointer. The Other variant is the unrecognized-tag fallback; it
// carries the raw tag text plus the address and first two machine words its
// diagnostic dump prints. Dispatch in the formatter is by variant, which the
// type codes mirror exactly.

//! Tagged values: runtime type codes in place of generics.

use crate::container::Container;

/// One heterogeneous argument, paired with its runtime type tag.
///
/// Containers inside a value are descriptors; the bytes stay in the arena
/// and are resolved at format time.
#[derive(Debug, Clone, Copy)]
pub enum TaggedValue {
    /// Type code `"s"`: a byte-string container.
    Str(Container),
    /// Type code `"S"`: a byte-slice container, formatted exactly like a
    /// string.
    Bytes(Container),
    /// Type code `"z"`.
    Bool(bool),
    /// Type code `"b"`.
    Byte(u8),
    /// Type code `"i"`.
    Int(i32),
    /// Type code `"u"`.
    Uint(u32),
    /// Type code `"p"`: an address-sized value.
    Ptr(usize),
    /// An unrecognized tag. Formatting it produces a deterministic
    /// diagnostic dump, never a crash.
    Other {
        /// The literal tag text.
        code: &'static str,
        /// Address of the value the tag was attached to.
        addr: usize,
        /// First two machine words stored at that address.
        words: [usize; 2],
    },
}

impl TaggedValue {
    /// The runtime type tag, as emitted by the `%T` introspection directive.
    pub fn type_code(&self) -> &'static str {
        match self {
            TaggedValue::Str(_) => "s",
            TaggedValue::Bytes(_) => "S",
            TaggedValue::Bool(_) => "z",
            TaggedValue::Byte(_) => "b",
            TaggedValue::Int(_) => "i",
            TaggedValue::Uint(_) => "u",
            TaggedValue::Ptr(_) => "p",
            TaggedValue::Other { code, .. } => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes() {
        assert_eq!(TaggedValue::Bool(true).type_code(), "z");
        assert_eq!(TaggedValue::Byte(0).type_code(), "b");
        assert_eq!(TaggedValue::Int(-1).type_code(), "i");
        assert_eq!(TaggedValue::Uint(1).type_code(), "u");
        assert_eq!(TaggedValue::Ptr(0x40).type_code(), "p");
        assert_eq!(TaggedValue::Str(Container::NIL).type_code(), "s");
        assert_eq!(TaggedValue::Bytes(Container::NIL).type_code(), "S");
        let other = TaggedValue::Other {
            code: "m4_map",
            addr: 0,
            words: [0, 0],
        };
        assert_eq!(other.type_code(), "m4_map");
    }
}
