//! Buf: a borrowed, length-carrying view of a byte region.

use core::fmt;

/// A non-owning view of bytes used for both keys and values.
///
/// Equality is length equality plus byte-exact content equality. The
/// lifetime ties the view to the caller's memory, so a table holding a
/// `Buf<'a>` cannot outlive the bytes it references.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Buf<'a> {
    bytes: &'a [u8],
}

impl<'a> Buf<'a> {
    /// The zero-length buffer. Empty slots hold this.
    pub const EMPTY: Buf<'static> = Buf { bytes: &[] };

    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Buf { bytes }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub const fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    /// Identity comparison: same address and same length. Content equality
    /// is `==`.
    #[inline]
    pub fn ptr_eq(&self, other: &Buf<'_>) -> bool {
        core::ptr::eq(self.bytes, other.bytes)
    }
}

impl fmt::Debug for Buf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(self.bytes) {
            Ok(s) => write!(f, "Buf({:?})", s),
            Err(_) => write!(f, "Buf({:02x?})", self.bytes),
        }
    }
}

impl AsRef<[u8]> for Buf<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for Buf<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Buf::new(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Buf<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Buf::new(bytes)
    }
}

impl<'a> From<&'a str> for Buf<'a> {
    fn from(s: &'a str) -> Self {
        Buf::new(s.as_bytes())
    }
}

impl<'a> From<&'a Vec<u8>> for Buf<'a> {
    fn from(v: &'a Vec<u8>) -> Self {
        Buf::new(v.as_slice())
    }
}
