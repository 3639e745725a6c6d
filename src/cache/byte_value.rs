//! Byte Value Module
//!
//! Immutable byte payload that every namespace caches and hands out.

use std::fmt;

use bytes::Bytes;

use crate::cache::ByteSize;

// == Byte Value ==
/// An immutable view over cached bytes.
///
/// Cloning is cheap (reference counted) and never exposes mutable access;
/// callers that need to own the bytes get a fresh copy via [`ByteValue::to_vec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteValue {
    bytes: Bytes,
}

impl ByteValue {
    /// Copies `data` into a new value.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    pub fn from_static(data: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(data),
        }
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Borrowed read-only view.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteSize for ByteValue {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

/// Takes ownership of the vector; nothing else can alias it afterwards.
impl From<Vec<u8>> for ByteValue {
    fn from(data: Vec<u8>) -> Self {
        Self {
            bytes: Bytes::from(data),
        }
    }
}

impl From<&str> for ByteValue {
    fn from(data: &str) -> Self {
        Self::copy_from_slice(data.as_bytes())
    }
}

/// Text view; invalid UTF-8 sequences are replaced.
impl fmt::Display for ByteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}
