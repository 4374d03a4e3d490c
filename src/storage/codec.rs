//! Packing and unpacking of sample payloads.
//!
//! The wire form is host-native byte order throughout; the cache file never
//! leaves the machine that wrote it. Fixed-width scalars are a direct copy of
//! their in-memory representation. Variable-length values (`&[u8]`, `&str`)
//! are a `usize` length followed by that many raw bytes.
//!
//! Callers size their buffers up front (see [`bytes_size`] / [`str_size`] and
//! `Sample::byte_size`), so the cursors index straight into the slice and let
//! the bounds check fire on a sizing bug rather than returning errors.

use std::mem;

/// Packed length of a length-prefixed byte slice.
#[inline]
pub fn bytes_size(value: &[u8]) -> usize {
    mem::size_of::<usize>() + value.len()
}

/// Packed length of a length-prefixed string.
#[inline]
pub fn str_size(value: &str) -> usize {
    mem::size_of::<usize>() + value.len()
}

macro_rules! put_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) {
                self.put_raw(&value.to_ne_bytes());
            }
        )*
    };
}

macro_rules! get_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> $ty {
                let mut raw = [0u8; mem::size_of::<$ty>()];
                raw.copy_from_slice(self.take(mem::size_of::<$ty>()));
                <$ty>::from_ne_bytes(raw)
            }
        )*
    };
}

/// Forward-only writer over a pre-sized byte slice.
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the underlying slice.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    fn put_raw(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    put_scalar! {
        put_u8: u8,
        put_u32: u32,
        put_u64: u64,
        put_usize: usize,
        put_i32: i32,
        put_i64: i64,
        put_f64: f64,
    }

    /// Write a length-prefixed byte slice.
    pub fn put_bytes(&mut self, value: &[u8]) {
        self.put_usize(value.len());
        self.put_raw(value);
    }

    /// Write a length-prefixed string.
    pub fn put_str(&mut self, value: &str) {
        self.put_bytes(value.as_bytes());
    }
}

/// Forward-only reader over a decoded payload.
///
/// Borrowed accessors ([`ReadCursor::get_str`]) return views into the
/// underlying buffer and are valid only while it lives; owned accessors copy.
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the underlying slice.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    fn take(&mut self, len: usize) -> &'a [u8] {
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    get_scalar! {
        get_u8: u8,
        get_u32: u32,
        get_u64: u64,
        get_usize: usize,
        get_i32: i32,
        get_i64: i64,
        get_f64: f64,
    }

    /// Read a length-prefixed byte slice without copying.
    pub fn get_byte_slice(&mut self) -> &'a [u8] {
        let len = self.get_usize();
        self.take(len)
    }

    /// Read a length-prefixed byte slice into an owned vector.
    pub fn get_bytes(&mut self) -> Vec<u8> {
        self.get_byte_slice().to_vec()
    }

    /// Read a length-prefixed string as a view into the decode buffer.
    pub fn get_str(&mut self) -> &'a str {
        std::str::from_utf8(self.get_byte_slice()).expect("string payload is not valid utf-8")
    }

    /// Read a length-prefixed string into an owned value.
    pub fn get_string(&mut self) -> String {
        self.get_str().to_owned()
    }
}
