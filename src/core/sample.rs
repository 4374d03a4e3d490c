//! The sample contract: what a type must provide to travel through the cache.

use std::any::Any;
use std::fmt::Debug;
use std::mem;

use bytemuck::{Pod, Zeroable};

use crate::storage::codec::{ReadCursor, WriteCursor};

/// Numeric identifier bound to a sample type for the lifetime of the engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SampleTypeId(u32);

impl SampleTypeId {
    /// Reserved marker for arena fillers. No sample type may claim it; frames
    /// carrying it are skipped by the parser and never reach a processor.
    pub const FRAGMENTED_SPACE: SampleTypeId = SampleTypeId(0xFFFF);

    pub const fn new(raw: u32) -> Self {
        SampleTypeId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Base contract for anything that can come back out of the cache.
///
/// Processors receive decoded samples as `&dyn Cacheable` and downcast to the
/// concrete type matching the frame's [`SampleTypeId`].
pub trait Cacheable: Any + Send + Sync + Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T> Cacheable for T
where
    T: Any + Send + Sync + Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A storable sample type.
///
/// The three operations must agree: `serialize` writes exactly
/// `byte_size` bytes and `deserialize` consumes exactly that many. The
/// ingestion path sizes its arena reservation from `byte_size`, so a mismatch
/// corrupts the frame stream.
pub trait Sample: Cacheable {
    /// Unique identifier for this type. Must not be
    /// [`SampleTypeId::FRAGMENTED_SPACE`].
    const TYPE_IDENTIFIER: SampleTypeId;

    /// Packed length of this value in bytes.
    fn byte_size(&self) -> usize;

    /// Write the packed form of this value.
    fn serialize(&self, cursor: &mut WriteCursor<'_>);

    /// Inverse of [`Sample::serialize`].
    fn deserialize(cursor: &mut ReadCursor<'_>) -> Self
    where
        Self: Sized;
}

/// Byte length of a frame header: identifier plus payload length.
pub const HEADER_SIZE: usize = mem::size_of::<u32>() + mem::size_of::<usize>();

/// On-disk and in-arena frame header. Every frame is this header followed by
/// exactly `payload_size` payload bytes.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct SampleHeader {
    pub type_identifier: u32,
    pub payload_size: usize,
}

unsafe impl Zeroable for SampleHeader {}
unsafe impl Pod for SampleHeader {}

// NOTE: the packed layout is the wire format; this must never drift.
const _: () = assert!(mem::size_of::<SampleHeader>() == HEADER_SIZE);

impl SampleHeader {
    pub fn new(type_identifier: SampleTypeId, payload_size: usize) -> Self {
        Self {
            type_identifier: type_identifier.raw(),
            payload_size,
        }
    }

    pub fn type_identifier(&self) -> SampleTypeId {
        SampleTypeId::new(self.type_identifier)
    }

    pub fn is_filler(&self) -> bool {
        self.type_identifier() == SampleTypeId::FRAGMENTED_SPACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec;

    #[derive(Debug, PartialEq)]
    struct Probe {
        value: i32,
        text: String,
    }

    impl Sample for Probe {
        const TYPE_IDENTIFIER: SampleTypeId = SampleTypeId::new(1);

        fn byte_size(&self) -> usize {
            mem::size_of::<i32>() + codec::str_size(&self.text)
        }

        fn serialize(&self, cursor: &mut WriteCursor<'_>) {
            cursor.put_i32(self.value);
            cursor.put_str(&self.text);
        }

        fn deserialize(cursor: &mut ReadCursor<'_>) -> Self {
            Self {
                value: cursor.get_i32(),
                text: cursor.get_string(),
            }
        }
    }

    #[test]
    fn header_bytes_are_stable() {
        let header = SampleHeader::new(SampleTypeId::new(7), 42);
        let bytes = bytemuck::bytes_of(&header);
        assert_eq!(bytes.len(), HEADER_SIZE);

        let decoded: SampleHeader = *bytemuck::from_bytes(bytes);
        assert_eq!(decoded.type_identifier(), SampleTypeId::new(7));
        assert_eq!({ decoded.payload_size }, 42);
        assert!(!decoded.is_filler());
    }

    #[test]
    fn filler_header_is_recognized() {
        let header = SampleHeader::new(SampleTypeId::FRAGMENTED_SPACE, 100);
        assert!(header.is_filler());
    }

    #[test]
    fn sample_roundtrip_consumes_exact_size() {
        let probe = Probe {
            value: 42,
            text: "hello".into(),
        };
        let mut buf = vec![0u8; probe.byte_size()];
        let mut w = WriteCursor::new(&mut buf);
        probe.serialize(&mut w);
        assert_eq!(w.position(), probe.byte_size());

        let mut r = ReadCursor::new(&buf);
        assert_eq!(Probe::deserialize(&mut r), probe);
        assert_eq!(r.position(), probe.byte_size());
    }

    #[test]
    fn downcast_through_cacheable() {
        let probe = Probe {
            value: 1,
            text: "x".into(),
        };
        let dynamic: &dyn Cacheable = &probe;
        let concrete = dynamic
            .as_any()
            .downcast_ref::<Probe>()
            .expect("downcast failed");
        assert_eq!(concrete.value, 1);
    }
}
