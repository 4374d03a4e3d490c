//! Identifier-keyed deserializer table.

use std::collections::HashMap;

use crate::core::sample::{Cacheable, Sample, SampleTypeId};
use crate::storage::codec::ReadCursor;

type BoxedDeserializer = Box<dyn Fn(&mut ReadCursor<'_>) -> Box<dyn Cacheable> + Send + Sync>;

/// Maps a [`SampleTypeId`] read from a frame header to the deserializer of
/// the registered type.
///
/// Built once before parsing; each registered type contributes a closure that
/// decodes one payload into a boxed [`Cacheable`]. Lookups for unregistered
/// identifiers return `None`: the file may have been written by a program
/// with a larger registry, and such frames are simply skipped.
#[derive(Default)]
pub struct TypeRegistry {
    deserializers: HashMap<SampleTypeId, BoxedDeserializer>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`TypeRegistry::register`].
    pub fn with_type<T: Sample>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Bind `T`'s deserializer to its identifier.
    ///
    /// Panics if the identifier is the reserved filler marker or is already
    /// taken by another type; both are wiring mistakes caught at registry
    /// construction.
    pub fn register<T: Sample>(&mut self) {
        assert!(
            T::TYPE_IDENTIFIER != SampleTypeId::FRAGMENTED_SPACE,
            "fragmented_space is reserved for arena fillers"
        );
        let previous = self.deserializers.insert(
            T::TYPE_IDENTIFIER,
            Box::new(|cursor: &mut ReadCursor<'_>| -> Box<dyn Cacheable> {
                Box::new(T::deserialize(cursor))
            }),
        );
        assert!(
            previous.is_none(),
            "duplicate sample type identifier {:?}",
            T::TYPE_IDENTIFIER
        );
    }

    /// Decode one payload by identifier, or `None` if `id` is unregistered.
    pub fn get_type(
        &self,
        id: SampleTypeId,
        cursor: &mut ReadCursor<'_>,
    ) -> Option<Box<dyn Cacheable>> {
        self.deserializers.get(&id).map(|deserialize| deserialize(cursor))
    }

    pub fn contains(&self, id: SampleTypeId) -> bool {
        self.deserializers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.deserializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deserializers.is_empty()
    }
}
