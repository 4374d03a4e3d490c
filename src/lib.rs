//! # traceflux
//!
//! An in-process trace cache: telemetry samples from many concurrent
//! producers are framed into a shared ring arena, drained to an append-only
//! binary file by a background worker, and later replayed through
//! user-selected processors.
//!
//! ## Storing
//!
//! A type participates by implementing [`Sample`]: a stable numeric
//! identifier plus agreeing `serialize`/`deserialize`/`byte_size`
//! operations. Producers call [`BufferedStorage::store`] between `start` and
//! `shutdown`; the store path reserves a contiguous slot in the arena and
//! writes the frame without ever blocking on file I/O.
//!
//! ## Replaying
//!
//! [`StorageParser::load`] walks the cache file frame by frame, skips
//! fragmentation fillers and unregistered identifiers, decodes each payload
//! through the [`TypeRegistry`], and hands typed values to a
//! [`SampleProcessor`]. The file is removed once consumed.

pub mod core;
pub mod logs;
pub mod storage;

pub use crate::core::config::CacheConfig;
pub use crate::core::sample::{Cacheable, Sample, SampleHeader, SampleTypeId, HEADER_SIZE};
pub use crate::core::{initialize, load_config};
pub use crate::storage::{
    BufferedStorage, CacheError, RingArena, SampleProcessor, StorageParser, TypeRegistry,
};
