//! The record engine: arena, codec, flush worker, ingestion facade, registry
//! and file parser.

pub mod arena;
pub mod buffered;
pub mod codec;
pub mod flush;
pub mod parser;
pub mod registry;

use std::io;
use std::path::PathBuf;

use crate::core::sample::SampleTypeId;

pub use arena::{RingArena, Slot};
pub use buffered::BufferedStorage;
pub use flush::FlushWorker;
pub use parser::{SampleProcessor, StorageParser};
pub use registry::TypeRegistry;

/// Errors surfaced by the cache engine.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache file could not be opened for writing or reading.
    #[error("error opening file {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `store` was called before `start` or after `shutdown`.
    #[error("buffered storage is not running")]
    NotRunning,

    /// The sample type cannot be stored, e.g. it claims the reserved filler
    /// identifier.
    #[error("sample type {0:?} cannot be stored")]
    UnsupportedType(SampleTypeId),

    /// A frame does not fit the arena, either outright or because the flush
    /// worker cannot drain fast enough.
    #[error("frame of {requested} bytes does not fit the {capacity} byte arena")]
    ArenaOverflow { requested: usize, capacity: usize },
}
