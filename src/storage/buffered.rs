//! Producer-facing storage facade.

use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::config::CacheConfig;
use crate::core::sample::{Sample, SampleHeader, SampleTypeId, HEADER_SIZE};
use crate::storage::arena::RingArena;
use crate::storage::codec::WriteCursor;
use crate::storage::flush::{FlushWorker, WorkerSync};
use crate::storage::CacheError;

/// Buffered sample storage shared by any number of producer threads.
///
/// Samples go into the ring arena; the flush worker drains the arena to the
/// cache file in the background. `start` must precede `store`; `shutdown`
/// performs one final forced drain and is also invoked on drop.
///
/// ```no_run
/// use traceflux::storage::BufferedStorage;
///
/// let storage = BufferedStorage::new("/tmp/trace.bin");
/// storage.start().expect("start failed");
/// // storage.store(&sample)?;
/// storage.shutdown();
/// ```
pub struct BufferedStorage {
    arena: Arc<RingArena>,
    sync: Arc<WorkerSync>,
    worker: Mutex<FlushWorker>,
}

impl BufferedStorage {
    /// Create a storage writing to `filepath`, sized by the loaded
    /// configuration.
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self::with_config(filepath, crate::core::load_config())
    }

    pub fn with_config(filepath: impl Into<PathBuf>, config: &CacheConfig) -> Self {
        let arena = Arc::new(RingArena::new(config.buffer_size, config.flush_threshold));
        let sync = Arc::new(WorkerSync::new());
        let worker = FlushWorker::new(
            Arc::clone(&arena),
            Arc::clone(&sync),
            filepath.into(),
            Duration::from_millis(config.flush_interval_ms),
        );
        Self {
            arena,
            sync,
            worker: Mutex::new(worker),
        }
    }

    /// Begin flushing. A no-op while already running.
    pub fn start(&self) -> Result<(), CacheError> {
        self.start_from(process::id())
    }

    /// [`BufferedStorage::start`] with an explicit origin pid.
    pub fn start_from(&self, current_pid: u32) -> Result<(), CacheError> {
        let mut worker = self.worker.lock().expect("worker handle mutex poisoned");
        // Re-checked under the worker lock so racing starts spawn one thread.
        if self.sync.is_running() {
            return Ok(());
        }
        worker.start(current_pid)
    }

    pub fn is_running(&self) -> bool {
        self.sync.is_running()
    }

    /// Frame `value` and commit it to the arena.
    ///
    /// The frame is committed once this returns; a drain running concurrently
    /// with the payload write picks it up on the next pass. Fails with
    /// [`CacheError::NotRunning`] outside the start/shutdown window and with
    /// [`CacheError::ArenaOverflow`] when the frame cannot fit.
    pub fn store<T: Sample>(&self, value: &T) -> Result<(), CacheError> {
        if !self.sync.is_running() {
            return Err(CacheError::NotRunning);
        }
        if T::TYPE_IDENTIFIER == SampleTypeId::FRAGMENTED_SPACE {
            return Err(CacheError::UnsupportedType(T::TYPE_IDENTIFIER));
        }

        let payload_size = value.byte_size();
        let mut slot = self.arena.reserve(HEADER_SIZE + payload_size)?;
        let buf = slot.as_mut_slice();

        let header = SampleHeader::new(T::TYPE_IDENTIFIER, payload_size);
        buf[..HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));

        let mut cursor = WriteCursor::new(&mut buf[HEADER_SIZE..]);
        value.serialize(&mut cursor);
        debug_assert_eq!(
            cursor.position(),
            payload_size,
            "byte_size and serialize disagree for {:?}",
            T::TYPE_IDENTIFIER
        );
        Ok(())
    }

    /// Stop the flush worker after one final forced drain. Idempotent; a
    /// shutdown from a process other than the origin is a no-op.
    pub fn shutdown(&self) {
        self.shutdown_from(process::id());
    }

    /// [`BufferedStorage::shutdown`] with an explicit caller pid.
    pub fn shutdown_from(&self, current_pid: u32) {
        self.worker
            .lock()
            .expect("worker handle mutex poisoned")
            .stop(current_pid);
    }
}

impl Drop for BufferedStorage {
    fn drop(&mut self) {
        self.shutdown();
    }
}
