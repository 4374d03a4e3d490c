//! Background worker that drains the arena into the cache file.
//!
//! One worker per storage. The worker thread alternates between a drain
//! attempt and a timed condition-variable wait, wakes immediately on
//! shutdown, performs one final forced drain, and signals completion. Stop
//! requests from a process other than the one that started the worker are
//! ignored: after a fork the child inherits the synchronization state but not
//! the thread, so only the originator may clean up.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::storage::arena::RingArena;
use crate::storage::CacheError;

#[derive(Debug)]
pub(crate) struct WorkerState {
    pub running: bool,
    pub exit_finished: bool,
    pub origin_pid: u32,
}

/// Shared handshake between the storage facade, the worker thread, and
/// whoever calls stop.
pub(crate) struct WorkerSync {
    pub state: Mutex<WorkerState>,
    /// Signalled when `running` flips, waking the worker out of its timed wait.
    pub running_changed: Condvar,
    /// Signalled once the worker has done its final drain and closed up.
    pub exit_changed: Condvar,
}

impl WorkerSync {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorkerState {
                running: false,
                exit_finished: false,
                origin_pid: 0,
            }),
            running_changed: Condvar::new(),
            exit_changed: Condvar::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().expect("worker mutex poisoned").running
    }
}

/// Owns the flush thread and its output file path.
pub struct FlushWorker {
    arena: Arc<RingArena>,
    sync: Arc<WorkerSync>,
    filepath: PathBuf,
    flush_interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl FlushWorker {
    pub(crate) fn new(
        arena: Arc<RingArena>,
        sync: Arc<WorkerSync>,
        filepath: PathBuf,
        flush_interval: Duration,
    ) -> Self {
        Self {
            arena,
            sync,
            filepath,
            flush_interval,
            handle: None,
        }
    }

    /// Open the output file and launch the flush thread.
    ///
    /// `current_pid` is recorded as the origin; only a [`FlushWorker::stop`]
    /// carrying the same pid will join the thread.
    pub fn start(&mut self, current_pid: u32) -> Result<(), CacheError> {
        let file = File::create(&self.filepath).map_err(|source| CacheError::OpenFailed {
            path: self.filepath.clone(),
            source,
        })?;
        tracing::info!(path = %self.filepath.display(), "flush worker writing to file");

        {
            let mut state = self.sync.state.lock().expect("worker mutex poisoned");
            state.running = true;
            state.exit_finished = false;
            state.origin_pid = current_pid;
        }

        let arena = Arc::clone(&self.arena);
        let sync = Arc::clone(&self.sync);
        let interval = self.flush_interval;
        let handle = thread::Builder::new()
            .name("traceflux-flush".into())
            .spawn(move || run_flush_loop(&arena, &sync, BufWriter::new(file), interval))
            .expect("failed to spawn flush thread");
        self.handle = Some(handle);
        Ok(())
    }

    /// Shut the worker down.
    ///
    /// Idempotent: a stop after the worker has exited is a no-op. A stop from
    /// a pid other than the origin is also a no-op and leaves the worker
    /// running.
    pub fn stop(&mut self, current_pid: u32) {
        let mut state = self.sync.state.lock().expect("worker mutex poisoned");
        if !state.running {
            return;
        }
        if state.origin_pid != current_pid {
            tracing::warn!(
                origin_pid = state.origin_pid,
                current_pid,
                "flush worker not stopped: not the origin process"
            );
            return;
        }

        tracing::info!("buffered storage shutting down");
        state.running = false;
        self.sync.running_changed.notify_all();

        while !state.exit_finished {
            state = self
                .sync
                .exit_changed
                .wait(state)
                .expect("worker mutex poisoned");
        }
        drop(state);

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("flush thread panicked before joining");
            }
        }
    }
}

fn run_flush_loop(
    arena: &RingArena,
    sync: &WorkerSync,
    mut writer: BufWriter<File>,
    interval: Duration,
) {
    loop {
        if let Err(error) = arena.drain_to(&mut writer, false) {
            // Best-effort durability: losing this window beats stalling producers.
            tracing::warn!(%error, "periodic drain failed");
        }

        let state = sync.state.lock().expect("worker mutex poisoned");
        if !state.running {
            break;
        }
        let (state, _timeout) = sync
            .running_changed
            .wait_timeout_while(state, interval, |s| s.running)
            .expect("worker mutex poisoned");
        if !state.running {
            break;
        }
    }

    if let Err(error) = arena.drain_to(&mut writer, true) {
        tracing::warn!(%error, "final drain failed");
    }
    if let Err(error) = writer.flush() {
        tracing::warn!(%error, "could not flush cache file");
    }
    drop(writer);

    let mut state = sync.state.lock().expect("worker mutex poisoned");
    state.exit_finished = true;
    sync.exit_changed.notify_all();
    tracing::debug!("flush worker exited");
}
