//! Framed read loop over a cache file.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::core::sample::{Cacheable, SampleHeader, SampleTypeId, HEADER_SIZE};
use crate::storage::codec::ReadCursor;
use crate::storage::registry::TypeRegistry;
use crate::storage::CacheError;

/// Receives each decoded sample during [`StorageParser::load`].
///
/// `sample` downcasts through [`Cacheable::as_any`] to the concrete type
/// matching `type_identifier`. Fillers and unregistered types never arrive
/// here, and no cross-producer ordering may be assumed between invocations.
pub trait SampleProcessor {
    fn process(&mut self, type_identifier: SampleTypeId, sample: &dyn Cacheable);
}

/// Replays a cache file through a processor and removes it afterwards.
pub struct StorageParser<P> {
    filepath: PathBuf,
    registry: TypeRegistry,
    pub processor: P,
    on_finished: Option<Box<dyn FnOnce() + Send>>,
}

impl<P: SampleProcessor> StorageParser<P> {
    pub fn new(filepath: impl Into<PathBuf>, registry: TypeRegistry, processor: P) -> Self {
        Self {
            filepath: filepath.into(),
            registry,
            processor,
            on_finished: None,
        }
    }

    /// Register a callback invoked once after the file has been consumed and
    /// removed.
    pub fn register_on_finished(&mut self, callback: impl FnOnce() + Send + 'static) {
        self.on_finished = Some(Box::new(callback));
    }

    /// Parse every frame in the file, dispatching registered samples to the
    /// processor.
    ///
    /// Fillers are skipped by length. Frames with an unregistered identifier
    /// are skipped; the file may have been written by a program with a
    /// larger registry. Truncated payloads are logged and skipped. The file
    /// is deleted from disk once the loop finishes.
    pub fn load(&mut self) -> Result<(), CacheError> {
        tracing::info!(path = %self.filepath.display(), "consuming buffered storage");

        let file = File::open(&self.filepath).map_err(|source| CacheError::OpenFailed {
            path: self.filepath.clone(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let mut header_buf = [0u8; HEADER_SIZE];

        loop {
            if !read_header(&mut reader, &mut header_buf) {
                break;
            }
            let header: SampleHeader = *bytemuck::from_bytes(&header_buf);
            let payload_size = { header.payload_size };

            // The engine never frames an empty payload; tolerate one anyway.
            if payload_size == 0 {
                continue;
            }

            let mut payload = vec![0u8; payload_size];
            if let Err(error) = reader.read_exact(&mut payload) {
                tracing::warn!(
                    %error,
                    payload_size,
                    "short read while consuming buffered storage; skipping sample"
                );
                continue;
            }

            if header.is_filler() {
                continue;
            }

            let id = header.type_identifier();
            let mut cursor = ReadCursor::new(&payload);
            match self.registry.get_type(id, &mut cursor) {
                Some(sample) => self.processor.process(id, sample.as_ref()),
                None => {
                    tracing::debug!(type_identifier = id.raw(), "unsupported type; skipping sample")
                }
            }
        }

        tracing::info!(path = %self.filepath.display(), "file parsing finished; removing from file system");
        if let Err(error) = fs::remove_file(&self.filepath) {
            tracing::warn!(%error, "could not remove consumed storage file");
        }

        if let Some(callback) = self.on_finished.take() {
            callback();
        }
        Ok(())
    }
}

/// Fill `buf` with the next header. `false` ends the loop: a clean
/// end-of-stream, a trailing partial header, or a read error (both of the
/// latter are logged).
fn read_header<R: Read>(reader: &mut R, buf: &mut [u8]) -> bool {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled > 0 {
                    tracing::warn!(bytes = filled, "truncated frame header at end of stream");
                }
                return false;
            }
            Ok(n) => filled += n,
            Err(error) => {
                tracing::warn!(%error, "read error while consuming buffered storage");
                return false;
            }
        }
    }
    true
}
