//! Sample fixtures shared by the integration tests.
#![allow(dead_code)]

use std::mem;

use traceflux::storage::codec::{self, ReadCursor, WriteCursor};
use traceflux::{Cacheable, Sample, SampleProcessor, SampleTypeId};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSample {
    pub track_name: String,
    pub node_id: u64,
    pub process_id: u64,
    pub thread_id: u64,
    pub extdata: String,
}

impl Sample for TrackSample {
    const TYPE_IDENTIFIER: SampleTypeId = SampleTypeId::new(0);

    fn byte_size(&self) -> usize {
        codec::str_size(&self.track_name)
            + 3 * mem::size_of::<u64>()
            + codec::str_size(&self.extdata)
    }

    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.put_str(&self.track_name);
        cursor.put_u64(self.node_id);
        cursor.put_u64(self.process_id);
        cursor.put_u64(self.thread_id);
        cursor.put_str(&self.extdata);
    }

    fn deserialize(cursor: &mut ReadCursor<'_>) -> Self {
        Self {
            track_name: cursor.get_string(),
            node_id: cursor.get_u64(),
            process_id: cursor.get_u64(),
            thread_id: cursor.get_u64(),
            extdata: cursor.get_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub guid: String,
    pub node_id: u64,
    pub parent_process_id: u64,
    pub process_id: u64,
    pub start: u64,
    pub end: u64,
    pub command: String,
}

impl Sample for ProcessSample {
    const TYPE_IDENTIFIER: SampleTypeId = SampleTypeId::new(1);

    fn byte_size(&self) -> usize {
        codec::str_size(&self.guid) + 5 * mem::size_of::<u64>() + codec::str_size(&self.command)
    }

    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.put_str(&self.guid);
        cursor.put_u64(self.node_id);
        cursor.put_u64(self.parent_process_id);
        cursor.put_u64(self.process_id);
        cursor.put_u64(self.start);
        cursor.put_u64(self.end);
        cursor.put_str(&self.command);
    }

    fn deserialize(cursor: &mut ReadCursor<'_>) -> Self {
        Self {
            guid: cursor.get_string(),
            node_id: cursor.get_u64(),
            parent_process_id: cursor.get_u64(),
            process_id: cursor.get_u64(),
            start: cursor.get_u64(),
            end: cursor.get_u64(),
            command: cursor.get_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlobSample {
    pub payload: Vec<u8>,
}

impl Sample for BlobSample {
    const TYPE_IDENTIFIER: SampleTypeId = SampleTypeId::new(2);

    fn byte_size(&self) -> usize {
        codec::bytes_size(&self.payload)
    }

    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.put_bytes(&self.payload);
    }

    fn deserialize(cursor: &mut ReadCursor<'_>) -> Self {
        Self {
            payload: cursor.get_bytes(),
        }
    }
}

impl TrackSample {
    pub fn numbered(n: u64) -> Self {
        Self {
            track_name: format!("track_{n}"),
            node_id: n,
            process_id: n + 1,
            thread_id: n + 2,
            extdata: "{}".into(),
        }
    }
}

impl ProcessSample {
    pub fn numbered(n: u64) -> Self {
        Self {
            guid: format!("guid-{n}"),
            node_id: n,
            parent_process_id: 1,
            process_id: n + 100,
            start: n * 10,
            end: n * 10 + 5,
            command: "/usr/bin/app".into(),
        }
    }
}

/// Collects every decoded sample by concrete type.
#[derive(Debug, Default)]
pub struct RecordingProcessor {
    pub tracks: Vec<TrackSample>,
    pub processes: Vec<ProcessSample>,
    pub blobs: Vec<BlobSample>,
}

impl SampleProcessor for RecordingProcessor {
    fn process(&mut self, type_identifier: SampleTypeId, sample: &dyn Cacheable) {
        assert_ne!(
            type_identifier,
            SampleTypeId::FRAGMENTED_SPACE,
            "fillers must never reach a processor"
        );
        let any = sample.as_any();
        if let Some(track) = any.downcast_ref::<TrackSample>() {
            assert_eq!(type_identifier, TrackSample::TYPE_IDENTIFIER);
            self.tracks.push(track.clone());
        } else if let Some(process) = any.downcast_ref::<ProcessSample>() {
            assert_eq!(type_identifier, ProcessSample::TYPE_IDENTIFIER);
            self.processes.push(process.clone());
        } else if let Some(blob) = any.downcast_ref::<BlobSample>() {
            assert_eq!(type_identifier, BlobSample::TYPE_IDENTIFIER);
            self.blobs.push(blob.clone());
        } else {
            panic!("unexpected sample type {type_identifier:?}");
        }
    }
}
