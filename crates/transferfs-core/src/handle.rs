// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Caller-facing views over filesystem state

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{FsError, FsResult};
use crate::node::{FileNode, NodeInfo};

/// Random-access read view over an open file.
///
/// The view pins its node: content stays readable even if every name for
/// the node is removed while the handle is open.
#[derive(Debug)]
pub struct ReadHandle {
    node: Arc<FileNode>,
}

impl ReadHandle {
    pub(crate) fn new(node: Arc<FileNode>) -> Self {
        ReadHandle { node }
    }

    /// Read into `buf` starting at `offset`.
    ///
    /// Fails with `EndOfFile` at or past the end; a short count means the
    /// end was reached.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        self.node.read_at(buf, offset)
    }

    pub fn info(&self) -> NodeInfo {
        self.node.info()
    }

    /// Record the outcome of a failed transfer for later diagnostics.
    pub fn record_transfer_error(&self, error: FsError) {
        self.node.record_transfer_error(error);
    }

    pub fn last_transfer_error(&self) -> Option<FsError> {
        self.node.last_transfer_error()
    }
}

/// Random-access read/write view over an open file.
#[derive(Debug)]
pub struct WriteHandle {
    node: Arc<FileNode>,
    delay_per_byte: Option<Duration>,
}

impl WriteHandle {
    pub(crate) fn new(node: Arc<FileNode>, delay_per_byte: Option<Duration>) -> Self {
        WriteHandle {
            node,
            delay_per_byte,
        }
    }

    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        self.node.read_at(buf, offset)
    }

    /// Write `data` at `offset`, growing the file zero-filled as needed.
    ///
    /// Charges the configured per-byte delay before taking the node's
    /// content lock; the structural lock is never held here.
    pub fn write_at(&self, data: &[u8], offset: u64) -> FsResult<usize> {
        if let Some(delay) = self.delay_per_byte {
            thread::sleep(delay.saturating_mul(data.len() as u32));
        }
        self.node.write_at(data, offset)
    }

    pub fn info(&self) -> NodeInfo {
        self.node.info()
    }

    /// Record the outcome of a failed transfer for later diagnostics.
    pub fn record_transfer_error(&self, error: FsError) {
        self.node.record_transfer_error(error);
    }

    pub fn last_transfer_error(&self) -> Option<FsError> {
        self.node.last_transfer_error()
    }
}

/// Ordered snapshot of node metadata, pageable the way transfer protocols
/// read directories.
#[derive(Clone, Debug, Default)]
pub struct Listing {
    entries: Vec<NodeInfo>,
}

impl Listing {
    pub(crate) fn new(entries: Vec<NodeInfo>) -> Self {
        Listing { entries }
    }

    /// Entries starting at `offset`, at most `max` of them.
    ///
    /// Fails with `EndOfFile` when `offset` is at or past the end of the
    /// listing; a short page means the listing is exhausted.
    pub fn read_at(&self, offset: u64, max: usize) -> FsResult<&[NodeInfo]> {
        if offset >= self.entries.len() as u64 {
            return Err(FsError::EndOfFile);
        }
        let start = offset as usize;
        let end = self.entries.len().min(start.saturating_add(max));
        Ok(&self.entries[start..end])
    }

    pub fn entries(&self) -> &[NodeInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_of(names: &[&str]) -> Listing {
        Listing::new(
            names
                .iter()
                .map(|name| FileNode::new_file(format!("/{name}")).info())
                .collect(),
        )
    }

    #[test]
    fn listing_pages_until_exhausted() {
        let listing = listing_of(&["a", "b", "c"]);

        let page = listing.read_at(0, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "a");
        assert_eq!(page[1].name, "b");

        // Short page signals the end
        let page = listing.read_at(2, 2).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "c");

        assert_eq!(listing.read_at(3, 2).err(), Some(FsError::EndOfFile));
    }

    #[test]
    fn empty_listing_is_eof_immediately() {
        let listing = Listing::new(Vec::new());
        assert!(listing.is_empty());
        assert_eq!(listing.read_at(0, 8).err(), Some(FsError::EndOfFile));
    }

    #[test]
    fn write_handle_reads_its_own_writes() {
        let node = Arc::new(FileNode::new_file("/f"));
        let handle = WriteHandle::new(node, None);

        handle.write_at(b"payload", 0).unwrap();
        let mut buf = [0u8; 7];
        assert_eq!(handle.read_at(&mut buf, 0).unwrap(), 7);
        assert_eq!(&buf, b"payload");
    }

    #[test]
    fn handles_share_transfer_diagnostics() {
        let node = Arc::new(FileNode::new_file("/f"));
        let reader = ReadHandle::new(node.clone());
        let writer = WriteHandle::new(node, None);

        writer.record_transfer_error(FsError::EndOfFile);
        assert_eq!(reader.last_transfer_error(), Some(FsError::EndOfFile));
    }
}
