// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory filesystem nodes

use std::sync::Mutex;
use std::time::SystemTime;

use crate::error::{FsError, FsResult};

/// Hard cap on file content, `Vec`'s maximum length.
const MAX_CONTENT_LEN: usize = isize::MAX as usize;

/// What a node is. Fixed at creation: a file never becomes a directory,
/// a symlink's target never changes, and only files own content.
#[derive(Debug)]
pub(crate) enum NodeKind {
    File { content: Mutex<Vec<u8>> },
    Directory,
    Symlink { target: String },
}

/// A regular file, directory, or symlink.
///
/// Nodes are shared via `Arc`: a hard link is two map keys holding the
/// same node, and an open handle keeps its node alive after unlinking.
/// The recorded name is the full path the node was created at (or last
/// renamed to) and is what listings display.
#[derive(Debug)]
pub(crate) struct FileNode {
    name: Mutex<String>,
    kind: NodeKind,
    modified: SystemTime,
    transfer_error: Mutex<Option<FsError>>,
}

impl FileNode {
    pub(crate) fn new_file(name: impl Into<String>) -> Self {
        Self::new(
            name,
            NodeKind::File {
                content: Mutex::new(Vec::new()),
            },
        )
    }

    pub(crate) fn new_directory(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Directory)
    }

    pub(crate) fn new_symlink(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            NodeKind::Symlink {
                target: target.into(),
            },
        )
    }

    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        FileNode {
            name: Mutex::new(name.into()),
            kind,
            modified: SystemTime::now(),
            transfer_error: Mutex::new(None),
        }
    }

    pub(crate) fn name(&self) -> String {
        self.name.lock().unwrap().clone()
    }

    pub(crate) fn set_name(&self, name: String) {
        *self.name.lock().unwrap() = name;
    }

    pub(crate) fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    pub(crate) fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub(crate) fn symlink_target(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Symlink { target } => Some(target),
            _ => None,
        }
    }

    /// Content length in bytes; zero for directories and symlinks.
    pub(crate) fn len(&self) -> u64 {
        match &self.kind {
            NodeKind::File { content } => content.lock().unwrap().len() as u64,
            _ => 0,
        }
    }

    /// Read into `buf` starting at `offset`.
    ///
    /// Fails with `EndOfFile` when `offset` is at or past the end of the
    /// file; a short count means the end was reached.
    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        let content = match &self.kind {
            NodeKind::File { content } => content.lock().unwrap(),
            _ => return Err(FsError::InvalidOperation),
        };
        if offset >= content.len() as u64 {
            return Err(FsError::EndOfFile);
        }
        let start = offset as usize;
        let n = buf.len().min(content.len() - start);
        buf[..n].copy_from_slice(&content[start..start + n]);
        Ok(n)
    }

    /// Write `data` at `offset`, growing the file zero-filled as needed.
    /// Writes never shrink the file.
    ///
    /// A range that cannot be addressed in memory fails with
    /// `InvalidArgument`.
    pub(crate) fn write_at(&self, data: &[u8], offset: u64) -> FsResult<usize> {
        let mut content = match &self.kind {
            NodeKind::File { content } => content.lock().unwrap(),
            _ => return Err(FsError::InvalidOperation),
        };
        let start = usize::try_from(offset).map_err(|_| FsError::InvalidArgument)?;
        let end = match start.checked_add(data.len()) {
            Some(end) if end <= MAX_CONTENT_LEN => end,
            _ => return Err(FsError::InvalidArgument),
        };
        if end > content.len() {
            content.resize(end, 0);
        }
        content[start..end].copy_from_slice(data);
        Ok(data.len())
    }

    /// Shrink or zero-extend the file to exactly `size` bytes. Sizes
    /// beyond addressable memory fail with `InvalidArgument`.
    pub(crate) fn truncate(&self, size: u64) -> FsResult<()> {
        let mut content = match &self.kind {
            NodeKind::File { content } => content.lock().unwrap(),
            _ => return Err(FsError::InvalidOperation),
        };
        let size = match usize::try_from(size) {
            Ok(size) if size <= MAX_CONTENT_LEN => size,
            _ => return Err(FsError::InvalidArgument),
        };
        content.resize(size, 0);
        Ok(())
    }

    /// Record the outcome of a failed transfer for later diagnostics.
    pub(crate) fn record_transfer_error(&self, error: FsError) {
        *self.transfer_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn last_transfer_error(&self) -> Option<FsError> {
        self.transfer_error.lock().unwrap().clone()
    }

    /// Metadata snapshot of this node.
    pub(crate) fn info(&self) -> NodeInfo {
        let name = self.name();
        NodeInfo {
            name: base_name(&name).to_string(),
            mode: self.mode(),
            len: self.len(),
            modified: self.modified,
        }
    }

    fn mode(&self) -> u32 {
        match &self.kind {
            NodeKind::File { .. } => libc::S_IFREG as u32 | 0o644,
            NodeKind::Directory => libc::S_IFDIR as u32 | 0o755,
            NodeKind::Symlink { .. } => libc::S_IFLNK as u32 | 0o777,
        }
    }
}

/// Metadata snapshot for a node, as returned by listings and stats.
#[derive(Clone, Debug)]
pub struct NodeInfo {
    /// Display name: the final segment of the node's recorded path.
    pub name: String,
    /// Unix type and permission bits.
    pub mode: u32,
    /// Content length in bytes.
    pub len: u64,
    /// Creation time; writes do not update it.
    pub modified: SystemTime,
}

impl NodeInfo {
    pub fn is_dir(&self) -> bool {
        self.mode & libc::S_IFMT as u32 == libc::S_IFDIR as u32
    }

    pub fn is_symlink(&self) -> bool {
        self.mode & libc::S_IFMT as u32 == libc::S_IFLNK as u32
    }
}

/// Final segment of a slash-separated path. The root's name is "/".
pub(crate) fn base_name(path: &str) -> &str {
    if path == "/" {
        return "/";
    }
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}
