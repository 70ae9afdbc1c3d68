// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory virtual filesystem backing transfer request handlers
//!
//! The namespace is a flat map from absolute slash-separated paths to
//! shared nodes. The map's mutex is the structural lock: every operation
//! that reads or mutates the namespace holds it for its whole body, so
//! multi-entry updates (rename cascades, emptiness checks) are atomic to
//! concurrent observers. Containment is derived from keys; directory nodes
//! hold no child lists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use transferfs_proto::{Method, Request};

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::fault::FaultInjector;
use crate::handle::{Listing, ReadHandle, WriteHandle};
use crate::node::FileNode;

type Entries = HashMap<String, Arc<FileNode>>;

/// In-memory filesystem serving transfer requests.
///
/// The root directory is permanent: it is not stored in the entry map and
/// no operation can remove or replace it.
pub struct MemFs {
    config: FsConfig,
    root: Arc<FileNode>,
    entries: Mutex<Entries>,
    faults: FaultInjector,
}

impl Default for MemFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemFs {
    /// Create an empty filesystem with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FsConfig::default())
    }

    pub fn with_config(config: FsConfig) -> Self {
        MemFs {
            config,
            root: Arc::new(FileNode::new_directory("/")),
            entries: Mutex::new(HashMap::new()),
            faults: FaultInjector::new(),
        }
    }

    /// Fault injection controls, primarily for tests.
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Open `filepath` for reading, following symlinks.
    pub fn open_read(&self, request: &Request) -> FsResult<ReadHandle> {
        self.faults.check()?;
        let entries = self.entries.lock().unwrap();
        let node = self.resolve(&entries, &request.filepath)?;
        if !node.is_file() {
            return Err(FsError::InvalidOperation);
        }
        Ok(ReadHandle::new(node))
    }

    /// Open `filepath` for writing, creating an empty file if nothing is
    /// stored there.
    ///
    /// Lookups here do not follow symlinks: creation happens at the
    /// literal path, and write-opening an existing symlink or directory is
    /// refused. The parent of a created file must exist and be a
    /// directory.
    pub fn open_write(&self, request: &Request) -> FsResult<WriteHandle> {
        self.faults.check()?;
        let mut entries = self.entries.lock().unwrap();
        let node = match self.lookup(&entries, &request.filepath) {
            Ok(node) => node,
            Err(FsError::NotFound) => {
                let parent = self.lookup(&entries, parent_of(&request.filepath))?;
                if !parent.is_dir() {
                    return Err(FsError::InvalidOperation);
                }
                let node = Arc::new(FileNode::new_file(request.filepath.clone()));
                entries.insert(request.filepath.clone(), node.clone());
                tracing::debug!("created file {}", request.filepath);
                node
            }
            Err(err) => return Err(err),
        };
        if !node.is_file() {
            return Err(FsError::InvalidOperation);
        }
        Ok(WriteHandle::new(node, self.config.write_delay_per_byte))
    }

    /// Serve `List`, `Stat` and `Readlink` requests, following symlinks.
    ///
    /// `List` requires a directory and returns its children ordered by
    /// key; `Stat` and `Readlink` return a single-entry listing describing
    /// the resolved node.
    pub fn list(&self, request: &Request) -> FsResult<Listing> {
        self.faults.check()?;
        let entries = self.entries.lock().unwrap();
        let node = self.resolve(&entries, &request.filepath)?;
        match request.method {
            Method::List => {
                if !node.is_dir() {
                    return Err(FsError::NotADirectory);
                }
                let mut children: Vec<(&String, &Arc<FileNode>)> = entries
                    .iter()
                    .filter(|(key, _)| parent_of(key) == request.filepath)
                    .collect();
                children.sort_by(|a, b| a.0.cmp(b.0));
                Ok(Listing::new(
                    children.into_iter().map(|(_, child)| child.info()).collect(),
                ))
            }
            Method::Stat | Method::Readlink => Ok(Listing::new(vec![node.info()])),
            _ => Err(FsError::InvalidArgument),
        }
    }

    /// Stat without following symlinks: a symlink reports itself.
    pub fn lstat(&self, request: &Request) -> FsResult<Listing> {
        self.faults.check()?;
        let entries = self.entries.lock().unwrap();
        let node = self.lookup(&entries, &request.filepath)?;
        Ok(Listing::new(vec![node.info()]))
    }

    /// Serve a structural command: `Setstat`, `Rename`, `Rmdir`, `Remove`,
    /// `Mkdir`, `Link` or `Symlink`. Any other method is refused.
    pub fn run_command(&self, request: &Request) -> FsResult<()> {
        self.faults.check()?;
        let mut entries = self.entries.lock().unwrap();
        match request.method {
            Method::Setstat => self.setstat(&entries, request),
            Method::Rename => self.rename(&mut entries, request),
            Method::Rmdir | Method::Remove => self.remove(&mut entries, request),
            Method::Mkdir => self.mkdir(&mut entries, request),
            Method::Link => self.link(&mut entries, request),
            Method::Symlink => self.symlink(&mut entries, request),
            _ => Err(FsError::InvalidArgument),
        }
    }

    fn setstat(&self, entries: &Entries, request: &Request) -> FsResult<()> {
        let node = self.resolve(entries, &request.filepath)?;
        if let Some(size) = request.attributes.size {
            tracing::debug!("truncating {} to {} bytes", request.filepath, size);
            node.truncate(size)?;
        }
        Ok(())
    }

    /// Move the resolved node to `target`, carrying every descendant key
    /// along when the node is a directory. The source key is removed even
    /// when it was a symlink to the node being moved.
    fn rename(&self, entries: &mut Entries, request: &Request) -> FsResult<()> {
        let target = match request.target() {
            Some(target) => target.to_string(),
            None => return Err(FsError::InvalidArgument),
        };
        let node = self.resolve(entries, &request.filepath)?;
        // The permanent root is not movable, even when the source is a
        // symlink resolving to it
        if Arc::ptr_eq(&node, &self.root) {
            return Err(FsError::InvalidArgument);
        }
        if target == "/" || entries.contains_key(&target) {
            return Err(FsError::AlreadyExists);
        }

        entries.remove(&request.filepath);
        let descendants: Vec<String> = if node.is_dir() {
            let prefix = format!("{}/", request.filepath);
            entries.keys().filter(|key| key.starts_with(&prefix)).cloned().collect()
        } else {
            Vec::new()
        };
        node.set_name(target.clone());
        entries.insert(target.clone(), node);
        for old_key in descendants {
            if let Some(child) = entries.remove(&old_key) {
                let new_key = format!("{}{}", target, &old_key[request.filepath.len()..]);
                child.set_name(new_key.clone());
                entries.insert(new_key, child);
            }
        }
        tracing::debug!("renamed {} to {}", request.filepath, target);
        Ok(())
    }

    /// Shared by `Rmdir` and `Remove`. The parent must resolve; removing a
    /// path that holds no entry is a no-op, which also keeps the root
    /// unremovable ("/" is never a key).
    fn remove(&self, entries: &mut Entries, request: &Request) -> FsResult<()> {
        let parent = self.resolve(entries, parent_of(&request.filepath))?;
        if parent.is_dir() {
            let prefix = format!("{}/", request.filepath);
            if entries.keys().any(|key| key.starts_with(&prefix)) {
                return Err(FsError::DirectoryNotEmpty);
            }
        }
        if entries.remove(&request.filepath).is_some() {
            tracing::debug!("removed {}", request.filepath);
        }
        Ok(())
    }

    /// Create a directory at `filepath`. The parent only needs to
    /// resolve; an existing entry at the path is silently replaced.
    fn mkdir(&self, entries: &mut Entries, request: &Request) -> FsResult<()> {
        self.resolve(entries, parent_of(&request.filepath))?;
        if request.filepath == "/" {
            return Err(FsError::AlreadyExists);
        }
        let node = Arc::new(FileNode::new_directory(request.filepath.clone()));
        entries.insert(request.filepath.clone(), node);
        tracing::debug!("created directory {}", request.filepath);
        Ok(())
    }

    /// Alias `target` to the node `filepath` resolves to. Both keys share
    /// one node afterwards; the node lives until its last key (or open
    /// handle) goes away.
    fn link(&self, entries: &mut Entries, request: &Request) -> FsResult<()> {
        let target = match request.target() {
            Some(target) => target.to_string(),
            None => return Err(FsError::InvalidArgument),
        };
        let node = self.resolve(entries, &request.filepath)?;
        if node.is_dir() {
            return Err(FsError::HardLinkToDirectory);
        }
        if target == "/" {
            return Err(FsError::AlreadyExists);
        }
        entries.insert(target.clone(), node);
        tracing::debug!("linked {} as {}", request.filepath, target);
        Ok(())
    }

    /// Create a symlink node at `target` pointing back at `filepath`,
    /// which must resolve. An existing entry at `target` is silently
    /// replaced.
    fn symlink(&self, entries: &mut Entries, request: &Request) -> FsResult<()> {
        let target = match request.target() {
            Some(target) => target.to_string(),
            None => return Err(FsError::InvalidArgument),
        };
        self.resolve(entries, &request.filepath)?;
        if target == "/" {
            return Err(FsError::AlreadyExists);
        }
        let node = Arc::new(FileNode::new_symlink(target.clone(), request.filepath.clone()));
        entries.insert(target.clone(), node);
        tracing::debug!("symlinked {} -> {}", target, request.filepath);
        Ok(())
    }

    /// Non-following lookup: the entry stored at `path`, or the root.
    fn lookup(&self, entries: &Entries, path: &str) -> FsResult<Arc<FileNode>> {
        if path == "/" {
            return Ok(self.root.clone());
        }
        entries.get(path).cloned().ok_or(FsError::NotFound)
    }

    /// Following lookup: chases symlink targets up to the configured hop
    /// bound before giving up.
    fn resolve(&self, entries: &Entries, path: &str) -> FsResult<Arc<FileNode>> {
        let mut node = self.lookup(entries, path)?;
        let mut hops = 0;
        loop {
            let target = match node.symlink_target() {
                Some(target) => target.to_string(),
                None => return Ok(node),
            };
            if hops >= self.config.max_symlink_hops {
                return Err(FsError::SymlinkLoop);
            }
            hops += 1;
            node = self.lookup(entries, &target)?;
        }
    }
}

/// Directory part of a slash-separated path: everything before the final
/// slash. The parent of "/" is "/"; a path without a slash has no parent
/// (the empty string never resolves).
pub(crate) fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => "",
    }
}
