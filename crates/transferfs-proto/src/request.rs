// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request types handed to transfer filesystem backends

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Methods a dispatcher can route to a backend.
///
/// `Get`, `Put` and `Open` reach the read/write-open entry points; `List`,
/// `Stat`, `Lstat` and `Readlink` reach the listing entry points; the rest
/// reach the command entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Get,
    Put,
    Open,
    Setstat,
    Rename,
    Rmdir,
    Remove,
    Mkdir,
    Link,
    Symlink,
    List,
    Stat,
    Lstat,
    Readlink,
}

impl Method {
    /// Methods that operate on a second path carried in `Request::target`.
    pub fn requires_target(&self) -> bool {
        matches!(self, Method::Rename | Method::Link | Method::Symlink)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "Get",
            Method::Put => "Put",
            Method::Open => "Open",
            Method::Setstat => "Setstat",
            Method::Rename => "Rename",
            Method::Rmdir => "Rmdir",
            Method::Remove => "Remove",
            Method::Mkdir => "Mkdir",
            Method::Link => "Link",
            Method::Symlink => "Symlink",
            Method::List => "List",
            Method::Stat => "Stat",
            Method::Lstat => "Lstat",
            Method::Readlink => "Readlink",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized method name
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Get" => Ok(Method::Get),
            "Put" => Ok(Method::Put),
            "Open" => Ok(Method::Open),
            "Setstat" => Ok(Method::Setstat),
            "Rename" => Ok(Method::Rename),
            "Rmdir" => Ok(Method::Rmdir),
            "Remove" => Ok(Method::Remove),
            "Mkdir" => Ok(Method::Mkdir),
            "Link" => Ok(Method::Link),
            "Symlink" => Ok(Method::Symlink),
            "List" => Ok(Method::List),
            "Stat" => Ok(Method::Stat),
            "Lstat" => Ok(Method::Lstat),
            "Readlink" => Ok(Method::Readlink),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// File attributes carried by `Setstat` and open requests.
///
/// Only `size` is acted on by the in-memory backend; the remaining fields
/// are accepted and ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAttributes {
    pub size: Option<u64>,
    pub permissions: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub atime: Option<i64>,
    pub mtime: Option<i64>,
}

impl FileAttributes {
    /// Attribute set carrying only a size, the usual truncate request.
    pub fn with_size(size: u64) -> Self {
        FileAttributes {
            size: Some(size),
            ..Default::default()
        }
    }
}

/// Cancellation signal shared between a dispatcher and an in-flight
/// request.
///
/// Backends accept the context but do not poll it mid-operation; a
/// dispatcher that cancels simply abandons the result.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that the caller no longer wants the result.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A single decoded request, as handed to a backend entry point.
///
/// Dispatchers clean paths before dispatch, so `filepath` and `target` are
/// absolute and free of trailing slashes by the time a backend sees them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,
    pub filepath: String,
    /// Secondary path for `Rename`, `Link` and `Symlink`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub attributes: FileAttributes,
    #[serde(skip)]
    pub context: RequestContext,
}

// Constructors, one per method family
impl Request {
    pub fn new(method: Method, filepath: impl Into<String>) -> Self {
        Request {
            method,
            filepath: filepath.into(),
            target: None,
            attributes: FileAttributes::default(),
            context: RequestContext::new(),
        }
    }

    /// Read-open request.
    pub fn get(filepath: impl Into<String>) -> Self {
        Self::new(Method::Get, filepath)
    }

    /// Write-open request.
    pub fn put(filepath: impl Into<String>) -> Self {
        Self::new(Method::Put, filepath)
    }

    /// Read/write-open request.
    pub fn open(filepath: impl Into<String>) -> Self {
        Self::new(Method::Open, filepath)
    }

    pub fn setstat(filepath: impl Into<String>, attributes: FileAttributes) -> Self {
        Self::new(Method::Setstat, filepath).with_attributes(attributes)
    }

    pub fn rename(filepath: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(Method::Rename, filepath).with_target(target)
    }

    pub fn rmdir(filepath: impl Into<String>) -> Self {
        Self::new(Method::Rmdir, filepath)
    }

    pub fn remove(filepath: impl Into<String>) -> Self {
        Self::new(Method::Remove, filepath)
    }

    pub fn mkdir(filepath: impl Into<String>) -> Self {
        Self::new(Method::Mkdir, filepath)
    }

    /// Hard-link request: `target` becomes another name for `filepath`.
    pub fn link(filepath: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(Method::Link, filepath).with_target(target)
    }

    /// Symlink request: a link node at `target` pointing at `filepath`.
    pub fn symlink(filepath: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(Method::Symlink, filepath).with_target(target)
    }

    pub fn list(filepath: impl Into<String>) -> Self {
        Self::new(Method::List, filepath)
    }

    pub fn stat(filepath: impl Into<String>) -> Self {
        Self::new(Method::Stat, filepath)
    }

    pub fn lstat(filepath: impl Into<String>) -> Self {
        Self::new(Method::Lstat, filepath)
    }

    pub fn readlink(filepath: impl Into<String>) -> Self {
        Self::new(Method::Readlink, filepath)
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_attributes(mut self, attributes: FileAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Target path, if one was supplied.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}
