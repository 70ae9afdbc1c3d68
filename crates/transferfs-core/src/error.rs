// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the transfer filesystem core

/// Core filesystem error type.
///
/// Cloneable and comparable: handlers store and replay these (fault
/// injection, per-node transfer diagnostics), and nothing in the core
/// performs real I/O.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum FsError {
    #[error("not found")]
    NotFound,
    #[error("invalid operation")]
    InvalidOperation,
    #[error("not a directory")]
    NotADirectory,
    #[error("already exists")]
    AlreadyExists,
    #[error("directory is not empty")]
    DirectoryNotEmpty,
    #[error("hard link not allowed for directory")]
    HardLinkToDirectory,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("end of file")]
    EndOfFile,
    #[error("too many levels of symbolic links")]
    SymlinkLoop,
    #[error("injected failure: {0}")]
    Injected(String),
}

pub type FsResult<T> = Result<T, FsError>;
