// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! TransferFS Core: in-memory filesystem for file-transfer backends
//!
//! This crate provides an in-memory virtual filesystem that serves
//! decoded transfer requests (open, list, stat and structural commands),
//! with protocol adapters providing the wire glue. Intended for tests,
//! examples and harnesses that need filesystem-shaped behavior without
//! touching a real disk.

pub mod config;
pub mod error;
pub mod fault;
pub mod handle;
pub mod vfs;

mod node;

// Re-export key types for convenience
pub use config::FsConfig;
pub use error::{FsError, FsResult};
pub use fault::FaultInjector;
pub use handle::{Listing, ReadHandle, WriteHandle};
pub use node::NodeInfo;
pub use vfs::MemFs;
