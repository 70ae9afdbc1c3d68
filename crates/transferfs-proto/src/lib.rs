// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! TransferFS Protocol: request types and validation
//!
//! This crate defines the decoded request shape that dispatchers hand to
//! transfer filesystem backends, plus validation helpers applied before
//! dispatch.

pub mod request;
pub mod validation;

// Re-export key types
pub use request::{FileAttributes, Method, Request, RequestContext, UnknownMethod};
pub use validation::*;
