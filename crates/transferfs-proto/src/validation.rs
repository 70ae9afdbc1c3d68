// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Validation for decoded transfer requests

use thiserror::Error;

use crate::request::Request;

/// Validation error
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("filepath must not be empty")]
    EmptyFilepath,
    #[error("{0} must be an absolute path")]
    RelativePath(&'static str),
    #[error("method {0} requires a target path")]
    MissingTarget(crate::request::Method),
}

/// Validate a decoded request against its logical schema.
///
/// Dispatchers run this before handing a request to a backend; backends
/// still fail closed on malformed requests that slip through.
pub fn validate_request(request: &Request) -> Result<(), ValidationError> {
    if request.filepath.is_empty() {
        return Err(ValidationError::EmptyFilepath);
    }
    if !request.filepath.starts_with('/') {
        return Err(ValidationError::RelativePath("filepath"));
    }
    if request.method.requires_target() {
        match request.target() {
            None => return Err(ValidationError::MissingTarget(request.method)),
            Some(target) if !target.starts_with('/') => {
                return Err(ValidationError::RelativePath("target"));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
