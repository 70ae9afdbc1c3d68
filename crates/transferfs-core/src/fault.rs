// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fault injection runtime controller for MemFs

use std::sync::Mutex;

use crate::error::{FsError, FsResult};

/// Runtime controller holding at most one pending synthetic failure.
///
/// While armed, every handler entry point returns a clone of the pending
/// error before touching any filesystem state. The error stays armed until
/// `clear` is called.
pub struct FaultInjector {
    pending: Mutex<Option<FsError>>,
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaultInjector {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    /// Arm the injector with the error all subsequent calls fail with.
    pub fn set(&self, error: FsError) {
        tracing::debug!("arming fault injector: {}", error);
        *self.pending.lock().unwrap() = Some(error);
    }

    /// Disarm the injector.
    pub fn clear(&self) {
        tracing::debug!("clearing fault injector");
        *self.pending.lock().unwrap() = None;
    }

    /// The currently armed error, if any.
    pub fn current(&self) -> Option<FsError> {
        self.pending.lock().unwrap().clone()
    }

    pub(crate) fn check(&self) -> FsResult<()> {
        match self.pending.lock().unwrap().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injector_starts_disarmed() {
        let injector = FaultInjector::new();
        assert!(injector.check().is_ok());
        assert_eq!(injector.current(), None);
    }

    #[test]
    fn armed_error_repeats_until_cleared() {
        let injector = FaultInjector::new();
        injector.set(FsError::Injected("synthetic".into()));

        // Stays armed across checks
        assert_eq!(injector.check(), Err(FsError::Injected("synthetic".into())));
        assert_eq!(injector.check(), Err(FsError::Injected("synthetic".into())));
        assert_eq!(injector.current(), Some(FsError::Injected("synthetic".into())));

        injector.clear();
        assert!(injector.check().is_ok());
    }

    #[test]
    fn any_error_kind_can_be_injected() {
        let injector = FaultInjector::new();
        injector.set(FsError::NotFound);
        assert_eq!(injector.check(), Err(FsError::NotFound));
    }
}
