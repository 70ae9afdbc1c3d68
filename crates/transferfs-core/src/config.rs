// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration types for the transfer filesystem core

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main filesystem configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FsConfig {
    /// Artificial delay charged per written byte, simulating transfer
    /// throughput. `None` disables the delay.
    pub write_delay_per_byte: Option<Duration>,
    /// Maximum symlink indirections followed during path resolution
    /// before the lookup fails.
    pub max_symlink_hops: u32,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            write_delay_per_byte: Some(Duration::from_micros(1)),
            max_symlink_hops: 40,
        }
    }
}
