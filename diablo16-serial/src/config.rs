// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Run-time configuration

use crate::AckMode;
use crate::TimeoutPolicy;

/// Default number of attempts when writing a media sector
pub const SECTOR_WRITE_ATTEMPTS: u8 = 10;

/// Configuration of a display
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Timeout for acknowledgments
    pub ack_timeout: TimeoutPolicy,

    /// Timeout for each response word
    pub response_timeout: TimeoutPolicy,

    /// How drawing commands wait for their acknowledgment
    ///
    /// Commands returning a value always block.
    pub draw_mode: AckMode,

    /// Number of attempts when writing a media sector
    pub sector_write_attempts: u8,
}

impl Config {
    /// Create the default configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ack_timeout: TimeoutPolicy::ACK,
            response_timeout: TimeoutPolicy::RESPONSE,
            draw_mode: AckMode::Deferred,
            sector_write_attempts: SECTOR_WRITE_ATTEMPTS,
        }
    }

    /// Set timeout for acknowledgments
    #[must_use]
    pub const fn with_ack_timeout(self, ack_timeout: TimeoutPolicy) -> Self {
        Self {
            ack_timeout,
            ..self
        }
    }

    /// Set timeout for response words
    #[must_use]
    pub const fn with_response_timeout(self, response_timeout: TimeoutPolicy) -> Self {
        Self {
            response_timeout,
            ..self
        }
    }

    /// Set how drawing commands wait for their acknowledgment
    #[must_use]
    pub const fn with_draw_mode(self, draw_mode: AckMode) -> Self {
        Self { draw_mode, ..self }
    }

    /// Set number of attempts when writing a media sector
    #[must_use]
    pub const fn with_sector_write_attempts(self, sector_write_attempts: u8) -> Self {
        Self {
            sector_write_attempts,
            ..self
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
