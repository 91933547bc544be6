// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Interface to 4D Systems Diablo16 displays over a serial link
//!
//! Commands are sequences of big-endian 16-bit words. The display answers
//! each command with an acknowledgment byte, possibly followed by response
//! words. Waiting for the acknowledgment can be deferred until the next
//! command, so that it overlaps with whatever the caller does in between.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod codec;
pub use self::codec::Point;
pub use self::codec::Vertices;

mod color;
pub use self::color::Color;

pub mod command;
pub use self::command::Arity;
pub use self::command::Command;

mod config;
pub use self::config::Config;

mod display;
pub use self::display::Display;
pub use self::display::ScreenMode;

mod engine;
pub use self::engine::AckMode;
pub use self::engine::Dispatcher;

mod error;
pub use self::error::Error;

pub mod poll;
pub use self::poll::TimeoutPolicy;

mod response;
pub use self::response::Response;

mod transport;
pub use self::transport::Clock;
pub use self::transport::Serial;

#[cfg(feature = "embedded-io")]
pub use self::transport::IoSerial;

#[cfg(feature = "time-driver")]
pub use self::transport::SystemClock;

#[cfg(test)]
mod fake;
