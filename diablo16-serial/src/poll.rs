// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Bounded polling for acknowledgments and response words

use log::error;
use log::trace;
use log::warn;

use embassy_time::Duration;

use crate::codec::decode_word;
use crate::Clock;
use crate::Error;
use crate::Serial;

/// Byte sent by the controller when a command succeeded
pub const ACK: u8 = 0x06;

/// Word returned in place of a response that never arrived
pub const SENTINEL: u16 = 0xDEAD;

/// A two-tier timeout
///
/// Every time the soft interval elapses while waiting, a warning is logged
/// and the soft interval restarts. The hard interval is measured from the
/// start of the wait, and gives up waiting when it elapses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeoutPolicy {
    /// Interval after which a warning is logged
    pub soft: Duration,

    /// Interval after which the wait is aborted
    pub hard: Duration,
}

impl TimeoutPolicy {
    /// Default policy for acknowledgments
    pub const ACK: Self = Self::new(Duration::from_millis(100), Duration::from_millis(4000));

    /// Default policy for response words
    pub const RESPONSE: Self = Self::new(Duration::from_millis(100), Duration::from_millis(1000));

    /// Create a new policy
    #[must_use]
    pub const fn new(soft: Duration, hard: Duration) -> Self {
        Self { soft, hard }
    }
}

/// Busy-wait until `ready` returns true or the hard deadline passes
///
/// Returns whether `ready` was satisfied.
fn wait_until<S, C>(
    serial: &mut S,
    clock: &C,
    policy: TimeoutPolicy,
    what: &str,
    mut ready: impl FnMut(&mut S) -> bool,
) -> bool
where
    S: Serial,
    C: Clock,
{
    let start = clock.now();
    let give_up = start + policy.hard;
    let mut warn_at = start + policy.soft;

    loop {
        if ready(serial) {
            return true;
        }

        let now = clock.now();
        if now >= give_up {
            return false;
        }
        if now >= warn_at {
            warn!(
                "Timing out waiting for {what} ({}ms elapsed)",
                (now - start).as_millis()
            );
            warn_at = now + policy.soft;
        }
    }
}

/// Wait for the acknowledgment of a command
///
/// # Errors
///
/// Returns an error if no byte arrives before the hard deadline, or if the
/// byte is not [`ACK`]
pub fn wait_for_ack<S, C>(serial: &mut S, clock: &C, policy: TimeoutPolicy) -> Result<(), Error>
where
    S: Serial,
    C: Clock,
{
    let mut received = None;
    wait_until(serial, clock, policy, "ACK", |serial| {
        if serial.available() > 0 {
            received = serial.read();
        }
        received.is_some()
    });

    match received {
        Some(ACK) => {
            trace!("Successful ack");
            Ok(())
        }
        Some(byte) => {
            error!("Failed ack: {byte:#04x}");
            Err(Error::AckRejected(byte))
        }
        None => {
            error!("Failed ack: nothing received in {}ms", policy.hard.as_millis());
            Err(Error::AckTimeout)
        }
    }
}

/// Read a single response word
///
/// Returns [`SENTINEL`] if two bytes do not arrive before the hard deadline.
pub fn read_word<S, C>(serial: &mut S, clock: &C, policy: TimeoutPolicy) -> u16
where
    S: Serial,
    C: Clock,
{
    let arrived = wait_until(serial, clock, policy, "response", |serial| {
        serial.available() >= 2
    });
    if !arrived {
        error!("No response in {}ms", policy.hard.as_millis());
        return SENTINEL;
    }

    match (serial.read(), serial.read()) {
        (Some(high), Some(low)) => decode_word([high, low]),
        _ => SENTINEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fake::FakeLink;

    #[test]
    fn accepts_ack_byte() {
        let link = FakeLink::new();
        link.reply_at(20, &[ACK]);

        let mut serial = link.clone();
        assert_eq!(wait_for_ack(&mut serial, &link, TimeoutPolicy::ACK), Ok(()));
        assert!(link.now_ms() < 100);
    }

    #[test]
    fn rejects_other_bytes() {
        let link = FakeLink::new();
        link.reply(&[0x15]);

        let mut serial = link.clone();
        assert_eq!(
            wait_for_ack(&mut serial, &link, TimeoutPolicy::ACK),
            Err(Error::AckRejected(0x15))
        );
    }

    #[test]
    fn keeps_waiting_past_soft_interval() {
        let link = FakeLink::new();
        link.reply_at(350, &[ACK]);

        let mut serial = link.clone();
        assert_eq!(wait_for_ack(&mut serial, &link, TimeoutPolicy::ACK), Ok(()));
        assert!(link.now_ms() >= 350);
    }

    #[test]
    fn gives_up_at_hard_deadline() {
        let link = FakeLink::new();
        link.reply_at(5000, &[ACK]);

        let mut serial = link.clone();
        assert_eq!(
            wait_for_ack(&mut serial, &link, TimeoutPolicy::ACK),
            Err(Error::AckTimeout)
        );
        assert!(link.now_ms() >= 4000);
        assert!(link.now_ms() < 5000);
        assert_eq!(link.pending_replies(), 1);
    }

    #[test]
    fn reads_big_endian_word() {
        let link = FakeLink::new();
        link.reply_at(10, &[0x12]);
        link.reply_at(30, &[0x34]);

        let mut serial = link.clone();
        assert_eq!(read_word(&mut serial, &link, TimeoutPolicy::RESPONSE), 0x1234);
    }

    #[test]
    fn returns_sentinel_on_timeout() {
        let link = FakeLink::new();
        link.reply(&[0x12]);

        let mut serial = link.clone();
        assert_eq!(
            read_word(&mut serial, &link, TimeoutPolicy::RESPONSE),
            SENTINEL
        );
        assert_eq!(link.pending_replies(), 1);
    }
}
