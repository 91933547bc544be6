// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Scripted serial link used in tests
//!
//! The link is both the serial port and the clock. Every call to
//! [`Clock::now`] advances time by one millisecond, and scripted replies
//! become readable once their arrival time is reached.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embassy_time::Instant;

use crate::codec::decode_words;
use crate::Clock;
use crate::Serial;

/// Shared state of the link
#[derive(Default)]
struct Wire {
    /// Current time
    now_ms: u64,

    /// Bytes sent by the controller, with their arrival time
    incoming: VecDeque<(u64, u8)>,

    /// Bytes sent to the controller, with the number of bytes consumed
    /// before each was written
    written: Vec<(u8, usize)>,

    /// Number of bytes consumed
    reads: usize,
}

/// A scripted serial link and clock
#[derive(Clone, Default)]
pub struct FakeLink(Rc<RefCell<Wire>>);

impl FakeLink {
    /// Create an idle link
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule bytes to arrive at the given time
    pub fn reply_at(&self, at_ms: u64, bytes: &[u8]) {
        let mut wire = self.0.borrow_mut();
        wire.incoming.extend(bytes.iter().map(|byte| (at_ms, *byte)));
    }

    /// Schedule bytes to arrive now
    pub fn reply(&self, bytes: &[u8]) {
        let now = self.now_ms();
        self.reply_at(now, bytes);
    }

    /// Current time
    pub fn now_ms(&self) -> u64 {
        self.0.borrow().now_ms
    }

    /// Number of scripted bytes not yet consumed
    pub fn pending_replies(&self) -> usize {
        self.0.borrow().incoming.len()
    }

    /// Number of bytes consumed
    pub fn reads(&self) -> usize {
        self.0.borrow().reads
    }

    /// Words written so far
    pub fn written_words(&self) -> Vec<u16> {
        let bytes: Vec<u8> = self.0.borrow().written.iter().map(|&(byte, _)| byte).collect();
        decode_words(&bytes).collect()
    }

    /// Number of bytes consumed before a word was written
    pub fn reads_before_word(&self, index: usize) -> usize {
        self.0.borrow().written[2 * index].1
    }
}

impl Serial for FakeLink {
    fn write(&mut self, byte: u8) {
        let mut wire = self.0.borrow_mut();
        let reads = wire.reads;
        wire.written.push((byte, reads));
    }

    fn read(&mut self) -> Option<u8> {
        let mut wire = self.0.borrow_mut();
        let now = wire.now_ms;
        let arrived = matches!(wire.incoming.front(), Some(&(at_ms, _)) if at_ms <= now);
        if !arrived {
            return None;
        }

        let (_, byte) = wire.incoming.pop_front()?;
        wire.reads += 1;
        Some(byte)
    }

    fn available(&mut self) -> usize {
        let wire = self.0.borrow();
        wire.incoming
            .iter()
            .take_while(|&&(at_ms, _)| at_ms <= wire.now_ms)
            .count()
    }
}

impl Clock for FakeLink {
    fn now(&self) -> Instant {
        let mut wire = self.0.borrow_mut();
        let now = wire.now_ms;
        wire.now_ms += 1;
        Instant::from_millis(now)
    }
}
