// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Exercise the display over an `embedded-io` port

#![cfg(feature = "embedded-io")]

use std::cell::Cell;
use std::collections::VecDeque;

use embassy_time::Duration;
use embassy_time::Instant;

use embedded_io::ErrorKind;
use embedded_io::ErrorType;
use embedded_io::Read;
use embedded_io::ReadReady;
use embedded_io::Write;

use diablo16_serial::command;
use diablo16_serial::AckMode;
use diablo16_serial::Clock;
use diablo16_serial::Color;
use diablo16_serial::Config;
use diablo16_serial::Display;
use diablo16_serial::Error;
use diablo16_serial::IoSerial;
use diablo16_serial::Point;
use diablo16_serial::TimeoutPolicy;
use diablo16_serial::Vertices;

/// Acknowledgment byte
const ACK: u8 = 0x06;

/// A port with scripted input and recorded output
#[derive(Default)]
struct ScriptedPort {
    /// Bytes to be read
    input: VecDeque<u8>,

    /// Bytes written
    output: Vec<u8>,
}

impl ScriptedPort {
    /// Create a port that will answer with the given bytes
    fn answering(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    /// Words written so far
    fn written_words(&self) -> Vec<u16> {
        self.output
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect()
    }
}

impl ErrorType for ScriptedPort {
    type Error = ErrorKind;
}

impl Read for ScriptedPort {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut count = 0;
        for slot in buf.iter_mut() {
            let Some(byte) = self.input.pop_front() else {
                break;
            };
            *slot = byte;
            count += 1;
        }
        Ok(count)
    }
}

impl ReadReady for ScriptedPort {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.input.is_empty())
    }
}

impl Write for ScriptedPort {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A clock advancing by one millisecond every time it is read
#[derive(Default)]
struct TickingClock {
    /// Current time
    now_ms: Cell<u64>,
}

impl Clock for TickingClock {
    fn now(&self) -> Instant {
        let now = self.now_ms.get();
        self.now_ms.set(now + 1);
        Instant::from_millis(now)
    }
}

/// Create a display answering with the given bytes
fn display(answers: &[u8]) -> Display<IoSerial<ScriptedPort>, TickingClock> {
    let _ = env_logger::builder().is_test(true).try_init();
    let policy = TimeoutPolicy::new(Duration::from_millis(10), Duration::from_millis(50));
    let config = Config::new()
        .with_ack_timeout(policy)
        .with_response_timeout(policy);
    let serial = IoSerial::new(ScriptedPort::answering(answers));
    Display::with_config(serial, TickingClock::default(), config)
}

#[test]
fn draws_a_scene() {
    let mut display = display(&[ACK, ACK, ACK, ACK, 0x00, 0x05]);

    display.clear();
    display.draw_circle(Point::new(64, 64), 20, Color::RED);
    let vertices = Vertices::from_points([
        Point::new(10, 10),
        Point::new(50, 10),
        Point::new(50, 50),
    ])
    .unwrap();
    display.draw_polygon(&vertices, Color::WHITE);
    let previous = display.contrast(7);

    assert_eq!(previous, 5);
    assert_eq!(display.last_error(), None);
    assert!(!display.dispatcher().pending_ack());

    let (serial, _clock) = display.release();
    let port = serial.release();
    assert!(port.input.is_empty());
    assert_eq!(
        port.written_words(),
        [
            0xFF82, // clear
            0xFF78, 64, 64, 20, 0xF800, // circle
            0x0013, 3, 10, 50, 50, 10, 10, 50, 0xFFFF, // polygon
            0xFF40, 7, // contrast
        ]
    );
}

#[test]
fn silent_display_stops_the_pipeline() {
    let mut display = display(&[]);

    display.clear();
    assert!(display.dispatcher().pending_ack());

    display.draw_line(Point::new(0, 0), Point::new(10, 10), Color::BLUE);
    assert_eq!(display.last_error(), Some(Error::AckTimeout));

    let (serial, _clock) = display.release();
    assert_eq!(serial.release().written_words(), [0xFF82]);
}

#[test]
fn deferred_query_is_drained_before_next_command() {
    let mut display = display(&[ACK, 0x00, 0x05, ACK, 0x00, 0x03]);

    let deferred = display
        .dispatcher_mut()
        .execute(&command::CONTRAST, &[3], AckMode::Deferred);
    assert_eq!(deferred, 0);
    assert_eq!(display.dispatcher().outstanding_response_words(), 1);

    assert_eq!(display.contrast(7), 3);
    assert_eq!(display.last_error(), None);
    assert_eq!(display.dispatcher().outstanding_response_words(), 0);
}
