// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Byte stream and clock underneath the protocol
//!
//! The protocol only needs a handful of primitives from the serial port:
//! write one byte, read one byte if there is any, and count how many bytes
//! are waiting. It never blocks below this layer, so every wait above it is a
//! busy poll bounded by a [`Clock`].

use embassy_time::Instant;

/// A half-duplex byte stream
pub trait Serial {
    /// Write a single byte
    fn write(&mut self, byte: u8);

    /// Read a single byte, if one is available
    fn read(&mut self) -> Option<u8>;

    /// Number of bytes that can be read without waiting
    fn available(&mut self) -> usize;

    /// Push any buffered output to the wire
    fn flush(&mut self) {}
}

impl<T: Serial + ?Sized> Serial for &mut T {
    fn write(&mut self, byte: u8) {
        T::write(self, byte);
    }

    fn read(&mut self) -> Option<u8> {
        T::read(self)
    }

    fn available(&mut self) -> usize {
        T::available(self)
    }

    fn flush(&mut self) {
        T::flush(self);
    }
}

/// A monotonic clock
pub trait Clock {
    /// Return the current instant
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        T::now(self)
    }
}

/// A clock backed by the Embassy time driver
#[cfg(feature = "time-driver")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "time-driver")]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(feature = "embedded-io")]
pub use self::io::IoSerial;

#[cfg(feature = "embedded-io")]
mod io {
    //! Adapter for `embedded-io` serial ports

    use log::error;
    use log::trace;

    use embedded_io::Error as _;
    use embedded_io::Read;
    use embedded_io::ReadReady;
    use embedded_io::Write;

    use heapless::Deque;

    use super::Serial;

    /// Size of the lookahead buffer
    const LOOKAHEAD: usize = 64;

    /// A [`Serial`] on top of an `embedded-io` port
    ///
    /// `embedded-io` can only tell whether *some* bytes are ready, while the
    /// protocol needs to know *how many*. Ready bytes are therefore moved into
    /// a small lookahead buffer, and counted there.
    pub struct IoSerial<PORT> {
        /// Serial port
        port: PORT,

        /// Bytes read from the port but not yet consumed
        lookahead: Deque<u8, LOOKAHEAD>,
    }

    impl<PORT> IoSerial<PORT>
    where
        PORT: Read + Write + ReadReady,
    {
        /// Wrap a serial port
        #[must_use]
        pub fn new(port: PORT) -> Self {
            Self {
                port,
                lookahead: Deque::new(),
            }
        }

        /// Release the serial port
        ///
        /// Any byte still in the lookahead buffer is lost.
        pub fn release(self) -> PORT {
            if !self.lookahead.is_empty() {
                trace!("Discard {} buffered bytes", self.lookahead.len());
            }
            self.port
        }

        /// Move every ready byte from the port to the lookahead buffer
        fn fill(&mut self) {
            while !self.lookahead.is_full() {
                match self.port.read_ready() {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(error) => {
                        error!("Cannot poll serial port: {:?}", error.kind());
                        break;
                    }
                }

                let mut byte = [0_u8; 1];
                match self.port.read(&mut byte) {
                    Ok(1) => {
                        if self.lookahead.push_back(byte[0]).is_err() {
                            break;
                        }
                    }
                    Ok(_) => break,
                    Err(error) => {
                        error!("Cannot read from serial port: {:?}", error.kind());
                        break;
                    }
                }
            }
        }
    }

    impl<PORT> Serial for IoSerial<PORT>
    where
        PORT: Read + Write + ReadReady,
    {
        fn write(&mut self, byte: u8) {
            if let Err(error) = self.port.write_all(&[byte]) {
                error!("Cannot write to serial port: {:?}", error.kind());
            }
        }

        fn read(&mut self) -> Option<u8> {
            if self.lookahead.is_empty() {
                self.fill();
            }
            self.lookahead.pop_front()
        }

        fn available(&mut self) -> usize {
            self.fill();
            self.lookahead.len()
        }

        fn flush(&mut self) {
            if let Err(error) = self.port.flush() {
                error!("Cannot flush serial port: {:?}", error.kind());
            }
        }
    }

}
