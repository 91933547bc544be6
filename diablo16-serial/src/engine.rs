// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Command dispatch with deferred acknowledgments
//!
//! The controller acknowledges every command with a single byte. Waiting for
//! it right after sending a command wastes the time the caller spends
//! preparing the next one, so by default the wait is deferred: the
//! acknowledgment of a command is collected right before the next command is
//! sent.
//!
//! Deferring complicates recovery. When an acknowledgment is still pending,
//! the response words of the command cannot be read, because they would be
//! mixed up with the acknowledgment byte. They are instead owed, and drained
//! before the next command is sent.

use log::debug;
use log::error;
use log::log;
use log::log_enabled;
use log::trace;
use log::warn;
use log::Level;
use log::Level::Trace;

use embassy_time::Instant;

use crate::codec::encode;
use crate::codec::word_count;
use crate::poll::read_word;
use crate::poll::wait_for_ack;
use crate::poll::SENTINEL;
use crate::Clock;
use crate::Color;
use crate::Command;
use crate::Config;
use crate::Error;
use crate::Response;
use crate::Serial;
use crate::Vertices;

/// When to wait for the acknowledgment of a command
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AckMode {
    /// Wait right after sending the command
    Blocking,

    /// Wait right before sending the next command
    Deferred,
}

/// Obligation left by the previous command
///
/// There is never more than one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Obligation {
    /// Nothing outstanding
    Idle,

    /// The acknowledgment was not consumed yet
    AwaitingAck {
        /// Name of the command
        command: &'static str,

        /// Response words to discard after the acknowledgment
        owed_words: usize,
    },

    /// The acknowledgment was consumed, but some response words were not
    Draining {
        /// Name of the command
        command: &'static str,

        /// Response words left to discard
        owed_words: usize,
    },
}

/// Dispatcher of commands over a serial link
pub struct Dispatcher<SERIAL, CLOCK> {
    /// Serial link
    serial: SERIAL,

    /// Clock
    clock: CLOCK,

    /// Configuration
    config: Config,

    /// Obligation left by the previous command
    obligation: Obligation,

    /// Name of the last command sent
    previous_command: Option<&'static str>,

    /// Failure of the last invocation
    last_error: Option<Error>,
}

impl<SERIAL, CLOCK> Dispatcher<SERIAL, CLOCK>
where
    SERIAL: Serial,
    CLOCK: Clock,
{
    /// Create a new dispatcher
    #[must_use]
    pub fn new(serial: SERIAL, clock: CLOCK, config: Config) -> Self {
        Self {
            serial,
            clock,
            config,
            obligation: Obligation::Idle,
            previous_command: None,
            last_error: None,
        }
    }

    /// Release the serial link and the clock
    ///
    /// An acknowledgment or response still owed is abandoned.
    pub fn release(self) -> (SERIAL, CLOCK) {
        if self.obligation != Obligation::Idle {
            warn!("Releasing with an outstanding {:?}", self.obligation);
        }
        (self.serial, self.clock)
    }

    /// Return the configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if the acknowledgment of the last command was not consumed
    #[must_use]
    pub fn pending_ack(&self) -> bool {
        matches!(self.obligation, Obligation::AwaitingAck { .. })
    }

    /// Number of response words owed by a previous command
    #[must_use]
    pub fn outstanding_response_words(&self) -> usize {
        match self.obligation {
            Obligation::Idle => 0,
            Obligation::AwaitingAck { owed_words, .. } | Obligation::Draining { owed_words, .. } => {
                owed_words
            }
        }
    }

    /// Name of the last command sent
    #[must_use]
    pub fn previous_command(&self) -> Option<&'static str> {
        self.previous_command
    }

    /// Failure of the last invocation, if any
    ///
    /// Invocations return a zero response when they fail, which cannot be
    /// told apart from a legitimate zero. This reports what went wrong.
    #[must_use]
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// Execute a command from the catalogue
    ///
    /// Returns the zero response without sending anything if the parameters
    /// do not match the arity of the command.
    pub fn execute<R>(&mut self, command: &Command<R>, parameters: &[u16], mode: AckMode) -> R
    where
        R: Response,
    {
        if let Err(error) = command.arity.check(parameters) {
            self.reject(command.name, error);
            return R::zero();
        }

        let opcode = [command.opcode];
        self.invoke(command.name, command.level, mode, &[opcode.as_slice(), parameters])
    }

    /// Execute a polygon or polyline command from the catalogue
    ///
    /// Nothing is sent if the command does not take vertices, or needs more
    /// of them.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute_vertices(
        &mut self,
        command: &Command<()>,
        vertices: &Vertices,
        color: Color,
        mode: AckMode,
    ) {
        if let Err(error) = command.arity.check_vertices(vertices.len()) {
            self.reject(command.name, error);
            return;
        }

        let header = [command.opcode, vertices.len() as u16];
        let trailer = [color.raw()];
        let request: [&[u16]; 4] = [&header, vertices.xs(), vertices.ys(), &trailer];
        self.invoke::<()>(command.name, command.level, mode, &request);
    }

    /// Record a command rejected before sending
    fn reject(&mut self, name: &'static str, error: Error) {
        error!("Command {name} rejected: {error:?}");
        self.last_error = Some(error);
    }

    /// Invoke a command
    ///
    /// The request is sent after resolving whatever the previous command left
    /// outstanding. Failures are logged and yield the zero response; see
    /// [`Dispatcher::last_error`].
    pub fn invoke<R>(
        &mut self,
        name: &'static str,
        level: Level,
        mode: AckMode,
        request: &[&[u16]],
    ) -> R
    where
        R: Response,
    {
        trace!("Invoking: {name}");
        self.last_error = None;

        let mut start = self.clock.now();

        if self.pending_ack() {
            if let Err(error) = self.resolve_previous_ack() {
                self.last_error = Some(error);
                return R::zero();
            }
            start = self.clock.now();
        }

        if let Err(error) = self.drain() {
            self.last_error = Some(error);
            return R::zero();
        }

        self.transmit(name, request);

        self.obligation = Obligation::AwaitingAck {
            command: name,
            owed_words: 0,
        };
        if mode == AckMode::Blocking {
            trace!("Blocking for ACK");
            match wait_for_ack(&mut self.serial, &self.clock, self.config.ack_timeout) {
                Ok(()) => self.obligation = Obligation::Idle,
                Err(error) => {
                    warn!("Command {name} was not acknowledged, retrying before next command");
                    self.last_error = Some(error);
                }
            }
        }

        let response = if let Obligation::AwaitingAck {
            ref mut owed_words,
            ..
        } = self.obligation
        {
            *owed_words += R::WORDS;
            R::zero()
        } else {
            trace!("Getting response");
            self.read_response(name)
        };

        log!(
            level,
            "Latency {name}: {}ms",
            elapsed_millis(&self.clock, start)
        );

        response
    }

    /// Invoke a blocking command until its response is accepted
    ///
    /// No delay is inserted between attempts.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was accepted after `max_attempts`
    pub fn invoke_with_retry<R>(
        &mut self,
        name: &'static str,
        level: Level,
        request: &[&[u16]],
        max_attempts: u8,
        accept: impl Fn(&R) -> bool,
    ) -> Result<R, Error>
    where
        R: Response,
    {
        for attempt in 1..=max_attempts {
            let response = self.invoke(name, level, AckMode::Blocking, request);
            if accept(&response) {
                return Ok(response);
            }
            warn!("Command {name} failed, attempt {attempt} of {max_attempts}");
        }

        error!("Command {name} failed after {max_attempts} attempts");
        let error = Error::RetriesExhausted {
            attempts: max_attempts,
        };
        self.last_error = Some(error);
        Err(error)
    }

    /// Consume the acknowledgment of the previous command, if pending
    ///
    /// # Errors
    ///
    /// Returns an error if the acknowledgment does not arrive or is rejected.
    /// The acknowledgment stays pending.
    fn resolve_previous_ack(&mut self) -> Result<(), Error> {
        let Obligation::AwaitingAck {
            command,
            owed_words,
        } = self.obligation
        else {
            return Ok(());
        };

        let start = self.clock.now();
        if let Err(error) = wait_for_ack(&mut self.serial, &self.clock, self.config.ack_timeout) {
            error!("Previous command {command} was not acknowledged");
            return Err(error);
        }

        self.obligation = if owed_words > 0 {
            Obligation::Draining {
                command,
                owed_words,
            }
        } else {
            Obligation::Idle
        };
        trace!(
            "Previous command ack: {}ms",
            elapsed_millis(&self.clock, start)
        );

        Ok(())
    }

    /// Discard response words owed by a previous command
    ///
    /// # Errors
    ///
    /// Returns an error if a word does not arrive. The remaining words stay
    /// owed.
    fn drain(&mut self) -> Result<(), Error> {
        while let Obligation::Draining {
            command,
            owed_words,
        } = self.obligation
        {
            let word = read_word(&mut self.serial, &self.clock, self.config.response_timeout);
            if word == SENTINEL {
                error!("No response arrived for the previous command {command}");
                return Err(Error::DesyncDuringDrain);
            }

            trace!("Discarded word {word:#06x} owed by {command}");
            self.obligation = if owed_words > 1 {
                Obligation::Draining {
                    command,
                    owed_words: owed_words - 1,
                }
            } else {
                Obligation::Idle
            };
        }

        Ok(())
    }

    /// Write a request to the serial link
    fn transmit(&mut self, name: &'static str, request: &[&[u16]]) {
        if log_enabled!(Trace) {
            trace!("Writing request of {} words", word_count(request));
        }

        for byte in encode(request) {
            self.serial.write(byte);
        }
        self.serial.flush();

        self.previous_command = Some(name);
    }

    /// Read the response of the command just acknowledged
    ///
    /// When the response is cut short, its remaining words are owed.
    fn read_response<R>(&mut self, name: &'static str) -> R
    where
        R: Response,
    {
        let serial = &mut self.serial;
        let clock = &self.clock;
        let policy = self.config.response_timeout;

        let mut consumed = 0;
        let response = R::decode(|| {
            consumed += 1;
            read_word(serial, clock, policy)
        });
        if let Some(response) = response {
            return response;
        }

        debug!("Response was not received");
        self.last_error = Some(Error::ResponseTimeout);
        let owed_words = R::WORDS.saturating_sub(consumed);
        if owed_words > 0 {
            warn!("Command {name} left {owed_words} response words unread");
            self.obligation = Obligation::Draining {
                command: name,
                owed_words,
            };
        }
        R::zero()
    }
}

/// Milliseconds elapsed since an instant
fn elapsed_millis<CLOCK: Clock>(clock: &CLOCK, since: Instant) -> u64 {
    (clock.now() - since).as_millis()
}
