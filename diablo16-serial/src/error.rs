// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Data structures and functions for error handling

/// An error
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// No acknowledgment byte arrived before the hard deadline
    AckTimeout,

    /// A byte arrived in place of the acknowledgment, but it was not `0x06`
    AckRejected(u8),

    /// The response word did not arrive before the hard deadline
    ResponseTimeout,

    /// The response owed by a previous command never arrived
    DesyncDuringDrain,

    /// A command was given the wrong number of parameters
    InvalidArity {
        /// Number of parameters declared by the command
        expected: usize,

        /// Number of parameters supplied
        actual: usize,
    },

    /// A polygon or polyline has more vertices than can be buffered
    TooManyVertices,

    /// A polygon or polyline has fewer vertices than the command needs
    TooFewVertices {
        /// Least number of vertices
        minimum: usize,

        /// Number of vertices supplied
        actual: usize,
    },

    /// Every attempt of a retried command failed
    RetriesExhausted {
        /// Number of attempts performed
        attempts: u8,
    },

    /// The media card reported a failure
    MediaFailure,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::AckTimeout => write!(f, "timed out waiting for acknowledgment"),
            Self::AckRejected(byte) => write!(f, "acknowledgment rejected with byte {byte:#04x}"),
            Self::ResponseTimeout => write!(f, "timed out waiting for response"),
            Self::DesyncDuringDrain => write!(f, "no response arrived for the previous command"),
            Self::InvalidArity { expected, actual } => {
                write!(f, "expected {expected} parameters, got {actual}")
            }
            Self::TooManyVertices => write!(f, "too many vertices"),
            Self::TooFewVertices { minimum, actual } => {
                write!(f, "expected at least {minimum} vertices, got {actual}")
            }
            Self::RetriesExhausted { attempts } => {
                write!(f, "command failed after {attempts} attempts")
            }
            Self::MediaFailure => write!(f, "media card failure"),
        }
    }
}
