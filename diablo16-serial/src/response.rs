// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Shapes of command responses

use crate::poll::SENTINEL;

/// A response to a command
///
/// The shape of a response is fixed by the command, and decides how many
/// words follow the acknowledgment on the wire.
pub trait Response: Sized {
    /// Number of words in the response
    const WORDS: usize;

    /// Value returned when the response could not be read
    fn zero() -> Self;

    /// Decode a response from a source of words
    ///
    /// Returns `None` as soon as a word equals [`SENTINEL`], without reading
    /// further.
    fn decode(read_word: impl FnMut() -> u16) -> Option<Self>;
}

/// No response beyond the acknowledgment
impl Response for () {
    const WORDS: usize = 0;

    fn zero() -> Self {}

    fn decode(_read_word: impl FnMut() -> u16) -> Option<Self> {
        Some(())
    }
}

/// A single word
impl Response for u16 {
    const WORDS: usize = 1;

    fn zero() -> Self {
        0
    }

    fn decode(mut read_word: impl FnMut() -> u16) -> Option<Self> {
        let word = read_word();
        (word != SENTINEL).then_some(word)
    }
}

/// A flag, true when the word equals 1
impl Response for bool {
    const WORDS: usize = 1;

    fn zero() -> Self {
        false
    }

    fn decode(read_word: impl FnMut() -> u16) -> Option<Self> {
        u16::decode(read_word).map(|word| word == 1)
    }
}

/// A fixed number of words
impl<const N: usize> Response for [u16; N] {
    const WORDS: usize = N;

    fn zero() -> Self {
        [0; N]
    }

    fn decode(mut read_word: impl FnMut() -> u16) -> Option<Self> {
        let mut words = [0; N];
        for word in &mut words {
            *word = u16::decode(&mut read_word)?;
        }
        Some(words)
    }
}
