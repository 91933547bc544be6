// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Conversion between 16-bit words and bytes on the wire
//!
//! Every value exchanged with the controller is a 16-bit word, sent most
//! significant byte first. A request is a sequence of blocks of words, that
//! are concatenated on the wire: a simple command is a single block made of
//! opcode and parameters, while a compound command such as a polygon is made
//! of a header block, the X coordinates, the Y coordinates and a trailing
//! colour block.

use heapless::Vec;

use crate::Error;

/// Maximal number of vertices in a polygon or polyline
pub const MAX_VERTICES: usize = 64;

/// Encode a request made of blocks of words
///
/// Words are emitted in order, each one as two bytes, most significant first.
pub fn encode<'a>(blocks: &'a [&'a [u16]]) -> impl Iterator<Item = u8> + 'a {
    blocks
        .iter()
        .flat_map(|block| block.iter())
        .flat_map(|word| word.to_be_bytes())
}

/// Decode a single word
#[must_use]
pub const fn decode_word(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

/// Decode a byte sequence into words
///
/// A trailing odd byte is ignored.
pub fn decode_words(bytes: &[u8]) -> impl Iterator<Item = u16> + '_ {
    bytes
        .chunks_exact(2)
        .map(|pair| decode_word([pair[0], pair[1]]))
}

/// Count the words in a request
#[must_use]
pub fn word_count(blocks: &[&[u16]]) -> usize {
    blocks.iter().map(|block| block.len()).sum()
}

/// A point on screen
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Point {
    /// Horizontal coordinate
    pub x: u16,

    /// Vertical coordinate
    pub y: u16,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl From<(u16, u16)> for Point {
    fn from((x, y): (u16, u16)) -> Self {
        Self::new(x, y)
    }
}

/// Vertices of a polygon or polyline, in the layout used on the wire
///
/// The controller expects all X coordinates first, then all Y coordinates.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Vertices {
    /// Horizontal coordinates
    xs: Vec<u16, MAX_VERTICES>,

    /// Vertical coordinates
    ys: Vec<u16, MAX_VERTICES>,
}

impl Vertices {
    /// Create an empty list of vertices
    #[must_use]
    pub const fn new() -> Self {
        Self {
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }

    /// Collect vertices from a list of points
    ///
    /// # Errors
    ///
    /// Returns an error if there are more than [`MAX_VERTICES`] points
    pub fn from_points<P>(points: impl IntoIterator<Item = P>) -> Result<Self, Error>
    where
        P: Into<Point>,
    {
        let mut vertices = Self::new();
        for point in points {
            vertices.push(point.into())?;
        }
        Ok(vertices)
    }

    /// Append a vertex
    ///
    /// # Errors
    ///
    /// Returns an error if the list is already full
    pub fn push(&mut self, point: Point) -> Result<(), Error> {
        if self.xs.is_full() {
            return Err(Error::TooManyVertices);
        }
        self.xs.push(point.x).map_err(|_| Error::TooManyVertices)?;
        self.ys.push(point.y).map_err(|_| Error::TooManyVertices)?;
        Ok(())
    }

    /// Number of vertices
    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Check if there are no vertices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Horizontal coordinates
    #[must_use]
    pub fn xs(&self) -> &[u16] {
        &self.xs
    }

    /// Vertical coordinates
    #[must_use]
    pub fn ys(&self) -> &[u16] {
        &self.ys
    }
}
