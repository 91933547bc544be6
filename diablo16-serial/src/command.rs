// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Commands
//!
//! Section numbers refer to the Diablo16 serial command set manual.

use core::marker::PhantomData;

use log::Level;

use crate::Error;

/// A command in the catalogue
///
/// `R` is the shape of the response, see [`Response`](crate::Response).
#[derive(Debug)]
pub struct Command<R> {
    /// Name used in logs
    pub name: &'static str,

    /// Opcode, first word on the wire
    pub opcode: u16,

    /// Parameter words following the opcode
    pub arity: Arity,

    /// Level for latency logs
    pub level: Level,

    /// Response shape
    response: PhantomData<fn() -> R>,
}

impl<R> Command<R> {
    /// Create a new command
    #[must_use]
    pub const fn new(name: &'static str, opcode: u16, arity: Arity, level: Level) -> Self {
        Self {
            name,
            opcode,
            arity,
            level,
            response: PhantomData,
        }
    }
}

/// Shape of the parameters of a command
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    /// A fixed number of words
    Fixed(usize),

    /// Vertex count, X coordinates, Y coordinates and colour
    Vertices {
        /// Least number of vertices accepted by the controller
        minimum: usize,
    },
}

impl Arity {
    /// Check parameters against this arity
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters would not form a valid frame
    pub fn check(self, parameters: &[u16]) -> Result<(), Error> {
        match self {
            Self::Fixed(expected) => check_length(parameters, expected),
            Self::Vertices { .. } => {
                let count = parameters.first().map_or(0, |&count| usize::from(count));
                check_length(parameters, vertex_words(count))?;
                self.check_vertices(count)
            }
        }
    }

    /// Check a number of vertices against this arity
    ///
    /// # Errors
    ///
    /// Returns an error if the command does not take vertices, or needs more
    /// of them
    pub fn check_vertices(self, count: usize) -> Result<(), Error> {
        match self {
            Self::Fixed(expected) => Err(Error::InvalidArity {
                expected,
                actual: vertex_words(count),
            }),
            Self::Vertices { minimum } if count < minimum => Err(Error::TooFewVertices {
                minimum,
                actual: count,
            }),
            Self::Vertices { .. } => Ok(()),
        }
    }
}

/// Check the number of parameter words
fn check_length(parameters: &[u16], expected: usize) -> Result<(), Error> {
    if parameters.len() == expected {
        Ok(())
    } else {
        Err(Error::InvalidArity {
            expected,
            actual: parameters.len(),
        })
    }
}

/// Number of parameter words of a vertex list
const fn vertex_words(count: usize) -> usize {
    2 * count + 2
}

/// Clear screen (5.2.1)
pub const CLEAR: Command<()> = Command::new("clear", 0xFF82, Arity::Fixed(0), Level::Trace);

/// Draw circle (5.2.3)
pub const DRAW_CIRCLE: Command<()> =
    Command::new("draw_circle", 0xFF78, Arity::Fixed(4), Level::Trace);

/// Draw filled circle (5.2.4)
pub const DRAW_CIRCLE_FILLED: Command<()> =
    Command::new("draw_circle_filled", 0xFF77, Arity::Fixed(4), Level::Trace);

/// Draw line (5.2.5)
pub const DRAW_LINE: Command<()> = Command::new("draw_line", 0xFF7D, Arity::Fixed(5), Level::Trace);

/// Draw rectangle (5.2.6)
pub const DRAW_RECTANGLE: Command<()> =
    Command::new("draw_rectangle", 0xFF7A, Arity::Fixed(5), Level::Trace);

/// Draw filled rectangle (5.2.7)
pub const DRAW_RECTANGLE_FILLED: Command<()> =
    Command::new("draw_rectangle_filled", 0xFF79, Arity::Fixed(5), Level::Trace);

/// Draw polyline (5.2.8)
///
/// Variable length: vertex count, X coordinates, Y coordinates, colour.
pub const DRAW_POLYLINE: Command<()> =
    Command::new("draw_polyline", 0x0015, Arity::Vertices { minimum: 2 }, Level::Trace);

/// Draw polygon (5.2.9)
///
/// Variable length: vertex count, X coordinates, Y coordinates, colour.
pub const DRAW_POLYGON: Command<()> =
    Command::new("draw_polygon", 0x0013, Arity::Vertices { minimum: 3 }, Level::Trace);

/// Draw filled polygon (5.2.10)
///
/// Variable length: vertex count, X coordinates, Y coordinates, colour.
pub const DRAW_POLYGON_FILLED: Command<()> =
    Command::new("draw_polygon_filled", 0x0014, Arity::Vertices { minimum: 3 }, Level::Trace);

/// Draw triangle (5.2.11)
pub const DRAW_TRIANGLE: Command<()> =
    Command::new("draw_triangle", 0xFF74, Arity::Fixed(7), Level::Trace);

/// Draw filled triangle (5.2.12)
pub const DRAW_TRIANGLE_FILLED: Command<()> =
    Command::new("draw_triangle_filled", 0xFF59, Arity::Fixed(7), Level::Trace);

/// Move origin (5.2.16)
pub const MOVE_ORIGIN: Command<()> =
    Command::new("move_origin", 0xFF81, Arity::Fixed(2), Level::Trace);

/// Outline colour, returns the previous setting (5.2.30)
pub const OUTLINE_COLOR: Command<u16> =
    Command::new("outline_color", 0xFF41, Arity::Fixed(1), Level::Info);

/// Contrast, returns the previous setting (5.2.31)
pub const CONTRAST: Command<u16> = Command::new("contrast", 0xFF40, Arity::Fixed(1), Level::Info);

/// Line pattern, returns the previous setting (5.2.33)
pub const LINE_PATTERN: Command<u16> =
    Command::new("line_pattern", 0xFF3F, Arity::Fixed(1), Level::Info);

/// Screen mode, returns the previous setting (5.2.34)
pub const SCREEN_MODE: Command<u16> =
    Command::new("screen_mode", 0xFF42, Arity::Fixed(1), Level::Info);

/// Transparency, returns the previous setting (5.2.35)
pub const TRANSPARENCY: Command<bool> =
    Command::new("transparency", 0xFF44, Arity::Fixed(1), Level::Info);

/// Transparent colour, returns the previous setting (5.2.36)
pub const TRANSPARENT_COLOR: Command<u16> =
    Command::new("transparent_color", 0xFF45, Arity::Fixed(1), Level::Info);

/// Set graphics parameters, returns the previous setting (5.2.37)
pub const SET_GRAPHICS_PARAMETERS: Command<u16> =
    Command::new("set_graphics_parameters", 0xFF83, Arity::Fixed(2), Level::Info);

/// Initialize media card, returns whether it succeeded (5.3.1)
pub const MEDIA_INIT: Command<bool> =
    Command::new("media_init", 0xFF25, Arity::Fixed(0), Level::Info);

/// Set byte address of media (5.3.2)
pub const MEDIA_SET_BYTE: Command<()> =
    Command::new("media_set_byte", 0xFF2F, Arity::Fixed(2), Level::Trace);

/// Set sector address of media (5.3.3)
pub const MEDIA_SET_SECTOR: Command<()> =
    Command::new("media_set_sector", 0xFF2E, Arity::Fixed(2), Level::Trace);

/// Display raw image from media (5.3.11)
pub const MEDIA_IMAGE_RAW: Command<()> =
    Command::new("media_image_raw", 0xFF27, Arity::Fixed(2), Level::Trace);

/// Read sector, returns status and the sector words
pub const MEDIA_READ_SECTOR: Command<[u16; SECTOR_WORDS + 1]> =
    Command::new("media_read_sector", 0x0016, Arity::Fixed(0), Level::Debug);

/// Write sector, returns a non-zero status on success
pub const MEDIA_WRITE_SECTOR: Command<u16> =
    Command::new("media_write_sector", 0x0017, Arity::Fixed(SECTOR_WORDS), Level::Debug);

/// Size of a media sector in bytes
pub const SECTOR_SIZE: usize = 512;

/// Size of a media sector in words
pub const SECTOR_WORDS: usize = SECTOR_SIZE / 2;
