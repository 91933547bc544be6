// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Display
//!
//! Drawing commands follow [`Config::draw_mode`], and by default do not wait
//! for their acknowledgment, which is collected before the next command.
//! Commands returning a value always wait.

use log::debug;
use log::error;

use crate::command;
use crate::command::SECTOR_SIZE;
use crate::command::SECTOR_WORDS;
use crate::AckMode;
use crate::Clock;
use crate::Color;
use crate::Command;
use crate::Config;
use crate::Dispatcher;
use crate::Error;
use crate::Point;
use crate::Response;
use crate::Serial;
use crate::Vertices;

/// Orientation of the screen
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScreenMode {
    /// Landscape
    Landscape = 0,

    /// Landscape, upside down
    LandscapeReverse = 1,

    /// Portrait
    Portrait = 2,

    /// Portrait, upside down
    PortraitReverse = 3,
}

impl TryFrom<u16> for ScreenMode {
    type Error = u16;

    fn try_from(word: u16) -> Result<Self, Self::Error> {
        match word {
            0 => Ok(Self::Landscape),
            1 => Ok(Self::LandscapeReverse),
            2 => Ok(Self::Portrait),
            3 => Ok(Self::PortraitReverse),
            _ => Err(word),
        }
    }
}

/// A Diablo16 display on a serial link
pub struct Display<SERIAL, CLOCK> {
    /// Command dispatcher
    dispatcher: Dispatcher<SERIAL, CLOCK>,
}

impl<SERIAL, CLOCK> Display<SERIAL, CLOCK>
where
    SERIAL: Serial,
    CLOCK: Clock,
{
    /// Create a new display with default configuration
    #[must_use]
    pub fn new(serial: SERIAL, clock: CLOCK) -> Self {
        Self::with_config(serial, clock, Config::default())
    }

    /// Create a new display
    #[must_use]
    pub fn with_config(serial: SERIAL, clock: CLOCK, config: Config) -> Self {
        Self {
            dispatcher: Dispatcher::new(serial, clock, config),
        }
    }

    /// Release display and return the serial link and the clock
    pub fn release(self) -> (SERIAL, CLOCK) {
        debug!("Release display");
        self.dispatcher.release()
    }

    /// Return the underlying dispatcher
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher<SERIAL, CLOCK> {
        &self.dispatcher
    }

    /// Return the underlying dispatcher, to send arbitrary commands
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<SERIAL, CLOCK> {
        &mut self.dispatcher
    }

    /// Failure of the last command, if any
    #[must_use]
    pub fn last_error(&self) -> Option<Error> {
        self.dispatcher.last_error()
    }

    /// Clear screen with the background color
    ///
    /// Also resets transparency, outline color, opacity, pen, line pattern,
    /// text margins and magnification, and origin.
    pub fn clear(&mut self) {
        self.draw(&command::CLEAR, &[]);
    }

    /// Draw a circle
    pub fn draw_circle(&mut self, center: Point, radius: u16, color: Color) {
        let parameters = [center.x, center.y, radius, color.raw()];
        self.draw(&command::DRAW_CIRCLE, &parameters);
    }

    /// Draw a filled circle
    pub fn draw_circle_filled(&mut self, center: Point, radius: u16, color: Color) {
        let parameters = [center.x, center.y, radius, color.raw()];
        self.draw(&command::DRAW_CIRCLE_FILLED, &parameters);
    }

    /// Draw a line
    pub fn draw_line(&mut self, start: Point, end: Point, color: Color) {
        let parameters = [start.x, start.y, end.x, end.y, color.raw()];
        self.draw(&command::DRAW_LINE, &parameters);
    }

    /// Draw a rectangle
    pub fn draw_rectangle(&mut self, top_left: Point, bottom_right: Point, color: Color) {
        let parameters = [
            top_left.x,
            top_left.y,
            bottom_right.x,
            bottom_right.y,
            color.raw(),
        ];
        self.draw(&command::DRAW_RECTANGLE, &parameters);
    }

    /// Draw a filled rectangle
    ///
    /// The outline is drawn with the outline color, unless it is black.
    pub fn draw_rectangle_filled(&mut self, top_left: Point, bottom_right: Point, color: Color) {
        let parameters = [
            top_left.x,
            top_left.y,
            bottom_right.x,
            bottom_right.y,
            color.raw(),
        ];
        self.draw(&command::DRAW_RECTANGLE_FILLED, &parameters);
    }

    /// Draw lines between consecutive vertices
    ///
    /// Nothing is drawn with fewer than two vertices.
    pub fn draw_polyline(&mut self, vertices: &Vertices, color: Color) {
        self.draw_poly(&command::DRAW_POLYLINE, vertices, color);
    }

    /// Draw a closed polygon
    ///
    /// Nothing is drawn with fewer than three vertices.
    pub fn draw_polygon(&mut self, vertices: &Vertices, color: Color) {
        self.draw_poly(&command::DRAW_POLYGON, vertices, color);
    }

    /// Draw a filled polygon
    ///
    /// Nothing is drawn with fewer than three vertices.
    pub fn draw_polygon_filled(&mut self, vertices: &Vertices, color: Color) {
        self.draw_poly(&command::DRAW_POLYGON_FILLED, vertices, color);
    }

    /// Draw a triangle
    pub fn draw_triangle(&mut self, first: Point, second: Point, third: Point, color: Color) {
        let parameters = [
            first.x,
            first.y,
            second.x,
            second.y,
            third.x,
            third.y,
            color.raw(),
        ];
        self.draw(&command::DRAW_TRIANGLE, &parameters);
    }

    /// Draw a filled triangle
    pub fn draw_triangle_filled(&mut self, first: Point, second: Point, third: Point, color: Color) {
        let parameters = [
            first.x,
            first.y,
            second.x,
            second.y,
            third.x,
            third.y,
            color.raw(),
        ];
        self.draw(&command::DRAW_TRIANGLE_FILLED, &parameters);
    }

    /// Move the origin used by graphics and text commands
    pub fn move_origin(&mut self, origin: Point) {
        self.draw(&command::MOVE_ORIGIN, &[origin.x, origin.y]);
    }

    /// Set outline color of rectangles and circles, returning the previous one
    pub fn outline_color(&mut self, color: Color) -> Color {
        self.query(&command::OUTLINE_COLOR, &[color.raw()]).into()
    }

    /// Set contrast (0 to 15), returning the previous one
    pub fn contrast(&mut self, contrast: u16) -> u16 {
        self.query(&command::CONTRAST, &[contrast])
    }

    /// Set line pattern, returning the previous one
    ///
    /// Every bit set in the pattern turns a pixel off, zero draws solid lines.
    pub fn line_pattern(&mut self, pattern: u16) -> u16 {
        self.query(&command::LINE_PATTERN, &[pattern])
    }

    /// Set screen orientation, returning the previous one
    ///
    /// Returns `None` if the previous orientation is not recognized.
    pub fn screen_mode(&mut self, mode: ScreenMode) -> Option<ScreenMode> {
        let previous = self.query(&command::SCREEN_MODE, &[mode as u16]);
        ScreenMode::try_from(previous).ok()
    }

    /// Turn transparency on or off, returning the previous setting
    ///
    /// Transparency is turned off after the next image or video command.
    pub fn transparency(&mut self, enabled: bool) -> bool {
        self.query(&command::TRANSPARENCY, &[u16::from(enabled)])
    }

    /// Set the color made transparent, returning the previous one
    pub fn transparent_color(&mut self, color: Color) -> Color {
        self.query(&command::TRANSPARENT_COLOR, &[color.raw()])
            .into()
    }

    /// Set a graphics parameter, returning the previous value
    ///
    /// For instance function 18 sets the object color.
    pub fn set_graphics_parameters(&mut self, function: u16, value: u16) -> u16 {
        self.query(&command::SET_GRAPHICS_PARAMETERS, &[function, value])
    }

    /// Initialize the media card, returning whether it succeeded
    pub fn media_init(&mut self) -> bool {
        debug!("Initialize media");
        let initialized = self.query(&command::MEDIA_INIT, &[]);
        debug!("Initialize media / Done");
        initialized
    }

    /// Set the media address pointer to a byte address
    pub fn media_set_byte(&mut self, address: u32) {
        self.draw(&command::MEDIA_SET_BYTE, &split_address(address));
    }

    /// Set the media address pointer to a sector address
    pub fn media_set_sector(&mut self, address: u32) {
        self.draw(&command::MEDIA_SET_SECTOR, &split_address(address));
    }

    /// Display the raw image at the media address pointer
    ///
    /// Images partially off screen may not be displayed correctly.
    pub fn media_image_raw(&mut self, top_left: Point) {
        self.draw(&command::MEDIA_IMAGE_RAW, &[top_left.x, top_left.y]);
    }

    /// Read the sector at the media address pointer
    ///
    /// # Errors
    ///
    /// Returns an error if the response does not arrive or the card reports a
    /// failure
    pub fn media_read_sector(&mut self) -> Result<[u8; SECTOR_SIZE], Error> {
        debug!("Read sector");
        let response = self.query(&command::MEDIA_READ_SECTOR, &[]);
        if let Some(error) = self.dispatcher.last_error() {
            return Err(error);
        }

        let Some((&status, words)) = response.split_first() else {
            return Err(Error::MediaFailure);
        };
        if status == 0 {
            error!("Media reported failure reading sector");
            return Err(Error::MediaFailure);
        }

        let mut sector = [0; SECTOR_SIZE];
        for (bytes, word) in sector.chunks_exact_mut(2).zip(words) {
            bytes.copy_from_slice(&word.to_be_bytes());
        }
        debug!("Read sector / Done");

        Ok(sector)
    }

    /// Write a sector at the media address pointer
    ///
    /// The command is repeated until the card reports success, up to
    /// [`Config::sector_write_attempts`] times.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt failed
    pub fn media_write_sector(&mut self, sector: &[u8; SECTOR_SIZE]) -> Result<(), Error> {
        debug!("Write sector");
        let mut words = [0; SECTOR_WORDS];
        for (word, bytes) in words.iter_mut().zip(sector.chunks_exact(2)) {
            *word = u16::from_be_bytes([bytes[0], bytes[1]]);
        }

        let command = &command::MEDIA_WRITE_SECTOR;
        let opcode = [command.opcode];
        let attempts = self.dispatcher.config().sector_write_attempts;
        self.dispatcher.invoke_with_retry(
            command.name,
            command.level,
            &[opcode.as_slice(), words.as_slice()],
            attempts,
            |status: &u16| *status != 0,
        )?;
        debug!("Write sector / Done");

        Ok(())
    }

    /// Send a drawing command
    fn draw(&mut self, command: &Command<()>, parameters: &[u16]) {
        let mode = self.dispatcher.config().draw_mode;
        self.dispatcher.execute(command, parameters, mode);
    }

    /// Send a command returning a value
    fn query<R>(&mut self, command: &Command<R>, parameters: &[u16]) -> R
    where
        R: Response,
    {
        self.dispatcher
            .execute(command, parameters, AckMode::Blocking)
    }

    /// Send a polygon or polyline command
    fn draw_poly(&mut self, command: &Command<()>, vertices: &Vertices, color: Color) {
        let mode = self.dispatcher.config().draw_mode;
        self.dispatcher
            .execute_vertices(command, vertices, color, mode);
    }
}

/// Split a 32-bit address in high and low words
#[allow(clippy::cast_possible_truncation)]
const fn split_address(address: u32) -> [u16; 2] {
    [(address >> 16) as u16, (address & 0xFFFF) as u16]
}
