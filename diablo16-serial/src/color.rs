// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! A 16-bit RGB565 color

#[cfg(feature = "embedded-graphics")]
use embedded_graphics_core::pixelcolor::raw::RawU16;
#[cfg(feature = "embedded-graphics")]
use embedded_graphics_core::pixelcolor::IntoStorage;
#[cfg(feature = "embedded-graphics")]
use embedded_graphics_core::pixelcolor::Rgb565;

/// A color as sent to the display
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Color(u16);

impl Color {
    /// Black
    pub const BLACK: Self = Self(0x0000);

    /// White
    pub const WHITE: Self = Self(0xFFFF);

    /// Red
    pub const RED: Self = Self(0xF800);

    /// Green
    pub const GREEN: Self = Self(0x07E0);

    /// Blue
    pub const BLUE: Self = Self(0x001F);

    /// Yellow
    pub const YELLOW: Self = Self(0xFFE0);

    /// Cyan
    pub const CYAN: Self = Self(0x07FF);

    /// Magenta
    pub const MAGENTA: Self = Self(0xF81F);

    /// Create a color from its raw word
    #[must_use]
    pub const fn from_raw(word: u16) -> Self {
        Self(word)
    }

    /// Create a color from 8-bit channels
    ///
    /// The least significant bits of each channel are dropped.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let red = ((red as u16) >> 3) << 11;
        let green = ((green as u16) >> 2) << 5;
        let blue = (blue as u16) >> 3;
        Self(red | green | blue)
    }

    /// Get the raw word
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl From<u16> for Color {
    fn from(word: u16) -> Self {
        Self(word)
    }
}

impl From<Color> for u16 {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[cfg(feature = "embedded-graphics")]
impl From<Rgb565> for Color {
    fn from(color: Rgb565) -> Self {
        Self(color.into_storage())
    }
}

#[cfg(feature = "embedded-graphics")]
impl From<Color> for Rgb565 {
    fn from(color: Color) -> Self {
        RawU16::new(color.0).into()
    }
}
