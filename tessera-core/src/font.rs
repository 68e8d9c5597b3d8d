//! Glyph sources for text rendering
//!
//! Text is drawn from fixed-size monochrome glyphs looked up by nominal
//! size (the glyph height). Two sources are supported:
//!
//! - [`RawFont`]: packed bitmap tables, one glyph per printable ASCII
//!   character starting at `' '`, rows MSB-first
//! - any `embedded_graphics` [`MonoFont`]
//!
//! Fonts are static resources; the renderer only borrows them.

use embedded_graphics::image::GetPixel;
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{OriginDimensions, Point};
use heapless::Vec;

use crate::error::Error;

/// Most fonts a [`FontSet`] can hold
pub const MAX_FONTS: usize = 8;

/// Widest glyph a source may report
pub const MAX_GLYPH_WIDTH: u16 = 32;

/// A fixed-size monochrome glyph table
pub trait GlyphSource {
    /// Glyph cell (width, height) in pixels
    fn glyph_size(&self) -> (u16, u16);

    /// One glyph row as a bit mask, leftmost pixel in bit `width - 1`
    ///
    /// Characters without a glyph render as the source's fallback glyph.
    fn row_bits(&self, c: char, row: u16) -> u32;

    /// Nominal size used to select this font
    fn size(&self) -> u16 {
        self.glyph_size().1
    }
}

/// Packed bitmap font covering printable ASCII
///
/// Each glyph row is `ceil(width / 8)` bytes, most significant bit first.
/// Glyphs are stored consecutively starting at `' '`.
#[derive(Debug, Clone, Copy)]
pub struct RawFont {
    width: u16,
    height: u16,
    data: &'static [u8],
}

impl RawFont {
    const FIRST: u32 = ' ' as u32;
    const LAST: u32 = '~' as u32;

    /// Wrap a glyph table; fails if it cannot hold every printable glyph
    pub const fn new(width: u16, height: u16, data: &'static [u8]) -> Result<Self, Error> {
        if width == 0 || width > MAX_GLYPH_WIDTH || height == 0 {
            return Err(Error::InvalidParameter);
        }
        let font = Self { width, height, data };
        let glyphs = (Self::LAST - Self::FIRST + 1) as usize;
        if data.len() < glyphs * font.glyph_bytes() {
            return Err(Error::InvalidParameter);
        }
        Ok(font)
    }

    const fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    const fn glyph_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

impl GlyphSource for RawFont {
    fn glyph_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn row_bits(&self, c: char, row: u16) -> u32 {
        if row >= self.height {
            return 0;
        }
        let code = c as u32;
        let index = if (Self::FIRST..=Self::LAST).contains(&code) {
            code - Self::FIRST
        } else {
            0
        };

        let row_bytes = self.row_bytes();
        let start = index as usize * self.glyph_bytes() + row as usize * row_bytes;
        let Some(bytes) = self.data.get(start..start + row_bytes) else {
            return 0;
        };

        let packed = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
        packed >> (row_bytes * 8 - self.width as usize)
    }
}

impl GlyphSource for MonoFont<'_> {
    fn glyph_size(&self) -> (u16, u16) {
        (
            self.character_size.width.min(MAX_GLYPH_WIDTH as u32) as u16,
            self.character_size.height as u16,
        )
    }

    fn row_bits(&self, c: char, row: u16) -> u32 {
        let cell = self.character_size;
        if cell.width == 0 || row as u32 >= cell.height {
            return 0;
        }
        let per_row = self.image.size().width / cell.width;
        if per_row == 0 {
            return 0;
        }

        let index = self.glyph_mapping.index(c) as u32;
        let origin = Point::new(
            ((index % per_row) * cell.width) as i32,
            ((index / per_row) * cell.height + row as u32) as i32,
        );

        let (width, _) = self.glyph_size();
        (0..width as i32).fold(0u32, |bits, col| {
            let on = self.image.pixel(origin + Point::new(col, 0)) == Some(BinaryColor::On);
            (bits << 1) | on as u32
        })
    }
}

/// Fonts available to the text renderer, keyed by nominal size
#[derive(Default)]
pub struct FontSet<'a> {
    fonts: Vec<&'a dyn GlyphSource, MAX_FONTS>,
}

impl<'a> FontSet<'a> {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Register a font; on duplicate sizes the first registered wins
    pub fn add(&mut self, font: &'a dyn GlyphSource) -> Result<(), Error> {
        self.fonts.push(font).map_err(|_| Error::InvalidParameter)
    }

    /// Builder form of [`FontSet::add`]
    pub fn with(mut self, font: &'a dyn GlyphSource) -> Result<Self, Error> {
        self.add(font)?;
        Ok(self)
    }

    /// Font for a nominal size
    pub fn get(&self, size: u16) -> Result<&'a dyn GlyphSource, Error> {
        self.fonts
            .iter()
            .find(|f| f.size() == size)
            .copied()
            .ok_or(Error::InvalidParameter)
    }

    /// Nominal sizes available
    pub fn sizes(&self) -> impl Iterator<Item = u16> + '_ {
        self.fonts.iter().map(|f| f.size())
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

static ASCII_FONTS: [&MonoFont<'static>; 3] = [
    &embedded_graphics::mono_font::ascii::FONT_6X12,
    &embedded_graphics::mono_font::ascii::FONT_8X13,
    &embedded_graphics::mono_font::ascii::FONT_10X20,
];

impl FontSet<'static> {
    /// The stock ASCII set: sizes 12, 13 and 20
    pub fn ascii() -> Self {
        let mut set = Self::new();
        for font in ASCII_FONTS {
            // Fewer than MAX_FONTS, cannot fail
            let _ = set.add(font);
        }
        set
    }
}
