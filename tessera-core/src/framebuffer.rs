//! RGB565 framebuffer
//!
//! A borrowed, row-major pixel buffer in the panel's physical orientation.
//! The buffer itself lives wherever the board puts it (external SDRAM on
//! the reference board) and must outlive the display.

use crate::error::Error;

/// Row-major RGB565 framebuffer in physical coordinates
pub struct Framebuffer<'a> {
    pixels: &'a mut [u16],
    width: u16,
    height: u16,
}

impl<'a> Framebuffer<'a> {
    /// Wrap a pixel buffer of at least `width * height` entries
    pub fn new(pixels: &'a mut [u16], width: u16, height: u16) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParameter);
        }
        if pixels.len() < width as usize * height as usize {
            return Err(Error::FramebufferTooSmall);
        }
        Ok(Self { pixels, width, height })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of pixels in the backing buffer
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Start address of the pixel data, as handed to the scan-out layer
    pub fn address(&self) -> usize {
        self.pixels.as_ptr() as usize
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Read a physical pixel
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<u16> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write a physical pixel; returns false if out of bounds
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, color: u16) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn pixels(&self) -> &[u16] {
        self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u16] {
        self.pixels
    }
}
