//! Drawing primitives
//!
//! Everything here takes logical coordinates in the current rotation.
//! Single pixels go straight into the framebuffer through the coordinate
//! transform; rectangle fills and buffer copies go through the blit engine.
//!
//! Lines and circles clip silently at the screen edge. Text is stricter: a
//! glyph that would not fit entirely on screen is not drawn at all.

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{Dimensions, OriginDimensions, Size};
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;
use tessera_hal::{Accelerator, Clock, LcdController};

use crate::blit::Region;
use crate::display::Display;
use crate::error::Error;
use crate::font::GlyphSource;

/// Longest field [`Display::draw_number`] renders (digits of `u32::MAX`)
pub const MAX_NUMBER_DIGITS: u8 = 10;

/// Leading-zero handling for [`Display::draw_number`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumberMode {
    /// Leading zeros render as blank cells
    #[default]
    NoZero,
    /// Leading zeros render as '0'
    Zero,
}

impl<L, A, C> Display<'_, L, A, C>
where
    L: LcdController,
    A: Accelerator,
    C: Clock,
{
    /// Write one logical pixel, ignoring anything off screen
    #[inline]
    pub(crate) fn put_pixel(&mut self, x: i32, y: i32, color: u16) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let (px, py) = self
            .rotation
            .to_physical(x as u16, y as u16, self.panel.width, self.panel.height);
        self.framebuffer.set(px, py, color);
    }

    fn check_bounds(&self, x: u16, y: u16) -> Result<(), Error> {
        if x < self.width && y < self.height {
            Ok(())
        } else {
            Err(Error::InvalidParameter)
        }
    }

    pub fn draw_point(&mut self, x: u16, y: u16, color: u16) -> Result<(), Error> {
        self.ensure_ready()?;
        self.check_bounds(x, y)?;
        self.put_pixel(x as i32, y as i32, color);
        Ok(())
    }

    pub fn read_point(&self, x: u16, y: u16) -> Result<u16, Error> {
        self.ensure_ready()?;
        self.check_bounds(x, y)?;
        let (px, py) = self
            .rotation
            .to_physical(x, y, self.panel.width, self.panel.height);
        self.framebuffer.get(px, py).ok_or(Error::InvalidParameter)
    }

    /// Bresenham line from `(x0, y0)` to `(x1, y1)`, both ends included
    pub fn draw_line(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: u16) -> Result<(), Error> {
        self.ensure_ready()?;
        let (x1, y1) = (x1 as i32, y1 as i32);
        let (mut x, mut y) = (x0 as i32, y0 as i32);

        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    /// Rectangle outline with corners `(x0, y0)` and `(x1, y1)`
    pub fn draw_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: u16) -> Result<(), Error> {
        self.draw_line(x0, y0, x1, y0, color)?;
        self.draw_line(x0, y0, x0, y1, color)?;
        self.draw_line(x0, y1, x1, y1, color)?;
        self.draw_line(x1, y0, x1, y1, color)
    }

    /// Midpoint circle outline
    pub fn draw_circle(&mut self, cx: u16, cy: u16, radius: u16, color: u16) -> Result<(), Error> {
        self.ensure_ready()?;
        let (cx, cy) = (cx as i32, cy as i32);
        let mut a = 0i32;
        let mut b = radius as i32;
        let mut d = 3 - 2 * b;

        while a <= b {
            for (ox, oy) in [(a, b), (b, a)] {
                self.put_pixel(cx + ox, cy + oy, color);
                self.put_pixel(cx - ox, cy + oy, color);
                self.put_pixel(cx + ox, cy - oy, color);
                self.put_pixel(cx - ox, cy - oy, color);
            }
            if d < 0 {
                d += 4 * a + 6;
            } else {
                d += 4 * (a - b) + 10;
                b -= 1;
            }
            a += 1;
        }
        Ok(())
    }

    /// Render one glyph opaquely if it fits on screen
    fn render_glyph(&mut self, font: &dyn GlyphSource, x: u16, y: u16, c: char, color: u16) -> bool {
        let (w, h) = font.glyph_size();
        if x as u32 + w as u32 > self.width as u32 || y as u32 + h as u32 > self.height as u32 {
            return false;
        }

        let background = self.background;
        for row in 0..h {
            let bits = font.row_bits(c, row);
            for col in 0..w {
                let lit = bits & (1 << (w - 1 - col)) != 0;
                let pixel = if lit { color } else { background };
                self.put_pixel((x + col) as i32, (y + row) as i32, pixel);
            }
        }
        true
    }

    /// Draw one character of the font with nominal `size`
    ///
    /// Unset glyph pixels are painted with the background color. A glyph
    /// that would cross the screen edge is rejected without drawing.
    pub fn draw_char(&mut self, x: u16, y: u16, c: char, size: u16, color: u16) -> Result<(), Error> {
        self.ensure_ready()?;
        let font = self.fonts.get(size)?;
        if self.render_glyph(font, x, y, c, color) {
            Ok(())
        } else {
            Err(Error::InvalidParameter)
        }
    }

    /// Draw text inside the box at `(x, y)` of `width` x `height`
    ///
    /// Wraps to the next line when a glyph would cross the right edge of
    /// the box; when a line would cross the bottom edge, starts over at the
    /// box origin. Stops at the first control character. Nothing is drawn
    /// if the box cannot hold a single glyph.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_string(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        size: u16,
        text: &str,
        color: u16,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let font = self.fonts.get(size)?;
        let (gw, gh) = font.glyph_size();
        let right = x as u32 + width as u32;
        let bottom = y as u32 + height as u32;
        if gw > width || gh > height {
            return Ok(());
        }

        let (mut cx, mut cy) = (x, y);
        for c in text.chars() {
            if c.is_control() {
                break;
            }
            if cx as u32 + gw as u32 > right {
                cx = x;
                cy = cy.saturating_add(gh);
            }
            if cy as u32 + gh as u32 > bottom {
                cx = x;
                cy = y;
            }
            self.render_glyph(font, cx, cy, c, color);
            cx = cx.saturating_add(gw);
        }
        Ok(())
    }

    /// Draw `value` right-aligned in a field of `len` digits
    ///
    /// Digits above the field width are dropped. Leading zeros follow
    /// `mode`; the last digit is always drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_number(
        &mut self,
        x: u16,
        y: u16,
        value: u32,
        len: u8,
        size: u16,
        mode: NumberMode,
        color: u16,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        if len > MAX_NUMBER_DIGITS {
            return Err(Error::InvalidParameter);
        }
        let font = self.fonts.get(size)?;
        let (gw, _) = font.glyph_size();

        let mut leading = true;
        for t in 0..len {
            let digit = (value / 10u32.pow((len - t - 1) as u32)) % 10;
            let c = if leading && digit == 0 && t + 1 < len {
                match mode {
                    NumberMode::NoZero => ' ',
                    NumberMode::Zero => '0',
                }
            } else {
                leading = false;
                (b'0' + digit as u8) as char
            };
            let cx = x as u32 + gw as u32 * t as u32;
            if cx <= u16::MAX as u32 {
                self.render_glyph(font, cx as u16, y, c, color);
            }
        }
        Ok(())
    }
}

impl<L, A, C> OriginDimensions for Display<'_, L, A, C> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<L, A, C> DrawTarget for Display<'_, L, A, C>
where
    L: LcdController,
    A: Accelerator,
    C: Clock,
{
    type Color = Rgb565;
    type Error = Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.ensure_ready()?;
        for Pixel(point, color) in pixels {
            self.put_pixel(point.x, point.y, color.into_storage());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.ensure_ready()?;
        let area = area.intersection(&self.bounding_box());
        if let Some(end) = area.bottom_right() {
            let region = Region::new(
                area.top_left.x as u16,
                area.top_left.y as u16,
                end.x as u16,
                end.y as u16,
            );
            self.fill_rect(region, color.into_storage())?;
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.ensure_ready()?;
        Display::clear(self, color.into_storage()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;
    use crate::config::DisplayConfig;
    use crate::display::tests::{framebuffer_for, sim_display, SimDisplay};
    use crate::rotation::Rotation;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{Circle, PrimitiveStyle};
    use proptest::prelude::*;

    extern crate std;
    use std::vec::Vec;

    const FG: u16 = color::BLACK;
    const BG: u16 = color::WHITE;
    /// Nominal size of the code test font
    const CODE: u16 = 8;

    fn lit(display: &SimDisplay<'_>) -> Vec<(u16, u16)> {
        let mut points = Vec::new();
        for y in 0..display.height() {
            for x in 0..display.width() {
                if display.read_point(x, y).unwrap() != BG {
                    points.push((x, y));
                }
            }
        }
        points
    }

    /// Decode the character drawn at a cell by the code test font
    fn decode(display: &SimDisplay<'_>, x: u16, y: u16) -> char {
        let code = (0..8).fold(0u8, |acc, col| {
            (acc << 1) | (display.read_point(x + col, y).unwrap() == FG) as u8
        });
        code as char
    }

    #[test]
    fn test_point_round_trip_every_rotation() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        for rotation in Rotation::ALL {
            display.set_rotation(rotation);
            let (x, y) = (display.width() - 1, 5);
            display.draw_point(x, y, color::RED).unwrap();
            assert_eq!(display.read_point(x, y), Ok(color::RED));
            display.draw_point(x, y, BG).unwrap();
        }
    }

    #[test]
    fn test_point_out_of_bounds() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        assert_eq!(display.draw_point(480, 0, FG), Err(Error::InvalidParameter));
        assert_eq!(display.read_point(0, 272), Err(Error::InvalidParameter));
        display.set_rotation(Rotation::Deg90);
        assert!(display.draw_point(271, 479, FG).is_ok());
        assert_eq!(display.draw_point(272, 0, FG), Err(Error::InvalidParameter));
    }

    #[test]
    fn test_degenerate_line_is_one_pixel() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_line(10, 10, 10, 10, FG).unwrap();
        assert_eq!(lit(&display), [(10, 10)]);
    }

    #[test]
    fn test_horizontal_line() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_line(5, 3, 1, 3, FG).unwrap();
        assert_eq!(lit(&display), [(1, 3), (2, 3), (3, 3), (4, 3), (5, 3)]);
    }

    #[test]
    fn test_rect_outline() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_rect(2, 2, 6, 5, FG).unwrap();
        let points = lit(&display);
        // Perimeter of a 5x4 box
        assert_eq!(points.len(), 2 * 5 + 2 * 2);
        assert!(points.contains(&(6, 5)));
        assert!(!points.contains(&(4, 3)));
    }

    #[test]
    fn test_circle_clips_at_edge() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_circle(0, 0, 10, FG).unwrap();
        assert_eq!(display.read_point(10, 0), Ok(FG));
        assert_eq!(display.read_point(0, 10), Ok(FG));
        assert!(lit(&display).iter().all(|&(x, y)| x <= 10 && y <= 10));
    }

    #[test]
    fn test_char_opaque_cell() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());
        display.fill_rect(Region::new(0, 0, 20, 20), color::RED).unwrap();

        display.draw_char(4, 4, 'A', CODE, FG).unwrap();
        assert_eq!(decode(&display, 4, 4), 'A');
        // Blank glyph rows painted with the background, not left red
        assert_eq!(display.read_point(4, 5), Ok(BG));
        // Bottom row of the test glyph is solid
        assert_eq!(display.read_point(11, 11), Ok(FG));
        // Outside the cell untouched
        assert_eq!(display.read_point(12, 4), Ok(color::RED));
    }

    #[test]
    fn test_char_rejects_overflow_and_unknown_size() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        assert_eq!(display.draw_char(473, 0, 'A', CODE, FG), Err(Error::InvalidParameter));
        assert_eq!(display.draw_char(0, 265, 'A', CODE, FG), Err(Error::InvalidParameter));
        assert!(lit(&display).is_empty());

        assert_eq!(display.draw_char(0, 0, 'A', 99, FG), Err(Error::InvalidParameter));
        assert!(display.draw_char(472, 264, 'A', CODE, FG).is_ok());
    }

    #[test]
    fn test_string_wraps_and_restarts_at_origin() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        // Two glyphs per line, two lines per box
        display.draw_string(0, 0, 20, 16, CODE, "ABCDEF", FG).unwrap();
        assert_eq!(decode(&display, 0, 0), 'E');
        assert_eq!(decode(&display, 8, 0), 'F');
        assert_eq!(decode(&display, 0, 8), 'C');
        assert_eq!(decode(&display, 8, 8), 'D');
    }

    #[test]
    fn test_string_box_smaller_than_glyph_draws_nothing() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_string(0, 0, 20, 7, CODE, "AB", FG).unwrap();
        display.draw_string(40, 0, 7, 20, CODE, "AB", FG).unwrap();
        assert!(lit(&display).is_empty());
    }

    #[test]
    fn test_string_stops_at_control() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_string(0, 0, 100, 8, CODE, "AB\nCD", FG).unwrap();
        assert_eq!(decode(&display, 8, 0), 'B');
        assert_eq!(display.read_point(16, 7), Ok(BG));
    }

    #[test]
    fn test_number_leading_blanks() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_number(0, 0, 42, 4, CODE, NumberMode::NoZero, FG).unwrap();
        let cells: Vec<char> = (0..4).map(|i| decode(&display, i * 8, 0)).collect();
        assert_eq!(cells, [' ', ' ', '4', '2']);
    }

    #[test]
    fn test_number_leading_zeros() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_number(0, 0, 42, 4, CODE, NumberMode::Zero, FG).unwrap();
        let cells: Vec<char> = (0..4).map(|i| decode(&display, i * 8, 0)).collect();
        assert_eq!(cells, ['0', '0', '4', '2']);
    }

    #[test]
    fn test_number_zero_and_inner_zeros() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        display.draw_number(0, 0, 0, 3, CODE, NumberMode::NoZero, FG).unwrap();
        let cells: Vec<char> = (0..3).map(|i| decode(&display, i * 8, 0)).collect();
        assert_eq!(cells, [' ', ' ', '0']);

        display.draw_number(0, 8, 1005, 5, CODE, NumberMode::NoZero, FG).unwrap();
        let cells: Vec<char> = (0..5).map(|i| decode(&display, i * 8, 8)).collect();
        assert_eq!(cells, [' ', '1', '0', '0', '5']);

        assert_eq!(
            display.draw_number(0, 0, 1, 11, CODE, NumberMode::Zero, FG),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn test_text_follows_rotation() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());
        display.set_rotation(Rotation::Deg270);

        display.draw_char(0, 0, 'Z', CODE, FG).unwrap();
        assert_eq!(decode(&display, 0, 0), 'Z');
        // Logical (0, 7) is the solid bottom row, physically at (7, 271)
        assert_eq!(display.framebuffer().get(7, 271), Some(FG));
    }

    #[test]
    fn test_embedded_graphics_fill() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        Rectangle::new(Point::new(470, 262), Size::new(20, 20))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut display)
            .unwrap();

        assert_eq!(display.read_point(479, 271), Ok(color::RED));
        assert_eq!(display.read_point(470, 262), Ok(color::RED));
        assert_eq!(display.read_point(469, 262), Ok(BG));
    }

    #[test]
    fn test_embedded_graphics_stroke_clips() {
        let mut pixels = framebuffer_for(0);
        let mut display = sim_display(&mut pixels, DisplayConfig::default());

        Circle::with_center(Point::new(0, 0), 21)
            .into_styled(PrimitiveStyle::with_stroke(Rgb565::BLUE, 1))
            .draw(&mut display)
            .unwrap();

        assert!(!lit(&display).is_empty());
        assert_eq!(display.bounding_box().size, Size::new(480, 272));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_line_is_connected(x0 in 0u16..64, y0 in 0u16..64, x1 in 0u16..64, y1 in 0u16..64) {
            let mut pixels = framebuffer_for(0);
            let mut display = sim_display(&mut pixels, DisplayConfig::default());

            display.draw_line(x0, y0, x1, y1, FG).unwrap();
            prop_assert_eq!(display.read_point(x0, y0).unwrap(), FG);
            prop_assert_eq!(display.read_point(x1, y1).unwrap(), FG);

            let span = x0.abs_diff(x1).max(y0.abs_diff(y1)) as usize + 1;
            let count = (0..64u16)
                .flat_map(|y| (0..64u16).map(move |x| (x, y)))
                .filter(|&(x, y)| display.read_point(x, y).unwrap() == FG)
                .count();
            prop_assert_eq!(count, span);
        }

        #[test]
        fn prop_circle_is_symmetric(cx in 20u16..200, cy in 20u16..200, r in 0u16..20) {
            let mut pixels = framebuffer_for(0);
            let mut display = sim_display(&mut pixels, DisplayConfig::default());

            display.draw_circle(cx, cy, r, FG).unwrap();
            for dy in 0..=r {
                for dx in 0..=r {
                    let a = display.read_point(cx + dx, cy + dy).unwrap();
                    prop_assert_eq!(a, display.read_point(cx - dx, cy + dy).unwrap());
                    prop_assert_eq!(a, display.read_point(cx + dx, cy - dy).unwrap());
                    prop_assert_eq!(a, display.read_point(cx + dy, cy + dx).unwrap());
                }
            }
        }
    }
}
