//! Display state
//!
//! [`Display`] owns the timing controller, the blit engine and the
//! framebuffer borrow, plus the drawing context (rotation, logical size,
//! background color). It is created in the `Configured` state and becomes
//! `Ready` once [`Display::start`] has applied the rotation and cleared
//! the screen; drawing before that returns [`Error::NotReady`].

use tessera_hal::{Accelerator, Clock, LcdController};

use crate::blit::{BlitEngine, BlitStatus, Region};
use crate::config::DisplayConfig;
use crate::error::Error;
use crate::font::FontSet;
use crate::framebuffer::Framebuffer;
use crate::panel::PanelDescriptor;
use crate::rotation::Rotation;
use crate::state::DeviceState;
use crate::timing;

/// Snapshot of the display configuration for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayInfo {
    pub product_id: u16,
    /// Logical width in the current rotation
    pub width: u16,
    /// Logical height in the current rotation
    pub height: u16,
    pub panel_width: u16,
    pub panel_height: u16,
    pub rotation: Rotation,
    pub pixel_clock_hz: u32,
    pub background: u16,
    pub state: DeviceState,
    pub scanout: bool,
}

/// A configured RGB panel with its framebuffer
pub struct Display<'fb, L, A, C> {
    pub(crate) panel: &'static PanelDescriptor,
    pub(crate) lcd: L,
    pub(crate) blit: BlitEngine<A, C>,
    pub(crate) framebuffer: Framebuffer<'fb>,
    pub(crate) fonts: FontSet<'static>,
    pub(crate) rotation: Rotation,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) background: u16,
    pub(crate) state: DeviceState,
    pub(crate) scanout: bool,
}

impl<'fb, L, A, C> Display<'fb, L, A, C>
where
    L: LcdController,
    A: Accelerator,
    C: Clock,
{
    /// Program the timing controller for `panel` and bind `pixels` as its
    /// framebuffer
    ///
    /// Every check runs before the controller is touched.
    pub fn new(
        panel: &'static PanelDescriptor,
        mut lcd: L,
        accel: A,
        clock: C,
        pixels: &'fb mut [u16],
        fonts: FontSet<'static>,
        config: &DisplayConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        if pixels.len() < panel.pixel_count() {
            return Err(Error::FramebufferTooSmall);
        }
        let framebuffer = Framebuffer::new(pixels, panel.width, panel.height)?;
        timing::configure(&mut lcd, panel, &framebuffer)?;

        let (width, height) = config.rotation.logical_size(panel.width, panel.height);
        Ok(Self {
            panel,
            lcd,
            blit: BlitEngine::new(accel, clock, config.blit),
            framebuffer,
            fonts,
            rotation: config.rotation,
            width,
            height,
            background: config.background,
            state: DeviceState::Configured,
            scanout: true,
        })
    }

    /// Clear to the background color and enter the ready state
    pub fn start(&mut self) -> Result<BlitStatus, Error> {
        let status = self.clear(self.background)?;
        self.state = DeviceState::Ready;
        info!("Display ready: {}x{} rotation {}", self.width, self.height, self.rotation.degrees());
        Ok(status)
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn panel(&self) -> &'static PanelDescriptor {
        self.panel
    }

    /// Logical width in the current rotation
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height in the current rotation
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn background(&self) -> u16 {
        self.background
    }

    /// Color used for unset glyph pixels
    pub fn set_background(&mut self, color: u16) {
        self.background = color;
    }

    pub fn fonts(&self) -> &FontSet<'static> {
        &self.fonts
    }

    pub fn framebuffer(&self) -> &Framebuffer<'fb> {
        &self.framebuffer
    }

    pub fn lcd(&self) -> &L {
        &self.lcd
    }

    pub fn blit_engine(&self) -> &BlitEngine<A, C> {
        &self.blit
    }

    /// Select a rotation and update the logical size
    ///
    /// Existing framebuffer content is left in place.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        (self.width, self.height) = rotation.logical_size(self.panel.width, self.panel.height);
        debug!("Rotation {} -> logical {}x{}", rotation.degrees(), self.width, self.height);
    }

    /// Enable or disable scan-out
    ///
    /// While disabled, blits skip the vertical blank wait.
    pub fn set_scanout(&mut self, enabled: bool) {
        self.lcd.set_enabled(enabled);
        self.scanout = enabled;
    }

    pub fn info(&self) -> DisplayInfo {
        DisplayInfo {
            product_id: self.panel.product_id,
            width: self.width,
            height: self.height,
            panel_width: self.panel.width,
            panel_height: self.panel.height,
            rotation: self.rotation,
            pixel_clock_hz: self.panel.pixel_clock_hz,
            background: self.background,
            state: self.state,
            scanout: self.scanout,
        }
    }

    pub(crate) fn ensure_ready(&self) -> Result<(), Error> {
        if self.state.is_ready() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    /// Fill the whole logical screen
    pub fn clear(&mut self, color: u16) -> Result<BlitStatus, Error> {
        if !self.state.is_configured() {
            return Err(Error::NotReady);
        }
        let region = Region::new(0, 0, self.width - 1, self.height - 1);
        self.fill_region(region, color)
    }

    /// Fill a logical rectangle (inclusive corners, any order)
    pub fn fill_rect(&mut self, region: Region, color: u16) -> Result<BlitStatus, Error> {
        self.ensure_ready()?;
        self.fill_region(region, color)
    }

    /// Copy a packed RGB565 buffer into a logical rectangle
    ///
    /// `pixels` is row-major in panel orientation and must cover the whole
    /// region; parts outside the panel are skipped.
    pub fn blit_buffer(&mut self, region: Region, pixels: &[u16]) -> Result<BlitStatus, Error> {
        self.ensure_ready()?;
        let scanout = if self.scanout { Some(&mut self.lcd) } else { None };
        self.blit
            .copy(scanout, &mut self.framebuffer, self.rotation, region, pixels)
    }

    /// Push a full-screen back buffer to the framebuffer
    pub fn flush(&mut self, pixels: &[u16]) -> Result<BlitStatus, Error> {
        let region = Region::new(0, 0, self.width - 1, self.height - 1);
        self.blit_buffer(region, pixels)
    }

    fn fill_region(&mut self, region: Region, color: u16) -> Result<BlitStatus, Error> {
        let scanout = if self.scanout { Some(&mut self.lcd) } else { None };
        self.blit
            .fill(scanout, &mut self.framebuffer, self.rotation, region, color)
    }
}
