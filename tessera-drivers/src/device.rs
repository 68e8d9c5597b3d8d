//! Composed display device
//!
//! [`LcdDevice`] wires the display core, panel power and the optional
//! touch controller together and runs the bring-up sequence:
//!
//! ```text
//! Uninitialized ─► Powered ─► PanelDetected ─► Configured ─► Ready
//!                                                              │
//!                                              touch init (optional)
//! ```
//!
//! Any failure before `Ready` aborts init and switches the backlight and
//! panel supply back off. A touch failure is recorded in
//! [`TouchState::Failed`] and logged; the display stays usable and touch
//! init can be retried.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind as PinErrorKind, InputPin, OutputPin};
use embedded_hal::pwm::SetDutyCycle;
use tessera_core::{
    panel, DeviceState, Display, DisplayConfig, DisplayInfo, Error, FontSet, Rotation, Status, TouchState,
};
use tessera_hal::{read_strap, Accelerator, Clock, LcdController, RegisterBus};

use crate::backlight::{PanelPower, PowerError};
use crate::touch::{Gt9xx, TouchError, TouchPoint};

/// Errors from the composed device
///
/// `E` is the touch bus error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// Display core rejected a parameter or is not ready
    Display(Error),
    /// Touch controller failure
    Touch(TouchError<E>),
    /// Backlight or panel supply failure
    Power(PowerError),
    /// Identity strap pins could not be read
    Strap(PinErrorKind),
    /// No touch controller fitted or touch not initialized
    TouchUnavailable,
}

impl<E> DeviceError<E> {
    /// Map to the three-valued status code
    pub fn status(&self) -> Status {
        match self {
            DeviceError::Display(e) => e.status(),
            DeviceError::Touch(TouchError::Unsupported | TouchError::InvalidParameter)
            | DeviceError::Power(PowerError::InvalidLevel) => Status::InvalidParameter,
            _ => Status::Error,
        }
    }
}

impl<E> From<Error> for DeviceError<E> {
    fn from(e: Error) -> Self {
        DeviceError::Display(e)
    }
}

impl<E> From<TouchError<E>> for DeviceError<E> {
    fn from(e: TouchError<E>) -> Self {
        DeviceError::Touch(e)
    }
}

impl<E> From<PowerError> for DeviceError<E> {
    fn from(e: PowerError) -> Self {
        DeviceError::Power(e)
    }
}

/// Hardware handed to [`LcdDevice::init`]
pub struct DeviceParts<'fb, L, A, C, P, O, I, R> {
    pub lcd: L,
    pub accel: A,
    pub clock: C,
    /// Framebuffer memory, at least as large as the biggest supported panel
    pub framebuffer: &'fb mut [u16],
    pub fonts: FontSet<'static>,
    pub power: PanelPower<P, O>,
    pub touch: Option<Gt9xx<I, R>>,
}

/// Snapshot of the whole device for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub display: DisplayInfo,
    pub powered: bool,
    pub backlight_percent: u8,
    pub touch: TouchState,
    pub touch_product_id: Option<[u8; 4]>,
    pub touch_config_version: Option<u8>,
}

/// Display, power and touch as one device
pub struct LcdDevice<'fb, L, A, C, P, O, I, R> {
    display: Display<'fb, L, A, C>,
    power: PanelPower<P, O>,
    touch: Option<Gt9xx<I, R>>,
    touch_state: TouchState,
}

impl<'fb, L, A, C, P, O, I, R> LcdDevice<'fb, L, A, C, P, O, I, R>
where
    L: LcdController,
    A: Accelerator,
    C: Clock,
    P: SetDutyCycle,
    O: OutputPin,
    I: RegisterBus,
    R: OutputPin,
{
    /// Bring up the display and, if configured, the touch controller
    ///
    /// `strap` are the panel identity pins, bit 0 first.
    pub fn init<S: InputPin, D: DelayNs>(
        parts: DeviceParts<'fb, L, A, C, P, O, I, R>,
        strap: &mut [S],
        delay: &mut D,
        config: &DisplayConfig,
    ) -> Result<Self, DeviceError<I::Error>> {
        config.validate()?;
        let DeviceParts {
            lcd,
            accel,
            clock,
            framebuffer,
            fonts,
            mut power,
            touch,
        } = parts;
        let mut state = DeviceState::Uninitialized;

        let brought_up = (|| -> Result<Display<'fb, L, A, C>, DeviceError<I::Error>> {
            power.set_backlight(config.backlight_percent)?;
            power.power_on()?;
            advance(&mut state, DeviceState::Powered);

            let code = read_strap(strap).map_err(|e| DeviceError::Strap(e.kind()))?;
            let descriptor = match panel::lookup(code) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    error!("Unknown panel strap code {}", code);
                    return Err(e.into());
                }
            };
            info!(
                "Panel {=u16:x} on strap {}: {}x{}",
                descriptor.product_id,
                code,
                descriptor.width,
                descriptor.height
            );
            advance(&mut state, DeviceState::PanelDetected);

            let mut display = Display::new(descriptor, lcd, accel, clock, framebuffer, fonts, config)?;
            advance(&mut state, display.state());
            display.start()?;
            advance(&mut state, display.state());
            Ok(display)
        })();

        let display = match brought_up {
            Ok(display) => display,
            Err(e) => {
                if power.power_off().is_err() {
                    error!("Panel power off failed after aborted init");
                }
                return Err(e);
            }
        };

        let mut device = Self {
            display,
            power,
            touch,
            touch_state: TouchState::Absent,
        };

        if config.touch_enabled && device.touch.is_some() && device.touch_init(delay).is_err() {
            warn!("Touch init failed, continuing without touch");
        }
        Ok(device)
    }

    pub fn display(&self) -> &Display<'fb, L, A, C> {
        &self.display
    }

    /// Drawing access
    pub fn display_mut(&mut self) -> &mut Display<'fb, L, A, C> {
        &mut self.display
    }

    pub fn touch_state(&self) -> TouchState {
        self.touch_state
    }

    pub fn power(&self) -> &PanelPower<P, O> {
        &self.power
    }

    /// Rotate drawing and touch reports together
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.display.set_rotation(rotation);
    }

    pub fn set_backlight(&mut self, percent: u8) -> Result<(), DeviceError<I::Error>> {
        self.power.set_backlight(percent)?;
        Ok(())
    }

    /// Enable scan-out, panel supply and backlight
    pub fn power_on(&mut self) -> Result<(), DeviceError<I::Error>> {
        self.display.set_scanout(true);
        self.power.power_on()?;
        Ok(())
    }

    /// Darken the backlight, cut the panel supply and stop scan-out
    ///
    /// The framebuffer keeps its content and drawing still works.
    pub fn power_off(&mut self) -> Result<(), DeviceError<I::Error>> {
        self.power.power_off()?;
        self.display.set_scanout(false);
        Ok(())
    }

    /// (Re)initialize the touch controller for the detected panel
    pub fn touch_init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DeviceError<I::Error>> {
        let Some(touch) = self.touch.as_mut() else {
            return Err(DeviceError::TouchUnavailable);
        };
        match touch.init(self.display.panel(), delay) {
            Ok(()) => {
                self.touch_state = TouchState::Ready;
                Ok(())
            }
            Err(e) => {
                self.touch_state = TouchState::Failed;
                Err(e.into())
            }
        }
    }

    /// Read up to `max_count` touch points in logical coordinates
    pub fn touch_scan(&mut self, points: &mut [TouchPoint], max_count: usize) -> Result<usize, DeviceError<I::Error>> {
        let rotation = self.display.rotation();
        match (self.touch.as_mut(), self.touch_state) {
            (Some(touch), TouchState::Ready) => Ok(touch.scan(rotation, points, max_count)?),
            _ => Err(DeviceError::TouchUnavailable),
        }
    }

    /// Collect and log a status snapshot
    pub fn info(&mut self) -> DeviceInfo {
        let (touch_product_id, touch_config_version) = match (self.touch.as_mut(), self.touch_state) {
            (Some(touch), TouchState::Ready) => (touch.product_id(), touch.config_version().ok()),
            _ => (None, None),
        };
        let info = DeviceInfo {
            display: self.display.info(),
            powered: self.power.is_on(),
            backlight_percent: self.power.backlight().percent(),
            touch: self.touch_state,
            touch_product_id,
            touch_config_version,
        };
        info!("{}", info);
        info
    }
}

fn advance(state: &mut DeviceState, next: DeviceState) {
    debug!("Display state {} -> {}", *state, next);
    *state = next;
}
