//! Backlight and panel power
//!
//! The backlight is a PWM channel driven with a 0-100 % level; the panel
//! supply is an optional GPIO enable. [`PanelPower`] sequences the two:
//! supply before backlight on the way up, backlight before supply on the
//! way down.

use embedded_hal::digital::{Error as _, ErrorKind as PinErrorKind, OutputPin};
use embedded_hal::pwm::{Error as _, ErrorKind as PwmErrorKind, SetDutyCycle};

/// Power sequencing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// Backlight level above 100 %
    InvalidLevel,
    /// PWM channel rejected the duty cycle
    Pwm(PwmErrorKind),
    /// Panel supply enable could not be driven
    Pin(PinErrorKind),
}

/// Map a 0-100 % level onto a PWM period
pub fn percent_to_duty(percent: u8, max_duty: u16) -> u16 {
    (max_duty as u32 * percent.min(100) as u32 / 100) as u16
}

/// PWM backlight
///
/// Remembers the last requested level so it can be restored after
/// [`Backlight::off`].
pub struct Backlight<P> {
    pwm: P,
    percent: u8,
    lit: bool,
}

impl<P: SetDutyCycle> Backlight<P> {
    /// Create a backlight, initially dark, that will come up at 100 %
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            percent: 100,
            lit: false,
        }
    }

    /// Requested level (0-100 %)
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Set the level and light the backlight
    pub fn set_percent(&mut self, percent: u8) -> Result<(), PowerError> {
        if percent > 100 {
            return Err(PowerError::InvalidLevel);
        }
        self.apply(percent)?;
        self.percent = percent;
        self.lit = true;
        Ok(())
    }

    /// Restore the last requested level
    pub fn on(&mut self) -> Result<(), PowerError> {
        self.apply(self.percent)?;
        self.lit = true;
        Ok(())
    }

    /// Go dark, keeping the requested level
    pub fn off(&mut self) -> Result<(), PowerError> {
        self.apply(0)?;
        self.lit = false;
        Ok(())
    }

    fn apply(&mut self, percent: u8) -> Result<(), PowerError> {
        let duty = percent_to_duty(percent, self.pwm.max_duty_cycle());
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|e| PowerError::Pwm(e.kind()))
    }
}

/// Panel supply and backlight sequencer
pub struct PanelPower<P, O> {
    backlight: Backlight<P>,
    supply: Option<O>,
    on: bool,
}

impl<P, O> PanelPower<P, O>
where
    P: SetDutyCycle,
    O: OutputPin,
{
    /// `supply` is the panel power enable, if the board has one
    pub fn new(backlight: Backlight<P>, supply: Option<O>) -> Self {
        Self {
            backlight,
            supply,
            on: false,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn backlight(&self) -> &Backlight<P> {
        &self.backlight
    }

    /// Change the backlight level; while powered off the level is only
    /// stored
    pub fn set_backlight(&mut self, percent: u8) -> Result<(), PowerError> {
        if percent > 100 {
            return Err(PowerError::InvalidLevel);
        }
        if self.on {
            self.backlight.set_percent(percent)
        } else {
            self.backlight.percent = percent;
            Ok(())
        }
    }

    /// Enable the panel supply, then the backlight
    pub fn power_on(&mut self) -> Result<(), PowerError> {
        if let Some(pin) = self.supply.as_mut() {
            pin.set_high().map_err(|e| PowerError::Pin(e.kind()))?;
        }
        self.backlight.on()?;
        self.on = true;
        debug!("Panel power on, backlight {}%", self.backlight.percent());
        Ok(())
    }

    /// Darken the backlight, then cut the panel supply
    pub fn power_off(&mut self) -> Result<(), PowerError> {
        self.backlight.off()?;
        if let Some(pin) = self.supply.as_mut() {
            pin.set_low().map_err(|e| PowerError::Pin(e.kind()))?;
        }
        self.on = false;
        debug!("Panel power off");
        Ok(())
    }

    /// Give back the PWM channel and supply pin
    pub fn release(self) -> (P, Option<O>) {
        (self.backlight.pwm, self.supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPin, MockPwm};

    #[test]
    fn test_percent_to_duty() {
        assert_eq!(percent_to_duty(0, 1000), 0);
        assert_eq!(percent_to_duty(50, 1000), 500);
        assert_eq!(percent_to_duty(100, 1000), 1000);
        assert_eq!(percent_to_duty(100, u16::MAX), u16::MAX);
        assert_eq!(percent_to_duty(33, 255), 84);
        // Clamped
        assert_eq!(percent_to_duty(200, 1000), 1000);
    }

    #[test]
    fn test_backlight_level_survives_off() {
        let mut backlight = Backlight::new(MockPwm::new());
        backlight.set_percent(40).unwrap();
        assert_eq!(backlight.pwm().duty, 400);

        backlight.off().unwrap();
        assert_eq!(backlight.pwm().duty, 0);
        assert!(!backlight.is_lit());

        backlight.on().unwrap();
        assert_eq!(backlight.pwm().duty, 400);
    }

    #[test]
    fn test_backlight_rejects_out_of_range() {
        let mut backlight = Backlight::new(MockPwm::new());
        assert_eq!(backlight.set_percent(101), Err(PowerError::InvalidLevel));
        assert_eq!(backlight.percent(), 100);
    }

    #[test]
    fn test_power_sequence() {
        let mut power = PanelPower::new(Backlight::new(MockPwm::new()), Some(MockPin::new()));
        power.set_backlight(60).unwrap();
        // Stored only while off
        assert_eq!(power.backlight().pwm().duty, 0);

        power.power_on().unwrap();
        assert!(power.is_on());
        assert_eq!(power.backlight().pwm().duty, 600);

        power.power_off().unwrap();
        assert!(!power.is_on());
        let (pwm, supply) = power.release();
        assert_eq!(pwm.duty, 0);
        assert_eq!(supply.unwrap().history.as_slice(), &[true, false]);
    }

    #[test]
    fn test_power_without_supply_pin() {
        let mut power = PanelPower::new(Backlight::new(MockPwm::new()), None::<MockPin>);
        power.power_on().unwrap();
        assert_eq!(power.backlight().pwm().duty, 1000);
        power.set_backlight(10).unwrap();
        assert_eq!(power.backlight().pwm().duty, 100);
    }
}
