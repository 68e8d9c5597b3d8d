//! Mock peripherals for driver tests

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use heapless::Vec;

extern crate std;
use std::rc::Rc;

/// Mock GPIO pin recording every level it is driven to
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
    pub history: Vec<bool, 32>,
    level: Option<Rc<Cell<bool>>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input pin reading a fixed level
    pub fn reading(high: bool) -> Self {
        Self {
            high,
            ..Self::default()
        }
    }

    /// Output pin whose level stays observable after the pin is moved away
    pub fn watched() -> (Self, Rc<Cell<bool>>) {
        let level = Rc::new(Cell::new(false));
        let pin = Self {
            level: Some(level.clone()),
            ..Self::default()
        };
        (pin, level)
    }

    fn drive(&mut self, high: bool) {
        self.high = high;
        let _ = self.history.push(high);
        if let Some(level) = &self.level {
            level.set(high);
        }
    }
}

impl PinErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// Mock PWM channel with a 1000-step period
#[derive(Default)]
pub struct MockPwm {
    pub duty: u16,
    mirror: Option<Rc<Cell<u16>>>,
}

impl MockPwm {
    pub const MAX_DUTY: u16 = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    /// Channel whose duty stays observable after it is moved away
    pub fn watched() -> (Self, Rc<Cell<u16>>) {
        let duty = Rc::new(Cell::new(0));
        let pwm = Self {
            mirror: Some(duty.clone()),
            ..Self::default()
        };
        (pwm, duty)
    }
}

impl PwmErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        if let Some(mirror) = &self.mirror {
            mirror.set(duty);
        }
        Ok(())
    }
}

/// Delay that only adds up the time requested
#[derive(Default)]
pub struct MockDelay {
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockI2cError {
    Nack,
}

impl i2c::Error for MockI2cError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }
}

/// Register window covered by [`RegisterMap`]
const MAP_BASE: u16 = 0x8000;
const MAP_LEN: usize = 0x200;

/// I2C device with a 16-bit register map
///
/// The first two bytes written in a transaction set the register pointer;
/// further writes store and advance, reads load and advance. Writes made
/// by the driver are logged; [`RegisterMap::load`] is not.
pub struct RegisterMap {
    address: u8,
    registers: [u8; MAP_LEN],
    pub writes: Vec<(u16, u8), 64>,
    pub transactions: u32,
    /// Refuse every transaction
    pub nack: bool,
}

impl RegisterMap {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; MAP_LEN],
            writes: Vec::new(),
            transactions: 0,
            nack: false,
        }
    }

    fn slot(register: u16) -> usize {
        (register.wrapping_sub(MAP_BASE) as usize) % MAP_LEN
    }

    /// Preload register contents as the device would present them
    pub fn load(&mut self, register: u16, bytes: &[u8]) {
        for (i, &b) in bytes.iter().enumerate() {
            self.registers[Self::slot(register + i as u16)] = b;
        }
    }

    pub fn get(&self, register: u16) -> u8 {
        self.registers[Self::slot(register)]
    }
}

impl i2c::ErrorType for RegisterMap {
    type Error = MockI2cError;
}

impl I2c for RegisterMap {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        self.transactions += 1;
        if self.nack || address != self.address {
            return Err(MockI2cError::Nack);
        }

        let mut header: Vec<u8, 2> = Vec::new();
        let mut pointer = 0u16;
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    for &b in bytes.iter() {
                        if header.len() < 2 {
                            let _ = header.push(b);
                            if header.len() == 2 {
                                pointer = u16::from_be_bytes([header[0], header[1]]);
                            }
                        } else {
                            self.registers[Self::slot(pointer)] = b;
                            let _ = self.writes.push((pointer, b));
                            pointer = pointer.wrapping_add(1);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.registers[Self::slot(pointer)];
                        pointer = pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}
