//! Register-addressed I2C access
//!
//! Touch and power ICs on this board expose a 16-bit, big-endian register
//! map behind a fixed 7-bit device address. Writes send the register
//! address followed by the payload in one transaction; reads send the
//! register address and then read after a repeated start.

use embedded_hal::i2c::{I2c, Operation};

/// Device with a 16-bit big-endian register map
pub trait RegisterBus {
    /// Error type for bus operations (typically a missing acknowledge)
    type Error;

    /// Write `payload` starting at `register`
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `register` - 16-bit register address, sent big-endian
    /// * `payload` - Bytes to write
    fn write_register(&mut self, address: u8, register: u16, payload: &[u8]) -> Result<(), Self::Error>;

    /// Read `buf.len()` bytes starting at `register`
    fn read_register(&mut self, address: u8, register: u16, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write a single byte register
    fn write_register_byte(&mut self, address: u8, register: u16, value: u8) -> Result<(), Self::Error> {
        self.write_register(address, register, &[value])
    }

    /// Read a single byte register
    fn read_register_byte(&mut self, address: u8, register: u16) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_register(address, register, &mut buf)?;
        Ok(buf[0])
    }
}

impl<T: I2c> RegisterBus for T {
    type Error = T::Error;

    fn write_register(&mut self, address: u8, register: u16, payload: &[u8]) -> Result<(), Self::Error> {
        let reg = register.to_be_bytes();
        // Adjacent writes go out back to back without a restart
        self.transaction(address, &mut [Operation::Write(&reg), Operation::Write(payload)])
    }

    fn read_register(&mut self, address: u8, register: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.write_read(address, &register.to_be_bytes(), buf)
    }
}
