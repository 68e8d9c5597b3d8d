//! GPIO helpers
//!
//! Pin traits come from `embedded-hal`; this module only adds the strap
//! reader used to identify the fitted panel.

use embedded_hal::digital::InputPin;

/// Read a set of strap pins as a bit pattern
///
/// Pin `i` maps to bit `i`, a high level reads as 1. Up to 8 pins.
pub fn read_strap<P: InputPin>(pins: &mut [P]) -> Result<u8, P::Error> {
    let mut code = 0u8;
    for (bit, pin) in pins.iter_mut().enumerate().take(8) {
        if pin.is_high()? {
            code |= 1 << bit;
        }
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Mock strap pin for testing
    struct MockPin {
        high: bool,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.high)
        }
    }

    #[test]
    fn test_strap_bit_order() {
        let mut pins = [
            MockPin { high: true },
            MockPin { high: false },
            MockPin { high: true },
        ];
        assert_eq!(read_strap(&mut pins), Ok(0b101));
    }

    #[test]
    fn test_strap_all_low() {
        let mut pins = [
            MockPin { high: false },
            MockPin { high: false },
            MockPin { high: false },
        ];
        assert_eq!(read_strap(&mut pins), Ok(0));
    }
}
