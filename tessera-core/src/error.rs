//! Display core errors

/// Coarse status code reported across the public API boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Operation succeeded
    Ok,
    /// Generic failure
    Error,
    /// A parameter was out of range or unsupported
    InvalidParameter,
}

/// Errors returned by the display core
///
/// All checks that produce these run before any register is touched, so an
/// error never leaves the hardware half-configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Unsupported rotation, font size, coordinates or buffer length
    InvalidParameter,
    /// Panel identity strap code has no descriptor
    UnknownPanel(u8),
    /// Display has not reached the ready state
    NotReady,
    /// Framebuffer is smaller than the panel
    FramebufferTooSmall,
}

impl Error {
    /// Map to the three-valued status code
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidParameter | Error::UnknownPanel(_) | Error::FramebufferTooSmall => {
                Status::InvalidParameter
            }
            Error::NotReady => Status::Error,
        }
    }
}

impl From<Result<(), Error>> for Status {
    fn from(result: Result<(), Error>) -> Self {
        match result {
            Ok(()) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidParameter => write!(f, "invalid parameter"),
            Error::UnknownPanel(code) => write!(f, "unknown panel strap code {}", code),
            Error::NotReady => write!(f, "display not ready"),
            Error::FramebufferTooSmall => write!(f, "framebuffer smaller than panel"),
        }
    }
}
