//! Display subsystem lifecycle
//!
//! ```text
//! Uninitialized ─► Powered ─► PanelDetected ─► Configured ─► Ready
//! ```
//!
//! Touch bring-up is an optional side branch from `Ready`; its failure is
//! reported but never rolls the display back.

/// Display lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Nothing configured
    Uninitialized,
    /// Panel power and backlight set up
    Powered,
    /// Panel identity read and matched to a descriptor
    PanelDetected,
    /// Timing generator programmed, framebuffer bound
    Configured,
    /// Rotation set and screen cleared; drawing allowed
    Ready,
}

impl DeviceState {
    /// Check if drawing operations are allowed
    pub fn is_ready(&self) -> bool {
        matches!(self, DeviceState::Ready)
    }

    /// Check if the timing generator has been programmed
    pub fn is_configured(&self) -> bool {
        *self >= DeviceState::Configured
    }
}

/// Touch sub-system state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchState {
    /// Touch not requested or not fitted
    Absent,
    /// Touch init was attempted and failed
    Failed,
    /// Touch controller identified and reset
    Ready,
}
