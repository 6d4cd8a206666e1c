//! Unified error type for km2usb.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // USB host
    /// The host controller driver rejected an operation.
    Host(HostError),

    /// An interface claim was refused; that interface is skipped.
    ClaimFailed(u8),

    /// Transfer allocation or submission failed for an endpoint.
    TransferFailed(u8),

    /// No device is currently connected.
    NotConnected,

    // Serial
    /// Receive ring buffer was full; the incoming byte was dropped.
    RingOverflow,

    /// The legacy frame decoder lost byte alignment with the peer.
    FrameDesync,

    // USB device
    /// Emulated HID device write failed.
    Usb,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Subset of host-controller errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostError {
    /// Raw status code from the controller driver.
    Raw(u32),
    /// Device open failed after a connect event.
    OpenFailed,
    /// Control transfer could not be submitted.
    ControlFailed,
    /// No free transfer slot remained for an endpoint.
    NoTransferSlot,
}

// Convenience conversions

impl From<HostError> for Error {
    fn from(e: HostError) -> Self {
        Error::Host(e)
    }
}
