//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, buffer capacities, and protocol constants
//! live here so they can be tuned in one place.

// Serial link

/// Baud rate of the operator-facing UART (USB-serial console).
pub const UART_OPERATOR_BAUD: u32 = 115_200;

/// Baud rate of the inter-node UART linking the two MCUs
/// (the fastest the nRF52840 UARTE supports).
pub const UART_LINK_BAUD: u32 = 1_000_000;

/// Capacity of the per-channel receive ring buffer (bytes).
pub const SERIAL_RING_CAPACITY: usize = 128;

/// Maximum length of one text command line; longer lines are truncated.
pub const COMMAND_LINE_CAPACITY: usize = 100;

/// How long a channel stays quiesced after a framing desync (ms).
pub const DESYNC_FLUSH_DELAY_MS: u64 = 50;

// USB host (capture node)

/// Maximum interrupt transfers tracked per connected device.
pub const MAX_TRANSFERS: usize = 16;

/// Maximum interfaces claimed per connected device.
pub const MAX_INTERFACES: usize = 16;

/// Inactivity threshold before the physical mouse is suspended (ms).
pub const SUSPEND_TIMEOUT_MS: u64 = 10_000;

/// Poll interval of the inactivity monitor (ms).
pub const SUSPEND_POLL_MS: u64 = 100;

// USB device (injection node)

/// Default emulated-device identity. These mirror a common consumer
/// mouse; the configuration menu can overwrite them at boot.
pub const USB_VID: u16 = 0x046D;
pub const USB_PID: u16 = 0xC09D;

pub const USB_MANUFACTURER: &str = "Logitech";
pub const USB_PRODUCT: &str = "G203 LIGHTSYNC Gaming Mouse";
pub const USB_SERIAL_NUMBER: &str = "11A33D5C3A24";

/// bcdDevice / firmware revision presented to the host.
pub const USB_DEVICE_RELEASE: u16 = 0x5202;

/// Maximum bus power draw reported in the configuration descriptor (mA).
pub const USB_MAX_POWER_MA: u16 = 300;

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;
