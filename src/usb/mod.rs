//! USB Device subsystem - presents the emulated mouse to the host.
//!
//! The injection node's USB controller is driven by `embassy-usb` with a
//! single boot-protocol mouse interface. The identity the device presents
//! (VID/PID, strings, power draw) is injected as a [`DeviceIdentity`]
//! value: the configuration menu persists and edits those fields
//! elsewhere, this subsystem only consumes the result.

pub mod report;

#[cfg(feature = "embedded")]
pub mod hid_device;

use crate::config;

/// Identity the emulated mouse presents during enumeration.
///
/// Defaults mirror a common consumer mouse so the relay is
/// indistinguishable from the real thing; every field can be overridden
/// from the persisted configuration before USB start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    pub vid: u16,
    pub pid: u16,
    pub device_release: u16,
    pub manufacturer: heapless::String<32>,
    pub product: heapless::String<32>,
    pub serial_number: heapless::String<32>,
    /// Maximum bus power draw (mA).
    pub max_power_ma: u16,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        let mut manufacturer = heapless::String::new();
        let mut product = heapless::String::new();
        let mut serial_number = heapless::String::new();
        // The defaults fit; longer configured values are truncated.
        let _ = manufacturer.push_str(config::USB_MANUFACTURER);
        let _ = product.push_str(config::USB_PRODUCT);
        let _ = serial_number.push_str(config::USB_SERIAL_NUMBER);
        Self {
            vid: config::USB_VID,
            pid: config::USB_PID,
            device_release: config::USB_DEVICE_RELEASE,
            manufacturer,
            product,
            serial_number,
            max_power_ma: config::USB_MAX_POWER_MA,
        }
    }
}
