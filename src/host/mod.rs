//! USB host side (capture node).
//!
//! The host controller itself is a collaborator: the enumeration session
//! drives it through the [`HostDriver`] trait and consumes its
//! asynchronous [`HostEvent`]s. Everything above that seam - descriptor
//! walking, HID report-descriptor parsing, the report pipeline, and the
//! suspend/resume monitor - is portable and host-testable.

pub mod descriptor;
pub mod pipeline;
pub mod power;
pub mod session;

pub use descriptor::ReportLayout;
pub use pipeline::ReportPipeline;
pub use power::PowerMonitor;
pub use session::{EnumerationSession, Phase};

use crate::error::Error;

/// Handle for an allocated interrupt transfer, issued by the driver.
pub type TransferId = u8;

/// Standard request codes used by the session.
pub const REQUEST_GET_STATUS: u8 = 0x00;
pub const REQUEST_CLEAR_FEATURE: u8 = 0x01;
pub const REQUEST_SET_FEATURE: u8 = 0x03;
pub const REQUEST_GET_DESCRIPTOR: u8 = 0x06;

/// Feature selector for remote wakeup.
pub const FEATURE_REMOTE_WAKEUP: u16 = 0x0001;

/// Descriptor type of an HID report descriptor (class-specific).
pub const DESCRIPTOR_HID_REPORT: u8 = 0x22;

/// An 8-byte control-transfer setup packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    /// GET_DESCRIPTOR for a class descriptor on an interface
    /// (bmRequestType 0x81: device-to-host, standard, interface).
    pub const fn interface_descriptor(desc_type: u8, interface: u16, length: u16) -> Self {
        Self {
            request_type: 0x81,
            request: REQUEST_GET_DESCRIPTOR,
            value: (desc_type as u16) << 8,
            index: interface,
            length,
        }
    }

    /// SET_FEATURE(remote wakeup) on the device.
    pub const fn set_remote_wakeup() -> Self {
        Self {
            request_type: 0x00,
            request: REQUEST_SET_FEATURE,
            value: FEATURE_REMOTE_WAKEUP,
            index: 0,
            length: 0,
        }
    }

    /// CLEAR_FEATURE(remote wakeup) on the device.
    pub const fn clear_remote_wakeup() -> Self {
        Self {
            request_type: 0x00,
            request: REQUEST_CLEAR_FEATURE,
            value: FEATURE_REMOTE_WAKEUP,
            index: 0,
            length: 0,
        }
    }

    /// GET_STATUS on the device (two status bytes back).
    pub const fn device_status() -> Self {
        Self {
            request_type: 0x80,
            request: REQUEST_GET_STATUS,
            value: 0,
            index: 0,
            length: 2,
        }
    }

    /// Wire form of the packet.
    pub fn to_bytes(self) -> [u8; 8] {
        let v = self.value.to_le_bytes();
        let i = self.index.to_le_bytes();
        let l = self.length.to_le_bytes();
        [
            self.request_type,
            self.request,
            v[0],
            v[1],
            i[0],
            i[1],
            l[0],
            l[1],
        ]
    }
}

/// Asynchronous events delivered by the host controller driver.
#[derive(Clone, Copy, Debug)]
pub enum HostEvent<'a> {
    /// A device appeared on the bus at the given address.
    NewDevice { address: u8 },
    /// The open device disappeared; all handles are now invalid.
    DeviceGone,
    /// A control transfer completed with the given IN payload.
    ControlIn { setup: SetupPacket, data: &'a [u8] },
    /// An interrupt-IN transfer completed.
    TransferIn {
        id: TransferId,
        endpoint: u8,
        data: &'a [u8],
    },
}

/// The host controller driver surface consumed by the session.
///
/// Operations map one-to-one onto a typical embedded USB host library:
/// open/close, descriptor retrieval, interface claim/release, transfer
/// alloc/submit/free, plus control submission whose completion arrives
/// as [`HostEvent::ControlIn`].
pub trait HostDriver {
    fn open_device(&mut self, address: u8) -> Result<(), Error>;
    fn close_device(&mut self) -> Result<(), Error>;

    /// Copy the active configuration descriptor (with all subordinate
    /// descriptors) into `buf`, returning its total length.
    fn config_descriptor(&mut self, buf: &mut [u8]) -> Result<usize, Error>;

    fn claim_interface(&mut self, interface: u8, alt_setting: u8) -> Result<(), Error>;
    fn release_interface(&mut self, interface: u8) -> Result<(), Error>;

    /// Submit a control transfer; the completion (and any IN payload)
    /// is delivered later as a [`HostEvent::ControlIn`].
    fn submit_control(&mut self, setup: SetupPacket) -> Result<(), Error>;

    /// Allocate an interrupt transfer of `len` bytes on `endpoint`.
    fn alloc_transfer(&mut self, endpoint: u8, len: usize) -> Result<TransferId, Error>;
    /// (Re-)submit a previously allocated transfer.
    fn submit_transfer(&mut self, id: TransferId) -> Result<(), Error>;
    fn free_transfer(&mut self, id: TransferId);
}
