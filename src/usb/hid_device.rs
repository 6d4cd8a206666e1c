//! USB HID mouse device - the injection node's outward face.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral and exposes a single boot-protocol mouse endpoint carrying
//! the identity loaded at boot.

use crate::config;
use crate::inject::MouseDevice;
use crate::protocol::Button;
use crate::usb::report::{MouseReport, MOUSE_REPORT_DESCRIPTOR};
use crate::usb::DeviceIdentity;
use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

static MOUSE_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Build result containing the USB device runner and the mouse writer.
pub struct UsbMouseDevice {
    pub device: UsbDevice<'static, Driver<'static, peripherals::USBD, HardwareVbusDetect>>,
    pub mouse_writer: HidWriter<'static, Driver<'static, peripherals::USBD, HardwareVbusDetect>, 8>,
}

/// Initialise the USB stack and create the emulated mouse.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD, identity: &'static DeviceIdentity) -> UsbMouseDevice {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    // Device-level configuration straight from the loaded identity.
    let mut usb_config = Config::new(identity.vid, identity.pid);
    usb_config.manufacturer = Some(identity.manufacturer.as_str());
    usb_config.product = Some(identity.product.as_str());
    usb_config.serial_number = Some(identity.serial_number.as_str());
    usb_config.device_release = identity.device_release;
    usb_config.max_power = identity.max_power_ma.min(500);
    usb_config.max_packet_size_0 = 64;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let mouse_state = MOUSE_STATE.init(State::new());
    let mouse_config = HidConfig {
        report_descriptor: MOUSE_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let mouse_writer = HidWriter::new(&mut builder, mouse_state, mouse_config);

    let device = builder.build();

    info!("USB HID mouse device initialised");

    UsbMouseDevice {
        device,
        mouse_writer,
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and endpoint servicing.
pub async fn run_usb_device(
    mut device: UsbDevice<'static, Driver<'static, peripherals::USBD, HardwareVbusDetect>>,
) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Report forwarding task - drains the report channel into the endpoint.
pub async fn mouse_writer_task(
    mut writer: HidWriter<'static, Driver<'static, peripherals::USBD, HardwareVbusDetect>, 8>,
    report_rx: &Receiver<'static, CriticalSectionRawMutex, MouseReport, 16>,
) -> ! {
    info!("mouse writer task started - waiting for reports");

    let mut buf = [0u8; 8];
    loop {
        let report = report_rx.receive().await;
        let n = report.serialize(&mut buf);
        if let Err(_e) = writer.write(&buf[..n]).await {
            warn!("USB mouse write failed");
        }
    }
}

/// [`MouseDevice`] backed by the report channel feeding the writer task.
///
/// Tracks the held-button state and splits full-range deltas into the
/// ±127 range of the boot report.
pub struct ChannelMouse {
    sender: Sender<'static, CriticalSectionRawMutex, MouseReport, 16>,
    buttons: u8,
}

impl ChannelMouse {
    pub fn new(sender: Sender<'static, CriticalSectionRawMutex, MouseReport, 16>) -> Self {
        Self { sender, buttons: 0 }
    }

    fn send(&self, report: MouseReport) {
        // The writer drains at USB polling speed; if the queue still
        // fills up, dropping a report is better than stalling dispatch.
        if self.sender.try_send(report).is_err() {
            warn!("report queue full, dropping report");
        }
    }
}

impl MouseDevice for ChannelMouse {
    fn move_rel(&mut self, mut dx: i16, mut dy: i16, mut wheel: i16) {
        loop {
            let sx = dx.clamp(-127, 127) as i8;
            let sy = dy.clamp(-127, 127) as i8;
            let sw = wheel.clamp(-127, 127) as i8;
            dx -= i16::from(sx);
            dy -= i16::from(sy);
            wheel -= i16::from(sw);
            self.send(MouseReport {
                buttons: self.buttons,
                x: sx,
                y: sy,
                wheel: sw,
            });
            if dx == 0 && dy == 0 && wheel == 0 {
                break;
            }
        }
    }

    fn press(&mut self, button: Button) {
        self.buttons |= button.mask();
        self.send(MouseReport {
            buttons: self.buttons,
            ..MouseReport::default()
        });
    }

    fn release(&mut self, button: Button) {
        self.buttons &= !button.mask();
        self.send(MouseReport {
            buttons: self.buttons,
            ..MouseReport::default()
        });
    }
}
