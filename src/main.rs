//! Injection-node firmware.
//!
//! Wires the portable relay logic to the nRF52840: two UARTs feed the
//! receive rings (the operator console and the inter-node link), a
//! dispatch task drains them through the line assembler and codec into
//! the actuator, and the emulated USB HID mouse carries the result to
//! the host.

#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_nrf::{bind_interrupts, peripherals, uarte};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Timer;
use static_cell::StaticCell;

use km2usb::config;
use km2usb::inject::{MouseActuator, Outcome};
use km2usb::protocol::codec::{self, WireLine};
use km2usb::serial::{LineAssembler, RingBuffer};
use km2usb::usb::hid_device::{self, ChannelMouse};
use km2usb::usb::report::MouseReport;
use km2usb::usb::DeviceIdentity;

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
    UARTE1 => uarte::InterruptHandler<peripherals::UARTE1>;
});

/// Decoded mouse reports heading for the USB endpoint.
static REPORT_CHANNEL: Channel<CriticalSectionRawMutex, MouseReport, 16> = Channel::new();

/// Reply lines (`km.pos`, debug echo) heading for the operator console.
static REPLY_CHANNEL: Channel<CriticalSectionRawMutex, WireLine, 4> = Channel::new();

/// Receive rings, filled by the UART tasks, drained by dispatch.
static OPERATOR_RX: RingBuffer<{ config::SERIAL_RING_CAPACITY }> = RingBuffer::new();
static LINK_RX: RingBuffer<{ config::SERIAL_RING_CAPACITY }> = RingBuffer::new();

static IDENTITY: StaticCell<DeviceIdentity> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("km2usb injection node starting");

    // Operator console UART.
    let mut op_config = uarte::Config::default();
    op_config.baudrate = uarte::Baudrate::BAUD115200;
    let op_uart = uarte::Uarte::new(p.UARTE0, Irqs, p.P0_08, p.P0_06, op_config);
    let (op_tx, op_rx) = op_uart.split();

    // Inter-node link UART.
    let mut link_config = uarte::Config::default();
    link_config.baudrate = uarte::Baudrate::BAUD1M;
    let link_uart = uarte::Uarte::new(p.UARTE1, Irqs, p.P1_01, p.P1_02, link_config);
    let (_link_tx, link_rx) = link_uart.split();

    // The configuration menu would overwrite these from flash before
    // USB start-up; until then the defaults apply.
    let identity = IDENTITY.init(DeviceIdentity::default());
    let usb = hid_device::init(p.USBD, identity);

    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(writer_task(usb.mouse_writer));
    spawner.must_spawn(operator_rx_task(op_rx));
    spawner.must_spawn(link_rx_task(link_rx));
    spawner.must_spawn(reply_task(op_tx, REPLY_CHANNEL.receiver()));
    spawner.must_spawn(dispatch_task(
        REPORT_CHANNEL.sender(),
        REPLY_CHANNEL.sender(),
    ));
}

#[embassy_executor::task]
async fn usb_task(
    device: embassy_usb::UsbDevice<
        'static,
        embassy_nrf::usb::Driver<
            'static,
            peripherals::USBD,
            embassy_nrf::usb::vbus_detect::HardwareVbusDetect,
        >,
    >,
) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn writer_task(
    writer: embassy_usb::class::hid::HidWriter<
        'static,
        embassy_nrf::usb::Driver<
            'static,
            peripherals::USBD,
            embassy_nrf::usb::vbus_detect::HardwareVbusDetect,
        >,
        8,
    >,
) -> ! {
    hid_device::mouse_writer_task(writer, &REPORT_CHANNEL.receiver()).await
}

#[embassy_executor::task]
async fn operator_rx_task(mut rx: uarte::UarteRx<'static, peripherals::UARTE0>) -> ! {
    pump_uart(&mut rx, &OPERATOR_RX).await
}

#[embassy_executor::task]
async fn link_rx_task(mut rx: uarte::UarteRx<'static, peripherals::UARTE1>) -> ! {
    pump_uart(&mut rx, &LINK_RX).await
}

/// Producer half of a channel: UART bytes into the receive ring.
async fn pump_uart<T: uarte::Instance>(
    rx: &mut uarte::UarteRx<'static, T>,
    ring: &'static RingBuffer<{ config::SERIAL_RING_CAPACITY }>,
) -> ! {
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => {
                if !ring.push(byte[0]) {
                    // Accepted loss mode; the counter tells the story.
                    warn!("serial ring overflow ({} total)", ring.overflows());
                }
            }
            Err(_e) => warn!("UART read error"),
        }
    }
}

/// Echo replies back to the operator console.
#[embassy_executor::task]
async fn reply_task(
    mut tx: uarte::UarteTx<'static, peripherals::UARTE0>,
    replies: Receiver<'static, CriticalSectionRawMutex, WireLine, 4>,
) -> ! {
    loop {
        let line = replies.receive().await;
        if tx.write(line.as_bytes()).await.is_err() || tx.write(b"\n").await.is_err() {
            warn!("operator UART write failed");
        }
    }
}

/// Drain both rings, assemble lines, decode and apply commands.
#[embassy_executor::task]
async fn dispatch_task(
    reports: Sender<'static, CriticalSectionRawMutex, MouseReport, 16>,
    replies: Sender<'static, CriticalSectionRawMutex, WireLine, 4>,
) -> ! {
    let mut mouse = ChannelMouse::new(reports);
    let mut actuator = MouseActuator::new();
    let mut operator_lines = LineAssembler::new();
    let mut link_lines = LineAssembler::new();

    loop {
        drain_channel(&OPERATOR_RX, &mut operator_lines, &mut actuator, &mut mouse, &replies);
        drain_channel(&LINK_RX, &mut link_lines, &mut actuator, &mut mouse, &replies);
        Timer::after_millis(1).await;
    }
}

fn drain_channel(
    ring: &'static RingBuffer<{ config::SERIAL_RING_CAPACITY }>,
    lines: &mut LineAssembler,
    actuator: &mut MouseActuator,
    mouse: &mut ChannelMouse,
    replies: &Sender<'static, CriticalSectionRawMutex, WireLine, 4>,
) {
    while let Some(byte) = ring.pop() {
        let Some(line) = lines.push(byte) else {
            continue;
        };
        let cmd = codec::decode(&line);
        match actuator.apply(&cmd, mouse) {
            Outcome::Done => {}
            Outcome::Reply(reply) => {
                if replies.try_send(reply).is_err() {
                    warn!("reply queue full, dropping reply");
                }
            }
            Outcome::Menu => {
                // The interactive configuration menu takes over the
                // operator console; it lives outside the relay core.
                info!("menu requested");
            }
        }
    }
}
