//! USB enumeration session and device lifecycle.
//!
//! One session per physical connection. The session reacts to driver
//! events: device-connect opens the device and walks its configuration
//! descriptor (claiming interfaces, setting up interrupt-IN transfers,
//! requesting the HID report descriptor), transfer completions feed the
//! report pipeline, and device-gone tears everything down. The
//! inactivity monitor drives suspend/resume through control requests.

use crate::config::{MAX_INTERFACES, MAX_TRANSFERS};
use crate::host::pipeline::ReportPipeline;
use crate::host::power::PowerMonitor;
use crate::host::{
    descriptor, HostDriver, HostEvent, ReportLayout, SetupPacket, TransferId,
    DESCRIPTOR_HID_REPORT, REQUEST_GET_DESCRIPTOR, REQUEST_GET_STATUS,
};
use crate::protocol::Command;

/// Descriptor type codes seen during the configuration walk.
const DESC_DEVICE: u8 = 0x01;
const DESC_CONFIGURATION: u8 = 0x02;
const DESC_STRING: u8 = 0x03;
const DESC_INTERFACE: u8 = 0x04;
const DESC_ENDPOINT: u8 = 0x05;
const DESC_INTERFACE_ASSOC: u8 = 0x0B;
const DESC_HID: u8 = 0x21;

/// Interface class triple of a boot-protocol mouse.
const CLASS_HID: u8 = 0x03;
const SUBCLASS_BOOT: u8 = 0x01;
const PROTOCOL_MOUSE: u8 = 0x02;

/// Endpoint attribute bits: transfer type mask and interrupt type.
const EP_ATTR_TYPE_MASK: u8 = 0x03;
const EP_ATTR_INTERRUPT: u8 = 0x03;
const EP_DIR_IN: u8 = 0x80;

/// Upper bound on the configuration descriptor we walk.
const CONFIG_DESC_CAPACITY: usize = 256;

/// Connection lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Disconnected,
    /// Device opened, configuration walk in progress.
    DescriptorWalk,
    /// Transfers submitted, reports flowing.
    Ready,
    /// Suspended after inactivity; wakes on the next report.
    Suspended,
}

/// Interface identity recorded per endpoint number, so a completed
/// transfer can be routed without re-walking descriptors.
#[derive(Clone, Copy, Default)]
struct EndpointInfo {
    interface: u8,
    class: u8,
    subclass: u8,
    protocol: u8,
}

impl EndpointInfo {
    fn is_boot_mouse(&self) -> bool {
        self.class == CLASS_HID && self.subclass == SUBCLASS_BOOT && self.protocol == PROTOCOL_MOUSE
    }
}

/// Per-connection enumeration and relay state.
pub struct EnumerationSession {
    phase: Phase,
    claimed: heapless::Vec<u8, MAX_INTERFACES>,
    transfers: heapless::Vec<TransferId, MAX_TRANSFERS>,
    /// Indexed by endpoint number (0..=15, plus the control endpoint).
    endpoints: [EndpointInfo; 17],
    layout: Option<ReportLayout>,
    pipeline: ReportPipeline,
    power: PowerMonitor,
    // Interface currently being walked; endpoints inherit it.
    walk_interface: EndpointInfo,
    walk_claim_ok: bool,
}

impl EnumerationSession {
    pub fn new(now_ms: u64) -> Self {
        Self {
            phase: Phase::Disconnected,
            claimed: heapless::Vec::new(),
            transfers: heapless::Vec::new(),
            endpoints: [EndpointInfo::default(); 17],
            layout: None,
            pipeline: ReportPipeline::new(),
            power: PowerMonitor::new(now_ms),
            walk_interface: EndpointInfo::default(),
            walk_claim_ok: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn layout(&self) -> Option<&ReportLayout> {
        self.layout.as_ref()
    }

    /// Process one driver event.
    ///
    /// Relay commands produced by completed reports are handed to `out`
    /// in arrival order.
    pub fn handle_event<D: HostDriver>(
        &mut self,
        drv: &mut D,
        event: HostEvent<'_>,
        now_ms: u64,
        out: &mut impl FnMut(Command),
    ) {
        match event {
            HostEvent::NewDevice { address } => self.on_new_device(drv, address, now_ms),
            HostEvent::DeviceGone => self.teardown(drv),
            HostEvent::ControlIn { setup, data } => self.on_control(setup, data),
            HostEvent::TransferIn { id, endpoint, data } => {
                self.on_transfer(drv, id, endpoint, data, now_ms, out)
            }
        }
    }

    /// Periodic tick from the polling task (every 100 ms or so);
    /// initiates suspend after prolonged inactivity.
    pub fn poll<D: HostDriver>(&mut self, drv: &mut D, now_ms: u64) {
        if self.phase != Phase::Ready || !self.power.should_suspend(now_ms) {
            return;
        }

        match drv.submit_control(SetupPacket::set_remote_wakeup()) {
            Ok(()) => {
                self.power.note_suspended();
                self.phase = Phase::Suspended;
                #[cfg(feature = "defmt")]
                defmt::info!("no activity, suspending device");
                // Best-effort confirmation; a failure is only logged.
                if drv.submit_control(SetupPacket::device_status()).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("status query after suspend failed");
                }
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("suspend request failed");
            }
        }
    }

    fn on_new_device<D: HostDriver>(&mut self, drv: &mut D, address: u8, now_ms: u64) {
        if self.phase != Phase::Disconnected {
            return;
        }
        if drv.open_device(address).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("device open failed for address {}", address);
            return;
        }
        self.phase = Phase::DescriptorWalk;
        self.power = PowerMonitor::new(now_ms);

        let mut buf = [0u8; CONFIG_DESC_CAPACITY];
        match drv.config_descriptor(&mut buf) {
            Ok(len) => {
                let len = len.min(buf.len());
                self.walk_config(drv, &buf[..len]);
                self.phase = Phase::Ready;
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("configuration descriptor unavailable");
                self.teardown(drv);
            }
        }
    }

    /// Iterate the configuration descriptor by each item's self-declared
    /// length, dispatching on the descriptor type.
    fn walk_config<D: HostDriver>(&mut self, drv: &mut D, data: &[u8]) {
        self.walk_claim_ok = false;

        let mut i = 0;
        while i + 2 <= data.len() {
            let len = usize::from(data[i]);
            if len < 2 || i + len > data.len() {
                break;
            }
            let item = &data[i..i + len];
            match item[1] {
                DESC_INTERFACE => self.on_interface(drv, item),
                DESC_ENDPOINT => self.on_endpoint(drv, item),
                DESC_HID => self.on_hid(drv, item),
                DESC_DEVICE | DESC_CONFIGURATION | DESC_STRING | DESC_INTERFACE_ASSOC => {}
                _other => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("skipping descriptor type {:#x}", _other);
                }
            }
            i += len;
        }
    }

    fn on_interface<D: HostDriver>(&mut self, drv: &mut D, item: &[u8]) {
        if item.len() < 9 {
            return;
        }
        let number = item[2];
        let alt_setting = item[3];

        match drv.claim_interface(number, alt_setting) {
            Ok(()) => {
                self.walk_claim_ok = true;
                self.walk_interface = EndpointInfo {
                    interface: number,
                    class: item[5],
                    subclass: item[6],
                    protocol: item[7],
                };
                let _ = self.claimed.push(number);
            }
            Err(_e) => {
                // Keep walking: one refused interface must not stop the
                // rest of the device from enumerating.
                self.walk_claim_ok = false;
                #[cfg(feature = "defmt")]
                defmt::warn!("interface {} claim failed, skipping", number);
            }
        }
    }

    fn on_endpoint<D: HostDriver>(&mut self, drv: &mut D, item: &[u8]) {
        if item.len() < 7 || !self.walk_claim_ok {
            return;
        }
        let address = item[2];
        let attributes = item[3];
        let max_packet = u16::from_le_bytes([item[4], item[5]]);

        let ep_num = usize::from(address & 0x0F);
        self.endpoints[ep_num] = self.walk_interface;

        if attributes & EP_ATTR_TYPE_MASK != EP_ATTR_INTERRUPT || address & EP_DIR_IN == 0 {
            return;
        }

        match drv.alloc_transfer(address, usize::from(max_packet)) {
            Ok(id) => {
                if self.transfers.push(id).is_err() {
                    drv.free_transfer(id);
                    return;
                }
                if drv.submit_transfer(id).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("initial submit failed on endpoint {:#x}", address);
                }
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("transfer alloc failed on endpoint {:#x}", address);
            }
        }
    }

    fn on_hid<D: HostDriver>(&mut self, drv: &mut D, item: &[u8]) {
        if item.len() < 9 || !self.walk_claim_ok {
            return;
        }
        let report_len = u16::from_le_bytes([item[7], item[8]]);
        let setup = SetupPacket::interface_descriptor(
            DESCRIPTOR_HID_REPORT,
            u16::from(self.walk_interface.interface),
            report_len,
        );
        if drv.submit_control(setup).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "report descriptor request failed on interface {}",
                self.walk_interface.interface
            );
        }
    }

    fn on_control(&mut self, setup: SetupPacket, data: &[u8]) {
        match setup.request {
            REQUEST_GET_DESCRIPTOR if (setup.value >> 8) as u8 == DESCRIPTOR_HID_REPORT => {
                if !descriptor::is_mouse_descriptor(data) {
                    return;
                }
                self.layout = descriptor::parse(data);
                if self.layout.is_none() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("mouse descriptor with no recognizable fields");
                }
            }
            REQUEST_GET_STATUS if data.len() >= 2 => {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "device status {:#x}",
                    u16::from_le_bytes([data[0], data[1]])
                );
            }
            _ => {}
        }
    }

    fn on_transfer<D: HostDriver>(
        &mut self,
        drv: &mut D,
        id: TransferId,
        endpoint: u8,
        data: &[u8],
        now_ms: u64,
        out: &mut impl FnMut(Command),
    ) {
        if self.phase == Phase::Disconnected {
            return;
        }

        if !data.is_empty() {
            self.power.activity(now_ms);
            if self.power.is_suspended() {
                self.resume(drv, now_ms);
            }
        }

        let info = self.endpoints[usize::from(endpoint & 0x0F)];
        if info.is_boot_mouse() {
            if let Some(layout) = self.layout {
                for cmd in self.pipeline.process(&layout, data) {
                    out(cmd);
                }
            }
        }

        // Transfers are self-resubmitting while the device is awake.
        if !self.power.is_suspended() && drv.submit_transfer(id).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("resubmit failed on endpoint {:#x}", endpoint);
        }
    }

    fn resume<D: HostDriver>(&mut self, drv: &mut D, now_ms: u64) {
        if drv.submit_control(SetupPacket::clear_remote_wakeup()).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("resume request failed");
        }
        self.power.note_resumed(now_ms);
        self.phase = Phase::Ready;
        if drv.submit_control(SetupPacket::device_status()).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("status query after resume failed");
        }
    }

    /// Release every claimed resource and return to `Disconnected`.
    ///
    /// Runs synchronously so no stale transfer or layout survives into
    /// the next enumeration.
    fn teardown<D: HostDriver>(&mut self, drv: &mut D) {
        for id in self.transfers.iter().copied() {
            drv.free_transfer(id);
        }
        self.transfers.clear();

        for iface in self.claimed.iter().copied() {
            if drv.release_interface(iface).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("interface {} release failed", iface);
            }
        }
        self.claimed.clear();

        if drv.close_device().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("device close failed");
        }

        self.endpoints = [EndpointInfo::default(); 17];
        self.layout = None;
        self.pipeline.reset();
        self.phase = Phase::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SUSPEND_TIMEOUT_MS;
    use crate::error::Error;
    use crate::host::{REQUEST_CLEAR_FEATURE, REQUEST_SET_FEATURE};
    use crate::protocol::Button;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Call {
        Open(u8),
        Close,
        Claim(u8),
        Release(u8),
        Alloc(u8),
        Submit(TransferId),
        Free(TransferId),
    }

    /// Scripted stand-in for the host controller driver.
    struct MockDriver {
        config: std::vec::Vec<u8>,
        refuse_claims: std::vec::Vec<u8>,
        calls: std::vec::Vec<Call>,
        controls: std::vec::Vec<SetupPacket>,
        next_transfer: TransferId,
    }

    impl MockDriver {
        fn new(config: std::vec::Vec<u8>) -> Self {
            Self {
                config,
                refuse_claims: vec![],
                calls: vec![],
                controls: vec![],
                next_transfer: 0,
            }
        }

        fn submits_of(&self, id: TransferId) -> usize {
            self.calls
                .iter()
                .filter(|c| **c == Call::Submit(id))
                .count()
        }
    }

    impl HostDriver for MockDriver {
        fn open_device(&mut self, address: u8) -> Result<(), Error> {
            self.calls.push(Call::Open(address));
            Ok(())
        }
        fn close_device(&mut self) -> Result<(), Error> {
            self.calls.push(Call::Close);
            Ok(())
        }
        fn config_descriptor(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
            let n = self.config.len().min(buf.len());
            buf[..n].copy_from_slice(&self.config[..n]);
            Ok(n)
        }
        fn claim_interface(&mut self, interface: u8, _alt: u8) -> Result<(), Error> {
            self.calls.push(Call::Claim(interface));
            if self.refuse_claims.contains(&interface) {
                Err(Error::ClaimFailed(interface))
            } else {
                Ok(())
            }
        }
        fn release_interface(&mut self, interface: u8) -> Result<(), Error> {
            self.calls.push(Call::Release(interface));
            Ok(())
        }
        fn submit_control(&mut self, setup: SetupPacket) -> Result<(), Error> {
            self.controls.push(setup);
            Ok(())
        }
        fn alloc_transfer(&mut self, endpoint: u8, _len: usize) -> Result<TransferId, Error> {
            self.calls.push(Call::Alloc(endpoint));
            let id = self.next_transfer;
            self.next_transfer += 1;
            Ok(id)
        }
        fn submit_transfer(&mut self, id: TransferId) -> Result<(), Error> {
            self.calls.push(Call::Submit(id));
            Ok(())
        }
        fn free_transfer(&mut self, id: TransferId) {
            self.calls.push(Call::Free(id));
        }
    }

    fn interface(number: u8, class: u8, subclass: u8, protocol: u8) -> [u8; 9] {
        [9, DESC_INTERFACE, number, 0, 1, class, subclass, protocol, 0]
    }

    fn hid(report_len: u16) -> [u8; 9] {
        let l = report_len.to_le_bytes();
        [9, DESC_HID, 0x11, 0x01, 0x00, 0x01, 0x22, l[0], l[1]]
    }

    fn endpoint(address: u8, attributes: u8, max_packet: u16) -> [u8; 7] {
        let m = max_packet.to_le_bytes();
        [7, DESC_ENDPOINT, address, attributes, m[0], m[1], 1]
    }

    /// Mouse on interface 0 (EP 0x81) plus a second HID interface (EP 0x82).
    fn composite_config() -> std::vec::Vec<u8> {
        let mut c = vec![9, DESC_CONFIGURATION, 0, 0, 2, 1, 0, 0xA0, 0x96];
        c.extend(interface(0, CLASS_HID, SUBCLASS_BOOT, PROTOCOL_MOUSE));
        c.extend(hid(0x43));
        c.extend(endpoint(0x81, EP_ATTR_INTERRUPT, 8));
        c.extend(interface(1, CLASS_HID, 0, 0));
        c.extend(hid(0x97));
        c.extend(endpoint(0x82, EP_ATTR_INTERRUPT, 20));
        let total = (c.len() as u16).to_le_bytes();
        c[2] = total[0];
        c[3] = total[1];
        c
    }

    /// Minimal mouse report descriptor accepted by the parser.
    fn mouse_report_descriptor() -> std::vec::Vec<u8> {
        vec![
            0x05, 0x01, 0x09, 0x02, 0xA1, 0x01, // mouse collection
            0x05, 0x09, 0x15, 0x00, 0x25, 0x01, // buttons
            0x95, 0x08, 0x75, 0x01, 0x81, 0x02, // 8 x 1 bit
            0x05, 0x01, 0x09, 0x30, 0x09, 0x31, // X, Y
            0x25, 0x7F, 0x75, 0x08, 0x95, 0x02, 0x81, 0x06,
            0x09, 0x38, 0x25, 0x7F, 0x75, 0x08, 0x95, 0x01, 0x81, 0x06, // wheel
            0xC0,
        ]
    }

    fn report_setup() -> SetupPacket {
        SetupPacket::interface_descriptor(DESCRIPTOR_HID_REPORT, 0, 0x43)
    }

    fn connect(session: &mut EnumerationSession, drv: &mut MockDriver) {
        let mut sink = |_c: Command| {};
        session.handle_event(drv, HostEvent::NewDevice { address: 1 }, 0, &mut sink);
        let desc = mouse_report_descriptor();
        session.handle_event(
            drv,
            HostEvent::ControlIn {
                setup: report_setup(),
                data: &desc,
            },
            0,
            &mut sink,
        );
    }

    #[test]
    fn enumeration_reaches_ready_and_submits_transfers() {
        let mut drv = MockDriver::new(composite_config());
        let mut session = EnumerationSession::new(0);
        connect(&mut session, &mut drv);

        assert_eq!(session.phase(), Phase::Ready);
        assert!(drv.calls.contains(&Call::Open(1)));
        assert!(drv.calls.contains(&Call::Claim(0)));
        assert!(drv.calls.contains(&Call::Claim(1)));
        assert!(drv.calls.contains(&Call::Alloc(0x81)));
        assert!(drv.calls.contains(&Call::Alloc(0x82)));
        // Both transfers got their initial submit.
        assert_eq!(drv.submits_of(0), 1);
        assert_eq!(drv.submits_of(1), 1);
        // One report-descriptor request per HID interface.
        let report_requests = drv
            .controls
            .iter()
            .filter(|s| s.request == REQUEST_GET_DESCRIPTOR)
            .count();
        assert_eq!(report_requests, 2);
        // Layout is in place after the control completion.
        assert!(session.layout().is_some());
    }

    #[test]
    fn claim_failure_skips_interface_but_not_the_rest() {
        let mut drv = MockDriver::new(composite_config());
        drv.refuse_claims.push(0);
        let mut session = EnumerationSession::new(0);
        connect(&mut session, &mut drv);

        assert_eq!(session.phase(), Phase::Ready);
        // The mouse endpoint was skipped, the second interface was not.
        assert!(!drv.calls.contains(&Call::Alloc(0x81)));
        assert!(drv.calls.contains(&Call::Alloc(0x82)));
    }

    #[test]
    fn non_mouse_report_descriptor_is_ignored() {
        let mut drv = MockDriver::new(composite_config());
        let mut session = EnumerationSession::new(0);
        let mut sink = |_c: Command| {};
        session.handle_event(&mut drv, HostEvent::NewDevice { address: 1 }, 0, &mut sink);

        let keyboard = [0x05u8, 0x01, 0x09, 0x06, 0xA1, 0x01, 0xC0];
        session.handle_event(
            &mut drv,
            HostEvent::ControlIn {
                setup: report_setup(),
                data: &keyboard,
            },
            0,
            &mut sink,
        );
        assert!(session.layout().is_none());
    }

    #[test]
    fn transfers_emit_commands_and_resubmit() {
        let mut drv = MockDriver::new(composite_config());
        let mut session = EnumerationSession::new(0);
        connect(&mut session, &mut drv);

        let mut cmds = vec![];
        session.handle_event(
            &mut drv,
            HostEvent::TransferIn {
                id: 0,
                endpoint: 0x81,
                data: &[0x01, 0, 0, 0],
            },
            10,
            &mut |c| cmds.push(c),
        );
        session.handle_event(
            &mut drv,
            HostEvent::TransferIn {
                id: 0,
                endpoint: 0x81,
                data: &[0x00, 5, 0xFB, 0],
            },
            20,
            &mut |c| cmds.push(c),
        );

        assert_eq!(
            cmds,
            vec![
                Command::Button {
                    button: Button::Left,
                    pressed: true,
                },
                Command::Button {
                    button: Button::Left,
                    pressed: false,
                },
                Command::move_rel(5, -5),
            ]
        );
        // Initial submit plus one resubmit per completion.
        assert_eq!(drv.submits_of(0), 3);
    }

    #[test]
    fn non_mouse_endpoint_produces_no_commands() {
        let mut drv = MockDriver::new(composite_config());
        let mut session = EnumerationSession::new(0);
        connect(&mut session, &mut drv);

        let mut cmds = vec![];
        session.handle_event(
            &mut drv,
            HostEvent::TransferIn {
                id: 1,
                endpoint: 0x82,
                data: &[0x01, 2, 3, 4],
            },
            10,
            &mut |c| cmds.push(c),
        );
        assert!(cmds.is_empty());
        // It still resubmits; the endpoint just is not the mouse.
        assert_eq!(drv.submits_of(1), 2);
    }

    #[test]
    fn idle_device_is_suspended_and_wakes_on_input() {
        let mut drv = MockDriver::new(composite_config());
        let mut session = EnumerationSession::new(0);
        connect(&mut session, &mut drv);

        session.poll(&mut drv, SUSPEND_TIMEOUT_MS + 1);
        assert_eq!(session.phase(), Phase::Suspended);
        assert!(drv
            .controls
            .iter()
            .any(|s| s.request == REQUEST_SET_FEATURE));
        // Best-effort status query followed the suspend.
        assert!(drv
            .controls
            .iter()
            .any(|s| s.request == REQUEST_GET_STATUS));

        // Suspended: completions are not resubmitted.
        let submits_before = drv.submits_of(0);
        let mut cmds = vec![];
        session.handle_event(
            &mut drv,
            HostEvent::TransferIn {
                id: 0,
                endpoint: 0x81,
                data: &[],
            },
            SUSPEND_TIMEOUT_MS + 2,
            &mut |c| cmds.push(c),
        );
        assert_eq!(drv.submits_of(0), submits_before);
        assert_eq!(session.phase(), Phase::Suspended);

        // A report with payload wakes the device back up.
        session.handle_event(
            &mut drv,
            HostEvent::TransferIn {
                id: 0,
                endpoint: 0x81,
                data: &[0, 1, 0, 0],
            },
            SUSPEND_TIMEOUT_MS + 3,
            &mut |c| cmds.push(c),
        );
        assert_eq!(session.phase(), Phase::Ready);
        assert!(drv
            .controls
            .iter()
            .any(|s| s.request == REQUEST_CLEAR_FEATURE));
        assert_eq!(cmds, vec![Command::move_rel(1, 0)]);
        assert_eq!(drv.submits_of(0), submits_before + 1);
    }

    #[test]
    fn device_gone_releases_everything() {
        let mut drv = MockDriver::new(composite_config());
        let mut session = EnumerationSession::new(0);
        connect(&mut session, &mut drv);

        let mut sink = |_c: Command| {};
        session.handle_event(&mut drv, HostEvent::DeviceGone, 100, &mut sink);

        assert_eq!(session.phase(), Phase::Disconnected);
        assert!(session.layout().is_none());
        assert!(drv.calls.contains(&Call::Free(0)));
        assert!(drv.calls.contains(&Call::Free(1)));
        assert!(drv.calls.contains(&Call::Release(0)));
        assert!(drv.calls.contains(&Call::Release(1)));
        assert!(drv.calls.contains(&Call::Close));

        // A fresh connect enumerates cleanly afterwards.
        connect(&mut session, &mut drv);
        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.layout().is_some());
    }
}
