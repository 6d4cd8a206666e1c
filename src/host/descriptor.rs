//! HID Report Descriptor parsing.
//!
//! Walks the TLV item stream of a report descriptor and derives where the
//! button, X/Y and wheel fields sit inside an input report. Field widths
//! are inferred from `LOGICAL_MAXIMUM` the same way the relay always has:
//!
//! - axes: `<= 127` → 8-bit, `<= 2047` → packed 12-bit X/Y pair
//!   (spanning three bytes, X low), else 16-bit;
//! - wheel: `<= 127` → 8-bit, else 16-bit.
//!
//! This is a heuristic. It matches the conventional consumer-mouse
//! descriptor shape; descriptors with several report IDs or non-mouse
//! collections are not disambiguated - the last REPORT_ID item seen is
//! recorded and a single mouse-shaped collection is assumed.

/// Usage page codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum UsagePage {
    GenericDesktop,
    Button,
    Unknown(u16),
}

impl From<u16> for UsagePage {
    fn from(code: u16) -> Self {
        match code {
            0x01 => UsagePage::GenericDesktop,
            0x09 => UsagePage::Button,
            other => UsagePage::Unknown(other),
        }
    }
}

/// Generic Desktop usages the relay cares about.
const USAGE_X: u16 = 0x30;
const USAGE_Y: u16 = 0x31;
const USAGE_WHEEL: u16 = 0x38;

/// Field layout of one mouse input report.
///
/// Start offsets are byte indices into the raw report (the leading
/// report-ID byte, when present, is already accounted for). Immutable
/// between device connect and disconnect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportLayout {
    pub button_start: u8,
    pub button_bits: u8,
    pub x_start: u8,
    pub x_bits: u8,
    pub y_start: u8,
    pub y_bits: u8,
    pub wheel_start: u8,
    pub wheel_bits: u8,
    pub report_id: Option<u8>,
}

impl ReportLayout {
    /// True when X and Y form the packed 12-bit pair.
    pub fn packed_axes(&self) -> bool {
        self.x_bits == 12 && self.y_bits == 12
    }
}

/// Parse a raw report descriptor into a field layout.
///
/// Returns `None` when no axis or button input was recognized.
pub fn parse(data: &[u8]) -> Option<ReportLayout> {
    let mut layout = ReportLayout::default();
    let mut found_any = false;

    // Running item state.
    let mut usage_page = UsagePage::Unknown(0);
    let mut usage: u16 = 0;
    let mut report_size: u16 = 0;
    let mut report_count: u16 = 0;
    let mut logical_max: i32 = 0;
    let mut _collection_depth: u8 = 0;
    let mut bit_offset: u16 = 0;

    let mut i = 0;
    while i < data.len() {
        let prefix = data[i];
        let size = match prefix & 0x03 {
            3 => 4,
            s => s as usize,
        };
        if i + 1 + size > data.len() {
            break;
        }
        // Tag + type, payload size bits masked off.
        let item = prefix & 0xFC;

        let payload = &data[i + 1..i + 1 + size];
        let unsigned = read_unsigned(payload);
        let signed = read_signed(payload);

        match item {
            // USAGE_PAGE
            0x04 => usage_page = UsagePage::from(unsigned as u16),
            // USAGE (local)
            0x08 => usage = unsigned as u16,
            // LOGICAL_MAXIMUM
            0x24 => logical_max = signed,
            // REPORT_SIZE
            0x74 => report_size = unsigned as u16,
            // REPORT_COUNT
            0x94 => report_count = unsigned as u16,
            // REPORT_ID: occupies the first report byte.
            0x84 => {
                layout.report_id = Some(unsigned as u8);
                bit_offset += 8;
            }
            // COLLECTION / END_COLLECTION
            0xA0 => _collection_depth = _collection_depth.saturating_add(1),
            0xC0 => _collection_depth = _collection_depth.saturating_sub(1),
            // INPUT: the accumulated state describes the next field(s).
            0x80 => match (usage_page, usage) {
                (UsagePage::GenericDesktop, USAGE_X) | (UsagePage::GenericDesktop, USAGE_Y) => {
                    if logical_max <= 127 {
                        layout.x_bits = 8;
                        layout.y_bits = 8;
                    } else if logical_max <= 2047 {
                        layout.x_bits = 12;
                        layout.y_bits = 12;
                    } else {
                        layout.x_bits = 16;
                        layout.y_bits = 16;
                    }
                    layout.x_start = (bit_offset / 8) as u8;
                    bit_offset += u16::from(layout.x_bits);
                    layout.y_start = (bit_offset / 8) as u8;
                    bit_offset += u16::from(layout.y_bits);
                    found_any = true;
                }
                (UsagePage::GenericDesktop, USAGE_WHEEL) => {
                    layout.wheel_bits = if logical_max <= 127 { 8 } else { 16 };
                    layout.wheel_start = (bit_offset / 8) as u8;
                    bit_offset += u16::from(layout.wheel_bits);
                    found_any = true;
                }
                (UsagePage::Button, u) if (1..=16).contains(&u) => {
                    // Button block plus its constant padding arrive as
                    // separate INPUT items; accumulate both so the next
                    // field starts on the right byte.
                    let bits = report_count * report_size;
                    if layout.button_bits == 0 {
                        layout.button_start = (bit_offset / 8) as u8;
                    }
                    layout.button_bits = layout.button_bits.saturating_add(bits as u8);
                    bit_offset += bits;
                    found_any = true;
                }
                _ => {}
            },
            _ => {}
        }

        i += 1 + size;
    }

    found_any.then_some(layout)
}

fn read_unsigned(payload: &[u8]) -> u32 {
    let mut value: u32 = 0;
    for (i, &b) in payload.iter().enumerate() {
        value |= u32::from(b) << (8 * i);
    }
    value
}

fn read_signed(payload: &[u8]) -> i32 {
    match payload.len() {
        1 => i32::from(payload[0] as i8),
        2 => i32::from(i16::from_le_bytes([payload[0], payload[1]])),
        4 => i32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]),
        _ => 0,
    }
}

/// Signature every mouse report descriptor opens with:
/// Usage Page (Generic Desktop), Usage (Mouse).
const MOUSE_SIGNATURE: [u8; 4] = [0x05, 0x01, 0x09, 0x02];

/// Scan a report descriptor for the mouse usage signature.
///
/// Cheap pre-filter run on the raw control-transfer payload before the
/// full parse, so keyboards and vendor collections are ignored outright.
pub fn is_mouse_descriptor(data: &[u8]) -> bool {
    data.windows(MOUSE_SIGNATURE.len())
        .any(|w| w == MOUSE_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8 buttons, 8-bit X/Y, 8-bit wheel; the classic 4-byte report.
    const EIGHT_BIT_MOUSE: &[u8] = &[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x02, // Usage (Mouse)
        0xA1, 0x01, // Collection (Application)
        0x09, 0x01, //   Usage (Pointer)
        0xA1, 0x00, //   Collection (Physical)
        0x05, 0x09, //     Usage Page (Buttons)
        0x19, 0x01, //     Usage Minimum (1)
        0x29, 0x08, //     Usage Maximum (8)
        0x15, 0x00, //     Logical Minimum (0)
        0x25, 0x01, //     Logical Maximum (1)
        0x95, 0x08, //     Report Count (8)
        0x75, 0x01, //     Report Size (1)
        0x81, 0x02, //     Input (Data, Variable, Absolute)
        0x05, 0x01, //     Usage Page (Generic Desktop)
        0x09, 0x30, //     Usage (X)
        0x09, 0x31, //     Usage (Y)
        0x15, 0x81, //     Logical Minimum (-127)
        0x25, 0x7F, //     Logical Maximum (127)
        0x75, 0x08, //     Report Size (8)
        0x95, 0x02, //     Report Count (2)
        0x81, 0x06, //     Input (Data, Variable, Relative)
        0x09, 0x38, //     Usage (Wheel)
        0x15, 0x81, //     Logical Minimum (-127)
        0x25, 0x7F, //     Logical Maximum (127)
        0x75, 0x08, //     Report Size (8)
        0x95, 0x01, //     Report Count (1)
        0x81, 0x06, //     Input (Data, Variable, Relative)
        0xC0, //   End Collection
        0xC0, // End Collection
    ];

    /// Gaming-mouse shape: report ID, 5 buttons + padding, 12-bit axes.
    const TWELVE_BIT_MOUSE: &[u8] = &[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x02, // Usage (Mouse)
        0xA1, 0x01, // Collection (Application)
        0x85, 0x01, //   Report ID (1)
        0x09, 0x01, //   Usage (Pointer)
        0xA1, 0x00, //   Collection (Physical)
        0x05, 0x09, //     Usage Page (Buttons)
        0x19, 0x01, //     Usage Minimum (1)
        0x29, 0x05, //     Usage Maximum (5)
        0x15, 0x00, //     Logical Minimum (0)
        0x25, 0x01, //     Logical Maximum (1)
        0x95, 0x05, //     Report Count (5)
        0x75, 0x01, //     Report Size (1)
        0x81, 0x02, //     Input (Data, Variable, Absolute)
        0x95, 0x01, //     Report Count (1)
        0x75, 0x03, //     Report Size (3)
        0x81, 0x01, //     Input (Constant) - padding
        0x05, 0x01, //     Usage Page (Generic Desktop)
        0x09, 0x30, //     Usage (X)
        0x09, 0x31, //     Usage (Y)
        0x16, 0x01, 0xF8, // Logical Minimum (-2047)
        0x26, 0xFF, 0x07, // Logical Maximum (2047)
        0x75, 0x0C, //     Report Size (12)
        0x95, 0x02, //     Report Count (2)
        0x81, 0x06, //     Input (Data, Variable, Relative)
        0x09, 0x38, //     Usage (Wheel)
        0x15, 0x81, //     Logical Minimum (-127)
        0x25, 0x7F, //     Logical Maximum (127)
        0x75, 0x08, //     Report Size (8)
        0x95, 0x01, //     Report Count (1)
        0x81, 0x06, //     Input (Data, Variable, Relative)
        0xC0, //   End Collection
        0xC0, // End Collection
    ];

    #[test]
    fn eight_bit_mouse_layout() {
        let layout = parse(EIGHT_BIT_MOUSE).expect("recognized layout");
        assert_eq!(layout.button_bits, 8);
        assert_eq!(layout.x_bits, 8);
        assert_eq!(layout.y_bits, 8);
        assert_eq!(layout.wheel_bits, 8);
        assert_eq!(layout.report_id, None);

        // Strictly increasing, non-overlapping byte offsets.
        assert_eq!(layout.button_start, 0);
        assert_eq!(layout.x_start, 1);
        assert_eq!(layout.y_start, 2);
        assert_eq!(layout.wheel_start, 3);
        assert!(!layout.packed_axes());
    }

    #[test]
    fn twelve_bit_mouse_layout() {
        let layout = parse(TWELVE_BIT_MOUSE).expect("recognized layout");
        assert_eq!(layout.report_id, Some(1));
        // Report ID byte, then buttons (5 + 3 padding bits = byte 1).
        assert_eq!(layout.button_start, 1);
        assert_eq!(layout.button_bits, 8);
        // Packed axes start on byte 2, X low.
        assert!(layout.packed_axes());
        assert_eq!(layout.x_start, 2);
        assert_eq!(layout.y_start, 3);
        // 24 axis bits later the wheel starts on byte 5.
        assert_eq!(layout.wheel_start, 5);
        assert_eq!(layout.wheel_bits, 8);
    }

    #[test]
    fn sixteen_bit_axes_use_two_bytes_each() {
        // Same as the 8-bit descriptor but with Logical Maximum 32767.
        let mut desc: std::vec::Vec<u8> = EIGHT_BIT_MOUSE.to_vec();
        // Patch the axis LOGICAL_MAXIMUM item (0x25 0x7F) to 2 bytes.
        let pos = desc
            .windows(4)
            .position(|w| w == [0x25, 0x7F, 0x75, 0x08])
            .unwrap();
        desc.splice(pos..pos + 2, [0x26, 0xFF, 0x7F]);

        let layout = parse(&desc).expect("recognized layout");
        assert_eq!(layout.x_bits, 16);
        assert_eq!(layout.y_bits, 16);
        assert_eq!(layout.x_start, 1);
        assert_eq!(layout.y_start, 3);
        assert_eq!(layout.wheel_start, 5);
    }

    #[test]
    fn descriptor_without_recognized_fields_is_rejected() {
        // Keyboard-ish fragment: no mouse axes, no buttons.
        let desc = [0x05, 0x07, 0x19, 0xE0, 0x29, 0xE7, 0x81, 0x02];
        assert!(parse(&desc).is_none());
    }

    #[test]
    fn truncated_item_stops_the_scan() {
        // A 2-byte item prefix with only one payload byte present.
        let desc = [0x05, 0x01, 0x09, 0x02, 0x26, 0xFF];
        assert!(parse(&desc).is_none());
    }

    #[test]
    fn mouse_signature_scan() {
        assert!(is_mouse_descriptor(EIGHT_BIT_MOUSE));
        assert!(is_mouse_descriptor(TWELVE_BIT_MOUSE));
        assert!(!is_mouse_descriptor(&[0x05, 0x07, 0x09, 0x06]));
        assert!(!is_mouse_descriptor(&[]));
    }
}
