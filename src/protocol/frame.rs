//! Legacy fixed-size binary frame encoding.
//!
//! Layout v1, little-endian throughout:
//!
//! ```text
//! Byte 0:    tag (command discriminant, 0..=14)
//! Bytes 1-2: field a (i16) - dx / x
//! Bytes 3-4: field b (i16) - dy / y
//! Bytes 5-6: field c (i16) - wheel delta
//! ```
//!
//! Older firmware streamed the raw in-memory command struct; this layout
//! replaces that with an explicit field-by-field codec so both peers agree
//! regardless of platform. Tags match the original discriminant numbering
//! so a legacy peer's frames decode to the same commands. The extended
//! curved-move parameters and the debug toggle exist only in the text
//! encoding.

use crate::protocol::{Button, Command};

/// Payload bytes following the tag.
pub const PAYLOAD_LEN: usize = 6;

/// Total frame length on the wire.
pub const FRAME_LEN: usize = 1 + PAYLOAD_LEN;

/// Highest valid tag value; anything above signals desynchronization.
pub const TAG_MAX: u8 = 14;

const TAG_MOVE: u8 = 0;
const TAG_MOVETO: u8 = 1;
const TAG_GETPOS: u8 = 2;
const TAG_LEFT_DOWN: u8 = 3;
const TAG_LEFT_UP: u8 = 4;
const TAG_RIGHT_DOWN: u8 = 5;
const TAG_RIGHT_UP: u8 = 6;
const TAG_MIDDLE_DOWN: u8 = 7;
const TAG_MIDDLE_UP: u8 = 8;
const TAG_SIDE1_DOWN: u8 = 9;
const TAG_SIDE1_UP: u8 = 10;
const TAG_SIDE2_DOWN: u8 = 11;
const TAG_SIDE2_UP: u8 = 12;
const TAG_WHEEL: u8 = 13;
const TAG_CHANGE_DEVICE: u8 = 14;

/// Decode a frame from its tag and payload.
///
/// Returns `None` for tags above [`TAG_MAX`]; the caller treats that as a
/// desynchronized stream, not as a decodable `Unknown` command.
pub fn decode(tag: u8, payload: &[u8; PAYLOAD_LEN]) -> Option<Command> {
    let a = i16::from_le_bytes([payload[0], payload[1]]);
    let b = i16::from_le_bytes([payload[2], payload[3]]);
    let c = i16::from_le_bytes([payload[4], payload[5]]);

    let button = |button, pressed| Command::Button { button, pressed };

    Some(match tag {
        TAG_MOVE => Command::move_rel(a, b),
        TAG_MOVETO => Command::MoveTo { x: a, y: b },
        TAG_GETPOS => Command::GetPos,
        TAG_LEFT_DOWN => button(Button::Left, true),
        TAG_LEFT_UP => button(Button::Left, false),
        TAG_RIGHT_DOWN => button(Button::Right, true),
        TAG_RIGHT_UP => button(Button::Right, false),
        TAG_MIDDLE_DOWN => button(Button::Middle, true),
        TAG_MIDDLE_UP => button(Button::Middle, false),
        TAG_SIDE1_DOWN => button(Button::Forward, true),
        TAG_SIDE1_UP => button(Button::Forward, false),
        TAG_SIDE2_DOWN => button(Button::Back, true),
        TAG_SIDE2_UP => button(Button::Back, false),
        TAG_WHEEL => Command::Wheel { delta: c },
        TAG_CHANGE_DEVICE => Command::ChangeDevice,
        _ => return None,
    })
}

/// Encode a command into a frame buffer.
///
/// Returns `None` for commands the legacy encoding cannot carry
/// (`Debug`, `Unknown`). Curved-move parameters are dropped; only the
/// total displacement survives, which is all the legacy peers understood.
pub fn encode(cmd: &Command, buf: &mut [u8; FRAME_LEN]) -> Option<()> {
    let (tag, a, b, c) = match *cmd {
        Command::Move { dx, dy, .. } => (TAG_MOVE, dx, dy, 0),
        Command::MoveTo { x, y } => (TAG_MOVETO, x, y, 0),
        Command::GetPos => (TAG_GETPOS, 0, 0, 0),
        Command::Button { button, pressed } => {
            let tag = match (button, pressed) {
                (Button::Left, true) => TAG_LEFT_DOWN,
                (Button::Left, false) => TAG_LEFT_UP,
                (Button::Right, true) => TAG_RIGHT_DOWN,
                (Button::Right, false) => TAG_RIGHT_UP,
                (Button::Middle, true) => TAG_MIDDLE_DOWN,
                (Button::Middle, false) => TAG_MIDDLE_UP,
                (Button::Forward, true) => TAG_SIDE1_DOWN,
                (Button::Forward, false) => TAG_SIDE1_UP,
                (Button::Back, true) => TAG_SIDE2_DOWN,
                (Button::Back, false) => TAG_SIDE2_UP,
            };
            (tag, 0, 0, 0)
        }
        Command::Wheel { delta } => (TAG_WHEEL, 0, 0, delta),
        Command::ChangeDevice => (TAG_CHANGE_DEVICE, 0, 0, 0),
        Command::Debug { .. } | Command::Unknown => return None,
    };

    buf[0] = tag;
    buf[1..3].copy_from_slice(&a.to_le_bytes());
    buf[3..5].copy_from_slice(&b.to_le_bytes());
    buf[5..7].copy_from_slice(&c.to_le_bytes());
    Some(())
}
