//! Text wire encoding of the command protocol.
//!
//! One ASCII command per line. Decoding matches a fixed prefix table and
//! scans numeric payloads permissively: anything that is not an integer
//! where one is expected becomes 0, and unrecognized lines become
//! [`Command::Unknown`] - the decoder never rejects input.
//!
//! Encoding produces the exact same grammar, so a command emitted by the
//! capture node decodes to an equal command on the injection node.

use core::fmt::Write;

use crate::protocol::{Button, Command};

/// One encoded command line (without terminator).
pub type WireLine = heapless::String<64>;

/// Decode a trimmed command line.
///
/// `km.moveto` is matched before `km.move` so both prefixes are reachable.
pub fn decode(line: &str) -> Command {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("km.moveto") {
        let [x, y] = scan_ints(rest);
        return Command::MoveTo { x, y };
    }
    if let Some(rest) = line.strip_prefix("km.move") {
        let [dx, dy, steps, ref_x, ref_y] = scan_ints(rest);
        return Command::Move {
            dx,
            dy,
            steps,
            ref_x,
            ref_y,
        };
    }
    if let Some(rest) = line.strip_prefix("km.wheel") {
        let [delta] = scan_ints(rest);
        return Command::Wheel { delta };
    }

    match line {
        "km.getpos" => return Command::GetPos,
        "menu" => return Command::ChangeDevice,
        "debug on" => return Command::Debug { enabled: true },
        "debug off" => return Command::Debug { enabled: false },
        _ => {}
    }

    const BUTTONS: [(&str, Button); 5] = [
        ("km.left", Button::Left),
        ("km.right", Button::Right),
        ("km.middle", Button::Middle),
        ("km.side1", Button::Forward),
        ("km.side2", Button::Back),
    ];
    for (name, button) in BUTTONS {
        if let Some(rest) = line.strip_prefix(name) {
            return match rest {
                "(1)" => Command::Button {
                    button,
                    pressed: true,
                },
                "(0)" => Command::Button {
                    button,
                    pressed: false,
                },
                _ => Command::Unknown,
            };
        }
    }

    Command::Unknown
}

/// Encode a command into its text wire form.
///
/// Returns `None` for commands that have no text representation
/// (`Unknown`). The extended five-argument move form is used whenever a
/// step count is present.
pub fn encode(cmd: &Command) -> Option<WireLine> {
    let mut s = WireLine::new();
    let ok = match *cmd {
        Command::Move {
            dx,
            dy,
            steps: 0,
            ..
        } => write!(s, "km.move({},{})", dx, dy).is_ok(),
        Command::Move {
            dx,
            dy,
            steps,
            ref_x,
            ref_y,
        } => write!(s, "km.move({},{},{},{},{})", dx, dy, steps, ref_x, ref_y).is_ok(),
        Command::MoveTo { x, y } => write!(s, "km.moveto({},{})", x, y).is_ok(),
        Command::GetPos => s.push_str("km.getpos").is_ok(),
        Command::Button { button, pressed } => {
            write!(s, "km.{}({})", button.wire_name(), pressed as u8).is_ok()
        }
        Command::Wheel { delta } => write!(s, "km.wheel({})", delta).is_ok(),
        Command::ChangeDevice => s.push_str("menu").is_ok(),
        Command::Debug { enabled } => s
            .push_str(if enabled { "debug on" } else { "debug off" })
            .is_ok(),
        Command::Unknown => false,
    };
    ok.then_some(s)
}

/// Format the `km.getpos` reply.
pub fn format_position(x: i16, y: i16) -> WireLine {
    let mut s = WireLine::new();
    // 24 digits max, always fits.
    let _ = write!(s, "km.pos({},{})", x, y);
    s
}

/// Scan up to `N` integers out of a payload string.
///
/// Skips anything that is not part of an integer; a `-` only counts as a
/// sign when a digit follows. Slots without a parsable integer stay 0,
/// matching the original firmware's tolerance for malformed payloads.
/// Values are saturated to the `i16` range.
fn scan_ints<const N: usize>(s: &str) -> [i16; N] {
    let mut out = [0i16; N];
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut slot = 0;

    while i < bytes.len() && slot < N {
        let negative = bytes[i] == b'-'
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_digit();
        if negative || bytes[i].is_ascii_digit() {
            if negative {
                i += 1;
            }
            let mut value: i32 = 0;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                value = (value * 10 + (bytes[i] - b'0') as i32).min(i32::from(i16::MAX) + 1);
                i += 1;
            }
            if negative {
                value = -value;
            }
            out[slot] = value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
            slot += 1;
        } else {
            i += 1;
        }
    }

    out
}
