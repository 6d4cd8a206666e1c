//! Relay command protocol.
//!
//! Commands travel between the two nodes (and from the operator console)
//! in one of two wire encodings:
//!
//! 1. **Text lines** (`codec`) - one `km.*` command per `\n`/`\r`-terminated
//!    line. This is the primary, portable encoding.
//! 2. **Fixed binary frames** (`frame`) - a tag byte plus a fixed-width
//!    payload. Legacy encoding kept for older peers; one encoding is active
//!    per channel, chosen at wiring time.

pub mod codec;
pub mod frame;

/// Mouse buttons carried by the protocol.
///
/// `side1` on the wire is the forward side button, `side2` the back one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl Button {
    /// Bit of this button in a boot-protocol button byte.
    pub const fn mask(self) -> u8 {
        match self {
            Button::Left => 0x01,
            Button::Right => 0x02,
            Button::Middle => 0x04,
            Button::Back => 0x08,
            Button::Forward => 0x10,
        }
    }

    /// Name used in the text encoding, e.g. `km.left(1)`.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
            Button::Middle => "middle",
            Button::Back => "side2",
            Button::Forward => "side1",
        }
    }
}

/// One decoded relay command.
///
/// Produced by the codecs, consumed by the actuator (injection node) or
/// emitted by the report pipeline (capture node). Malformed input never
/// fails to decode; it degrades to zero-valued fields or `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Relative move. `steps > 1` requests curved interpolation towards
    /// `(dx, dy)` using `(ref_x, ref_y)` as the control point; the plain
    /// two-argument wire form leaves `steps`, `ref_x` and `ref_y` at 0.
    Move {
        dx: i16,
        dy: i16,
        steps: i16,
        ref_x: i16,
        ref_y: i16,
    },
    /// Absolute move to `(x, y)` in the tracked coordinate space.
    MoveTo { x: i16, y: i16 },
    /// Query the tracked absolute position; replies `km.pos(x,y)`.
    GetPos,
    /// Button press (`pressed == true`) or release.
    Button { button: Button, pressed: bool },
    /// Scroll wheel delta.
    Wheel { delta: i16 },
    /// Hand control to the configuration menu.
    ChangeDevice,
    /// Toggle diagnostic echo of applied commands.
    Debug { enabled: bool },
    /// Unrecognized input; applied as a no-op.
    Unknown,
}

impl Command {
    /// Plain relative move with no interpolation.
    pub const fn move_rel(dx: i16, dy: i16) -> Self {
        Command::Move {
            dx,
            dy,
            steps: 0,
            ref_x: 0,
            ref_y: 0,
        }
    }
}
