//! Command application and absolute cursor tracking.

use crate::inject::{curve, MouseDevice};
use crate::protocol::codec::{self, WireLine};
use crate::protocol::Command;

/// Result of applying one command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Applied, nothing to report.
    Done,
    /// A reply line for the operator channel (`km.pos(..)`, debug echo).
    Reply(WireLine),
    /// Hand control to the configuration menu.
    Menu,
}

/// Applies commands to the emulated mouse and tracks the absolute
/// position as this node understands it.
///
/// The position is a plain `(i16, i16)` pair updated once per applied
/// move step; it wraps on overflow like the underlying signed arithmetic,
/// with no clamping.
pub struct MouseActuator {
    x: i16,
    y: i16,
    debug_echo: bool,
}

impl MouseActuator {
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            debug_echo: false,
        }
    }

    /// Last known absolute cursor position.
    pub fn position(&self) -> (i16, i16) {
        (self.x, self.y)
    }

    /// Apply one decoded command to the device.
    pub fn apply(&mut self, cmd: &Command, dev: &mut impl MouseDevice) -> Outcome {
        match *cmd {
            Command::Move {
                dx,
                dy,
                steps,
                ref_x,
                ref_y,
            } => {
                if steps <= 1 || (ref_x == 0 && ref_y == 0) {
                    self.step(dev, i32::from(dx), i32::from(dy));
                } else {
                    for (sx, sy) in
                        curve::steps((self.x, self.y), (dx, dy), (ref_x, ref_y), steps as u16)
                    {
                        self.step(dev, sx, sy);
                    }
                }
            }
            Command::MoveTo { x, y } => {
                let dx = x.wrapping_sub(self.x);
                let dy = y.wrapping_sub(self.y);
                dev.move_rel(dx, dy, 0);
                // Pin exactly; MoveTo is absolute, not accumulated.
                self.x = x;
                self.y = y;
            }
            Command::GetPos => return Outcome::Reply(codec::format_position(self.x, self.y)),
            Command::Button { button, pressed } => {
                if pressed {
                    dev.press(button);
                } else {
                    dev.release(button);
                }
            }
            Command::Wheel { delta } => dev.move_rel(0, 0, delta),
            Command::ChangeDevice => return Outcome::Menu,
            Command::Debug { enabled } => {
                self.debug_echo = enabled;
                return Outcome::Done;
            }
            Command::Unknown => return Outcome::Done,
        }

        if self.debug_echo {
            if let Some(line) = codec::encode(cmd) {
                return Outcome::Reply(line);
            }
        }
        Outcome::Done
    }

    /// One relative step: drive the device and advance the cursor.
    fn step(&mut self, dev: &mut impl MouseDevice, dx: i32, dy: i32) {
        dev.move_rel(
            dx.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16,
            dy.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16,
            0,
        );
        self.x = self.x.wrapping_add(dx as i16);
        self.y = self.y.wrapping_add(dy as i16);
    }
}

impl Default for MouseActuator {
    fn default() -> Self {
        Self::new()
    }
}
