//! Command reconstruction from a raw byte stream.
//!
//! Two assemblers correspond to the two wire generations:
//!
//! - [`LineAssembler`] rebuilds newline-terminated text commands.
//! - [`FrameAssembler`] rebuilds legacy fixed-size binary frames and
//!   detects stream desynchronization (a peer rebooting mid-frame leaves
//!   the byte stream misaligned with the state machine).

use crate::config::COMMAND_LINE_CAPACITY;
use crate::protocol::frame::{self, PAYLOAD_LEN, TAG_MAX};
use crate::protocol::Command;

/// One completed text command line.
pub type Line = heapless::String<COMMAND_LINE_CAPACITY>;

/// Accumulates bytes into `\n`/`\r`-terminated command lines.
///
/// Printable ASCII is buffered; other bytes are discarded. Lines longer
/// than the buffer are truncated, not rejected - the truncated prefix is
/// still delivered on the terminator. Empty lines produce nothing, so
/// `\r\n` pairs cost only one delivery.
#[derive(Default)]
pub struct LineAssembler {
    buf: Line,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self { buf: Line::new() }
    }

    /// Feed one byte; returns the completed line on a terminator.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\n' | b'\r' => {
                if self.buf.is_empty() {
                    None
                } else {
                    Some(core::mem::take(&mut self.buf))
                }
            }
            0x20..=0x7E => {
                // Truncate silently once the buffer is full.
                let _ = self.buf.push(byte as char);
                None
            }
            _ => None,
        }
    }
}

/// Outcome of feeding one byte to the [`FrameAssembler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameStep {
    /// More bytes needed.
    Pending,
    /// A whole frame was assembled and decoded.
    Ready(Command),
    /// The tag byte was out of range: the stream is misaligned.
    ///
    /// The caller recovers by flushing the receive ring and quiescing
    /// the channel for [`crate::config::DESYNC_FLUSH_DELAY_MS`] before
    /// feeding bytes again.
    Desync,
}

#[derive(Clone, Copy)]
enum FrameState {
    AwaitTag,
    Fields {
        tag: u8,
        filled: usize,
        payload: [u8; PAYLOAD_LEN],
    },
}

/// Reassembles legacy binary frames: one tag byte selecting the command,
/// then a fixed-width payload.
pub struct FrameAssembler {
    state: FrameState,
}

impl FrameAssembler {
    pub const fn new() -> Self {
        Self {
            state: FrameState::AwaitTag,
        }
    }

    /// Drop any partial frame, e.g. after a desync flush.
    pub fn reset(&mut self) {
        self.state = FrameState::AwaitTag;
    }

    /// Feed one byte of the stream.
    pub fn push(&mut self, byte: u8) -> FrameStep {
        match self.state {
            FrameState::AwaitTag => {
                if byte > TAG_MAX {
                    return FrameStep::Desync;
                }
                self.state = FrameState::Fields {
                    tag: byte,
                    filled: 0,
                    payload: [0; PAYLOAD_LEN],
                };
                FrameStep::Pending
            }
            FrameState::Fields {
                tag,
                mut filled,
                mut payload,
            } => {
                payload[filled] = byte;
                filled += 1;
                if filled == PAYLOAD_LEN {
                    self.state = FrameState::AwaitTag;
                    // The tag was range-checked on entry.
                    match frame::decode(tag, &payload) {
                        Some(cmd) => FrameStep::Ready(cmd),
                        None => FrameStep::Desync,
                    }
                } else {
                    self.state = FrameState::Fields {
                        tag,
                        filled,
                        payload,
                    };
                    FrameStep::Pending
                }
            }
        }
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
