//! Serial link ingestion.
//!
//! Bytes arrive in interrupt/event context from the UART peripheral and
//! are staged in a lock-free single-producer/single-consumer ring buffer
//! per channel. A cooperative polling task drains the ring and feeds an
//! assembler - either the text line assembler or the legacy binary frame
//! assembler, chosen statically per channel - which reconstructs whole
//! commands for the protocol codecs.

pub mod line;
pub mod ring;

pub use line::{FrameAssembler, FrameStep, Line, LineAssembler};
pub use ring::RingBuffer;

use crate::protocol::Command;

/// Result of one [`FrameChannel::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelPoll {
    /// Nothing buffered.
    Idle,
    /// One command came off the wire.
    Command(Command),
    /// The stream was desynchronized and has been flushed; leave the
    /// channel alone for [`crate::config::DESYNC_FLUSH_DELAY_MS`] so the
    /// peer's in-flight bytes drain before decoding resumes.
    Quiesce,
}

/// Consumer side of a legacy binary channel: drains the receive ring
/// through the frame assembler and recovers from desynchronization.
///
/// A peer that reboots mid-frame leaves the stream misaligned; the bad
/// tag byte shows up as [`FrameStep::Desync`], at which point the ring
/// is flushed, the partial frame dropped, and the caller told to
/// quiesce briefly.
pub struct FrameChannel<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
    assembler: FrameAssembler,
}

impl<'a, const N: usize> FrameChannel<'a, N> {
    pub const fn new(ring: &'a RingBuffer<N>) -> Self {
        Self {
            ring,
            assembler: FrameAssembler::new(),
        }
    }

    /// Decode as far as the buffered bytes allow.
    pub fn poll(&mut self) -> ChannelPoll {
        while let Some(byte) = self.ring.pop() {
            match self.assembler.push(byte) {
                FrameStep::Pending => {}
                FrameStep::Ready(cmd) => return ChannelPoll::Command(cmd),
                FrameStep::Desync => {
                    self.ring.clear();
                    self.assembler.reset();
                    return ChannelPoll::Quiesce;
                }
            }
        }
        ChannelPoll::Idle
    }
}
