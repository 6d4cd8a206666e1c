//! km2usb - two-node USB mouse relay.
//!
//! A capture node drives a physical mouse as USB host and serialises its
//! input as `km.*` text commands over UART; an injection node replays
//! those commands as an emulated USB HID mouse. This library holds all
//! portable logic - the serial ring buffers and assemblers, the command
//! codecs, the actuator with its curved-move interpolation, and the USB
//! host enumeration/report machinery behind the `HostDriver` seam - and
//! is testable on the host with plain `cargo test`.
//!
//! The embedded injection-node firmware lives in `main.rs` and is built
//! with `--features embedded`.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod host;
pub mod inject;
pub mod protocol;
pub mod serial;
pub mod usb;

pub use error::Error;
