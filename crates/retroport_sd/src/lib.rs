//! SD/MMC card emulation over a bit-banged SPI bus.
//!
//! The card sits on an 8-bit parallel port. The host toggles the clock,
//! data-out and chip-select pins one port write at a time; the card rebuilds
//! the serial bytes from those snapshots and shifts its replies back on the
//! data-in pin.

mod card;
mod command;
mod host;
mod pins;
mod queue;

pub use card::{Exchange, SdCard};
pub use command::{CommandTable, Response, CMD0_TOKEN};
pub use host::SpiHost;
pub use pins::{PinMap, Signals};
pub use queue::ResponseQueue;

/// Bytes queued at power-on: two busy cycles, then the ready token.
pub const POWER_ON_SEQUENCE: [u8; 3] = [0x00, 0x00, 0xff];
