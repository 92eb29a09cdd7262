pub mod memory;
pub mod port;

pub use memory::{Memory, OffsetMemory, Ram, Rom};
pub use port::ParallelPeripheral;

/// Width of the parallel port in pins.
pub const PORT_WIDTH: u8 = 8;
