use retroport_common::ParallelPeripheral;

use crate::pins::{PinMap, Signals};

/// Host side of a bit-banged SPI bus (mode 0, MSB first).
///
/// Each bit is two port writes: a rising edge with the outgoing bit on
/// data-out, then a falling edge holding it. The data-in pin is sampled right
/// after the rising edge.
#[derive(Copy, Clone, Debug)]
pub struct SpiHost {
    pins: PinMap,
}

impl SpiHost {
    pub fn new(pins: PinMap) -> Self {
        Self { pins }
    }

    pub fn pins(&self) -> PinMap {
        self.pins
    }

    /// Pull chip select low with the clock idle.
    pub fn select<P: ParallelPeripheral>(&self, device: &mut P) {
        device.write(self.pins.encode(Signals::empty()));
    }

    /// Release chip select with the clock idle.
    pub fn deselect<P: ParallelPeripheral>(&self, device: &mut P) {
        device.write(self.pins.encode(Signals::SELECT));
    }

    /// Clock one byte out and return the byte clocked back in.
    pub fn transfer<P: ParallelPeripheral>(&self, device: &mut P, byte: u8) -> u8 {
        let mut received = 0u8;
        for bit in (0..8).rev() {
            let mut level = Signals::empty();
            level.set(Signals::DATA_OUT, byte & (1 << bit) != 0);

            device.write(self.pins.encode(level | Signals::CLOCK));
            if self.pins.decode(device.read()).contains(Signals::DATA_IN) {
                received |= 1 << bit;
            }
            device.write(self.pins.encode(level));
        }
        log::trace!("SPI host: sent ${byte:02X}, got ${received:02X}");
        received
    }

    pub fn transfer_all<P: ParallelPeripheral>(&self, device: &mut P, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .map(|&byte| self.transfer(device, byte))
            .collect()
    }
}

impl Default for SpiHost {
    fn default() -> Self {
        Self::new(PinMap::default())
    }
}
