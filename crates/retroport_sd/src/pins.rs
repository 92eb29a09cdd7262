use bitflags::bitflags;
use retroport_common::PORT_WIDTH;
use typed_builder::TypedBuilder;

bitflags! {
    /// Logical SPI line levels, independent of how they are wired to the port.
    ///
    /// A set flag means the line is high. Chip select is active low, so
    /// `SELECT` set means the card is *not* addressed.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Signals: u8 {
        const CLOCK = 1 << 0;
        const DATA_OUT = 1 << 1;
        const DATA_IN = 1 << 2;
        const SELECT = 1 << 3;
    }
}

/// Parallel port pin numbers (0..=7) for each SPI line.
///
/// The four pins are expected to be distinct; overlapping assignments are a
/// wiring mistake and produce undefined card behaviour.
#[derive(Copy, Clone, Debug, Eq, PartialEq, TypedBuilder)]
pub struct PinMap {
    /// SCLK
    #[builder(default = 4)]
    pub clock: u8,
    /// MOSI, driven by the host.
    #[builder(default = 5)]
    pub data_out: u8,
    /// MISO, driven by the card.
    #[builder(default = 6)]
    pub data_in: u8,
    /// SS, active low.
    #[builder(default = 7)]
    pub select: u8,
}

impl Default for PinMap {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PinMap {
    #[inline]
    fn bit(pin: u8) -> u8 {
        debug_assert!(pin < PORT_WIDTH, "pin {pin} is outside the 8-bit port");
        1 << pin
    }

    #[inline]
    pub fn clock_mask(&self) -> u8 {
        Self::bit(self.clock)
    }

    #[inline]
    pub fn data_out_mask(&self) -> u8 {
        Self::bit(self.data_out)
    }

    #[inline]
    pub fn data_in_mask(&self) -> u8 {
        Self::bit(self.data_in)
    }

    #[inline]
    pub fn select_mask(&self) -> u8 {
        Self::bit(self.select)
    }

    /// All port bits claimed by the card.
    pub fn mask(&self) -> u8 {
        self.clock_mask() | self.data_out_mask() | self.data_in_mask() | self.select_mask()
    }

    /// Split a port value into logical line levels. Bits outside the map are
    /// dropped.
    pub fn decode(&self, port: u8) -> Signals {
        let mut signals = Signals::empty();
        signals.set(Signals::CLOCK, port & self.clock_mask() != 0);
        signals.set(Signals::DATA_OUT, port & self.data_out_mask() != 0);
        signals.set(Signals::DATA_IN, port & self.data_in_mask() != 0);
        signals.set(Signals::SELECT, port & self.select_mask() != 0);
        signals
    }

    /// Inverse of [`PinMap::decode`].
    pub fn encode(&self, signals: Signals) -> u8 {
        let mut port = 0;
        if signals.contains(Signals::CLOCK) {
            port |= self.clock_mask();
        }
        if signals.contains(Signals::DATA_OUT) {
            port |= self.data_out_mask();
        }
        if signals.contains(Signals::DATA_IN) {
            port |= self.data_in_mask();
        }
        if signals.contains(Signals::SELECT) {
            port |= self.select_mask();
        }
        port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wiring_uses_upper_nibble() {
        let pins = PinMap::default();
        assert_eq!(pins.clock_mask(), 0x10);
        assert_eq!(pins.data_out_mask(), 0x20);
        assert_eq!(pins.data_in_mask(), 0x40);
        assert_eq!(pins.select_mask(), 0x80);
        assert_eq!(pins.mask(), 0xf0);
    }

    #[test]
    fn builder_overrides_single_pins() {
        let pins = PinMap::builder().clock(0).select(3).build();
        assert_eq!(pins.clock, 0);
        assert_eq!(pins.data_out, 5);
        assert_eq!(pins.data_in, 6);
        assert_eq!(pins.select, 3);
        assert_eq!(pins.mask(), 0b0110_1001);
    }

    #[test]
    fn decode_ignores_foreign_bits() {
        let pins = PinMap::builder()
            .clock(0)
            .data_out(1)
            .data_in(2)
            .select(3)
            .build();
        assert_eq!(pins.decode(0xf0), Signals::empty());
        assert_eq!(pins.decode(0xf3), Signals::CLOCK | Signals::DATA_OUT);
        assert_eq!(pins.decode(0x08), Signals::SELECT);
    }

    #[test]
    fn encode_places_signals_on_their_pins() {
        let pins = PinMap::default();
        assert_eq!(pins.encode(Signals::DATA_IN), 0x40);
        assert_eq!(pins.encode(Signals::SELECT | Signals::CLOCK), 0x90);
        assert_eq!(pins.encode(Signals::all()), pins.mask());

        for port in [0x00u8, 0x10, 0x30, 0xa0, 0xf0] {
            assert_eq!(pins.encode(pins.decode(port)), port);
        }
    }
}
