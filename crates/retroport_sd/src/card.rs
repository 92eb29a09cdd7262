use std::collections::VecDeque;
use std::fmt;

use retroport_common::{Memory, ParallelPeripheral, Rom};

use crate::command::CommandTable;
use crate::pins::PinMap;
use crate::queue::ResponseQueue;
use crate::POWER_ON_SEQUENCE;

/// Exchange events kept for `take_exchanges` before the oldest are dropped.
const MAX_PENDING_EXCHANGES: usize = 4096;

/// Bit-level SPI state of the card.
#[derive(Clone, Debug, Eq, PartialEq)]
struct SpiState {
    /// Clock level seen on the previous write.
    prior_clock: bool,
    /// Bit of the current byte being exchanged, 7 down to 0.
    bit_index: u8,
    /// Byte being shifted out on the data-in line.
    output_buffer: u8,
    /// Bytes that follow `output_buffer`.
    output_queue: ResponseQueue,
    /// Level presented on the data-in line since the last rising edge.
    output_line: bool,
    /// Byte being assembled from the data-out line.
    input_buffer: u8,
}

impl SpiState {
    fn power_on() -> Self {
        let mut output_queue = ResponseQueue::new();
        output_queue.enqueue(&POWER_ON_SEQUENCE);
        // Load the first byte now so the very first read is meaningful.
        let output_buffer = output_queue.dequeue_or_default();
        Self {
            prior_clock: false,
            bit_index: 7,
            output_buffer,
            output_queue,
            output_line: false,
            input_buffer: 0x00,
        }
    }
}

/// One completed byte exchange on the bus.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Exchange {
    /// Byte the host shifted in.
    pub received: u8,
    /// Byte the card loaded to shift out next.
    pub next: u8,
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MOSI ${:02X} {:08b} <-> ${:02X} {:08b} MISO",
            self.received, self.received, self.next, self.next
        )
    }
}

/// An SD/MMC card in SPI mode, wired to a parallel port.
///
/// The host feeds every port change through [`SdCard::write`]. Output bits are
/// latched on the rising clock edge and input bits captured on the falling
/// edge, most significant bit first. Nothing happens while chip select is
/// high.
pub struct SdCard {
    storage: Option<Rom>,
    spi: SpiState,
    pins: PinMap,
    commands: CommandTable,
    exchanges: VecDeque<Exchange>,

    mask_clock: u8,
    mask_data_out: u8,
    mask_data_in: u8,
    mask_select: u8,
}

impl SdCard {
    pub fn new(pins: PinMap) -> Self {
        Self::with_commands(pins, CommandTable::default())
    }

    /// Build a card that answers with `commands` instead of the stock table.
    pub fn with_commands(pins: PinMap, commands: CommandTable) -> Self {
        Self {
            storage: None,
            spi: SpiState::power_on(),
            pins,
            commands,
            exchanges: VecDeque::new(),
            mask_clock: pins.clock_mask(),
            mask_data_out: pins.data_out_mask(),
            mask_data_in: pins.data_in_mask(),
            mask_select: pins.select_mask(),
        }
    }

    /// Insert a card image. No modeled command reads it yet.
    pub fn load_image(&mut self, image: Rom) {
        log::info!("SD card image inserted: {image}");
        self.storage = Some(image);
    }

    pub fn storage(&self) -> Option<&Rom> {
        self.storage.as_ref()
    }

    /// Size of the inserted image in bytes, 0 when the slot is empty.
    pub fn storage_len(&self) -> usize {
        self.storage.as_ref().map_or(0, |rom| rom.size())
    }

    pub fn pins(&self) -> PinMap {
        self.pins
    }

    pub fn bit_index(&self) -> u8 {
        self.spi.bit_index
    }

    pub fn output_line(&self) -> bool {
        self.spi.output_line
    }

    /// Number of bytes queued behind the one currently shifting out.
    pub fn queued(&self) -> usize {
        self.spi.output_queue.len()
    }

    /// Drain the exchange events recorded since the last call.
    pub fn take_exchanges(&mut self) -> Vec<Exchange> {
        self.exchanges.drain(..).collect()
    }

    /// Current port value on the card's data-in pin.
    pub fn read(&self) -> u8 {
        if self.spi.output_line {
            self.mask_data_in
        } else {
            0x00
        }
    }

    /// Take an updated parallel port state.
    pub fn write(&mut self, data: u8) {
        // High is inactive.
        if data & self.mask_select != 0 {
            return;
        }

        let data_out = data & self.mask_data_out != 0;
        let clock = data & self.mask_clock != 0;

        let rising = !self.spi.prior_clock && clock;
        let falling = self.spi.prior_clock && !clock;
        self.spi.prior_clock = clock;

        // sclk rise -> data-in latched, sclk fall -> data-out captured.
        if rising {
            self.spi.output_line = self.spi.output_buffer & (1 << self.spi.bit_index) != 0;
        }

        if falling {
            if data_out {
                self.spi.input_buffer |= 1 << self.spi.bit_index;
            }

            if self.spi.bit_index == 0 {
                let received = std::mem::take(&mut self.spi.input_buffer);
                self.end_of_byte(received);
                self.spi.bit_index = 7;
            } else {
                self.spi.bit_index -= 1;
            }
        }
    }

    fn end_of_byte(&mut self, received: u8) {
        match self.commands.lookup(received) {
            Some(response) => {
                log::debug!(
                    "SD: got ${received:02X}; queueing {} response bytes",
                    response.bytes().len()
                );
                self.spi.output_queue.enqueue(response.bytes());
            }
            None => log::trace!("SD: ignoring ${received:02X}"),
        }

        self.spi.output_buffer = self.spi.output_queue.dequeue_or_default();

        let exchange = Exchange {
            received,
            next: self.spi.output_buffer,
        };
        log::debug!("SD {exchange}");
        if self.exchanges.len() == MAX_PENDING_EXCHANGES {
            self.exchanges.pop_front();
        }
        self.exchanges.push_back(exchange);
    }
}

impl Default for SdCard {
    fn default() -> Self {
        Self::new(PinMap::default())
    }
}

impl fmt::Debug for SdCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdCard")
            .field("pins", &self.pins)
            .field("storage_len", &self.storage_len())
            .field("spi", &self.spi)
            .finish()
    }
}

impl ParallelPeripheral for SdCard {
    fn pin_mask(&self) -> u8 {
        self.pins.mask()
    }

    fn read(&self) -> u8 {
        SdCard::read(self)
    }

    fn write(&mut self, data: u8) {
        SdCard::write(self, data)
    }

    fn name(&self) -> String {
        match &self.storage {
            Some(rom) => format!("SD card {rom}"),
            None => "SD card (empty)".to_string(),
        }
    }
}
