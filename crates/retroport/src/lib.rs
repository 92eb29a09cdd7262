mod args;
mod script;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use retroport_common::{ParallelPeripheral, Rom};
use retroport_sd::{PinMap, SdCard, SpiHost};
use typed_builder::TypedBuilder;

pub use args::Args;
pub use script::{parse_byte, Command, Script};

#[derive(TypedBuilder, Debug)]
pub struct SessionConfig {
    #[builder(default)]
    pub pins: PinMap,
    #[builder(default)]
    pub card_image: Option<PathBuf>,
    #[builder(default)]
    pub script: Script,
}

/// A card on the port plus the host that drives it.
pub struct Session {
    card: SdCard,
    host: SpiHost,
}

impl Session {
    pub fn new(pins: PinMap, image: Option<Rom>) -> Self {
        let mut card = SdCard::new(pins);
        if let Some(image) = image {
            card.load_image(image);
        }
        Self {
            card,
            host: SpiHost::new(pins),
        }
    }

    pub fn card(&self) -> &SdCard {
        &self.card
    }

    pub fn execute(&mut self, command: &Command, out: &mut impl Write) -> Result<()> {
        log::trace!("{command:?}");
        match command {
            Command::Write(data) => self.card.write(*data),
            Command::Read => {
                let value = self.card.read();
                writeln!(out, "read ${value:02X} {value:08b}")?;
            }
            Command::Select => self.host.select(&mut self.card),
            Command::Deselect => self.host.deselect(&mut self.card),
            Command::Transfer(bytes) => {
                for &byte in bytes {
                    let received = self.host.transfer(&mut self.card, byte);
                    writeln!(out, "xfer ${byte:02X} -> ${received:02X}")?;
                }
            }
            Command::Status => writeln!(
                out,
                "bit {} line {} queued {}",
                self.card.bit_index(),
                u8::from(self.card.output_line()),
                self.card.queued()
            )?,
        }

        for exchange in self.card.take_exchanges() {
            writeln!(out, "SD {exchange}")?;
        }
        Ok(())
    }

    pub fn run(&mut self, script: &Script, out: &mut impl Write) -> Result<()> {
        for command in script.commands() {
            self.execute(command, out)?;
        }
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.card.shutdown();
    }
}

pub fn run(config: SessionConfig) -> Result<()> {
    let image = config.card_image.as_ref().map(Rom::from_file).transpose()?;
    let mut session = Session::new(config.pins, image);
    log::info!(
        "{} on pins {:?} (mask ${:02X})",
        session.card.name(),
        config.pins,
        session.card.pin_mask()
    );
    if config.script.is_empty() {
        log::info!("No port commands given; nothing to do");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    session.run(&config.script, &mut out)?;
    session.shutdown();
    Ok(())
}
