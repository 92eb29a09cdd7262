use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use retroport_sd::PinMap;

use crate::script::Script;
use crate::SessionConfig;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "retroport",
    version,
    about = "Drive an emulated SPI SD card on an 8-bit parallel port"
)]
pub struct Args {
    /// SD card image to insert
    #[arg(long)]
    pub card: Option<PathBuf>,

    /// Port pin wired to SCLK
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(0..8))]
    pub clock_pin: u8,

    /// Port pin wired to MOSI (host to card)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..8))]
    pub data_out_pin: u8,

    /// Port pin wired to MISO (card to host)
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..8))]
    pub data_in_pin: u8,

    /// Port pin wired to SS (active low)
    #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(0..8))]
    pub select_pin: u8,

    /// Port commands to run, semicolon separated
    #[arg(long)]
    pub commands: Option<String>,

    /// File of port commands, run before --commands
    #[arg(long)]
    pub script: Option<PathBuf>,
}

impl Args {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        let pins = [
            ("clock", self.clock_pin),
            ("data-out", self.data_out_pin),
            ("data-in", self.data_in_pin),
            ("select", self.select_pin),
        ];
        for (i, (name, pin)) in pins.iter().enumerate() {
            if let Some((other, _)) = pins[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(format!("--{name}-pin and --{other}-pin both use pin {pin}"));
            }
        }
        Ok(())
    }

    pub fn pin_map(&self) -> PinMap {
        PinMap::builder()
            .clock(self.clock_pin)
            .data_out(self.data_out_pin)
            .data_in(self.data_in_pin)
            .select(self.select_pin)
            .build()
    }

    /// Collect the script sources and build the session configuration.
    pub fn to_session_config(&self) -> Result<SessionConfig> {
        let mut script = Script::default();
        if let Some(path) = &self.script {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read script '{}'", path.display()))?;
            script.extend(
                Script::parse(&text).with_context(|| format!("in '{}'", path.display()))?,
            );
        }
        if let Some(commands) = &self.commands {
            script.extend(Script::parse(commands).context("in --commands")?);
        }

        Ok(SessionConfig::builder()
            .pins(self.pin_map())
            .card_image(self.card.clone())
            .script(script)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Command;

    #[test]
    fn defaults_match_stock_wiring() {
        let args = Args::parse_from(["retroport"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.pin_map(), PinMap::default());
    }

    #[test]
    fn rejects_out_of_range_pin() {
        assert!(Args::try_parse_from(["retroport", "--clock-pin", "8"]).is_err());
    }

    #[test]
    fn rejects_shared_pins() {
        let args = Args::parse_from(["retroport", "--data-in-pin", "7"]);
        let err = args.validate().unwrap_err();
        assert_eq!(err, "--data-in-pin and --select-pin both use pin 7");
    }

    #[test]
    fn commands_flag_becomes_script() {
        let args = Args::parse_from([
            "retroport",
            "--clock-pin",
            "0",
            "--data-out-pin",
            "1",
            "--data-in-pin",
            "2",
            "--select-pin",
            "3",
            "--commands",
            "select; x 0x40",
        ]);
        let config = args.to_session_config().unwrap();
        assert_eq!(config.pins.mask(), 0x0f);
        assert_eq!(
            config.script.commands(),
            &[Command::Select, Command::Transfer(vec![0x40])]
        );
    }

    #[test]
    fn missing_script_file_is_an_error() {
        let args = Args::parse_from(["retroport", "--script", "/nonexistent/boot.spi"]);
        let err = args.to_session_config().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/boot.spi"));
    }
}
