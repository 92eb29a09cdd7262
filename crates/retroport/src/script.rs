use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

/// One step of a port command script.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Raw port write.
    Write(u8),
    /// Print the port value driven by the card.
    Read,
    /// Chip select low, clock idle.
    Select,
    /// Chip select high, clock idle.
    Deselect,
    /// Clock bytes through the card and print what comes back.
    Transfer(Vec<u8>),
    /// Print the card's shift state.
    Status,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let operands: Vec<&str> = words.collect();

        let no_operands = |command: Command| {
            if operands.is_empty() {
                Ok(command)
            } else {
                Err(anyhow!("'{name}' takes no operands"))
            }
        };

        match name.to_ascii_lowercase().as_str() {
            "w" | "write" => match operands.as_slice() {
                [byte] => Ok(Command::Write(parse_byte(byte)?)),
                _ => bail!("'{name}' takes exactly one byte"),
            },
            "r" | "read" => no_operands(Command::Read),
            "select" => no_operands(Command::Select),
            "deselect" => no_operands(Command::Deselect),
            "status" => no_operands(Command::Status),
            "x" | "xfer" => {
                if operands.is_empty() {
                    bail!("'{name}' needs at least one byte");
                }
                let bytes = operands
                    .iter()
                    .map(|byte| parse_byte(byte))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Command::Transfer(bytes))
            }
            _ => bail!("unknown command '{name}'"),
        }
    }
}

/// Parse `0x40`, `$40` or `64`.
pub fn parse_byte(s: &str) -> Result<u8> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(hex) = s.strip_prefix('$') {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.with_context(|| format!("invalid byte '{s}'"))
}

/// An ordered list of commands.
///
/// Commands are separated by `;` or newlines. `#` starts a comment that runs
/// to the end of the line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self> {
        let mut commands = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let code = line.split('#').next().unwrap_or_default();
            for item in code.split(';').map(str::trim).filter(|item| !item.is_empty()) {
                let command = item
                    .parse::<Command>()
                    .with_context(|| format!("line {}: '{item}'", number + 1))?;
                commands.push(command);
            }
        }
        Ok(Self { commands })
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Append the commands of `other` after ours.
    pub fn extend(&mut self, other: Script) {
        self.commands.extend(other.commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_semicolon_separated_commands() {
        let script = Script::parse("select; x 0x40 $ff 7 ;read;  status ; deselect").unwrap();
        assert_eq!(
            script.commands(),
            &[
                Command::Select,
                Command::Transfer(vec![0x40, 0xff, 0x07]),
                Command::Read,
                Command::Status,
                Command::Deselect,
            ]
        );
    }

    #[test]
    fn newlines_and_comments_separate_commands() {
        let text = "# wake the card\nw 0x00\n\nW 0X10 # clock high\nr\n";
        let script = Script::parse(text).unwrap();
        assert_eq!(
            script.commands(),
            &[Command::Write(0x00), Command::Write(0x10), Command::Read]
        );
    }

    #[test]
    fn empty_text_is_an_empty_script() {
        assert!(Script::parse("").unwrap().is_empty());
        assert!(Script::parse(" ; ;\n# nothing\n").unwrap().is_empty());
    }

    #[test]
    fn errors_name_the_line() {
        let err = Script::parse("select\nfrobnicate 1").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("unknown command 'frobnicate'"), "{message}");
    }

    #[test]
    fn rejects_bad_operands() {
        assert!("w".parse::<Command>().is_err());
        assert!("w 1 2".parse::<Command>().is_err());
        assert!("x".parse::<Command>().is_err());
        assert!("read now".parse::<Command>().is_err());
        assert!("w 0x100".parse::<Command>().is_err());
        assert!("w 256".parse::<Command>().is_err());
    }

    #[test]
    fn parse_byte_accepts_hex_and_decimal() {
        assert_eq!(parse_byte("0x40").unwrap(), 0x40);
        assert_eq!(parse_byte("0XfF").unwrap(), 0xff);
        assert_eq!(parse_byte("$aa").unwrap(), 0xaa);
        assert_eq!(parse_byte("255").unwrap(), 0xff);
        assert!(parse_byte("zz").is_err());
        assert!(parse_byte("-1").is_err());
    }

    #[test]
    fn extend_appends_in_order() {
        let mut script = Script::parse("select").unwrap();
        script.extend(Script::parse("x 1; deselect").unwrap());
        assert_eq!(
            script.commands(),
            &[
                Command::Select,
                Command::Transfer(vec![0x01]),
                Command::Deselect
            ]
        );
    }
}
