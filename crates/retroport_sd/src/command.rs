use std::collections::HashMap;

/// First byte of an SD `CMD0` (GO_IDLE_STATE) frame: start bit, transmission
/// bit, command index 0.
pub const CMD0_TOKEN: u8 = 0x40;

/// Placeholder reply queued after [`CMD0_TOKEN`].
const CMD0_REPLY: [u8; 4] = [0xaa, 0xab, 0xac, 0xad];

/// Bytes the card queues in reply to a command byte.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    bytes: Vec<u8>,
}

impl Response {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Maps completed input bytes to the reply they trigger.
///
/// Only single bytes are matched; there is no command framing or CRC
/// checking. Bytes without an entry are ignored.
#[derive(Clone, Debug)]
pub struct CommandTable {
    entries: HashMap<u8, Response>,
}

impl Default for CommandTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(CMD0_TOKEN, Response::new(CMD0_REPLY));
        table
    }
}

impl CommandTable {
    /// A table that recognizes nothing.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register (or replace) the reply for `command`.
    pub fn insert(&mut self, command: u8, response: Response) -> Option<Response> {
        self.entries.insert(command, response)
    }

    pub fn lookup(&self, command: u8) -> Option<&Response> {
        self.entries.get(&command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_only_knows_cmd0() {
        let table = CommandTable::default();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(CMD0_TOKEN).map(Response::bytes),
            Some(&[0xaa, 0xab, 0xac, 0xad][..])
        );
        assert!(table.lookup(0x41).is_none());
        assert!(table.lookup(0xff).is_none());
    }

    #[test]
    fn insert_replaces_existing_reply() {
        let mut table = CommandTable::default();
        let old = table.insert(CMD0_TOKEN, Response::new([0x01]));
        assert_eq!(old, Some(Response::new(CMD0_REPLY)));
        assert_eq!(table.lookup(CMD0_TOKEN), Some(&Response::new(vec![0x01])));
    }
}
