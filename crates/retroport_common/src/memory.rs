use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Size of the on-board RAM (32 KiB).
pub const RAM_SIZE: usize = 0x8000;

/// Value read back from addresses outside a memory's backing store.
const OPEN_BUS: u8 = 0xff;

/// Byte-addressable storage with a 16-bit address space.
pub trait Memory {
    fn read(&self, addr: u16) -> u8;

    /// Store a byte. Read-only memories fail here; callers treat that as a
    /// configuration error and propagate it.
    fn write(&mut self, addr: u16, value: u8) -> Result<()>;

    fn size(&self) -> usize;

    fn shutdown(&mut self) {}
}

/// Read-only memory, usually loaded wholesale from a file.
#[derive(Clone, Debug)]
pub struct Rom {
    name: String,
    data: Vec<u8>,
}

impl Rom {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Load a ROM image. The size of the ROM is the size of the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read ROM image '{}'", path.display()))?;
        log::info!("Loaded {} bytes from '{}'", data.len(), path.display());
        Ok(Self::new(path.display().to_string(), data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Memory for Rom {
    fn read(&self, addr: u16) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(OPEN_BUS)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        bail!("{} is read-only (write ${:02X} to ${:04X})", self, value, addr)
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for Rom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.data[..self.data.len().min(2)];
        let tail = &self.data[self.data.len().saturating_sub(2)..];
        write!(
            f,
            "ROM[{}k:{}:{}..{}]",
            self.size() / 1024,
            self.name,
            hex(head),
            hex(tail)
        )
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// 32 KiB of read/write memory.
#[derive(Clone)]
pub struct Ram {
    data: Box<[u8; RAM_SIZE]>,
}

impl Default for Ram {
    fn default() -> Self {
        Self {
            data: Box::new([0; RAM_SIZE]),
        }
    }
}

impl Ram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the RAM contents to a file.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.data[..])
            .with_context(|| format!("failed to dump RAM to '{}'", path.display()))
    }
}

impl Memory for Ram {
    fn read(&self, addr: u16) -> u8 {
        self.data.get(addr as usize).copied().unwrap_or(OPEN_BUS)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        match self.data.get_mut(addr as usize) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => bail!("RAM write out of range: ${addr:04X}"),
        }
    }

    fn size(&self) -> usize {
        RAM_SIZE
    }
}

impl fmt::Display for Ram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(RAM {}K)", RAM_SIZE / 1024)
    }
}

/// Mounts a memory at `offset` inside a larger address space.
///
/// Addresses are rebased by subtracting `offset` before they reach the inner
/// memory.
#[derive(Clone, Debug)]
pub struct OffsetMemory<M> {
    pub offset: u16,
    pub memory: M,
}

impl<M: Memory> OffsetMemory<M> {
    pub fn new(offset: u16, memory: M) -> Self {
        Self { offset, memory }
    }
}

impl<M: Memory> Memory for OffsetMemory<M> {
    fn read(&self, addr: u16) -> u8 {
        self.memory.read(addr.wrapping_sub(self.offset))
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<()> {
        self.memory.write(addr.wrapping_sub(self.offset), value)
    }

    fn size(&self) -> usize {
        self.memory.size()
    }

    fn shutdown(&mut self) {
        self.memory.shutdown();
    }
}

impl<M: fmt::Display> fmt::Display for OffsetMemory<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OffsetMemory({})", self.memory)
    }
}
