//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the interpreter from
//! the concrete guest memory, and `FlatMemory`, the plain 64KB image every other
//! memory type in this crate is built on.
//!
//! The harness never lets the interpreter touch the image directly: all guest
//! accesses go through a `MemoryBus`, which is what makes write observation
//! possible (see [`crate::observers`]).

/// Size of the guest address space in bytes.
pub const ADDRESS_SPACE: usize = 0x10000;

/// Memory bus trait for the interpreter to read/write bytes.
///
/// # Design
///
/// - `read(&self)`: Immutable reference, reads never have side effects
/// - `write(&mut self)`: Mutable reference makes side effects explicit
/// - No error types: 6502 hardware has no bus error mechanism
///
/// # Examples
///
/// ```
/// use cerbemu::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    ///
    /// This method must never panic and must not have side effects.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    fn write(&mut self, addr: u16, value: u8);

    /// Reads a little-endian word. The high byte address wraps at 0xFFFF.
    fn read_word(&self, addr: u16) -> u16 {
        let low = self.read(addr) as u16;
        let high = self.read(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }
}

/// Simple 64KB flat memory implementation.
///
/// All 65536 addresses (0x0000-0xFFFF) are mapped to a single contiguous array.
///
/// # Examples
///
/// ```
/// use cerbemu::{FlatMemory, MemoryBus};
///
/// let mem = FlatMemory::filled(0xEA);
/// assert_eq!(mem.read(0x0000), 0xEA);
/// assert_eq!(mem.read(0xFFFF), 0xEA);
/// ```
#[derive(Clone)]
pub struct FlatMemory {
    data: Box<[u8; ADDRESS_SPACE]>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all bytes initialized to zero.
    pub fn new() -> Self {
        Self::filled(0x00)
    }

    /// Creates a new FlatMemory instance with every byte set to `value`.
    pub fn filled(value: u8) -> Self {
        Self {
            data: Box::new([value; ADDRESS_SPACE]),
        }
    }

    /// Copies `bytes` into memory starting at `start`.
    ///
    /// Returns the number of bytes copied; bytes that would land past 0xFFFF
    /// are not written.
    pub fn load(&mut self, start: u16, bytes: &[u8]) -> usize {
        let start = start as usize;
        let count = bytes.len().min(ADDRESS_SPACE - start);
        self.data[start..start + count].copy_from_slice(&bytes[..count]);
        count
    }

    /// Sets every byte of `range` to `value`.
    pub fn fill(&mut self, range: std::ops::RangeInclusive<u16>, value: u8) {
        let (start, end) = (*range.start() as usize, *range.end() as usize);
        if start <= end {
            self.data[start..=end].fill(value);
        }
    }

    /// Returns a copy of `len` bytes starting at `start`, wrapping at 0xFFFF.
    pub fn slice(&self, start: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| self.data[(start as usize + i) % ADDRESS_SPACE])
            .collect()
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FlatMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FlatMemory")
            .field("size", &ADDRESS_SPACE)
            .finish()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_memory_read_write() {
        let mut mem = FlatMemory::new();

        assert_eq!(mem.read(0x0000), 0x00);
        assert_eq!(mem.read(0xFFFF), 0x00);

        mem.write(0x1234, 0x42);
        assert_eq!(mem.read(0x1234), 0x42);
        assert_eq!(mem.read(0x1233), 0x00);
        assert_eq!(mem.read(0x1235), 0x00);
    }

    #[test]
    fn test_load_truncates_at_top_of_memory() {
        let mut mem = FlatMemory::new();

        let copied = mem.load(0xFFFE, &[0x01, 0x02, 0x03]);

        assert_eq!(copied, 2);
        assert_eq!(mem.read(0xFFFE), 0x01);
        assert_eq!(mem.read(0xFFFF), 0x02);
        // Nothing wrapped around to zero page
        assert_eq!(mem.read(0x0000), 0x00);
    }

    #[test]
    fn test_read_word_is_little_endian_and_wraps() {
        let mut mem = FlatMemory::new();
        mem.write(0xFFFC, 0x00);
        mem.write(0xFFFD, 0xC0);
        assert_eq!(mem.read_word(0xFFFC), 0xC000);

        mem.write(0xFFFF, 0x34);
        mem.write(0x0000, 0x12);
        assert_eq!(mem.read_word(0xFFFF), 0x1234);
    }

    #[test]
    fn test_fill_and_slice() {
        let mut mem = FlatMemory::filled(0xEA);
        mem.fill(0xF800..=0xF803, 0x20);

        assert_eq!(mem.slice(0xF7FF, 6), vec![0xEA, 0x20, 0x20, 0x20, 0x20, 0xEA]);
        assert_eq!(mem.slice(0xFFFF, 2), vec![0xEA, 0xEA]);
    }
}
