//! The seam between the harness and the instruction-set interpreter.
//!
//! The execution controller and the input bridge never decode instructions.
//! They drive whatever implements [`Interpreter`]: one `step()` per executed
//! instruction, plus the handful of register and stack operations needed to
//! inject a hardware interrupt.

use crate::memory::MemoryBus;
use crate::ExecutionError;

/// Architectural NMI vector (little-endian word).
pub const NMI_VECTOR: u16 = 0xFFFA;

/// Architectural reset vector (little-endian word).
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Architectural IRQ/BRK vector (little-endian word).
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Base address of the hardware stack page.
pub const STACK_PAGE: u16 = 0x0100;

/// Status register bit masks (NV-BDIZC).
pub mod status {
    pub const CARRY: u8 = 0b0000_0001;
    pub const ZERO: u8 = 0b0000_0010;
    pub const INTERRUPT: u8 = 0b0000_0100;
    pub const DECIMAL: u8 = 0b0000_1000;
    pub const BREAK: u8 = 0b0001_0000;
    pub const UNUSED: u8 = 0b0010_0000;
    pub const OVERFLOW: u8 = 0b0100_0000;
    pub const NEGATIVE: u8 = 0b1000_0000;
}

/// Copy of the interpreter's register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    /// Packed status byte (NV-BDIZC).
    pub status: u8,
    /// Cycles executed since power-on.
    pub cycles: u64,
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "A:{:02X}  X:{:02X}  Y:{:02X}  S:{:02X}  P:{:08b}",
            self.a, self.x, self.y, self.sp, self.status
        )
    }
}

/// Operations the harness needs from an instruction-set interpreter.
pub trait Interpreter {
    /// Memory the interpreter reads and writes through.
    type Bus: MemoryBus;

    /// Execute exactly one instruction, advancing the cycle counter by its cost.
    fn step(&mut self) -> Result<(), ExecutionError>;

    fn registers(&self) -> Registers;

    fn set_pc(&mut self, pc: u16);

    /// Replace the status register with a packed NV-BDIZC byte.
    fn set_status(&mut self, status: u8);

    fn add_cycles(&mut self, cycles: u64);

    /// Push one byte onto the hardware stack.
    fn push_byte(&mut self, value: u8);

    /// Push a word onto the hardware stack, high byte first.
    fn push_word(&mut self, value: u16) {
        self.push_byte((value >> 8) as u8);
        self.push_byte(value as u8);
    }

    fn bus(&self) -> &Self::Bus;

    fn bus_mut(&mut self) -> &mut Self::Bus;

    /// Little-endian word stored at `addr`.
    fn word_at(&self, addr: u16) -> u16 {
        self.bus().read_word(addr)
    }
}
