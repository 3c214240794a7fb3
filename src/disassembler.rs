//! 65C02 Disassembler Module
//!
//! Decodes the instruction at a guest address into a structured [`Instruction`]
//! and formats it as assembly text for the trace log and the debug snapshot.

pub mod decoder;
pub mod formatter;

use crate::addressing::AddressingMode;

pub use decoder::{decode_at, decode_instruction};
pub use formatter::{format_instruction, format_with_symbols};

/// A single disassembled instruction with full metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Memory address where this instruction starts
    pub address: u16,

    /// The opcode byte value (0x00-0xFF)
    pub opcode: u8,

    /// Instruction mnemonic (e.g., "LDA", "STZ"), or ".byte" for undefined opcodes
    pub mnemonic: &'static str,

    /// Addressing mode used by this instruction
    pub addressing_mode: AddressingMode,

    /// Operand bytes (0-2 bytes depending on addressing mode)
    pub operand_bytes: Vec<u8>,

    /// Total size in bytes (1-3 bytes: opcode + operands)
    pub size_bytes: u8,

    /// Base cycle cost (excluding page-crossing penalties)
    pub base_cycles: u8,
}

impl Instruction {
    /// Raw encoding: opcode followed by operand bytes.
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size_bytes as usize);
        bytes.push(self.opcode);
        bytes.extend_from_slice(&self.operand_bytes);
        bytes
    }

    /// Raw encoding as space-separated hex, e.g. `8D 01 F0`.
    pub fn hex_bytes(&self) -> String {
        self.bytes()
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Address the operand refers to, for modes that name one.
    ///
    /// Branch targets are resolved relative to the following instruction.
    pub fn target(&self) -> Option<u16> {
        use AddressingMode::*;
        match (self.addressing_mode, self.operand_bytes.as_slice()) {
            (Relative, [offset]) => Some(
                self.address
                    .wrapping_add(2)
                    .wrapping_add_signed(*offset as i8 as i16),
            ),
            (Absolute | AbsoluteX | AbsoluteY | Indirect | AbsoluteIndexedIndirect, [lo, hi]) => {
                Some(u16::from_le_bytes([*lo, *hi]))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&format_instruction(self))
    }
}
