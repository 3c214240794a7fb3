//! # Opcode Metadata Table
//!
//! The 256-entry opcode table is the single source of truth for instruction
//! decoding, used by both the CPU and the disassembler. It covers the
//! documented NMOS 6502 instructions and the CMOS 65C02 additions. Opcodes with
//! no defined instruction are marked with the `???` mnemonic.

use crate::addressing::AddressingMode;

/// Metadata for a single opcode.
///
/// # Examples
///
/// ```
/// use cerbemu::{AddressingMode, OPCODE_TABLE};
///
/// let lda_imm = &OPCODE_TABLE[0xA9];
/// assert_eq!(lda_imm.mnemonic, "LDA");
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.base_cycles, 2);
/// assert_eq!(lda_imm.size_bytes, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic (e.g., "LDA", "STZ", "???" for undefined opcodes).
    pub mnemonic: &'static str,

    /// Addressing mode for this instruction.
    pub addressing_mode: AddressingMode,

    /// Base cycle cost (before page crossing and branch penalties).
    pub base_cycles: u8,

    /// Total instruction size in bytes (opcode + operands).
    pub size_bytes: u8,
}

impl OpcodeMetadata {
    /// Whether this opcode has no defined instruction.
    pub fn is_undefined(&self) -> bool {
        self.mnemonic == "???"
    }
}

const fn op(mnemonic: &'static str, addressing_mode: AddressingMode, base_cycles: u8) -> OpcodeMetadata {
    OpcodeMetadata {
        mnemonic,
        addressing_mode,
        base_cycles,
        size_bytes: addressing_mode.instruction_size(),
    }
}

const UNDEFINED: OpcodeMetadata = op("???", Implicit, 2);

use AddressingMode::{
    Absolute as Abs, AbsoluteIndexedIndirect as AbsIndInd, AbsoluteX as AbsX, AbsoluteY as AbsY,
    Accumulator as Acc, Immediate as Imm, Implicit, Indirect as Ind, IndirectX as IndX,
    IndirectY as IndY, Relative as Rel, ZeroPage as Zp, ZeroPageIndirect as ZpInd,
    ZeroPageX as ZpX, ZeroPageY as ZpY,
};

/// Complete 256-entry opcode metadata table indexed by opcode byte value.
#[rustfmt::skip]
pub const OPCODE_TABLE: [OpcodeMetadata; 256] = [
    // 0x00
    op("BRK", Implicit, 7), op("ORA", IndX, 6), UNDEFINED, UNDEFINED,
    op("TSB", Zp, 5), op("ORA", Zp, 3), op("ASL", Zp, 5), UNDEFINED,
    op("PHP", Implicit, 3), op("ORA", Imm, 2), op("ASL", Acc, 2), UNDEFINED,
    op("TSB", Abs, 6), op("ORA", Abs, 4), op("ASL", Abs, 6), UNDEFINED,
    // 0x10
    op("BPL", Rel, 2), op("ORA", IndY, 5), op("ORA", ZpInd, 5), UNDEFINED,
    op("TRB", Zp, 5), op("ORA", ZpX, 4), op("ASL", ZpX, 6), UNDEFINED,
    op("CLC", Implicit, 2), op("ORA", AbsY, 4), op("INC", Acc, 2), UNDEFINED,
    op("TRB", Abs, 6), op("ORA", AbsX, 4), op("ASL", AbsX, 7), UNDEFINED,
    // 0x20
    op("JSR", Abs, 6), op("AND", IndX, 6), UNDEFINED, UNDEFINED,
    op("BIT", Zp, 3), op("AND", Zp, 3), op("ROL", Zp, 5), UNDEFINED,
    op("PLP", Implicit, 4), op("AND", Imm, 2), op("ROL", Acc, 2), UNDEFINED,
    op("BIT", Abs, 4), op("AND", Abs, 4), op("ROL", Abs, 6), UNDEFINED,
    // 0x30
    op("BMI", Rel, 2), op("AND", IndY, 5), op("AND", ZpInd, 5), UNDEFINED,
    op("BIT", ZpX, 4), op("AND", ZpX, 4), op("ROL", ZpX, 6), UNDEFINED,
    op("SEC", Implicit, 2), op("AND", AbsY, 4), op("DEC", Acc, 2), UNDEFINED,
    op("BIT", AbsX, 4), op("AND", AbsX, 4), op("ROL", AbsX, 7), UNDEFINED,
    // 0x40
    op("RTI", Implicit, 6), op("EOR", IndX, 6), UNDEFINED, UNDEFINED,
    UNDEFINED, op("EOR", Zp, 3), op("LSR", Zp, 5), UNDEFINED,
    op("PHA", Implicit, 3), op("EOR", Imm, 2), op("LSR", Acc, 2), UNDEFINED,
    op("JMP", Abs, 3), op("EOR", Abs, 4), op("LSR", Abs, 6), UNDEFINED,
    // 0x50
    op("BVC", Rel, 2), op("EOR", IndY, 5), op("EOR", ZpInd, 5), UNDEFINED,
    UNDEFINED, op("EOR", ZpX, 4), op("LSR", ZpX, 6), UNDEFINED,
    op("CLI", Implicit, 2), op("EOR", AbsY, 4), op("PHY", Implicit, 3), UNDEFINED,
    UNDEFINED, op("EOR", AbsX, 4), op("LSR", AbsX, 7), UNDEFINED,
    // 0x60
    op("RTS", Implicit, 6), op("ADC", IndX, 6), UNDEFINED, UNDEFINED,
    op("STZ", Zp, 3), op("ADC", Zp, 3), op("ROR", Zp, 5), UNDEFINED,
    op("PLA", Implicit, 4), op("ADC", Imm, 2), op("ROR", Acc, 2), UNDEFINED,
    op("JMP", Ind, 6), op("ADC", Abs, 4), op("ROR", Abs, 6), UNDEFINED,
    // 0x70
    op("BVS", Rel, 2), op("ADC", IndY, 5), op("ADC", ZpInd, 5), UNDEFINED,
    op("STZ", ZpX, 4), op("ADC", ZpX, 4), op("ROR", ZpX, 6), UNDEFINED,
    op("SEI", Implicit, 2), op("ADC", AbsY, 4), op("PLY", Implicit, 4), UNDEFINED,
    op("JMP", AbsIndInd, 6), op("ADC", AbsX, 4), op("ROR", AbsX, 7), UNDEFINED,
    // 0x80
    op("BRA", Rel, 2), op("STA", IndX, 6), UNDEFINED, UNDEFINED,
    op("STY", Zp, 3), op("STA", Zp, 3), op("STX", Zp, 3), UNDEFINED,
    op("DEY", Implicit, 2), op("BIT", Imm, 2), op("TXA", Implicit, 2), UNDEFINED,
    op("STY", Abs, 4), op("STA", Abs, 4), op("STX", Abs, 4), UNDEFINED,
    // 0x90
    op("BCC", Rel, 2), op("STA", IndY, 6), op("STA", ZpInd, 5), UNDEFINED,
    op("STY", ZpX, 4), op("STA", ZpX, 4), op("STX", ZpY, 4), UNDEFINED,
    op("TYA", Implicit, 2), op("STA", AbsY, 5), op("TXS", Implicit, 2), UNDEFINED,
    op("STZ", Abs, 4), op("STA", AbsX, 5), op("STZ", AbsX, 5), UNDEFINED,
    // 0xA0
    op("LDY", Imm, 2), op("LDA", IndX, 6), op("LDX", Imm, 2), UNDEFINED,
    op("LDY", Zp, 3), op("LDA", Zp, 3), op("LDX", Zp, 3), UNDEFINED,
    op("TAY", Implicit, 2), op("LDA", Imm, 2), op("TAX", Implicit, 2), UNDEFINED,
    op("LDY", Abs, 4), op("LDA", Abs, 4), op("LDX", Abs, 4), UNDEFINED,
    // 0xB0
    op("BCS", Rel, 2), op("LDA", IndY, 5), op("LDA", ZpInd, 5), UNDEFINED,
    op("LDY", ZpX, 4), op("LDA", ZpX, 4), op("LDX", ZpY, 4), UNDEFINED,
    op("CLV", Implicit, 2), op("LDA", AbsY, 4), op("TSX", Implicit, 2), UNDEFINED,
    op("LDY", AbsX, 4), op("LDA", AbsX, 4), op("LDX", AbsY, 4), UNDEFINED,
    // 0xC0
    op("CPY", Imm, 2), op("CMP", IndX, 6), UNDEFINED, UNDEFINED,
    op("CPY", Zp, 3), op("CMP", Zp, 3), op("DEC", Zp, 5), UNDEFINED,
    op("INY", Implicit, 2), op("CMP", Imm, 2), op("DEX", Implicit, 2), UNDEFINED,
    op("CPY", Abs, 4), op("CMP", Abs, 4), op("DEC", Abs, 6), UNDEFINED,
    // 0xD0
    op("BNE", Rel, 2), op("CMP", IndY, 5), op("CMP", ZpInd, 5), UNDEFINED,
    UNDEFINED, op("CMP", ZpX, 4), op("DEC", ZpX, 6), UNDEFINED,
    op("CLD", Implicit, 2), op("CMP", AbsY, 4), op("PHX", Implicit, 3), UNDEFINED,
    UNDEFINED, op("CMP", AbsX, 4), op("DEC", AbsX, 7), UNDEFINED,
    // 0xE0
    op("CPX", Imm, 2), op("SBC", IndX, 6), UNDEFINED, UNDEFINED,
    op("CPX", Zp, 3), op("SBC", Zp, 3), op("INC", Zp, 5), UNDEFINED,
    op("INX", Implicit, 2), op("SBC", Imm, 2), op("NOP", Implicit, 2), UNDEFINED,
    op("CPX", Abs, 4), op("SBC", Abs, 4), op("INC", Abs, 6), UNDEFINED,
    // 0xF0
    op("BEQ", Rel, 2), op("SBC", IndY, 5), op("SBC", ZpInd, 5), UNDEFINED,
    UNDEFINED, op("SBC", ZpX, 4), op("INC", ZpX, 6), UNDEFINED,
    op("SED", Implicit, 2), op("SBC", AbsY, 4), op("PLX", Implicit, 4), UNDEFINED,
    UNDEFINED, op("SBC", AbsX, 4), op("INC", AbsX, 7), UNDEFINED,
];
