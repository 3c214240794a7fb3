//! # Addressing Modes
//!
//! This module defines the addressing modes of the 65C02 processor. Each mode
//! determines how the CPU interprets operand bytes and calculates effective
//! addresses.

/// 65C02 addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implicit, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX,
///   IndirectY, ZeroPageIndirect
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect, AbsoluteIndexedIndirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    Implicit,

    /// Operates directly on the accumulator register.
    Accumulator,

    /// 8-bit constant operand in instruction.
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ZeroPage,

    /// Zero page address indexed by X register, wraps within zero page.
    ZeroPageX,

    /// Zero page address indexed by Y register, wraps within zero page.
    ZeroPageY,

    /// Signed 8-bit offset for branch instructions.
    Relative,

    /// Full 16-bit address.
    Absolute,

    /// 16-bit address indexed by X register.
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    AbsoluteY,

    /// Indirect jump through 16-bit pointer. Only used by JMP.
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference.
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    IndirectY,

    /// 65C02 zero page indirect: `(zp)`.
    ZeroPageIndirect,

    /// 65C02 `JMP (abs,X)`.
    AbsoluteIndexedIndirect,
}

impl AddressingMode {
    /// Total instruction size (opcode + operand bytes) for this mode.
    pub const fn instruction_size(self) -> u8 {
        use AddressingMode::*;
        match self {
            Implicit | Accumulator => 1,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | Relative | IndirectX | IndirectY
            | ZeroPageIndirect => 2,
            Absolute | AbsoluteX | AbsoluteY | Indirect | AbsoluteIndexedIndirect => 3,
        }
    }
}
