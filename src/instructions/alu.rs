//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! - ADC, SBC: Add/subtract with carry, binary or BCD depending on D
//! - AND, ORA, EOR: Bitwise logic into the accumulator
//! - CMP, CPX, CPY: Register comparison
//! - BIT: Bit test
//! - TSB, TRB: Test and set/reset memory bits (65C02)

use crate::addressing::AddressingMode;
use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

/// Executes the ADC (Add with Carry) instruction.
///
/// In decimal mode the 65C02 produces valid N and Z flags for the BCD result and
/// takes one extra cycle.
pub(crate) fn adc<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);
    let a = cpu.a;
    let carry_in = cpu.flag_c as u16;
    let mut extra = page_crossed as u64;

    let result = if cpu.flag_d {
        extra += 1;
        let mut lo = (a & 0x0F) as u16 + (value & 0x0F) as u16 + carry_in;
        let mut hi = (a & 0xF0) as u16 + (value & 0xF0) as u16;
        if lo > 0x09 {
            lo += 0x06;
        }
        if lo > 0x0F {
            hi += 0x10;
        }
        cpu.flag_v = ((a ^ hi as u8) & (value ^ hi as u8) & 0x80) != 0;
        if hi > 0x90 {
            hi += 0x60;
        }
        cpu.flag_c = hi > 0xFF;
        ((hi & 0xF0) | (lo & 0x0F)) as u8
    } else {
        let sum = a as u16 + value as u16 + carry_in;
        let result = sum as u8;
        cpu.flag_c = sum > 0xFF;
        // Both operands share a sign the result does not
        cpu.flag_v = ((a ^ result) & (value ^ result) & 0x80) != 0;
        result
    };

    cpu.a = result;
    cpu.set_zn(result);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, extra);
}

/// Executes the SBC (Subtract with Carry) instruction.
///
/// Carry is an inverted borrow. V and C come from the binary difference in both
/// modes.
pub(crate) fn sbc<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);
    let a = cpu.a;
    let borrow = (!cpu.flag_c) as i16;
    let mut extra = page_crossed as u64;

    let difference = a as i16 - value as i16 - borrow;
    let binary = difference as u8;
    cpu.flag_c = difference >= 0;
    cpu.flag_v = ((a ^ value) & (a ^ binary) & 0x80) != 0;

    let result = if cpu.flag_d {
        extra += 1;
        let mut lo = (a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow;
        let mut hi = (a >> 4) as i16 - (value >> 4) as i16;
        if lo < 0 {
            lo += 10;
            hi -= 1;
        }
        if hi < 0 {
            hi += 10;
        }
        (((hi & 0x0F) << 4) | (lo & 0x0F)) as u8
    } else {
        binary
    };

    cpu.a = result;
    cpu.set_zn(result);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, extra);
}

/// AND, ORA and EOR: combine the operand into the accumulator with `op`.
pub(crate) fn logic<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
    op: impl Fn(u8, u8) -> u8,
) {
    let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);
    cpu.a = op(cpu.a, value);
    cpu.set_zn(cpu.a);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, page_crossed as u64);
}

/// CMP, CPX and CPY. C is set when `register >= operand`.
pub(crate) fn compare<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, register: u8) {
    let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);
    cpu.flag_c = register >= value;
    cpu.set_zn(register.wrapping_sub(value));
    cpu.finish(metadata.base_cycles, metadata.size_bytes, page_crossed as u64);
}

/// BIT copies operand bits 7 and 6 into N and V, except in the immediate form
/// which only touches Z.
pub(crate) fn bit<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);
    cpu.flag_z = (cpu.a & value) == 0;
    if metadata.addressing_mode != AddressingMode::Immediate {
        cpu.flag_n = (value & 0x80) != 0;
        cpu.flag_v = (value & 0x40) != 0;
    }
    cpu.finish(metadata.base_cycles, metadata.size_bytes, page_crossed as u64);
}

/// TSB (`set`) or TRB (`!set`). Z reflects `A & M` before modification.
pub(crate) fn test_and_modify<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, set: bool) {
    let (addr, _) = cpu.effective_address(metadata.addressing_mode);
    let value = cpu.memory.read(addr);
    cpu.flag_z = (cpu.a & value) == 0;
    let result = if set { value | cpu.a } else { value & !cpu.a };
    cpu.memory.write(addr, result);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}
