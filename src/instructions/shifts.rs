//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL and ROR operate on the accumulator or on memory. The bit
//! shifted out lands in C; Z and N follow the result.
//!
//! The 65C02 skips the extra cycle on `abs,X` read-modify-write when no page
//! boundary is crossed; this table charges the NMOS timing throughout.

use crate::addressing::AddressingMode;
use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

/// Apply `op` to the operand in place. `op` returns the result and carry out.
fn read_modify_write<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
    op: impl FnOnce(u8, bool) -> (u8, bool),
) {
    let carry_in = cpu.flag_c;
    let result = if metadata.addressing_mode == AddressingMode::Accumulator {
        let (result, carry) = op(cpu.a, carry_in);
        cpu.a = result;
        cpu.flag_c = carry;
        result
    } else {
        let (addr, _) = cpu.effective_address(metadata.addressing_mode);
        let (result, carry) = op(cpu.memory.read(addr), carry_in);
        cpu.memory.write(addr, result);
        cpu.flag_c = carry;
        result
    };
    cpu.set_zn(result);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}

pub(crate) fn asl<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    read_modify_write(cpu, metadata, |value, _| (value << 1, value & 0x80 != 0));
}

pub(crate) fn lsr<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    read_modify_write(cpu, metadata, |value, _| (value >> 1, value & 0x01 != 0));
}

pub(crate) fn rol<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    read_modify_write(cpu, metadata, |value, carry| {
        ((value << 1) | carry as u8, value & 0x80 != 0)
    });
}

pub(crate) fn ror<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    read_modify_write(cpu, metadata, |value, carry| {
        ((value >> 1) | ((carry as u8) << 7), value & 0x01 != 0)
    });
}
