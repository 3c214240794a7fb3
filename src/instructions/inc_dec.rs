//! # Increment and Decrement Instructions
//!
//! - INC, DEC: Memory or accumulator (65C02 `INC A` / `DEC A`)
//! - INX, INY, DEX, DEY: Index registers
//!
//! `delta` is 1 for increments and 0xFF (wrapping -1) for decrements.

use crate::addressing::AddressingMode;
use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

pub(crate) fn modify<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, delta: u8) {
    if metadata.addressing_mode == AddressingMode::Accumulator {
        cpu.a = cpu.a.wrapping_add(delta);
        cpu.set_zn(cpu.a);
    } else {
        let (addr, _) = cpu.effective_address(metadata.addressing_mode);
        let result = cpu.memory.read(addr).wrapping_add(delta);
        cpu.memory.write(addr, result);
        cpu.set_zn(result);
    }
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}

pub(crate) fn register<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
    value: u8,
    delta: u8,
) -> u8 {
    let result = value.wrapping_add(delta);
    cpu.set_zn(result);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
    result
}
