//! # Load and Store Instructions
//!
//! - LDA, LDX, LDY: Load a register, setting Z and N
//! - STA, STX, STY: Store a register
//! - STZ: Store zero (65C02)
//!
//! Loads pay one extra cycle when indexing crosses a page boundary; stores never do.

use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

/// Read the operand, update Z/N, and return the loaded value for the caller to
/// place in the destination register.
pub(crate) fn load<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) -> u8 {
    let (value, page_crossed) = cpu.operand_value(metadata.addressing_mode);
    cpu.set_zn(value);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, page_crossed as u64);
    value
}

/// Store `value` at the effective address. No flags are affected.
pub(crate) fn store<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, value: u8) {
    let (addr, _) = cpu.effective_address(metadata.addressing_mode);
    cpu.memory.write(addr, value);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}
