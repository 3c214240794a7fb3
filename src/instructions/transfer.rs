//! # Register Transfer Instructions
//!
//! TAX, TAY, TXA, TYA and TSX copy a register and set Z/N from it. TXS copies X
//! into the stack pointer and affects no flags.

use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

pub(crate) fn transfer<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, value: u8) -> u8 {
    cpu.set_zn(value);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
    value
}

pub(crate) fn txs<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    cpu.sp = cpu.x;
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}
