//! # Stack Operations
//!
//! The stack lives at 0x0100-0x01FF and grows downward. SP points at the next
//! free slot.
//!
//! - PHA, PHX, PHY, PHP: Push
//! - PLA, PLX, PLY, PLP: Pull (the register pulls set Z/N)

use crate::interpreter::status;
use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

pub(crate) fn push<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, value: u8) {
    cpu.push(value);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}

/// PHP always pushes with B and bit 5 set.
pub(crate) fn php<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let pushed = cpu.status() | status::BREAK | status::UNUSED;
    push(cpu, metadata, pushed);
}

pub(crate) fn pull<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) -> u8 {
    let value = cpu.pull();
    cpu.set_zn(value);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
    value
}

/// PLP ignores the B bit of the pulled byte; B is not a live flag.
pub(crate) fn plp<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let pulled = cpu.pull();
    cpu.set_status(pulled & !status::BREAK);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}
