//! # Branch Instructions
//!
//! All branches use relative addressing with a signed 8-bit offset measured
//! from the instruction following the branch.
//!
//! Cycle timing:
//! - 2 cycles if branch not taken
//! - 3 cycles if branch taken to same page
//! - 4 cycles if branch taken to different page
//!
//! BRA (65C02) is a branch whose condition is always true.

use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

pub(crate) fn branch_if<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata, taken: bool) {
    let offset = cpu.memory.read(cpu.pc.wrapping_add(1)) as i8;
    let next = cpu.pc.wrapping_add(metadata.size_bytes as u16);
    let mut cycles = metadata.base_cycles as u64;

    if taken {
        let target = next.wrapping_add_signed(offset as i16);
        cycles += 1;
        if (next & 0xFF00) != (target & 0xFF00) {
            cycles += 1;
        }
        cpu.pc = target;
    } else {
        cpu.pc = next;
    }

    cpu.cycles += cycles;
}
