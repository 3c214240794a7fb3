//! # Control Flow Instructions
//!
//! - JMP: Absolute, indirect and (65C02) absolute indexed indirect
//! - JSR / RTS: Subroutine call and return
//! - RTI: Return from interrupt
//! - BRK: Software interrupt through the IRQ vector

use crate::interpreter::{status, IRQ_VECTOR};
use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

pub(crate) fn jmp<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let (target, _) = cpu.effective_address(metadata.addressing_mode);
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = target;
}

/// JSR pushes the address of its own last byte (PC + 2), high byte first.
pub(crate) fn jsr<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let (target, _) = cpu.effective_address(metadata.addressing_mode);
    let return_addr = cpu.pc.wrapping_add(2);
    cpu.push((return_addr >> 8) as u8);
    cpu.push(return_addr as u8);
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = target;
}

pub(crate) fn rts<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    cpu.pc = cpu.pull_word().wrapping_add(1);
    cpu.cycles += metadata.base_cycles as u64;
}

/// RTI restores status (ignoring B) then PC. Unlike RTS there is no +1.
pub(crate) fn rti<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let pulled = cpu.pull();
    cpu.set_status(pulled & !status::BREAK);
    cpu.pc = cpu.pull_word();
    cpu.cycles += metadata.base_cycles as u64;
}

/// BRK skips a padding byte, pushes PC + 2 and status with B set, then vectors
/// through 0xFFFE. The 65C02 also clears D.
pub(crate) fn brk<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let return_addr = cpu.pc.wrapping_add(2);
    cpu.push((return_addr >> 8) as u8);
    cpu.push(return_addr as u8);
    cpu.push(cpu.status() | status::BREAK | status::UNUSED);
    cpu.flag_i = true;
    cpu.flag_d = false;
    cpu.cycles += metadata.base_cycles as u64;
    cpu.pc = cpu.memory.read_word(IRQ_VECTOR);
}
