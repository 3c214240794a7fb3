//! # Status Flag Manipulation Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED and CLV each flip a single flag. They use
//! implied addressing and execute in 2 cycles.

use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

pub(crate) fn set<M: MemoryBus>(
    cpu: &mut CPU<M>,
    metadata: &OpcodeMetadata,
    apply: impl FnOnce(&mut CPU<M>),
) {
    apply(cpu);
    cpu.finish(metadata.base_cycles, metadata.size_bytes, 0);
}
