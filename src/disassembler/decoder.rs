//! Instruction decoder

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;
use crate::memory::MemoryBus;
use crate::opcodes::OPCODE_TABLE;

/// Decode a single instruction from a byte slice
///
/// # Returns
///
/// `None` for undefined opcodes or when `bytes` is shorter than the instruction.
pub fn decode_instruction(bytes: &[u8], address: u16) -> Option<Instruction> {
    let (&opcode, operands) = bytes.split_first()?;
    let metadata = &OPCODE_TABLE[opcode as usize];

    if metadata.is_undefined() {
        return None;
    }

    let operand_len = metadata.size_bytes as usize - 1;
    if operands.len() < operand_len {
        return None;
    }

    Some(Instruction {
        address,
        opcode,
        mnemonic: metadata.mnemonic,
        addressing_mode: metadata.addressing_mode,
        operand_bytes: operands[..operand_len].to_vec(),
        size_bytes: metadata.size_bytes,
        base_cycles: metadata.base_cycles,
    })
}

/// Decode the instruction at `address` straight from the bus.
///
/// Never fails: an undefined opcode comes back as a one-byte `.byte` directive.
/// Reads have no side effects on the bus, so this is safe on live memory.
pub fn decode_at<M: MemoryBus + ?Sized>(bus: &M, address: u16) -> Instruction {
    let bytes = [
        bus.read(address),
        bus.read(address.wrapping_add(1)),
        bus.read(address.wrapping_add(2)),
    ];
    decode_instruction(&bytes, address).unwrap_or(Instruction {
        address,
        opcode: bytes[0],
        mnemonic: ".byte",
        addressing_mode: AddressingMode::Implicit,
        operand_bytes: Vec::new(),
        size_bytes: 1,
        base_cycles: 0,
    })
}
