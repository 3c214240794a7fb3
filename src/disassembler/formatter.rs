//! Formatting functions for disassembled instructions

use crate::addressing::AddressingMode;
use crate::disassembler::Instruction;
use crate::symbols::SymbolTable;

/// Format a single instruction as assembly text, e.g. `STA $F001`.
pub fn format_instruction(instr: &Instruction) -> String {
    let operand = format_operand(instr);

    if operand.is_empty() {
        instr.mnemonic.to_string()
    } else {
        format!("{} {}", instr.mnemonic, operand)
    }
}

/// Format an instruction, appending the label of its target when one resolves.
///
/// `JSR $C23D` becomes `JSR $C23D (do_PUSH1)`.
pub fn format_with_symbols(instr: &Instruction, symbols: &SymbolTable) -> String {
    let text = format_instruction(instr);
    match instr.target().and_then(|t| symbols.label_for(t).ok()) {
        Some(label) => format!("{text} ({label})"),
        None => text,
    }
}

/// Format the operand based on addressing mode
fn format_operand(instr: &Instruction) -> String {
    use AddressingMode::*;

    if instr.mnemonic == ".byte" {
        return format!("${:02X}", instr.opcode);
    }

    let byte = instr.operand_bytes.first().copied().unwrap_or(0);
    let word = match instr.operand_bytes.as_slice() {
        [lo, hi] => u16::from_le_bytes([*lo, *hi]),
        _ => 0,
    };

    match instr.addressing_mode {
        Implicit => String::new(),
        Accumulator => "A".to_string(),
        Immediate => format!("#${byte:02X}"),
        ZeroPage => format!("${byte:02X}"),
        ZeroPageX => format!("${byte:02X},X"),
        ZeroPageY => format!("${byte:02X},Y"),
        ZeroPageIndirect => format!("(${byte:02X})"),
        IndirectX => format!("(${byte:02X},X)"),
        IndirectY => format!("(${byte:02X}),Y"),
        Relative => format!("${:04X}", instr.target().unwrap_or(0)),
        Absolute => format!("${word:04X}"),
        AbsoluteX => format!("${word:04X},X"),
        AbsoluteY => format!("${word:04X},Y"),
        Indirect => format!("(${word:04X})"),
        AbsoluteIndexedIndirect => format!("(${word:04X},X)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::decode_instruction;

    fn text(bytes: &[u8]) -> String {
        format_instruction(&decode_instruction(bytes, 0x8000).unwrap())
    }

    #[test]
    fn test_format_modes() {
        assert_eq!(text(&[0xA9, 0x42]), "LDA #$42");
        assert_eq!(text(&[0x8D, 0x00, 0x80]), "STA $8000");
        assert_eq!(text(&[0xEA]), "NOP");
        assert_eq!(text(&[0x0A]), "ASL A");
        assert_eq!(text(&[0xB2, 0x10]), "LDA ($10)");
        assert_eq!(text(&[0x7C, 0x00, 0xC1]), "JMP ($C100,X)");
        assert_eq!(text(&[0xB1, 0xFE]), "LDA ($FE),Y");
        assert_eq!(text(&[0x80, 0x02]), "BRA $8004");
    }

    #[test]
    fn test_format_illegal_opcode() {
        let instr = Instruction {
            address: 0x2000,
            opcode: 0xFF,
            mnemonic: ".byte",
            addressing_mode: AddressingMode::Implicit,
            operand_bytes: vec![],
            size_bytes: 1,
            base_cycles: 0,
        };

        assert_eq!(format_instruction(&instr), ".byte $FF");
    }

    #[test]
    fn test_format_with_symbols() {
        let symbols = SymbolTable::parse("al 00C23D .do_PUSH1\n").unwrap();
        let instr = decode_instruction(&[0x20, 0x3D, 0xC2], 0xC000).unwrap();
        assert_eq!(format_with_symbols(&instr, &symbols), "JSR $C23D (do_PUSH1)");

        let below = decode_instruction(&[0x20, 0x00, 0x10], 0xC000).unwrap();
        assert_eq!(format_with_symbols(&below, &symbols), "JSR $1000");
    }
}
