//! # 65C02 Instruction Implementations
//!
//! Each instruction is a standalone function taking the CPU and the opcode's
//! metadata. Instructions charge their own cycles and move PC themselves, since
//! branches, jumps and interrupts do not simply fall through.
//!
//! ## Categories
//!
//! - **alu**: ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT, TSB, TRB
//! - **branches**: BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS, BRA
//! - **shifts**: ASL, LSR, ROL, ROR
//! - **load_store**: LDA, LDX, LDY, STA, STX, STY, STZ
//! - **inc_dec**: INC, DEC, INX, INY, DEX, DEY
//! - **control**: JMP, JSR, RTS, RTI, BRK, NOP
//! - **stack**: PHA, PHP, PHX, PHY, PLA, PLP, PLX, PLY
//! - **flags**: CLC, SEC, CLI, SEI, CLD, SED, CLV
//! - **transfer**: TAX, TAY, TXA, TYA, TSX, TXS

use crate::opcodes::OpcodeMetadata;
use crate::{MemoryBus, CPU};

mod alu;
mod branches;
mod control;
mod flags;
mod inc_dec;
mod load_store;
mod shifts;
mod stack;
mod transfer;

/// Execute a defined instruction.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut CPU<M>, metadata: &OpcodeMetadata) {
    let (a, x, y, sp) = (cpu.a, cpu.x, cpu.y, cpu.sp);
    let (n, v, z, c) = (cpu.flag_n, cpu.flag_v, cpu.flag_z, cpu.flag_c);

    match metadata.mnemonic {
        "ADC" => alu::adc(cpu, metadata),
        "SBC" => alu::sbc(cpu, metadata),
        "AND" => alu::logic(cpu, metadata, |a, m| a & m),
        "ORA" => alu::logic(cpu, metadata, |a, m| a | m),
        "EOR" => alu::logic(cpu, metadata, |a, m| a ^ m),
        "CMP" => alu::compare(cpu, metadata, a),
        "CPX" => alu::compare(cpu, metadata, x),
        "CPY" => alu::compare(cpu, metadata, y),
        "BIT" => alu::bit(cpu, metadata),
        "TSB" => alu::test_and_modify(cpu, metadata, true),
        "TRB" => alu::test_and_modify(cpu, metadata, false),

        "BPL" => branches::branch_if(cpu, metadata, !n),
        "BMI" => branches::branch_if(cpu, metadata, n),
        "BVC" => branches::branch_if(cpu, metadata, !v),
        "BVS" => branches::branch_if(cpu, metadata, v),
        "BCC" => branches::branch_if(cpu, metadata, !c),
        "BCS" => branches::branch_if(cpu, metadata, c),
        "BNE" => branches::branch_if(cpu, metadata, !z),
        "BEQ" => branches::branch_if(cpu, metadata, z),
        "BRA" => branches::branch_if(cpu, metadata, true),

        "ASL" => shifts::asl(cpu, metadata),
        "LSR" => shifts::lsr(cpu, metadata),
        "ROL" => shifts::rol(cpu, metadata),
        "ROR" => shifts::ror(cpu, metadata),

        "LDA" => cpu.a = load_store::load(cpu, metadata),
        "LDX" => cpu.x = load_store::load(cpu, metadata),
        "LDY" => cpu.y = load_store::load(cpu, metadata),
        "STA" => load_store::store(cpu, metadata, a),
        "STX" => load_store::store(cpu, metadata, x),
        "STY" => load_store::store(cpu, metadata, y),
        "STZ" => load_store::store(cpu, metadata, 0),

        "INC" => inc_dec::modify(cpu, metadata, 1),
        "DEC" => inc_dec::modify(cpu, metadata, 0xFF),
        "INX" => cpu.x = inc_dec::register(cpu, metadata, x, 1),
        "INY" => cpu.y = inc_dec::register(cpu, metadata, y, 1),
        "DEX" => cpu.x = inc_dec::register(cpu, metadata, x, 0xFF),
        "DEY" => cpu.y = inc_dec::register(cpu, metadata, y, 0xFF),

        "JMP" => control::jmp(cpu, metadata),
        "JSR" => control::jsr(cpu, metadata),
        "RTS" => control::rts(cpu, metadata),
        "RTI" => control::rti(cpu, metadata),
        "BRK" => control::brk(cpu, metadata),
        "NOP" => cpu.finish(metadata.base_cycles, metadata.size_bytes, 0),

        "PHA" => stack::push(cpu, metadata, a),
        "PHX" => stack::push(cpu, metadata, x),
        "PHY" => stack::push(cpu, metadata, y),
        "PHP" => stack::php(cpu, metadata),
        "PLA" => cpu.a = stack::pull(cpu, metadata),
        "PLX" => cpu.x = stack::pull(cpu, metadata),
        "PLY" => cpu.y = stack::pull(cpu, metadata),
        "PLP" => stack::plp(cpu, metadata),

        "CLC" => flags::set(cpu, metadata, |cpu| cpu.flag_c = false),
        "SEC" => flags::set(cpu, metadata, |cpu| cpu.flag_c = true),
        "CLI" => flags::set(cpu, metadata, |cpu| cpu.flag_i = false),
        "SEI" => flags::set(cpu, metadata, |cpu| cpu.flag_i = true),
        "CLD" => flags::set(cpu, metadata, |cpu| cpu.flag_d = false),
        "SED" => flags::set(cpu, metadata, |cpu| cpu.flag_d = true),
        "CLV" => flags::set(cpu, metadata, |cpu| cpu.flag_v = false),

        "TAX" => cpu.x = transfer::transfer(cpu, metadata, a),
        "TAY" => cpu.y = transfer::transfer(cpu, metadata, a),
        "TXA" => cpu.a = transfer::transfer(cpu, metadata, x),
        "TYA" => cpu.a = transfer::transfer(cpu, metadata, y),
        "TSX" => cpu.x = transfer::transfer(cpu, metadata, sp),
        "TXS" => transfer::txs(cpu, metadata),

        other => unreachable!("opcode table mnemonic {other} has no implementation"),
    }
}
