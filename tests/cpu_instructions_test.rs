//! Instruction semantics the firmware relies on, including the 65C02 additions.

use cerbemu::{ExecutionError, FlatMemory, MemoryBus, CPU};

/// Helper function to create a CPU with reset vector at 0x8000
fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

fn setup_with(program: &[u8]) -> CPU<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x8000, program);
    cpu
}

// ========== Decimal Mode ==========

#[test]
fn test_adc_decimal() {
    // ADC #$28
    let mut cpu = setup_with(&[0x69, 0x28]);
    cpu.set_a(0x19);
    cpu.set_flag_d(true);
    cpu.set_flag_c(false);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x47);
    assert!(!cpu.flag_c());
    assert_eq!(cpu.cycles(), 3); // one extra cycle in decimal mode
}

#[test]
fn test_adc_decimal_carry_and_zero() {
    // ADC #$01
    let mut cpu = setup_with(&[0x69, 0x01]);
    cpu.set_a(0x99);
    cpu.set_flag_d(true);
    cpu.set_flag_c(false);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
}

#[test]
fn test_sbc_decimal() {
    // SBC #$01 ; SBC #$01
    let mut cpu = setup_with(&[0xE9, 0x01, 0xE9, 0x01]);
    cpu.set_a(0x50);
    cpu.set_flag_d(true);
    cpu.set_flag_c(true);

    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x49);
    assert!(cpu.flag_c());

    cpu.set_a(0x00);
    cpu.step().unwrap();
    assert_eq!(cpu.a(), 0x99);
    assert!(!cpu.flag_c());
}

#[test]
fn test_adc_binary_overflow() {
    // ADC #$50
    let mut cpu = setup_with(&[0x69, 0x50]);
    cpu.set_a(0x50);
    cpu.set_flag_c(false);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0xA0);
    assert!(cpu.flag_v());
    assert!(cpu.flag_n());
    assert!(!cpu.flag_c());
    assert_eq!(cpu.cycles(), 2);
}

// ========== Branch Timing ==========

#[test]
fn test_branch_not_taken() {
    // BNE +5
    let mut cpu = setup_with(&[0xD0, 0x05]);
    cpu.set_flag_z(true);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn test_branch_taken_same_page() {
    // BNE +5
    let mut cpu = setup_with(&[0xD0, 0x05]);
    cpu.set_flag_z(false);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8007);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_branch_taken_page_cross() {
    let mut cpu = setup_cpu();
    // BNE +5 at 0x80FD; next instruction 0x80FF, target 0x8104
    cpu.memory_mut().load(0x80FD, &[0xD0, 0x05]);
    cpu.set_pc(0x80FD);
    cpu.set_flag_z(false);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8104);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_bra_backwards() {
    // BRA -2 (branch to self)
    let mut cpu = setup_with(&[0x80, 0xFE]);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(cpu.cycles(), 3);
}

// ========== Subroutines and Interrupts ==========

#[test]
fn test_jsr_rts() {
    // JSR $9000 ; ... $9000: RTS
    let mut cpu = setup_with(&[0x20, 0x00, 0x90]);
    cpu.memory_mut().write(0x9000, 0x60);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x9000);
    assert_eq!(cpu.sp(), 0xFB);
    assert_eq!(cpu.memory().read(0x01FD), 0x80);
    assert_eq!(cpu.memory().read(0x01FC), 0x02);
    assert_eq!(cpu.cycles(), 6);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8003);
    assert_eq!(cpu.sp(), 0xFD);
    assert_eq!(cpu.cycles(), 12);
}

#[test]
fn test_brk_then_rti() {
    // BRK ; pad ... $9000: RTI
    let mut cpu = setup_with(&[0x00, 0xFF]);
    cpu.memory_mut().load(0xFFFE, &[0x00, 0x90]);
    cpu.memory_mut().write(0x9000, 0x40);
    cpu.set_flag_d(true);
    cpu.set_flag_i(false);
    cpu.set_flag_c(true);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x9000);
    assert!(cpu.flag_i());
    assert!(!cpu.flag_d());
    let pushed = cpu.memory().read(0x01FB);
    assert_eq!(pushed & 0x30, 0x30); // B and bit 5
    assert_eq!(pushed & 0x08, 0x08); // D as it was
    assert_eq!(cpu.cycles(), 7);

    cpu.step().unwrap();
    assert_eq!(cpu.pc(), 0x8002);
    assert!(cpu.flag_d());
    assert!(!cpu.flag_i());
    assert!(cpu.flag_c());
    assert_eq!(cpu.sp(), 0xFD);
}

// ========== 65C02 Additions ==========

#[test]
fn test_stz_absolute() {
    // STZ $0300
    let mut cpu = setup_with(&[0x9C, 0x00, 0x03]);
    cpu.memory_mut().write(0x0300, 0x5A);

    cpu.step().unwrap();

    assert_eq!(cpu.memory().read(0x0300), 0x00);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_tsb_trb() {
    // TSB $10 ; TRB $11
    let mut cpu = setup_with(&[0x04, 0x10, 0x14, 0x11]);
    cpu.memory_mut().write(0x0010, 0xF0);
    cpu.memory_mut().write(0x0011, 0xFF);
    cpu.set_a(0x0F);

    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x0010), 0xFF);
    assert!(cpu.flag_z());

    cpu.step().unwrap();
    assert_eq!(cpu.memory().read(0x0011), 0xF0);
    assert!(!cpu.flag_z());
}

#[test]
fn test_phx_ply() {
    // PHX ; PLY
    let mut cpu = setup_with(&[0xDA, 0x7A]);
    cpu.set_x(0x80);

    cpu.step().unwrap();
    cpu.step().unwrap();

    assert_eq!(cpu.y(), 0x80);
    assert!(cpu.flag_n());
    assert_eq!(cpu.sp(), 0xFD);
    assert_eq!(cpu.cycles(), 7);
}

#[test]
fn test_inc_accumulator() {
    // INC A
    let mut cpu = setup_with(&[0x1A]);
    cpu.set_a(0xFF);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());
}

#[test]
fn test_bit_immediate_only_sets_z() {
    // BIT #$C0
    let mut cpu = setup_with(&[0x89, 0xC0]);
    cpu.set_a(0x01);
    cpu.set_flag_n(false);
    cpu.set_flag_v(false);

    cpu.step().unwrap();

    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
    assert!(!cpu.flag_v());
}

#[test]
fn test_lda_zero_page_indirect() {
    // LDA ($20)
    let mut cpu = setup_with(&[0xB2, 0x20]);
    cpu.memory_mut().load(0x0020, &[0x34, 0x12]);
    cpu.memory_mut().write(0x1234, 0x99);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x99);
    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn test_jmp_indirect_across_page() {
    // JMP ($10FF): the 65C02 reads the high byte from $1100
    let mut cpu = setup_with(&[0x6C, 0xFF, 0x10]);
    cpu.memory_mut().write(0x10FF, 0x34);
    cpu.memory_mut().write(0x1100, 0x12);
    cpu.memory_mut().write(0x1000, 0x56);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_jmp_absolute_indexed_indirect() {
    // JMP ($2000,X)
    let mut cpu = setup_with(&[0x7C, 0x00, 0x20]);
    cpu.memory_mut().load(0x2004, &[0x00, 0xA0]);
    cpu.set_x(4);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0xA000);
    assert_eq!(cpu.cycles(), 6);
}

// ========== Undefined Opcodes ==========

#[test]
fn test_undefined_opcode_reports_and_advances() {
    let mut cpu = setup_with(&[0x02, 0xEA]);

    let result = cpu.step();

    assert_eq!(result, Err(ExecutionError::UnimplementedOpcode(0x02)));
    assert_ne!(cpu.pc(), 0x8000);
    cpu.step().unwrap();
}
