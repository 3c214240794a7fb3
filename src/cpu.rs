//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the 65C02 processor state and
//! the fetch-decode-execute step. It is the interpreter the harness drives through
//! the [`Interpreter`] trait.
//!
//! ## CPU State
//!
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next instruction
//! - **Stack pointer** (SP): 8-bit offset into stack page (0x0100-0x01FF)
//! - **Status flags**: N, V, B, D, I, Z, C (individual bool fields)
//! - **Cycle counter**: u64 monotonically increasing cycle count

use crate::addressing::AddressingMode;
use crate::instructions;
use crate::interpreter::{status, Interpreter, Registers, RESET_VECTOR, STACK_PAGE};
use crate::{ExecutionError, MemoryBus, OPCODE_TABLE};

/// 65C02 CPU state and execution context.
///
/// # Examples
///
/// ```
/// use cerbemu::{CPU, FlatMemory, MemoryBus};
///
/// let mut memory = FlatMemory::new();
/// memory.write(0xFFFC, 0x00);
/// memory.write(0xFFFD, 0xC0);
///
/// let cpu = CPU::new(memory);
/// assert_eq!(cpu.pc(), 0xC000);
/// assert_eq!(cpu.sp(), 0xFD);
/// assert!(cpu.flag_i());
/// assert_eq!(cpu.cycles(), 0);
/// ```
pub struct CPU<M: MemoryBus> {
    /// Accumulator register
    pub(crate) a: u8,

    /// X index register
    pub(crate) x: u8,

    /// Y index register
    pub(crate) y: u8,

    /// Program counter (address of next instruction)
    pub(crate) pc: u16,

    /// Stack pointer (0x0100 + sp gives full stack address)
    pub(crate) sp: u8,

    pub(crate) flag_n: bool,
    pub(crate) flag_v: bool,
    pub(crate) flag_b: bool,
    pub(crate) flag_d: bool,
    pub(crate) flag_i: bool,
    pub(crate) flag_z: bool,
    pub(crate) flag_c: bool,

    /// Total CPU cycles executed
    pub(crate) cycles: u64,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a new CPU in the power-on reset state.
    ///
    /// - PC is loaded from the reset vector at 0xFFFC/0xFFFD (little-endian)
    /// - SP is 0xFD
    /// - Interrupt Disable is set
    /// - A, X, Y and the cycle counter are zero
    pub fn new(memory: M) -> Self {
        let pc = memory.read_word(RESET_VECTOR);

        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            pc,
            sp: 0xFD,
            flag_n: false,
            flag_v: false,
            flag_b: false,
            flag_d: false,
            flag_i: true,
            flag_z: false,
            flag_c: false,
            cycles: 0,
            memory,
        }
    }

    /// Executes one instruction and advances the CPU state.
    ///
    /// Undefined opcodes still consume their table size and cycles, so the CPU
    /// never gets stuck on them, and are reported as
    /// [`ExecutionError::UnimplementedOpcode`].
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        let opcode = self.memory.read(self.pc);
        let metadata = &OPCODE_TABLE[opcode as usize];

        if metadata.is_undefined() {
            self.cycles += metadata.base_cycles as u64;
            self.pc = self.pc.wrapping_add(metadata.size_bytes as u16);
            return Err(ExecutionError::UnimplementedOpcode(opcode));
        }

        instructions::execute(self, metadata);
        Ok(())
    }

    // ========== Operand Resolution ==========

    /// Effective address of the current instruction's operand, and whether
    /// indexing crossed a page boundary.
    ///
    /// For `Immediate` and `Relative` this is the address of the operand byte.
    pub(crate) fn effective_address(&self, mode: AddressingMode) -> (u16, bool) {
        use AddressingMode::*;

        let operand = self.pc.wrapping_add(1);
        match mode {
            Implicit | Accumulator | Immediate | Relative => (operand, false),
            ZeroPage => (self.memory.read(operand) as u16, false),
            ZeroPageX => (self.memory.read(operand).wrapping_add(self.x) as u16, false),
            ZeroPageY => (self.memory.read(operand).wrapping_add(self.y) as u16, false),
            Absolute => (self.memory.read_word(operand), false),
            AbsoluteX => indexed(self.memory.read_word(operand), self.x),
            AbsoluteY => indexed(self.memory.read_word(operand), self.y),
            // The 65C02 reads the high byte across page boundaries correctly
            Indirect => (self.memory.read_word(self.memory.read_word(operand)), false),
            AbsoluteIndexedIndirect => {
                let pointer = self.memory.read_word(operand).wrapping_add(self.x as u16);
                (self.memory.read_word(pointer), false)
            }
            IndirectX => {
                let pointer = self.memory.read(operand).wrapping_add(self.x);
                (self.zero_page_word(pointer), false)
            }
            IndirectY => {
                let base = self.zero_page_word(self.memory.read(operand));
                indexed(base, self.y)
            }
            ZeroPageIndirect => (self.zero_page_word(self.memory.read(operand)), false),
        }
    }

    /// Operand value for read instructions, and the page-cross flag.
    pub(crate) fn operand_value(&self, mode: AddressingMode) -> (u8, bool) {
        if mode == AddressingMode::Accumulator {
            return (self.a, false);
        }
        let (addr, page_crossed) = self.effective_address(mode);
        (self.memory.read(addr), page_crossed)
    }

    /// Word stored in zero page; the high byte wraps within zero page.
    fn zero_page_word(&self, pointer: u8) -> u16 {
        let low = self.memory.read(pointer as u16) as u16;
        let high = self.memory.read(pointer.wrapping_add(1) as u16) as u16;
        (high << 8) | low
    }

    /// Charge the instruction's cycles and move PC past it.
    pub(crate) fn finish(&mut self, base_cycles: u8, size_bytes: u8, extra_cycles: u64) {
        self.cycles += base_cycles as u64 + extra_cycles;
        self.pc = self.pc.wrapping_add(size_bytes as u16);
    }

    /// Set Z and N from `value`.
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.flag_z = value == 0;
        self.flag_n = (value & 0x80) != 0;
    }

    // ========== Stack ==========

    pub(crate) fn push(&mut self, value: u8) {
        self.memory.write(STACK_PAGE | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.memory.read(STACK_PAGE | self.sp as u16)
    }

    pub(crate) fn pull_word(&mut self) -> u16 {
        let low = self.pull() as u16;
        let high = self.pull() as u16;
        (high << 8) | low
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// Note: The full stack address is 0x0100 + SP. The stack grows downward from 0x01FF.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the status register as a packed byte (NV-BDIZC, bit 5 always 1).
    pub fn status(&self) -> u8 {
        let mut packed = status::UNUSED;
        for (set, bit) in [
            (self.flag_n, status::NEGATIVE),
            (self.flag_v, status::OVERFLOW),
            (self.flag_b, status::BREAK),
            (self.flag_d, status::DECIMAL),
            (self.flag_i, status::INTERRUPT),
            (self.flag_z, status::ZERO),
            (self.flag_c, status::CARRY),
        ] {
            if set {
                packed |= bit;
            }
        }
        packed
    }

    /// Unpack a status byte into the individual flags.
    pub fn set_status(&mut self, packed: u8) {
        self.flag_n = packed & status::NEGATIVE != 0;
        self.flag_v = packed & status::OVERFLOW != 0;
        self.flag_b = packed & status::BREAK != 0;
        self.flag_d = packed & status::DECIMAL != 0;
        self.flag_i = packed & status::INTERRUPT != 0;
        self.flag_z = packed & status::ZERO != 0;
        self.flag_c = packed & status::CARRY != 0;
    }

    /// Returns the total number of CPU cycles executed since initialization.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    // ========== Register Setters ==========

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    pub fn set_flag_i(&mut self, value: bool) {
        self.flag_i = value;
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}

/// Add an index to a base address, reporting page crossing.
fn indexed(base: u16, index: u8) -> (u16, bool) {
    let addr = base.wrapping_add(index as u16);
    (addr, (base & 0xFF00) != (addr & 0xFF00))
}

impl<M: MemoryBus> Interpreter for CPU<M> {
    type Bus = M;

    fn step(&mut self) -> Result<(), ExecutionError> {
        CPU::step(self)
    }

    fn registers(&self) -> Registers {
        Registers {
            pc: self.pc,
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            status: self.status(),
            cycles: self.cycles,
        }
    }

    fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    fn set_status(&mut self, packed: u8) {
        CPU::set_status(self, packed);
    }

    fn add_cycles(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    fn push_byte(&mut self, value: u8) {
        self.push(value);
    }

    fn bus(&self) -> &M {
        &self.memory
    }

    fn bus_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}
