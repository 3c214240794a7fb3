//! # cerbemu
//!
//! An interactive execution-control harness for a 65C02 homebrew computer.
//!
//! The harness drives an instruction-set interpreter one step at a time,
//! intercepts writes to memory-mapped hardware, hands operator keystrokes to
//! the guest through a mailbox plus NMI, and lets an operator single-step or
//! free-run the machine while watching symbolic disassembly and registers.
//!
//! ## Quick Start
//!
//! ```rust
//! use cerbemu::{Interpreter, MemoryBus, ObservableMemory, CPU};
//!
//! let mut memory = ObservableMemory::new();
//! memory.load(0xC000, &[0xA9, 0x61, 0x8D, 0x01, 0xF0]); // LDA #$61; STA $F001
//! memory.write(0xFFFC, 0x00);
//! memory.write(0xFFFD, 0xC0);
//!
//! let mut cpu = CPU::new(memory);
//! cpu.step().unwrap();
//! cpu.step().unwrap();
//!
//! assert_eq!(cpu.a(), 0x61);
//! assert_eq!(cpu.bus().read(0xF001), 0x61);
//! ```
//!
//! ## Architecture
//!
//! Two flows share nothing but channels and a [`CancellationToken`]:
//!
//! - The **emulation flow** owns the machine. [`ExecutionController`] applies
//!   mode commands, checks breakpoints, steps the [`Interpreter`], lets the
//!   [`InputBridge`] deliver a pending key, and hands a [`DebugSnapshot`] to a
//!   [`Renderer`].
//! - The **operator flow** blocks on key presses and turns them into mode
//!   commands and key codes ([`operator`]).
//!
//! ## Modules
//!
//! - `memory` - MemoryBus trait and the flat 64KB image
//! - `observers` - Observable memory bus and write observers (video, status watch)
//! - `symbols` - Label listing with floor lookup
//! - `interpreter` - The interpreter seam used by the harness
//! - `cpu`, `opcodes`, `addressing` - The 65C02 interpreter
//! - `disassembler` - Instruction decode and formatting
//! - `input`, `controller`, `snapshot` - The execution-control core
//! - `config`, `harness` - Startup configuration and boot sequence
//! - `operator` - Key mapping and the operator loop
//! - `profiler` - Headless cycle profiler

pub mod addressing;
pub mod config;
pub mod controller;
pub mod cpu;
pub mod disassembler;
pub mod harness;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod observers;
pub mod opcodes;
pub mod operator;
pub mod profiler;
pub mod snapshot;
pub mod symbols;

// Internal instruction implementations (not part of public API)
mod instructions;

use thiserror::Error;

// Re-export public API
pub use addressing::AddressingMode;
pub use config::{ConfigError, HarnessConfig};
pub use controller::{CancellationToken, ExecutionController, Iteration, Renderer, RunMode};
pub use cpu::CPU;
pub use disassembler::Instruction;
pub use harness::{boot, BootOptions, Machine};
pub use input::{inject_nmi, InputBridge};
pub use interpreter::{Interpreter, Registers};
pub use memory::{FlatMemory, MemoryBus};
pub use observers::{
    observer_fn, BusWrite, ObservableMemory, ObserverError, ObserverId, StatusWatch, TextGrid,
    VideoSurface, WriteObserver,
};
pub use opcodes::{OpcodeMetadata, OPCODE_TABLE};
pub use snapshot::{DebugSnapshot, SnapshotBuilder};
pub use symbols::{Symbol, SymbolError, SymbolTable};

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The opcode byte has no defined 65C02 instruction.
    ///
    /// Contains the opcode byte value for debugging purposes.
    #[error("Opcode 0x{0:02X} is not implemented")]
    UnimplementedOpcode(u8),
}
