//! Read-only projection of the machine for rendering.
//!
//! A [`DebugSnapshot`] is built once per controller iteration and handed to the
//! renderer. It holds copies only, so the renderer never touches live machine
//! state or the observers.
//!
//! Besides the 65C02 registers, the snapshot decodes the virtual registers of
//! the Forth system the firmware runs. They live in zero page just below
//! `W = 0x00FE`:
//!
//! ```text
//! 00F0 DTOP  00F2 COL  00F3 ROW  00F4 LINE  00F6 DP  00F8 G1  00FA G2  00FC IP  00FE W
//! ```
//!
//! The Forth data stack grows down through zero page, indexed by X.

use std::collections::VecDeque;

use crate::controller::RunMode;
use crate::disassembler::{decode_at, format_with_symbols, Instruction};
use crate::interpreter::{Interpreter, Registers, STACK_PAGE};
use crate::memory::MemoryBus;
use crate::observers::{ObservableMemory, ObserverId, StatusWatch, VideoSurface};
use crate::symbols::SymbolTable;

/// Zero-page layout of the Forth virtual machine.
pub mod forth {
    pub const W: u16 = 0x00FE;
    pub const IP: u16 = W - 2;
    pub const G2: u16 = IP - 2;
    pub const G1: u16 = G2 - 2;
    pub const DP: u16 = G1 - 2;
    pub const LINE: u16 = DP - 2;
    pub const ROW: u16 = LINE - 1;
    pub const COL: u16 = ROW - 1;
    /// Highest address a data-stack cell may occupy.
    pub const DTOP: u16 = COL - 2;

    /// Symbol naming the head of the dictionary.
    pub const LATEST_SYMBOL: &str = "LATEST";
}

/// Cells shown from each stack.
pub const STACK_DEPTH: usize = 5;

/// Bytes per row in the memory-before-HERE view.
pub const HERE_ROW_WIDTH: u16 = 10;

/// Decoded Forth registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForthRegisters {
    pub w: u16,
    pub ip: u16,
    pub g1: u16,
    pub g2: u16,
    /// Dictionary pointer (HERE).
    pub dp: u16,
    pub line: u16,
    pub row: u8,
    pub col: u8,
    /// Dictionary head, when the firmware exports a `LATEST` symbol.
    pub latest: Option<u16>,
}

/// One Forth data-stack cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackCell {
    /// Depth from the top of stack.
    pub index: usize,
    pub address: u16,
    pub value: u16,
}

/// A row of raw memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    pub address: u16,
    pub bytes: Vec<u8>,
}

/// Everything the renderer gets to see for one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSnapshot {
    pub mode: RunMode,
    /// Whether an instruction executed during this iteration.
    pub stepped: bool,
    pub registers: Registers,
    /// The instruction at PC, i.e. the next one to execute.
    pub instruction: Instruction,
    /// `<pc> <bytes> <disassembly> <label>` for the instruction at PC.
    pub current: String,
    /// Most recent `current` lines, oldest first.
    pub history: Vec<String>,
    pub forth: ForthRegisters,
    /// Two rows of memory ending at HERE.
    pub before_here: Vec<MemoryRow>,
    /// Forth data stack, top first. Cells past `DTOP` are omitted.
    pub data_stack: Vec<StackCell>,
    /// Hardware stack as `(address, byte)`, top first, up to 0x01FF.
    pub hardware_stack: Vec<(u16, u8)>,
    /// Video surface contents, present only when it changed since the last frame.
    pub screen: Option<Vec<String>>,
    /// New value of the watched status byte, if it changed.
    pub status_change: Option<u8>,
    /// Full register and stack panes are only meaningful while single-stepping.
    pub detailed: bool,
}

impl DebugSnapshot {
    /// One trace-log line:
    /// `A:.. X:.. Y:.. S:.. P:........ | W: .... IP: .... | <current>`.
    pub fn trace_line(&self) -> String {
        format!(
            "{} |  W: {:04X}  IP: {:04X} | {}",
            self.registers, self.forth.w, self.forth.ip, self.current
        )
    }
}

/// Builds snapshots and owns the state that outlives a single frame: the
/// symbol table and the rolling instruction history.
#[derive(Debug)]
pub struct SnapshotBuilder {
    symbols: SymbolTable,
    latest: Option<u16>,
    video: Option<ObserverId>,
    watch: Option<ObserverId>,
    history: VecDeque<String>,
}

impl SnapshotBuilder {
    /// Lines of instruction history kept.
    pub const HISTORY_DEPTH: usize = 8;

    pub fn new(symbols: SymbolTable) -> Self {
        let latest = symbols.address_for(forth::LATEST_SYMBOL).ok();
        Self {
            symbols,
            latest,
            video: None,
            watch: None,
            history: VecDeque::with_capacity(Self::HISTORY_DEPTH),
        }
    }

    /// Copy the video surface registered as `id` into snapshots when it changes.
    pub fn with_video(mut self, id: ObserverId) -> Self {
        self.video = Some(id);
        self
    }

    /// Report changes seen by the status watch registered as `id`.
    pub fn with_watch(mut self, id: ObserverId) -> Self {
        self.watch = Some(id);
        self
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Project the current machine state.
    ///
    /// Takes the interpreter mutably only to drain the observers' change flags.
    pub fn build<I>(&mut self, cpu: &mut I, mode: RunMode, stepped: bool) -> DebugSnapshot
    where
        I: Interpreter<Bus = ObservableMemory>,
    {
        let registers = cpu.registers();
        let bus = cpu.bus();

        let instruction = decode_at(bus, registers.pc);
        let current = self.describe(&instruction);
        if stepped {
            if self.history.len() == Self::HISTORY_DEPTH {
                self.history.pop_front();
            }
            self.history.push_back(current.clone());
        }

        let forth = ForthRegisters {
            w: bus.read_word(forth::W),
            ip: bus.read_word(forth::IP),
            g1: bus.read_word(forth::G1),
            g2: bus.read_word(forth::G2),
            dp: bus.read_word(forth::DP),
            line: bus.read_word(forth::LINE),
            row: bus.read(forth::ROW),
            col: bus.read(forth::COL),
            latest: self.latest.map(|addr| bus.read_word(addr)),
        };

        let before_here = [1u16, 0]
            .iter()
            .map(|&row| {
                let address = forth
                    .dp
                    .wrapping_sub(HERE_ROW_WIDTH - 1)
                    .wrapping_sub(HERE_ROW_WIDTH * row);
                MemoryRow {
                    address,
                    bytes: bus.slice(address, HERE_ROW_WIDTH as usize),
                }
            })
            .collect();

        let data_stack = (0..STACK_DEPTH)
            .map(|index| (index, registers.x as u16 + 2 * index as u16))
            .take_while(|&(_, address)| address <= forth::DTOP)
            .map(|(index, address)| StackCell {
                index,
                address,
                value: bus.read_word(address),
            })
            .collect();

        let hardware_stack = (0..STACK_DEPTH as u16)
            .map(|i| STACK_PAGE + registers.sp as u16 + 1 + i)
            .take_while(|&address| address <= 0x01FF)
            .map(|address| (address, bus.read(address)))
            .collect();

        let bus = cpu.bus_mut();
        let mut screen = None;
        if let Some(id) = self.video {
            if let Some(video) = bus.observer_mut::<VideoSurface>(id) {
                if video.take_dirty() {
                    screen = Some(video.grid().lines());
                }
            }
        }
        let status_change = match self.watch {
            Some(id) => bus.observer_mut::<StatusWatch>(id).and_then(|w| w.take_change()),
            None => None,
        };

        DebugSnapshot {
            mode,
            stepped,
            registers,
            instruction,
            current,
            history: self.history.iter().cloned().collect(),
            forth,
            before_here,
            data_stack,
            hardware_stack,
            screen,
            status_change,
            detailed: mode == RunMode::Step,
        }
    }

    fn describe(&self, instruction: &Instruction) -> String {
        let label = self.symbols.label_for(instruction.address).unwrap_or("");
        format!(
            "{:04X}  {:<8}  {:<24} {}",
            instruction.address,
            instruction.hex_bytes(),
            format_with_symbols(instruction, &self.symbols),
            label
        )
        .trim_end()
        .to_string()
    }
}
