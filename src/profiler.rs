//! Headless cycle profiler.
//!
//! Runs the firmware from reset until its boot flag clears, charging every
//! instruction's cycles to the address it executed from, then folds the
//! per-address totals into per-routine totals using the symbol table.
//!
//! A routine is the nearest label at or below an address, skipping local
//! (`@`) labels, so time spent in `@loop` inside `do_DUP` is charged to
//! `do_DUP`.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use crate::disassembler::decode_at;
use crate::interpreter::Interpreter;
use crate::memory::{MemoryBus, ADDRESS_SPACE};
use crate::symbols::SymbolTable;

/// When to stop profiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Stop once the byte at this address reads zero after a step.
    pub until: u16,
    /// Stop after this many instructions even if the flag never clears.
    pub max_steps: Option<u64>,
}

/// Cycles spent per routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReport {
    pub total_cycles: u64,
    pub steps: u64,
    /// Whether the run ended because the boot flag cleared.
    pub completed: bool,
    /// `(routine, cycles)`, most expensive first.
    pub routines: Vec<(String, u64)>,
}

impl fmt::Display for ProfileReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "processorCycles: {}", self.total_cycles)?;
        for (routine, cycles) in &self.routines {
            writeln!(f, "{routine} {cycles}")?;
        }
        Ok(())
    }
}

/// Per-address cycle accumulator.
pub struct Profiler<'a> {
    symbols: &'a SymbolTable,
    cycles_at: Vec<u64>,
}

impl<'a> Profiler<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self {
            symbols,
            cycles_at: vec![0; ADDRESS_SPACE],
        }
    }

    /// Run `cpu` until `options` says stop, optionally writing one trace line
    /// per instruction:
    ///
    /// `<cycles> <pc> <mnemonic> <a> <a-as-char> <x> <y> <delta> <routine> <sublabel>`
    pub fn run<I: Interpreter>(
        &mut self,
        cpu: &mut I,
        options: &ProfileOptions,
        mut trace: Option<&mut dyn Write>,
    ) -> io::Result<ProfileReport> {
        let mut steps = 0u64;
        let completed = loop {
            if options.max_steps.is_some_and(|max| steps >= max) {
                break false;
            }

            let before = cpu.registers();
            let mnemonic = decode_at(cpu.bus(), before.pc).mnemonic;
            if let Err(err) = cpu.step() {
                log::warn!("{err} at PC=0x{:04X}", before.pc);
            }
            steps += 1;

            let after = cpu.registers();
            let delta = after.cycles - before.cycles;
            self.cycles_at[before.pc as usize] += delta;

            if let Some(out) = trace.as_deref_mut() {
                let (routine, sublabel) = self.scope(before.pc);
                let shown = if (32..=126).contains(&after.a) {
                    after.a as char
                } else {
                    '.'
                };
                writeln!(
                    out,
                    "{} {:04X} {} {:02X} {} {:02X} {:02X} {} {} {}",
                    after.cycles,
                    before.pc,
                    mnemonic,
                    after.a,
                    shown,
                    after.x,
                    after.y,
                    delta,
                    routine,
                    sublabel
                )?;
            }

            if cpu.bus().read(options.until) == 0 {
                break true;
            }
        };

        let total_cycles = cpu.registers().cycles;
        log::info!("profiled {steps} instructions, {total_cycles} cycles");
        Ok(ProfileReport {
            total_cycles,
            steps,
            completed,
            routines: self.routines(),
        })
    }

    /// Cycles charged to the instruction starting at `address`.
    pub fn cycles_at(&self, address: u16) -> u64 {
        self.cycles_at[address as usize]
    }

    /// Fold per-address totals into routines, most expensive first. Ties are
    /// broken by name.
    pub fn routines(&self) -> Vec<(String, u64)> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for (address, &cycles) in self.cycles_at.iter().enumerate() {
            if cycles > 0 {
                let (routine, _) = self.scope(address as u16);
                *totals.entry(routine).or_default() += cycles;
            }
        }
        let mut routines: Vec<_> = totals.into_iter().collect();
        routines.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        routines
    }

    /// Routine and sub-label of `address`. Addresses below every symbol are
    /// named by their hex address.
    fn scope(&self, address: u16) -> (String, String) {
        match self.symbols.scope_for(address) {
            Ok((routine, sublabel)) => (routine.to_string(), sublabel.to_string()),
            Err(_) => (format!("${address:04X}"), String::new()),
        }
    }
}
