//! The emulation loop.
//!
//! [`ExecutionController`] owns the interpreter and runs one iteration at a
//! time:
//!
//! 1. In [`RunMode::Continuous`], a PC sitting on a breakpoint switches to
//!    [`RunMode::Step`] and discards any mode commands still queued.
//! 2. Otherwise at most one pending mode command is applied. Every command
//!    also marks an advance as pending.
//! 3. The interpreter steps once if running continuously or if an advance is
//!    pending; otherwise the iteration is an idle poll.
//! 4. The [`InputBridge`] gets a chance to deliver a key.
//! 5. A [`DebugSnapshot`] is built and handed to the [`Renderer`].
//!
//! Commands queued before a breakpoint hit were issued against a machine that
//! was still running, so the halt supersedes them. The instruction at the
//! breakpoint still executes on the iteration that sees it, and the following
//! iteration halts.
//!
//! The loop stops between iterations once its [`CancellationToken`] is
//! cancelled, never in the middle of a step.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::input::InputBridge;
use crate::interpreter::Interpreter;
use crate::observers::ObservableMemory;
use crate::snapshot::{DebugSnapshot, SnapshotBuilder};

/// Log target carrying one record per executed instruction.
pub const TRACE_TARGET: &str = "cerbemu::trace";

/// Execution mode of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Step on every iteration.
    Continuous,
    /// Step only when a command asks for it.
    #[default]
    Step,
}

/// Shared shutdown signal, cloned into every flow that must stop together.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Consumer of per-iteration snapshots.
pub trait Renderer {
    /// Draw one frame. Errors are logged by the controller and the frame is
    /// dropped; they never stop emulation.
    fn render(&mut self, snapshot: &DebugSnapshot) -> io::Result<()>;
}

/// Outcome of one controller iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iteration {
    /// Mode in effect after the iteration's command was applied.
    pub mode: RunMode,
    /// Whether the interpreter executed an instruction.
    pub stepped: bool,
    /// Whether PC was on a breakpoint at the start of the iteration.
    pub breakpoint: bool,
    /// Key handed to the guest, if any.
    pub delivered: Option<u8>,
}

/// Drives an interpreter under operator control.
pub struct ExecutionController<I> {
    cpu: I,
    commands: Receiver<RunMode>,
    input: InputBridge,
    snapshots: SnapshotBuilder,
    breakpoints: Vec<u16>,
    mode: RunMode,
    advance_pending: bool,
    idle_wait: Option<Duration>,
    cancel: CancellationToken,
    steps: u64,
}

impl<I> ExecutionController<I>
where
    I: Interpreter<Bus = ObservableMemory>,
{
    /// Create a controller in [`RunMode::Step`] with no breakpoints.
    ///
    /// Returns the controller and the sending half of its mode-command channel.
    pub fn new(
        cpu: I,
        input: InputBridge,
        snapshots: SnapshotBuilder,
        cancel: CancellationToken,
    ) -> (Self, Sender<RunMode>) {
        let (sender, commands) = unbounded();
        let controller = Self {
            cpu,
            commands,
            input,
            snapshots,
            breakpoints: Vec::new(),
            mode: RunMode::default(),
            advance_pending: false,
            idle_wait: None,
            cancel,
            steps: 0,
        };
        (controller, sender)
    }

    /// Halt whenever PC reaches `address` while running continuously.
    pub fn add_breakpoint(&mut self, address: u16) {
        if !self.breakpoints.contains(&address) {
            self.breakpoints.push(address);
        }
    }

    /// Block for up to `wait` on the command channel instead of spinning when
    /// there is nothing to execute.
    pub fn set_idle_wait(&mut self, wait: Option<Duration>) {
        self.idle_wait = wait;
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn advance_pending(&self) -> bool {
        self.advance_pending
    }

    pub fn breakpoints(&self) -> &[u16] {
        &self.breakpoints
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn cpu(&self) -> &I {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut I {
        &mut self.cpu
    }

    pub fn snapshots(&self) -> &SnapshotBuilder {
        &self.snapshots
    }

    /// Run until cancelled. Returns the number of instructions executed.
    pub fn run<R: Renderer>(&mut self, renderer: &mut R) -> u64 {
        log::info!(
            "emulation started at PC=0x{:04X} in {:?} mode",
            self.cpu.registers().pc,
            self.mode
        );
        let snapshot = self.snapshots.build(&mut self.cpu, self.mode, false);
        Self::present(renderer, &snapshot);

        while !self.cancel.is_cancelled() {
            self.iterate(renderer);
        }

        log::info!("emulation stopped after {} steps", self.steps);
        self.steps
    }

    /// Run a single iteration of the loop.
    pub fn iterate<R: Renderer>(&mut self, renderer: &mut R) -> Iteration {
        let breakpoint = self.check_breakpoint();
        if !breakpoint {
            self.poll_command();
        }

        let stepped = self.mode == RunMode::Continuous || self.advance_pending;
        if stepped {
            self.advance_pending = false;
            self.steps += 1;
            let pc = self.cpu.registers().pc;
            if let Err(err) = self.cpu.step() {
                log::warn!("{err} at PC=0x{pc:04X}");
            }
        }

        let delivered = self.input.try_deliver(&mut self.cpu);

        let snapshot = self.snapshots.build(&mut self.cpu, self.mode, stepped);
        if stepped && log::log_enabled!(target: TRACE_TARGET, log::Level::Trace) {
            log::trace!(target: TRACE_TARGET, "{}", snapshot.trace_line());
        }
        Self::present(renderer, &snapshot);

        Iteration {
            mode: self.mode,
            stepped,
            breakpoint,
            delivered,
        }
    }

    /// Apply at most one queued mode command without stepping.
    ///
    /// Returns the command applied, if any.
    pub fn apply_next_command(&mut self) -> Option<RunMode> {
        match self.commands.try_recv() {
            Ok(mode) => {
                self.apply(mode);
                Some(mode)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    fn check_breakpoint(&mut self) -> bool {
        if self.mode != RunMode::Continuous {
            return false;
        }
        let pc = self.cpu.registers().pc;
        if !self.breakpoints.contains(&pc) {
            return false;
        }
        log::info!("breakpoint hit at PC=0x{pc:04X}");
        let stale = self.commands.try_iter().count();
        if stale > 0 {
            log::debug!("dropped {stale} queued command(s) at breakpoint");
        }
        self.apply(RunMode::Step);
        true
    }

    fn poll_command(&mut self) {
        let idle = self.mode == RunMode::Step && !self.advance_pending;
        let wait = self.idle_wait.filter(|_| idle);
        match wait {
            None => {
                self.apply_next_command();
            }
            Some(timeout) => match self.commands.recv_timeout(timeout) {
                Ok(mode) => self.apply(mode),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
            },
        }
    }

    fn apply(&mut self, mode: RunMode) {
        if mode != self.mode {
            log::debug!("mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.advance_pending = true;
    }

    fn present<R: Renderer>(renderer: &mut R, snapshot: &DebugSnapshot) {
        if let Err(err) = renderer.render(snapshot) {
            log::debug!("frame dropped: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;
    use crate::{MemoryBus, CPU};
    use crossbeam_channel::unbounded;

    struct Frames(Vec<DebugSnapshot>);

    impl Renderer for Frames {
        fn render(&mut self, snapshot: &DebugSnapshot) -> io::Result<()> {
            self.0.push(snapshot.clone());
            Ok(())
        }
    }

    struct Broken;

    impl Renderer for Broken {
        fn render(&mut self, _: &DebugSnapshot) -> io::Result<()> {
            Err(io::Error::other("terminal too small"))
        }
    }

    fn controller(program: &[u8]) -> (ExecutionController<CPU<ObservableMemory>>, Sender<RunMode>) {
        let mut memory = ObservableMemory::new();
        memory.fill(0x0000..=0xFFFF, 0xEA);
        memory.write(0x0200, 0x00);
        memory.load(0xC000, program);
        memory.load(0xFFFC, &[0x00, 0xC0]);
        memory.arm();
        let (_keys, rx) = unbounded();
        ExecutionController::new(
            CPU::new(memory),
            InputBridge::new(rx, 0x0200),
            SnapshotBuilder::new(SymbolTable::default()),
            CancellationToken::new(),
        )
    }

    #[test]
    fn test_starts_idle_in_step_mode() {
        let (mut ctl, _tx) = controller(&[]);
        let mut frames = Frames(Vec::new());

        let it = ctl.iterate(&mut frames);

        assert_eq!(it.mode, RunMode::Step);
        assert!(!it.stepped);
        assert_eq!(ctl.cpu().pc(), 0xC000);
        assert_eq!(frames.0.len(), 1);
    }

    #[test]
    fn test_each_step_command_advances_once() {
        let (mut ctl, tx) = controller(&[]);
        let mut frames = Frames(Vec::new());
        tx.send(RunMode::Step).unwrap();
        tx.send(RunMode::Step).unwrap();

        assert!(ctl.iterate(&mut frames).stepped);
        assert!(ctl.iterate(&mut frames).stepped);
        assert!(!ctl.iterate(&mut frames).stepped);
        assert_eq!(ctl.cpu().pc(), 0xC002);
        assert_eq!(ctl.steps(), 2);
    }

    #[test]
    fn test_render_errors_do_not_stop_stepping() {
        let (mut ctl, tx) = controller(&[]);
        tx.send(RunMode::Continuous).unwrap();

        for _ in 0..3 {
            assert!(ctl.iterate(&mut Broken).stepped);
        }
        assert_eq!(ctl.cpu().pc(), 0xC003);
    }

    #[test]
    fn test_idle_wait_picks_up_command() {
        let (mut ctl, tx) = controller(&[]);
        ctl.set_idle_wait(Some(Duration::from_millis(1)));
        let mut frames = Frames(Vec::new());

        assert!(!ctl.iterate(&mut frames).stepped);
        tx.send(RunMode::Step).unwrap();
        assert!(ctl.iterate(&mut frames).stepped);
    }

    #[test]
    fn test_run_stops_when_cancelled() {
        let (mut ctl, _tx) = controller(&[]);
        ctl.cancel.cancel();
        let mut frames = Frames(Vec::new());

        assert_eq!(ctl.run(&mut frames), 0);
        assert_eq!(frames.0.len(), 1);
    }
}
