//! crossterm front end: raw-mode guard, snapshot renderer and operator console.
//!
//! Screen layout:
//!
//! ```text
//! col 0                                    col 42
//! +----------------------------------------+ +------------------------------+
//! | guest video, 40 x 30                   | | debug pane                   |
//! +----------------------------------------+ +------------------------------+
//! row 30: status line (operator)
//! ```
//!
//! Both flows draw to stdout. Each frame holds the stdout lock from first
//! cursor move to flush, so a status update never lands inside a frame.

use std::io::{self, stdout, Stdout, StdoutLock, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyEvent};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};

use cerbemu::operator::Console;
use cerbemu::snapshot::DebugSnapshot;
use cerbemu::{Renderer, RunMode};

const DEBUG_COLUMN: u16 = 42;
const DEBUG_WIDTH: usize = 38;
const STATUS_ROW: u16 = 30;
const STATUS_WIDTH: usize = 40;

/// Minimum time between debug-pane redraws while running continuously.
const CONTINUOUS_FRAME: Duration = Duration::from_millis(50);

/// Raw mode plus alternate screen for as long as it lives.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        let _ = execute!(out, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Draws snapshots into the video and debug panes.
pub struct TerminalRenderer {
    out: Stdout,
    last_frame: Option<Instant>,
    last_mode: Option<RunMode>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            last_frame: None,
            last_mode: None,
        }
    }

    fn debug_pane(out: &mut StdoutLock, snapshot: &DebugSnapshot) -> io::Result<()> {
        let regs = &snapshot.registers;
        let forth = &snapshot.forth;

        // PC is padded across the row, so it goes first.
        if snapshot.detailed {
            put(out, 0, 0, &format!("PC: {:04X}", regs.pc))?;
        }
        put(out, 10, 0, &format!("Cycles: {}", regs.cycles))?;
        put(out, 26, 1, "NV-BDIZC")?;
        let latest = forth.latest.map_or("----".to_string(), |l| format!("{l:04X}"));
        put(out, 0, 8, &format!("LATEST: {latest}  DP: {:04X}", forth.dp))?;

        if !snapshot.detailed {
            return Ok(());
        }

        put(out, 0, 2, &regs.to_string())?;
        put(
            out,
            0,
            4,
            &format!("LINE: {:04X} ROW: {:02X} COL: {:02X}", forth.line, forth.row, forth.col),
        )?;
        put(out, 4, 6, &format!(" W: {:04X}  IP: {:04X}", forth.w, forth.ip))?;
        put(out, 4, 7, &format!("G1: {:04X}  G2: {:04X}", forth.g1, forth.g2))?;

        for (i, row) in snapshot.before_here.iter().enumerate() {
            let bytes: Vec<_> = row.bytes.iter().map(|b| format!("{b:02X}")).collect();
            put(out, 0, 9 + i as u16, &format!("{:04X}: {}", row.address, bytes.join(" ")))?;
        }

        for (i, line) in snapshot.history.iter().enumerate() {
            put(out, 0, 12 + i as u16, line)?;
        }

        for i in 0..cerbemu::snapshot::STACK_DEPTH {
            let row = 28 - i as u16;
            let cell = snapshot
                .data_stack
                .get(i)
                .map(|c| format!("{} {:04X}: {:04X}", c.index, c.address, c.value));
            put(out, 0, row, cell.as_deref().unwrap_or(""))?;
            let byte = snapshot
                .hardware_stack
                .get(i)
                .map(|(address, value)| format!("{:02X}: {value:02X}", address & 0xFF));
            put(out, 20, row, byte.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, snapshot: &DebugSnapshot) -> io::Result<()> {
        let due = pane_due(
            snapshot.mode,
            snapshot.stepped,
            snapshot.status_change.is_some(),
            self.last_mode,
            self.last_frame.map(|t| t.elapsed()),
        );
        if snapshot.screen.is_none() && !due {
            return Ok(());
        }

        let mut out = self.out.lock();
        if let Some(lines) = &snapshot.screen {
            for (row, line) in lines.iter().enumerate() {
                queue!(out, MoveTo(0, row as u16), Print(line))?;
            }
        }
        if due {
            Self::debug_pane(&mut out, snapshot)?;
            self.last_frame = Some(Instant::now());
            self.last_mode = Some(snapshot.mode);
        }
        out.flush()
    }
}

/// Whether the debug pane needs redrawing.
///
/// A halted machine is only redrawn after it steps, so idle polls cost no
/// output. Continuous runs are throttled to one frame per [`CONTINUOUS_FRAME`].
/// The first frame, a mode change and a status-variable change always redraw.
fn pane_due(
    mode: RunMode,
    stepped: bool,
    status_changed: bool,
    last_mode: Option<RunMode>,
    since_last: Option<Duration>,
) -> bool {
    if last_mode != Some(mode) || status_changed {
        return true;
    }
    match mode {
        RunMode::Step => stepped,
        RunMode::Continuous => since_last.map_or(true, |t| t >= CONTINUOUS_FRAME),
    }
}

/// Write `text` at debug-pane position `(col, row)`, padded to clear old text.
fn put(out: &mut StdoutLock, col: u16, row: u16, text: &str) -> io::Result<()> {
    let width = DEBUG_WIDTH.saturating_sub(col as usize);
    let text: String = text.chars().take(width).collect();
    queue!(
        out,
        MoveTo(DEBUG_COLUMN + col, row),
        Print(format!("{text:<width$}"))
    )
}

/// Key input and the status line.
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) => Ok(Some(key)),
            _ => Ok(None),
        }
    }

    fn status(&mut self, text: &str) -> io::Result<()> {
        let mut out = stdout().lock();
        let text: String = text.chars().take(STATUS_WIDTH).collect();
        queue!(
            out,
            MoveTo(0, STATUS_ROW),
            Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECENT: Option<Duration> = Some(Duration::from_millis(1));

    #[test]
    fn test_first_frame_is_drawn() {
        assert!(pane_due(RunMode::Step, false, false, None, None));
        assert!(pane_due(RunMode::Continuous, false, false, None, None));
    }

    #[test]
    fn test_halted_idle_polls_are_skipped() {
        for _ in 0..3 {
            assert!(!pane_due(RunMode::Step, false, false, Some(RunMode::Step), RECENT));
        }
        assert!(!pane_due(
            RunMode::Step,
            false,
            false,
            Some(RunMode::Step),
            Some(Duration::from_secs(5))
        ));
    }

    #[test]
    fn test_single_step_redraws() {
        assert!(pane_due(RunMode::Step, true, false, Some(RunMode::Step), RECENT));
    }

    #[test]
    fn test_mode_change_redraws() {
        assert!(pane_due(RunMode::Step, false, false, Some(RunMode::Continuous), RECENT));
        assert!(pane_due(RunMode::Continuous, true, false, Some(RunMode::Step), RECENT));
    }

    #[test]
    fn test_status_change_redraws() {
        assert!(pane_due(RunMode::Step, false, true, Some(RunMode::Step), RECENT));
        assert!(pane_due(RunMode::Continuous, true, true, Some(RunMode::Continuous), RECENT));
    }

    #[test]
    fn test_continuous_run_is_throttled() {
        let running = Some(RunMode::Continuous);
        assert!(!pane_due(RunMode::Continuous, true, false, running, RECENT));
        assert!(pane_due(RunMode::Continuous, true, false, running, Some(CONTINUOUS_FRAME)));
    }
}
