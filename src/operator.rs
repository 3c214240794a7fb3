//! The operator flow.
//!
//! Blocks on key presses and turns each into a mode command, a key code for
//! the guest, or a request to exit. It never touches machine state: all it
//! owns is the two channel senders, the cancellation token and a one-line
//! status area.
//!
//! | Key                 | Action                       |
//! |---------------------|------------------------------|
//! | PageDown            | Step                         |
//! | End                 | Continuous                   |
//! | Esc                 | Exit, after acknowledgment   |
//! | Ctrl+C              | Exit immediately             |
//! | Enter               | key 0x0A                     |
//! | Backspace / Delete  | key 0x08                     |
//! | Tab                 | key 0x09                     |
//! | printable ASCII     | its code                     |

use std::io;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::controller::{CancellationToken, RunMode};

/// How often a blocked operator re-checks the cancellation token.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAction {
    Mode(RunMode),
    Key(u8),
    /// Leave after the operator acknowledges.
    Exit,
    /// Leave at once (external termination).
    Interrupt,
    Ignore,
}

/// Map a terminal key event to an operator action.
pub fn action_for(event: &KeyEvent) -> OperatorAction {
    if event.kind == KeyEventKind::Release {
        return OperatorAction::Ignore;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return match event.code {
            KeyCode::Char('c') | KeyCode::Char('C') => OperatorAction::Interrupt,
            _ => OperatorAction::Ignore,
        };
    }
    match event.code {
        KeyCode::PageDown => OperatorAction::Mode(RunMode::Step),
        KeyCode::End => OperatorAction::Mode(RunMode::Continuous),
        KeyCode::Esc => OperatorAction::Exit,
        KeyCode::Enter => OperatorAction::Key(0x0A),
        KeyCode::Backspace | KeyCode::Delete => OperatorAction::Key(0x08),
        KeyCode::Tab => OperatorAction::Key(0x09),
        KeyCode::Char(c) if c.is_ascii() && !c.is_ascii_control() => OperatorAction::Key(c as u8),
        _ => OperatorAction::Ignore,
    }
}

/// Status-line echo for a key sent to the guest.
pub fn describe_key(code: u8) -> String {
    if code.is_ascii_graphic() || code == b' ' {
        format!("received [{}] [${code:02X}]", code as char)
    } else {
        format!("received [${code:02X}]")
    }
}

/// Input and status line of the operator's terminal.
pub trait Console {
    /// Wait up to `timeout` for a key press.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;

    /// Replace the status line.
    fn status(&mut self, text: &str) -> io::Result<()>;
}

/// The operator's side of both channels.
#[derive(Debug, Clone)]
pub struct Operator {
    keys: Sender<u8>,
    modes: Sender<RunMode>,
    cancel: CancellationToken,
}

impl Operator {
    pub fn new(keys: Sender<u8>, modes: Sender<RunMode>, cancel: CancellationToken) -> Self {
        Self { keys, modes, cancel }
    }

    /// Run until the operator exits or the token is cancelled elsewhere.
    ///
    /// Cancels the token on the way out so the emulation flow stops too.
    pub fn run<C: Console>(&self, console: &mut C) -> io::Result<()> {
        while !self.cancel.is_cancelled() {
            let Some(event) = console.next_key(POLL_INTERVAL)? else {
                continue;
            };
            match action_for(&event) {
                OperatorAction::Mode(mode) => {
                    log::debug!("operator requested {mode:?}");
                    self.send(&self.modes, mode);
                }
                OperatorAction::Key(code) => {
                    console.status(&describe_key(code))?;
                    self.send(&self.keys, code);
                }
                OperatorAction::Exit => {
                    console.status("Exiting...")?;
                    self.cancel.cancel();
                    console.status("Press any key to exit")?;
                    while console.next_key(POLL_INTERVAL)?.is_none() {}
                    return Ok(());
                }
                OperatorAction::Interrupt => {
                    log::info!("interrupted by operator");
                    self.cancel.cancel();
                    return Ok(());
                }
                OperatorAction::Ignore => {}
            }
        }
        Ok(())
    }

    fn send<T>(&self, sender: &Sender<T>, value: T) {
        // Only fails once the emulation flow has gone away.
        if sender.send(value).is_err() {
            self.cancel.cancel();
        }
    }
}
