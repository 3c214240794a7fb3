use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;

use cerbemu::config::{self, FALLBACK_BREAKPOINT};
use cerbemu::harness::BootOptions;
use cerbemu::operator::Operator;
use cerbemu::profiler::{ProfileOptions, Profiler};
use cerbemu::{
    boot, CancellationToken, ExecutionController, HarnessConfig, InputBridge, SnapshotBuilder,
};

mod terminal;

use terminal::{TerminalConsole, TerminalGuard, TerminalRenderer};

/// Execution-control harness for the 65C02 homebrew computer.
#[derive(Parser, Debug)]
#[command(name = "cerbemu", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Binary ROM image, loaded verbatim
    #[arg(short, long, global = true, default_value = "forth-emu.bin")]
    rom: PathBuf,

    /// Load address (0xC000, $C000 or decimal)
    #[arg(short, long, global = true, default_value = "0xC000", value_parser = parse_address)]
    addr: u16,

    /// Assembler label listing
    #[arg(short, long, global = true, default_value = "forth-emu.lbl")]
    symbols: PathBuf,

    /// Write logs (and the instruction trace at RUST_LOG=trace) to this file
    #[arg(short, long, global = true)]
    logfile: Option<PathBuf>,

    /// Breakpoint symbol; do_BREAK is always checked as well
    #[arg(short, long, default_value = FALLBACK_BREAKPOINT)]
    breakpoint: String,

    /// Symbol or address of the keyboard mailbox flag byte
    #[arg(long, default_value = "MAILFLAG")]
    mailbox: String,

    /// Symbol or address of a status byte whose changes are reported
    /// [default: MODE, if defined]
    #[arg(long)]
    watch: Option<String>,

    /// Block this long when idle in step mode instead of spinning (0 = spin)
    #[arg(long, default_value_t = 0)]
    idle_wait_ms: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run headless until boot completes and report cycles per routine
    Profile {
        /// Symbol or address of the boot flag; profiling stops when it reads 0
        #[arg(long, default_value = "BOOT")]
        until: String,

        /// Write a per-instruction trace to this file
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// Give up after this many instructions
        #[arg(long)]
        max_steps: Option<u64>,
    },
}

fn parse_address(text: &str) -> Result<u16, String> {
    config::parse_address(text).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match &args.command {
        None => {
            init_logging(args.logfile.as_deref(), true)?;
            run_interactive(&args)
        }
        Some(Command::Profile {
            until,
            trace,
            max_steps,
        }) => {
            init_logging(args.logfile.as_deref(), false)?;
            run_profile(&args, until, trace.as_deref(), *max_steps)
        }
    }
}

/// `RUST_LOG` filtering, default `info`. The interactive session owns the
/// terminal, so without a log file it logs nothing.
fn init_logging(logfile: Option<&Path>, interactive: bool) -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    match logfile {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if interactive => return Ok(()),
        None => {}
    }
    builder.init();
    Ok(())
}

fn harness_config(args: &Args) -> HarnessConfig {
    HarnessConfig {
        rom: args.rom.clone(),
        load_address: args.addr,
        symbols: args.symbols.clone(),
        breakpoint: args.breakpoint.clone(),
        mailbox: args.mailbox.clone(),
        watch: args.watch.clone(),
        idle_wait: (args.idle_wait_ms > 0).then(|| Duration::from_millis(args.idle_wait_ms)),
    }
}

fn run_interactive(args: &Args) -> Result<()> {
    let config = harness_config(args);

    // Resolve everything before touching the terminal.
    let symbols = config.load_symbols().context("loading symbols")?;
    let breakpoints = config.breakpoints(&symbols)?;
    let mailbox = config.mailbox_address(&symbols)?;
    let watch = config.watch_address(&symbols)?;
    let image = config.read_image()?;
    let machine = boot(
        &image,
        &BootOptions {
            load_address: config.load_address,
            video: true,
            watch,
        },
    )?;

    let mut snapshots = SnapshotBuilder::new(symbols);
    if let Some(id) = machine.video {
        snapshots = snapshots.with_video(id);
    }
    if let Some(id) = machine.watch {
        snapshots = snapshots.with_watch(id);
    }

    let cancel = CancellationToken::new();
    let (key_tx, key_rx) = unbounded();
    let (mut controller, mode_tx) = ExecutionController::new(
        machine.cpu,
        InputBridge::new(key_rx, mailbox),
        snapshots,
        cancel.clone(),
    );
    for address in breakpoints {
        controller.add_breakpoint(address);
    }
    controller.set_idle_wait(config.idle_wait);

    let guard = TerminalGuard::enter().context("failed to set up terminal")?;

    let emulation = thread::Builder::new()
        .name("emulation".to_string())
        .spawn(move || controller.run(&mut TerminalRenderer::new()))
        .context("failed to start emulation thread")?;

    let operator = Operator::new(key_tx, mode_tx, cancel.clone());
    let result = operator.run(&mut TerminalConsole);
    cancel.cancel();

    let steps = emulation
        .join()
        .map_err(|_| anyhow!("emulation thread panicked"))?;
    drop(guard);

    result.context("terminal input failed")?;
    log::info!("exited after {steps} instructions");
    Ok(())
}

fn run_profile(args: &Args, until: &str, trace: Option<&Path>, max_steps: Option<u64>) -> Result<()> {
    let config = harness_config(args);

    let symbols = config.load_symbols().context("loading symbols")?;
    let until = config::resolve(&symbols, until, "boot flag")?;
    let image = config.read_image()?;
    let mut machine = boot(
        &image,
        &BootOptions {
            load_address: config.load_address,
            video: false,
            watch: None,
        },
    )?;

    let mut trace_file = match trace {
        Some(path) => Some(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create trace file {}", path.display())
        })?)),
        None => None,
    };

    let options = ProfileOptions { until, max_steps };
    let mut profiler = Profiler::new(&symbols);
    let report = profiler
        .run(
            &mut machine.cpu,
            &options,
            trace_file.as_mut().map(|f| f as &mut dyn Write),
        )
        .context("writing trace")?;
    if let Some(mut file) = trace_file {
        file.flush().context("writing trace")?;
    }

    if !report.completed {
        log::warn!("boot flag never cleared; stopped after {} instructions", report.steps);
    }
    print!("{report}");
    Ok(())
}
