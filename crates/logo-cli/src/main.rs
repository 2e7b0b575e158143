//! `logo`: run a Logo script, or start a REPL when no script is given.
//!
//! Turtle motions are reported as log events (`RUST_LOG=info` or
//! `--verbose` to see them); text output goes to stdout.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use logo_engine::{
    Console, EvalContext, Interpreter, Motion, RecordingTurtle, RunOptions, Turtle,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "logo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Logo interpreter", long_about = None)]
struct Args {
    /// Script to run; starts a REPL when absent
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Fixed seed for RANDOM
    #[arg(long, value_name = "N")]
    seed: Option<u32>,

    /// Maximum nesting of procedure calls
    #[arg(long = "max-depth", value_name = "N", default_value_t = 400)]
    max_depth: usize,

    /// Log interpreter activity
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut context = EvalContext::with_max_call_depth(args.max_depth);
    if let Some(seed) = args.seed {
        context = context.with_seed(seed);
    }

    let logo = Interpreter::builder()
        .context(context)
        .turtle(LoggingTurtle::default())
        .console(StdoutConsole)
        .build();

    let bye = logo.bye_handle();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            bye.bye();
        }
    });

    match args.script {
        Some(path) => run_script(&logo, path).await,
        None => repl(&logo).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

async fn run_script(logo: &Interpreter, path: PathBuf) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if let Err(e) = logo.run(&text).await {
        bail!("{}: {e}", path.display());
    }
    Ok(())
}

async fn repl(logo: &Interpreter) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "? " } else { "> " };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                pending.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        editor.add_history_entry(line.as_str())?;

        pending.push_str(&line);
        pending.push('\n');
        if opens_definition(&pending) && !closes_definition(&line) {
            continue;
        }

        let text = std::mem::take(&mut pending);
        match logo.run_with(&text, RunOptions::returning()).await {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}

/// Input starting with `TO` is collected up to its `END` line.
fn opens_definition(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("to"))
}

fn closes_definition(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("end")
}

// ═══════════════════════════════════════════════════════════════════════
// Host Collaborators
// ═══════════════════════════════════════════════════════════════════════

/// Tracks the turtle's pose and logs each command.
#[derive(Debug, Default)]
struct LoggingTurtle {
    inner: RecordingTurtle,
}

impl LoggingTurtle {
    fn report(&self, command: &str) -> Motion {
        let (x, y) = self.inner.position();
        info!(command, x, y, heading = self.inner.heading(), "turtle");
        Motion::Ready
    }
}

impl Turtle for LoggingTurtle {
    fn move_by(&mut self, distance: f64) -> Motion {
        self.inner.move_by(distance);
        self.report("move")
    }

    fn turn(&mut self, degrees: f64) -> Motion {
        self.inner.turn(degrees);
        self.report("turn")
    }

    fn home(&mut self) -> Motion {
        self.inner.home();
        self.report("home")
    }

    fn set_position(&mut self, x: f64, y: f64) -> Motion {
        self.inner.set_position(x, y);
        self.report("setxy")
    }

    fn set_heading(&mut self, degrees: f64) -> Motion {
        self.inner.set_heading(degrees);
        self.report("setheading")
    }

    fn pen_down(&mut self) -> Motion {
        self.inner.pen_down();
        self.report("pendown")
    }

    fn pen_up(&mut self) -> Motion {
        self.inner.pen_up();
        self.report("penup")
    }

    fn set_pen_color(&mut self, color: &str) -> Motion {
        self.inner.set_pen_color(color);
        info!(color, "turtle pen colour");
        Motion::Ready
    }

    fn set_pen_width(&mut self, width: f64) -> Motion {
        self.inner.set_pen_width(width);
        info!(width, "turtle pen width");
        Motion::Ready
    }

    fn clear(&mut self) -> Motion {
        self.inner.clear();
        self.report("clearscreen")
    }

    fn position(&self) -> (f64, f64) {
        self.inner.position()
    }

    fn heading(&self) -> f64 {
        self.inner.heading()
    }
}

struct StdoutConsole;

impl Console for StdoutConsole {
    fn write(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout has nowhere to report to.
        let _ = out.write_all(text.as_bytes()).and_then(|()| out.flush());
    }

    fn clear(&mut self) {
        self.write("\x1b[2J\x1b[H");
    }
}
