//! Writes the synthetic scrolling test document.
//!
//! # Usage
//!
//! ```bash
//! # 1,000,000 lines to test_data.txt (default)
//! cargo run -p vtedit_tools --bin generate-test-lines
//!
//! # 50k lines to a custom path
//! cargo run -p vtedit_tools --bin generate-test-lines -- --count 50000 --output /tmp/lines.txt
//! ```

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use vtedit_core::sample::test_line;

/// Synthetic document generator for vtedit scroll and render testing.
#[derive(Parser)]
#[command(
    name = "generate-test-lines",
    about = "Generate the section/subsection test document for vtedit"
)]
struct Args {
    /// Number of lines to generate
    #[arg(short, long, default_value = "1000000")]
    count: usize,

    /// Output file
    #[arg(short, long, default_value = "test_data.txt")]
    output: PathBuf,
}

/// Stream `count` test lines into `writer`, `\n`-separated with no trailing break.
fn write_lines<W: Write>(writer: &mut W, count: usize) -> io::Result<()> {
    for index in 0..count {
        if index > 0 {
            writer.write_all(b"\n")?;
        }
        writer.write_all(test_line(index).as_bytes())?;
    }
    writer.flush()
}

fn run(args: Args) -> io::Result<()> {
    let started = Instant::now();
    let mut writer = BufWriter::new(File::create(&args.output)?);
    write_lines(&mut writer, args.count)?;
    info!(
        lines = args.count,
        path = %args.output.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote test document"
    );
    Ok(())
}

fn run_and_report<F, E>(runner: F) -> i32
where
    F: FnOnce() -> Result<(), E>,
    E: std::fmt::Display,
{
    match runner() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("generate-test-lines error: {}", err);
            1
        }
    }
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let exit_code = run_and_report(|| run(args));
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
