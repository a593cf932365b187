//! ptsim - page table simulator
//!
//! Usage: ptsim [OPTIONS] <commands>...
//!
//! Commands:
//!   pfm                  Print the free-page map
//!   ppt <proc>           Print a process's page table
//!   np <proc> <pages>    Create a process with that many data pages
//!   kp <proc>            Kill a process
//!   sb <proc> <va> <val> Store a byte at a virtual address
//!   lb <proc> <va>       Load a byte from a virtual address
//!
//! Options:
//!   -v, --verbose  Log allocator and translation activity to stderr
//!   --strict       Reject invalid processes and unmapped addresses

use std::io::{self, Write};
use std::process;

use clap::Parser;
use log::info;

use ptsim::io::{parse_commands, run_commands};
use ptsim::logger::StderrLogger;
use ptsim::{Geometry, Validation, VmManager};

#[derive(Parser)]
#[command(name = "ptsim")]
#[command(about = "Simulate paged virtual memory on a small physical store")]
struct Args {
    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate process numbers and virtual addresses
    #[arg(long)]
    strict: bool,

    /// Command tokens, e.g. `np 0 2 sb 0 0 42 lb 0 0 pfm`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    commands: Vec<String>,
}

fn main() {
    let args = Args::parse();

    if args.commands.is_empty() {
        eprintln!("usage: ptsim commands");
        process::exit(1);
    }

    if let Err(e) = StderrLogger::new(StderrLogger::level_for_verbosity(args.verbose)).init() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    Geometry::DEFAULT.validate()?;

    let commands = parse_commands(&args.commands)?;
    let validation = if args.strict {
        Validation::Strict
    } else {
        Validation::Compatible
    };
    info!("running {} commands ({:?})", commands.len(), validation);

    let mut vm = VmManager::new(validation);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let failures = run_commands(&mut out, &mut vm, &commands)?;
    out.flush()?;

    if failures > 0 {
        info!("{failures} commands failed");
    }
    Ok(())
}
