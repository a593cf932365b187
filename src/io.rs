//! Command-line front end: parse command tokens, run them against a
//! [`VmManager`] and render the reference text output.

use std::io::{self, Write};

use log::{error, warn};
use thiserror::Error;

use crate::error::MemoryError;
use crate::registry::ProcNum;
use crate::vm_manager::VmManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `pfm`: print the free-page map
    PrintFreeMap,
    /// `ppt proc`: print a page table
    PrintPageTable { proc_num: ProcNum },
    /// `np proc count`: new process
    NewProcess { proc_num: ProcNum, page_count: usize },
    /// `kp proc`: kill process
    KillProcess { proc_num: ProcNum },
    /// `sb proc vaddr value`: store byte
    StoreByte { proc_num: ProcNum, vaddr: u32, value: u8 },
    /// `lb proc vaddr`: load byte
    LoadByte { proc_num: ProcNum, vaddr: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{command}: missing argument `{argument}`")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

/// Parse an integer the way C `atoi` does: skip leading whitespace, take an
/// optional sign and then digits up to the first non-digit. No digits gives 0.
pub fn parse_int(token: &str) -> i64 {
    let s = token.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.wrapping_mul(10).wrapping_add(i64::from(d - b'0')));
    if negative { magnitude.wrapping_neg() } else { magnitude }
}

struct Tokens<'a, I> {
    inner: &'a mut I,
    command: &'static str,
}

impl<'s, S, I> Tokens<'_, I>
where
    S: AsRef<str> + 's,
    I: Iterator<Item = &'s S>,
{
    fn int(&mut self, argument: &'static str) -> Result<i64, ParseError> {
        self.inner
            .next()
            .map(|t| parse_int(t.as_ref()))
            .ok_or(ParseError::MissingArgument {
                command: self.command,
                argument,
            })
    }

    fn proc_num(&mut self) -> Result<ProcNum, ParseError> {
        // Negative numbers wrap, as they do in the registry arithmetic
        self.int("proc_num").map(|n| n as ProcNum)
    }
}

/// Parse all command tokens up front. Unknown tokens are skipped.
///
/// Nothing runs until the whole line parses, so a command missing an
/// argument fails the run before any earlier command produces output.
pub fn parse_commands<S: AsRef<str>>(args: &[S]) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    let mut iter = args.iter();

    while let Some(token) = iter.next() {
        let name: &'static str = match token.as_ref() {
            "pfm" => "pfm",
            "ppt" => "ppt",
            "np" => "np",
            "kp" => "kp",
            "sb" => "sb",
            "lb" => "lb",
            other => {
                warn!("ignoring unknown command `{other}`");
                continue;
            }
        };
        let mut t = Tokens {
            inner: &mut iter,
            command: name,
        };

        let command = match name {
            "pfm" => Command::PrintFreeMap,
            "ppt" => Command::PrintPageTable {
                proc_num: t.proc_num()?,
            },
            "np" => Command::NewProcess {
                proc_num: t.proc_num()?,
                page_count: t.int("page_count")?.max(0) as usize,
            },
            "kp" => Command::KillProcess {
                proc_num: t.proc_num()?,
            },
            "sb" => Command::StoreByte {
                proc_num: t.proc_num()?,
                vaddr: t.int("vaddr")? as u32,
                value: t.int("value")? as u8,
            },
            _ => Command::LoadByte {
                proc_num: t.proc_num()?,
                vaddr: t.int("vaddr")? as u32,
            },
        };
        commands.push(command);
    }

    Ok(commands)
}

/// Write the free-page map as rows of 16, `#` for allocated pages
pub fn write_free_map<W: Write>(out: &mut W, vm: &VmManager) -> io::Result<()> {
    writeln!(out, "--- PAGE FREE MAP ---")?;
    for row in vm.free_map().chunks(16) {
        let line: String = row.iter().map(|&used| if used { '#' } else { '.' }).collect();
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn write_page_table<W: Write>(
    out: &mut W,
    vm: &VmManager,
    proc_num: ProcNum,
) -> Result<(), RunError> {
    let mappings = vm.mappings(proc_num)?;
    writeln!(out, "--- PROCESS {} PAGE TABLE ---", proc_num as isize)?;
    for (vpage, ppage) in mappings {
        writeln!(out, "{vpage:02x} -> {ppage:02x}")?;
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Run one command, writing its output
pub fn execute<W: Write>(out: &mut W, vm: &mut VmManager, command: &Command) -> Result<(), RunError> {
    match *command {
        Command::PrintFreeMap => write_free_map(out, vm)?,
        Command::PrintPageTable { proc_num } => write_page_table(out, vm, proc_num)?,
        Command::NewProcess {
            proc_num,
            page_count,
        } => vm.new_process(proc_num, page_count)?,
        Command::KillProcess { proc_num } => vm.kill_process(proc_num)?,
        Command::StoreByte {
            proc_num,
            vaddr,
            value,
        } => writeln!(out, "{}", vm.store(proc_num, vaddr, value)?)?,
        Command::LoadByte { proc_num, vaddr } => writeln!(out, "{}", vm.load(proc_num, vaddr)?)?,
    }
    Ok(())
}

/// Run every command in order. Memory errors are reported and the run
/// continues: running out of pages goes to `out` in the reference `OOM:`
/// format, anything else to the error log. Returns the number of commands
/// that failed.
pub fn run_commands<W: Write>(
    out: &mut W,
    vm: &mut VmManager,
    commands: &[Command],
) -> io::Result<usize> {
    let mut failures = 0;
    for command in commands {
        match execute(out, vm, command) {
            Ok(()) => {}
            Err(RunError::Io(e)) => return Err(e),
            Err(RunError::Memory(e @ MemoryError::OutOfMemory { .. })) => {
                failures += 1;
                writeln!(out, "{e}")?;
            }
            Err(RunError::Memory(e)) => {
                failures += 1;
                error!("{e}");
            }
        }
    }
    Ok(failures)
}
